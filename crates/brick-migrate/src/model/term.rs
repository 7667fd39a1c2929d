//! Helpers over the `oxigraph` term model.

use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{LiteralRef, NamedOrBlankNodeRef, Term, TermRef};

/// The term as a subject, if it can be one.
pub fn subject_ref(term: &Term) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// The string value of a term: the IRI, the blank node label or the
/// literal's lexical form.
pub fn str_value(term: TermRef<'_>) -> &str {
    match term {
        TermRef::NamedNode(node) => node.as_str(),
        TermRef::BlankNode(node) => node.as_str(),
        TermRef::Literal(literal) => literal.value(),
        #[allow(unreachable_patterns)]
        _ => "",
    }
}

/// True for `xsd:string` and language-tagged strings.
pub fn is_string(literal: LiteralRef<'_>) -> bool {
    literal.datatype() == xsd::STRING || literal.datatype() == rdf::LANG_STRING
}

/// True when the lexical form is valid for the datatype.
///
/// Only the numeric and boolean XSD types are checked; anything else is
/// accepted as-is.
pub fn is_well_formed(literal: LiteralRef<'_>) -> bool {
    let lexical = literal.value().trim();
    let datatype = literal.datatype();
    if datatype == xsd::INTEGER || datatype == xsd::INT || datatype == xsd::LONG {
        canonical_integer(lexical).is_some()
    } else if datatype == xsd::NON_NEGATIVE_INTEGER {
        canonical_integer(lexical).is_some_and(|v| !v.starts_with('-'))
    } else if datatype == xsd::DECIMAL {
        let digits = lexical.trim_start_matches(['+', '-']);
        !digits.is_empty()
            && digits.chars().filter(|c| *c == '.').count() <= 1
            && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            && digits.chars().any(|c| c.is_ascii_digit())
    } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
        matches!(lexical, "INF" | "-INF" | "+INF" | "NaN") || lexical.parse::<f64>().is_ok()
    } else if datatype == xsd::BOOLEAN {
        matches!(lexical, "true" | "false" | "1" | "0")
    } else {
        true
    }
}

/// Canonical lexical form of an integer of any magnitude.
///
/// Accepts surrounding whitespace, an optional sign and ASCII digits; drops a
/// `+` sign and leading zeros. `None` for anything else.
pub fn canonical_integer(text: &str) -> Option<String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    Some(match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{digits}"),
        (false, false) => digits.to_string(),
    })
}

/// A numeric value for ordering comparisons, if the literal has one.
pub fn numeric_value(literal: LiteralRef<'_>) -> Option<f64> {
    let datatype = literal.datatype();
    let numeric = [
        xsd::INTEGER,
        xsd::INT,
        xsd::LONG,
        xsd::SHORT,
        xsd::BYTE,
        xsd::NON_NEGATIVE_INTEGER,
        xsd::POSITIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::NEGATIVE_INTEGER,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_LONG,
        xsd::DECIMAL,
        xsd::DOUBLE,
        xsd::FLOAT,
    ];
    if numeric.contains(&datatype) {
        literal.value().trim().parse().ok()
    } else {
        None
    }
}

pub(crate) fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}
