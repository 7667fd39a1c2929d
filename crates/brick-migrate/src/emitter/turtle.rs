use std::collections::HashMap;
use std::io::{self, Write};

use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, TermRef, TripleRef};

use super::TriplesEmitter;
use crate::model::term::escape_literal;

/// Turtle format emitter with prefix support.
///
/// Consecutive triples sharing a subject are written as one `;`-separated
/// statement, so feeding triples in sorted order gives one block per subject.
pub struct TurtleEmitter<W: Write> {
    writer: W,
    count: u64,
    prefixes: HashMap<String, String>,
    prefix_written: bool,
    open_subject: Option<NamedOrBlankNode>,
}

impl<W: Write> TurtleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            count: 0,
            prefixes: HashMap::new(),
            prefix_written: false,
            open_subject: None,
        }
    }

    /// Write all registered prefixes (called before first triple).
    fn write_prefixes(&mut self) -> io::Result<()> {
        if self.prefix_written {
            return Ok(());
        }
        self.prefix_written = true;
        // Sort for deterministic output
        let mut prefixes: Vec<_> = self.prefixes.iter().collect();
        prefixes.sort_by_key(|(k, _)| (*k).clone());
        for (prefix, iri) in prefixes {
            writeln!(self.writer, "@prefix {prefix}: <{iri}> .")?;
        }
        if !self.prefixes.is_empty() {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    /// Try to compact an IRI using registered prefixes.
    fn compact_iri(&self, iri: &str) -> String {
        // Find longest matching prefix
        let mut best: Option<(&str, &str)> = None;
        for (prefix, ns) in &self.prefixes {
            if iri.starts_with(ns.as_str())
                && best.is_none_or(|(_, prev_ns)| ns.len() > prev_ns.len())
            {
                best = Some((prefix.as_str(), ns.as_str()));
            }
        }
        if let Some((prefix, ns)) = best {
            let local = &iri[ns.len()..];
            // Only compact if local name is valid (alphanumeric + _)
            if !local.is_empty() && local.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return format!("{prefix}:{local}");
            }
        }
        format!("<{iri}>")
    }

    fn term(&self, term: TermRef<'_>) -> String {
        match term {
            TermRef::NamedNode(node) => self.compact_iri(node.as_str()),
            TermRef::BlankNode(node) => format!("_:{}", node.as_str()),
            TermRef::Literal(lit) => {
                let escaped = escape_literal(lit.value());
                match lit.language() {
                    Some(lang) => format!("\"{escaped}\"@{lang}"),
                    None if lit.datatype() == xsd::STRING => format!("\"{escaped}\""),
                    None => format!("\"{escaped}\"^^{}", self.compact_iri(lit.datatype().as_str())),
                }
            }
            #[allow(unreachable_patterns)]
            other => other.to_string(),
        }
    }

    fn subject(&self, subject: NamedOrBlankNodeRef<'_>) -> String {
        match subject {
            NamedOrBlankNodeRef::NamedNode(node) => self.compact_iri(node.as_str()),
            NamedOrBlankNodeRef::BlankNode(node) => format!("_:{}", node.as_str()),
            #[allow(unreachable_patterns)]
            other => other.to_string(),
        }
    }

    fn predicate(&self, predicate: NamedNodeRef<'_>) -> String {
        if predicate == rdf::TYPE {
            "a".to_string()
        } else {
            self.compact_iri(predicate.as_str())
        }
    }

    fn close_statement(&mut self) -> io::Result<()> {
        if self.open_subject.take().is_some() {
            writeln!(self.writer, " .")?;
        }
        Ok(())
    }
}

impl<W: Write> TriplesEmitter for TurtleEmitter<W> {
    fn emit(&mut self, triple: TripleRef<'_>) -> io::Result<()> {
        self.write_prefixes()?;
        let p = self.predicate(triple.predicate);
        let o = self.term(triple.object);
        if self
            .open_subject
            .as_ref()
            .is_some_and(|open| open.as_ref() == triple.subject)
        {
            write!(self.writer, " ;\n    {p} {o}")?;
        } else {
            self.close_statement()?;
            let s = self.subject(triple.subject);
            write!(self.writer, "{s} {p} {o}")?;
            self.open_subject = Some(triple.subject.into_owned());
        }
        self.count += 1;
        Ok(())
    }

    fn add_prefix(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_prefixes()?;
        self.close_statement()?;
        self.writer.flush()
    }

    fn triple_count(&self) -> u64 {
        self.count
    }
}
