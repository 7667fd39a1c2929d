//! Per-building namespace IRIs.
//!
//! Building names come from file names and are not trusted to be IRI-safe.
//! The namespace IRI percent-encodes the name; the Turtle prefix label
//! replaces anything outside `[A-Za-z0-9_-]` with `_`.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::ontology::bldg;

/// Characters that need percent-encoding in IRI path segments.
/// We keep alphanumeric, -, _, ., ~ as unreserved per RFC 3987.
const IRI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The `http://buildsys.org/ontologies/<name>#` namespace of one building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingNamespace {
    name: String,
    prefix: String,
    iri: String,
}

impl BuildingNamespace {
    pub fn new(building: &str) -> Self {
        Self {
            name: building.to_string(),
            prefix: Self::prefix_label(building),
            iri: format!("{}{}#", bldg::NS_BASE, Self::escape(building)),
        }
    }

    /// The building name as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix label safe for a Turtle `@prefix` declaration.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace IRI, ending in `#`.
    pub fn iri(&self) -> &str {
        &self.iri
    }

    /// IRI for an entity local to this building.
    pub fn entity_iri(&self, local: &str) -> String {
        format!("{}{}", self.iri, Self::escape(local))
    }

    /// Escape a string for use in an IRI path segment.
    fn escape(value: &str) -> String {
        utf8_percent_encode(value, IRI_ENCODE_SET).to_string()
    }

    fn prefix_label(name: &str) -> String {
        let mut label: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        // PN_PREFIX must start with a letter
        if !label.starts_with(|c: char| c.is_ascii_alphabetic()) {
            label.insert(0, 'b');
        }
        label
    }
}

/// Building name for a graph file: the file name up to the first `.`.
pub fn building_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}
