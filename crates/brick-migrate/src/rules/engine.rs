//! Graph rewrite rules run as SPARQL Update against the union store.
//!
//! A rule is a named `DELETE { .. } INSERT { .. } WHERE { .. }` or
//! `INSERT DATA { .. }` request. SPARQL Update gives the rewrite semantics
//! the migration relies on: every solution of the `WHERE` clause is found
//! first, then all instantiated delete templates are removed, then all
//! instantiated insert templates are added. A rule that matches nothing
//! leaves the store unchanged.

use oxigraph::sparql::SparqlEvaluator;
use oxigraph::store::Store;
use tracing::debug;

use crate::error::StoreError;
use crate::model::ontology::{brick, sh, standard, unit};

/// Prefix declarations available to every rule body.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", standard::RDF),
    ("rdfs", standard::RDFS),
    ("xsd", standard::XSD),
    ("owl", standard::OWL),
    (brick::PREFIX, brick::NS),
    (unit::PREFIX, unit::NS),
    (sh::PREFIX, sh::NS),
];

/// A named SPARQL Update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    body: String,
}

impl Rule {
    /// `body` is an update request without prefix declarations; the
    /// prefixes in [`PREFIXES`] are declared for it.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full request text sent to the store.
    pub fn request(&self) -> String {
        let mut request = String::new();
        for (prefix, ns) in PREFIXES {
            request.push_str(&format!("PREFIX {prefix}: <{ns}>\n"));
        }
        request.push_str(&self.body);
        request
    }

    /// Run the rule once against the default graph of `store`.
    pub fn apply(&self, store: &Store) -> Result<(), StoreError> {
        let failed = |message: String| StoreError::Sparql {
            request: self.name.clone(),
            message,
        };
        SparqlEvaluator::new()
            .parse_update(&self.request())
            .map_err(|e| failed(e.to_string()))?
            .on_store(store)
            .execute()
            .map_err(|e| failed(e.to_string()))?;
        debug!(rule = %self.name, "rule applied");
        Ok(())
    }
}

/// Apply one rule.
pub fn apply_rule(store: &Store, rule: &Rule) -> Result<(), StoreError> {
    rule.apply(store)
}

/// Apply `rules` strictly in order, stopping at the first failure.
pub fn apply_rules(store: &Store, rules: &[Rule]) -> Result<(), StoreError> {
    rules.iter().try_for_each(|rule| rule.apply(store))
}
