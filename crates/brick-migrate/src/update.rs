//! Per-building workspace: the union of one building graph with the
//! reference ontology, held in an in-memory store, rewritten in place and
//! finally reduced back to the building's own triples.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use oxigraph::store::Store;

use crate::emitter::{write_graph, OutputFormat};
use crate::error::{BuildingError, RepairError, StoreError};
use crate::model::ontology::{brick, standard, unit};
use crate::model::union::{compose, extract_clean, rename_namespace, snapshot};
use crate::model::Graph;
use crate::repair::{self, RepairState};
use crate::rules::{apply_rules, Rule};
use crate::validation::{self, Validation};

pub struct UpdateInterface<'o> {
    name: String,
    ontology: &'o Graph,
    store: Store,
}

impl<'o> UpdateInterface<'o> {
    /// Start a workspace for building `name` from its parsed `data`.
    pub fn new(name: &str, data: &Graph, ontology: &'o Graph) -> Result<Self, StoreError> {
        Ok(Self {
            name: name.to_string(),
            ontology,
            store: compose(&[data, ontology])?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The store holding the union graph in its default graph.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The union graph as it currently stands.
    pub fn full_graph(&self) -> Result<Graph, StoreError> {
        snapshot(&self.store)
    }

    /// Apply `rules` in order.
    pub fn apply_rules(&self, rules: &[Rule]) -> Result<(), StoreError> {
        apply_rules(&self.store, rules)
    }

    pub fn validate(&self) -> Result<Validation, StoreError> {
        Ok(validation::validate(&self.full_graph()?))
    }

    /// Advance the repair state machine by one transition on this graph.
    pub fn step_repair(&self, state: RepairState) -> Result<RepairState, RepairError> {
        state.step(&self.store)
    }

    /// Validate and make the single repair attempt if needed.
    pub fn validate_and_repair(&self) -> Result<RepairState, RepairError> {
        repair::validate_and_repair(&self.store)
    }

    /// `full − ontology`, with the building and vocabulary prefixes bound.
    pub fn clean_graph(&self) -> Result<Graph, StoreError> {
        let mut clean = extract_clean(&self.store, self.ontology)?;
        bind_prefixes(&mut clean, &self.name);
        Ok(clean)
    }

    /// Serialize the clean graph to `path`. Returns the triple count.
    pub fn save_clean_graph(&self, path: &Path, format: OutputFormat) -> Result<u64, BuildingError> {
        let clean = self.clean_graph()?;
        save_graph(&clean, path, format)
    }
}

/// Bind the vocabulary prefixes and the building's own prefix on `graph`.
pub fn bind_prefixes(graph: &mut Graph, building: &str) {
    for (prefix, ns) in [
        ("rdf", standard::RDF),
        ("rdfs", standard::RDFS),
        ("xsd", standard::XSD),
        ("owl", standard::OWL),
        (brick::PREFIX, brick::NS),
        (unit::PREFIX, unit::NS),
    ] {
        graph.bind(prefix, ns);
    }
    rename_namespace(graph, building);
}

/// Write `graph` to `path` in `format`. Returns the triple count.
pub fn save_graph(graph: &Graph, path: &Path, format: OutputFormat) -> Result<u64, BuildingError> {
    let write_err = |source| BuildingError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    write_graph(BufWriter::new(file), graph, format).map_err(write_err)
}
