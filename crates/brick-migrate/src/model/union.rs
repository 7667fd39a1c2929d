//! Composition of building data with the reference ontology.
//!
//! The union graph lives in an in-memory [`Store`] so the migration rules
//! can run as SPARQL Update against it. The clean graph is what is left of
//! the store's default graph once the ontology is subtracted again.

use oxigraph::model::{GraphNameRef, Quad, QuadRef, TripleRef};
use oxigraph::store::{StorageError, Store};

use super::graph::Graph;
use super::iri::BuildingNamespace;
use crate::error::StoreError;

fn storage(action: &str) -> impl Fn(StorageError) -> StoreError + '_ {
    move |e| StoreError::Storage {
        message: format!("{action} failed: {e}"),
    }
}

fn triple_of(quad: &Quad) -> TripleRef<'_> {
    TripleRef::new(quad.subject.as_ref(), quad.predicate.as_ref(), quad.object.as_ref())
}

/// Load `graphs` into the default graph of a fresh store: `data ∪ ontology`.
pub fn compose(graphs: &[&Graph]) -> Result<Store, StoreError> {
    let store = Store::new().map_err(storage("store creation"))?;
    for graph in graphs {
        for t in graph.iter() {
            let quad = QuadRef::new(t.subject, t.predicate, t.object, GraphNameRef::DefaultGraph);
            store.insert(quad).map_err(storage("insert"))?;
        }
    }
    Ok(store)
}

/// The store's default graph as a [`Graph`].
pub fn snapshot(store: &Store) -> Result<Graph, StoreError> {
    let mut graph = Graph::new();
    for quad in store.quads_for_pattern(None, None, None, Some(GraphNameRef::DefaultGraph)) {
        let quad = quad.map_err(storage("scan"))?;
        graph.insert(triple_of(&quad));
    }
    Ok(graph)
}

/// `full − ontology`: only the building's own triples.
pub fn extract_clean(store: &Store, ontology: &Graph) -> Result<Graph, StoreError> {
    let mut clean = Graph::new();
    for quad in store.quads_for_pattern(None, None, None, Some(GraphNameRef::DefaultGraph)) {
        let quad = quad.map_err(storage("scan"))?;
        let triple = triple_of(&quad);
        if !ontology.contains(triple) {
            clean.insert(triple);
        }
    }
    Ok(clean)
}

/// Bind the building's namespace prefix on `graph` for serialization.
///
/// Returns the namespace that was bound so callers can mint IRIs in it.
pub fn rename_namespace(graph: &mut Graph, building: &str) -> BuildingNamespace {
    let ns = BuildingNamespace::new(building);
    graph.bind(ns.prefix(), ns.iri());
    ns
}
