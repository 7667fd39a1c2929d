pub mod graph;
pub mod iri;
pub mod ontology;
pub mod term;
pub mod union;

pub use graph::Graph;
pub use oxigraph::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
