pub mod ntriples;
pub mod turtle;

use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use oxigraph::model::TripleRef;

use crate::model::Graph;

use self::ntriples::NTriplesEmitter;
use self::turtle::TurtleEmitter;

/// Trait for emitting RDF triples in different serialization formats.
pub trait TriplesEmitter {
    /// Emit one triple.
    fn emit(&mut self, triple: TripleRef<'_>) -> io::Result<()>;
    /// Register a namespace prefix (used by Turtle format).
    fn add_prefix(&mut self, prefix: &str, iri: &str) -> io::Result<()>;
    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;
    /// Return the number of triples emitted so far.
    fn triple_count(&self) -> u64;
}

/// Output serialization for clean graphs and report dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Turtle,
    NTriples,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "turtle" | "ttl" => Ok(OutputFormat::Turtle),
            "ntriples" | "nt" => Ok(OutputFormat::NTriples),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

impl OutputFormat {
    /// File extension for graphs written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Turtle => "ttl",
            OutputFormat::NTriples => "nt",
        }
    }
}

/// Emit every triple of `graph`, with its prefixes, in a stable order.
pub fn emit_graph<E: TriplesEmitter>(emitter: &mut E, graph: &Graph) -> io::Result<u64> {
    for (prefix, iri) in graph.prefixes() {
        emitter.add_prefix(prefix, iri)?;
    }
    for triple in graph.sorted() {
        emitter.emit(triple)?;
    }
    emitter.flush()?;
    Ok(emitter.triple_count())
}

/// Serialize `graph` to `writer` in the requested format.
pub fn write_graph<W: Write>(writer: W, graph: &Graph, format: OutputFormat) -> io::Result<u64> {
    match format {
        OutputFormat::Turtle => emit_graph(&mut TurtleEmitter::new(writer), graph),
        OutputFormat::NTriples => emit_graph(&mut NTriplesEmitter::new(writer), graph),
    }
}
