//! Error types.
//!
//! [`OntologyError`] is fatal to a whole run. [`BuildingError`] is fatal to
//! one input file only; the batch driver reports it and moves on.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::Validation;

/// Errors while parsing a serialized graph.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(#[from] rio_turtle::TurtleError),

    #[error("unsupported RDF-star term in {0}")]
    QuotedTriple(&'static str),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors building the reference ontology. Nothing downstream can run
/// without it.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("fetch of {url} failed after {attempts} attempt(s): {message}")]
    Fetch {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid imports archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("could not parse ontology document {document}: {source}")]
    Parse {
        document: String,
        #[source]
        source: ParseError,
    },
}

/// Errors from the in-memory quad store and the SPARQL requests run on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store error: {message}")]
    Storage { message: String },

    #[error("SPARQL error in {request}: {message}")]
    Sparql { request: String, message: String },
}

/// Why the single repair attempt could not be made.
///
/// The repair handles exactly one plain literal that should have been an
/// integer. Anything else is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("validation failed but no untyped numeric value was reported")]
    NoCandidate,

    #[error("expected exactly 1 untyped numeric value in the report, found {count}")]
    AmbiguousCandidates { count: usize },

    #[error("reported value \"{value}\" is not an integer")]
    NotAnInteger { value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that abort processing of one building graph.
#[derive(Debug, Error)]
pub enum BuildingError {
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("repair refused: {source}")]
    Repair {
        #[source]
        source: RepairError,
        report: Option<Box<Validation>>,
    },

    #[error("graph still invalid after repair ({} violation(s))", report.results.len())]
    Unrepairable { report: Box<Validation> },

    #[error("graph store failure: {0}")]
    Store(#[from] StoreError),

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildingError {
    /// The validation report attached to the failure, if any.
    pub fn report(&self) -> Option<&Validation> {
        match self {
            BuildingError::Unrepairable { report } => Some(report),
            BuildingError::Repair { report, .. } => report.as_deref(),
            _ => None,
        }
    }
}

/// Errors that stop a batch before any file is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot list input directory {}: {source}", path.display())]
    ListInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create directory {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown output format: {0}. Use 'turtle' or 'ntriples'.")]
    UnknownFormat(String),
}
