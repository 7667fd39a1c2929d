pub mod batch;
pub mod config;
pub mod emitter;
pub mod error;
pub mod model;
pub mod ontology_loader;
pub mod parser;
pub mod repair;
pub mod rules;
pub mod update;
pub mod validation;
