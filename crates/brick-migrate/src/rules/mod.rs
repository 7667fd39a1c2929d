//! Graph rewrite rules and the ordered migration registry.

pub mod engine;
pub mod registry;

pub use engine::{apply_rule, apply_rules, Rule, PREFIXES};
pub use registry::RuleRegistry;
