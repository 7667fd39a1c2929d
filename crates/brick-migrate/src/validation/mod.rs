//! Shape-constraint validation.

pub mod report;
pub mod shacl;

pub use report::{UnsupportedConstraint, Validation, ValidationResult, ViolationSummary};
pub use shacl::validate;
