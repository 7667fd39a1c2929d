//! Single-shot repair of one untyped numeric value.
//!
//! ```text
//! Unvalidated -> Valid                                   (terminal)
//! Unvalidated -> Invalid -> Patched -> Revalidated       (terminal, ok or not)
//! ```
//!
//! The only failure recognized is a `brick:value` holding a plain string
//! literal where the shapes require a datatype. Exactly one such violation
//! must be reported; the repair replaces that literal with the integer-typed
//! literal of the same value on the offending node and validates once more.
//! There is no second attempt.

use oxigraph::model::vocab::xsd;
use oxigraph::model::{GraphNameRef, Literal, NamedOrBlankNode, QuadRef, Term};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;

use crate::error::{RepairError, StoreError};
use crate::model::ontology::{brick, sh};
use crate::model::term::{canonical_integer, is_string};
use crate::model::union::{compose, snapshot};
use crate::model::Graph;
use crate::validation::{self, Validation};

/// A single literal replacement on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericPatch {
    pub node: NamedOrBlankNode,
    pub old: Literal,
    pub new: Literal,
}

impl NumericPatch {
    /// Swap `node brick:value old` for `node brick:value new` in the default
    /// graph of `store`. Nothing is inserted when the old triple is absent.
    ///
    /// Returns whether the replacement happened.
    pub fn apply(&self, store: &Store) -> Result<bool, StoreError> {
        let storage = |e: oxigraph::store::StorageError| StoreError::Storage {
            message: format!("numeric patch failed: {e}"),
        };
        let old = QuadRef::new(
            self.node.as_ref(),
            brick::VALUE,
            self.old.as_ref(),
            GraphNameRef::DefaultGraph,
        );
        if !store.contains(old).map_err(storage)? {
            return Ok(false);
        }
        store.remove(old).map_err(storage)?;
        let new = QuadRef::new(
            self.node.as_ref(),
            brick::VALUE,
            self.new.as_ref(),
            GraphNameRef::DefaultGraph,
        );
        store.insert(new).map_err(storage)?;
        Ok(true)
    }
}

/// Datatype violations on `brick:value`, with the reported value.
fn candidate_query() -> String {
    format!(
        "SELECT DISTINCT ?node ?value WHERE {{
            ?result a <{result}> ;
                    <{component}> <{datatype}> ;
                    <{path}> <{value}> ;
                    <{focus}> ?node ;
                    <{value_of}> ?value .
        }}",
        result = sh::VALIDATION_RESULT.as_str(),
        component = sh::SOURCE_CONSTRAINT_COMPONENT.as_str(),
        datatype = sh::DATATYPE_COMPONENT.as_str(),
        path = sh::RESULT_PATH.as_str(),
        value = brick::VALUE.as_str(),
        focus = sh::FOCUS_NODE.as_str(),
        value_of = sh::VALUE.as_str(),
    )
}

fn candidates(report: &Graph) -> Result<Vec<(NamedOrBlankNode, Literal)>, StoreError> {
    let failed = |message: String| StoreError::Sparql {
        request: "numeric value candidates".to_string(),
        message,
    };
    let store = compose(&[report])?;
    let results = SparqlEvaluator::new()
        .parse_query(&candidate_query())
        .map_err(|e| failed(e.to_string()))?
        .on_store(&store)
        .execute()
        .map_err(|e| failed(e.to_string()))?;

    let mut found = Vec::new();
    if let QueryResults::Solutions(solutions) = results {
        for solution in solutions {
            let solution = solution.map_err(|e| failed(e.to_string()))?;
            let node: NamedOrBlankNode = match solution.get("node") {
                Some(Term::NamedNode(node)) => node.clone().into(),
                Some(Term::BlankNode(node)) => node.clone().into(),
                _ => continue,
            };
            if let Some(Term::Literal(value)) = solution.get("value") {
                if is_string(value.as_ref()) {
                    found.push((node, value.clone()));
                }
            }
        }
    }
    found.sort_by_cached_key(|(node, value)| (node.to_string(), value.to_string()));
    found.dedup();
    Ok(found)
}

/// Find the one repairable violation in a report graph.
///
/// Fails with [`RepairError::NoCandidate`] or
/// [`RepairError::AmbiguousCandidates`] unless exactly one plain-literal
/// `brick:value` datatype violation is reported, and with
/// [`RepairError::NotAnInteger`] if that value is not an integer. Integers
/// of any magnitude are accepted.
pub fn find_numeric_patch(report: &Graph) -> Result<NumericPatch, RepairError> {
    let mut found = candidates(report)?;
    let (node, old) = match found.len() {
        0 => return Err(RepairError::NoCandidate),
        1 => found.remove(0),
        count => return Err(RepairError::AmbiguousCandidates { count }),
    };
    let digits = canonical_integer(old.value()).ok_or_else(|| RepairError::NotAnInteger {
        value: old.value().to_string(),
    })?;
    Ok(NumericPatch {
        node,
        old,
        new: Literal::new_typed_literal(digits, xsd::INTEGER),
    })
}

/// Where a graph is in the validate/repair cycle.
#[derive(Debug, Clone)]
pub enum RepairState {
    Unvalidated,
    /// First validation passed.
    Valid(Validation),
    /// First validation failed.
    Invalid(Validation),
    /// The patch has been applied but not yet checked.
    Patched {
        initial: Validation,
        patch: NumericPatch,
    },
    /// Validation after the patch; `report.conforms` says whether it worked.
    Revalidated {
        initial: Validation,
        patch: NumericPatch,
        report: Validation,
    },
}

impl RepairState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RepairState::Valid(_) | RepairState::Revalidated { .. })
    }

    /// True in `Valid` and in a conforming `Revalidated`.
    pub fn is_valid(&self) -> bool {
        match self {
            RepairState::Valid(_) => true,
            RepairState::Revalidated { report, .. } => report.conforms,
            _ => false,
        }
    }

    /// The patch applied, if the graph went through a repair.
    pub fn patch(&self) -> Option<&NumericPatch> {
        match self {
            RepairState::Patched { patch, .. } | RepairState::Revalidated { patch, .. } => {
                Some(patch)
            }
            _ => None,
        }
    }

    /// Advance one transition. Terminal states are returned unchanged.
    ///
    /// Leaving `Invalid` fails without touching `store` when the report does
    /// not hold exactly one repairable violation.
    pub fn step(self, store: &Store) -> Result<RepairState, RepairError> {
        match self {
            RepairState::Unvalidated => {
                let validation = validation::validate(&snapshot(store)?);
                Ok(if validation.conforms {
                    RepairState::Valid(validation)
                } else {
                    RepairState::Invalid(validation)
                })
            }
            RepairState::Invalid(initial) => {
                let patch = find_numeric_patch(&initial.report)?;
                let replaced = patch.apply(store)?;
                tracing::info!(
                    node = %patch.node,
                    old = patch.old.value(),
                    replaced,
                    "patched untyped numeric value"
                );
                Ok(RepairState::Patched { initial, patch })
            }
            RepairState::Patched { initial, patch } => {
                let report = validation::validate(&snapshot(store)?);
                Ok(RepairState::Revalidated {
                    initial,
                    patch,
                    report,
                })
            }
            terminal => Ok(terminal),
        }
    }
}

/// Validate the union graph in `store` and, if needed, make the single
/// repair attempt.
///
/// Returns the terminal state; check [`RepairState::is_valid`].
pub fn validate_and_repair(store: &Store) -> Result<RepairState, RepairError> {
    let mut state = RepairState::Unvalidated;
    while !state.is_terminal() {
        state = state.step(store)?;
    }
    Ok(state)
}
