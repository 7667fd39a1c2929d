//! Validation results and their graph and text forms.

use std::fmt;

use oxigraph::model::vocab::rdf;
use oxigraph::model::{BlankNode, Literal, NamedNode, NamedNodeRef, Term, Triple};
use serde::Serialize;

use crate::model::ontology::sh;
use crate::model::Graph;

/// One constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationResult {
    pub focus_node: Term,
    pub result_path: Option<Term>,
    pub value: Option<Term>,
    pub source_shape: Term,
    pub constraint_component: NamedNode,
    pub severity: NamedNode,
    pub message: String,
}

impl ValidationResult {
    fn sort_key(&self) -> (String, String, String, String, String) {
        (
            self.focus_node.to_string(),
            self.source_shape.to_string(),
            self.constraint_component.as_str().to_string(),
            self.result_path.as_ref().map(Term::to_string).unwrap_or_default(),
            self.value.as_ref().map(Term::to_string).unwrap_or_default(),
        )
    }
}

/// A constraint parameter on an evaluated shape that the validator cannot
/// check. Its presence makes the validation incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnsupportedConstraint {
    pub shape: Term,
    pub parameter: NamedNode,
}

/// Outcome of validating one graph.
///
/// `conforms` is only true when no violation was found and every constraint
/// on every evaluated shape was actually checked.
#[derive(Debug, Clone)]
pub struct Validation {
    pub conforms: bool,
    pub results: Vec<ValidationResult>,
    pub unsupported: Vec<UnsupportedConstraint>,
    pub report: Graph,
}

impl Validation {
    pub fn new(results: Vec<ValidationResult>) -> Self {
        Self::with_unsupported(results, Vec::new())
    }

    pub fn with_unsupported(
        mut results: Vec<ValidationResult>,
        mut unsupported: Vec<UnsupportedConstraint>,
    ) -> Self {
        results.sort_by_cached_key(ValidationResult::sort_key);
        results.dedup();
        unsupported.sort_by_cached_key(|u| (u.shape.to_string(), u.parameter.to_string()));
        unsupported.dedup();
        let conforms = results.is_empty() && unsupported.is_empty();
        let report = report_graph(conforms, &results);
        Self {
            conforms,
            results,
            unsupported,
            report,
        }
    }

    /// True when some constraint could not be evaluated.
    pub fn is_incomplete(&self) -> bool {
        !self.unsupported.is_empty()
    }

    /// `(is_valid, report_graph)`.
    pub fn into_parts(self) -> (bool, Graph) {
        (self.conforms, self.report)
    }

    pub fn violations(&self) -> Vec<ViolationSummary> {
        self.results.iter().map(ViolationSummary::from).collect()
    }
}

fn local(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Encode results as an `sh:ValidationReport` graph.
fn report_graph(conforms: bool, results: &[ValidationResult]) -> Graph {
    let mut g = Graph::new();
    g.bind(sh::PREFIX, sh::NS);
    let report = BlankNode::new_unchecked("report");
    g.insert(&Triple::new(report.clone(), rdf::TYPE, sh::VALIDATION_REPORT.into_owned()));
    g.insert(&Triple::new(report.clone(), sh::CONFORMS, Literal::from(conforms)));
    for (i, r) in results.iter().enumerate() {
        let node = BlankNode::new_unchecked(format!("result{i}"));
        let mut add = |p: NamedNodeRef<'static>, o: Term| {
            g.insert(&Triple::new(node.clone(), p, o));
        };
        add(rdf::TYPE, sh::VALIDATION_RESULT.into_owned().into());
        add(sh::FOCUS_NODE, r.focus_node.clone());
        if let Some(path) = &r.result_path {
            add(sh::RESULT_PATH, path.clone());
        }
        if let Some(value) = &r.value {
            add(sh::VALUE, value.clone());
        }
        add(sh::SOURCE_SHAPE, r.source_shape.clone());
        add(sh::SOURCE_CONSTRAINT_COMPONENT, r.constraint_component.clone().into());
        add(sh::RESULT_SEVERITY, r.severity.clone().into());
        add(sh::RESULT_MESSAGE, Literal::new_simple_literal(&r.message).into());
        g.insert(&Triple::new(report.clone(), sh::RESULT, node));
    }
    g
}

/// Plain-text report in the layout validators conventionally print.
impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Report")?;
        writeln!(f, "Conforms: {}", if self.conforms { "True" } else { "False" })?;
        if !self.unsupported.is_empty() {
            writeln!(f, "Unsupported constraints ({}):", self.unsupported.len())?;
            for u in &self.unsupported {
                writeln!(f, "\tsh:{} on {}", local(u.parameter.as_str()), u.shape)?;
            }
        }
        if self.results.is_empty() {
            return Ok(());
        }
        writeln!(f, "Results ({}):", self.results.len())?;
        for r in &self.results {
            let component = r.constraint_component.as_str();
            writeln!(f, "Constraint Violation in {} ({}):", local(component), component)?;
            writeln!(f, "\tSeverity: sh:{}", local(r.severity.as_str()))?;
            writeln!(f, "\tSource Shape: {}", r.source_shape)?;
            writeln!(f, "\tFocus Node: {}", r.focus_node)?;
            if let Some(value) = &r.value {
                writeln!(f, "\tValue Node: {value}")?;
            }
            if let Some(path) = &r.result_path {
                writeln!(f, "\tResult Path: {path}")?;
            }
            writeln!(f, "\tMessage: {}", r.message)?;
        }
        Ok(())
    }
}

/// Serializable view of a [`ValidationResult`] for structured batch output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationSummary {
    pub focus_node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub component: String,
    pub message: String,
}

impl From<&ValidationResult> for ViolationSummary {
    fn from(r: &ValidationResult) -> Self {
        Self {
            focus_node: r.focus_node.to_string(),
            path: r.result_path.as_ref().map(Term::to_string),
            value: r.value.as_ref().map(Term::to_string),
            component: local(r.constraint_component.as_str()).to_string(),
            message: r.message.clone(),
        }
    }
}
