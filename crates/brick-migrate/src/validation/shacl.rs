//! SHACL Core evaluated over a single graph.
//!
//! Shapes are read from the graph being validated, so validating the union
//! of building data and ontology checks the building against the shapes the
//! ontology ships. Supported:
//!
//! - targets: `sh:targetClass` (with `rdfs:subClassOf*`), implicit class
//!   targets, `sh:targetNode`, `sh:targetSubjectsOf`, `sh:targetObjectsOf`
//! - paths: predicate, inverse, sequence, alternative, `sh:zeroOrMorePath`,
//!   `sh:oneOrMorePath`, `sh:zeroOrOnePath`
//! - value type: `sh:class`, `sh:datatype`, `sh:nodeKind`
//! - cardinality: `sh:minCount`, `sh:maxCount`
//! - value range: `sh:minInclusive`, `sh:maxInclusive`, `sh:minExclusive`,
//!   `sh:maxExclusive`
//! - string: `sh:minLength`, `sh:maxLength`, `sh:pattern` (with `sh:flags`),
//!   `sh:languageIn`, `sh:uniqueLang`
//! - property pairs: `sh:equals`, `sh:disjoint`
//! - logical: `sh:not`, `sh:and`, `sh:or`, `sh:xone`
//! - shape-based: `sh:node`, `sh:property`, `sh:qualifiedValueShape`
//! - other: `sh:closed`, `sh:ignoredProperties`, `sh:hasValue`, `sh:in`
//!
//! Violations found through `sh:node` are reported directly, with the value
//! node as focus node. Any other `sh:` parameter on a shape that gets
//! evaluated (`sh:sparql`, `sh:target`, ...) cannot be checked: it is logged
//! once and the validation is marked incomplete, which keeps it from
//! conforming.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::report::{UnsupportedConstraint, Validation, ValidationResult};
use crate::model::ontology::{sh, standard};
use crate::model::term::{is_well_formed, numeric_value, str_value};
use crate::model::Graph;

/// Nesting limit for shape and path recursion.
const MAX_DEPTH: usize = 32;

/// Parameters the validator evaluates.
const CHECKED: &[NamedNodeRef<'static>] = &[
    sh::TARGET_CLASS,
    sh::TARGET_NODE,
    sh::TARGET_SUBJECTS_OF,
    sh::TARGET_OBJECTS_OF,
    sh::DEACTIVATED,
    sh::PROPERTY,
    sh::SEVERITY,
    sh::MESSAGE,
    sh::PATH,
    sh::MIN_COUNT,
    sh::MAX_COUNT,
    sh::DATATYPE,
    sh::CLASS,
    sh::NODE_KIND,
    sh::IN,
    sh::HAS_VALUE,
    sh::NODE,
    sh::NOT,
    sh::AND,
    sh::OR,
    sh::XONE,
    sh::PATTERN,
    sh::FLAGS,
    sh::MIN_LENGTH,
    sh::MAX_LENGTH,
    sh::MIN_INCLUSIVE,
    sh::MAX_INCLUSIVE,
    sh::MIN_EXCLUSIVE,
    sh::MAX_EXCLUSIVE,
    sh::LANGUAGE_IN,
    sh::UNIQUE_LANG,
    sh::EQUALS,
    sh::DISJOINT,
    sh::CLOSED,
    sh::IGNORED_PROPERTIES,
    sh::QUALIFIED_VALUE_SHAPE,
    sh::QUALIFIED_MIN_COUNT,
    sh::QUALIFIED_MAX_COUNT,
    sh::QUALIFIED_VALUE_SHAPES_DISJOINT,
];

/// Range parameters with their component, operator and accepted ordering.
const RANGES: [(NamedNodeRef<'static>, NamedNodeRef<'static>, &str, fn(Ordering) -> bool); 4] = [
    (sh::MIN_INCLUSIVE, sh::MIN_INCLUSIVE_COMPONENT, ">=", Ordering::is_ge),
    (sh::MAX_INCLUSIVE, sh::MAX_INCLUSIVE_COMPONENT, "<=", Ordering::is_le),
    (sh::MIN_EXCLUSIVE, sh::MIN_EXCLUSIVE_COMPONENT, ">", Ordering::is_gt),
    (sh::MAX_EXCLUSIVE, sh::MAX_EXCLUSIVE_COMPONENT, "<", Ordering::is_lt),
];

/// `sh:` terms that annotate shapes without constraining anything.
const NON_VALIDATING: &[&str] = &[
    "name",
    "description",
    "order",
    "group",
    "defaultValue",
    "rule",
    "declare",
    "prefixes",
    "shapesGraph",
    "suggestedShapesGraph",
];

/// Validate `graph` against the shapes it contains.
pub fn validate(graph: &Graph) -> Validation {
    let mut validator = Validator::new(graph);
    validator.run();
    let validation = Validation::with_unsupported(validator.results, validator.unsupported);
    debug!(
        conforms = validation.conforms,
        violations = validation.results.len(),
        unsupported = validation.unsupported.len(),
        "validation finished"
    );
    validation
}

#[derive(Debug, Clone)]
enum Path {
    Predicate(NamedNode),
    Inverse(Box<Path>),
    Sequence(Vec<Path>),
    Alternative(Vec<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    ZeroOrOne(Box<Path>),
}

struct Validator<'g> {
    graph: &'g Graph,
    subclasses: HashMap<Term, HashSet<Term>>,
    superclasses: HashMap<Term, HashSet<Term>>,
    audited: HashSet<Term>,
    results: Vec<ValidationResult>,
    unsupported: Vec<UnsupportedConstraint>,
}

fn named(term: &Term) -> Option<&NamedNode> {
    match term {
        Term::NamedNode(node) => Some(node),
        _ => None,
    }
}

fn as_count(term: &Term) -> Option<usize> {
    match term {
        Term::Literal(l) => l.value().trim().parse().ok(),
        _ => None,
    }
}

fn is_true(term: &Term) -> bool {
    matches!(term, Term::Literal(l) if l.value() == "true")
}

fn sorted(values: HashSet<Term>) -> Vec<Term> {
    let mut values: Vec<Term> = values.into_iter().collect();
    values.sort_by_cached_key(Term::to_string);
    values
}

impl<'g> Validator<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            subclasses: HashMap::new(),
            superclasses: HashMap::new(),
            audited: HashSet::new(),
            results: Vec::new(),
            unsupported: Vec::new(),
        }
    }

    fn run(&mut self) {
        for shape in self.shapes() {
            if self.is_deactivated(&shape) {
                continue;
            }
            for focus in self.focus_nodes(&shape) {
                let mut visiting = HashSet::new();
                self.check_shape(&shape, &focus, 0, &mut visiting);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Shapes and targets
    // -----------------------------------------------------------------------

    fn shapes(&self) -> Vec<Term> {
        let mut shapes = HashSet::new();
        for kind in [sh::NODE_SHAPE, sh::PROPERTY_SHAPE] {
            shapes.extend(self.graph.subjects(rdf::TYPE, &kind.into_owned().into()));
        }
        for target in [
            sh::TARGET_CLASS,
            sh::TARGET_NODE,
            sh::TARGET_SUBJECTS_OF,
            sh::TARGET_OBJECTS_OF,
        ] {
            shapes.extend(
                self.graph
                    .triples_for_predicate(target)
                    .into_iter()
                    .map(|t| Term::from(t.subject.into_owned())),
            );
        }
        sorted(shapes)
    }

    fn is_deactivated(&self, shape: &Term) -> bool {
        self.graph.objects(shape, sh::DEACTIVATED).iter().any(is_true)
    }

    fn focus_nodes(&mut self, shape: &Term) -> Vec<Term> {
        let g = self.graph;
        let mut focus = HashSet::new();

        let mut classes = g.objects(shape, sh::TARGET_CLASS);
        let types = g.objects(shape, rdf::TYPE);
        let is_class = types.iter().any(|t| {
            named(t).is_some_and(|t| t.as_ref() == standard::OWL_CLASS || t.as_ref() == rdfs::CLASS)
        });
        if is_class {
            classes.push(shape.clone());
        }
        for class in classes {
            focus.extend(self.instances_of(&class));
        }

        focus.extend(g.objects(shape, sh::TARGET_NODE));
        for predicate in g.objects(shape, sh::TARGET_SUBJECTS_OF) {
            if let Some(predicate) = named(&predicate) {
                focus.extend(
                    g.triples_for_predicate(predicate.as_ref())
                        .into_iter()
                        .map(|t| Term::from(t.subject.into_owned())),
                );
            }
        }
        for predicate in g.objects(shape, sh::TARGET_OBJECTS_OF) {
            if let Some(predicate) = named(&predicate) {
                focus.extend(
                    g.triples_for_predicate(predicate.as_ref())
                        .into_iter()
                        .map(|t| t.object.into_owned()),
                );
            }
        }
        sorted(focus)
    }

    /// Record every `sh:` parameter on `shape` that is not evaluated.
    fn audit(&mut self, shape: &Term) {
        if !self.audited.insert(shape.clone()) {
            return;
        }
        let g = self.graph;
        for t in g.triples_for_subject(shape) {
            let parameter = t.predicate;
            let Some(local) = parameter.as_str().strip_prefix(sh::NS) else {
                continue;
            };
            let skipped = if parameter == sh::QUALIFIED_VALUE_SHAPES_DISJOINT {
                is_true(&t.object.into_owned())
            } else {
                !CHECKED.contains(&parameter) && !NON_VALIDATING.contains(&local)
            };
            if skipped {
                self.mark_unsupported(shape, parameter);
            }
        }
    }

    fn mark_unsupported(&mut self, shape: &Term, parameter: NamedNodeRef<'_>) {
        let entry = UnsupportedConstraint {
            shape: shape.clone(),
            parameter: parameter.into_owned(),
        };
        if self.unsupported.contains(&entry) {
            return;
        }
        warn!(
            shape = %shape,
            parameter = %parameter,
            "constraint not supported, validation is incomplete"
        );
        self.unsupported.push(entry);
    }

    // -----------------------------------------------------------------------
    // Class hierarchy
    // -----------------------------------------------------------------------

    /// `class` and everything below it via `rdfs:subClassOf`.
    fn subclass_closure(&mut self, class: &Term) -> HashSet<Term> {
        if let Some(cached) = self.subclasses.get(class) {
            return cached.clone();
        }
        let mut seen = HashSet::from([class.clone()]);
        let mut queue = VecDeque::from([class.clone()]);
        while let Some(c) = queue.pop_front() {
            for sub in self.graph.subjects(rdfs::SUB_CLASS_OF, &c) {
                if seen.insert(sub.clone()) {
                    queue.push_back(sub);
                }
            }
        }
        self.subclasses.insert(class.clone(), seen.clone());
        seen
    }

    /// `class` and everything above it via `rdfs:subClassOf`.
    fn superclass_closure(&mut self, class: &Term) -> HashSet<Term> {
        if let Some(cached) = self.superclasses.get(class) {
            return cached.clone();
        }
        let mut seen = HashSet::from([class.clone()]);
        let mut queue = VecDeque::from([class.clone()]);
        while let Some(c) = queue.pop_front() {
            for sup in self.graph.objects(&c, rdfs::SUB_CLASS_OF) {
                if seen.insert(sup.clone()) {
                    queue.push_back(sup);
                }
            }
        }
        self.superclasses.insert(class.clone(), seen.clone());
        seen
    }

    fn instances_of(&mut self, class: &Term) -> Vec<Term> {
        let mut out = Vec::new();
        for c in self.subclass_closure(class) {
            out.extend(self.graph.subjects(rdf::TYPE, &c));
        }
        out
    }

    fn is_instance(&mut self, node: &Term, class: &Term) -> bool {
        let types = self.graph.objects(node, rdf::TYPE);
        types
            .iter()
            .any(|t| self.superclass_closure(t).contains(class))
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    fn parse_path(&self, node: &Term, depth: usize) -> Option<Path> {
        if depth > MAX_DEPTH {
            return None;
        }
        let g = self.graph;
        let inner = |p: NamedNodeRef<'static>| {
            g.object(node, p)
                .and_then(|inner| self.parse_path(&inner, depth + 1))
                .map(Box::new)
        };
        if g.object(node, rdf::FIRST).is_some() {
            let steps = self
                .list_members(node)
                .iter()
                .map(|step| self.parse_path(step, depth + 1))
                .collect::<Option<Vec<_>>>()?;
            return (!steps.is_empty()).then_some(Path::Sequence(steps));
        }
        if let Some(list) = g.object(node, sh::ALTERNATIVE_PATH) {
            let options = self
                .list_members(&list)
                .iter()
                .map(|option| self.parse_path(option, depth + 1))
                .collect::<Option<Vec<_>>>()?;
            return (!options.is_empty()).then_some(Path::Alternative(options));
        }
        if g.object(node, sh::INVERSE_PATH).is_some() {
            return inner(sh::INVERSE_PATH).map(Path::Inverse);
        }
        if g.object(node, sh::ZERO_OR_MORE_PATH).is_some() {
            return inner(sh::ZERO_OR_MORE_PATH).map(Path::ZeroOrMore);
        }
        if g.object(node, sh::ONE_OR_MORE_PATH).is_some() {
            return inner(sh::ONE_OR_MORE_PATH).map(Path::OneOrMore);
        }
        if g.object(node, sh::ZERO_OR_ONE_PATH).is_some() {
            return inner(sh::ZERO_OR_ONE_PATH).map(Path::ZeroOrOne);
        }
        named(node).map(|p| Path::Predicate(p.clone()))
    }

    /// Nodes reached from `start` along `path`, or against it when `inverse`.
    fn walk(&self, path: &Path, start: &HashSet<Term>, inverse: bool) -> HashSet<Term> {
        match path {
            Path::Predicate(p) => start
                .iter()
                .flat_map(|n| {
                    if inverse {
                        self.graph.subjects(p.as_ref(), n)
                    } else {
                        self.graph.objects(n, p.as_ref())
                    }
                })
                .collect(),
            Path::Inverse(inner) => self.walk(inner, start, !inverse),
            Path::Sequence(steps) => {
                let mut order: Vec<&Path> = steps.iter().collect();
                if inverse {
                    order.reverse();
                }
                order
                    .into_iter()
                    .fold(start.clone(), |current, step| self.walk(step, &current, inverse))
            }
            Path::Alternative(options) => options
                .iter()
                .flat_map(|option| self.walk(option, start, inverse))
                .collect(),
            Path::ZeroOrOne(inner) => {
                let mut out = start.clone();
                out.extend(self.walk(inner, start, inverse));
                out
            }
            Path::ZeroOrMore(inner) => self.closure(inner, start, inverse, true),
            Path::OneOrMore(inner) => self.closure(inner, start, inverse, false),
        }
    }

    fn closure(
        &self,
        step: &Path,
        start: &HashSet<Term>,
        inverse: bool,
        reflexive: bool,
    ) -> HashSet<Term> {
        let mut out = if reflexive { start.clone() } else { HashSet::new() };
        let mut frontier = self.walk(step, start, inverse);
        while !frontier.is_empty() {
            let fresh: HashSet<Term> = frontier
                .into_iter()
                .filter(|n| out.insert(n.clone()))
                .collect();
            frontier = self.walk(step, &fresh, inverse);
        }
        out
    }

    // -----------------------------------------------------------------------
    // Constraint evaluation
    // -----------------------------------------------------------------------

    fn check_shape(
        &mut self,
        shape: &Term,
        focus: &Term,
        depth: usize,
        visiting: &mut HashSet<(Term, Term)>,
    ) {
        if depth > MAX_DEPTH || self.is_deactivated(shape) {
            return;
        }
        if !visiting.insert((shape.clone(), focus.clone())) {
            return;
        }
        self.audit(shape);

        match self.graph.object(shape, sh::PATH) {
            Some(path_node) => match self.parse_path(&path_node, 0) {
                Some(path) => {
                    let start = HashSet::from([focus.clone()]);
                    let values = sorted(self.walk(&path, &start, false));
                    let ctx = Context {
                        shape,
                        focus,
                        path: Some(&path_node),
                    };
                    self.check_counts(&ctx, &values);
                    self.check_values(&ctx, &values, depth, visiting);
                }
                None => self.mark_unsupported(shape, sh::PATH),
            },
            None => {
                let ctx = Context {
                    shape,
                    focus,
                    path: None,
                };
                self.check_values(&ctx, &[focus.clone()], depth, visiting);
            }
        }

        for property in self.graph.objects(shape, sh::PROPERTY) {
            self.check_shape(&property, focus, depth + 1, visiting);
        }

        visiting.remove(&(shape.clone(), focus.clone()));
    }

    /// Whether `node` conforms to `shape`. Results found on the way are
    /// discarded.
    fn conforms_to(
        &mut self,
        shape: &Term,
        node: &Term,
        depth: usize,
        visiting: &mut HashSet<(Term, Term)>,
    ) -> bool {
        let outer = std::mem::take(&mut self.results);
        self.check_shape(shape, node, depth + 1, visiting);
        let conforms = self.results.is_empty();
        self.results = outer;
        conforms
    }

    fn check_counts(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        let min = g.object(ctx.shape, sh::MIN_COUNT).as_ref().and_then(as_count);
        let max = g.object(ctx.shape, sh::MAX_COUNT).as_ref().and_then(as_count);
        if let Some(min) = min.filter(|m| values.len() < *m) {
            let message = format!("Less than {min} values on {}->{}", ctx.focus, ctx.path_label());
            self.report(ctx, None, sh::MIN_COUNT_COMPONENT, message);
        }
        if let Some(max) = max.filter(|m| values.len() > *m) {
            let message = format!("More than {max} values on {}->{}", ctx.focus, ctx.path_label());
            self.report(ctx, None, sh::MAX_COUNT_COMPONENT, message);
        }
    }

    fn check_values(
        &mut self,
        ctx: &Context<'_>,
        values: &[Term],
        depth: usize,
        visiting: &mut HashSet<(Term, Term)>,
    ) {
        self.check_value_type(ctx, values);
        self.check_ranges(ctx, values);
        self.check_strings(ctx, values);
        self.check_pairs(ctx, values);
        self.check_enumerations(ctx, values);
        self.check_closed(ctx, values);
        self.check_logical(ctx, values, depth, visiting);
        self.check_qualified(ctx, values, depth, visiting);

        for node_shape in self.graph.objects(ctx.shape, sh::NODE) {
            for v in values {
                self.check_shape(&node_shape, v, depth + 1, visiting);
            }
        }
    }

    fn check_value_type(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        for datatype in g.objects(ctx.shape, sh::DATATYPE) {
            let Some(datatype) = named(&datatype) else { continue };
            for v in values {
                let ok = matches!(v, Term::Literal(l)
                    if l.datatype() == datatype.as_ref() && is_well_formed(l.as_ref()));
                if !ok {
                    let message = format!("Value {v} is not a literal of datatype {datatype}");
                    self.report(ctx, Some(v), sh::DATATYPE_COMPONENT, message);
                }
            }
        }

        for class in g.objects(ctx.shape, sh::CLASS) {
            for v in values {
                if !self.is_instance(v, &class) {
                    let message = format!("Value {v} does not have class {class}");
                    self.report(ctx, Some(v), sh::CLASS_COMPONENT, message);
                }
            }
        }

        for kind in g.objects(ctx.shape, sh::NODE_KIND) {
            let Some(kind) = named(&kind) else { continue };
            for v in values {
                if !node_kind_matches(kind.as_ref(), v) {
                    let message = format!("Value {v} is not of node kind {kind}");
                    self.report(ctx, Some(v), sh::NODE_KIND_COMPONENT, message);
                }
            }
        }
    }

    fn check_ranges(&mut self, ctx: &Context<'_>, values: &[Term]) {
        for (parameter, component, op, accepted) in RANGES {
            for bound in self.graph.objects(ctx.shape, parameter) {
                for v in values {
                    let ok = compare(v, &bound).is_some_and(accepted);
                    if !ok {
                        let message = format!("Value {v} is not {op} {bound}");
                        self.report(ctx, Some(v), component, message);
                    }
                }
            }
        }
    }

    fn check_strings(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        let lengths = [
            (sh::MIN_LENGTH, sh::MIN_LENGTH_COMPONENT, true),
            (sh::MAX_LENGTH, sh::MAX_LENGTH_COMPONENT, false),
        ];
        for (parameter, component, is_min) in lengths {
            let Some(limit) = g.object(ctx.shape, parameter).as_ref().and_then(as_count) else {
                continue;
            };
            for v in values {
                let ok = !matches!(v, Term::BlankNode(_)) && {
                    let len = str_value(v.as_ref()).chars().count();
                    if is_min { len >= limit } else { len <= limit }
                };
                if !ok {
                    let kind = if is_min { "shorter" } else { "longer" };
                    let message = format!("Value {v} is {kind} than {limit} characters");
                    self.report(ctx, Some(v), component, message);
                }
            }
        }

        for pattern in g.objects(ctx.shape, sh::PATTERN) {
            let Some(regex) = self.compile_pattern(ctx.shape, &pattern) else {
                continue;
            };
            for v in values {
                let ok = !matches!(v, Term::BlankNode(_)) && regex.is_match(str_value(v.as_ref()));
                if !ok {
                    let message = format!("Value {v} does not match pattern {pattern}");
                    self.report(ctx, Some(v), sh::PATTERN_COMPONENT, message);
                }
            }
        }

        for list in g.objects(ctx.shape, sh::LANGUAGE_IN) {
            let ranges: Vec<String> = self
                .list_members(&list)
                .iter()
                .map(|t| str_value(t.as_ref()).to_string())
                .collect();
            for v in values {
                let ok = matches!(v, Term::Literal(l)
                    if l.language().is_some_and(|tag| ranges.iter().any(|r| lang_matches(tag, r))));
                if !ok {
                    let message = format!("Language of value {v} is not in {}", ranges.join(", "));
                    self.report(ctx, Some(v), sh::LANGUAGE_IN_COMPONENT, message);
                }
            }
        }

        let unique = g.objects(ctx.shape, sh::UNIQUE_LANG).iter().any(is_true);
        if unique && ctx.path.is_some() {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for v in values {
                if let Term::Literal(l) = v {
                    if let Some(tag) = l.language() {
                        *seen.entry(tag.to_ascii_lowercase()).or_default() += 1;
                    }
                }
            }
            let mut duplicated: Vec<String> =
                seen.into_iter().filter(|(_, n)| *n > 1).map(|(tag, _)| tag).collect();
            duplicated.sort();
            for tag in duplicated {
                let message = format!("Language \"{tag}\" used more than once");
                self.report(ctx, None, sh::UNIQUE_LANG_COMPONENT, message);
            }
        }
    }

    fn compile_pattern(&mut self, shape: &Term, pattern: &Term) -> Option<Regex> {
        let flags = self
            .graph
            .object(shape, sh::FLAGS)
            .map(|f| str_value(f.as_ref()).to_string())
            .unwrap_or_default();
        let mut builder = RegexBuilder::new(str_value(pattern.as_ref()));
        builder
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'));
        match builder.build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(shape = %shape, pattern = %pattern, error = %e, "invalid sh:pattern");
                self.mark_unsupported(shape, sh::PATTERN);
                None
            }
        }
    }

    fn check_pairs(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        for other in g.objects(ctx.shape, sh::EQUALS) {
            let Some(other) = named(&other) else { continue };
            let others = g.objects(ctx.focus, other.as_ref());
            for v in values.iter().filter(|v| !others.contains(v)) {
                let message = format!("Value {v} is not a value of {other}");
                self.report(ctx, Some(v), sh::EQUALS_COMPONENT, message);
            }
            for o in others.iter().filter(|o| !values.contains(o)) {
                let message = format!("Value {o} of {other} is missing");
                self.report(ctx, Some(o), sh::EQUALS_COMPONENT, message);
            }
        }
        for other in g.objects(ctx.shape, sh::DISJOINT) {
            let Some(other) = named(&other) else { continue };
            let others = g.objects(ctx.focus, other.as_ref());
            for v in values.iter().filter(|v| others.contains(v)) {
                let message = format!("Value {v} is also a value of {other}");
                self.report(ctx, Some(v), sh::DISJOINT_COMPONENT, message);
            }
        }
    }

    fn check_enumerations(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        for list in g.objects(ctx.shape, sh::IN) {
            let allowed = self.list_members(&list);
            for v in values {
                if !allowed.contains(v) {
                    let message = format!("Value {v} not in list of allowed values");
                    self.report(ctx, Some(v), sh::IN_COMPONENT, message);
                }
            }
        }

        for expected in g.objects(ctx.shape, sh::HAS_VALUE) {
            if !values.contains(&expected) {
                let message = format!("Missing expected value {expected}");
                self.report(ctx, None, sh::HAS_VALUE_COMPONENT, message);
            }
        }
    }

    fn check_closed(&mut self, ctx: &Context<'_>, values: &[Term]) {
        let g = self.graph;
        if !g.objects(ctx.shape, sh::CLOSED).iter().any(is_true) {
            return;
        }
        let mut allowed: HashSet<Term> = g
            .objects(ctx.shape, sh::PROPERTY)
            .iter()
            .filter_map(|property| g.object(property, sh::PATH))
            .filter(|path| matches!(path, Term::NamedNode(_)))
            .collect();
        for list in g.objects(ctx.shape, sh::IGNORED_PROPERTIES) {
            allowed.extend(self.list_members(&list));
        }
        for v in values {
            let mut extra: Vec<(Term, Term)> = g
                .triples_for_subject(v)
                .into_iter()
                .map(|t| (Term::from(t.predicate.into_owned()), t.object.into_owned()))
                .filter(|(p, _)| !allowed.contains(p))
                .collect();
            extra.sort_by_cached_key(|(p, o)| (p.to_string(), o.to_string()));
            for (predicate, object) in extra {
                let message = format!("Predicate {predicate} is not allowed (closed shape)");
                let closed = Context {
                    shape: ctx.shape,
                    focus: v,
                    path: Some(&predicate),
                };
                self.report(&closed, Some(&object), sh::CLOSED_COMPONENT, message);
            }
        }
    }

    fn check_logical(
        &mut self,
        ctx: &Context<'_>,
        values: &[Term],
        depth: usize,
        visiting: &mut HashSet<(Term, Term)>,
    ) {
        let g = self.graph;
        for negated in g.objects(ctx.shape, sh::NOT) {
            for v in values {
                if self.conforms_to(&negated, v, depth, visiting) {
                    let message = format!("Value {v} conforms to shape {negated}");
                    self.report(ctx, Some(v), sh::NOT_COMPONENT, message);
                }
            }
        }

        let lists = [
            (sh::AND, sh::AND_COMPONENT),
            (sh::OR, sh::OR_COMPONENT),
            (sh::XONE, sh::XONE_COMPONENT),
        ];
        for (parameter, component) in lists {
            for list in g.objects(ctx.shape, parameter) {
                let members = self.list_members(&list);
                for v in values {
                    let passed = members
                        .iter()
                        .filter(|member| self.conforms_to(member, v, depth, visiting))
                        .count();
                    let ok = if parameter == sh::AND {
                        passed == members.len()
                    } else if parameter == sh::OR {
                        passed > 0
                    } else {
                        passed == 1
                    };
                    if !ok {
                        let message = format!(
                            "Value {v} conforms to {passed} of {} shapes in {}",
                            members.len(),
                            local(parameter)
                        );
                        self.report(ctx, Some(v), component, message);
                    }
                }
            }
        }
    }

    fn check_qualified(
        &mut self,
        ctx: &Context<'_>,
        values: &[Term],
        depth: usize,
        visiting: &mut HashSet<(Term, Term)>,
    ) {
        let g = self.graph;
        let min = g.object(ctx.shape, sh::QUALIFIED_MIN_COUNT).as_ref().and_then(as_count);
        let max = g.object(ctx.shape, sh::QUALIFIED_MAX_COUNT).as_ref().and_then(as_count);
        for qualified in g.objects(ctx.shape, sh::QUALIFIED_VALUE_SHAPE) {
            let passed = values
                .iter()
                .filter(|v| self.conforms_to(&qualified, v, depth, visiting))
                .count();
            if let Some(min) = min.filter(|m| passed < *m) {
                let message = format!("Less than {min} values conform to {qualified}");
                self.report(ctx, None, sh::QUALIFIED_MIN_COUNT_COMPONENT, message);
            }
            if let Some(max) = max.filter(|m| passed > *m) {
                let message = format!("More than {max} values conform to {qualified}");
                self.report(ctx, None, sh::QUALIFIED_MAX_COUNT_COMPONENT, message);
            }
        }
    }

    /// Members of an RDF list, stopping at `rdf:nil` or a malformed cell.
    fn list_members(&self, head: &Term) -> Vec<Term> {
        let nil = Term::from(rdf::NIL.into_owned());
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut cell = head.clone();
        while cell != nil && seen.insert(cell.clone()) {
            let Some(item) = self.graph.object(&cell, rdf::FIRST) else { break };
            out.push(item);
            match self.graph.object(&cell, rdf::REST) {
                Some(next) => cell = next,
                None => break,
            }
        }
        out
    }

    fn report(
        &mut self,
        ctx: &Context<'_>,
        value: Option<&Term>,
        component: NamedNodeRef<'_>,
        default_message: String,
    ) {
        let severity = self
            .graph
            .object(ctx.shape, sh::SEVERITY)
            .as_ref()
            .and_then(named)
            .cloned()
            .unwrap_or_else(|| sh::VIOLATION.into_owned());
        let message = match self.graph.object(ctx.shape, sh::MESSAGE) {
            Some(Term::Literal(l)) => l.value().to_string(),
            _ => default_message,
        };
        self.results.push(ValidationResult {
            focus_node: ctx.focus.clone(),
            result_path: ctx.path.cloned(),
            value: value.cloned(),
            source_shape: ctx.shape.clone(),
            constraint_component: component.into_owned(),
            severity,
            message,
        });
    }
}

/// The shape, focus node and path a constraint is evaluated under.
struct Context<'a> {
    shape: &'a Term,
    focus: &'a Term,
    path: Option<&'a Term>,
}

impl Context<'_> {
    fn path_label(&self) -> String {
        self.path.map(Term::to_string).unwrap_or_default()
    }
}

fn local(iri: NamedNodeRef<'_>) -> &str {
    let iri = iri.as_str();
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Order of two literals: numerically when both are numbers, otherwise by
/// lexical form when they share a datatype that orders that way.
fn compare(value: &Term, bound: &Term) -> Option<Ordering> {
    let (Term::Literal(value), Term::Literal(bound)) = (value, bound) else {
        return None;
    };
    if let (Some(a), Some(b)) = (numeric_value(value.as_ref()), numeric_value(bound.as_ref())) {
        return a.partial_cmp(&b);
    }
    let lexical = [xsd::DATE_TIME, xsd::DATE, xsd::TIME, xsd::STRING];
    (value.datatype() == bound.datatype() && lexical.contains(&value.datatype()))
        .then(|| value.value().cmp(bound.value()))
}

/// Basic language range matching: `*` matches any tag, otherwise the range
/// must equal the tag or be a prefix of it ending at a `-`.
fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let (tag, range) = (tag.to_ascii_lowercase(), range.to_ascii_lowercase());
    tag == range || tag.strip_prefix(&range).is_some_and(|rest| rest.starts_with('-'))
}

fn node_kind_matches(kind: NamedNodeRef<'_>, value: &Term) -> bool {
    let (iri, blank, literal) = match value {
        Term::NamedNode(_) => (true, false, false),
        Term::BlankNode(_) => (false, true, false),
        _ => (false, false, true),
    };
    if kind == sh::IRI {
        iri
    } else if kind == sh::BLANK_NODE {
        blank
    } else if kind == sh::LITERAL {
        literal
    } else if kind == sh::BLANK_NODE_OR_IRI {
        iri || blank
    } else if kind == sh::BLANK_NODE_OR_LITERAL {
        blank || literal
    } else if kind == sh::IRI_OR_LITERAL {
        iri || literal
    } else {
        true
    }
}
