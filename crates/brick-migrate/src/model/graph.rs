//! In-memory triple set with namespace bindings.
//!
//! A [`Graph`] wraps the indexed `oxigraph` graph and keeps its set
//! semantics: inserting a triple twice keeps one copy, removing an absent
//! triple is a no-op. `&a + &b` and `&a - &b` produce new graphs. Namespace
//! bindings ride along for serialization only and take no part in equality.

use std::collections::BTreeMap;
use std::ops::{Add, Sub};

use oxigraph::model::{
    BlankNodeRef, Graph as TripleSet, NamedNode, NamedNodeRef, NamedOrBlankNode,
    NamedOrBlankNodeRef, Term, TermRef, Triple, TripleRef,
};

use super::ontology::SKOLEM_BASE;
use super::term::subject_ref;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: TripleSet,
    prefixes: BTreeMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains<'a>(&self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.contains(triple)
    }

    /// Add a triple. Returns `false` if it was already present.
    pub fn insert<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.insert(triple)
    }

    /// Remove a triple. Returns `false` if it was absent.
    pub fn remove<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.remove(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = TripleRef<'_>> {
        self.triples.iter()
    }

    /// Triples in a stable order (subject, predicate, object), compared by
    /// their N-Triples rendering.
    pub fn sorted(&self) -> Vec<TripleRef<'_>> {
        let mut out: Vec<TripleRef<'_>> = self.triples.iter().collect();
        out.sort_by_cached_key(|t| {
            (
                t.subject.to_string(),
                t.predicate.as_str().to_string(),
                t.object.to_string(),
            )
        });
        out
    }

    /// Objects of `(subject, predicate, ?)`. Empty when `subject` is a literal.
    pub fn objects(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        let Some(subject) = subject_ref(subject) else {
            return Vec::new();
        };
        self.triples
            .objects_for_subject_predicate(subject, predicate)
            .map(TermRef::into_owned)
            .collect()
    }

    /// Subjects of `(?, predicate, object)`.
    pub fn subjects(&self, predicate: NamedNodeRef<'_>, object: &Term) -> Vec<Term> {
        self.triples
            .subjects_for_predicate_object(predicate, object.as_ref())
            .map(|s| Term::from(s.into_owned()))
            .collect()
    }

    /// The smallest object for `(subject, predicate)`, if any.
    pub fn object(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<Term> {
        self.objects(subject, predicate)
            .into_iter()
            .min_by_key(Term::to_string)
    }

    pub fn triples_for_subject(&self, subject: &Term) -> Vec<TripleRef<'_>> {
        match subject_ref(subject) {
            Some(subject) => self.triples.triples_for_subject(subject).collect(),
            None => Vec::new(),
        }
    }

    pub fn triples_for_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<TripleRef<'_>> {
        self.triples.triples_for_predicate(predicate).collect()
    }

    pub fn has_subject(&self, subject: &Term) -> bool {
        subject_ref(subject)
            .is_some_and(|s| self.triples.triples_for_subject(s).next().is_some())
    }

    /// Set union. Prefixes of `self` win on conflicts.
    pub fn union(&self, other: &Graph) -> Graph {
        let mut out = self.clone();
        for t in other.iter() {
            out.insert(t);
        }
        for (p, ns) in &other.prefixes {
            out.prefixes.entry(p.clone()).or_insert_with(|| ns.clone());
        }
        out
    }

    /// Set difference: triples of `self` not in `other`.
    pub fn difference(&self, other: &Graph) -> Graph {
        let mut out = Graph {
            prefixes: self.prefixes.clone(),
            ..Graph::default()
        };
        for t in self.iter().filter(|t| !other.contains(*t)) {
            out.insert(t);
        }
        out
    }

    /// True when every triple of `self` is in `other`.
    pub fn is_subset_of(&self, other: &Graph) -> bool {
        self.len() <= other.len() && self.iter().all(|t| other.contains(t))
    }

    /// Replace every blank node with an IRI under [`SKOLEM_BASE`].
    ///
    /// The IRI is derived from the blank node label, so the same parse of the
    /// same documents always yields the same IRIs.
    pub fn skolemize(&self) -> Graph {
        fn skolem(node: BlankNodeRef<'_>) -> NamedNode {
            NamedNode::new_unchecked(format!("{SKOLEM_BASE}{}", node.as_str()))
        }
        let mut out = Graph {
            prefixes: self.prefixes.clone(),
            ..Graph::default()
        };
        for t in self.iter() {
            let subject: NamedOrBlankNode = match t.subject {
                NamedOrBlankNodeRef::BlankNode(b) => skolem(b).into(),
                other => other.into_owned(),
            };
            let object: Term = match t.object {
                TermRef::BlankNode(b) => skolem(b).into(),
                other => other.into_owned(),
            };
            out.insert(&Triple::new(subject, t.predicate, object));
        }
        out
    }

    /// Bind a namespace prefix used when serializing.
    pub fn bind(&mut self, prefix: &str, namespace: &str) {
        self.prefixes.insert(prefix.to_string(), namespace.to_string());
    }

    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl Eq for Graph {}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for t in iter {
            self.insert(&t);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut g = Graph::new();
        g.extend(iter);
        g
    }
}

impl Add for &Graph {
    type Output = Graph;

    fn add(self, rhs: &Graph) -> Graph {
        self.union(rhs)
    }
}

impl Sub for &Graph {
    type Output = Graph;

    fn sub(self, rhs: &Graph) -> Graph {
        self.difference(rhs)
    }
}
