//! Parse Turtle and N-Triples documents into a [`Graph`].
//!
//! Blank node labels are only meaningful inside one document, so every label
//! is prefixed with a per-document scope. Two documents that both use `_:b0`
//! end up with distinct nodes after merging.

use std::io::BufRead;
use std::path::Path;

use oxigraph::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use rio_api::model::{Literal as RioLiteral, Subject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleParser};

use crate::error::ParseError;
use crate::model::Graph;

/// Serialization syntax of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Turtle,
    NTriples,
}

impl Syntax {
    /// Guess from a file name; anything not ending in `.nt` is read as Turtle.
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with(".nt") {
            Syntax::NTriples
        } else {
            Syntax::Turtle
        }
    }
}

fn scope_label(scope: &str) -> String {
    scope
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Builds `oxigraph` terms from parser events. IRIs have already been
/// checked by the parser.
struct Converter {
    scope: String,
}

impl Converter {
    fn blank(&self, id: &str) -> BlankNode {
        BlankNode::new_unchecked(format!("{}_{}", self.scope, id))
    }

    fn subject(&self, subject: Subject<'_>) -> Result<NamedOrBlankNode, ParseError> {
        match subject {
            Subject::NamedNode(n) => Ok(NamedNode::new_unchecked(n.iri).into()),
            Subject::BlankNode(b) => Ok(self.blank(b.id).into()),
            Subject::Triple(_) => Err(ParseError::QuotedTriple("subject")),
        }
    }

    fn object(&self, object: RioTerm<'_>) -> Result<Term, ParseError> {
        match object {
            RioTerm::NamedNode(n) => Ok(NamedNode::new_unchecked(n.iri).into()),
            RioTerm::BlankNode(b) => Ok(self.blank(b.id).into()),
            RioTerm::Literal(RioLiteral::Simple { value }) => {
                Ok(Literal::new_simple_literal(value).into())
            }
            RioTerm::Literal(RioLiteral::LanguageTaggedString { value, language }) => {
                Ok(Literal::new_language_tagged_literal_unchecked(
                    value,
                    language.to_ascii_lowercase(),
                )
                .into())
            }
            RioTerm::Literal(RioLiteral::Typed { value, datatype }) => {
                Ok(Literal::new_typed_literal(value, NamedNode::new_unchecked(datatype.iri)).into())
            }
            RioTerm::Triple(_) => Err(ParseError::QuotedTriple("object")),
        }
    }
}

fn collect<P>(mut parser: P, converter: &Converter, graph: &mut Graph) -> Result<usize, ParseError>
where
    P: TriplesParser,
    ParseError: From<P::Error>,
{
    let mut count = 0;
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        let subject = converter.subject(t.subject)?;
        let object = converter.object(t.object)?;
        graph.insert(&Triple::new(
            subject,
            NamedNode::new_unchecked(t.predicate.iri),
            object,
        ));
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

/// Parse a document and add its triples to `graph`.
///
/// Returns the number of statements read (duplicates included).
pub fn parse_into(
    reader: impl BufRead,
    syntax: Syntax,
    scope: &str,
    graph: &mut Graph,
) -> Result<usize, ParseError> {
    let converter = Converter {
        scope: scope_label(scope),
    };
    match syntax {
        Syntax::Turtle => collect(TurtleParser::new(reader, None), &converter, graph),
        Syntax::NTriples => collect(NTriplesParser::new(reader), &converter, graph),
    }
}

/// Parse a Turtle document held in memory.
pub fn parse_turtle(input: &str, scope: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    parse_into(input.as_bytes(), Syntax::Turtle, scope, &mut graph)?;
    Ok(graph)
}

/// Parse a graph file; the syntax is chosen from the file name.
pub fn load_file(path: &Path, scope: &str) -> Result<Graph, ParseError> {
    let file = std::fs::File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut graph = Graph::new();
    parse_into(
        std::io::BufReader::new(file),
        Syntax::from_file_name(&name),
        scope,
        &mut graph,
    )?;
    Ok(graph)
}
