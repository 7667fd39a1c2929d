//! RDF vocabulary constants used by the migration rules and the validator.
//!
//! - `brick:` prefix (https://brickschema.org/schema/Brick#) -- building entities and points
//! - `sh:` prefix (http://www.w3.org/ns/shacl#) -- shape constraints and reports
//! - `unit:` prefix (http://qudt.org/vocab/unit/) -- QUDT units
//! - `bldg` namespaces (http://buildsys.org/ontologies/<building>#) -- per-building data
//!
//! `rdf:`, `rdfs:` and `xsd:` terms come from [`oxigraph::model::vocab`].

/// Standard RDF/RDFS/XSD/OWL namespace URIs
pub mod standard {
    use oxigraph::model::NamedNodeRef;

    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    pub const OWL_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
}

/// Brick schema (`brick:` prefix)
pub mod brick {
    use oxigraph::model::{NamedNode, NamedNodeRef};

    pub const PREFIX: &str = "brick";
    pub const NS: &str = "https://brickschema.org/schema/Brick#";

    pub const VALUE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://brickschema.org/schema/Brick#value");

    /// A term in the Brick namespace.
    pub fn iri(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{NS}{local}"))
    }
}

/// QUDT units (`unit:` prefix)
pub mod unit {
    use oxigraph::model::NamedNode;

    pub const PREFIX: &str = "unit";
    pub const NS: &str = "http://qudt.org/vocab/unit/";

    pub fn iri(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{NS}{local}"))
    }
}

/// SHACL (`sh:` prefix)
pub mod sh {
    use oxigraph::model::NamedNodeRef;

    pub const PREFIX: &str = "sh";
    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    const fn term(iri: &'static str) -> NamedNodeRef<'static> {
        NamedNodeRef::new_unchecked(iri)
    }

    // Shapes and targets
    pub const NODE_SHAPE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#NodeShape");
    pub const PROPERTY_SHAPE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#PropertyShape");
    pub const TARGET_CLASS: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#targetClass");
    pub const TARGET_NODE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#targetNode");
    pub const TARGET_SUBJECTS_OF: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#targetSubjectsOf");
    pub const TARGET_OBJECTS_OF: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#targetObjectsOf");
    pub const DEACTIVATED: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#deactivated");
    pub const PROPERTY: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#property");
    pub const SEVERITY: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#severity");
    pub const MESSAGE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#message");

    // Property paths
    pub const PATH: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#path");
    pub const INVERSE_PATH: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#inversePath");
    pub const ALTERNATIVE_PATH: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#alternativePath");
    pub const ZERO_OR_MORE_PATH: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#zeroOrMorePath");
    pub const ONE_OR_MORE_PATH: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#oneOrMorePath");
    pub const ZERO_OR_ONE_PATH: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#zeroOrOnePath");

    // Constraint parameters
    pub const MIN_COUNT: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#minCount");
    pub const MAX_COUNT: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#maxCount");
    pub const DATATYPE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#datatype");
    pub const CLASS: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#class");
    pub const NODE_KIND: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#nodeKind");
    pub const IN: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#in");
    pub const HAS_VALUE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#hasValue");
    pub const NODE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#node");
    pub const NOT: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#not");
    pub const AND: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#and");
    pub const OR: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#or");
    pub const XONE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#xone");
    pub const PATTERN: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#pattern");
    pub const FLAGS: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#flags");
    pub const MIN_LENGTH: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#minLength");
    pub const MAX_LENGTH: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#maxLength");
    pub const MIN_INCLUSIVE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#minInclusive");
    pub const MAX_INCLUSIVE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#maxInclusive");
    pub const MIN_EXCLUSIVE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#minExclusive");
    pub const MAX_EXCLUSIVE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#maxExclusive");
    pub const LANGUAGE_IN: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#languageIn");
    pub const UNIQUE_LANG: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#uniqueLang");
    pub const EQUALS: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#equals");
    pub const DISJOINT: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#disjoint");
    pub const CLOSED: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#closed");
    pub const IGNORED_PROPERTIES: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#ignoredProperties");
    pub const QUALIFIED_VALUE_SHAPE: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#qualifiedValueShape");
    pub const QUALIFIED_MIN_COUNT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#qualifiedMinCount");
    pub const QUALIFIED_MAX_COUNT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#qualifiedMaxCount");
    pub const QUALIFIED_VALUE_SHAPES_DISJOINT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#qualifiedValueShapesDisjoint");

    // Node kinds
    pub const IRI: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#IRI");
    pub const BLANK_NODE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#BlankNode");
    pub const LITERAL: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#Literal");
    pub const BLANK_NODE_OR_IRI: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#BlankNodeOrIRI");
    pub const BLANK_NODE_OR_LITERAL: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#BlankNodeOrLiteral");
    pub const IRI_OR_LITERAL: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#IRIOrLiteral");

    // Constraint components
    pub const MIN_COUNT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MinCountConstraintComponent");
    pub const MAX_COUNT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MaxCountConstraintComponent");
    pub const DATATYPE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#DatatypeConstraintComponent");
    pub const CLASS_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#ClassConstraintComponent");
    pub const NODE_KIND_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#NodeKindConstraintComponent");
    pub const IN_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#InConstraintComponent");
    pub const HAS_VALUE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#HasValueConstraintComponent");
    pub const NOT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#NotConstraintComponent");
    pub const AND_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#AndConstraintComponent");
    pub const OR_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#OrConstraintComponent");
    pub const XONE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#XoneConstraintComponent");
    pub const PATTERN_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#PatternConstraintComponent");
    pub const MIN_LENGTH_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MinLengthConstraintComponent");
    pub const MAX_LENGTH_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MaxLengthConstraintComponent");
    pub const MIN_INCLUSIVE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MinInclusiveConstraintComponent");
    pub const MAX_INCLUSIVE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MaxInclusiveConstraintComponent");
    pub const MIN_EXCLUSIVE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MinExclusiveConstraintComponent");
    pub const MAX_EXCLUSIVE_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#MaxExclusiveConstraintComponent");
    pub const LANGUAGE_IN_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#LanguageInConstraintComponent");
    pub const UNIQUE_LANG_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#UniqueLangConstraintComponent");
    pub const EQUALS_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#EqualsConstraintComponent");
    pub const DISJOINT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#DisjointConstraintComponent");
    pub const CLOSED_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#ClosedConstraintComponent");
    pub const QUALIFIED_MIN_COUNT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#QualifiedMinCountConstraintComponent");
    pub const QUALIFIED_MAX_COUNT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#QualifiedMaxCountConstraintComponent");

    // Reports
    pub const VALIDATION_REPORT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#ValidationReport");
    pub const VALIDATION_RESULT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#ValidationResult");
    pub const CONFORMS: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#conforms");
    pub const RESULT: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#result");
    pub const FOCUS_NODE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#focusNode");
    pub const RESULT_PATH: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#resultPath");
    pub const VALUE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#value");
    pub const SOURCE_SHAPE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#sourceShape");
    pub const SOURCE_CONSTRAINT_COMPONENT: NamedNodeRef<'_> =
        term("http://www.w3.org/ns/shacl#sourceConstraintComponent");
    pub const RESULT_SEVERITY: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#resultSeverity");
    pub const RESULT_MESSAGE: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#resultMessage");
    pub const VIOLATION: NamedNodeRef<'_> = term("http://www.w3.org/ns/shacl#Violation");
}

/// Per-building data namespaces
pub mod bldg {
    pub const NS_BASE: &str = "http://buildsys.org/ontologies/";
}

/// Authority used when replacing blank nodes with stable IRIs.
pub const SKOLEM_BASE: &str = "https://brickschema.org/.well-known/genid/";
