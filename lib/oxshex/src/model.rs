//! ShEx shape model types.
//!
//! This module defines the ShEx abstract syntax the validator works on:
//! - [`ShapeLabel`] - Identifier for shape declarations and triple expressions
//! - [`ShapeExpression`] - Boolean algebra over node constraints and shapes
//! - [`ShapeDecl`] - Labelled shape expression, the target of references
//! - [`TripleExpression`] - `EachOf`/`OneOf` trees of [`TripleConstraint`]s
//! - [`NodeConstraint`] - Constraints on the focus node value itself
//! - [`Cardinality`] - How many arcs a triple constraint accepts

use crate::datatypes::NumericLiteral;
use crate::error::ShexError;
use oxrdf::{BlankNode, NamedNode, NamedOrBlankNode, Term};
use std::fmt;

/// Unique identifier for a shape declaration or a triple expression (shape label in ShEx terminology).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    /// IRI label.
    Iri(NamedNode),
    /// Blank node label.
    BNode(BlankNode),
}

impl ShapeLabel {
    /// Converts to a Term.
    pub fn to_term(&self) -> Term {
        match self {
            Self::Iri(n) => n.clone().into(),
            Self::BNode(b) => b.clone().into(),
        }
    }

    /// The IRI of this label, if it is not a blank node.
    pub fn as_iri(&self) -> Option<&NamedNode> {
        match self {
            Self::Iri(n) => Some(n),
            Self::BNode(_) => None,
        }
    }
}

impl From<NamedNode> for ShapeLabel {
    fn from(n: NamedNode) -> Self {
        Self::Iri(n)
    }
}

impl From<BlankNode> for ShapeLabel {
    fn from(b: BlankNode) -> Self {
        Self::BNode(b)
    }
}

impl From<NamedOrBlankNode> for ShapeLabel {
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(n) => Self::Iri(n),
            NamedOrBlankNode::BlankNode(b) => Self::BNode(b),
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(n) => write!(f, "<{}>", n.as_str()),
            Self::BNode(b) => write!(f, "_:{}", b.as_str()),
        }
    }
}

/// Shape expression.
///
/// References to declared shapes are kept as [`ShapeExpression::ShapeRef`] and resolved
/// through the [`ShapesSchema`](crate::ShapesSchema) index during validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeExpression {
    /// Exactly one of the operands holds.
    ShapeOr(Vec<ShapeExpression>),

    /// All operands hold.
    ShapeAnd(Vec<ShapeExpression>),

    /// The operand does not hold.
    ShapeNot(Box<ShapeExpression>),

    /// Node constraint - validates the focus node itself.
    NodeConstraint(NodeConstraint),

    /// Shape - validates the arcs around the focus node.
    Shape(Shape),

    /// Shape defined outside of the schema.
    ShapeExternal,

    /// Reference to a shape declaration by label.
    ShapeRef(ShapeLabel),
}

impl ShapeExpression {
    /// Builds a reference to the declaration with the given label.
    pub fn reference(label: impl Into<ShapeLabel>) -> Self {
        Self::ShapeRef(label.into())
    }

    pub(crate) fn for_each_node_constraint_mut(&mut self, f: &mut impl FnMut(&mut NodeConstraint)) {
        match self {
            Self::ShapeOr(exprs) | Self::ShapeAnd(exprs) => {
                for expr in exprs {
                    expr.for_each_node_constraint_mut(f);
                }
            }
            Self::ShapeNot(expr) => expr.for_each_node_constraint_mut(f),
            Self::NodeConstraint(nc) => f(nc),
            Self::Shape(shape) => {
                if let Some(expr) = &mut shape.expression {
                    expr.for_each_node_constraint_mut(f);
                }
            }
            Self::ShapeExternal | Self::ShapeRef(_) => {}
        }
    }

    /// Calls `f` on every node constraint, following nested shapes but not references.
    pub(crate) fn for_each_node_constraint(&self, f: &mut impl FnMut(&NodeConstraint)) {
        match self {
            Self::ShapeOr(exprs) | Self::ShapeAnd(exprs) => {
                for expr in exprs {
                    expr.for_each_node_constraint(f);
                }
            }
            Self::ShapeNot(expr) => expr.for_each_node_constraint(f),
            Self::NodeConstraint(nc) => f(nc),
            Self::Shape(shape) => {
                if let Some(expr) = &shape.expression {
                    expr.for_each_node_constraint(f);
                }
            }
            Self::ShapeExternal | Self::ShapeRef(_) => {}
        }
    }

    /// Collects the shape and triple expression references used in this expression (recursive).
    pub(crate) fn collect_refs<'a>(&'a self, refs: &mut Vec<Reference<'a>>) {
        match self {
            Self::ShapeOr(exprs) | Self::ShapeAnd(exprs) => {
                for expr in exprs {
                    expr.collect_refs(refs);
                }
            }
            Self::ShapeNot(expr) => expr.collect_refs(refs),
            Self::ShapeRef(label) => refs.push(Reference::Shape(label)),
            Self::Shape(shape) => {
                refs.extend(
                    shape
                        .extends
                        .iter()
                        .chain(&shape.restricts)
                        .map(Reference::Shape),
                );
                if let Some(expr) = &shape.expression {
                    expr.collect_refs(refs);
                }
            }
            Self::NodeConstraint(_) | Self::ShapeExternal => {}
        }
    }
}

impl From<NodeConstraint> for ShapeExpression {
    fn from(constraint: NodeConstraint) -> Self {
        Self::NodeConstraint(constraint)
    }
}

impl From<Shape> for ShapeExpression {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}

/// A label used by a shape or triple expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reference<'a> {
    Shape(&'a ShapeLabel),
    TripleExpression(&'a ShapeLabel),
}

/// Labelled shape expression.
///
/// Declarations are the only shape expressions that can be referenced,
/// possibly recursively.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDecl {
    /// Label of this declaration.
    pub label: ShapeLabel,

    /// Whether this declaration is abstract (only usable through `EXTENDS`).
    pub is_abstract: bool,

    /// Declared shape expression.
    pub expression: ShapeExpression,
}

impl ShapeDecl {
    /// Creates a new declaration.
    pub fn new(label: impl Into<ShapeLabel>, expression: impl Into<ShapeExpression>) -> Self {
        Self {
            label: label.into(),
            is_abstract: false,
            expression: expression.into(),
        }
    }
}

/// Shape with a triple expression.
///
/// Validates the arcs of the focus node: outgoing ones and, for inverse
/// constraints, incoming ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    /// Whether this is a closed shape (no arcs with other predicates allowed).
    pub closed: bool,

    /// Predicates whose arcs may exist beyond the ones matched by the triple expression.
    pub extra: Vec<NamedNode>,

    /// Triple expression to satisfy. A shape without one accepts any arc set allowed by `closed`.
    pub expression: Option<TripleExpression>,

    /// Shapes this shape extends. Not supported by the validator.
    pub extends: Vec<ShapeLabel>,

    /// Shapes this shape restricts. Not supported by the validator.
    pub restricts: Vec<ShapeLabel>,

    /// Semantic actions. Not supported by the validator.
    pub sem_acts: Vec<SemAct>,
}

impl Shape {
    /// Creates a new empty open shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an open shape with the given triple expression.
    pub fn with_expression(expression: impl Into<TripleExpression>) -> Self {
        Self {
            expression: Some(expression.into()),
            ..Self::default()
        }
    }

    /// Sets whether the shape is closed.
    #[must_use]
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Adds an `EXTRA` predicate.
    #[must_use]
    pub fn with_extra(mut self, predicate: NamedNode) -> Self {
        self.extra.push(predicate);
        self
    }
}

/// Triple expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TripleExpression {
    /// Conjunction: every sub-expression must match a distinct part of the arcs.
    EachOf(TripleExprGroup),

    /// Exclusive disjunction: exactly one sub-expression must be witnessed.
    OneOf(TripleExprGroup),

    /// Leaf constraint on the arcs with a given predicate.
    TripleConstraint(TripleConstraint),

    /// Reference to a labelled triple expression.
    TripleExprRef(ShapeLabel),
}

impl TripleExpression {
    /// Builds an `EachOf` of the given expressions.
    pub fn each_of(expressions: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::EachOf(TripleExprGroup::new(expressions))
    }

    /// Builds a `OneOf` of the given expressions.
    pub fn one_of(expressions: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::OneOf(TripleExprGroup::new(expressions))
    }

    pub(crate) fn for_each_node_constraint_mut(&mut self, f: &mut impl FnMut(&mut NodeConstraint)) {
        match self {
            Self::EachOf(group) | Self::OneOf(group) => {
                for expr in &mut group.expressions {
                    expr.for_each_node_constraint_mut(f);
                }
            }
            Self::TripleConstraint(tc) => {
                if let Some(expr) = &mut tc.value_expr {
                    expr.for_each_node_constraint_mut(f);
                }
            }
            Self::TripleExprRef(_) => {}
        }
    }

    pub(crate) fn for_each_node_constraint(&self, f: &mut impl FnMut(&NodeConstraint)) {
        match self {
            Self::EachOf(group) | Self::OneOf(group) => {
                for expr in &group.expressions {
                    expr.for_each_node_constraint(f);
                }
            }
            Self::TripleConstraint(tc) => {
                if let Some(expr) = &tc.value_expr {
                    expr.for_each_node_constraint(f);
                }
            }
            Self::TripleExprRef(_) => {}
        }
    }

    pub(crate) fn collect_refs<'a>(&'a self, refs: &mut Vec<Reference<'a>>) {
        match self {
            Self::EachOf(group) | Self::OneOf(group) => {
                for expr in &group.expressions {
                    expr.collect_refs(refs);
                }
            }
            Self::TripleConstraint(tc) => {
                if let Some(expr) = &tc.value_expr {
                    expr.collect_refs(refs);
                }
            }
            Self::TripleExprRef(label) => refs.push(Reference::TripleExpression(label)),
        }
    }
}

impl From<TripleConstraint> for TripleExpression {
    fn from(constraint: TripleConstraint) -> Self {
        Self::TripleConstraint(constraint)
    }
}

/// Sub-expressions of an `EachOf` or a `OneOf`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripleExprGroup {
    /// Sub-expressions.
    pub expressions: Vec<TripleExpression>,

    /// Repetition of the whole group. Not supported by the validator.
    pub cardinality: Option<Cardinality>,

    /// Semantic actions. Not supported by the validator.
    pub sem_acts: Vec<SemAct>,
}

impl TripleExprGroup {
    /// Creates a group without cardinality.
    pub fn new(expressions: impl IntoIterator<Item = impl Into<TripleExpression>>) -> Self {
        Self {
            expressions: expressions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Constraint on the arcs with a given predicate.
///
/// Specifies a predicate, a direction, an optional value expression that the
/// neighbour nodes must satisfy and the number of matching arcs.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleConstraint {
    /// Predicate of the matched arcs.
    pub predicate: NamedNode,

    /// Matches arcs pointing to the focus node instead of leaving it.
    pub inverse: bool,

    /// Optional shape expression that neighbour nodes must satisfy.
    pub value_expr: Option<Box<ShapeExpression>>,

    /// Number of arcs to match.
    pub cardinality: Cardinality,

    /// Semantic actions. Not supported by the validator.
    pub sem_acts: Vec<SemAct>,
}

impl TripleConstraint {
    /// Matches exactly one arc with `predicate`, whatever its value.
    pub fn new(predicate: NamedNode) -> Self {
        Self {
            predicate,
            inverse: false,
            value_expr: None,
            cardinality: Cardinality::default(),
            sem_acts: Vec::new(),
        }
    }

    /// Matches exactly one arc with `predicate` whose value satisfies `value_expr`.
    pub fn with_value_expr(predicate: NamedNode, value_expr: impl Into<ShapeExpression>) -> Self {
        Self {
            value_expr: Some(Box::new(value_expr.into())),
            ..Self::new(predicate)
        }
    }

    /// Replaces the default `{1}` cardinality.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Sets whether the constraint matches incoming arcs.
    #[must_use]
    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }
}

/// Bounds on the number of arcs matched by a triple constraint.
///
/// The default is exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    /// Lower bound.
    pub min: u32,

    /// Upper bound, `None` if unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// Returns `None` if `max` is lower than `min`.
    pub fn new(min: u32, max: Option<u32>) -> Option<Self> {
        if max.is_some_and(|max| max < min) {
            return None;
        }
        Some(Self { min, max })
    }

    /// `{n}`
    pub fn exactly(n: u32) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// `?`
    pub fn optional() -> Self {
        Self {
            min: 0,
            max: Some(1),
        }
    }

    /// `*`
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// `+`
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Whether `count` arcs are within bounds.
    pub fn allows(&self, count: usize) -> bool {
        count >= self.min as usize && self.max.is_none_or(|max| count <= max as usize)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, None) => write!(f, "*"),
            (1, None) => write!(f, "+"),
            (0, Some(1)) => write!(f, "?"),
            (min, None) => write!(f, "{{{min},}}"),
            (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
            (min, Some(max)) => write!(f, "{{{min},{max}}}"),
        }
    }
}

/// Identifier of a node constraint inside a [`ShapesSchema`](crate::ShapesSchema).
///
/// Assigned when the enclosing expression is added to the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(u32);

impl ConstraintId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Constraint on a single RDF term.
///
/// All the present parts must hold. A constraint without any part accepts every term.
#[derive(Debug, Clone, Default)]
#[expect(clippy::partial_pub_fields)]
pub struct NodeConstraint {
    /// `IRI`, `BNODE`, `LITERAL` or `NONLITERAL`.
    pub node_kind: Option<NodeKind>,

    /// Datatype the term must be a literal of.
    pub datatype: Option<NamedNode>,

    /// Checks on the lexical form.
    pub string_facets: Vec<StringFacet>,

    /// Numeric facets (bounds and digits).
    pub numeric_facets: Vec<NumericFacet>,

    /// Value set constraint. Empty means no value set.
    pub values: Vec<ValueSetValue>,

    id: Option<ConstraintId>,
}

impl NodeConstraint {
    /// A constraint accepting every term.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constraint on the kind of term only.
    pub fn with_node_kind(node_kind: NodeKind) -> Self {
        Self {
            node_kind: Some(node_kind),
            ..Self::default()
        }
    }

    /// A constraint on the literal datatype only.
    pub fn with_datatype(datatype: impl Into<NamedNode>) -> Self {
        Self {
            datatype: Some(datatype.into()),
            ..Self::default()
        }
    }

    /// Creates a node constraint with the given value set.
    pub fn with_values(values: impl IntoIterator<Item = ValueSetValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds a string facet.
    #[must_use]
    pub fn with_string_facet(mut self, facet: StringFacet) -> Self {
        self.string_facets.push(facet);
        self
    }

    /// Adds a numeric facet.
    #[must_use]
    pub fn with_numeric_facet(mut self, facet: NumericFacet) -> Self {
        self.numeric_facets.push(facet);
        self
    }

    /// Identifier assigned by the schema this constraint belongs to.
    pub fn id(&self) -> Option<ConstraintId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ConstraintId) {
        self.id = Some(id);
    }
}

impl PartialEq for NodeConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.node_kind == other.node_kind
            && self.datatype == other.datatype
            && self.string_facets == other.string_facets
            && self.numeric_facets == other.numeric_facets
            && self.values == other.values
    }
}

/// Kind of RDF term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// IRI.
    Iri,
    /// Blank node.
    BNode,
    /// Literal.
    Literal,
    /// IRI or blank node.
    NonLiteral,
}

impl NodeKind {
    /// Whether `term` is of this kind.
    pub fn matches(self, term: &Term) -> bool {
        match self {
            Self::Iri => term.is_named_node(),
            Self::BNode => term.is_blank_node(),
            Self::Literal => term.is_literal(),
            Self::NonLiteral => term.is_named_node() || term.is_blank_node(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri => write!(f, "IRI"),
            Self::BNode => write!(f, "BNODE"),
            Self::Literal => write!(f, "LITERAL"),
            Self::NonLiteral => write!(f, "NONLITERAL"),
        }
    }
}

/// Check on the lexical form of a term.
///
/// The lexical form of an IRI is the IRI itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFacet {
    /// Exact string length.
    Length(usize),
    /// Lower bound on the length.
    MinLength(usize),
    /// Upper bound on the length.
    MaxLength(usize),
    /// XPath regular expression.
    Pattern {
        /// Regex pattern.
        pattern: String,
        /// Optional XPath regex flags (`i`, `m`, `s`, `x`, `q`).
        flags: Option<String>,
    },
}

/// Numeric facet constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericFacet {
    /// `MININCLUSIVE`
    MinInclusive(NumericLiteral),
    /// `MINEXCLUSIVE`
    MinExclusive(NumericLiteral),
    /// `MAXINCLUSIVE`
    MaxInclusive(NumericLiteral),
    /// `MAXEXCLUSIVE`
    MaxExclusive(NumericLiteral),
    /// Maximum total number of digits.
    TotalDigits(u32),
    /// Maximum number of fractional digits.
    FractionDigits(u32),
}

/// Entry of a value set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueSetValue {
    /// Exact RDF term.
    ObjectValue(Term),

    /// IRIs starting with the stem.
    IriStem(String),

    /// IRI stem with exclusions. An empty stem matches any IRI.
    IriStemRange {
        /// Base stem to match.
        stem: String,
        /// IRIs or IRI stems to exclude.
        exclusions: Vec<StemExclusion>,
    },

    /// Literals whose lexical form starts with the stem.
    LiteralStem(String),

    /// Literal stem with exclusions. An empty stem matches any literal.
    LiteralStemRange {
        /// Base stem to match.
        stem: String,
        /// Lexical forms or stems to exclude.
        exclusions: Vec<StemExclusion>,
    },

    /// Exact language tag.
    Language(String),

    /// Language-tagged strings whose tag is the stem or a subtag of it.
    LanguageStem(String),

    /// Language stem with exclusions. An empty stem matches any language tag.
    LanguageStemRange {
        /// Base stem to match.
        stem: String,
        /// Language tags or stems to exclude.
        exclusions: Vec<StemExclusion>,
    },
}

impl ValueSetValue {
    /// Unrestricted [`Self::IriStem`].
    pub fn iri_stem(stem: impl Into<String>) -> Self {
        Self::IriStem(stem.into())
    }

    /// Unrestricted [`Self::LiteralStem`].
    pub fn literal_stem(stem: impl Into<String>) -> Self {
        Self::LiteralStem(stem.into())
    }

    /// Unrestricted [`Self::LanguageStem`].
    pub fn language_stem(stem: impl Into<String>) -> Self {
        Self::LanguageStem(stem.into())
    }
}

impl From<NamedNode> for ValueSetValue {
    fn from(node: NamedNode) -> Self {
        Self::ObjectValue(node.into())
    }
}

impl From<oxrdf::Literal> for ValueSetValue {
    fn from(literal: oxrdf::Literal) -> Self {
        Self::ObjectValue(literal.into())
    }
}

/// Exclusion of a stem range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StemExclusion {
    /// Excludes exactly this value.
    Value(String),
    /// Excludes every value starting with this stem.
    Stem(String),
}

impl StemExclusion {
    pub(crate) fn excludes(&self, value: &str) -> bool {
        match self {
            Self::Value(excluded) => value == excluded,
            Self::Stem(stem) => value.starts_with(stem.as_str()),
        }
    }
}

/// Semantic action attached to a schema, shape or triple expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemAct {
    /// Extension IRI.
    pub name: NamedNode,
    /// Code to run.
    pub code: Option<String>,
}

/// Returns `NotImplemented` if semantic actions are present.
pub(crate) fn reject_sem_acts(sem_acts: &[SemAct]) -> Result<(), ShexError> {
    if sem_acts.is_empty() {
        Ok(())
    } else {
        Err(ShexError::not_implemented("semantic actions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::Literal;

    #[test]
    fn test_cardinality_bounds() {
        let one = Cardinality::default();
        assert_eq!((one.min, one.max), (1, Some(1)));
        assert_eq!(one.to_string(), "{1}");
        let opt = Cardinality::optional();
        assert!((0..=1).all(|n| opt.allows(n)));
        assert!(!opt.allows(2));
        assert_eq!(opt.to_string(), "?");
        assert_eq!(Cardinality::exactly(3).to_string(), "{3}");
    }

    #[test]
    fn test_cardinality_star_and_plus() {
        assert!(Cardinality::zero_or_more().allows(0));
        assert!(Cardinality::zero_or_more().allows(100));
        assert!(!Cardinality::one_or_more().allows(0));
        assert!(Cardinality::one_or_more().allows(100));
        assert_eq!(Cardinality::zero_or_more().to_string(), "*");
        assert_eq!(Cardinality::one_or_more().to_string(), "+");
    }

    #[test]
    fn test_cardinality_new_rejects_inverted_bounds() {
        assert!(Cardinality::new(3, Some(2)).is_none());
        assert_eq!(
            Cardinality::new(2, Some(5)).map(|c| c.to_string()),
            Some("{2,5}".to_owned())
        );
        assert_eq!(
            Cardinality::new(2, None).map(|c| c.to_string()),
            Some("{2,}".to_owned())
        );
    }

    #[test]
    fn test_shape_label_display() {
        let label = ShapeLabel::from(NamedNode::new_unchecked("http://example.org/S"));
        assert_eq!(label.to_string(), "<http://example.org/S>");
        assert_eq!(label.as_iri().map(NamedNode::as_str), Some("http://example.org/S"));
        let label = ShapeLabel::from(BlankNode::new_unchecked("s1"));
        assert_eq!(label.to_string(), "_:s1");
        assert_eq!(label.as_iri(), None);
    }

    #[test]
    fn test_node_kind_matches() {
        let terms = [
            Term::from(NamedNode::new_unchecked("http://example.org/")),
            Term::from(BlankNode::new_unchecked("b")),
            Term::from(Literal::new_simple_literal("test")),
        ];
        let matching = |kind: NodeKind| terms.iter().map(|t| kind.matches(t)).collect::<Vec<_>>();
        assert_eq!(matching(NodeKind::Iri), [true, false, false]);
        assert_eq!(matching(NodeKind::BNode), [false, true, false]);
        assert_eq!(matching(NodeKind::Literal), [false, false, true]);
        assert_eq!(matching(NodeKind::NonLiteral), [true, true, false]);
    }

    #[test]
    fn test_node_constraint_equality_ignores_id() {
        let mut a = NodeConstraint::with_node_kind(NodeKind::Iri);
        a.set_id(ConstraintId::new(7));
        assert_eq!(a, NodeConstraint::with_node_kind(NodeKind::Iri));
    }

    #[test]
    fn test_stem_exclusion() {
        assert!(StemExclusion::Value("abc".into()).excludes("abc"));
        assert!(!StemExclusion::Value("abc".into()).excludes("abcd"));
        assert!(StemExclusion::Stem("ab".into()).excludes("abcd"));
    }
}
