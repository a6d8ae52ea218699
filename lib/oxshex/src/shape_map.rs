//! Shape maps: the list of (node, shape) pairs to validate.
//!
//! A [`ShapeMap`] associates node selectors with shapes. Selectors are either fixed nodes or
//! triple patterns with a `FOCUS` position, resolved against the data graph into
//! [`FixedAssociation`]s by [`resolve_shape_map`].

use crate::error::ShexJsonError;
use crate::model::ShapeLabel;
use oxrdf::{Graph, NamedNode, Term, TermRef};
use std::fmt;

/// Term of a triple pattern that is not the focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    /// Matches any term (`_`).
    Wildcard,
    /// Matches exactly this term.
    Term(Term),
}

impl PatternTerm {
    fn matches(&self, term: TermRef<'_>) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Term(expected) => expected.as_ref() == term,
        }
    }
}

/// Triple pattern selecting focus nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriplePattern {
    /// `{FOCUS predicate object}`: selects the subjects.
    FocusSubject {
        /// Predicate of the matched triples.
        predicate: NamedNode,
        /// Object of the matched triples.
        object: PatternTerm,
    },
    /// `{subject predicate FOCUS}`: selects the objects.
    FocusObject {
        /// Subject of the matched triples.
        subject: PatternTerm,
        /// Predicate of the matched triples.
        predicate: NamedNode,
    },
}

/// Node selector of a shape map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeMapNode {
    /// A fixed node.
    Node(Term),
    /// All the nodes at the focus position of the matching triples.
    Pattern(TriplePattern),
}

/// Shape of a shape map entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeMapShape {
    /// A shape declaration.
    Label(ShapeLabel),
    /// The schema start shape (`START`).
    Start,
}

impl fmt::Display for ShapeMapShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => label.fmt(f),
            Self::Start => f.write_str("START"),
        }
    }
}

impl From<ShapeLabel> for ShapeMapShape {
    fn from(label: ShapeLabel) -> Self {
        Self::Label(label)
    }
}

/// Entry of a shape map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeAssociation {
    /// Node selector.
    pub node: ShapeMapNode,
    /// Shape to validate the selected nodes against.
    pub shape: ShapeMapShape,
}

/// A (node, shape) pair to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedAssociation {
    /// Focus node.
    pub node: Term,
    /// Shape to validate the node against.
    pub shape: ShapeMapShape,
}

impl FixedAssociation {
    /// Creates a new association.
    pub fn new(node: impl Into<Term>, shape: impl Into<ShapeMapShape>) -> Self {
        Self {
            node: node.into(),
            shape: shape.into(),
        }
    }
}

/// A list of shape associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeMap {
    associations: Vec<ShapeAssociation>,
}

impl ShapeMap {
    /// Creates an empty shape map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON shape map.
    ///
    /// ```
    /// use oxshex::ShapeMap;
    ///
    /// let shape_map = ShapeMap::from_json_str(
    ///     r#"[
    ///         {"node": "http://example.com/alice", "shape": "http://example.com/Person"},
    ///         {"node": {"subject": "FOCUS", "predicate": "http://schema.org/knows", "object": "_"}, "shape": "START"}
    ///     ]"#,
    /// )?;
    /// assert_eq!(shape_map.associations().len(), 2);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ShexJsonError> {
        crate::shexj::parse_shape_map(json)
    }

    /// Adds an association.
    pub fn push(&mut self, association: ShapeAssociation) {
        self.associations.push(association);
    }

    /// Returns the associations.
    pub fn associations(&self) -> &[ShapeAssociation] {
        &self.associations
    }

    /// Resolves the node selectors against the graph.
    pub fn resolve(&self, graph: &Graph) -> Vec<FixedAssociation> {
        resolve_shape_map(&self.associations, graph)
    }
}

impl From<Vec<ShapeAssociation>> for ShapeMap {
    fn from(associations: Vec<ShapeAssociation>) -> Self {
        Self { associations }
    }
}

/// Options of batch validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Stops after the first pair that does not conform.
    pub fail_fast: bool,
}

/// Resolves shape map node selectors into (node, shape) pairs.
///
/// Fixed nodes are kept as is. Patterns give one pair per matching triple, in graph order.
pub fn resolve_shape_map(
    associations: &[ShapeAssociation],
    graph: &Graph,
) -> Vec<FixedAssociation> {
    let mut fixed = Vec::new();
    for association in associations {
        match &association.node {
            ShapeMapNode::Node(node) => {
                fixed.push(FixedAssociation::new(node.clone(), association.shape.clone()));
            }
            ShapeMapNode::Pattern(TriplePattern::FocusSubject { predicate, object }) => {
                fixed.extend(
                    graph
                        .triples_for_predicate(predicate)
                        .filter(|t| object.matches(t.object))
                        .map(|t| {
                            FixedAssociation::new(
                                t.subject.into_owned(),
                                association.shape.clone(),
                            )
                        }),
                );
            }
            ShapeMapNode::Pattern(TriplePattern::FocusObject { subject, predicate }) => {
                fixed.extend(
                    graph
                        .triples_for_predicate(predicate)
                        .filter(|t| subject.matches(t.subject.into()))
                        .map(|t| {
                            FixedAssociation::new(t.object.into_owned(), association.shape.clone())
                        }),
                );
            }
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, TripleRef};

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{name}"))
    }

    fn graph() -> Graph {
        let mut graph = Graph::new();
        let knows = iri("knows");
        let name = iri("name");
        let bob = Literal::new_simple_literal("Bob");
        graph.insert(TripleRef::new(iri("alice").as_ref(), knows.as_ref(), iri("bob").as_ref()));
        graph.insert(TripleRef::new(iri("carol").as_ref(), knows.as_ref(), iri("bob").as_ref()));
        graph.insert(TripleRef::new(iri("bob").as_ref(), name.as_ref(), bob.as_ref()));
        graph
    }

    #[test]
    fn test_fixed_nodes_pass_through() {
        let shape = ShapeMapShape::Label(iri("S").into());
        let fixed = resolve_shape_map(
            &[ShapeAssociation {
                node: ShapeMapNode::Node(iri("zoe").into()),
                shape: shape.clone(),
            }],
            &graph(),
        );
        assert_eq!(fixed, [FixedAssociation::new(iri("zoe"), shape)]);
    }

    #[test]
    fn test_focus_subject_pattern() {
        let fixed = resolve_shape_map(
            &[ShapeAssociation {
                node: ShapeMapNode::Pattern(TriplePattern::FocusSubject {
                    predicate: iri("knows"),
                    object: PatternTerm::Term(iri("bob").into()),
                }),
                shape: ShapeMapShape::Start,
            }],
            &graph(),
        );
        let mut nodes = fixed.into_iter().map(|a| a.node).collect::<Vec<_>>();
        nodes.sort_by_key(ToString::to_string);
        assert_eq!(nodes, [Term::from(iri("alice")), Term::from(iri("carol"))]);
    }

    #[test]
    fn test_focus_object_pattern_keeps_duplicates() {
        let fixed = resolve_shape_map(
            &[ShapeAssociation {
                node: ShapeMapNode::Pattern(TriplePattern::FocusObject {
                    subject: PatternTerm::Wildcard,
                    predicate: iri("knows"),
                }),
                shape: ShapeMapShape::Start,
            }],
            &graph(),
        );
        assert_eq!(fixed.len(), 2);
        assert!(fixed.iter().all(|a| a.node == Term::from(iri("bob"))));
    }

    #[test]
    fn test_pattern_without_match() {
        let shape_map = ShapeMap::from(vec![ShapeAssociation {
            node: ShapeMapNode::Pattern(TriplePattern::FocusSubject {
                predicate: iri("unknown"),
                object: PatternTerm::Wildcard,
            }),
            shape: ShapeMapShape::Start,
        }]);
        assert!(shape_map.resolve(&graph()).is_empty());
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(ShapeMapShape::Start.to_string(), "START");
        assert_eq!(
            ShapeMapShape::Label(iri("S").into()).to_string(),
            "<http://example.org/S>"
        );
    }
}
