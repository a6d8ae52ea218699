//! Shapes schema and label resolution.

use crate::error::{ShexError, ShexJsonError};
use crate::model::{
    ConstraintId, NodeConstraint, Reference, SemAct, ShapeDecl, ShapeExpression, ShapeLabel,
    StringFacet, TripleExpression,
};
use crate::node::compile_pattern;
use oxrdf::NamedNode;
use rustc_hash::FxHashMap;
use std::io::Read;

/// Identifier of a shape declaration inside a [`ShapesSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(usize);

/// A ShEx schema: shape declarations, labelled triple expressions and an optional start shape.
///
/// Node constraints receive an identifier when they are added to the schema.
/// This identifier is used by the validator to memoize their results.
#[derive(Debug, Clone, Default)]
pub struct ShapesSchema {
    decls: Vec<ShapeDecl>,
    decl_index: FxHashMap<ShapeLabel, DeclId>,
    triple_expressions: FxHashMap<ShapeLabel, TripleExpression>,
    start: Option<ShapeExpression>,
    imports: Vec<NamedNode>,
    start_acts: Vec<SemAct>,
    next_constraint_id: u32,
}

impl ShapesSchema {
    /// Creates a new empty shapes schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a schema from its [ShExJ](https://shex.io/shex-semantics/#shexj) serialization.
    ///
    /// ```
    /// use oxshex::{ShapeLabel, ShapesSchema};
    /// use oxrdf::NamedNode;
    ///
    /// let schema = ShapesSchema::from_shexj_str(
    ///     r#"{
    ///         "type": "Schema",
    ///         "shapes": [{
    ///             "type": "ShapeDecl",
    ///             "id": "http://example.com/Person",
    ///             "shapeExpr": {
    ///                 "type": "Shape",
    ///                 "expression": {"type": "TripleConstraint", "predicate": "http://schema.org/name"}
    ///             }
    ///         }]
    ///     }"#,
    /// )?;
    /// let person = ShapeLabel::from(NamedNode::new("http://example.com/Person")?);
    /// assert!(schema.shape_decl(&person).is_some());
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn from_shexj_str(json: &str) -> Result<Self, ShexJsonError> {
        crate::shexj::parse_schema_str(json)
    }

    /// Loads a schema from a reader of its ShExJ serialization.
    pub fn from_shexj_reader(reader: impl Read) -> Result<Self, ShexJsonError> {
        crate::shexj::parse_schema_reader(reader)
    }

    /// Adds a shape declaration.
    ///
    /// A declaration with the same label replaces the existing one.
    pub fn add_shape(&mut self, mut decl: ShapeDecl) -> DeclId {
        let next_id = &mut self.next_constraint_id;
        decl.expression
            .for_each_node_constraint_mut(&mut |nc| assign_id(nc, next_id));
        if let Some(&id) = self.decl_index.get(&decl.label) {
            self.decls[id.0] = decl;
            return id;
        }
        let id = DeclId(self.decls.len());
        self.decl_index.insert(decl.label.clone(), id);
        self.decls.push(decl);
        id
    }

    /// Adds a labelled triple expression, the target of [`TripleExpression::TripleExprRef`].
    pub fn add_triple_expression(
        &mut self,
        label: impl Into<ShapeLabel>,
        mut expression: TripleExpression,
    ) {
        let next_id = &mut self.next_constraint_id;
        expression.for_each_node_constraint_mut(&mut |nc| assign_id(nc, next_id));
        self.triple_expressions.insert(label.into(), expression);
    }

    /// Sets the start shape expression, used when no shape is given to the validator.
    pub fn set_start(&mut self, start: impl Into<ShapeExpression>) {
        let mut start = start.into();
        let next_id = &mut self.next_constraint_id;
        start.for_each_node_constraint_mut(&mut |nc| assign_id(nc, next_id));
        self.start = Some(start);
    }

    /// Adds an import.
    pub fn add_import(&mut self, import: NamedNode) {
        self.imports.push(import);
    }

    /// Adds a start semantic action.
    pub fn add_start_act(&mut self, sem_act: SemAct) {
        self.start_acts.push(sem_act);
    }

    /// Gets a shape declaration by label.
    pub fn shape_decl(&self, label: &ShapeLabel) -> Option<(DeclId, &ShapeDecl)> {
        let id = *self.decl_index.get(label)?;
        Some((id, self.decls.get(id.0)?))
    }

    /// Gets a shape declaration by identifier.
    pub fn decl(&self, id: DeclId) -> Option<&ShapeDecl> {
        self.decls.get(id.0)
    }

    /// Gets a labelled triple expression.
    pub fn triple_expression(&self, label: &ShapeLabel) -> Option<&TripleExpression> {
        self.triple_expressions.get(label)
    }

    /// Returns the expression itself, or the expression of the referenced declaration.
    pub fn resolve_shape_expr<'a>(
        &'a self,
        expression: &'a ShapeExpression,
    ) -> Option<&'a ShapeExpression> {
        match expression {
            ShapeExpression::ShapeRef(label) => {
                self.shape_decl(label).map(|(_, decl)| &decl.expression)
            }
            _ => Some(expression),
        }
    }

    /// Returns the expression itself, or the labelled expression it refers to.
    ///
    /// Chains of references are followed. Missing labels and reference cycles give `None`.
    pub fn resolve_triple_expr<'a>(
        &'a self,
        expression: &'a TripleExpression,
    ) -> Option<&'a TripleExpression> {
        let mut current = expression;
        for _ in 0..=self.triple_expressions.len() {
            match current {
                TripleExpression::TripleExprRef(label) => {
                    current = self.triple_expressions.get(label)?;
                }
                _ => return Some(current),
            }
        }
        None
    }

    /// Gets the start shape expression.
    pub fn start(&self) -> Option<&ShapeExpression> {
        self.start.as_ref()
    }

    /// Returns an iterator over imports.
    pub fn imports(&self) -> impl Iterator<Item = &NamedNode> {
        self.imports.iter()
    }

    /// Returns the start semantic actions.
    pub fn start_acts(&self) -> &[SemAct] {
        &self.start_acts
    }

    /// Returns an iterator over all shape declarations, in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeDecl> {
        self.decls.iter()
    }

    /// Returns true if the schema has no shape declarations.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Returns the number of shape declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Checks that every shape and triple expression reference is defined.
    pub fn validate_refs(&self) -> Result<(), ShexError> {
        let mut refs = Vec::new();
        for decl in &self.decls {
            decl.expression.collect_refs(&mut refs);
        }
        for expression in self.triple_expressions.values() {
            expression.collect_refs(&mut refs);
        }
        if let Some(start) = &self.start {
            start.collect_refs(&mut refs);
        }
        for reference in refs {
            match reference {
                Reference::Shape(label) => {
                    if !self.decl_index.contains_key(label) {
                        return Err(ShexError::unresolved_reference(label.clone()));
                    }
                }
                Reference::TripleExpression(label) => {
                    if !self.triple_expressions.contains_key(label) {
                        return Err(ShexError::unresolved_reference(label.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Compiles every `pattern` facet of the schema.
    ///
    /// Returns the error of the first pattern or flag set that is not valid.
    pub fn check_patterns(&self) -> Result<(), ShexError> {
        let mut result = Ok(());
        let mut check = |nc: &NodeConstraint| {
            if result.is_err() {
                return;
            }
            for facet in &nc.string_facets {
                if let StringFacet::Pattern { pattern, flags } = facet {
                    if let Err(e) = compile_pattern(pattern, flags.as_deref()) {
                        result = Err(e);
                        return;
                    }
                }
            }
        };
        for decl in &self.decls {
            decl.expression.for_each_node_constraint(&mut check);
        }
        for expression in self.triple_expressions.values() {
            expression.for_each_node_constraint(&mut check);
        }
        if let Some(start) = &self.start {
            start.for_each_node_constraint(&mut check);
        }
        result
    }
}

fn assign_id(constraint: &mut NodeConstraint, next_id: &mut u32) {
    constraint.set_id(ConstraintId::new(*next_id));
    *next_id += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, Shape, TripleConstraint};

    fn label(name: &str) -> ShapeLabel {
        NamedNode::new_unchecked(format!("http://example.org/{name}")).into()
    }

    fn predicate(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{name}"))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut schema = ShapesSchema::new();
        assert!(schema.is_empty());
        let id = schema.add_shape(ShapeDecl::new(
            label("S"),
            NodeConstraint::with_node_kind(NodeKind::Iri),
        ));
        assert_eq!(schema.len(), 1);
        let (found, decl) = schema.shape_decl(&label("S")).unwrap();
        assert_eq!(found, id);
        assert_eq!(decl.label, label("S"));
        assert!(schema.shape_decl(&label("T")).is_none());
    }

    #[test]
    fn test_replacing_a_declaration_keeps_its_id() {
        let mut schema = ShapesSchema::new();
        let first = schema.add_shape(ShapeDecl::new(label("S"), Shape::new()));
        let second = schema.add_shape(ShapeDecl::new(label("S"), Shape::new().closed(true)));
        assert_eq!(first, second);
        assert_eq!(schema.len(), 1);
        assert_eq!(
            schema.decl(first).map(|d| &d.expression),
            Some(&ShapeExpression::Shape(Shape::new().closed(true)))
        );
    }

    #[test]
    fn test_constraint_ids_are_distinct() {
        let mut schema = ShapesSchema::new();
        let nc = NodeConstraint::with_node_kind(NodeKind::Literal);
        schema.add_shape(ShapeDecl::new(
            label("S"),
            ShapeExpression::ShapeAnd(vec![nc.clone().into(), nc.clone().into()]),
        ));
        schema.set_start(nc);
        let mut ids = Vec::new();
        for decl in schema.shapes() {
            decl.expression
                .for_each_node_constraint(&mut |nc| ids.push(nc.id()));
        }
        if let Some(start) = schema.start() {
            start.for_each_node_constraint(&mut |nc| ids.push(nc.id()));
        }
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(Option::is_some));
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn test_resolve_shape_expr() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(ShapeDecl::new(label("S"), Shape::new()));
        let reference = ShapeExpression::reference(label("S"));
        assert_eq!(
            schema.resolve_shape_expr(&reference),
            Some(&ShapeExpression::Shape(Shape::new()))
        );
        let inline = ShapeExpression::ShapeExternal;
        assert_eq!(schema.resolve_shape_expr(&inline), Some(&inline));
        assert!(
            schema
                .resolve_shape_expr(&ShapeExpression::reference(label("missing")))
                .is_none()
        );
    }

    #[test]
    fn test_resolve_triple_expr_follows_chains() {
        let mut schema = ShapesSchema::new();
        let tc = TripleExpression::from(TripleConstraint::new(predicate("p")));
        schema.add_triple_expression(label("a"), TripleExpression::TripleExprRef(label("b")));
        schema.add_triple_expression(label("b"), tc.clone());
        let reference = TripleExpression::TripleExprRef(label("a"));
        let resolved = schema.resolve_triple_expr(&reference).unwrap();
        assert_eq!(resolved, &tc);
    }

    #[test]
    fn test_resolve_triple_expr_cycle() {
        let mut schema = ShapesSchema::new();
        schema.add_triple_expression(label("a"), TripleExpression::TripleExprRef(label("b")));
        schema.add_triple_expression(label("b"), TripleExpression::TripleExprRef(label("a")));
        assert!(
            schema
                .resolve_triple_expr(&TripleExpression::TripleExprRef(label("a")))
                .is_none()
        );
    }

    #[test]
    fn test_validate_refs() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(ShapeDecl::new(
            label("S"),
            Shape::with_expression(TripleConstraint::with_value_expr(
                predicate("p"),
                ShapeExpression::reference(label("T")),
            )),
        ));
        assert!(matches!(
            schema.validate_refs(),
            Err(ShexError::UnresolvedReference { label: l }) if l == label("T")
        ));
        schema.add_shape(ShapeDecl::new(label("T"), Shape::new()));
        assert!(schema.validate_refs().is_ok());

        schema.set_start(Shape::with_expression(TripleExpression::TripleExprRef(
            label("missing"),
        )));
        assert!(schema.validate_refs().is_err());
    }

    #[test]
    fn test_check_patterns() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(ShapeDecl::new(
            label("S"),
            NodeConstraint::new().with_string_facet(StringFacet::Pattern {
                pattern: "^a+$".into(),
                flags: Some("i".into()),
            }),
        ));
        assert!(schema.check_patterns().is_ok());
        schema.add_triple_expression(
            label("t"),
            TripleConstraint::with_value_expr(
                predicate("p"),
                NodeConstraint::new().with_string_facet(StringFacet::Pattern {
                    pattern: "[".into(),
                    flags: None,
                }),
            )
            .into(),
        );
        assert!(matches!(
            schema.check_patterns(),
            Err(ShexError::MalformedFacet { .. })
        ));
    }
}
