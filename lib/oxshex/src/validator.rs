//! ShEx validator implementation.
//!
//! This module implements the shape expression algebra of the
//! [ShEx semantics](https://shex.io/shex-semantics/): `ShapeOr`, `ShapeAnd`, `ShapeNot`,
//! node constraints and references to shape declarations.
//! Shapes themselves are delegated to the arc assignment search of the `shape` module.
//!
//! Results of shape declarations and node constraints are memoized per focus node.
//! Before recursing into a declaration a placeholder `true` result is stored,
//! so a cyclic reference back to the same (declaration, node) pair succeeds instead of looping.

use crate::error::ShexError;
use crate::limits::ValidationLimits;
use crate::model::{ConstraintId, ShapeDecl, ShapeExpression, ShapeLabel, reject_sem_acts};
use crate::node::{self, RegexCache};
use crate::result::{AssociationResult, ValidationReport, ValidationStatus};
use crate::schema::{DeclId, ShapesSchema};
use crate::shape;
use crate::shape_map::{BatchOptions, FixedAssociation, ShapeMapShape};
use oxrdf::{Graph, Term};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Identity of a memoized expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ExprId {
    Decl(DeclId),
    Constraint(ConstraintId),
}

/// Memoized results per expression and focus node.
///
/// Entries are never evicted during a validation session.
#[derive(Debug, Default)]
struct ValidationCache {
    results: FxHashMap<ExprId, FxHashMap<Term, bool>>,
}

impl ValidationCache {
    fn get(&self, expr: ExprId, node: &Term) -> Option<bool> {
        self.results.get(&expr)?.get(node).copied()
    }

    fn insert(&mut self, expr: ExprId, node: &Term, result: bool) {
        self.results
            .entry(expr)
            .or_default()
            .insert(node.clone(), result);
    }

    fn remove(&mut self, expr: ExprId, node: &Term) {
        if let Some(results) = self.results.get_mut(&expr) {
            results.remove(node);
        }
    }

    fn len(&self) -> usize {
        self.results.values().map(FxHashMap::len).sum()
    }

    fn clear(&mut self) {
        self.results.clear();
    }
}

/// ShEx validator for validating the nodes of an RDF graph against a shapes schema.
///
/// The validator owns a result cache: validating several nodes with the same validator reuses
/// the results computed for shared neighbours.
///
/// ```
/// use oxrdf::{Graph, Literal, NamedNode, TripleRef};
/// use oxshex::{ShapeDecl, Shape, ShapeLabel, ShapesSchema, ShexValidator, TripleConstraint};
///
/// let name = NamedNode::new("http://schema.org/name")?;
/// let alice = NamedNode::new("http://example.com/alice")?;
/// let person = NamedNode::new("http://example.com/Person")?;
///
/// let mut schema = ShapesSchema::new();
/// schema.add_shape(ShapeDecl::new(
///     person.clone(),
///     Shape::with_expression(TripleConstraint::new(name.clone())),
/// ));
///
/// let mut graph = Graph::new();
/// let alice_name = Literal::new_simple_literal("Alice");
/// graph.insert(TripleRef::new(alice.as_ref(), name.as_ref(), alice_name.as_ref()));
///
/// let mut validator = ShexValidator::new(&schema, &graph);
/// assert!(validator.validate(&alice.into(), Some(&ShapeLabel::Iri(person)))?);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct ShexValidator<'a> {
    schema: &'a ShapesSchema,
    graph: &'a Graph,
    limits: ValidationLimits,
    cache: ValidationCache,
    regexes: RegexCache,
    depth: usize,
}

impl<'a> ShexValidator<'a> {
    /// Creates a new validator with default limits.
    pub fn new(schema: &'a ShapesSchema, graph: &'a Graph) -> Self {
        Self::with_limits(schema, graph, ValidationLimits::default())
    }

    /// Creates a new validator with custom resource limits.
    pub fn with_limits(
        schema: &'a ShapesSchema,
        graph: &'a Graph,
        limits: ValidationLimits,
    ) -> Self {
        Self {
            schema,
            graph,
            limits,
            cache: ValidationCache::default(),
            regexes: RegexCache::new(limits.max_regex_length),
            depth: 0,
        }
    }

    /// Returns the shapes schema.
    pub fn schema(&self) -> &'a ShapesSchema {
        self.schema
    }

    /// Returns the data graph.
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Returns the resource limits.
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validates a node against a shape declaration, or against the schema start shape
    /// if no label is given.
    ///
    /// Returns `Ok(false)` if the label is not defined or if there is no start shape.
    pub fn validate(&mut self, node: &Term, shape: Option<&ShapeLabel>) -> Result<bool, ShexError> {
        let schema = self.schema;
        if schema.imports().next().is_some() {
            return Err(ShexError::not_implemented("imports"));
        }
        reject_sem_acts(schema.start_acts())?;
        match shape {
            Some(label) => self.validate_reference(node, label),
            None => {
                if let Some(start) = schema.start() {
                    self.validate_shape_expr(node, start)
                } else {
                    warn!("No shape given and the schema has no start shape");
                    Ok(false)
                }
            }
        }
    }

    /// Validates a node against a shape expression.
    ///
    /// References inside the expression are resolved against the schema.
    pub fn validate_shape_expr(
        &mut self,
        node: &Term,
        expression: &ShapeExpression,
    ) -> Result<bool, ShexError> {
        match expression {
            ShapeExpression::ShapeOr(expressions) => {
                for expression in expressions {
                    if self.validate_shape_expr(node, expression)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ShapeExpression::ShapeAnd(expressions) => {
                for expression in expressions {
                    if !self.validate_shape_expr(node, expression)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ShapeExpression::ShapeNot(expression) => Ok(!self.validate_shape_expr(node, expression)?),
            ShapeExpression::NodeConstraint(constraint) => {
                let Some(id) = constraint.id() else {
                    return node::evaluate(node, constraint, &mut self.regexes);
                };
                if let Some(result) = self.cache.get(ExprId::Constraint(id), node) {
                    return Ok(result);
                }
                let result = node::evaluate(node, constraint, &mut self.regexes)?;
                self.cache.insert(ExprId::Constraint(id), node, result);
                Ok(result)
            }
            ShapeExpression::Shape(shape) => shape::validate_shape(self, node, shape),
            ShapeExpression::ShapeExternal => Err(ShexError::not_implemented("ShapeExternal")),
            ShapeExpression::ShapeRef(label) => self.validate_reference(node, label),
        }
    }

    fn validate_reference(&mut self, node: &Term, label: &ShapeLabel) -> Result<bool, ShexError> {
        let schema = self.schema;
        if let Some((id, decl)) = schema.shape_decl(label) {
            self.validate_decl(node, id, decl)
        } else {
            warn!(shape = %label, "Undefined shape reference");
            Ok(false)
        }
    }

    fn validate_decl(
        &mut self,
        node: &Term,
        id: DeclId,
        decl: &ShapeDecl,
    ) -> Result<bool, ShexError> {
        let key = ExprId::Decl(id);
        if let Some(result) = self.cache.get(key, node) {
            return Ok(result);
        }
        if decl.is_abstract {
            return Err(ShexError::not_implemented("abstract shapes"));
        }
        if self.depth >= self.limits.max_recursion_depth {
            return Err(ShexError::MaxRecursionDepth { depth: self.depth });
        }

        self.cache.insert(key, node, true);
        self.depth += 1;
        let result = self.validate_shape_expr(node, &decl.expression);
        self.depth -= 1;
        match result {
            Ok(result) => {
                debug!(node = %node, shape = %decl.label, result, "Validated shape declaration");
                self.cache.insert(key, node, result);
                Ok(result)
            }
            Err(e) => {
                self.cache.remove(key, node);
                Err(e)
            }
        }
    }

    /// Validates a list of (node, shape) pairs.
    ///
    /// An error on one pair is recorded in its result and does not prevent the validation of the
    /// other pairs. With [`BatchOptions::fail_fast`] the validation stops after the first pair
    /// that does not conform.
    pub fn validate_shape_map(
        &mut self,
        associations: &[FixedAssociation],
        options: BatchOptions,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();
        for association in associations {
            let label = match &association.shape {
                ShapeMapShape::Label(label) => Some(label),
                ShapeMapShape::Start => None,
            };
            let status = match self.validate(&association.node, label) {
                Ok(true) => ValidationStatus::Conformant,
                Ok(false) => ValidationStatus::Nonconformant,
                Err(e) => {
                    warn!(node = %association.node, shape = %association.shape, error = %e, "Validation failed");
                    ValidationStatus::Error(e)
                }
            };
            let stop = options.fail_fast && !status.is_conformant();
            report.push(AssociationResult {
                node: association.node.clone(),
                shape: association.shape.clone(),
                status,
            });
            if stop {
                break;
            }
        }
        report
    }

    /// Returns the number of memoized results.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forgets all memoized results.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
