//! Shape constraint-satisfaction engine.
//!
//! Validating a node against a [`Shape`] means finding an assignment of the arcs around the
//! node to the triple constraints of the shape such that:
//! - every arc is assigned to exactly one triple constraint whose predicate, direction and value
//!   expression it matches, or to the implicit "extra" slot when the shape allows it;
//! - the number of arcs assigned to each triple constraint satisfies its cardinality;
//! - the `EachOf`/`OneOf` tree evaluates to true in the three-valued logic below.
//!
//! The assignments are enumerated exhaustively, each branch of the search working on its own
//! copy of the per-slot counts. The search is refused if its size reaches
//! [`ValidationLimits::max_search_space`](crate::ValidationLimits::max_search_space).

use crate::error::ShexError;
use crate::model::{
    Cardinality, Shape, ShapeLabel, TripleConstraint, TripleExpression, reject_sem_acts,
};
use crate::schema::ShapesSchema;
use crate::validator::ShexValidator;
use oxrdf::{Graph, NamedNode, NamedNodeRef, Term, TermRef};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

/// Result of a sub-expression for an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Satisfaction {
    False,
    /// Satisfied without any witness arc.
    OptionallyTrue,
    /// Satisfied with at least one witness arc.
    True,
}

impl Satisfaction {
    fn is_satisfied(self) -> bool {
        self != Self::False
    }
}

/// Triple expression compiled against the slots of a shape.
#[derive(Debug)]
enum BooleanExpression {
    And(Vec<BooleanExpression>),
    Or(Vec<BooleanExpression>),
    Value(Satisfaction),
    Slot(usize),
}

impl BooleanExpression {
    fn evaluate(&self, slots: &[&TripleConstraint], counts: &[usize]) -> Satisfaction {
        match self {
            Self::Value(value) => *value,
            Self::Slot(slot) => {
                let count = counts[*slot];
                if !slots[*slot].cardinality.allows(count) {
                    Satisfaction::False
                } else if count > 0 {
                    Satisfaction::True
                } else {
                    Satisfaction::OptionallyTrue
                }
            }
            Self::And(children) => {
                let mut witnessed = false;
                for child in children {
                    match child.evaluate(slots, counts) {
                        Satisfaction::False => return Satisfaction::False,
                        Satisfaction::True => witnessed = true,
                        Satisfaction::OptionallyTrue => (),
                    }
                }
                if witnessed {
                    Satisfaction::True
                } else {
                    Satisfaction::OptionallyTrue
                }
            }
            Self::Or(children) => {
                let mut witnessed = 0;
                let mut optional = false;
                for child in children {
                    match child.evaluate(slots, counts) {
                        Satisfaction::True => witnessed += 1,
                        Satisfaction::OptionallyTrue => optional = true,
                        Satisfaction::False => (),
                    }
                }
                match witnessed {
                    1 => Satisfaction::True,
                    0 if optional => Satisfaction::OptionallyTrue,
                    _ => Satisfaction::False,
                }
            }
        }
    }
}

/// Builds the boolean expression of a triple expression, registering its triple constraints
/// as slots.
struct Compiler<'e> {
    schema: &'e ShapesSchema,
    slots: Vec<&'e TripleConstraint>,
    expanding: Vec<&'e ShapeLabel>,
}

impl<'e> Compiler<'e> {
    fn compile(&mut self, expression: &'e TripleExpression) -> Result<BooleanExpression, ShexError> {
        Ok(match expression {
            TripleExpression::EachOf(group) | TripleExpression::OneOf(group) => {
                if group.cardinality.is_some_and(|c| c != Cardinality::default()) {
                    return Err(ShexError::not_implemented(
                        "cardinality on EachOf and OneOf",
                    ));
                }
                reject_sem_acts(&group.sem_acts)?;
                let children = group
                    .expressions
                    .iter()
                    .map(|e| self.compile(e))
                    .collect::<Result<Vec<_>, _>>()?;
                if matches!(expression, TripleExpression::EachOf(_)) {
                    BooleanExpression::And(children)
                } else {
                    BooleanExpression::Or(children)
                }
            }
            TripleExpression::TripleConstraint(constraint) => {
                reject_sem_acts(&constraint.sem_acts)?;
                self.slots.push(constraint);
                BooleanExpression::Slot(self.slots.len() - 1)
            }
            TripleExpression::TripleExprRef(label) => {
                if self.expanding.contains(&label) {
                    return Err(ShexError::not_implemented(
                        "recursive triple expression references",
                    ));
                }
                let Some(resolved) = self.schema.resolve_triple_expr(expression) else {
                    if self.schema.triple_expression(label).is_some() {
                        // defined, so the chain loops back on itself
                        return Err(ShexError::not_implemented(
                            "recursive triple expression references",
                        ));
                    }
                    warn!(label = %label, "Undefined triple expression reference");
                    return Ok(BooleanExpression::Value(Satisfaction::False));
                };
                self.expanding.push(label);
                let compiled = self.compile(resolved);
                self.expanding.pop();
                compiled?
            }
        })
    }
}

/// Where an arc may be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotRef {
    Constraint(usize),
    /// Unconstrained slot for arcs allowed by `EXTRA` or by an open shape.
    Extra,
}

/// Arc around the focus node.
#[derive(Debug)]
struct Arc {
    inverse: bool,
    predicate: NamedNode,
    neighbour: Term,
}

fn outgoing_arcs(graph: &Graph, node: &Term) -> Vec<Arc> {
    let arc = |predicate: NamedNodeRef<'_>, object: TermRef<'_>| Arc {
        inverse: false,
        predicate: predicate.into_owned(),
        neighbour: object.into_owned(),
    };
    match node {
        Term::NamedNode(node) => graph
            .triples_for_subject(node.as_ref())
            .map(|t| arc(t.predicate, t.object))
            .collect(),
        Term::BlankNode(node) => graph
            .triples_for_subject(node.as_ref())
            .map(|t| arc(t.predicate, t.object))
            .collect(),
        Term::Literal(_) => Vec::new(),
        #[cfg(feature = "rdf-12")]
        Term::Triple(_) => Vec::new(),
    }
}

fn incoming_arcs(graph: &Graph, node: &Term) -> Vec<Arc> {
    graph
        .triples_for_object(node.as_ref())
        .map(|t| Arc {
            inverse: true,
            predicate: t.predicate.into_owned(),
            neighbour: t.subject.into_owned().into(),
        })
        .collect()
}

/// Validates a node against a shape.
pub(crate) fn validate_shape(
    validator: &mut ShexValidator<'_>,
    node: &Term,
    shape: &Shape,
) -> Result<bool, ShexError> {
    reject_sem_acts(&shape.sem_acts)?;
    if !shape.extends.is_empty() {
        return Err(ShexError::not_implemented("EXTENDS"));
    }
    if !shape.restricts.is_empty() {
        return Err(ShexError::not_implemented("RESTRICTS"));
    }

    let mut compiler = Compiler {
        schema: validator.schema(),
        slots: Vec::new(),
        expanding: Vec::new(),
    };
    let expression = match &shape.expression {
        Some(expression) => compiler.compile(expression)?,
        None => BooleanExpression::Value(Satisfaction::True),
    };
    let slots = compiler.slots;

    let mentioned = slots
        .iter()
        .filter(|slot| !slot.inverse)
        .map(|slot| &slot.predicate)
        .collect::<FxHashSet<_>>();
    let has_inverse = slots.iter().any(|slot| slot.inverse);

    let graph = validator.graph();
    let mut arcs = outgoing_arcs(graph, node);
    if has_inverse {
        arcs.extend(incoming_arcs(graph, node));
    }

    // Eligible slots of every arc
    let mut items = Vec::with_capacity(arcs.len());
    for arc in &arcs {
        let mut eligible = Vec::new();
        for (i, slot) in slots.iter().enumerate() {
            if slot.inverse != arc.inverse || slot.predicate != arc.predicate {
                continue;
            }
            if let Some(value_expr) = &slot.value_expr {
                if !validator.validate_shape_expr(&arc.neighbour, value_expr)? {
                    debug!(
                        node = %node,
                        predicate = %arc.predicate,
                        value = %arc.neighbour,
                        "Value does not match the triple constraint"
                    );
                    continue;
                }
            }
            eligible.push(SlotRef::Constraint(i));
        }
        if arc.inverse {
            // Incoming arcs only matter for the inverse constraints they match
            if !eligible.is_empty() {
                items.push(eligible);
            }
            continue;
        }
        let is_extra = shape.extra.contains(&arc.predicate);
        if is_extra || (!shape.closed && !mentioned.contains(&arc.predicate)) {
            eligible.push(SlotRef::Extra);
        }
        if eligible.is_empty() {
            debug!(
                node = %node,
                predicate = %arc.predicate,
                value = %arc.neighbour,
                "Arc not allowed by the shape"
            );
            return Ok(false);
        }
        items.push(eligible);
    }

    let mut counts = vec![0; slots.len()];
    let mut choices = Vec::new();
    for eligible in &items {
        match eligible.as_slice() {
            [SlotRef::Constraint(i)] => counts[*i] += 1,
            [SlotRef::Extra] => (),
            _ => choices.push(eligible.as_slice()),
        }
    }

    if !choices.is_empty() {
        let complexity = choices
            .iter()
            .fold(1_usize, |product, eligible| product.saturating_mul(eligible.len()));
        let limit = validator.limits().max_search_space;
        debug!(node = %node, complexity, "Searching arc assignments");
        if complexity >= limit {
            return Err(ShexError::SearchSpaceExceeded { complexity, limit });
        }
    }

    Ok(search(&expression, &slots, &choices, counts))
}

/// Depth-first search over the choices of the remaining arcs.
fn search(
    expression: &BooleanExpression,
    slots: &[&TripleConstraint],
    choices: &[&[SlotRef]],
    counts: Vec<usize>,
) -> bool {
    let Some((eligible, rest)) = choices.split_first() else {
        let result = expression.evaluate(slots, &counts);
        trace!(?counts, ?result, "Tried arc assignment");
        return result.is_satisfied();
    };
    eligible.iter().any(|slot| {
        let mut branch = counts.clone();
        if let SlotRef::Constraint(i) = slot {
            branch[*i] += 1;
        }
        search(expression, slots, rest, branch)
    })
}
