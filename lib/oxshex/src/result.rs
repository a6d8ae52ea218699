//! Validation report types.
//!
//! This module provides types for representing the results of the validation of a shape map.

use crate::error::ShexError;
use crate::shape_map::ShapeMapShape;
use oxrdf::Term;
use std::fmt;

/// Outcome of the validation of one (node, shape) pair.
#[derive(Debug, Clone)]
pub enum ValidationStatus {
    /// The node conforms to the shape.
    Conformant,
    /// The node does not conform to the shape.
    Nonconformant,
    /// The result is unknown.
    Error(ShexError),
}

impl ValidationStatus {
    /// Returns true if the node conforms to the shape.
    pub fn is_conformant(&self) -> bool {
        matches!(self, Self::Conformant)
    }

    /// Returns the error if the validation failed.
    pub fn error(&self) -> Option<&ShexError> {
        if let Self::Error(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

/// Result of the validation of one (node, shape) pair.
#[derive(Debug, Clone)]
pub struct AssociationResult {
    /// Focus node.
    pub node: Term,
    /// Shape the node was validated against.
    pub shape: ShapeMapShape,
    /// Outcome.
    pub status: ValidationStatus,
}

impl fmt::Display for AssociationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ", self.node, self.shape)?;
        match &self.status {
            ValidationStatus::Conformant => f.write_str("passed"),
            ValidationStatus::Nonconformant => f.write_str("failed"),
            ValidationStatus::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Results of the validation of a list of (node, shape) pairs, in input order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    results: Vec<AssociationResult>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result.
    pub fn push(&mut self, result: AssociationResult) {
        self.results.push(result);
    }

    /// Returns true if every evaluated pair conforms.
    pub fn conforms(&self) -> bool {
        self.results.iter().all(|r| r.status.is_conformant())
    }

    /// Returns all results.
    pub fn results(&self) -> &[AssociationResult] {
        &self.results
    }

    /// Returns the results of the pairs that do not conform, including errors.
    pub fn failures(&self) -> impl Iterator<Item = &AssociationResult> {
        self.results.iter().filter(|r| !r.status.is_conformant())
    }

    /// Returns the number of evaluated pairs.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no pair was evaluated.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl IntoIterator for ValidationReport {
    type Item = AssociationResult;
    type IntoIter = std::vec::IntoIter<AssociationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a AssociationResult;
    type IntoIter = std::slice::Iter<'a, AssociationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn result(status: ValidationStatus) -> AssociationResult {
        AssociationResult {
            node: NamedNode::new_unchecked("http://example.org/n").into(),
            shape: ShapeMapShape::Start,
            status,
        }
    }

    #[test]
    fn test_empty_report_conforms() {
        let report = ValidationReport::new();
        assert!(report.conforms());
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_conformance() {
        let mut report = ValidationReport::new();
        report.push(result(ValidationStatus::Conformant));
        assert!(report.conforms());
        report.push(result(ValidationStatus::Error(ShexError::not_implemented(
            "imports",
        ))));
        report.push(result(ValidationStatus::Nonconformant));
        assert!(!report.conforms());
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.len(), 3);
        assert!(report.results()[1].status.error().is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            result(ValidationStatus::Nonconformant).to_string(),
            "<http://example.org/n>@START failed"
        );
        assert_eq!(
            result(ValidationStatus::Error(ShexError::not_implemented("imports"))).to_string(),
            "<http://example.org/n>@START error: Not yet implemented: imports"
        );
    }
}
