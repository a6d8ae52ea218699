//! Error types for ShEx validation.

use crate::model::ShapeLabel;
use oxrdf::{BlankNodeIdParseError, IriParseError, LanguageTagParseError};

/// Error raised while validating a node against a shapes schema.
///
/// A node that simply does not conform is not an error: validation returns `Ok(false)`.
/// These errors mean that the result is unknown.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ShexError {
    /// The schema relies on a ShEx feature that is not supported.
    #[error("Not yet implemented: {feature}")]
    NotImplemented { feature: String },

    /// A shape or triple expression label has no definition in the schema.
    #[error("Undefined reference: {label}")]
    UnresolvedReference { label: ShapeLabel },

    /// The number of possible arc assignments reached the configured ceiling.
    #[error(
        "Too many possible arc assignments: {complexity}, limit is {limit}. \
        The validation result is unknown."
    )]
    SearchSpaceExceeded { complexity: usize, limit: usize },

    /// A facet that cannot be evaluated, like an invalid regular expression.
    #[error("Invalid pattern '{pattern}': {message}")]
    MalformedFacet { pattern: String, message: String },

    /// Shape references are nested too deeply.
    #[error("Maximum recursion depth ({depth}) exceeded during validation")]
    MaxRecursionDepth { depth: usize },
}

impl ShexError {
    /// Creates a not implemented error.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Creates an unresolved reference error.
    pub fn unresolved_reference(label: impl Into<ShapeLabel>) -> Self {
        Self::UnresolvedReference {
            label: label.into(),
        }
    }

    /// Creates a malformed facet error.
    pub fn malformed_facet(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFacet {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error means the schema uses an unsupported feature.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

/// Error raised while loading a ShExJ schema or a JSON shape map.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexJsonError {
    /// The input is not valid JSON or does not follow the ShExJ structure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid IRI.
    #[error("Invalid IRI '{iri}': {error}")]
    InvalidIri {
        iri: String,
        #[source]
        error: IriParseError,
    },

    /// Invalid blank node identifier.
    #[error("Invalid blank node identifier '{id}': {error}")]
    InvalidBlankNode {
        id: String,
        #[source]
        error: BlankNodeIdParseError,
    },

    /// Invalid language tag in a literal.
    #[error("Invalid language tag '{tag}': {error}")]
    InvalidLanguageTag {
        tag: String,
        #[source]
        error: LanguageTagParseError,
    },

    /// Cardinality with a negative minimum or a maximum lower than the minimum.
    #[error("Invalid cardinality: min={min}, max={max}")]
    InvalidCardinality { min: i64, max: i64 },

    /// Numeric facet that is not a number.
    #[error("Invalid numeric value '{value}'")]
    InvalidNumber { value: String },

    /// The schema structure is not supported, like a shape without label.
    #[error("Invalid ShExJ schema: {message}")]
    InvalidSchema { message: String },

    /// Invalid shape map entry.
    #[error("Invalid shape map: {message}")]
    InvalidShapeMap { message: String },
}

impl ShexJsonError {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an invalid shape map error.
    pub fn invalid_shape_map(message: impl Into<String>) -> Self {
        Self::InvalidShapeMap {
            message: message.into(),
        }
    }
}
