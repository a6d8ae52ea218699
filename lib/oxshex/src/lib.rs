//! ShEx (Shape Expressions) validation for RDF graphs.
//!
//! This crate validates nodes of an [`oxrdf::Graph`] against a [ShEx](https://shex.io/) schema.
//! Schemas are built programmatically or loaded from their ShExJ serialization
//! with [`ShapesSchema::from_shexj_str`].
//!
//! # Core Concepts
//!
//! - **Schema**: shape declarations and labelled triple expressions ([`ShapesSchema`])
//! - **Shape Expression**: boolean algebra over node constraints and shapes ([`ShapeExpression`])
//! - **Validation**: checking if a node conforms to a shape ([`ShexValidator`])
//! - **Shape map**: the (node, shape) pairs to check in one run ([`ShapeMap`], [`ValidationReport`])
//!
//! # Quick Start
//!
//! ```
//! use oxrdf::{Graph, Literal, NamedNode, TripleRef};
//! use oxshex::{BatchOptions, FixedAssociation, ShapeLabel, ShapesSchema, ShexValidator};
//!
//! let schema = ShapesSchema::from_shexj_str(
//!     r#"{
//!         "type": "Schema",
//!         "shapes": [{
//!             "type": "ShapeDecl",
//!             "id": "http://example.com/Person",
//!             "shapeExpr": {
//!                 "type": "Shape",
//!                 "expression": {
//!                     "type": "TripleConstraint",
//!                     "predicate": "http://schema.org/name",
//!                     "valueExpr": {"type": "NodeConstraint", "nodeKind": "literal"}
//!                 }
//!             }
//!         }]
//!     }"#,
//! )?;
//!
//! let alice = NamedNode::new("http://example.com/alice")?;
//! let name = NamedNode::new("http://schema.org/name")?;
//! let mut graph = Graph::new();
//! graph.insert(TripleRef::new(
//!     alice.as_ref(),
//!     name.as_ref(),
//!     Literal::new_simple_literal("Alice").as_ref(),
//! ));
//!
//! let person = ShapeLabel::from(NamedNode::new("http://example.com/Person")?);
//! let mut validator = ShexValidator::new(&schema, &graph);
//! let report = validator.validate_shape_map(
//!     &[FixedAssociation::new(alice, person)],
//!     BatchOptions::default(),
//! );
//! assert!(report.conforms());
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```
//!
//! # Unsupported features
//!
//! Imports, semantic actions, external shapes, `abstract` declarations, `EXTENDS`/`RESTRICTS`
//! and cardinalities on `EachOf`/`OneOf` groups are reported with [`ShexError::NotImplemented`]
//! instead of being approximated.

#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod datatypes;
mod error;
mod limits;
mod model;
mod node;
mod result;
mod schema;
mod shape;
mod shape_map;
mod shexj;
mod validator;

pub use datatypes::{
    NumericLiteral, ParseNumericLiteralError, is_numeric_datatype, is_valid_lexical,
    parse_numeric,
};
pub use error::{ShexError, ShexJsonError};
pub use limits::{
    DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_MAX_REGEX_LENGTH, DEFAULT_MAX_SEARCH_SPACE,
    ValidationLimits,
};
pub use model::{
    Cardinality, ConstraintId, NodeConstraint, NodeKind, NumericFacet, SemAct, Shape, ShapeDecl,
    ShapeExpression, ShapeLabel, StemExclusion, StringFacet, TripleConstraint, TripleExprGroup,
    TripleExpression, ValueSetValue,
};
pub use result::{AssociationResult, ValidationReport, ValidationStatus};
pub use schema::{DeclId, ShapesSchema};
pub use shape_map::{
    BatchOptions, FixedAssociation, PatternTerm, ShapeAssociation, ShapeMap, ShapeMapNode,
    ShapeMapShape, TriplePattern, resolve_shape_map,
};
pub use validator::ShexValidator;
