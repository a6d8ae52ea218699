//! ShExJ (JSON-LD serialization of ShEx schemas) and JSON shape map loading.
//!
//! Both ShExJ 2.1 documents, where `shapes` contains `ShapeDecl` objects, and ShExJ 2.0
//! documents, where shape expressions carry their own `id`, are accepted.

use crate::datatypes::NumericLiteral;
use crate::error::ShexJsonError;
use crate::model::{
    Cardinality, NodeConstraint, NodeKind, NumericFacet, SemAct, Shape, ShapeDecl,
    ShapeExpression, ShapeLabel, StemExclusion, StringFacet, TripleConstraint, TripleExprGroup,
    TripleExpression, ValueSetValue,
};
use crate::schema::ShapesSchema;
use crate::shape_map::{
    PatternTerm, ShapeAssociation, ShapeMap, ShapeMapNode, ShapeMapShape, TriplePattern,
};
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::io::Read;
use tracing::debug;

pub(crate) fn parse_schema_str(json: &str) -> Result<ShapesSchema, ShexJsonError> {
    build_schema(serde_json::from_str(json)?)
}

pub(crate) fn parse_schema_reader(reader: impl Read) -> Result<ShapesSchema, ShexJsonError> {
    build_schema(serde_json::from_reader(reader)?)
}

pub(crate) fn parse_shape_map(json: &str) -> Result<ShapeMap, ShexJsonError> {
    let entries: Vec<JsonAssociation> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .map(association)
        .collect::<Result<Vec<_>, _>>()
        .map(ShapeMap::from)
}

#[derive(Deserialize)]
struct JsonSchema {
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default, rename = "startActs")]
    start_acts: Vec<JsonSemAct>,
    start: Option<JsonShapeExpr>,
    #[serde(default)]
    shapes: Vec<JsonShapeExpr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonShapeExpr {
    Ref(String),
    Object(JsonShapeExprObject),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum JsonShapeExprObject {
    ShapeOr {
        id: Option<String>,
        #[serde(rename = "shapeExprs")]
        shape_exprs: Vec<JsonShapeExpr>,
    },
    ShapeAnd {
        id: Option<String>,
        #[serde(rename = "shapeExprs")]
        shape_exprs: Vec<JsonShapeExpr>,
    },
    ShapeNot {
        id: Option<String>,
        #[serde(rename = "shapeExpr")]
        shape_expr: Box<JsonShapeExpr>,
    },
    NodeConstraint(JsonNodeConstraint),
    Shape(JsonShape),
    ShapeExternal {
        id: Option<String>,
    },
    ShapeDecl {
        id: String,
        #[serde(default, rename = "abstract")]
        is_abstract: bool,
        #[serde(rename = "shapeExpr")]
        shape_expr: Box<JsonShapeExpr>,
    },
}

impl JsonShapeExprObject {
    fn id(&self) -> Option<&str> {
        match self {
            Self::ShapeOr { id, .. }
            | Self::ShapeAnd { id, .. }
            | Self::ShapeNot { id, .. }
            | Self::ShapeExternal { id }
            | Self::NodeConstraint(JsonNodeConstraint { id, .. })
            | Self::Shape(JsonShape { id, .. }) => id.as_deref(),
            Self::ShapeDecl { id, .. } => Some(id),
        }
    }
}

#[derive(Deserialize)]
struct JsonNodeConstraint {
    id: Option<String>,
    #[serde(rename = "nodeKind")]
    node_kind: Option<JsonNodeKind>,
    datatype: Option<String>,
    values: Option<Vec<JsonValueSetValue>>,
    length: Option<usize>,
    minlength: Option<usize>,
    maxlength: Option<usize>,
    pattern: Option<String>,
    flags: Option<String>,
    mininclusive: Option<serde_json::Number>,
    minexclusive: Option<serde_json::Number>,
    maxinclusive: Option<serde_json::Number>,
    maxexclusive: Option<serde_json::Number>,
    totaldigits: Option<u32>,
    fractiondigits: Option<u32>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum JsonNodeKind {
    Iri,
    Bnode,
    Literal,
    Nonliteral,
}

impl From<JsonNodeKind> for NodeKind {
    fn from(kind: JsonNodeKind) -> Self {
        match kind {
            JsonNodeKind::Iri => Self::Iri,
            JsonNodeKind::Bnode => Self::BNode,
            JsonNodeKind::Literal => Self::Literal,
            JsonNodeKind::Nonliteral => Self::NonLiteral,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonValueSetValue {
    Iri(String),
    Tagged(JsonTaggedValue),
    Literal(JsonObjectLiteral),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum JsonTaggedValue {
    IriStem {
        stem: String,
    },
    IriStemRange {
        stem: JsonStem,
        #[serde(default)]
        exclusions: Vec<JsonExclusion>,
    },
    LiteralStem {
        stem: String,
    },
    LiteralStemRange {
        stem: JsonStem,
        #[serde(default)]
        exclusions: Vec<JsonExclusion>,
    },
    Language {
        #[serde(rename = "languageTag")]
        language_tag: String,
    },
    LanguageStem {
        stem: String,
    },
    LanguageStemRange {
        stem: JsonStem,
        #[serde(default)]
        exclusions: Vec<JsonExclusion>,
    },
}

/// A stem string or a `{"type": "Wildcard"}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonStem {
    Stem(String),
    Wildcard(IgnoredAny),
}

impl JsonStem {
    fn into_stem(self) -> String {
        match self {
            Self::Stem(stem) => stem,
            Self::Wildcard(_) => String::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonExclusion {
    Value(String),
    Stem(JsonStemObject),
}

impl From<JsonExclusion> for StemExclusion {
    fn from(exclusion: JsonExclusion) -> Self {
        match exclusion {
            JsonExclusion::Value(value) => Self::Value(value),
            JsonExclusion::Stem(JsonStemObject { stem }) => Self::Stem(stem),
        }
    }
}

#[derive(Deserialize)]
struct JsonStemObject {
    stem: String,
}

#[derive(Deserialize)]
struct JsonObjectLiteral {
    value: String,
    #[serde(rename = "type")]
    datatype: Option<String>,
    language: Option<String>,
}

#[derive(Deserialize)]
struct JsonShape {
    id: Option<String>,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    extra: Vec<String>,
    expression: Option<JsonTripleExpr>,
    #[serde(default)]
    extends: Vec<String>,
    #[serde(default)]
    restricts: Vec<String>,
    #[serde(default, rename = "semActs")]
    sem_acts: Vec<JsonSemAct>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTripleExpr {
    Ref(String),
    Object(JsonTripleExprObject),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum JsonTripleExprObject {
    EachOf(JsonGroup),
    OneOf(JsonGroup),
    TripleConstraint(JsonTripleConstraint),
}

impl JsonTripleExprObject {
    fn id(&self) -> Option<&str> {
        match self {
            Self::EachOf(JsonGroup { id, .. })
            | Self::OneOf(JsonGroup { id, .. })
            | Self::TripleConstraint(JsonTripleConstraint { id, .. }) => id.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct JsonGroup {
    id: Option<String>,
    expressions: Vec<JsonTripleExpr>,
    min: Option<i64>,
    max: Option<i64>,
    #[serde(default, rename = "semActs")]
    sem_acts: Vec<JsonSemAct>,
}

#[derive(Deserialize)]
struct JsonTripleConstraint {
    id: Option<String>,
    #[serde(default)]
    inverse: bool,
    predicate: String,
    #[serde(rename = "valueExpr")]
    value_expr: Option<Box<JsonShapeExpr>>,
    min: Option<i64>,
    max: Option<i64>,
    #[serde(default, rename = "semActs")]
    sem_acts: Vec<JsonSemAct>,
}

#[derive(Deserialize)]
struct JsonSemAct {
    name: String,
    code: Option<String>,
}

#[derive(Deserialize)]
struct JsonAssociation {
    node: JsonMapNode,
    shape: JsonMapKeyword,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonMapNode {
    Term(String),
    Pattern(JsonTriplePattern),
    Literal(JsonObjectLiteral),
}

#[derive(Deserialize)]
struct JsonTriplePattern {
    #[serde(default)]
    subject: Option<JsonMapKeyword>,
    predicate: String,
    #[serde(default)]
    object: Option<JsonMapKeyword>,
}

/// A term or keyword, written either as a plain string or as `{"term": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonMapKeyword {
    Text(String),
    Object { term: String },
}

impl JsonMapKeyword {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Object { term: text } => text,
        }
    }
}

fn build_schema(json: JsonSchema) -> Result<ShapesSchema, ShexJsonError> {
    let mut schema = ShapesSchema::new();
    for import in &json.imports {
        schema.add_import(iri(import)?);
    }
    for sem_act in json.start_acts {
        schema.add_start_act(sem_act.try_into()?);
    }

    let mut converter = Converter::default();
    let decls = json
        .shapes
        .into_iter()
        .map(|shape| converter.declaration(shape))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(start) = json.start {
        schema.set_start(converter.shape_expr(start)?);
    }

    // Top level declarations win over inline labelled expressions.
    for decl in converter.inline_decls.into_iter().chain(decls) {
        schema.add_shape(decl);
    }
    for (label, expression) in converter.triple_expressions {
        schema.add_triple_expression(label, expression);
    }
    debug!(
        shapes = schema.len(),
        imports = json.imports.len(),
        "loaded ShExJ schema"
    );
    Ok(schema)
}

/// Converts ShExJ expressions while collecting the labelled sub-expressions.
#[derive(Default)]
struct Converter {
    inline_decls: Vec<ShapeDecl>,
    triple_expressions: Vec<(ShapeLabel, TripleExpression)>,
}

impl Converter {
    fn declaration(&mut self, expr: JsonShapeExpr) -> Result<ShapeDecl, ShexJsonError> {
        let object = match expr {
            JsonShapeExpr::Ref(label) => {
                return Err(ShexJsonError::invalid_schema(format!(
                    "the shapes list contains the bare reference '{label}'"
                )));
            }
            JsonShapeExpr::Object(object) => object,
        };
        if let JsonShapeExprObject::ShapeDecl {
            id,
            is_abstract,
            shape_expr,
        } = object
        {
            return Ok(ShapeDecl {
                label: label(&id)?,
                is_abstract,
                expression: self.shape_expr(*shape_expr)?,
            });
        }
        let Some(id) = object.id().map(label).transpose()? else {
            return Err(ShexJsonError::invalid_schema(
                "a shape expression of the shapes list has no id",
            ));
        };
        Ok(ShapeDecl::new(id, self.shape_expr_object(object)?))
    }

    fn shape_expr(&mut self, expr: JsonShapeExpr) -> Result<ShapeExpression, ShexJsonError> {
        match expr {
            JsonShapeExpr::Ref(reference) => Ok(ShapeExpression::ShapeRef(label(&reference)?)),
            JsonShapeExpr::Object(object) => {
                let id = object.id().map(label).transpose()?;
                let expression = self.shape_expr_object(object)?;
                if let Some(id) = id {
                    self.inline_decls
                        .push(ShapeDecl::new(id, expression.clone()));
                }
                Ok(expression)
            }
        }
    }

    fn shape_exprs(
        &mut self,
        exprs: Vec<JsonShapeExpr>,
    ) -> Result<Vec<ShapeExpression>, ShexJsonError> {
        exprs
            .into_iter()
            .map(|expr| self.shape_expr(expr))
            .collect()
    }

    fn shape_expr_object(
        &mut self,
        object: JsonShapeExprObject,
    ) -> Result<ShapeExpression, ShexJsonError> {
        Ok(match object {
            JsonShapeExprObject::ShapeOr { shape_exprs, .. } => {
                ShapeExpression::ShapeOr(self.shape_exprs(shape_exprs)?)
            }
            JsonShapeExprObject::ShapeAnd { shape_exprs, .. } => {
                ShapeExpression::ShapeAnd(self.shape_exprs(shape_exprs)?)
            }
            JsonShapeExprObject::ShapeNot { shape_expr, .. } => {
                ShapeExpression::ShapeNot(Box::new(self.shape_expr(*shape_expr)?))
            }
            JsonShapeExprObject::NodeConstraint(constraint) => node_constraint(constraint)?,
            JsonShapeExprObject::Shape(shape) => self.shape(shape)?.into(),
            JsonShapeExprObject::ShapeExternal { .. } => ShapeExpression::ShapeExternal,
            JsonShapeExprObject::ShapeDecl { id, .. } => {
                return Err(ShexJsonError::invalid_schema(format!(
                    "the shape declaration '{id}' is not in the shapes list"
                )));
            }
        })
    }

    fn shape(&mut self, shape: JsonShape) -> Result<Shape, ShexJsonError> {
        Ok(Shape {
            closed: shape.closed,
            extra: shape
                .extra
                .iter()
                .map(|predicate| iri(predicate))
                .collect::<Result<_, _>>()?,
            expression: shape
                .expression
                .map(|expr| self.triple_expr(expr))
                .transpose()?,
            extends: labels(&shape.extends)?,
            restricts: labels(&shape.restricts)?,
            sem_acts: sem_acts(shape.sem_acts)?,
        })
    }

    fn triple_expr(&mut self, expr: JsonTripleExpr) -> Result<TripleExpression, ShexJsonError> {
        let object = match expr {
            JsonTripleExpr::Ref(reference) => {
                return Ok(TripleExpression::TripleExprRef(label(&reference)?));
            }
            JsonTripleExpr::Object(object) => object,
        };
        let id = object.id().map(label).transpose()?;
        let expression = match object {
            JsonTripleExprObject::EachOf(group) => TripleExpression::EachOf(self.group(group)?),
            JsonTripleExprObject::OneOf(group) => TripleExpression::OneOf(self.group(group)?),
            JsonTripleExprObject::TripleConstraint(constraint) => {
                TripleExpression::TripleConstraint(self.triple_constraint(constraint)?)
            }
        };
        if let Some(id) = id {
            self.triple_expressions.push((id, expression.clone()));
        }
        Ok(expression)
    }

    fn group(&mut self, group: JsonGroup) -> Result<TripleExprGroup, ShexJsonError> {
        Ok(TripleExprGroup {
            expressions: group
                .expressions
                .into_iter()
                .map(|expr| self.triple_expr(expr))
                .collect::<Result<_, _>>()?,
            cardinality: if group.min.is_none() && group.max.is_none() {
                None
            } else {
                Some(cardinality(group.min, group.max)?)
            },
            sem_acts: sem_acts(group.sem_acts)?,
        })
    }

    fn triple_constraint(
        &mut self,
        constraint: JsonTripleConstraint,
    ) -> Result<TripleConstraint, ShexJsonError> {
        Ok(TripleConstraint {
            predicate: iri(&constraint.predicate)?,
            inverse: constraint.inverse,
            value_expr: constraint
                .value_expr
                .map(|expr| self.shape_expr(*expr))
                .transpose()?
                .map(Box::new),
            cardinality: cardinality(constraint.min, constraint.max)?,
            sem_acts: sem_acts(constraint.sem_acts)?,
        })
    }
}

fn node_constraint(json: JsonNodeConstraint) -> Result<ShapeExpression, ShexJsonError> {
    let mut constraint = NodeConstraint::new();
    constraint.node_kind = json.node_kind.map(NodeKind::from);
    constraint.datatype = json.datatype.as_deref().map(iri).transpose()?;

    if let Some(length) = json.length {
        constraint.string_facets.push(StringFacet::Length(length));
    }
    if let Some(length) = json.minlength {
        constraint.string_facets.push(StringFacet::MinLength(length));
    }
    if let Some(length) = json.maxlength {
        constraint.string_facets.push(StringFacet::MaxLength(length));
    }
    if let Some(pattern) = json.pattern {
        constraint.string_facets.push(StringFacet::Pattern {
            pattern,
            flags: json.flags,
        });
    }

    if let Some(value) = &json.mininclusive {
        constraint
            .numeric_facets
            .push(NumericFacet::MinInclusive(number(value)?));
    }
    if let Some(value) = &json.minexclusive {
        constraint
            .numeric_facets
            .push(NumericFacet::MinExclusive(number(value)?));
    }
    if let Some(value) = &json.maxinclusive {
        constraint
            .numeric_facets
            .push(NumericFacet::MaxInclusive(number(value)?));
    }
    if let Some(value) = &json.maxexclusive {
        constraint
            .numeric_facets
            .push(NumericFacet::MaxExclusive(number(value)?));
    }
    if let Some(digits) = json.totaldigits {
        constraint
            .numeric_facets
            .push(NumericFacet::TotalDigits(digits));
    }
    if let Some(digits) = json.fractiondigits {
        constraint
            .numeric_facets
            .push(NumericFacet::FractionDigits(digits));
    }

    if let Some(values) = json.values {
        if values.is_empty() {
            // An empty value set matches no node
            return Ok(ShapeExpression::ShapeOr(Vec::new()));
        }
        constraint.values = values
            .into_iter()
            .map(value_set_value)
            .collect::<Result<_, _>>()?;
    }
    Ok(constraint.into())
}

fn value_set_value(value: JsonValueSetValue) -> Result<ValueSetValue, ShexJsonError> {
    Ok(match value {
        JsonValueSetValue::Iri(value) => iri(&value)?.into(),
        JsonValueSetValue::Literal(literal_value) => literal(literal_value)?.into(),
        JsonValueSetValue::Tagged(JsonTaggedValue::IriStem { stem }) => {
            ValueSetValue::IriStem(stem)
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::IriStemRange { stem, exclusions }) => {
            ValueSetValue::IriStemRange {
                stem: stem.into_stem(),
                exclusions: exclusions.into_iter().map(Into::into).collect(),
            }
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::LiteralStem { stem }) => {
            ValueSetValue::LiteralStem(stem)
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::LiteralStemRange { stem, exclusions }) => {
            ValueSetValue::LiteralStemRange {
                stem: stem.into_stem(),
                exclusions: exclusions.into_iter().map(Into::into).collect(),
            }
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::Language { language_tag }) => {
            ValueSetValue::Language(language_tag)
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::LanguageStem { stem }) => {
            ValueSetValue::LanguageStem(stem)
        }
        JsonValueSetValue::Tagged(JsonTaggedValue::LanguageStemRange { stem, exclusions }) => {
            ValueSetValue::LanguageStemRange {
                stem: stem.into_stem(),
                exclusions: exclusions.into_iter().map(Into::into).collect(),
            }
        }
    })
}

impl TryFrom<JsonSemAct> for SemAct {
    type Error = ShexJsonError;

    fn try_from(sem_act: JsonSemAct) -> Result<Self, Self::Error> {
        Ok(Self {
            name: iri(&sem_act.name)?,
            code: sem_act.code,
        })
    }
}

fn sem_acts(sem_acts: Vec<JsonSemAct>) -> Result<Vec<SemAct>, ShexJsonError> {
    sem_acts.into_iter().map(SemAct::try_from).collect()
}

/// Missing bounds default to 1 and a maximum of -1 means unbounded.
fn cardinality(min: Option<i64>, max: Option<i64>) -> Result<Cardinality, ShexJsonError> {
    let (min, max) = (min.unwrap_or(1), max.unwrap_or(1));
    let invalid = || ShexJsonError::InvalidCardinality { min, max };
    let lower = u32::try_from(min).map_err(|_| invalid())?;
    let upper = if max == -1 {
        None
    } else {
        Some(u32::try_from(max).map_err(|_| invalid())?)
    };
    Cardinality::new(lower, upper).ok_or_else(invalid)
}

fn number(value: &serde_json::Number) -> Result<NumericLiteral, ShexJsonError> {
    let value = value.to_string();
    value
        .parse()
        .map_err(|_| ShexJsonError::InvalidNumber { value })
}

fn iri(value: &str) -> Result<NamedNode, ShexJsonError> {
    NamedNode::new(value).map_err(|error| ShexJsonError::InvalidIri {
        iri: value.to_owned(),
        error,
    })
}

fn blank_node(value: &str) -> Result<BlankNode, ShexJsonError> {
    BlankNode::new(value).map_err(|error| ShexJsonError::InvalidBlankNode {
        id: value.to_owned(),
        error,
    })
}

/// `_:id` strings are blank nodes, everything else is an IRI.
fn label(value: &str) -> Result<ShapeLabel, ShexJsonError> {
    Ok(match value.strip_prefix("_:") {
        Some(id) => blank_node(id)?.into(),
        None => iri(value)?.into(),
    })
}

fn labels(values: &[String]) -> Result<Vec<ShapeLabel>, ShexJsonError> {
    values.iter().map(|value| label(value)).collect()
}

fn term(value: &str) -> Result<Term, ShexJsonError> {
    Ok(match value.strip_prefix("_:") {
        Some(id) => blank_node(id)?.into(),
        None => iri(value)?.into(),
    })
}

fn literal(json: JsonObjectLiteral) -> Result<Literal, ShexJsonError> {
    if let Some(language) = json.language {
        return Literal::new_language_tagged_literal(json.value, language.as_str()).map_err(
            |error| ShexJsonError::InvalidLanguageTag {
                tag: language,
                error,
            },
        );
    }
    Ok(match json.datatype {
        Some(datatype) => Literal::new_typed_literal(json.value, iri(&datatype)?),
        None => Literal::new_simple_literal(json.value),
    })
}

fn association(json: JsonAssociation) -> Result<ShapeAssociation, ShexJsonError> {
    let node = match json.node {
        JsonMapNode::Term(value) => ShapeMapNode::Node(term(&value)?),
        JsonMapNode::Literal(value) => ShapeMapNode::Node(literal(value)?.into()),
        JsonMapNode::Pattern(pattern) => ShapeMapNode::Pattern(triple_pattern(pattern)?),
    };
    let shape = match json.shape.into_text().as_str() {
        "START" => ShapeMapShape::Start,
        shape => ShapeMapShape::Label(label(shape)?),
    };
    Ok(ShapeAssociation { node, shape })
}

enum PatternPosition {
    Focus,
    Term(PatternTerm),
}

fn pattern_position(value: Option<JsonMapKeyword>) -> Result<PatternPosition, ShexJsonError> {
    let Some(value) = value else {
        return Ok(PatternPosition::Term(PatternTerm::Wildcard));
    };
    Ok(match value.into_text().as_str() {
        "FOCUS" => PatternPosition::Focus,
        "_" => PatternPosition::Term(PatternTerm::Wildcard),
        value => PatternPosition::Term(PatternTerm::Term(term(value)?)),
    })
}

fn triple_pattern(json: JsonTriplePattern) -> Result<TriplePattern, ShexJsonError> {
    let predicate = iri(&json.predicate)?;
    match (
        pattern_position(json.subject)?,
        pattern_position(json.object)?,
    ) {
        (PatternPosition::Focus, PatternPosition::Term(object)) => {
            Ok(TriplePattern::FocusSubject { predicate, object })
        }
        (PatternPosition::Term(subject), PatternPosition::Focus) => {
            Ok(TriplePattern::FocusObject { subject, predicate })
        }
        (PatternPosition::Focus, PatternPosition::Focus)
        | (PatternPosition::Term(_), PatternPosition::Term(_)) => {
            Err(ShexJsonError::invalid_shape_map(format!(
                "the triple pattern on <{}> must contain FOCUS exactly once",
                predicate.as_str()
            )))
        }
    }
}
