//! Node constraint evaluation.
//!
//! A node constraint only looks at the focus node itself, never at the graph.
//! Facets are checked in order: node kind, value set, string facets, datatype and numeric facets.

use crate::datatypes::{NumericLiteral, digit_counts, is_valid_lexical, parse_numeric};
use crate::error::ShexError;
use crate::model::{NodeConstraint, NumericFacet, StemExclusion, StringFacet, ValueSetValue};
use oxrdf::{Literal, Term};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;

/// Cache of compiled `pattern` facets, keyed by pattern and flags.
#[derive(Debug, Default)]
pub(crate) struct RegexCache {
    regexes: FxHashMap<(String, Option<String>), Regex>,
    max_length: Option<usize>,
}

impl RegexCache {
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            regexes: FxHashMap::default(),
            max_length: Some(max_length),
        }
    }

    pub(crate) fn get(&mut self, pattern: &str, flags: Option<&str>) -> Result<&Regex, ShexError> {
        match self
            .regexes
            .entry((pattern.to_owned(), flags.map(str::to_owned)))
        {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                if let Some(max_length) = self.max_length {
                    if pattern.len() > max_length {
                        return Err(ShexError::malformed_facet(
                            pattern,
                            format!("pattern is longer than the {max_length} bytes limit"),
                        ));
                    }
                }
                Ok(entry.insert(compile_pattern(pattern, flags)?))
            }
        }
    }
}

/// Compiles a XPath-style pattern with its flags.
///
/// `i`, `m`, `s` and `x` become inline flags, `q` matches the pattern literally.
pub(crate) fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, ShexError> {
    let mut inline_flags = String::new();
    let mut quote = false;
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => {
                if !inline_flags.contains(flag) {
                    inline_flags.push(flag);
                }
            }
            'q' => quote = true,
            _ => {
                return Err(ShexError::malformed_facet(
                    pattern,
                    format!("unsupported regex flag '{flag}'"),
                ));
            }
        }
    }
    let body = if quote {
        // Only case insensitivity still applies to a quoted pattern
        inline_flags.retain(|f| f == 'i');
        regex::escape(pattern)
    } else {
        pattern.to_owned()
    };
    let full = if inline_flags.is_empty() {
        body
    } else {
        format!("(?{inline_flags}){body}")
    };
    Regex::new(&full).map_err(|e| ShexError::malformed_facet(pattern, e.to_string()))
}

/// Evaluates every facet of the constraint against the node.
pub(crate) fn evaluate(
    node: &Term,
    constraint: &NodeConstraint,
    regexes: &mut RegexCache,
) -> Result<bool, ShexError> {
    if let Some(node_kind) = constraint.node_kind {
        if !node_kind.matches(node) {
            return Ok(false);
        }
    }
    if !constraint.values.is_empty() && !constraint.values.iter().any(|v| matches_value(node, v)) {
        return Ok(false);
    }
    for facet in &constraint.string_facets {
        if !check_string_facet(node, facet, regexes)? {
            return Ok(false);
        }
    }
    if let Some(datatype) = &constraint.datatype {
        let Term::Literal(literal) = node else {
            return Ok(false);
        };
        if literal.datatype() != datatype.as_ref() || !is_valid_lexical(literal.as_ref()) {
            return Ok(false);
        }
    }
    if !constraint.numeric_facets.is_empty() {
        let Term::Literal(literal) = node else {
            return Ok(false);
        };
        let Some(value) = parse_numeric(literal.as_ref()) else {
            return Ok(false);
        };
        if !constraint
            .numeric_facets
            .iter()
            .all(|facet| check_numeric_facet(literal, value, facet))
        {
            return Ok(false);
        }
    }
    Ok(true)
}

/// String used by string facets: the IRI or the lexical form.
fn string_value(node: &Term) -> Option<&str> {
    match node {
        Term::NamedNode(node) => Some(node.as_str()),
        Term::Literal(literal) => Some(literal.value()),
        Term::BlankNode(_) => None,
        #[cfg(feature = "rdf-12")]
        Term::Triple(_) => None,
    }
}

fn check_string_facet(
    node: &Term,
    facet: &StringFacet,
    regexes: &mut RegexCache,
) -> Result<bool, ShexError> {
    let Some(value) = string_value(node) else {
        return Ok(false);
    };
    Ok(match facet {
        StringFacet::Length(length) => value.chars().count() == *length,
        StringFacet::MinLength(min) => value.chars().count() >= *min,
        StringFacet::MaxLength(max) => value.chars().count() <= *max,
        StringFacet::Pattern { pattern, flags } => {
            regexes.get(pattern, flags.as_deref())?.is_match(value)
        }
    })
}

fn check_numeric_facet(literal: &Literal, value: NumericLiteral, facet: &NumericFacet) -> bool {
    match facet {
        NumericFacet::MinInclusive(bound) => matches!(
            value.compare(bound),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        NumericFacet::MinExclusive(bound) => value.compare(bound) == Some(Ordering::Greater),
        NumericFacet::MaxInclusive(bound) => {
            matches!(value.compare(bound), Some(Ordering::Less | Ordering::Equal))
        }
        NumericFacet::MaxExclusive(bound) => value.compare(bound) == Some(Ordering::Less),
        NumericFacet::TotalDigits(max) => digit_counts(literal.as_ref())
            .is_some_and(|(total, _)| u32::try_from(total).is_ok_and(|total| total <= *max)),
        NumericFacet::FractionDigits(max) => digit_counts(literal.as_ref()).is_some_and(
            |(_, fraction)| u32::try_from(fraction).is_ok_and(|fraction| fraction <= *max),
        ),
    }
}

fn matches_value(node: &Term, value: &ValueSetValue) -> bool {
    match value {
        ValueSetValue::ObjectValue(expected) => node == expected,
        ValueSetValue::IriStem(stem) => iri(node).is_some_and(|iri| iri.starts_with(stem.as_str())),
        ValueSetValue::IriStemRange { stem, exclusions } => {
            iri(node).is_some_and(|iri| in_stem_range(iri, stem, exclusions))
        }
        ValueSetValue::LiteralStem(stem) => {
            literal(node).is_some_and(|literal| literal.value().starts_with(stem.as_str()))
        }
        ValueSetValue::LiteralStemRange { stem, exclusions } => {
            literal(node).is_some_and(|literal| in_stem_range(literal.value(), stem, exclusions))
        }
        ValueSetValue::Language(tag) => {
            language(node).is_some_and(|language| language.eq_ignore_ascii_case(tag))
        }
        ValueSetValue::LanguageStem(stem) => {
            language(node).is_some_and(|language| has_language_prefix(language, stem))
        }
        ValueSetValue::LanguageStemRange { stem, exclusions } => {
            language(node).is_some_and(|language| {
                has_language_prefix(language, stem)
                    && !exclusions
                        .iter()
                        .any(|exclusion| excludes_language(exclusion, language))
            })
        }
    }
}

fn iri(node: &Term) -> Option<&str> {
    if let Term::NamedNode(node) = node {
        Some(node.as_str())
    } else {
        None
    }
}

fn literal(node: &Term) -> Option<&Literal> {
    if let Term::Literal(literal) = node {
        Some(literal)
    } else {
        None
    }
}

/// Language tag of a literal. Plain literals have none.
fn language(node: &Term) -> Option<&str> {
    literal(node)
        .and_then(Literal::language)
        .filter(|language| !language.is_empty())
}

fn in_stem_range(value: &str, stem: &str, exclusions: &[StemExclusion]) -> bool {
    value.starts_with(stem) && !exclusions.iter().any(|exclusion| exclusion.excludes(value))
}

fn has_language_prefix(language: &str, stem: &str) -> bool {
    language
        .get(..stem.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(stem))
}

fn excludes_language(exclusion: &StemExclusion, language: &str) -> bool {
    match exclusion {
        StemExclusion::Value(excluded) => language.eq_ignore_ascii_case(excluded),
        StemExclusion::Stem(stem) => has_language_prefix(language, stem),
    }
}
