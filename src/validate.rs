//! Schema validator (component C).
//!
//! A one-shot pass over the schema, run eagerly when a [`crate::parser::Parser`] is constructed
//! (§4.1). Mirrors the shape of `gong`'s `options::validation`/`commands::validation` modules: a
//! `detail` flag controls whether the walk stops at the first flaw (fast `is_valid`-style check) or
//! collects every flaw found.

use std::collections::HashSet;
use std::fmt;

use crate::requirement::Requirement;
use crate::schema::{OptionKind, Positional, Schema};
use crate::value::Value;

/// A single schema inconsistency (§4.1, §7 "Schema errors").
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub option_key: Option<String>,
    pub detail: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.option_key {
            Some(key) => write!(f, "{:?} ({key}): {}", self.kind, self.detail),
            None => write!(f, "{:?}: {}", self.kind, self.detail),
        }
    }
}

impl std::error::Error for SchemaError {}

/// The taxonomy of schema errors (§4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    DuplicateName,
    DuplicatePositional,
    MissingName,
    InvalidNames,
    DuplicateEnum,
    RequirementSelfReference,
    UnknownRequirementKey,
    NonValuedRequirement,
    IncompatibleRequirementValue,
    InvalidRange,
    InvalidLimit,
    InvalidParamCount,
    DuplicateClusterLetter,
}

/// Validate `schema`, optionally collecting every flaw found (`detail = true`) or returning as soon
/// as the first is found (`detail = false`, useful for a quick `is_valid` style check).
pub fn validate_schema(schema: &Schema, detail: bool) -> Result<(), Vec<SchemaError>> {
    let mut errors = Vec::new();
    macro_rules! bail_or_collect {
        ($err:expr) => {{
            errors.push($err);
            if !detail {
                return Err(errors);
            }
        }};
    }

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_clusters: HashSet<char> = HashSet::new();
    let mut seen_markers: HashSet<String> = HashSet::new();
    let mut bare_positional_seen = false;

    for (key, spec) in schema.iter() {
        let header = &spec.header;

        // MissingName / InvalidNames
        let has_marker = matches!(header.positional, Positional::Marker(_));
        let non_gap_names: Vec<&str> = header.surface_names().collect();
        if non_gap_names.is_empty() && !has_marker {
            bail_or_collect!(SchemaError {
                kind: SchemaErrorKind::MissingName,
                option_key: Some(key.to_owned()),
                detail: "option has no surface name and is not a positional marker".to_owned(),
            });
        }

        for name in &non_gap_names {
            if name.contains('=') || name.chars().any(char::is_whitespace) {
                bail_or_collect!(SchemaError {
                    kind: SchemaErrorKind::InvalidNames,
                    option_key: Some(key.to_owned()),
                    detail: format!("name {name:?} contains '=' or whitespace"),
                });
                continue;
            }
            if name.is_empty() && header.inline != crate::schema::Inline::Disallowed {
                bail_or_collect!(SchemaError {
                    kind: SchemaErrorKind::InvalidNames,
                    option_key: Some(key.to_owned()),
                    detail: "empty name only allowed when inline is disallowed".to_owned(),
                });
                continue;
            }
            if !seen_names.insert((*name).to_owned()) {
                bail_or_collect!(SchemaError {
                    kind: SchemaErrorKind::DuplicateName,
                    option_key: Some(key.to_owned()),
                    detail: format!("name {name:?} used by more than one option"),
                });
            }
        }

        // Negation names
        if let OptionKind::Flag { negation } = &spec.kind {
            for name in negation {
                if !seen_names.insert(name.clone()) {
                    bail_or_collect!(SchemaError {
                        kind: SchemaErrorKind::DuplicateName,
                        option_key: Some(key.to_owned()),
                        detail: format!("negation name {name:?} used by more than one option"),
                    });
                }
            }
        }

        // Positional
        match &header.positional {
            Positional::Bare => {
                if bare_positional_seen {
                    bail_or_collect!(SchemaError {
                        kind: SchemaErrorKind::DuplicatePositional,
                        option_key: Some(key.to_owned()),
                        detail: "more than one option has positional = true".to_owned(),
                    });
                }
                bare_positional_seen = true;
            }
            Positional::Marker(marker) => {
                if !seen_markers.insert(marker.clone()) {
                    bail_or_collect!(SchemaError {
                        kind: SchemaErrorKind::DuplicateName,
                        option_key: Some(key.to_owned()),
                        detail: format!("positional marker {marker:?} used by more than one option"),
                    });
                }
            }
            Positional::No => {}
        }

        // Cluster letter
        if let Some(ch) = header.cluster {
            if !seen_clusters.insert(ch) {
                bail_or_collect!(SchemaError {
                    kind: SchemaErrorKind::DuplicateClusterLetter,
                    option_key: Some(key.to_owned()),
                    detail: format!("cluster letter '{ch}' used by more than one option"),
                });
            }
        }

        // Choices duplicates
        if let OptionKind::Single { constraints } | OptionKind::Array { constraints, .. } =
            &spec.kind
        {
            let mut seen_choice: Vec<&Value> = Vec::new();
            for choice in &constraints.choices {
                if seen_choice.contains(&choice) {
                    bail_or_collect!(SchemaError {
                        kind: SchemaErrorKind::DuplicateEnum,
                        option_key: Some(key.to_owned()),
                        detail: format!("duplicate choice {}", choice.render_literal()),
                    });
                }
                seen_choice.push(choice);
            }
            if let Some(range) = &constraints.range {
                if !(range.lower <= range.upper) {
                    bail_or_collect!(SchemaError {
                        kind: SchemaErrorKind::InvalidRange,
                        option_key: Some(key.to_owned()),
                        detail: format!("range [{}, {}] has lower > upper", range.lower, range.upper),
                    });
                }
            }
        }

        if let OptionKind::Array { limit: Some(0), .. } = &spec.kind {
            bail_or_collect!(SchemaError {
                kind: SchemaErrorKind::InvalidLimit,
                option_key: Some(key.to_owned()),
                detail: "limit of 0 would reject every value".to_owned(),
            });
        }

        if let OptionKind::Function { params, .. } = &spec.kind {
            let invalid = match params {
                crate::schema::ParamCount::Range(min, max) => min > max,
                _ => false,
            };
            if invalid {
                bail_or_collect!(SchemaError {
                    kind: SchemaErrorKind::InvalidParamCount,
                    option_key: Some(key.to_owned()),
                    detail: "function parameter range has min > max".to_owned(),
                });
            }
        }

        // Requirement trees
        for (req, required_if) in [
            (&header.requires, false),
            (&header.required_if, true),
        ] {
            if let Some(req) = req {
                validate_requirement(schema, key, req, required_if, detail, &mut errors)?;
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_requirement(
    schema: &Schema,
    owner_key: &str,
    req: &Requirement,
    _is_required_if: bool,
    detail: bool,
    errors: &mut Vec<SchemaError>,
) -> Result<(), Vec<SchemaError>> {
    let mut refs = Vec::new();
    req.referenced_keys(&mut refs);
    for referenced in refs {
        if referenced == owner_key {
            errors.push(SchemaError {
                kind: SchemaErrorKind::RequirementSelfReference,
                option_key: Some(owner_key.to_owned()),
                detail: "requirement references its own option".to_owned(),
            });
            if !detail {
                return Err(std::mem::take(errors));
            }
            continue;
        }
        match crate::requirement::header_of(schema, referenced) {
            None => {
                errors.push(SchemaError {
                    kind: SchemaErrorKind::UnknownRequirementKey,
                    option_key: Some(owner_key.to_owned()),
                    detail: format!("requirement references unknown key {referenced:?}"),
                });
                if !detail {
                    return Err(std::mem::take(errors));
                }
            }
            Some(_) => {
                let target = schema.get(referenced).expect("header_of confirmed the key exists");
                if !crate::requirement::kind_can_be_required(&target.kind) {
                    errors.push(SchemaError {
                        kind: SchemaErrorKind::NonValuedRequirement,
                        option_key: Some(owner_key.to_owned()),
                        detail: format!("requirement references non-valued option {referenced:?}"),
                    });
                    if !detail {
                        return Err(std::mem::take(errors));
                    }
                }
            }
        }
    }

    // IncompatibleRequirementValue: only meaningful for Map literals; walk recursively.
    check_map_value_types(schema, owner_key, req, detail, errors)?;
    Ok(())
}

fn check_map_value_types(
    schema: &Schema,
    owner_key: &str,
    req: &Requirement,
    detail: bool,
    errors: &mut Vec<SchemaError>,
) -> Result<(), Vec<SchemaError>> {
    match req {
        Requirement::Map(m) => {
            for (k, expect) in m {
                if let crate::requirement::MapValue::Literal(lit) = expect {
                    if let Some(target) = schema.get(k) {
                        if !literal_matches_kind(&target.kind, lit) {
                            errors.push(SchemaError {
                                kind: SchemaErrorKind::IncompatibleRequirementValue,
                                option_key: Some(owner_key.to_owned()),
                                detail: format!(
                                    "literal {} is incompatible with the declared type of {k:?}",
                                    lit.render_literal()
                                ),
                            });
                            if !detail {
                                return Err(std::mem::take(errors));
                            }
                        }
                    }
                }
            }
            Ok(())
        }
        Requirement::Not(r) => check_map_value_types(schema, owner_key, r, detail, errors),
        Requirement::All(rs) | Requirement::One(rs) => {
            for r in rs {
                check_map_value_types(schema, owner_key, r, detail, errors)?;
            }
            Ok(())
        }
        Requirement::Key(_) | Requirement::Predicate(_, _) => Ok(()),
    }
}

fn literal_matches_kind(kind: &OptionKind, lit: &Value) -> bool {
    match kind.scalar_kind() {
        Some(crate::schema::ScalarKind::Num) => {
            matches!(lit, Value::Num(_)) || matches!(lit, Value::Array(items) if items.iter().all(|v| matches!(v, Value::Num(_))))
        }
        Some(crate::schema::ScalarKind::Str) => {
            matches!(lit, Value::Str(_)) || matches!(lit, Value::Array(items) if items.iter().all(|v| matches!(v, Value::Str(_))))
        }
        None => matches!(kind, OptionKind::Flag { .. }) && matches!(lit, Value::Bool(_)),
    }
}
