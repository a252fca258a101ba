//! Value coercion (component G).
//!
//! Turns a raw argument string into a [`Value`], applying the pipeline laid out in §4.8:
//! `trim` -> `case` -> custom `parse` (if any; otherwise the default str/num conversion) ->
//! `choices`/`regex`/`range` constraint checks, and for `array` options, splitting into elements
//! first (`parse_delimited`, else a literal `separator`, else the whole argument as one element).
//!
//! Numeric parse failures are not always fatal: per §9 "NaN by default", a bare `num` scalar with
//! no `range`/`choices` silently coerces to `NaN` rather than failing the parse, mirroring how a
//! dynamically-typed host would let `NaN` flow through. Declaring `range` or `choices` narrows that
//! down to a hard error, since `NaN` could never satisfy either.

use crate::callback::Deferred;
use crate::schema::{Case, Conv, Range, ScalarConstraints, ScalarKind};
use crate::value::Value;

/// Failure of the coercion pipeline for a single scalar value (§7 "Invalid parameter").
#[derive(Debug, Clone, PartialEq)]
pub enum CoerceError {
    /// Custom `parse` callback rejected the value; carries its message.
    Custom(String),
    NotInChoices { value: Value, choices: Vec<Value> },
    RegexMismatch { value: String, pattern: String },
    OutOfRange { value: f64, range: Range },
}

/// Run the scalar coercion pipeline on one raw token (the "single" path, and the per-element path
/// for "array").
pub async fn coerce_scalar(raw: &str, constraints: &ScalarConstraints) -> Result<Value, CoerceError> {
    let mut text = raw.to_owned();
    if constraints.trim {
        text = text.trim().to_owned();
    }
    if let Some(case) = constraints.case {
        text = match case {
            Case::Lower => text.to_lowercase(),
            Case::Upper => text.to_uppercase(),
        };
    }

    let mut value = if let Some(parse) = &constraints.parse {
        parse(&text).await.map_err(CoerceError::Custom)?
    } else {
        default_convert(&text, constraints.kind())
    };

    if let Value::Num(n) = &mut value {
        if let Some(conv) = constraints.conv {
            *n = apply_conv(*n, conv);
        }
    }

    check_constraints(value, constraints)
}

fn default_convert(text: &str, kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Str => Value::Str(text.to_owned()),
        ScalarKind::Num => Value::Num(text.trim().parse::<f64>().unwrap_or(f64::NAN)),
    }
}

fn apply_conv(n: f64, conv: Conv) -> f64 {
    match conv {
        Conv::Trunc => n.trunc(),
        Conv::Round => n.round(),
        Conv::Floor => n.floor(),
        Conv::Ceil => n.ceil(),
    }
}

fn check_constraints(value: Value, constraints: &ScalarConstraints) -> Result<Value, CoerceError> {
    if let Value::Num(n) = &value {
        if n.is_nan() && (constraints.range.is_some() || !constraints.choices.is_empty()) {
            return Err(CoerceError::NotInChoices {
                value: value.clone(),
                choices: constraints.choices.clone(),
            });
        }
    }

    if !constraints.choices.is_empty() && !constraints.choices.contains(&value) {
        return Err(CoerceError::NotInChoices {
            value,
            choices: constraints.choices.clone(),
        });
    }

    if let Some(regex) = &constraints.regex {
        if let Value::Str(s) = &value {
            if !regex.is_match(s) {
                return Err(CoerceError::RegexMismatch {
                    value: s.clone(),
                    pattern: regex.as_str().to_owned(),
                });
            }
        }
    }

    if let Some(range) = &constraints.range {
        if let Value::Num(n) = &value {
            if *n < range.lower || *n > range.upper {
                return Err(CoerceError::OutOfRange {
                    value: *n,
                    range: *range,
                });
            }
        }
    }

    Ok(value)
}

/// Split and coerce the elements of an `array` option's raw argument (§3.1 "array").
pub async fn coerce_array_argument(
    raw: &str,
    constraints: &ScalarConstraints,
    separator: Option<char>,
    parse_delimited: Option<&crate::callback::ParseDelimitedFn>,
) -> Result<Vec<Value>, CoerceError> {
    if let Some(parse_delimited) = parse_delimited {
        return parse_delimited(raw).await.map_err(CoerceError::Custom);
    }

    let pieces: Vec<&str> = match separator {
        Some(sep) => raw.split(sep).collect(),
        None => vec![raw],
    };

    let mut out = Vec::with_capacity(pieces.len());
    for piece in pieces {
        out.push(coerce_scalar(piece, constraints).await?);
    }
    Ok(out)
}

/// Apply `limit` and `unique` to a fully-assembled array value, in that order (§3.1 "array").
pub fn enforce_array_policy(
    mut items: Vec<Value>,
    limit: Option<usize>,
    unique: bool,
) -> Result<Vec<Value>, ArrayPolicyError> {
    if unique {
        let mut deduped = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }
        items = deduped;
    }
    if let Some(limit) = limit {
        if items.len() > limit {
            return Err(ArrayPolicyError::TooManyValues {
                actual: items.len(),
                limit,
            });
        }
    }
    Ok(items)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayPolicyError {
    TooManyValues { actual: usize, limit: usize },
}

/// Resolve a `default`/`fallback` [`crate::schema::ValueSource`] to a concrete value.
pub async fn resolve_value_source(source: &crate::schema::ValueSource) -> Value {
    match source {
        crate::schema::ValueSource::Literal(v) => v.clone(),
        crate::schema::ValueSource::Callback(f) => f().await,
    }
}

/// Helper used by the parser for env-var fallback: same pipeline as a single scalar, surfaced as a
/// [`Deferred`] for symmetry with the rest of the async-callback surface.
pub fn coerce_scalar_deferred(
    raw: String,
    constraints: ScalarConstraints,
) -> Deferred<Result<Value, CoerceError>> {
    Box::pin(async move { coerce_scalar(&raw, &constraints).await })
}
