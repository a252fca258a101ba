//! Requirement expression tree (component B).
//!
//! A recursive predicate over the values record, used for `requires`, `required_if`, and as a
//! general-purpose dependency graph input to the formatter's usage grouping (§3.3, §4.6).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::callback::PredicateFn;
use crate::schema::{Header, OptionKind, Schema};
use crate::value::{Value, ValuesRecord};

/// One entry of a `Map` requirement: an option key must be present, and if a literal is given, its
/// coerced value must equal that literal (§3.3).
#[derive(Clone, Debug, PartialEq)]
pub enum MapValue {
    /// The referenced option merely needs to be present, with any value.
    Present,
    /// The referenced option must be absent.
    Absent,
    /// The referenced option must be present and equal to this coerced value.
    Literal(Value),
}

/// The requirement expression tree (§3.3).
#[derive(Clone)]
pub enum Requirement {
    Key(String),
    Not(Box<Requirement>),
    All(Vec<Requirement>),
    One(Vec<Requirement>),
    Map(IndexMap<String, MapValue>),
    Predicate(PredicateFn, String),
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Key(k) => write!(f, "Key({k:?})"),
            Requirement::Not(r) => write!(f, "Not({r:?})"),
            Requirement::All(rs) => write!(f, "All({rs:?})"),
            Requirement::One(rs) => write!(f, "One({rs:?})"),
            Requirement::Map(m) => write!(f, "Map({m:?})"),
            Requirement::Predicate(_, label) => write!(f, "Predicate({label:?})"),
        }
    }
}

impl Requirement {
    pub fn key(k: impl Into<String>) -> Self {
        Requirement::Key(k.into())
    }

    pub fn not(r: Requirement) -> Self {
        Requirement::Not(Box::new(r))
    }

    pub fn predicate(
        label: impl Into<String>,
        f: impl Fn(&ValuesRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        Requirement::Predicate(Arc::new(f), label.into())
    }

    /// Evaluate this requirement against `values` (§4.6).
    pub fn eval(&self, values: &ValuesRecord) -> bool {
        match self {
            Requirement::Key(k) => values.get(k).map(Value::is_set).unwrap_or(false),
            Requirement::Not(r) => !r.eval(values),
            Requirement::All(rs) => rs.iter().all(|r| r.eval(values)),
            Requirement::One(rs) => rs.iter().any(|r| r.eval(values)),
            Requirement::Map(m) => m.iter().all(|(k, expect)| {
                let actual = values.get(k);
                match expect {
                    MapValue::Present => actual.map(Value::is_set).unwrap_or(false),
                    MapValue::Absent => !actual.map(Value::is_set).unwrap_or(false),
                    MapValue::Literal(lit) => actual.map(|a| a == lit).unwrap_or(false),
                }
            }),
            Requirement::Predicate(f, _) => f(values),
        }
    }

    /// Walk every `Key`/`Map` reference in this tree (used by the validator, §4.1).
    pub fn referenced_keys<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Requirement::Key(k) => out.push(k.as_str()),
            Requirement::Not(r) => r.referenced_keys(out),
            Requirement::All(rs) | Requirement::One(rs) => {
                for r in rs {
                    r.referenced_keys(out);
                }
            }
            Requirement::Map(m) => out.extend(m.keys().map(String::as_str)),
            Requirement::Predicate(_, _) => {}
        }
    }

    /// Render this requirement per the diagnostic forms in §4.6.
    pub fn render(&self, schema: &Schema) -> String {
        self.render_inner(schema, false)
    }

    fn render_inner(&self, schema: &Schema, negated: bool) -> String {
        let name_of = |k: &str| -> String {
            schema
                .get(k)
                .and_then(|spec| spec.header.preferred_name())
                .map(|n| format!("-{n}"))
                .unwrap_or_else(|| format!("-{k}"))
        };
        match self {
            Requirement::Key(k) => {
                let n = name_of(k);
                if negated {
                    format!("no {n}")
                } else {
                    n
                }
            }
            Requirement::Not(r) => r.render_inner(schema, !negated),
            Requirement::All(rs) => render_group(rs, "and", schema),
            Requirement::One(rs) => render_group(rs, "or", schema),
            Requirement::Map(m) => {
                let op = if negated { "!=" } else { "==" };
                let parts: Vec<String> = m
                    .iter()
                    .map(|(k, expect)| {
                        let n = name_of(k);
                        match expect {
                            MapValue::Present => n,
                            MapValue::Absent => format!("no {n}"),
                            MapValue::Literal(v) => format!("{n} {op} {}", v.render_literal()),
                        }
                    })
                    .collect();
                parts.join(" and ")
            }
            Requirement::Predicate(_, label) => {
                if negated {
                    format!("not {label}")
                } else {
                    label.clone()
                }
            }
        }
    }
}

fn render_group(items: &[Requirement], joiner: &str, schema: &Schema) -> String {
    if items.is_empty() {
        return String::new();
    }
    if items.len() == 1 {
        return items[0].render_inner(schema, false);
    }
    let parts: Vec<String> = items.iter().map(|r| r.render_inner(schema, false)).collect();
    format!("({})", parts.join(&format!(" {joiner} ")))
}

/// Render the full `requires`/`required_if` sentence for `opt_key` (§4.6 "combined diagnostic").
pub fn render_requires_sentence(schema: &Schema, opt_key: &str, req: &Requirement) -> String {
    let name = schema
        .get(opt_key)
        .and_then(|spec| spec.header.preferred_name())
        .map(|n| format!("-{n}"))
        .unwrap_or_else(|| format!("-{opt_key}"));
    let body = req.render(schema);
    if body.is_empty() {
        format!("Option {name} requires.")
    } else {
        format!("Option {name} requires {body}.")
    }
}

pub fn render_required_if_sentence(schema: &Schema, opt_key: &str, req: &Requirement) -> String {
    let name = schema
        .get(opt_key)
        .and_then(|spec| spec.header.preferred_name())
        .map(|n| format!("-{n}"))
        .unwrap_or_else(|| format!("-{opt_key}"));
    let body = req.render(schema);
    if body.is_empty() {
        format!("Option {name} is required.")
    } else {
        format!("Option {name} is required if {body}.")
    }
}

/// Whether `kind`'s owning option could appear in `requires`/`required_if` at all (§4.1
/// `NonValuedRequirement`).
pub fn kind_can_be_required(kind: &OptionKind) -> bool {
    kind.is_valued()
}

/// Used by the validator to confirm a header exists for a referenced key; kept here since both the
/// requirement tree and the validator need the same notion of "does this look like a valid target".
pub fn header_of<'a>(schema: &'a Schema, key: &str) -> Option<&'a Header> {
    schema.get(key).map(|s| &s.header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Header, OptionKind, OptionSpec, ScalarConstraints};

    fn sample_schema() -> Schema {
        let mut schema = Schema::new();
        schema.insert(
            "out",
            OptionSpec::new(
                Header {
                    names: vec![Some("o".into())],
                    ..Default::default()
                },
                OptionKind::Single {
                    constraints: ScalarConstraints::default(),
                },
            ),
        );
        schema.insert(
            "format",
            OptionSpec::new(
                Header {
                    names: vec![Some("f".into())],
                    ..Default::default()
                },
                OptionKind::Single {
                    constraints: ScalarConstraints::default(),
                },
            ),
        );
        schema
    }

    #[test]
    fn key_eval_and_render() {
        let schema = sample_schema();
        let mut values = ValuesRecord::new(["out".to_owned(), "format".to_owned()]);
        let req = Requirement::key("format");
        assert!(!req.eval(&values));
        assert_eq!(render_requires_sentence(&schema, "out", &req), "Option -o requires -f.");

        values.set("format", Value::Str("json".into()));
        assert!(req.eval(&values));
    }

    #[test]
    fn not_negates_and_renders_no() {
        let schema = sample_schema();
        let values = ValuesRecord::new(["out".to_owned(), "format".to_owned()]);
        let req = Requirement::not(Requirement::key("format"));
        assert!(req.eval(&values));
        assert_eq!(render_requires_sentence(&schema, "out", &req), "Option -o requires no -f.");
    }

    #[test]
    fn one_of_empty_renders_bodyless() {
        let schema = sample_schema();
        let req = Requirement::One(vec![]);
        assert_eq!(render_requires_sentence(&schema, "out", &req), "Option -o requires.");
    }

    #[test]
    fn map_literal_equality() {
        let schema = sample_schema();
        let mut m = IndexMap::new();
        m.insert("format".to_owned(), MapValue::Literal(Value::Str("json".into())));
        let req = Requirement::Map(m);
        let mut values = ValuesRecord::new(["format".to_owned()]);
        assert!(!req.eval(&values));
        values.set("format", Value::Str("json".into()));
        assert!(req.eval(&values));
        assert_eq!(
            render_requires_sentence(&schema, "out", &req),
            "Option -o requires -f == \"json\"."
        );
    }
}
