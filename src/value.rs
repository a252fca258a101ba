//! The values record and the scalar value type it is built from.
//!
//! A [`ValuesRecord`] is the single mutable structure that a parse populates and that callbacks
//! observe (partially, during parsing; fully, once defaults and environment fallbacks have been
//! applied). See the "Values record" and "Lifecycle" sections of the schema documentation.

use indexmap::IndexMap;
use std::fmt;

/// A coerced option value.
///
/// Function and command callbacks are restricted to returning one of these variants rather than an
/// arbitrary host-language value, since Rust has no dynamically typed return position; `Record` lets
/// a `command` option's callback return a nested values record the same way an ordinary nested parse
/// would.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The option was never set and has no default: the "undefined" sentinel of §3.2.
    Undefined,
    /// A flag's truthiness, or a negation name's inverse.
    Bool(bool),
    /// A single coerced string (after trim/case normalization and any custom `parse`).
    Str(String),
    /// A single coerced number.
    Num(f64),
    /// An ordered sequence of scalar values (an `array` option, or a multi-value `function` result).
    Array(Vec<Value>),
    /// The nested values record produced by a `command` option.
    Record(ValuesRecord),
}

impl Value {
    /// `true` for everything except [`Value::Undefined`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Render the literal form used in requirement diagnostics: quoted for strings, bare for
    /// numbers and bools, bracketed for arrays.
    pub fn render_literal(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => format!("\"{s}\""),
            Value::Num(n) => format!("{n}"),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(Value::render_literal).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Record(_) => "<record>".to_owned(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Record(_) => write!(f, "<record>"),
        }
    }
}

/// A mapping from each option key to its coerced [`Value`], in schema-declaration order.
///
/// Declaration order is preserved (via [`indexmap::IndexMap`]) because default materialisation and
/// formatter iteration must both walk the schema in that order (§5 "Ordering guarantees").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuesRecord {
    entries: IndexMap<String, Value>,
    set: indexmap::IndexSet<String>,
}

impl ValuesRecord {
    /// Create a record with every key in `keys` initialised to [`Value::Undefined`].
    pub fn new<I: IntoIterator<Item = String>>(keys: I) -> Self {
        let mut entries = IndexMap::new();
        for k in keys {
            entries.insert(k, Value::Undefined);
        }
        Self {
            entries,
            set: indexmap::IndexSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Assign `value` to `key`, marking it as having been set by parsing (as opposed to defaulted).
    pub fn set(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.entries.get_mut(key) {
            *slot = value;
        } else {
            self.entries.insert(key.to_owned(), value);
        }
        self.set.insert(key.to_owned());
    }

    /// Assign a default value without marking the key as explicitly set.
    pub fn set_default(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.entries.get_mut(key) {
            *slot = value;
        } else {
            self.entries.insert(key.to_owned(), value);
        }
    }

    /// Whether `key` was assigned during command-line/env parsing (not merely defaulted).
    pub fn was_set(&self, key: &str) -> bool {
        self.set.contains(key)
    }

    pub fn is_unset(&self, key: &str) -> bool {
        matches!(self.entries.get(key), None | Some(Value::Undefined))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_is_not_set() {
        let v = Value::Undefined;
        assert!(!v.is_set());
        assert!(Value::Bool(false).is_set());
    }

    #[test]
    fn record_tracks_explicit_vs_defaulted() {
        let mut rec = ValuesRecord::new(["verbose".to_owned(), "out".to_owned()]);
        assert!(rec.is_unset("verbose"));
        rec.set_default("verbose", Value::Bool(false));
        assert!(!rec.was_set("verbose"));
        assert_eq!(rec.get("verbose"), Some(&Value::Bool(false)));

        rec.set("out", Value::Str("x".into()));
        assert!(rec.was_set("out"));
    }

    #[test]
    fn render_literal_forms() {
        assert_eq!(Value::Str("a".into()).render_literal(), "\"a\"");
        assert_eq!(Value::Num(3.0).render_literal(), "3");
        assert_eq!(
            Value::Array(vec![Value::Num(1.0), Value::Num(2.0)]).render_literal(),
            "[1, 2]"
        );
    }
}
