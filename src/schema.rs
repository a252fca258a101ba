//! Option schema (component A).
//!
//! A [`Schema`] is a passive, ordered mapping from option key to [`OptionSpec`]. It carries no
//! parsing logic of its own; the validator (`crate::validate`) checks it for internal consistency,
//! and the parser (`crate::parser`) drives a state machine over it. See `SPEC_FULL.md` §3.1.

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use crate::callback::{CommandExecFn, CompleteFn, ExecFn, ParseDelimitedFn, ParseFn, SupplyFn};
use crate::requirement::Requirement;
use crate::value::Value;

/// The stable identifier of an option: its entry name in the schema mapping.
pub type OptionKey = String;

/// An ordered mapping from option key to descriptor.
///
/// Order matters: it is the order in which defaults are materialised (§5 "Ordering guarantees") and
/// the order the formatter iterates groups and options in (§4.9).
#[derive(Clone, Default)]
pub struct Schema {
    options: IndexMap<OptionKey, OptionSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option descriptor under `key`, in declaration order.
    ///
    /// Does not validate; call [`crate::validate::validate_schema`] (this is done automatically by
    /// `Parser::new`) before relying on the schema being sound.
    pub fn insert(&mut self, key: impl Into<OptionKey>, spec: OptionSpec) -> &mut Self {
        self.options.insert(key.into(), spec);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.options.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionSpec)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The option declared `positional = true` (not a marker), if any.
    pub fn bare_positional(&self) -> Option<(&str, &OptionSpec)> {
        self.options
            .iter()
            .find(|(_, spec)| matches!(spec.header.positional, Positional::Bare))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// The option whose positional marker string matches `marker`, if any.
    pub fn marker_option(&self, marker: &str) -> Option<(&str, &OptionSpec)> {
        self.options
            .iter()
            .find(|(_, spec)| matches!(&spec.header.positional, Positional::Marker(m) if m == marker))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// An option's `positional` header field (§3.1).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Positional {
    #[default]
    No,
    /// `positional = true`: this option consumes bare arguments at the point encountered.
    Bare,
    /// `positional = <marker>`: everything after the marker token goes to this option.
    Marker(String),
}

/// `inline` header field: governs `name=value` syntax (§3.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Inline {
    #[default]
    Allowed,
    Disallowed,
    Required,
}

/// `hide` header field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Hide {
    #[default]
    No,
    Yes,
    /// Hidden from usage summaries but still listed in the full option list.
    UsageOnly,
}

/// A default or fallback value source: either a literal or a zero-argument (possibly async)
/// callback, per §3.1 "`default`/`fallback`".
#[derive(Clone)]
pub enum ValueSource {
    Literal(Value),
    Callback(SupplyFn),
}

/// Fields shared by every option kind (§3.1 "Common header fields").
#[derive(Clone, Default)]
pub struct Header {
    /// Surface names, in order; `None` entries are alignment gaps (§3.1 "Gap").
    pub names: Vec<Option<String>>,
    /// Override for the name used in diagnostics; defaults to the first non-gap `names` entry.
    pub preferred_name: Option<String>,
    pub positional: Positional,
    /// Registered cluster letter, if this option may appear inside a `-abc` style short cluster.
    pub cluster: Option<char>,
    pub inline: Inline,
    pub required: bool,
    pub requires: Option<Requirement>,
    pub required_if: Option<Requirement>,
    /// Environment variable names tried, in order, when the option is absent on the command line.
    pub env: Vec<String>,
    pub default: Option<ValueSource>,
    pub fallback: Option<ValueSource>,
    pub group: Option<String>,
    pub hide: Hide,
    /// Help text shown by the formatter; not interpreted by the parser itself.
    pub description: Option<String>,
}

impl Header {
    pub fn preferred_name(&self) -> Option<&str> {
        if let Some(p) = &self.preferred_name {
            return Some(p.as_str());
        }
        self.names.iter().flatten().next().map(String::as_str)
    }

    /// All non-gap surface names.
    pub fn surface_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().flatten().map(String::as_str)
    }
}

/// The kind of numeric/string normalization a scalar undergoes before constraint checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Num,
}

/// `case` normalization mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Case {
    Lower,
    Upper,
}

/// `conv` numeric rounding mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conv {
    Trunc,
    Round,
    Floor,
    Ceil,
}

/// A numeric `range` constraint; either bound may be infinite (§3.1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

/// Coercion and constraint fields shared by `single` and each element of `array` (§3.1
/// "Value-bearing kinds add coercion fields").
#[derive(Clone, Default)]
pub struct ScalarConstraints {
    pub kind: Option<ScalarKind>,
    pub choices: Vec<Value>,
    pub regex: Option<Regex>,
    pub range: Option<Range>,
    pub trim: bool,
    pub case: Option<Case>,
    pub conv: Option<Conv>,
    pub parse: Option<ParseFn>,
    pub complete: Option<CompleteFn>,
}

impl ScalarConstraints {
    pub fn kind(&self) -> ScalarKind {
        self.kind.unwrap_or(ScalarKind::Str)
    }
}

/// Declared parameter count for a `function` option (§3.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamCount {
    Fixed(usize),
    Range(usize, usize),
    Unbounded,
}

impl ParamCount {
    pub fn min(&self) -> usize {
        match self {
            ParamCount::Fixed(n) => *n,
            ParamCount::Range(min, _) => *min,
            ParamCount::Unbounded => 0,
        }
    }

    pub fn max(&self) -> Option<usize> {
        match self {
            ParamCount::Fixed(n) => Some(*n),
            ParamCount::Range(_, max) => Some(*max),
            ParamCount::Unbounded => None,
        }
    }
}

/// The tagged union of option shapes (§3.1, §9 "Dynamic dispatch over option kinds").
#[derive(Clone)]
pub enum OptionKind {
    Flag {
        /// Names (drawn from the header's `names`, by value not index) whose occurrence sets the
        /// flag to the negative truth rather than `true`.
        negation: Vec<String>,
    },
    Single {
        constraints: ScalarConstraints,
    },
    Array {
        constraints: ScalarConstraints,
        /// Literal separator character; when set, one argument is split into multiple elements.
        separator: Option<char>,
        parse_delimited: Option<ParseDelimitedFn>,
        limit: Option<usize>,
        unique: bool,
    },
    Function {
        params: ParamCount,
        exec: ExecFn,
        complete: Option<CompleteFn>,
    },
    Command {
        schema: Arc<Schema>,
        exec: Option<CommandExecFn>,
        /// Whether outer defaults for already-unset keys are flushed before the nested parse runs.
        r#break: bool,
    },
    Help {
        message: String,
    },
    Version {
        message: String,
    },
}

impl OptionKind {
    /// Whether this kind can ever carry a meaningful [`Value`] (used by the requirement validator's
    /// `NonValuedRequirement` check, §4.1).
    pub fn is_valued(&self) -> bool {
        !matches!(self, OptionKind::Help { .. } | OptionKind::Version { .. })
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            OptionKind::Single { constraints } | OptionKind::Array { constraints, .. } => {
                Some(constraints.kind())
            }
            _ => None,
        }
    }
}

/// A full option descriptor: common header plus kind-specific fields.
#[derive(Clone)]
pub struct OptionSpec {
    pub header: Header,
    pub kind: OptionKind,
}

impl OptionSpec {
    pub fn new(header: Header, kind: OptionKind) -> Self {
        Self { header, kind }
    }

    pub fn flag(names: &[&str]) -> Self {
        Self::new(
            Header {
                names: names.iter().map(|n| Some((*n).to_owned())).collect(),
                ..Default::default()
            },
            OptionKind::Flag { negation: Vec::new() },
        )
    }

    pub fn single(names: &[&str]) -> Self {
        Self::new(
            Header {
                names: names.iter().map(|n| Some((*n).to_owned())).collect(),
                ..Default::default()
            },
            OptionKind::Single {
                constraints: ScalarConstraints::default(),
            },
        )
    }

    pub fn array(names: &[&str]) -> Self {
        Self::new(
            Header {
                names: names.iter().map(|n| Some((*n).to_owned())).collect(),
                ..Default::default()
            },
            OptionKind::Array {
                constraints: ScalarConstraints::default(),
                separator: None,
                parse_delimited: None,
                limit: None,
                unique: false,
            },
        )
    }
}
