//! Formatter surface (component I).
//!
//! Exposes the schema for rendering without dictating a rendering format itself: declaration-order
//! iteration over groups and options, per-option metadata projection, and the usage-grouping
//! algorithm of §4.9 (bracket nesting driven by `requires`/`required_if`/`group`). Analogous in
//! purpose to `gong`'s `docs::usage` chapter, but here it is live code rather than prose, since the
//! spec hands formatting responsibility to the embedding application rather than a built-in help
//! renderer (§4.9 "the formatter never itself prints").

use std::collections::BTreeMap;

use crate::requirement::Requirement;
use crate::schema::{Hide, OptionKind, OptionSpec, Positional, Schema};

/// A read-only, declaration-order projection of one option's metadata, for building help/usage text.
#[derive(Debug, Clone)]
pub struct OptionSummary<'a> {
    pub key: &'a str,
    pub names: Vec<&'a str>,
    pub preferred_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub group: Option<&'a str>,
    pub hidden: bool,
    pub hidden_from_usage: bool,
    pub positional: &'a Positional,
    pub takes_value: bool,
}

impl<'a> OptionSummary<'a> {
    fn from_spec(key: &'a str, spec: &'a OptionSpec) -> Self {
        let header = &spec.header;
        Self {
            key,
            names: header.surface_names().collect(),
            preferred_name: header.preferred_name(),
            description: header.description.as_deref(),
            group: header.group.as_deref(),
            hidden: header.hide == Hide::Yes,
            hidden_from_usage: matches!(header.hide, Hide::Yes | Hide::UsageOnly),
            positional: &header.positional,
            takes_value: spec.kind.is_valued() && !matches!(spec.kind, OptionKind::Flag { .. }),
        }
    }
}

/// Iterate every option in declaration order, skipping fully hidden ones.
pub fn visible_options(schema: &Schema) -> impl Iterator<Item = OptionSummary<'_>> {
    schema
        .iter()
        .map(|(key, spec)| OptionSummary::from_spec(key, spec))
        .filter(|summary| !summary.hidden)
}

/// Options appearing in the one-line usage summary: visible options not marked `UsageOnly`-hidden.
pub fn usage_line_options(schema: &Schema) -> impl Iterator<Item = OptionSummary<'_>> {
    visible_options(schema).filter(|summary| !summary.hidden_from_usage)
}

/// Group options by their declared `group`, preserving the order each group was first seen in, and
/// the order options were declared within a group (§3.1 "group", §4.9).
pub fn group_options(schema: &Schema) -> Vec<(Option<&str>, Vec<OptionSummary<'_>>)> {
    let mut order: Vec<Option<&str>> = Vec::new();
    let mut buckets: BTreeMap<Option<&str>, Vec<OptionSummary<'_>>> = BTreeMap::new();
    for summary in visible_options(schema) {
        if !buckets.contains_key(&summary.group) {
            order.push(summary.group);
        }
        buckets.entry(summary.group).or_default().push(summary);
    }
    order
        .into_iter()
        .map(|g| (g, buckets.remove(&g).unwrap_or_default()))
        .collect()
}

/// One bracket of the usage-grouping DAG (§4.9): a `requires` edge nests the dependent option inside
/// the bracket of the option it depends on; a `required_if` edge does the reverse (the conditionally
/// required option nests inside the bracket of whatever triggers it), since unlike `requires`, a
/// `required_if` edge expresses "this only makes sense once that's already present".
#[derive(Debug, Clone)]
pub struct UsageBracket<'a> {
    pub key: &'a str,
    pub optional: bool,
    pub children: Vec<UsageBracket<'a>>,
}

/// Build the nested bracket tree for the usage line. Options with no incoming or outgoing
/// dependency edge become top-level brackets; a cycle (which the validator should already reject)
/// is broken by treating the first-declared option in the cycle as the root.
pub fn usage_tree(schema: &Schema) -> Vec<UsageBracket<'_>> {
    let keys: Vec<&str> = usage_line_options(schema).map(|s| s.key).collect();
    let mut parent_of: BTreeMap<&str, &str> = BTreeMap::new();

    for (key, spec) in schema.iter() {
        if !keys.contains(&key) {
            continue;
        }
        if let Some(parent_key) = dependency_parent(spec) {
            if keys.contains(&parent_key) {
                parent_of.entry(key).or_insert(parent_key);
            }
        }
    }

    let mut children_of: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (&child, &parent) in &parent_of {
        children_of.entry(parent).or_default().push(child);
    }

    let mut seen = std::collections::HashSet::new();
    let mut roots = Vec::new();
    for key in &keys {
        if !parent_of.contains_key(key) {
            roots.push(build_bracket(schema, key, &children_of, &mut seen));
        }
    }
    // Any key that never got visited (i.e. its declared parent was outside the usage line, or a
    // cycle prevented reaching it from a root) still needs a bracket of its own.
    for key in &keys {
        if seen.insert(*key) {
            roots.push(build_bracket(schema, key, &children_of, &mut seen));
        }
    }
    roots
}

fn build_bracket<'a>(
    schema: &'a Schema,
    key: &'a str,
    children_of: &BTreeMap<&'a str, Vec<&'a str>>,
    seen: &mut std::collections::HashSet<&'a str>,
) -> UsageBracket<'a> {
    seen.insert(key);
    let spec = schema.get(key).expect("usage_tree only walks real keys");
    let optional = !spec.header.required;
    let pending: Vec<&'a str> = children_of
        .get(key)
        .into_iter()
        .flatten()
        .filter(|child| !seen.contains(*child))
        .copied()
        .collect();
    let children = pending
        .into_iter()
        .map(|child| build_bracket(schema, child, children_of, seen))
        .collect();
    UsageBracket { key, optional, children }
}

fn dependency_parent<'a>(spec: &'a OptionSpec) -> Option<&'a str> {
    if let Some(Requirement::Key(k)) = &spec.header.requires {
        return Some(k.as_str());
    }
    if let Some(Requirement::Key(k)) = &spec.header.required_if {
        return Some(k.as_str());
    }
    None
}
