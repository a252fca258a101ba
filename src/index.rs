//! Name index (component E).
//!
//! Built once, when a [`crate::parser::Parser`] is constructed from a validated schema: a flat
//! name -> key map and a cluster-letter -> key map, so that matching a token against the schema
//! during parsing is O(1) rather than a linear scan (§4.3 "Matching"). Also owns the "did you mean"
//! suggestion search used for `UnrecognizedOption` diagnostics (§4.7), built on `strsim`'s Levenshtein
//! implementation behind the `suggestions` feature, same as `gong`'s own unrecognised-longoption
//! suggestions; the distance bound applied on top is this crate's own, narrower §4.3 rule.

use std::collections::HashMap;

use crate::schema::Schema;

/// O(1) name and cluster-letter lookups over a validated schema.
pub struct NameIndex {
    by_name: HashMap<String, String>,
    by_cluster: HashMap<char, String>,
    /// All surface names, in schema declaration order, for suggestion search.
    ordered_names: Vec<String>,
}

impl NameIndex {
    pub fn build(schema: &Schema) -> Self {
        let mut by_name = HashMap::new();
        let mut by_cluster = HashMap::new();
        let mut ordered_names = Vec::new();

        for (key, spec) in schema.iter() {
            for name in spec.header.surface_names() {
                by_name.insert(name.to_owned(), key.to_owned());
                ordered_names.push(name.to_owned());
            }
            if let crate::schema::OptionKind::Flag { negation } = &spec.kind {
                for name in negation {
                    by_name.insert(name.clone(), key.to_owned());
                    ordered_names.push(name.clone());
                }
            }
            if let Some(ch) = spec.header.cluster {
                by_cluster.insert(ch, key.to_owned());
            }
        }

        Self {
            by_name,
            by_cluster,
            ordered_names,
        }
    }

    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn resolve_cluster_letter(&self, ch: char) -> Option<&str> {
        self.by_cluster.get(&ch).map(String::as_str)
    }

    /// Up to 3 "did you mean" suggestions for an unrecognized `name`, ordered by distance then
    /// schema declaration order (§4.7).
    ///
    /// For names of length >= 4, candidates within a Levenshtein distance of 2 qualify; shorter
    /// names only suggest exact-prefix matches. This is deliberately a narrower, more conservative
    /// rule than a general string-similarity score.
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let mut scored: Vec<(usize, usize, &str)> = Vec::new();
        for (order, candidate) in self.ordered_names.iter().enumerate() {
            if name.chars().count() >= 4 {
                if let Some(dist) = levenshtein_within(name, candidate, 2) {
                    scored.push((dist, order, candidate.as_str()));
                }
            } else if candidate.starts_with(name) && candidate != name {
                scored.push((0, order, candidate.as_str()));
            }
        }
        scored.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.into_iter().take(3).map(|(_, _, n)| n.to_owned()).collect()
    }
}

/// `strsim::levenshtein(a, b)` bounded to `max` per §4.3's "distance <= 2" suggestion rule. Returns
/// `None` when the distance exceeds `max`, or unconditionally when the `suggestions` feature is off.
#[cfg(feature = "suggestions")]
fn levenshtein_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let dist = strsim::levenshtein(a, b);
    (dist <= max).then_some(dist)
}

#[cfg(not(feature = "suggestions"))]
fn levenshtein_within(_a: &str, _b: &str, _max: usize) -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OptionSpec;

    fn sample() -> Schema {
        let mut schema = Schema::new();
        schema.insert("verbose", OptionSpec::flag(&["verbose", "v"]));
        schema.insert("version", OptionSpec::flag(&["version"]));
        schema.insert("out", OptionSpec::single(&["out", "o"]));
        schema
    }

    #[test]
    fn resolves_names_and_clusters() {
        let schema = sample();
        let index = NameIndex::build(&schema);
        assert_eq!(index.resolve_name("verbose"), Some("verbose"));
        assert_eq!(index.resolve_name("nope"), None);
    }

    #[test]
    fn suggests_close_long_names() {
        let schema = sample();
        let index = NameIndex::build(&schema);
        let suggestions = index.suggest("verbos");
        assert!(suggestions.contains(&"verbose".to_owned()));
    }

    #[test]
    fn short_names_require_prefix_match() {
        let schema = sample();
        let index = NameIndex::build(&schema);
        // "ou" is a prefix of "out" (len 3, so distance rule doesn't apply); "vx" is not a prefix of
        // anything and is too short for the distance rule either.
        assert_eq!(index.suggest("ou"), vec!["out".to_owned()]);
        assert!(index.suggest("vx").is_empty());
    }

    #[test]
    fn suggestions_bounded_to_three() {
        let mut schema = Schema::new();
        for name in ["alpha", "alphb", "alphc", "alphd", "alphe"] {
            schema.insert(name, OptionSpec::flag(&[name]));
        }
        let index = NameIndex::build(&schema);
        assert_eq!(index.suggest("alphx").len(), 3);
    }
}
