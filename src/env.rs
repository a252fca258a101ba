//! Environment variable lookup (§3.1 "env", §9 "Environment").
//!
//! Abstracted behind a trait so tests can supply a fixed map instead of touching the real process
//! environment, and so a nested `command` parse can be handed the exact same view its parent saw
//! (§9: "nested command parses share the outer EnvView" rather than re-reading `std::env` fresh).

use std::collections::HashMap;

/// A read-only view over environment variables.
pub trait EnvView: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvView;

impl EnvView for ProcessEnvView {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory environment, for tests and for embedding a parser where the caller wants to supply
/// variables explicitly rather than inherit the process's.
#[derive(Debug, Default, Clone)]
pub struct MapEnvView {
    vars: HashMap<String, String>,
}

impl MapEnvView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvView for MapEnvView {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Try each name in `names`, in order, returning the first variable that is set.
pub fn first_set(env: &dyn EnvView, names: &[String]) -> Option<(String, String)> {
    names.iter().find_map(|name| env.get(name).map(|v| (name.clone(), v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_env_view_returns_set_values() {
        let env = MapEnvView::new().with("OUT_DIR", "/tmp");
        assert_eq!(env.get("OUT_DIR"), Some("/tmp".to_owned()));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn first_set_tries_names_in_order() {
        let env = MapEnvView::new().with("SECOND", "b");
        let names = vec!["FIRST".to_owned(), "SECOND".to_owned()];
        assert_eq!(first_set(&env, &names), Some(("SECOND".to_owned(), "b".to_owned())));
    }

    #[test]
    fn first_set_none_when_nothing_matches() {
        let env = MapEnvView::new();
        let names = vec!["FIRST".to_owned()];
        assert_eq!(first_set(&env, &names), None);
    }
}
