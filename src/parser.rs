//! The parser and its settings.
//!
//! A [`Parser`] wraps a validated schema together with the name index built from it, and parser
//! settings (`Settings`), and provides the single parsing entry point. `gong`'s own `Parser` offers
//! separate "iterative" and "data-mining" styles driven by static, borrowed option sets; here there
//! is one style only, driven by an owned, possibly-nested schema (§4.4, §6 "One call, one outcome").

use std::sync::Arc;

use crate::engine::{run, run_with_cursor};
use crate::env::{EnvView, ProcessEnvView};
use crate::message::ParseOutcome;
use crate::schema::Schema;
use crate::token::{locate_line_cursor, split_command_line};
use crate::validate::{validate_schema, SchemaError};

/// Settings controlling how a [`Parser`] interprets its input (§3.1 "Parser-level settings", §4.2,
/// §4.3).
#[derive(Clone)]
pub struct Settings {
    /// Leading string introducing a short-option cluster, e.g. `-` for `-abc`. `None` disables
    /// clustering entirely. A long name match is always tried first, so a multi-character prefix
    /// like `--` only falls through to cluster expansion once no registered long name matches
    /// (§8 "Boundary behaviours").
    pub cluster_prefix: Option<String>,
    /// Program name used in `Help`/usage rendering; defaults to `argv[0]`'s file name when unset.
    pub program_name: Option<String>,
    /// Wrap width used by the formatter; `None` lets the formatter pick a default (§4.9).
    pub term_width: Option<usize>,
    /// A `COMP_POINT`-style cursor offset; when set, the parser runs in completion mode (§4.5).
    pub comp_index: Option<usize>,
    /// Source of environment variables for `env` fallback (§3.1 "env").
    pub env: Arc<dyn EnvView>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cluster_prefix: Some("-".to_owned()),
            program_name: None,
            term_width: None,
            comp_index: None,
            env: Arc::new(ProcessEnvView),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("cluster_prefix", &self.cluster_prefix)
            .field("program_name", &self.program_name)
            .field("term_width", &self.term_width)
            .field("comp_index", &self.comp_index)
            .finish()
    }
}

/// A validated schema plus the settings to parse it with.
///
/// Construction validates the schema eagerly (§4.1): a [`Parser`] can never be built from an
/// inconsistent schema, so every later parse can assume the schema is sound.
pub struct Parser {
    schema: Arc<Schema>,
    settings: Settings,
}

impl Parser {
    pub fn new(schema: Schema) -> Result<Self, Vec<SchemaError>> {
        Self::with_settings(schema, Settings::default())
    }

    pub fn with_settings(schema: Schema, settings: Settings) -> Result<Self, Vec<SchemaError>> {
        validate_schema(&schema, true)?;
        Ok(Self {
            schema: Arc::new(schema),
            settings,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse `args` (typically `std::env::args().skip(1).collect()`), driving the entire pipeline
    /// as a single future (§4.4). Callers on a synchronous call stack should drive it with
    /// `futures::executor::block_on`; an async caller can simply `.await` it.
    pub async fn parse(&self, args: Vec<String>) -> ParseOutcome {
        run(Arc::clone(&self.schema), &self.settings, args, None).await
    }

    /// Parse `args` synchronously, blocking on any deferred callbacks. A thin convenience wrapper;
    /// the async pipeline itself never assumes a runtime is present (§4.4 "Callbacks and async").
    pub fn parse_sync(&self, args: Vec<String>) -> ParseOutcome {
        futures::executor::block_on(self.parse(args))
    }

    /// Tokenize `line`, run a completion-mode parse with the cursor at byte offset `cursor`, and
    /// return the candidate list (§6 "`Parser::complete`"). Always produces a `Completion` message
    /// unless the line itself is malformed in a way no completion logic recognises, in which case
    /// the candidate list is simply empty.
    pub async fn complete(&self, line: &str, cursor: usize) -> Vec<String> {
        let args: Vec<String> = split_command_line(line).into_iter().map(|t| t.text).collect();
        let line_cursor = locate_line_cursor(line, cursor);
        let mut settings = self.settings.clone();
        settings.comp_index = None;
        match run_with_cursor(Arc::clone(&self.schema), &settings, args, None, Some(line_cursor)).await {
            ParseOutcome::Terminal(crate::message::TerminalMessage::Completion(candidates)) => candidates,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OptionSpec;

    #[test]
    fn rejects_invalid_schema_at_construction() {
        let mut schema = Schema::new();
        schema.insert("a", OptionSpec::flag(&["-v"]));
        schema.insert("b", OptionSpec::flag(&["-v"]));
        assert!(Parser::new(schema).is_err());
    }

    #[test]
    fn accepts_valid_schema() {
        let mut schema = Schema::new();
        schema.insert("verbose", OptionSpec::flag(&["verbose"]));
        assert!(Parser::new(schema).is_ok());
    }
}
