//! A declarative command-line argument parsing core: describe your options as data, hand the
//! description to a [`Parser`](parser::Parser), and get back either a populated values record, a
//! terminal message (help, version, or shell completion candidates), or a diagnostic.
//!
//! # Documentation
//!
//! Module-level docs cover each piece of the pipeline in turn: [`schema`] for describing options,
//! [`requirement`] for the `requires`/`required_if` expression tree, [`validate`] for the checks run
//! against a schema before it is ever parsed against, and [`parser`]/[`engine`] for the parse itself.
//! [`format`] exposes the schema for building help/usage text; this crate does not render any itself.

#![deny(bare_trait_objects)]

pub mod callback;
pub mod coerce;
pub mod engine;
pub mod env;
pub mod format;
pub mod index;
#[macro_use]
mod macros;
pub mod message;
pub mod parser;
pub mod requirement;
pub mod schema;
pub mod token;
pub mod validate;
pub mod value;

pub use message::{ParseError, ParseOutcome, TerminalMessage};
pub use parser::{Parser, Settings};
pub use schema::{OptionKind, OptionSpec, Schema};
pub use value::{Value, ValuesRecord};
