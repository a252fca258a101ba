//! Shared helpers for the scenario tests.

use declarg::schema::{Header, OptionKind, OptionSpec, Positional, Schema, ScalarConstraints};
use declarg::{ParseOutcome, Parser, Value};

/// Build the "flag with negation" schema from the end-to-end scenario catalogue.
pub fn flag_with_negation_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(
        "verbose",
        OptionSpec::new(
            Header {
                names: vec![Some("-v".to_owned()), Some("--verbose".to_owned())],
                default: Some(declarg::schema::ValueSource::Literal(Value::Bool(false))),
                ..Default::default()
            },
            OptionKind::Flag {
                negation: vec!["--no-verbose".to_owned()],
            },
        ),
    );
    schema
}

/// Build the clustered-shorts schema: `a`/`b` flags, `c` a single-valued option, all on cluster
/// letters matching their key.
pub fn clustered_shorts_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(
        "a",
        OptionSpec::new(
            Header {
                names: vec![Some("-a".to_owned())],
                cluster: Some('a'),
                ..Default::default()
            },
            OptionKind::Flag { negation: vec![] },
        ),
    );
    schema.insert(
        "b",
        OptionSpec::new(
            Header {
                names: vec![Some("-b".to_owned())],
                cluster: Some('b'),
                ..Default::default()
            },
            OptionKind::Flag { negation: vec![] },
        ),
    );
    schema.insert(
        "c",
        OptionSpec::new(
            Header {
                names: vec![Some("-c".to_owned())],
                cluster: Some('c'),
                ..Default::default()
            },
            OptionKind::Single {
                constraints: ScalarConstraints::default(),
            },
        ),
    );
    schema
}

/// Build the "positional with marker" schema: `files` (array, marker `--`), `verbose` (flag, `-v`).
pub fn positional_marker_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(
        "files",
        OptionSpec::new(
            Header {
                positional: Positional::Marker("--".to_owned()),
                ..Default::default()
            },
            OptionKind::Array {
                constraints: ScalarConstraints::default(),
                separator: None,
                parse_delimited: None,
                limit: None,
                unique: false,
            },
        ),
    );
    schema.insert(
        "verbose",
        OptionSpec::new(
            Header {
                names: vec![Some("-v".to_owned())],
                ..Default::default()
            },
            OptionKind::Flag { negation: vec![] },
        ),
    );
    schema
}

pub async fn parse(schema: Schema, args: &[&str]) -> ParseOutcome {
    let parser = Parser::new(schema).expect("schema must be valid for these scenarios");
    parser.parse(args.iter().map(|s| s.to_string()).collect()).await
}

pub fn values_of(outcome: ParseOutcome) -> declarg::ValuesRecord {
    match outcome {
        ParseOutcome::Values(v) => v,
        other => panic!("expected Values, got {other:?}"),
    }
}
