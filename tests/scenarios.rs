//! End-to-end parsing scenarios, one per row of the scenario catalogue.

mod common;

use declarg::schema::{Header, OptionKind, OptionSpec, Schema, ScalarConstraints};
use declarg::value::Value;
use declarg::{ParseOutcome, Parser};
use futures::executor::block_on;

#[test]
fn flag_with_negation() {
    let schema = common::flag_with_negation_schema();

    let values = common::values_of(block_on(common::parse(schema.clone(), &["--no-verbose"])));
    assert_eq!(values.get("verbose"), Some(&Value::Bool(false)));

    let values = common::values_of(block_on(common::parse(schema.clone(), &["-v"])));
    assert_eq!(values.get("verbose"), Some(&Value::Bool(true)));

    let values = common::values_of(block_on(common::parse(schema, &[])));
    assert_eq!(values.get("verbose"), Some(&Value::Bool(false)));
}

#[test]
fn clustered_shorts() {
    let schema = common::clustered_shorts_schema();

    let values = common::values_of(block_on(common::parse(schema.clone(), &["-abc", "42"])));
    assert_eq!(values.get("a"), Some(&Value::Bool(true)));
    assert_eq!(values.get("b"), Some(&Value::Bool(true)));
    assert_eq!(values.get("c"), Some(&Value::Str("42".to_owned())));

    let outcome = block_on(common::parse(schema, &["-cab"]));
    assert!(matches!(
        outcome,
        ParseOutcome::Error(declarg::ParseError::ClusterConflict { .. })
    ));
}

#[test]
fn positional_with_marker() {
    let schema = common::positional_marker_schema();
    let values = common::values_of(block_on(common::parse(schema, &["-v", "--", "-v", "x"])));
    assert_eq!(values.get("verbose"), Some(&Value::Bool(true)));
    assert_eq!(
        values.get("files"),
        Some(&Value::Array(vec![Value::Str("-v".to_owned()), Value::Str("x".to_owned())]))
    );
}

fn requirement_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(
        "out",
        OptionSpec::new(
            Header {
                names: vec![Some("-o".to_owned())],
                requires: Some(declarg::requirement::Requirement::key("format")),
                ..Default::default()
            },
            OptionKind::Single {
                constraints: ScalarConstraints::default(),
            },
        ),
    );
    schema.insert("format", OptionSpec::single(&["-f"]));
    schema
}

#[test]
fn requirement_not_satisfied() {
    let schema = requirement_schema();
    let outcome = block_on(common::parse(schema.clone(), &["-o", "x"]));
    match outcome {
        ParseOutcome::Error(declarg::ParseError::RequirementNotSatisfied { sentence, .. }) => {
            assert_eq!(sentence, "Option -o requires -f.");
        }
        other => panic!("expected RequirementNotSatisfied, got {other:?}"),
    }

    let values = common::values_of(block_on(common::parse(schema, &["-o", "x", "-f", "json"])));
    assert_eq!(values.get("out"), Some(&Value::Str("x".to_owned())));
    assert_eq!(values.get("format"), Some(&Value::Str("json".to_owned())));
}

fn conditional_requirement_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert("a", OptionSpec::flag(&["-a"]));
    schema.insert(
        "b",
        OptionSpec::new(
            Header {
                names: vec![Some("-b".to_owned())],
                required_if: Some(declarg::requirement::Requirement::key("a")),
                ..Default::default()
            },
            OptionKind::Flag { negation: vec![] },
        ),
    );
    schema
}

#[test]
fn conditional_requirement() {
    let schema = conditional_requirement_schema();

    let outcome = block_on(common::parse(schema.clone(), &["-a"]));
    match outcome {
        ParseOutcome::Error(declarg::ParseError::ConditionallyRequired { sentence, .. }) => {
            assert_eq!(sentence, "Option -b is required if -a.");
        }
        other => panic!("expected ConditionallyRequired, got {other:?}"),
    }

    let values = common::values_of(block_on(common::parse(schema.clone(), &["-a", "-b"])));
    assert_eq!(values.get("a"), Some(&Value::Bool(true)));
    assert_eq!(values.get("b"), Some(&Value::Bool(true)));

    let values = common::values_of(block_on(common::parse(schema, &[])));
    assert_eq!(values.get("a"), Some(&Value::Undefined));
    assert_eq!(values.get("b"), Some(&Value::Undefined));
}

#[test]
fn completion_at_parameter_position() {
    let mut schema = Schema::new();
    schema.insert(
        "lang",
        OptionSpec::new(
            Header {
                names: vec![Some("-l".to_owned())],
                ..Default::default()
            },
            OptionKind::Single {
                constraints: ScalarConstraints {
                    choices: vec![
                        Value::Str("en".to_owned()),
                        Value::Str("es".to_owned()),
                        Value::Str("de".to_owned()),
                    ],
                    ..Default::default()
                },
            },
        ),
    );
    let parser = Parser::new(schema).unwrap();

    let candidates = block_on(parser.complete("cmd -l e", 8));
    assert_eq!(candidates, vec!["en".to_owned(), "es".to_owned()]);
}
