//! Diagnostics and outcomes (component H).
//!
//! Hand-rolled `Display`/`std::error::Error` implementations, the way `gong`'s own `OptionFlaw` and
//! friends work, rather than a derive crate: there is no room here for generated wording to drift
//! from the exact sentences the parser is specified to produce (§7 "Error message catalogue").

use std::fmt;

use crate::coerce::{ArrayPolicyError, CoerceError};
use crate::requirement::{render_required_if_sentence, render_requires_sentence, Requirement};
use crate::schema::Schema;
use crate::value::{Value, ValuesRecord};

/// Every way a parse can fail (§7).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnrecognizedOption {
        raw: String,
        suggestions: Vec<String>,
    },
    UnexpectedPositional {
        value: String,
    },
    MissingParameter {
        option: String,
    },
    InlineNotAccepted {
        option: String,
    },
    InlineRequired {
        option: String,
    },
    InvalidParameter {
        option: String,
        value: String,
        reason: InvalidReason,
    },
    InvalidEnvParameter {
        option: String,
        env_var: String,
        value: String,
        reason: InvalidReason,
    },
    TooManyValues {
        option: String,
        actual: usize,
        limit: usize,
    },
    WrongParamCount {
        option: String,
        actual: usize,
        expected: crate::schema::ParamCount,
    },
    ClusterConflict {
        cluster: String,
        letter: char,
    },
    MissingRequiredOption {
        option: String,
    },
    RequirementNotSatisfied {
        option: String,
        sentence: String,
    },
    ConditionallyRequired {
        option: String,
        sentence: String,
    },
    FunctionFailed {
        option: String,
        message: String,
    },
    CommandFailed {
        option: String,
        message: String,
    },
}

/// The reason a single value failed coercion, independent of whether it came from the command line
/// or an environment variable (both paths render through the same reason catalogue).
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    Custom(String),
    NotInChoices(Vec<Value>),
    RegexMismatch(String),
    OutOfRange { lower: f64, upper: f64 },
}

impl From<CoerceError> for InvalidReason {
    fn from(err: CoerceError) -> Self {
        match err {
            CoerceError::Custom(msg) => InvalidReason::Custom(msg),
            CoerceError::NotInChoices { choices, .. } => InvalidReason::NotInChoices(choices),
            CoerceError::RegexMismatch { pattern, .. } => InvalidReason::RegexMismatch(pattern),
            CoerceError::OutOfRange { range, .. } => InvalidReason::OutOfRange {
                lower: range.lower,
                upper: range.upper,
            },
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Custom(msg) => write!(f, "{msg}"),
            InvalidReason::NotInChoices(choices) => {
                let rendered: Vec<String> = choices.iter().map(Value::render_literal).collect();
                write!(f, "Value must be one of: {}.", rendered.join(", "))
            }
            InvalidReason::RegexMismatch(pattern) => {
                write!(f, "Value must match the regex {pattern}.")
            }
            InvalidReason::OutOfRange { lower, upper } => {
                write!(f, "Value must be between {lower} and {upper}.")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnrecognizedOption { raw, suggestions } => {
                if suggestions.is_empty() {
                    write!(f, "Unrecognized option: {raw}.")
                } else {
                    write!(
                        f,
                        "Unrecognized option: {raw}. Did you mean {}?",
                        suggestions.join(", ")
                    )
                }
            }
            ParseError::UnexpectedPositional { value } => {
                write!(f, "Unexpected positional argument: {value}.")
            }
            ParseError::MissingParameter { option } => {
                write!(f, "Option {option} requires a parameter.")
            }
            ParseError::InlineNotAccepted { option } => {
                write!(f, "Option {option} does not accept inline parameters.")
            }
            ParseError::InlineRequired { option } => {
                write!(f, "Option {option} requires an inline parameter.")
            }
            ParseError::InvalidParameter { option, value, reason } => {
                write!(f, "Invalid parameter to {option}: {value}. {reason}")
            }
            ParseError::InvalidEnvParameter {
                option,
                env_var,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid value for {option} from environment variable {env_var}: {value}. {reason}"
                )
            }
            ParseError::TooManyValues { option, actual, limit } => {
                write!(
                    f,
                    "Option {option} has too many values ({actual}). Should have at most {limit}."
                )
            }
            ParseError::WrongParamCount {
                option,
                actual,
                expected,
            } => {
                let expected_str = match expected {
                    crate::schema::ParamCount::Fixed(n) => format!("exactly {n}"),
                    crate::schema::ParamCount::Range(min, max) => format!("between {min} and {max}"),
                    crate::schema::ParamCount::Unbounded => "any number of".to_owned(),
                };
                write!(
                    f,
                    "Option {option} received {actual} parameters, expected {expected_str}."
                )
            }
            ParseError::ClusterConflict { cluster, letter } => {
                write!(f, "Option '{letter}' in cluster {cluster} cannot take a parameter here.")
            }
            ParseError::MissingRequiredOption { option } => {
                write!(f, "Option {option} is required.")
            }
            ParseError::RequirementNotSatisfied { sentence, .. } => write!(f, "{sentence}"),
            ParseError::ConditionallyRequired { sentence, .. } => write!(f, "{sentence}"),
            ParseError::FunctionFailed { option, message } => {
                write!(f, "Option {option} failed: {message}")
            }
            ParseError::CommandFailed { option, message } => {
                write!(f, "Command {option} failed: {message}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub fn too_many_values(option: &str, actual: usize, limit: usize) -> Self {
        ParseError::TooManyValues {
            option: option.to_owned(),
            actual,
            limit,
        }
    }

    pub fn from_array_policy(option: &str, err: ArrayPolicyError) -> Self {
        match err {
            ArrayPolicyError::TooManyValues { actual, limit } => {
                ParseError::too_many_values(option, actual, limit)
            }
        }
    }

    pub fn requirement_not_satisfied(schema: &Schema, opt_key: &str, req: &Requirement) -> Self {
        ParseError::RequirementNotSatisfied {
            option: opt_key.to_owned(),
            sentence: render_requires_sentence(schema, opt_key, req),
        }
    }

    pub fn conditionally_required(schema: &Schema, opt_key: &str, req: &Requirement) -> Self {
        ParseError::ConditionallyRequired {
            option: opt_key.to_owned(),
            sentence: render_required_if_sentence(schema, opt_key, req),
        }
    }
}

/// A non-error, parse-terminating outcome: `help`/`version` text to print, or shell completion
/// candidates to emit (§4.5, §6).
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalMessage {
    Help(String),
    Version(String),
    Completion(Vec<String>),
}

/// The top-level result of a parse (§6 "Parse outcomes").
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Values(ValuesRecord),
    Terminal(TerminalMessage),
    Error(ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_mismatch_message_matches_catalogue() {
        let err = ParseError::InvalidParameter {
            option: "-f".to_owned(),
            value: "nope".to_owned(),
            reason: InvalidReason::RegexMismatch("^[a-z]+$".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter to -f: nope. Value must match the regex ^[a-z]+$."
        );
    }

    #[test]
    fn too_many_values_message() {
        let err = ParseError::too_many_values("-t", 5, 3);
        assert_eq!(err.to_string(), "Option -t has too many values (5). Should have at most 3.");
    }

    #[test]
    fn unrecognized_option_with_suggestions() {
        let err = ParseError::UnrecognizedOption {
            raw: "--verbos".to_owned(),
            suggestions: vec!["--verbose".to_owned()],
        };
        assert_eq!(err.to_string(), "Unrecognized option: --verbos. Did you mean --verbose?");
    }

    #[test]
    fn inline_not_accepted_message() {
        let err = ParseError::InlineNotAccepted { option: "-v".to_owned() };
        assert_eq!(err.to_string(), "Option -v does not accept inline parameters.");
    }

    #[test]
    fn inline_required_message() {
        let err = ParseError::InlineRequired { option: "--mode".to_owned() };
        assert_eq!(err.to_string(), "Option --mode requires an inline parameter.");
    }
}
