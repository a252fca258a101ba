//! The parsing state machine (component F).
//!
//! Owns the token-by-token walk that `gong`'s `ParseIter`/`ShortSetIter` pair performs, reworked
//! into a single async function over owned data rather than a borrowing iterator pair: there is no
//! external caller stepping the iterator one item at a time here (§9, "One call, one outcome"), so
//! the whole walk collapses into one future that either returns a populated [`ValuesRecord`], a
//! terminal message, or the first (or only, depending on settings) error encountered.

use std::sync::Arc;

use crate::coerce::{coerce_array_argument, coerce_scalar, enforce_array_policy, resolve_value_source};
use crate::env::first_set;
use crate::index::NameIndex;
use crate::message::{InvalidReason, ParseError, ParseOutcome, TerminalMessage};
use crate::parser::Settings;
use crate::schema::{Inline, OptionKind, Positional, Schema};
use crate::token::{split_inline, CompletionCursor};
use crate::value::{Value, ValuesRecord};

/// Drive a full parse of `args` against `schema`. `parent_values`, when set, is the outer record a
/// nested `command` parse should be able to see (§9 "nested command parses share outer state" is
/// handled one level up, in `run_command`; this parameter exists so recursive calls can thread a
/// read-only view of it down for `required_if`/`requires` evaluation against the combined record
/// if a future revision needs it — currently unused beyond documenting the extension point).
pub async fn run(
    schema: Arc<Schema>,
    settings: &Settings,
    args: Vec<String>,
    parent_values: Option<&ValuesRecord>,
) -> ParseOutcome {
    let comp = settings.comp_index.map(|pos| crate::token::tokenize(&args, Some(pos)).1.unwrap());
    run_with_cursor(schema, settings, args, parent_values, comp).await
}

/// Same as [`run`], but with the completion cursor (if any) already computed by the caller. Used
/// directly by [`crate::parser::Parser::complete`], whose raw command line is quote-aware split
/// before tokenization and so cannot be reduced to `Settings::comp_index`'s space-joined-`args`
/// assumption (§4.2, §4.5).
pub(crate) async fn run_with_cursor(
    schema: Arc<Schema>,
    settings: &Settings,
    args: Vec<String>,
    _parent_values: Option<&ValuesRecord>,
    comp: Option<CompletionCursor>,
) -> ParseOutcome {
    let index = NameIndex::build(&schema);
    let completing = comp.is_some();

    let mut values = ValuesRecord::new(schema.keys().map(str::to_owned));
    let mut after_marker = false;
    let mut i = 0usize;

    while i < args.len() {
        // Completion mode: if the cursor is inside this exact token, produce candidates instead of
        // continuing the real parse (§4.5).
        if let Some(cursor) = &comp {
            if cursor.token_index == Some(i) {
                return ParseOutcome::Terminal(TerminalMessage::Completion(
                    complete_at(&schema, &index, &values, &args, i, &cursor.prefix).await,
                ));
            }
        }

        let arg = args[i].clone();

        if after_marker {
            match handle_positional(&schema, &mut values, &arg).await {
                Ok(()) => {}
                Err(e) if completing => {
                    let _ = e;
                }
                Err(e) => return ParseOutcome::Error(e),
            }
            i += 1;
            continue;
        }

        if let Positional::Marker(marker) = marker_for(&schema) {
            if arg == marker {
                after_marker = true;
                i += 1;
                continue;
            }
        }

        // Try an exact/inline name match first.
        let (name_part, inline_value) = match split_inline(&arg) {
            Some((n, v)) if index.resolve_name(n).is_some() => (n.to_owned(), Some(v.to_owned())),
            _ => (arg.clone(), None),
        };

        if let Some(key) = index.resolve_name(&name_part).map(str::to_owned) {
            let spec = schema.get(&key).expect("index only yields known keys");
            match &spec.kind {
                OptionKind::Help { message } => {
                    return ParseOutcome::Terminal(TerminalMessage::Help(message.clone()));
                }
                OptionKind::Version { message } => {
                    return ParseOutcome::Terminal(TerminalMessage::Version(message.clone()));
                }
                _ => {}
            }

            // If the cursor sits in the very next token and this option takes a parameter from a
            // separate argument, complete against that option's choices rather than consuming the
            // cursor's own token as a real parameter (§4.5).
            if let Some(cursor) = &comp {
                if inline_value.is_none()
                    && cursor.token_index == Some(i + 1)
                    && matches!(spec.kind, OptionKind::Single { .. } | OptionKind::Array { .. })
                {
                    let param_index = current_param_index(&values, &key);
                    return ParseOutcome::Terminal(TerminalMessage::Completion(
                        choices_candidates(&schema, &values, &key, &cursor.prefix, param_index).await,
                    ));
                }
            }

            let consumed = handle_named_option(
                &schema,
                &index,
                &mut values,
                &key,
                inline_value,
                &args,
                &mut i,
                settings,
                completing,
            )
            .await;
            match consumed {
                Ok(()) => continue,
                Err(e) => {
                    if completing {
                        i += 1;
                        continue;
                    }
                    return ParseOutcome::Error(e);
                }
            }
        }

        // Try a short-option cluster: prefix string followed by one or more registered letters.
        // A long name match was already tried above and takes priority (§8 "Boundary behaviours":
        // a `--x` token is a long name first, cluster expansion only once no such name exists).
        if let Some(prefix) = &settings.cluster_prefix {
            if arg.starts_with(prefix.as_str()) && arg.len() > prefix.len() && inline_value.is_none() {
                let rest = &arg[prefix.len()..];
                if !rest.is_empty() && rest.chars().all(|c| index.resolve_cluster_letter(c).is_some()) {
                    match handle_cluster(&schema, &index, &mut values, &arg, rest, &args, &mut i).await {
                        Ok(()) => continue,
                        Err(e) => {
                            if completing {
                                i += 1;
                                continue;
                            }
                            return ParseOutcome::Error(e);
                        }
                    }
                }
            }

            // Looked like an option (has the cluster prefix) but matched nothing: unrecognized.
            if arg.starts_with(prefix.as_str()) && arg.len() > prefix.len() {
                if completing {
                    i += 1;
                    continue;
                }
                let suggestions = index.suggest(&name_part);
                return ParseOutcome::Error(ParseError::UnrecognizedOption {
                    raw: arg.clone(),
                    suggestions,
                });
            }
        }

        // Otherwise it's a bare positional.
        match handle_positional(&schema, &mut values, &arg).await {
            Ok(()) => {}
            Err(e) => {
                if !completing {
                    return ParseOutcome::Error(e);
                }
            }
        }
        i += 1;
    }

    if completing {
        return ParseOutcome::Terminal(TerminalMessage::Completion(
            complete_at(&schema, &index, &values, &args, args.len(), "").await,
        ));
    }

    finalize(&schema, settings, values).await
}

fn marker_for(schema: &Schema) -> Positional {
    for (_, spec) in schema.iter() {
        if let Positional::Marker(m) = &spec.header.positional {
            return Positional::Marker(m.clone());
        }
    }
    Positional::No
}

async fn handle_positional(schema: &Schema, values: &mut ValuesRecord, raw: &str) -> Result<(), ParseError> {
    let Some((key, spec)) = schema.bare_positional().or_else(|| marker_target(schema)) else {
        return Err(ParseError::UnexpectedPositional { value: raw.to_owned() });
    };
    apply_value_to_key(values, key, &spec.kind, raw).await
}

fn marker_target(schema: &Schema) -> Option<(&str, &crate::schema::OptionSpec)> {
    schema
        .iter()
        .find(|(_, spec)| matches!(spec.header.positional, Positional::Marker(_)))
}

async fn apply_value_to_key(
    values: &mut ValuesRecord,
    key: &str,
    kind: &OptionKind,
    raw: &str,
) -> Result<(), ParseError> {
    match kind {
        OptionKind::Single { constraints } => {
            let value = coerce_scalar(raw, constraints)
                .await
                .map_err(|e| ParseError::InvalidParameter {
                    option: key.to_owned(),
                    value: raw.to_owned(),
                    reason: InvalidReason::from(e),
                })?;
            values.set(key, value);
            Ok(())
        }
        OptionKind::Array {
            constraints,
            separator,
            parse_delimited,
            limit,
            unique,
        } => {
            let mut elements = coerce_array_argument(raw, constraints, *separator, parse_delimited.as_ref())
                .await
                .map_err(|e| ParseError::InvalidParameter {
                    option: key.to_owned(),
                    value: raw.to_owned(),
                    reason: InvalidReason::from(e),
                })?;
            if let Some(Value::Array(existing)) = values.get(key) {
                let mut combined = existing.clone();
                combined.append(&mut elements);
                elements = combined;
            }
            let elements = enforce_array_policy(elements, *limit, *unique)
                .map_err(|e| ParseError::from_array_policy(key, e))?;
            values.set(key, Value::Array(elements));
            Ok(())
        }
        _ => Err(ParseError::UnexpectedPositional { value: raw.to_owned() }),
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_named_option(
    schema: &Schema,
    index: &NameIndex,
    values: &mut ValuesRecord,
    key: &str,
    inline_value: Option<String>,
    args: &[String],
    i: &mut usize,
    settings: &Settings,
    completing: bool,
) -> Result<(), ParseError> {
    let spec = schema.get(key).expect("index only yields known keys");
    let name = args[*i].split('=').next().unwrap_or(&args[*i]).to_owned();

    if inline_value.is_some() && spec.header.inline == Inline::Disallowed {
        return Err(ParseError::InlineNotAccepted { option: name.clone() });
    }
    if inline_value.is_none()
        && spec.header.inline == Inline::Required
        && matches!(spec.kind, OptionKind::Single { .. } | OptionKind::Array { .. })
    {
        return Err(ParseError::InlineRequired { option: name.clone() });
    }

    match &spec.kind {
        OptionKind::Flag { negation } => {
            if inline_value.is_some() {
                return Err(ParseError::InlineNotAccepted { option: name.clone() });
            }
            let raw_name = args[*i].split('=').next().unwrap_or(&args[*i]);
            let negated = negation.iter().any(|n| n == raw_name);
            values.set(key, Value::Bool(!negated));
            *i += 1;
            Ok(())
        }
        OptionKind::Help { .. } | OptionKind::Version { .. } => {
            unreachable!("Help/Version are intercepted by the caller before dispatch")
        }
        OptionKind::Single { constraints } => {
            let raw = match inline_value {
                Some(v) => v,
                None => match take_next_param(args, i, &name) {
                    Ok(v) => v,
                    Err(e) => {
                        return match &spec.header.fallback {
                            Some(source) => {
                                *i += 1;
                                values.set(key, resolve_value_source(source).await);
                                Ok(())
                            }
                            None => Err(e),
                        };
                    }
                },
            };
            let value = coerce_scalar(&raw, constraints)
                .await
                .map_err(|e| ParseError::InvalidParameter {
                    option: name.clone(),
                    value: raw.clone(),
                    reason: InvalidReason::from(e),
                })?;
            values.set(key, value);
            *i += 1;
            Ok(())
        }
        OptionKind::Array {
            constraints,
            separator,
            parse_delimited,
            limit,
            unique,
        } => {
            let raw = match inline_value {
                Some(v) => v,
                None => match take_next_param(args, i, &name) {
                    Ok(v) => v,
                    Err(e) => {
                        return match &spec.header.fallback {
                            Some(source) => {
                                *i += 1;
                                values.set(key, resolve_value_source(source).await);
                                Ok(())
                            }
                            None => Err(e),
                        };
                    }
                },
            };
            let mut elements = coerce_array_argument(&raw, constraints, *separator, parse_delimited.as_ref())
                .await
                .map_err(|e| ParseError::InvalidParameter {
                    option: name.clone(),
                    value: raw.clone(),
                    reason: InvalidReason::from(e),
                })?;
            if let Some(Value::Array(existing)) = values.get(key) {
                let mut combined = existing.clone();
                combined.append(&mut elements);
                elements = combined;
            }
            let elements = enforce_array_policy(elements, *limit, *unique)
                .map_err(|e| ParseError::from_array_policy(&name, e))?;
            values.set(key, Value::Array(elements));
            *i += 1;
            Ok(())
        }
        OptionKind::Function { params, exec, .. } => {
            *i += 1;
            let min = params.min();
            let max = params.max().unwrap_or(usize::MAX);
            let mut collected = Vec::new();
            if let Some(v) = inline_value {
                collected.push(v);
            }
            while collected.len() < min && *i < args.len() {
                collected.push(args[*i].clone());
                *i += 1;
            }
            while collected.len() < max && *i < args.len() && !looks_like_option(&args[*i], index, settings) {
                collected.push(args[*i].clone());
                *i += 1;
            }
            if collected.len() < min {
                return Err(ParseError::WrongParamCount {
                    option: name.clone(),
                    actual: collected.len(),
                    expected: *params,
                });
            }
            let result = exec(values, &collected, completing)
                .await
                .map_err(|msg| ParseError::FunctionFailed {
                    option: name.clone(),
                    message: msg,
                })?;
            values.set(key, result);
            Ok(())
        }
        OptionKind::Command {
            schema: nested_schema,
            exec,
            r#break: _,
        } => {
            *i += 1;
            let rest = args[*i..].to_vec();
            let nested_settings = Settings {
                env: Arc::clone(&settings.env),
                ..settings.clone()
            };
            let outcome = Box::pin(run(Arc::clone(nested_schema), &nested_settings, rest, Some(&*values))).await;
            *i = args.len();
            match outcome {
                ParseOutcome::Values(nested_values) => {
                    let result = match exec {
                        Some(exec) => exec(values, nested_values, completing)
                            .await
                            .map_err(|msg| ParseError::CommandFailed {
                                option: name.clone(),
                                message: msg,
                            })?,
                        None => Value::Record(nested_values),
                    };
                    values.set(key, result);
                    Ok(())
                }
                ParseOutcome::Terminal(_) => Ok(()),
                ParseOutcome::Error(e) => Err(e),
            }
        }
    }
}

fn looks_like_option(arg: &str, index: &NameIndex, settings: &Settings) -> bool {
    let name_part = split_inline(arg).map(|(n, _)| n).unwrap_or(arg);
    index.resolve_name(name_part).is_some()
        || settings
            .cluster_prefix
            .as_deref()
            .is_some_and(|prefix| arg.starts_with(prefix))
}

fn take_next_param(args: &[String], i: &mut usize, name: &str) -> Result<String, ParseError> {
    let next = *i + 1;
    if next >= args.len() {
        return Err(ParseError::MissingParameter { option: name.to_owned() });
    }
    *i = next;
    Ok(args[next].clone())
}

async fn handle_cluster(
    schema: &Schema,
    index: &NameIndex,
    values: &mut ValuesRecord,
    raw_arg: &str,
    rest: &str,
    args: &[String],
    i: &mut usize,
) -> Result<(), ParseError> {
    let letters: Vec<char> = rest.chars().collect();
    for (pos, ch) in letters.iter().enumerate() {
        let key = index.resolve_cluster_letter(*ch).unwrap().to_owned();
        let spec = schema.get(&key).unwrap();
        match &spec.kind {
            OptionKind::Flag { .. } => {
                values.set(&key, Value::Bool(true));
            }
            OptionKind::Single { constraints } => {
                if pos != letters.len() - 1 {
                    return Err(ParseError::ClusterConflict {
                        cluster: raw_arg.to_owned(),
                        letter: *ch,
                    });
                }
                let raw = take_next_param(args, i, &raw_arg.to_owned())?;
                let value = coerce_scalar(&raw, constraints)
                    .await
                    .map_err(|e| ParseError::InvalidParameter {
                        option: key.clone(),
                        value: raw.clone(),
                        reason: InvalidReason::from(e),
                    })?;
                values.set(&key, value);
                *i += 1;
                return Ok(());
            }
            _ => {
                return Err(ParseError::ClusterConflict {
                    cluster: raw_arg.to_owned(),
                    letter: *ch,
                });
            }
        }
    }
    *i += 1;
    Ok(())
}

async fn complete_at(
    schema: &Schema,
    index: &NameIndex,
    values: &ValuesRecord,
    args: &[String],
    token_index: usize,
    prefix: &str,
) -> Vec<String> {
    // Inline form `name=prefix` (§4.5 "Inline form").
    if let Some((name, value_prefix)) = prefix.split_once('=') {
        return match index.resolve_name(name) {
            Some(key) => choices_candidates(schema, values, key, value_prefix, 0).await,
            None => Vec::new(),
        };
    }

    // Parameter position: the previous token named a value-bearing option.
    if token_index > 0 {
        if let Some(key) = index.resolve_name(&args[token_index - 1]) {
            let spec = schema.get(key).expect("index only yields known keys");
            if matches!(spec.kind, OptionKind::Single { .. } | OptionKind::Array { .. }) {
                let param_index = current_param_index(values, key);
                return choices_candidates(schema, values, key, prefix, param_index).await;
            }
        }
    }

    name_candidates(schema, prefix)
}

/// The index of the parameter about to be typed for `key`, for the `complete` callback's
/// `current_param_index` argument (§4.5): 0 for a scalar, or the number of elements already
/// collected for an array.
fn current_param_index(values: &ValuesRecord, key: &str) -> usize {
    match values.get(key) {
        Some(Value::Array(existing)) => existing.len(),
        _ => 0,
    }
}

fn name_candidates(schema: &Schema, prefix: &str) -> Vec<String> {
    let mut out: Vec<String> = schema
        .iter()
        .flat_map(|(_, spec)| spec.header.surface_names())
        .filter(|n| n.starts_with(prefix))
        .map(str::to_owned)
        .collect();
    for (_, spec) in schema.iter() {
        if let OptionKind::Flag { negation } = &spec.kind {
            out.extend(negation.iter().filter(|n| n.starts_with(prefix)).cloned());
        }
        if let Positional::Marker(marker) = &spec.header.positional {
            if marker.starts_with(prefix) {
                out.push(marker.clone());
            }
        }
    }
    out.sort();
    out.dedup();
    out
}

async fn choices_candidates(
    schema: &Schema,
    values: &ValuesRecord,
    key: &str,
    prefix: &str,
    current_param_index: usize,
) -> Vec<String> {
    let spec = schema.get(key).expect("index only yields known keys");
    let constraints = match &spec.kind {
        OptionKind::Single { constraints } | OptionKind::Array { constraints, .. } => constraints,
        _ => return Vec::new(),
    };
    if let Some(complete) = &constraints.complete {
        return complete(values, prefix, current_param_index).await;
    }
    constraints
        .choices
        .iter()
        .filter_map(|v| v.as_str())
        .filter(|s| s.starts_with(prefix))
        .map(str::to_owned)
        .collect()
}

/// Run the end-of-input pipeline (§4.4 "end-of-input processing order"): pending-parameter check is
/// handled inline during the walk, so from here it is env fallback -> defaults -> required check ->
/// requirement evaluation, in that order, for every key not already set by the walk.
async fn finalize(schema: &Schema, settings: &Settings, mut values: ValuesRecord) -> ParseOutcome {
    for (key, spec) in schema.iter() {
        if values.was_set(key) {
            continue;
        }
        if !spec.header.env.is_empty() {
            if let Some((env_name, raw)) = first_set(settings.env.as_ref(), &spec.header.env) {
                match apply_env_value(&spec.kind, &raw).await {
                    Ok(value) => {
                        values.set(key, value);
                        continue;
                    }
                    Err(reason) => {
                        return ParseOutcome::Error(ParseError::InvalidEnvParameter {
                            option: key.to_owned(),
                            env_var: env_name,
                            value: raw,
                            reason,
                        });
                    }
                }
            }
        }
        if let Some(source) = &spec.header.default {
            let value = resolve_value_source(source).await;
            values.set_default(key, value);
        }
    }

    for (key, spec) in schema.iter() {
        if !values.is_unset(key) {
            continue;
        }
        if let Some(source) = &spec.header.fallback {
            let value = resolve_value_source(source).await;
            values.set_default(key, value);
        }
    }

    for (key, spec) in schema.iter() {
        if spec.header.required && values.is_unset(key) {
            let name = spec.header.preferred_name().map(|n| format!("-{n}")).unwrap_or_else(|| key.to_owned());
            return ParseOutcome::Error(ParseError::MissingRequiredOption { option: name });
        }
        if let Some(req) = &spec.header.required_if {
            if values.is_unset(key) && req.eval(&values) {
                return ParseOutcome::Error(ParseError::conditionally_required(schema, key, req));
            }
        }
        if let Some(req) = &spec.header.requires {
            if values.was_set(key) && !req.eval(&values) {
                return ParseOutcome::Error(ParseError::requirement_not_satisfied(schema, key, req));
            }
        }
    }

    ParseOutcome::Values(values)
}

async fn apply_env_value(kind: &OptionKind, raw: &str) -> Result<Value, InvalidReason> {
    match kind {
        OptionKind::Flag { .. } => Ok(Value::Bool(raw == "1" || raw.eq_ignore_ascii_case("true"))),
        OptionKind::Single { constraints } => {
            crate::coerce::coerce_scalar_deferred(raw.to_owned(), constraints.clone())
                .await
                .map_err(InvalidReason::from)
        }
        OptionKind::Array {
            constraints,
            separator,
            parse_delimited,
            ..
        } => coerce_array_argument(raw, constraints, *separator, parse_delimited.as_ref())
            .await
            .map(Value::Array)
            .map_err(InvalidReason::from),
        _ => Ok(Value::Undefined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Header, OptionSpec, ScalarConstraints};

    fn schema_with_flag_and_single() -> Schema {
        let mut schema = Schema::new();
        schema.insert("verbose", OptionSpec::flag(&["--verbose"]));
        schema.insert("out", OptionSpec::single(&["--out"]));
        schema
    }

    #[test]
    fn flag_sets_true_and_single_consumes_next_arg() {
        let schema = Arc::new(schema_with_flag_and_single());
        let settings = Settings::default();
        let args = vec!["--verbose".to_owned(), "--out".to_owned(), "file.txt".to_owned()];
        let outcome = futures::executor::block_on(run(schema, &settings, args, None));
        match outcome {
            ParseOutcome::Values(values) => {
                assert_eq!(values.get("verbose"), Some(&Value::Bool(true)));
                assert_eq!(values.get("out"), Some(&Value::Str("file.txt".to_owned())));
            }
            other => panic!("expected values, got {other:?}"),
        }
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let schema = Arc::new(schema_with_flag_and_single());
        let settings = Settings::default();
        let args = vec!["--out".to_owned()];
        let outcome = futures::executor::block_on(run(schema, &settings, args, None));
        assert!(matches!(outcome, ParseOutcome::Error(ParseError::MissingParameter { .. })));
    }

    #[test]
    fn unrecognized_option_suggests_close_match() {
        let schema = Arc::new(schema_with_flag_and_single());
        let settings = Settings::default();
        let args = vec!["--verbos".to_owned()];
        let outcome = futures::executor::block_on(run(schema, &settings, args, None));
        match outcome {
            ParseOutcome::Error(ParseError::UnrecognizedOption { suggestions, .. }) => {
                assert!(suggestions.contains(&"--verbose".to_owned()));
            }
            other => panic!("expected UnrecognizedOption, got {other:?}"),
        }
    }

    #[test]
    fn required_option_missing_is_reported() {
        let mut schema = Schema::new();
        schema.insert(
            "out",
            OptionSpec::new(
                Header {
                    names: vec![Some("--out".to_owned())],
                    required: true,
                    ..Default::default()
                },
                OptionKind::Single {
                    constraints: ScalarConstraints::default(),
                },
            ),
        );
        let settings = Settings::default();
        let outcome = futures::executor::block_on(run(Arc::new(schema), &settings, vec![], None));
        assert!(matches!(outcome, ParseOutcome::Error(ParseError::MissingRequiredOption { .. })));
    }

    #[test]
    fn flag_rejects_inline_parameter() {
        let schema = Arc::new(schema_with_flag_and_single());
        let settings = Settings::default();
        let args = vec!["--verbose=yes".to_owned()];
        let outcome = futures::executor::block_on(run(schema, &settings, args, None));
        assert!(matches!(outcome, ParseOutcome::Error(ParseError::InlineNotAccepted { .. })));
    }

    #[test]
    fn inline_required_but_absent_is_reported() {
        let mut schema = Schema::new();
        schema.insert(
            "mode",
            OptionSpec::new(
                Header {
                    names: vec![Some("--mode".to_owned())],
                    inline: crate::schema::Inline::Required,
                    ..Default::default()
                },
                OptionKind::Single {
                    constraints: ScalarConstraints::default(),
                },
            ),
        );
        let settings = Settings::default();
        let args = vec!["--mode".to_owned(), "fast".to_owned()];
        let outcome = futures::executor::block_on(run(Arc::new(schema), &settings, args, None));
        assert!(matches!(outcome, ParseOutcome::Error(ParseError::InlineRequired { .. })));
    }

    #[test]
    fn cluster_conflict_when_non_last_letter_needs_a_parameter() {
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
        let settings = Settings::default();
        let outcome = futures::executor::block_on(run(Arc::new(schema), &settings, vec!["-cab".to_owned()], None));
        assert!(matches!(outcome, ParseOutcome::Error(ParseError::ClusterConflict { .. })));
    }

    #[test]
    fn env_fallback_used_when_absent_from_args() {
        let mut schema = Schema::new();
        schema.insert(
            "out",
            OptionSpec::new(
                Header {
                    names: vec![Some("--out".to_owned())],
                    env: vec!["OUT_FILE".to_owned()],
                    ..Default::default()
                },
                OptionKind::Single {
                    constraints: ScalarConstraints::default(),
                },
            ),
        );
        let mut settings = Settings::default();
        settings.env = Arc::new(crate::env::MapEnvView::new().with("OUT_FILE", "from-env.txt"));
        let outcome = futures::executor::block_on(run(Arc::new(schema), &settings, vec![], None));
        match outcome {
            ParseOutcome::Values(values) => {
                assert_eq!(values.get("out"), Some(&Value::Str("from-env.txt".to_owned())));
            }
            other => panic!("expected values, got {other:?}"),
        }
    }
}
