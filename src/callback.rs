//! Deferred values and the callback shapes the schema can carry.
//!
//! Every user-supplied hook (`parse`, `complete`, function/command `exec`, `default`, `fallback`) is
//! specified as a function that may answer synchronously or asynchronously (§4.4 "Asynchrony", §9
//! "Callbacks and async"). We model that uniformly as a boxed future: a synchronous callback just
//! returns a future that is already resolved on first poll, built with [`ready`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::value::{Value, ValuesRecord};

/// A boxed, possibly-suspending computation. Parsing drives the whole pipeline as a single future
/// (see SPEC_FULL.md §4.4), so every callback answers in this shape regardless of whether it is
/// "really" asynchronous.
pub type Deferred<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Wrap an already-available value as a [`Deferred`] that resolves on first poll.
pub fn ready<T: Send + 'static>(value: T) -> Deferred<T> {
    Box::pin(futures::future::ready(value))
}

/// Custom string/number coercion (`parse` field). Receives the raw argument text.
pub type ParseFn = Arc<dyn Fn(&str) -> Deferred<Result<Value, String>> + Send + Sync>;

/// Custom splitter+coercer for array options (`parse_delimited` field). Receives the raw argument
/// text and produces the full element list in one shot.
pub type ParseDelimitedFn = Arc<dyn Fn(&str) -> Deferred<Result<Vec<Value>, String>> + Send + Sync>;

/// Custom completion candidate producer (`complete` field).
///
/// Arguments are `(values, prefix, current_param_index)` per §4.5.
pub type CompleteFn =
    Arc<dyn Fn(&ValuesRecord, &str, usize) -> Deferred<Vec<String>> + Send + Sync>;

/// A zero-argument callback producing a `default` or `fallback` value.
pub type SupplyFn = Arc<dyn Fn() -> Deferred<Value> + Send + Sync>;

/// A `function` option's side-effecting callback. `comp` is `true` during completion mode (§4.5);
/// implementations that only act on real parses should no-op in that case.
pub type ExecFn = Arc<
    dyn Fn(&mut ValuesRecord, &[String], bool) -> Deferred<Result<Value, String>> + Send + Sync,
>;

/// A `command` option's callback, run once the nested parse has produced its own values record.
pub type CommandExecFn =
    Arc<dyn Fn(&mut ValuesRecord, ValuesRecord, bool) -> Deferred<Result<Value, String>> + Send + Sync>;

/// An opaque requirement predicate (`Requirement::Predicate`). Unlike the hooks above this is
/// specified as synchronous (§3.3): it only inspects the values record, it does not produce one.
pub type PredicateFn = Arc<dyn Fn(&ValuesRecord) -> bool + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn ready_resolves_immediately() {
        let d = ready(5i32);
        assert_eq!(block_on(d), 5);
    }

    #[test]
    fn parse_fn_can_be_stored_and_invoked() {
        let f: ParseFn = Arc::new(|raw: &str| ready(Ok(Value::Str(raw.to_uppercase()))));
        let out = block_on(f("hi"));
        assert_eq!(out, Ok(Value::Str("HI".into())));
    }
}
