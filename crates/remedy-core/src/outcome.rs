//! Combinators for threading failures through multi-stage pipelines.
//!
//! The two-variant success/failure type is [`std::result::Result`]: `map`
//! transforms the success value, `map_err` the failure value and
//! `and_then` chains into the next fallible stage, short-circuiting on the
//! first failure. This module adds the two pieces std does not provide:
//!
//! - [`Fold`], which eliminates a result into one output type, and
//! - [`Violations`], which accumulates every failed check instead of
//!   stopping at the first one.
//!
//! # Examples
//!
//! ```rust
//! use remedy_core::outcome::{Fold, Violations};
//!
//! let parsed: Result<u32, String> = "42".parse::<u32>().map_err(|e| e.to_string());
//! let message = parsed.fold(|err| format!("bad: {err}"), |n| format!("ok: {n}"));
//! assert_eq!(message, "ok: 42");
//!
//! let mut violations = Violations::new();
//! violations.check(false, "title is required");
//! violations.check(false, "source is required");
//! assert_eq!(violations.into_result(()).unwrap_err().len(), 2);
//! ```

/// Eliminate a result into a single type.
pub trait Fold<S, F> {
    /// Apply `on_failure` or `on_success`, whichever variant is populated.
    fn fold<T>(self, on_failure: impl FnOnce(F) -> T, on_success: impl FnOnce(S) -> T) -> T;
}

impl<S, F> Fold<S, F> for Result<S, F> {
    fn fold<T>(self, on_failure: impl FnOnce(F) -> T, on_success: impl FnOnce(S) -> T) -> T {
        match self {
            Ok(value) => on_success(value),
            Err(error) => on_failure(error),
        }
    }
}

/// Accumulator for independent validation checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless `condition` holds.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.0.push(message.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Succeed with `value` when no check failed, otherwise fail with all
    /// recorded messages in the order they were checked.
    pub fn into_result<S>(self, value: S) -> Result<S, Vec<String>> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self.0)
        }
    }
}
