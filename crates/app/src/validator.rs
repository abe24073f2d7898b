//! Request-scoped field validation.
//!
//! A [`Validator`] collects at most one message per field: the first failed check
//! for a field wins and later failures for the same field are ignored.

use std::{collections::BTreeMap, hash::Hash, sync::LazyLock};

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Local part of printable specials, then dot-separated domain labels of at most 63
/// characters that neither start nor end with a hyphen.
#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal, a failure to compile is a programming error"
)]
static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("e-mail pattern compiles")
});

/// Field name to failure message, ordered by field for stable output.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Record `message` under `field` if nothing has been recorded for it yet.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// `Ok(())` when valid, otherwise the collected field errors.
    ///
    /// # Errors
    ///
    /// Returns the recorded failures when at least one check failed.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Whether `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Whether every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let distinct: FxHashSet<&T> = values.iter().collect();

    distinct.len() == values.len()
}

/// Whether `value` has the shape of an e-mail address.
pub fn is_email(value: &str) -> bool {
    EMAIL_RX.is_match(value)
}
