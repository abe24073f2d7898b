//! Permission models

use std::{borrow::Cow, fmt};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Capability code such as `movies:read`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(Cow<'static, str>);

impl PermissionCode {
    pub const MOVIES_READ: Self = Self(Cow::Borrowed("movies:read"));
    pub const MOVIES_WRITE: Self = Self(Cow::Borrowed("movies:write"));

    /// Codes seeded into every store.
    pub const KNOWN: [Self; 2] = [Self::MOVIES_READ, Self::MOVIES_WRITE];

    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Snapshot of the codes held by one user, loaded fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(FxHashSet<PermissionCode>);

impl PermissionSet {
    #[must_use]
    pub fn includes(&self, code: &PermissionCode) -> bool {
        self.0.contains(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.0.iter()
    }
}

impl FromIterator<PermissionCode> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
