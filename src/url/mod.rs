//! URL handling module for Serp-Harvester
//!
//! Search results are deduplicated at organization granularity, so every
//! result URL is reduced to its registrable domain before admission.

mod domain;

use std::fmt;

pub use domain::registrable_domain;

/// Canonical registrable domain of a result URL, lower-cased
///
/// This is the global dedup key: at most one record per key survives a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainKey(pub(crate) String);

impl DomainKey {
    /// Returns the domain as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the owned domain string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
