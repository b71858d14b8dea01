//! Read-only catalogs of IANA time zone identifiers.
//!
//! The resolver never touches a global database directly; it is handed a
//! [`TimezoneCatalog`] so tests can swap in a [`FixedCatalog`].

use jiff::tz::{Offset, TimeZone};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, OnceLock},
};
use thiserror::Error;
use tracing::debug;

/// Errors raised while looking up a catalog entry
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("time zone `{0}` is not in the catalog")]
    NotFound(String),

    #[error("time zone `{name}` could not be loaded: {source}")]
    Load {
        name: String,
        #[source]
        source: jiff::Error,
    },

    #[error("time zone `{name}` is unusable: {reason}")]
    Unusable { name: String, reason: String },
}

/// The set of time zone identifiers known to the process.
pub trait TimezoneCatalog: Send + Sync + fmt::Debug {
    /// All identifiers, sorted.
    fn names(&self) -> &[String];

    /// Build the zone for an identifier.
    fn get(&self, name: &str) -> Result<TimeZone, CatalogError>;
}

/// Catalog backed by the host tz database (or jiff's bundled copy when the
/// host has none).
#[derive(Debug)]
pub struct SystemCatalog {
    names: Vec<String>,
}

impl SystemCatalog {
    /// Snapshot the identifiers currently available from the database.
    pub fn load() -> Self {
        let mut names: Vec<String> = jiff::tz::db()
            .available()
            .map(|name| name.to_string())
            .collect();
        names.sort();
        names.dedup();
        debug!(target: "weather_time_agent::timezone", count = names.len(), "Loaded time zone catalog");
        Self { names }
    }

    /// Process-wide catalog, loaded on first use.
    pub fn shared() -> Arc<SystemCatalog> {
        static CATALOG: OnceLock<Arc<SystemCatalog>> = OnceLock::new();
        CATALOG
            .get_or_init(|| Arc::new(SystemCatalog::load()))
            .clone()
    }
}

impl TimezoneCatalog for SystemCatalog {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn get(&self, name: &str) -> Result<TimeZone, CatalogError> {
        // jiff matches case-insensitively; only listed spellings are accepted.
        if self
            .names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .is_err()
        {
            return Err(CatalogError::NotFound(name.to_string()));
        }
        jiff::tz::db().get(name).map_err(|source| CatalogError::Load {
            name: name.to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
enum FixedEntry {
    Offset(Offset),
    Broken(String),
}

/// In-memory catalog of fixed-offset zones.
///
/// Entries can be marked broken to simulate a corrupt database entry that is
/// listed but cannot be constructed.
#[derive(Debug, Clone, Default)]
pub struct FixedCatalog {
    entries: BTreeMap<String, FixedEntry>,
    names: Vec<String>,
}

impl FixedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, name: impl Into<String>, offset: Offset) -> Self {
        self.insert(name.into(), FixedEntry::Offset(offset));
        self
    }

    pub fn with_broken_zone(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.insert(name.into(), FixedEntry::Broken(reason.into()));
        self
    }

    fn insert(&mut self, name: String, entry: FixedEntry) {
        self.entries.insert(name, entry);
        self.names = self.entries.keys().cloned().collect();
    }
}

impl TimezoneCatalog for FixedCatalog {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn get(&self, name: &str) -> Result<TimeZone, CatalogError> {
        match self.entries.get(name) {
            Some(FixedEntry::Offset(offset)) => Ok(TimeZone::fixed(*offset)),
            Some(FixedEntry::Broken(reason)) => Err(CatalogError::Unusable {
                name: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(CatalogError::NotFound(name.to_string())),
        }
    }
}
