//! Relationship record resolution contracts.
//!
//! # Responsibility
//! - Define the lookup seam behind `belongs_to` relationships.
//! - Provide an in-process registry of record finders.
//!
//! # Invariants
//! - Finder faults are returned to the caller unchanged.
//! - Lookups are keyed by the conventional record type name (`AccountOwner`).

use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Record lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The schema declaring the relationship has no resolver configured.
    ResolverMissing { relationship: String },
    /// No finder is registered for the record type.
    UnknownRecordType(String),
    /// The finder ran but no record matched the id.
    NotFound { record_type: String, id: String },
    /// Finder-specific failure.
    Lookup { record_type: String, message: String },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolverMissing { relationship } => {
                write!(f, "no record resolver configured for relationship `{relationship}`")
            }
            Self::UnknownRecordType(value) => write!(f, "unknown record type: {value}"),
            Self::NotFound { record_type, id } => {
                write!(f, "couldn't find {record_type} with id={id}")
            }
            Self::Lookup {
                record_type,
                message,
            } => write!(f, "{record_type} lookup failed: {message}"),
        }
    }
}

impl Error for ResolveError {}

/// Finds one record by type name and id.
pub trait RecordResolver: Send + Sync {
    fn resolve(&self, record_type: &str, id: &Value) -> Result<Value, ResolveError>;
}

type Finder = Arc<dyn Fn(&Value) -> Result<Value, ResolveError> + Send + Sync>;

/// In-process resolver mapping record type names to finder closures.
#[derive(Default, Clone)]
pub struct RecordRegistry {
    finders: BTreeMap<String, Finder>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the finder for one record type, replacing any previous one.
    pub fn register<F>(&mut self, record_type: impl Into<String>, finder: F)
    where
        F: Fn(&Value) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        self.finders.insert(record_type.into(), Arc::new(finder));
    }

    /// Builder form of [`RecordRegistry::register`].
    pub fn with<F>(mut self, record_type: impl Into<String>, finder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        self.register(record_type, finder);
        self
    }

    pub fn len(&self) -> usize {
        self.finders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    /// Returns sorted record type names.
    pub fn record_types(&self) -> Vec<String> {
        self.finders.keys().cloned().collect()
    }
}

impl RecordResolver for RecordRegistry {
    fn resolve(&self, record_type: &str, id: &Value) -> Result<Value, ResolveError> {
        let Some(finder) = self.finders.get(record_type) else {
            return Err(ResolveError::UnknownRecordType(record_type.to_string()));
        };
        finder(id)
    }
}
