//! Point-in-time index views that compiled queries are bound to.

use std::fmt::Debug;

/// A consistent view of the index being queried.
///
/// The generation is stamped onto every compiled query so an executor can
/// refuse to run a query against a different view than it was compiled
/// for. Field names let the resolver expand "all languages" lookups to
/// the locales actually present.
pub trait IndexSnapshot: Send + Sync + Debug {
    fn generation(&self) -> u64;

    /// Every field name present in this view.
    fn field_names(&self) -> Vec<String>;
}

/// A snapshot described by a fixed generation and field list.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshot {
    generation: u64,
    fields: Vec<String>,
}

impl StaticSnapshot {
    pub fn new(generation: u64) -> Self {
        StaticSnapshot {
            generation,
            fields: Vec::new(),
        }
    }

    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.fields.push(field.into());
        self
    }
}

impl IndexSnapshot for StaticSnapshot {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.clone()
    }
}
