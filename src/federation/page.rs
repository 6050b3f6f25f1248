//! Query options and the serializable views built from a federation.

use serde::{Deserialize, Serialize};

use crate::federation::SelectorShape;
use crate::repository::EntityId;

/// Options the federated query was executed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// The statement text, for diagnostics.
    pub statement: String,
    /// Matches skipped before the first row.
    pub skip_count: usize,
    /// Upper bound on materialized rows per selector.
    pub max_items: usize,
}

impl QueryOptions {
    pub fn new<S: Into<String>>(statement: S) -> Self {
        QueryOptions {
            statement: statement.into(),
            ..Default::default()
        }
    }

    pub fn with_skip_count(mut self, skip_count: usize) -> Self {
        self.skip_count = skip_count;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            statement: String::new(),
            skip_count: 0,
            max_items: 100,
        }
    }
}

/// Describes the columns of a federated result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSetMetadata {
    /// Selector names in column order.
    pub selectors: Vec<String>,
    pub shape: Option<SelectorShape>,
    pub options: QueryOptions,
}

/// One selector's values in a page row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorValue {
    pub selector: String,
    pub entity_id: EntityId,
    pub score: f32,
}

/// A row of a [`ResultPage`].
///
/// `entity_id` and `score` are set only when every selector agrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRow {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub selectors: Vec<SelectorValue>,
}

/// A page of results in the shape protocol layers return to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// Skip count of the originating query.
    pub start: usize,
    pub num_items: usize,
    pub has_more_items: bool,
    pub rows: Vec<PageRow>,
}
