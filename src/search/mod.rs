//! Per-selector execution.
//!
//! A [`SearchExecutor`] runs one [`CompiledQuery`] and returns a
//! [`ResultSet`]. The [`QueryEngine`] compiles every selector of a
//! federated query, executes them and hands the results to federation.

pub mod engine;
pub mod hits;
pub mod memory;

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::query::CompiledQuery;
use crate::repository::EntityId;

pub use engine::{FederatedQuery, QueryEngine, SelectorQuery};
pub use hits::{HitResultSet, RowEntry};
pub use memory::MemorySearchExecutor;

/// The rows one selector's search produced.
///
/// Rows are addressed by a 0-based contiguous index. Every read after
/// [`close`](ResultSet::close) fails with
/// [`DocQueryError::ResultSetClosed`](crate::error::DocQueryError::ResultSetClosed).
pub trait ResultSet: Send + Sync + Debug {
    /// Number of rows materialized.
    fn len(&self) -> Result<usize>;

    /// Whether the index holds matches beyond the materialized rows.
    fn has_more(&self) -> Result<bool>;

    fn entity_id(&self, index: usize) -> Result<EntityId>;

    /// Relevance score; 0 when the query had no relevance component.
    fn score(&self, index: usize) -> Result<f32>;

    /// Release the rows and any index resources they hold.
    fn close(&self) -> Result<()>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Runs one compiled query against the index view it was compiled for.
pub trait SearchExecutor: Send + Sync + Debug {
    /// Execute `query`, skipping the first `skip` matches and
    /// materializing at most `max_items` rows.
    fn execute(&self, query: &CompiledQuery, skip: usize, max_items: usize)
    -> Result<Arc<dyn ResultSet>>;
}
