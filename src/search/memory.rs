//! An in-memory search executor with canned hits per query.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashMap;
use log::trace;

use crate::error::{DocQueryError, Result};
use crate::query::{CompiledQuery, IndexQuery};
use crate::search::hits::{HitResultSet, RowEntry};
use crate::search::{ResultSet, SearchExecutor};

/// Answers queries from a fixed table keyed by index query.
///
/// Queries with no entry match nothing. Paging is applied to the stored
/// hits, and `has_more` reports whether hits remain past the page.
#[derive(Debug, Default)]
pub struct MemorySearchExecutor {
    hits: AHashMap<IndexQuery, Vec<RowEntry>>,
    failures: AHashMap<IndexQuery, String>,
    executions: AtomicUsize,
}

impl MemorySearchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hits `query` produces, in result order.
    pub fn with_hits(mut self, query: IndexQuery, hits: Vec<RowEntry>) -> Self {
        self.hits.insert(query, hits);
        self
    }

    /// Make executing `query` fail with `message`.
    pub fn with_failure<S: Into<String>>(mut self, query: IndexQuery, message: S) -> Self {
        self.failures.insert(query, message.into());
        self
    }

    /// Number of queries executed so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl SearchExecutor for MemorySearchExecutor {
    fn execute(
        &self,
        query: &CompiledQuery,
        skip: usize,
        max_items: usize,
    ) -> Result<Arc<dyn ResultSet>> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        trace!("executing {query} skip={skip} max={max_items}");

        if let Some(message) = self.failures.get(query.query()) {
            return Err(DocQueryError::search_execution(query.to_string(), message.clone()));
        }

        let all = self
            .hits
            .get(query.query())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let start = skip.min(all.len());
        let end = start.saturating_add(max_items).min(all.len());
        let page = all[start..end].to_vec();

        Ok(Arc::new(HitResultSet::new(page, end < all.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(query: IndexQuery) -> CompiledQuery {
        CompiledQuery::new(query, Vec::new(), 1)
    }

    #[test]
    fn test_paging() {
        let query = IndexQuery::term("TYPE", "doc");
        let hits = (0..5).map(|i| RowEntry::new(i.to_string(), 1.0)).collect();
        let executor = MemorySearchExecutor::new().with_hits(query.clone(), hits);

        let page = executor.execute(&compiled(query.clone()), 1, 2).unwrap();
        assert_eq!(page.len().unwrap(), 2);
        assert_eq!(page.entity_id(0).unwrap().as_str(), "1");
        assert!(page.has_more().unwrap());

        let last = executor.execute(&compiled(query.clone()), 4, 10).unwrap();
        assert_eq!(last.len().unwrap(), 1);
        assert!(!last.has_more().unwrap());

        let beyond = executor.execute(&compiled(query), 10, 10).unwrap();
        assert!(beyond.is_empty().unwrap());
        assert_eq!(executor.executions(), 3);
    }

    #[test]
    fn test_unknown_query_matches_nothing() {
        let executor = MemorySearchExecutor::new();
        let result = executor.execute(&compiled(IndexQuery::MatchAll), 0, 10).unwrap();
        assert_eq!(result.len().unwrap(), 0);
    }

    #[test]
    fn test_failure() {
        let executor = MemorySearchExecutor::new().with_failure(IndexQuery::MatchAll, "index offline");
        match executor.execute(&compiled(IndexQuery::MatchAll), 0, 10) {
            Err(DocQueryError::SearchExecution { message, .. }) => {
                assert_eq!(message, "index offline")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
