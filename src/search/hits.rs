//! A result set over materialized hits.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{DocQueryError, Result};
use crate::repository::EntityId;
use crate::search::ResultSet;

/// One materialized row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowEntry {
    pub entity_id: EntityId,
    pub score: f32,
}

impl RowEntry {
    pub fn new<I: Into<EntityId>>(entity_id: I, score: f32) -> Self {
        RowEntry {
            entity_id: entity_id.into(),
            score,
        }
    }
}

/// Rows held in memory. Closing drops them.
#[derive(Debug)]
pub struct HitResultSet {
    rows: RwLock<Option<Vec<RowEntry>>>,
    has_more: bool,
}

impl HitResultSet {
    pub fn new(rows: Vec<RowEntry>, has_more: bool) -> Self {
        HitResultSet {
            rows: RwLock::new(Some(rows)),
            has_more,
        }
    }

    /// Build from `(entity id, score)` pairs with nothing beyond them.
    pub fn from_hits<I, E>(hits: I) -> Self
    where
        I: IntoIterator<Item = (E, f32)>,
        E: Into<EntityId>,
    {
        let rows = hits
            .into_iter()
            .map(|(id, score)| RowEntry::new(id, score))
            .collect();
        Self::new(rows, false)
    }

    pub fn is_closed(&self) -> bool {
        self.rows.read().is_none()
    }

    fn with_row<T>(&self, index: usize, read: impl FnOnce(&RowEntry) -> T) -> Result<T> {
        let guard = self.rows.read();
        let rows = guard.as_ref().ok_or(DocQueryError::ResultSetClosed)?;
        rows.get(index)
            .map(read)
            .ok_or(DocQueryError::IndexOutOfRange {
                index,
                len: rows.len(),
            })
    }
}

impl ResultSet for HitResultSet {
    fn len(&self) -> Result<usize> {
        self.rows
            .read()
            .as_ref()
            .map(Vec::len)
            .ok_or(DocQueryError::ResultSetClosed)
    }

    fn has_more(&self) -> Result<bool> {
        if self.is_closed() {
            return Err(DocQueryError::ResultSetClosed);
        }
        Ok(self.has_more)
    }

    fn entity_id(&self, index: usize) -> Result<EntityId> {
        self.with_row(index, |row| row.entity_id.clone())
    }

    fn score(&self, index: usize) -> Result<f32> {
        self.with_row(index, |row| row.score)
    }

    fn close(&self) -> Result<()> {
        self.rows.write().take();
        Ok(())
    }
}
