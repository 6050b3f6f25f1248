//! Row views and the row iterator.

use crate::error::Result;
use crate::federation::FederatedResultSet;
use crate::repository::EntityId;

/// One row across all selectors, read on demand from the per-selector
/// results.
#[derive(Debug, Clone, Copy)]
pub struct FederatedRow<'a> {
    set: &'a FederatedResultSet,
    index: usize,
}

impl<'a> FederatedRow<'a> {
    pub(crate) fn new(set: &'a FederatedResultSet, index: usize) -> Self {
        FederatedRow { set, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Entity id of this row in `selector`, or `None` when no such
    /// selector exists.
    pub fn entity_id_of(&self, selector: &str) -> Result<Option<EntityId>> {
        match self.set.selector_result(selector) {
            Some(result) => Ok(Some(self.set.read(|| result.entity_id(self.index))?)),
            None => Ok(None),
        }
    }

    pub fn score_of(&self, selector: &str) -> Result<Option<f32>> {
        match self.set.selector_result(selector) {
            Some(result) => Ok(Some(self.set.read(|| result.score(self.index))?)),
            None => Ok(None),
        }
    }

    /// Selector name and entity id, in selector order.
    pub fn entity_ids(&self) -> Result<Vec<(&'a str, EntityId)>> {
        let set = self.set;
        set.selector_entries()
            .map(|(name, result)| set.read(|| result.entity_id(self.index)).map(|id| (name, id)))
            .collect()
    }

    /// Selector name and score, in selector order.
    pub fn scores(&self) -> Result<Vec<(&'a str, f32)>> {
        let set = self.set;
        set.selector_entries()
            .map(|(name, result)| set.read(|| result.score(self.index)).map(|score| (name, score)))
            .collect()
    }

    /// The entity id every selector agrees on.
    pub fn entity_id(&self) -> Result<EntityId> {
        self.set.entity_id(self.index)
    }

    /// The score every selector agrees on.
    pub fn score(&self) -> Result<f32> {
        self.set.score(self.index)
    }
}

/// Iterator over the rows of a [`FederatedResultSet`] in index order.
///
/// Each call to [`FederatedResultSet::iter`] starts a fresh traversal.
/// If the set is closed mid-traversal the iterator yields one
/// [`ResultSetClosed`](crate::error::DocQueryError::ResultSetClosed)
/// error and then ends.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    set: &'a FederatedResultSet,
    next: usize,
    end: usize,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(set: &'a FederatedResultSet, end: usize) -> Self {
        Rows { set, next: 0, end }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<FederatedRow<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        if let Err(e) = self.set.ensure_open() {
            self.next = self.end;
            return Some(Err(e));
        }
        let row = FederatedRow::new(self.set, self.next);
        self.next += 1;
        Some(Ok(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end - self.next))
    }
}
