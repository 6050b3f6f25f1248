//! The federated result set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{DocQueryError, Result};
use crate::federation::page::{PageRow, QueryOptions, ResultPage, ResultSetMetadata, SelectorValue};
use crate::federation::row::{FederatedRow, Rows};
use crate::repository::{EntityId, EntityLookup, ParentLink};
use crate::search::ResultSet;

/// How the selectors of a federation relate to their results.
///
/// Resolved once at construction; it decides whether selector-agnostic
/// reads need to compare values across selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorShape {
    /// Exactly one selector.
    Single,
    /// Several selectors, all naming the same underlying result.
    SharedResult,
    /// Several selectors over distinct results, joined by row index.
    Join,
}

impl SelectorShape {
    fn of(selectors: &[SelectorEntry]) -> Option<Self> {
        let (first, rest) = selectors.split_first()?;
        if rest.is_empty() {
            Some(SelectorShape::Single)
        } else if rest.iter().all(|entry| same_result(&entry.result, &first.result)) {
            Some(SelectorShape::SharedResult)
        } else {
            Some(SelectorShape::Join)
        }
    }
}

fn same_result(a: &Arc<dyn ResultSet>, b: &Arc<dyn ResultSet>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[derive(Debug)]
struct SelectorEntry {
    name: String,
    result: Arc<dyn ResultSet>,
}

/// Per-selector results joined by row index.
///
/// Read-only apart from [`close`](Self::close). Safe for concurrent
/// readers; reads racing a close observe
/// [`DocQueryError::ResultSetClosed`].
#[derive(Debug)]
pub struct FederatedResultSet {
    selectors: Vec<SelectorEntry>,
    positions: AHashMap<String, usize>,
    shape: Option<SelectorShape>,
    row_count: usize,
    options: QueryOptions,
    lookup: Arc<dyn EntityLookup>,
    closed: AtomicBool,
}

impl FederatedResultSet {
    /// Federate `results`, keyed by selector name, in column order.
    ///
    /// Fails with [`DocQueryError::DuplicateSelector`] when a name repeats
    /// and with [`DocQueryError::RowCountMismatch`] when the results do
    /// not share one row count. An empty set of selectors is accepted;
    /// row reads on it fail with [`DocQueryError::EmptyFederation`].
    pub fn new<I, S>(results: I, options: QueryOptions, lookup: Arc<dyn EntityLookup>) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Arc<dyn ResultSet>)>,
        S: Into<String>,
    {
        let mut selectors = Vec::new();
        let mut positions = AHashMap::new();
        for (name, result) in results {
            let name = name.into();
            if positions.contains_key(&name) {
                return Err(DocQueryError::DuplicateSelector(name));
            }
            positions.insert(name.clone(), selectors.len());
            selectors.push(SelectorEntry { name, result });
        }

        let mut row_count = 0;
        if let Some((first, rest)) = selectors.split_first() {
            row_count = first.result.len()?;
            for entry in rest {
                let actual = entry.result.len()?;
                if actual != row_count {
                    return Err(DocQueryError::RowCountMismatch {
                        selector: entry.name.clone(),
                        expected: row_count,
                        actual,
                    });
                }
            }
        }

        let shape = SelectorShape::of(&selectors);
        debug!(
            "federating {} selector(s) as {shape:?} with {row_count} row(s)",
            selectors.len()
        );

        Ok(FederatedResultSet {
            selectors,
            positions,
            shape,
            row_count,
            options,
            lookup,
            closed: AtomicBool::new(false),
        })
    }

    /// The row count shared by every selector.
    pub fn row_count(&self) -> Result<usize> {
        self.ensure_open()?;
        if self.selectors.is_empty() {
            return Err(DocQueryError::EmptyFederation);
        }
        Ok(self.row_count)
    }

    /// Same as [`row_count`](Self::row_count).
    pub fn len(&self) -> Result<usize> {
        self.row_count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.row_count()? == 0)
    }

    /// True while any selector has matches beyond its materialized rows.
    pub fn has_more(&self) -> Result<bool> {
        self.ensure_open()?;
        for entry in &self.selectors {
            if entry.result.has_more()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// A view of row `index` across all selectors.
    pub fn row(&self, index: usize) -> Result<FederatedRow<'_>> {
        self.check_index(index)?;
        Ok(FederatedRow::new(self, index))
    }

    /// The entity id of row `index`, provided every selector agrees.
    pub fn entity_id(&self, index: usize) -> Result<EntityId> {
        self.agreed(index, "entity id", |result| result.entity_id(index), |a, b| a == b)
    }

    /// The score of row `index`, provided every selector agrees.
    pub fn score(&self, index: usize) -> Result<f32> {
        self.agreed(
            index,
            "score",
            |result| result.score(index),
            |a, b| a.to_bits() == b.to_bits(),
        )
    }

    /// The primary parent association of the entity at row `index`.
    ///
    /// `None` for root entities. Fails with
    /// [`DocQueryError::EntityNotFound`] when the entity no longer exists.
    pub fn primary_parent_link(&self, index: usize) -> Result<Option<ParentLink>> {
        let id = self.entity_id(index)?;
        if !self.lookup.exists(&id)? {
            return Err(DocQueryError::entity_not_found(id.as_str()));
        }
        self.lookup.primary_parent(&id)
    }

    /// A fresh traversal of every row in index order.
    pub fn iter(&self) -> Result<Rows<'_>> {
        Ok(Rows::new(self, self.row_count()?))
    }

    /// Release every distinct underlying result once.
    ///
    /// Later calls do nothing. Every result is released even when an
    /// earlier release fails; the first failure is returned.
    pub fn close(&self) -> Result<()> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let mut released: Vec<&Arc<dyn ResultSet>> = Vec::with_capacity(self.selectors.len());
        let mut first_error = None;
        for entry in &self.selectors {
            if released.iter().any(|result| same_result(result, &entry.result)) {
                continue;
            }
            released.push(&entry.result);
            if let Err(e) = entry.result.close() {
                warn!("failed to release result of selector `{}`: {e}", entry.name);
                first_error.get_or_insert(e);
            }
        }
        debug!(
            "closed federated result set: released {} result(s) for {} selector(s)",
            released.len(),
            self.selectors.len()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The skip count of the originating query.
    pub fn start(&self) -> usize {
        self.options.skip_count
    }

    pub fn max_items(&self) -> usize {
        self.options.max_items
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Selector names in column order.
    pub fn selectors(&self) -> Vec<&str> {
        self.selectors.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn selector_shape(&self) -> Option<SelectorShape> {
        self.shape
    }

    /// The underlying result of `selector`.
    pub fn selector_result(&self, selector: &str) -> Option<&Arc<dyn ResultSet>> {
        self.positions
            .get(selector)
            .map(|&position| &self.selectors[position].result)
    }

    /// The agreed entity id of every row.
    pub fn entity_ids(&self) -> Result<Vec<EntityId>> {
        (0..self.row_count()?).map(|i| self.entity_id(i)).collect()
    }

    /// The primary parent association of every row.
    pub fn primary_parent_links(&self) -> Result<Vec<Option<ParentLink>>> {
        (0..self.row_count()?)
            .map(|i| self.primary_parent_link(i))
            .collect()
    }

    pub fn metadata(&self) -> ResultSetMetadata {
        ResultSetMetadata {
            selectors: self.selectors().into_iter().map(str::to_string).collect(),
            shape: self.shape,
            options: self.options.clone(),
        }
    }

    /// Every row as a serializable page.
    ///
    /// Rows whose selectors disagree carry only their per-selector values.
    pub fn page(&self) -> Result<ResultPage> {
        let mut rows = Vec::with_capacity(self.row_count()?);
        for row in self.iter()? {
            let row = row?;
            let index = row.index();
            let selectors = row
                .entity_ids()?
                .into_iter()
                .zip(row.scores()?)
                .map(|((selector, entity_id), (_, score))| SelectorValue {
                    selector: selector.to_string(),
                    entity_id,
                    score,
                })
                .collect();
            rows.push(PageRow {
                index,
                entity_id: unless_ambiguous(self.entity_id(index))?,
                score: unless_ambiguous(self.score(index))?,
                selectors,
            });
        }

        Ok(ResultPage {
            start: self.start(),
            num_items: rows.len(),
            has_more_items: self.has_more()?,
            rows,
        })
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(DocQueryError::ResultSetClosed);
        }
        Ok(())
    }

    pub(crate) fn read<T>(&self, read: impl FnOnce() -> Result<T>) -> Result<T> {
        self.ensure_open()?;
        read()
    }

    pub(crate) fn selector_entries(&self) -> impl Iterator<Item = (&str, &Arc<dyn ResultSet>)> {
        self.selectors
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.result))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.row_count()?;
        if index >= len {
            return Err(DocQueryError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn agreed<T>(
        &self,
        index: usize,
        what: &'static str,
        get: impl Fn(&dyn ResultSet) -> Result<T>,
        same: impl Fn(&T, &T) -> bool,
    ) -> Result<T> {
        self.check_index(index)?;
        let (first, rest) = self
            .selectors
            .split_first()
            .ok_or(DocQueryError::EmptyFederation)?;
        let value = get(first.result.as_ref())?;
        if self.shape == Some(SelectorShape::Join) {
            for entry in rest {
                if !same(&value, &get(entry.result.as_ref())?) {
                    return Err(DocQueryError::AmbiguousSelector { row: index, what });
                }
            }
        }
        Ok(value)
    }
}

fn unless_ambiguous<T>(value: Result<T>) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(DocQueryError::AmbiguousSelector { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
