//! Entity identifiers and the read-only entity lookup collaborator.

use std::fmt::{self, Debug};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::dictionary::QName;
use crate::error::Result;

/// Opaque, stable identifier of a repository entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

/// The association from a parent entity to a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent: EntityId,
    pub child: EntityId,
    /// Association type.
    pub assoc_type: QName,
    /// Association name of the child within the parent.
    pub name: QName,
    /// Whether this is the child's primary parent association.
    pub primary: bool,
}

/// Read-only view of the entity store.
///
/// Federation calls it only to resolve primary parents of result rows.
pub trait EntityLookup: Send + Sync + Debug {
    fn exists(&self, id: &EntityId) -> Result<bool>;

    /// The primary parent association of `id`; `None` for roots.
    fn primary_parent(&self, id: &EntityId) -> Result<Option<ParentLink>>;
}

/// An [`EntityLookup`] over a fixed set of entities.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityLookup {
    entities: AHashSet<EntityId>,
    parents: AHashMap<EntityId, ParentLink>,
}

impl MemoryEntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root entity.
    pub fn with_root(mut self, id: EntityId) -> Self {
        self.entities.insert(id);
        self
    }

    /// Register `link.child` with `link` as its primary parent.
    pub fn with_child(mut self, link: ParentLink) -> Self {
        self.entities.insert(link.parent.clone());
        self.entities.insert(link.child.clone());
        self.parents.insert(link.child.clone(), link);
        self
    }
}

impl EntityLookup for MemoryEntityLookup {
    fn exists(&self, id: &EntityId) -> Result<bool> {
        Ok(self.entities.contains(id))
    }

    fn primary_parent(&self, id: &EntityId) -> Result<Option<ParentLink>> {
        Ok(self.parents.get(id).cloned())
    }
}
