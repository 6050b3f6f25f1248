//! Frozen type hierarchy.
//!
//! Types are registered with their parent through [`TypeRegistryBuilder`],
//! then frozen into a [`TypeRegistry`]: an arena of nodes where parent and
//! child edges are arena indices. The registry never changes after
//! [`TypeRegistryBuilder::build`], so it can be shared freely.

use ahash::AHashMap;

use crate::dictionary::qname::QName;
use crate::error::{DocQueryError, Result};

#[derive(Debug, Clone)]
struct TypeNode {
    name: QName,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Collects type declarations before freezing them.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistryBuilder {
    declarations: Vec<(QName, Option<QName>)>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with an optional parent type.
    pub fn add_type(mut self, name: QName, parent: Option<QName>) -> Self {
        self.declarations.push((name, parent));
        self
    }

    /// Freeze the declarations.
    ///
    /// Fails on duplicate names, parents that were never declared, and
    /// parent chains that loop back on themselves.
    pub fn build(self) -> Result<TypeRegistry> {
        let mut index = AHashMap::with_capacity(self.declarations.len());
        for (position, (name, _)) in self.declarations.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(DocQueryError::dictionary(format!(
                    "type {name} declared twice"
                )));
            }
        }

        let mut nodes: Vec<TypeNode> = self
            .declarations
            .iter()
            .map(|(name, _)| TypeNode {
                name: name.clone(),
                parent: None,
                children: Vec::new(),
            })
            .collect();

        for (position, (name, parent)) in self.declarations.iter().enumerate() {
            if let Some(parent) = parent {
                let parent_index = *index.get(parent).ok_or_else(|| {
                    DocQueryError::dictionary(format!(
                        "type {name} has undeclared parent {parent}"
                    ))
                })?;
                nodes[position].parent = Some(parent_index);
                nodes[parent_index].children.push(position);
            }
        }

        // A chain longer than the node count must revisit a node.
        for (position, node) in nodes.iter().enumerate() {
            let mut current = node.parent;
            let mut steps = 0;
            while let Some(next) = current {
                steps += 1;
                if next == position || steps > nodes.len() {
                    return Err(DocQueryError::dictionary(format!(
                        "type hierarchy cycle through {}",
                        node.name
                    )));
                }
                current = nodes[next].parent;
            }
        }

        Ok(TypeRegistry { nodes, index })
    }
}

/// An immutable type hierarchy.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    nodes: Vec<TypeNode>,
    index: AHashMap<QName, usize>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    pub fn contains(&self, name: &QName) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, name: &QName) -> Option<&QName> {
        let node = &self.nodes[*self.index.get(name)?];
        node.parent.map(|parent| &self.nodes[parent].name)
    }

    /// `name` followed by all of its descendants, depth first in
    /// declaration order. Empty when `name` is unknown.
    pub fn subtypes(&self, name: &QName) -> Vec<QName> {
        let Some(&root) = self.index.get(name) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            result.push(node.name.clone());
            stack.extend(node.children.iter().rev());
        }
        result
    }

    /// Ancestors of `name`, nearest first.
    pub fn ancestors(&self, name: &QName) -> Vec<QName> {
        let mut result = Vec::new();
        let mut current = self.index.get(name).and_then(|&i| self.nodes[i].parent);
        while let Some(position) = current {
            result.push(self.nodes[position].name.clone());
            current = self.nodes[position].parent;
        }
        result
    }
}
