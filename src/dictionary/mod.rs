//! Dictionary and namespace collaborators.
//!
//! The compiler only needs to ask a dictionary what type a property has
//! and which types sit below a given type. [`MemoryDictionary`] answers
//! both from a frozen [`TypeRegistry`] and a property table.

pub mod data_type;
pub mod qname;
pub mod registry;

use std::fmt::Debug;

use ahash::AHashMap;

pub use data_type::DataType;
pub use qname::{NamespaceMap, NamespacePrefixResolver, QName};
pub use registry::{TypeRegistry, TypeRegistryBuilder};

/// Property and type lookups used during predicate translation.
pub trait Dictionary: Send + Sync + Debug {
    /// The data type of `property`, or `None` when it is not defined.
    fn property_type(&self, property: &QName) -> Option<DataType>;

    /// Whether `type_name` is a defined type.
    fn type_exists(&self, type_name: &QName) -> bool;

    /// `type_name` and every type derived from it. Empty when unknown.
    fn subtypes(&self, type_name: &QName) -> Vec<QName>;
}

/// A dictionary held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    types: TypeRegistry,
    properties: AHashMap<QName, DataType>,
}

impl MemoryDictionary {
    pub fn new(types: TypeRegistry) -> Self {
        MemoryDictionary {
            types,
            properties: AHashMap::new(),
        }
    }

    /// Define a property.
    pub fn with_property(mut self, name: QName, data_type: DataType) -> Self {
        self.properties.insert(name, data_type);
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }
}

impl Dictionary for MemoryDictionary {
    fn property_type(&self, property: &QName) -> Option<DataType> {
        self.properties.get(property).copied()
    }

    fn type_exists(&self, type_name: &QName) -> bool {
        self.types.contains(type_name)
    }

    fn subtypes(&self, type_name: &QName) -> Vec<QName> {
        self.types.subtypes(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_dictionary() {
        let object = QName::new("urn:m", "object");
        let document = QName::new("urn:m", "document");
        let types = TypeRegistry::builder()
            .add_type(object.clone(), None)
            .add_type(document.clone(), Some(object.clone()))
            .build()
            .unwrap();
        let dictionary =
            MemoryDictionary::new(types).with_property(QName::new("urn:m", "title"), DataType::Text);

        assert_eq!(
            dictionary.property_type(&QName::new("urn:m", "title")),
            Some(DataType::Text)
        );
        assert_eq!(dictionary.property_type(&QName::new("urn:m", "nope")), None);
        assert!(dictionary.type_exists(&document));
        assert_eq!(dictionary.subtypes(&object), vec![object, document]);
    }
}
