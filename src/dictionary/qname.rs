//! Qualified names and namespace-prefix resolution.
//!
//! Property and type names reach the compiler in three spellings:
//!
//! - qualified: `{http://example.org/model/content/1.0}title`
//! - prefixed: `cm:title`
//! - bare: `title`, which takes the namespace registered for the empty prefix
//!
//! [`QName::resolve`] normalizes all three through a
//! [`NamespacePrefixResolver`]; [`QName::to_prefix_string`] goes the other way.

use std::fmt;

use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocQueryError, Result};

lazy_static! {
    static ref QUALIFIED: Regex = Regex::new(r"^\{([^}]*)\}(.+)$").unwrap();
    static ref PREFIXED: Regex = Regex::new(r"^([A-Za-z_][A-Za-z0-9_.\-]*):(.+)$").unwrap();
}

/// Resolves namespace prefixes to URIs and back.
pub trait NamespacePrefixResolver: Send + Sync + fmt::Debug {
    /// The namespace URI registered for `prefix`, if any.
    fn namespace_uri(&self, prefix: &str) -> Option<String>;

    /// Every prefix registered for `namespace_uri`, in registration order.
    fn prefixes(&self, namespace_uri: &str) -> Vec<String>;
}

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    namespace: String,
    local_name: String,
}

impl QName {
    pub fn new<N: Into<String>, L: Into<String>>(namespace: N, local_name: L) -> Self {
        QName {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Parse the `{uri}local` form.
    pub fn parse_qualified(name: &str) -> Result<Self> {
        let captures = QUALIFIED
            .captures(name)
            .ok_or_else(|| DocQueryError::dictionary(format!("not a qualified name: `{name}`")))?;
        Ok(QName::new(&captures[1], &captures[2]))
    }

    /// Normalize a qualified, prefixed or bare name.
    ///
    /// Fails with [`DocQueryError::Dictionary`] when the prefix is not
    /// registered with `resolver`.
    pub fn resolve(name: &str, resolver: &dyn NamespacePrefixResolver) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DocQueryError::dictionary("empty name"));
        }
        if name.starts_with('{') {
            return Self::parse_qualified(name);
        }
        if let Some(captures) = PREFIXED.captures(name) {
            let prefix = &captures[1];
            let uri = resolver.namespace_uri(prefix).ok_or_else(|| {
                DocQueryError::dictionary(format!("unknown namespace prefix `{prefix}`"))
            })?;
            return Ok(QName::new(uri, &captures[2]));
        }
        let uri = resolver.namespace_uri("").unwrap_or_default();
        Ok(QName::new(uri, name))
    }

    /// Render as `prefix:local` using the first registered prefix, or the
    /// qualified form when the namespace has no prefix.
    pub fn to_prefix_string(&self, resolver: &dyn NamespacePrefixResolver) -> String {
        match resolver.prefixes(&self.namespace).first() {
            Some(prefix) if prefix.is_empty() => self.local_name.clone(),
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

/// An in-memory prefix table.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    uris: AHashMap<String, String>,
    prefixes: AHashMap<String, Vec<String>>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prefix` for `uri`. Re-registering a prefix moves it.
    pub fn register<P: Into<String>, U: Into<String>>(&mut self, prefix: P, uri: U) {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some(previous) = self.uris.insert(prefix.clone(), uri.clone()) {
            if let Some(list) = self.prefixes.get_mut(&previous) {
                list.retain(|p| p != &prefix);
            }
        }
        self.prefixes.entry(uri).or_default().push(prefix);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_prefix<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
        self.register(prefix, uri);
        self
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

impl NamespacePrefixResolver for NamespaceMap {
    fn namespace_uri(&self, prefix: &str) -> Option<String> {
        self.uris.get(prefix).cloned()
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<String> {
        self.prefixes
            .get(namespace_uri)
            .cloned()
            .unwrap_or_default()
    }
}
