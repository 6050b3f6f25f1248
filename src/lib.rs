//! # docquery
//!
//! Structured multi-selector queries over full-text indexes.
//!
//! ## Features
//!
//! - Predicate compilation into index-native boolean queries
//! - Field resolution with multilingual language-analysis modes
//! - Tenant and client scoping of compiled queries
//! - Parallel per-selector execution
//! - Row-joined result federation with ambiguity checks

pub mod analysis;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod federation;
pub mod query;
pub mod repository;
pub mod search;

pub mod prelude {
    pub use crate::config::QueryEngineConfig;
    pub use crate::dictionary::{DataType, Dictionary, MemoryDictionary, NamespaceMap, QName};
    pub use crate::error::{DocQueryError, Result};
    pub use crate::federation::{FederatedResultSet, FederatedRow, QueryOptions, ResultPage};
    pub use crate::query::{
        CompareOp, CompiledQuery, MlAnalysisMode, Predicate, QueryBuilderContext,
        SearchParameters, SortSpec, TenantContext,
    };
    pub use crate::repository::{EntityId, EntityLookup, ParentLink};
    pub use crate::search::{FederatedQuery, QueryEngine, ResultSet, SearchExecutor, SelectorQuery};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
