//! Predicate compilation.
//!
//! The [`QueryBuilderContext`] turns a [`Predicate`] and [`SortSpec`] into
//! a [`CompiledQuery`] in the index's own algebra, resolving property names
//! through the [`FieldResolver`].

pub mod context;
pub mod encode;
pub mod field_resolver;
pub mod index_query;
pub mod params;
pub mod predicate;
pub mod snapshot;
pub mod tenant;

mod translate;

pub use context::QueryBuilderContext;
pub use field_resolver::{FieldResolver, ResolvedField};
pub use index_query::{
    BooleanClause, BooleanQuery, BooleanQueryBuilder, Bound, CompiledQuery, IndexQuery, Occur,
    SortField, SortOrder,
};
pub use params::{ClientMode, Locale, MlAnalysisMode, Operator, SearchParameters};
pub use predicate::{CompareOp, Predicate, SortKey, SortSpec, SortTerm, Value};
pub use snapshot::{IndexSnapshot, StaticSnapshot};
pub use tenant::TenantContext;
