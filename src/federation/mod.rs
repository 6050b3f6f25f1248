//! Result federation.
//!
//! A [`FederatedResultSet`] joins the per-selector results of one query
//! by row index. Selector-agnostic reads ([`FederatedResultSet::entity_id`],
//! [`FederatedResultSet::score`]) succeed only when every selector agrees
//! on the row; [`FederatedRow`] always exposes the per-selector values.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use docquery::federation::{FederatedResultSet, QueryOptions};
//! use docquery::repository::MemoryEntityLookup;
//! use docquery::search::{HitResultSet, ResultSet};
//!
//! let a: Arc<dyn ResultSet> = Arc::new(HitResultSet::from_hits([("7", 0.9)]));
//! let b: Arc<dyn ResultSet> = Arc::new(HitResultSet::from_hits([("7", 0.9)]));
//! let set = FederatedResultSet::new(
//!     vec![("A", a), ("B", b)],
//!     QueryOptions::default(),
//!     Arc::new(MemoryEntityLookup::new()),
//! )
//! .unwrap();
//!
//! assert_eq!(set.row_count().unwrap(), 1);
//! assert_eq!(set.entity_id(0).unwrap().as_str(), "7");
//! set.close().unwrap();
//! ```

pub mod page;
pub mod result_set;
pub mod row;

pub use page::{PageRow, QueryOptions, ResultPage, ResultSetMetadata, SelectorValue};
pub use result_set::{FederatedResultSet, SelectorShape};
pub use row::{FederatedRow, Rows};
