//! Error types for docquery.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`DocQueryError`] enum. Compilation, execution and federation failures
//! each have their own variant so callers can tell caller mistakes apart
//! from collaborator failures.
//!
//! # Examples
//!
//! ```
//! use docquery::error::{DocQueryError, Result};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(DocQueryError::unknown_field(name))
//! }
//!
//! match lookup("cm:nosuchprop") {
//!     Err(DocQueryError::UnknownField { property }) => assert_eq!(property, "cm:nosuchprop"),
//!     _ => unreachable!(),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for docquery operations.
#[derive(Error, Debug)]
pub enum DocQueryError {
    /// A logical property name has no index field mapping.
    #[error("Unknown field: {property}")]
    UnknownField {
        /// The property name as given by the caller.
        property: String,
    },

    /// A predicate node could not be translated into an index query.
    #[error("Predicate translation error at `{node}`: {reason}")]
    PredicateTranslation {
        /// Rendering of the offending predicate node.
        node: String,
        /// Why the node was rejected.
        reason: String,
    },

    /// A per-selector search failed inside the executor.
    #[error("Search execution error for selector `{selector}`: {message}")]
    SearchExecution {
        /// The selector whose search failed.
        selector: String,
        /// Executor-provided description.
        message: String,
    },

    /// A federated result set has no selectors.
    #[error("Federated result set has no selectors")]
    EmptyFederation,

    /// A row index outside `[0, len)`.
    #[error("Row index {index} out of range (row count {len})")]
    IndexOutOfRange {
        /// Requested row.
        index: usize,
        /// Number of rows available.
        len: usize,
    },

    /// Selectors disagree on the value requested without naming a selector.
    #[error("Ambiguous selector: {what} differs across selectors at row {row}")]
    AmbiguousSelector {
        /// The row index.
        row: usize,
        /// Which value was requested (`entity id` or `score`).
        what: &'static str,
    },

    /// Per-selector results were not aligned.
    #[error("Row count mismatch: selector `{selector}` has {actual} rows, expected {expected}")]
    RowCountMismatch {
        /// The offending selector.
        selector: String,
        /// Row count of the first selector.
        expected: usize,
        /// Row count of the offending selector.
        actual: usize,
    },

    /// The same selector name was used twice in one query.
    #[error("Duplicate selector: {0}")]
    DuplicateSelector(String),

    /// The result set was closed before this read.
    #[error("Result set has been closed")]
    ResultSetClosed,

    /// The entity referenced by a row no longer exists.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Dictionary or type registry errors.
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// Analysis errors (tokenization, filtering).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors (configuration files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error, used by collaborators that report through anyhow.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with DocQueryError.
pub type Result<T> = std::result::Result<T, DocQueryError>;

impl DocQueryError {
    /// Create an unknown field error.
    pub fn unknown_field<S: Into<String>>(property: S) -> Self {
        DocQueryError::UnknownField {
            property: property.into(),
        }
    }

    /// Create a predicate translation error.
    pub fn translation<N: Into<String>, R: Into<String>>(node: N, reason: R) -> Self {
        DocQueryError::PredicateTranslation {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Create a search execution error.
    pub fn search_execution<S: Into<String>, M: Into<String>>(selector: S, message: M) -> Self {
        DocQueryError::SearchExecution {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a dictionary error.
    pub fn dictionary<S: Into<String>>(msg: S) -> Self {
        DocQueryError::Dictionary(msg.into())
    }

    /// Create an analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DocQueryError::Analysis(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DocQueryError::InvalidArgument(msg.into())
    }

    /// Create an invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        DocQueryError::Config(msg.into())
    }

    /// Create an entity not found error.
    pub fn entity_not_found<S: Into<String>>(id: S) -> Self {
        DocQueryError::EntityNotFound(id.into())
    }

    /// Whether this error was raised by the caller's input or a broken
    /// upstream invariant rather than a collaborator.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DocQueryError::EmptyFederation
                | DocQueryError::IndexOutOfRange { .. }
                | DocQueryError::AmbiguousSelector { .. }
                | DocQueryError::RowCountMismatch { .. }
                | DocQueryError::DuplicateSelector(_)
                | DocQueryError::ResultSetClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DocQueryError::unknown_field("cm:nosuchprop");
        assert_eq!(error.to_string(), "Unknown field: cm:nosuchprop");

        let error = DocQueryError::translation("cm:flag < true", "range not supported");
        assert_eq!(
            error.to_string(),
            "Predicate translation error at `cm:flag < true`: range not supported"
        );

        let error = DocQueryError::AmbiguousSelector {
            row: 3,
            what: "score",
        };
        assert_eq!(
            error.to_string(),
            "Ambiguous selector: score differs across selectors at row 3"
        );
    }

    #[test]
    fn test_contract_violations() {
        assert!(DocQueryError::EmptyFederation.is_contract_violation());
        assert!(DocQueryError::IndexOutOfRange { index: 2, len: 1 }.is_contract_violation());
        assert!(!DocQueryError::search_execution("A", "index offline").is_contract_violation());
        assert!(!DocQueryError::unknown_field("x").is_contract_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = DocQueryError::from(io_error);

        match error {
            DocQueryError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
