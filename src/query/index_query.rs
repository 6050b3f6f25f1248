//! Index-native query trees and sort fields.
//!
//! A [`CompiledQuery`] is what the compiler hands to a search executor.
//! Its [`Display`](std::fmt::Display) form uses the familiar Lucene-style
//! syntax (`+field:term -field:other`) for logging.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// Bound type for range queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound<T> {
    /// Inclusive bound.
    Included(T),
    /// Exclusive bound.
    Excluded(T),
    /// Unbounded (no limit).
    Unbounded,
}

/// A clause in a boolean query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BooleanClause {
    pub query: IndexQuery,
    pub occur: Occur,
}

/// Boolean combination of index queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    /// Minimum number of should clauses that must match.
    minimum_should_match: usize,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, query: IndexQuery, occur: Occur) {
        self.clauses.push(BooleanClause { query, occur });
    }

    pub fn add_must(&mut self, query: IndexQuery) {
        self.add_clause(query, Occur::Must);
    }

    pub fn add_should(&mut self, query: IndexQuery) {
        self.add_clause(query, Occur::Should);
    }

    pub fn add_must_not(&mut self, query: IndexQuery) {
        self.add_clause(query, Occur::MustNot);
    }

    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Get clauses by occurrence type.
    pub fn clauses_by_occur(&self, occur: Occur) -> Vec<&BooleanClause> {
        self.clauses.iter().filter(|c| c.occur == occur).collect()
    }
}

/// Builder for boolean queries.
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    query: BooleanQuery,
}

impl BooleanQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: IndexQuery) -> Self {
        self.query.add_must(query);
        self
    }

    pub fn should(mut self, query: IndexQuery) -> Self {
        self.query.add_should(query);
        self
    }

    pub fn must_not(mut self, query: IndexQuery) -> Self {
        self.query.add_must_not(query);
        self
    }

    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.query.minimum_should_match = minimum;
        self
    }

    pub fn build(self) -> BooleanQuery {
        self.query
    }
}

/// A query in the text index's own algebra.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexQuery {
    /// Matches every document.
    MatchAll,
    /// Exact term on a field.
    Term { field: String, text: String },
    /// Consecutive terms on a field.
    Phrase { field: String, terms: Vec<String> },
    /// `*` and `?` wildcards; `\` escapes a literal wildcard character.
    Wildcard { field: String, pattern: String },
    /// Lexicographic range over encoded terms.
    Range {
        field: String,
        lower: Bound<String>,
        upper: Bound<String>,
    },
    /// Documents with any value in the field.
    Exists { field: String },
    Boolean(BooleanQuery),
}

impl IndexQuery {
    pub fn term<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        IndexQuery::Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// A should-only disjunction. A single alternative is returned as is.
    pub fn any_of(mut alternatives: Vec<IndexQuery>) -> Self {
        if alternatives.len() == 1 {
            return alternatives.remove(0);
        }
        let mut query = BooleanQuery::new().with_minimum_should_match(1);
        for alternative in alternatives {
            query.add_should(alternative);
        }
        IndexQuery::Boolean(query)
    }

    /// `MatchAll` minus `excluded`.
    pub fn negate(excluded: IndexQuery) -> Self {
        IndexQuery::Boolean(
            BooleanQueryBuilder::new()
                .must(IndexQuery::MatchAll)
                .must_not(excluded)
                .build(),
        )
    }

    /// Every field referenced anywhere in this tree, in first-use order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            IndexQuery::MatchAll => {}
            IndexQuery::Term { field, .. }
            | IndexQuery::Phrase { field, .. }
            | IndexQuery::Wildcard { field, .. }
            | IndexQuery::Range { field, .. }
            | IndexQuery::Exists { field } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            IndexQuery::Boolean(query) => {
                for clause in query.clauses() {
                    clause.query.collect_fields(out);
                }
            }
        }
    }
}

fn escape_term(text: &str) -> String {
    if text.chars().any(|c| c.is_whitespace() || "\"():".contains(c)) {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text.to_string()
    }
}

impl fmt::Display for IndexQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexQuery::MatchAll => f.write_str("*:*"),
            IndexQuery::Term { field, text } => write!(f, "{field}:{}", escape_term(text)),
            IndexQuery::Phrase { field, terms } => write!(f, "{field}:\"{}\"", terms.join(" ")),
            IndexQuery::Wildcard { field, pattern } => write!(f, "{field}:{pattern}"),
            IndexQuery::Range {
                field,
                lower,
                upper,
            } => {
                let (open, low) = match lower {
                    Bound::Included(v) => ('[', v.as_str()),
                    Bound::Excluded(v) => ('{', v.as_str()),
                    Bound::Unbounded => ('[', "*"),
                };
                let (close, high) = match upper {
                    Bound::Included(v) => (']', v.as_str()),
                    Bound::Excluded(v) => ('}', v.as_str()),
                    Bound::Unbounded => (']', "*"),
                };
                write!(f, "{field}:{open}{low} TO {high}{close}")
            }
            IndexQuery::Exists { field } => write!(f, "EXISTS:{field}"),
            IndexQuery::Boolean(query) => {
                f.write_str("(")?;
                for (i, clause) in query.clauses().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match clause.occur {
                        Occur::Must => write!(f, "+{}", clause.query)?,
                        Occur::Should => write!(f, "{}", clause.query)?,
                        Occur::MustNot => write!(f, "-{}", clause.query)?,
                    }
                }
                f.write_str(")")
            }
        }
    }
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A compiled sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    /// Sort by relevance score.
    Score { order: SortOrder },
    /// Sort by an index field.
    Field { name: String, order: SortOrder },
}

/// An index query plus sort, bound to the snapshot it was compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompiledQuery {
    query: IndexQuery,
    sort: Vec<SortField>,
    snapshot_generation: u64,
}

impl CompiledQuery {
    pub fn new(query: IndexQuery, sort: Vec<SortField>, snapshot_generation: u64) -> Self {
        CompiledQuery {
            query,
            sort,
            snapshot_generation,
        }
    }

    pub fn query(&self) -> &IndexQuery {
        &self.query
    }

    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    pub fn snapshot_generation(&self) -> u64 {
        self.snapshot_generation
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)?;
        if !self.sort.is_empty() {
            let keys: Vec<String> = self
                .sort
                .iter()
                .map(|field| match field {
                    SortField::Score { order } => format!("SCORE {order:?}"),
                    SortField::Field { name, order } => format!("{name} {order:?}"),
                })
                .collect();
            write!(f, " ORDER BY {}", keys.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_builder_and_display() {
        let query = IndexQuery::Boolean(
            BooleanQueryBuilder::new()
                .must(IndexQuery::term("title", "budget"))
                .must_not(IndexQuery::term("status", "draft"))
                .should(IndexQuery::Range {
                    field: "size".to_string(),
                    lower: Bound::Excluded("10".to_string()),
                    upper: Bound::Unbounded,
                })
                .build(),
        );
        assert_eq!(
            query.to_string(),
            "(+title:budget -status:draft size:{10 TO *])"
        );
    }

    #[test]
    fn test_clauses_by_occur() {
        let mut query = BooleanQuery::new();
        query.add_must(IndexQuery::MatchAll);
        query.add_should(IndexQuery::term("a", "1"));
        query.add_should(IndexQuery::term("a", "2"));
        assert_eq!(query.clauses_by_occur(Occur::Should).len(), 2);
        assert_eq!(query.clauses_by_occur(Occur::MustNot).len(), 0);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_any_of_single_alternative_is_unwrapped() {
        let single = IndexQuery::any_of(vec![IndexQuery::term("a", "1")]);
        assert_eq!(single, IndexQuery::term("a", "1"));

        let many = IndexQuery::any_of(vec![IndexQuery::term("a", "1"), IndexQuery::term("b", "1")]);
        match many {
            IndexQuery::Boolean(query) => assert_eq!(query.minimum_should_match(), 1),
            other => panic!("expected boolean, got {other}"),
        }
    }

    #[test]
    fn test_fields_are_collected_once() {
        let query = IndexQuery::Boolean(
            BooleanQueryBuilder::new()
                .must(IndexQuery::term("a", "1"))
                .must(IndexQuery::negate(IndexQuery::Exists {
                    field: "b".to_string(),
                }))
                .should(IndexQuery::term("a", "2"))
                .build(),
        );
        assert_eq!(query.fields(), vec!["a", "b"]);
    }

    #[test]
    fn test_term_escaping() {
        assert_eq!(
            IndexQuery::term("TYPE", "{urn:m}doc").to_string(),
            "TYPE:\"{urn:m}doc\""
        );
        assert_eq!(IndexQuery::term("f", "two words").to_string(), "f:\"two words\"");
    }
}
