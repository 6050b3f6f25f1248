//! Abstract predicate trees and sort specifications.
//!
//! These are the compiler's input. Producing them from a query string is
//! the job of an upstream parser.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A literal value in a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Id(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "'{}'", text.replace('\'', "\\'")),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::DateTime(value) => write!(
                f,
                "TIMESTAMP '{}'",
                value.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            Value::Id(id) => write!(f, "'{id}'"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// A node of a structured predicate.
///
/// Property names may be qualified (`{uri}name`), prefixed (`cm:name`) or
/// bare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        property: String,
        op: CompareOp,
        value: Value,
    },
    In {
        property: String,
        values: Vec<Value>,
        negated: bool,
    },
    /// SQL-style pattern: `%` any run, `_` one character, `\` escapes.
    Like {
        property: String,
        pattern: String,
        negated: bool,
    },
    Exists {
        property: String,
    },
    IsNull {
        property: String,
    },
    /// Full-text expression over `property`, or the default field.
    FullText {
        property: Option<String>,
        text: String,
    },
    /// Direct children of the given folder.
    InFolder(String),
    /// Instances of the type or any of its subtypes.
    IsType(String),
}

impl Predicate {
    pub fn and(children: Vec<Predicate>) -> Self {
        Predicate::And(children)
    }

    pub fn or(children: Vec<Predicate>) -> Self {
        Predicate::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }

    pub fn compare<P: Into<String>, V: Into<Value>>(property: P, op: CompareOp, value: V) -> Self {
        Predicate::Compare {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equals<P: Into<String>, V: Into<Value>>(property: P, value: V) -> Self {
        Self::compare(property, CompareOp::Eq, value)
    }

    pub fn like<P: Into<String>, S: Into<String>>(property: P, pattern: S) -> Self {
        Predicate::Like {
            property: property.into(),
            pattern: pattern.into(),
            negated: false,
        }
    }

    pub fn in_list<P: Into<String>>(property: P, values: Vec<Value>) -> Self {
        Predicate::In {
            property: property.into(),
            values,
            negated: false,
        }
    }

    pub fn exists<P: Into<String>>(property: P) -> Self {
        Predicate::Exists {
            property: property.into(),
        }
    }

    pub fn is_null<P: Into<String>>(property: P) -> Self {
        Predicate::IsNull {
            property: property.into(),
        }
    }

    pub fn full_text<S: Into<String>>(text: S) -> Self {
        Predicate::FullText {
            property: None,
            text: text.into(),
        }
    }

    pub fn full_text_in<P: Into<String>, S: Into<String>>(property: P, text: S) -> Self {
        Predicate::FullText {
            property: Some(property.into()),
            text: text.into(),
        }
    }

    pub fn is_type<S: Into<String>>(type_name: S) -> Self {
        Predicate::IsType(type_name.into())
    }

    pub fn in_folder<S: Into<String>>(folder_id: S) -> Self {
        Predicate::InFolder(folder_id.into())
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Predicate], joiner: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {joiner} ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(children) => write_joined(f, children, "AND"),
            Predicate::Or(children) => write_joined(f, children, "OR"),
            Predicate::Not(child) => write!(f, "NOT {child}"),
            Predicate::Compare { property, op, value } => write!(f, "{property} {op} {value}"),
            Predicate::In {
                property,
                values,
                negated,
            } => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{property} {not}IN ({})", list.join(", "))
            }
            Predicate::Like {
                property,
                pattern,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{property} {not}LIKE '{pattern}'")
            }
            Predicate::Exists { property } => write!(f, "{property} IS NOT NULL"),
            Predicate::IsNull { property } => write!(f, "{property} IS NULL"),
            Predicate::FullText {
                property: Some(property),
                text,
            } => write!(f, "CONTAINS({property}, '{text}')"),
            Predicate::FullText {
                property: None,
                text,
            } => write!(f, "CONTAINS('{text}')"),
            Predicate::InFolder(id) => write!(f, "IN_FOLDER('{id}')"),
            Predicate::IsType(type_name) => write!(f, "IS_TYPE('{type_name}')"),
        }
    }
}

/// What a sort term orders by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Relevance score.
    Score,
    /// A property value.
    Property(String),
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortTerm {
    pub key: SortKey,
    pub ascending: bool,
}

/// An ordered list of sort terms; empty means index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    terms: Vec<SortTerm>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_property<S: Into<String>>(mut self, property: S, ascending: bool) -> Self {
        self.terms.push(SortTerm {
            key: SortKey::Property(property.into()),
            ascending,
        });
        self
    }

    pub fn by_score(mut self, ascending: bool) -> Self {
        self.terms.push(SortTerm {
            key: SortKey::Score,
            ascending,
        });
        self
    }

    pub fn terms(&self) -> &[SortTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_display() {
        let predicate = Predicate::and(vec![
            Predicate::equals("cm:name", "budget"),
            Predicate::not(Predicate::compare("cm:size", CompareOp::Gt, 10i64)),
            Predicate::full_text("annual report"),
        ]);
        assert_eq!(
            predicate.to_string(),
            "(cm:name = 'budget' AND NOT cm:size > 10 AND CONTAINS('annual report'))"
        );
    }

    #[test]
    fn test_value_display() {
        let when = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Value::from(when).to_string(), "TIMESTAMP '2024-03-01T10:00:00.000Z'");
        assert_eq!(Value::from(true).to_string(), "TRUE");
        assert_eq!(Value::from("it's").to_string(), "'it\\'s'");
    }

    #[test]
    fn test_sort_spec_builder() {
        let sort = SortSpec::new().by_property("cm:name", true).by_score(false);
        assert_eq!(sort.terms().len(), 2);
        assert_eq!(sort.terms()[1].key, SortKey::Score);
        assert!(!sort.terms()[1].ascending);
    }
}
