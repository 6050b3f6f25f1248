//! Property data types as reported by the dictionary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The data type of a property. Drives index-field selection, literal
/// encoding and which operators the compiler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Plain text, analyzed.
    Text,
    /// Multilingual text, indexed once per locale.
    MlText,
    /// Document content, full-text only.
    Content,
    /// Opaque identifier, matched exactly.
    Id,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    /// Calendar date (time of day ignored).
    Date,
    DateTime,
}

impl DataType {
    /// Analyzed with the standard analyzer rather than matched verbatim.
    pub fn is_textual(self) -> bool {
        matches!(self, DataType::Text | DataType::MlText | DataType::Content)
    }

    pub fn is_multilingual(self) -> bool {
        self == DataType::MlText
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::Long | DataType::Float | DataType::Double
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, DataType::Date | DataType::DateTime)
    }

    /// Whether `<`, `<=`, `>`, `>=` are meaningful.
    pub fn supports_range(self) -> bool {
        self.is_numeric() || self.is_temporal() || matches!(self, DataType::Text | DataType::Id)
    }

    /// Whether `LIKE` patterns are meaningful.
    pub fn supports_like(self) -> bool {
        matches!(self, DataType::Text | DataType::MlText | DataType::Id)
    }

    /// Whether equality comparisons are meaningful.
    pub fn supports_equality(self) -> bool {
        self != DataType::Content
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Text => "text",
            DataType::MlText => "mltext",
            DataType::Content => "content",
            DataType::Id => "id",
            DataType::Boolean => "boolean",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_capabilities() {
        assert!(DataType::Int.supports_range());
        assert!(DataType::DateTime.supports_range());
        assert!(!DataType::Boolean.supports_range());
        assert!(!DataType::MlText.supports_range());
        assert!(!DataType::Content.supports_equality());
        assert!(DataType::Id.supports_like());
        assert!(!DataType::Long.supports_like());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DataType::MlText).unwrap();
        assert_eq!(json, "\"ml_text\"");
        let parsed: DataType = serde_json::from_str("\"date_time\"").unwrap();
        assert_eq!(parsed, DataType::DateTime);
    }
}
