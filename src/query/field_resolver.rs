//! Mapping from logical property names to index fields and analyzers.
//!
//! Property `{uri}local` is indexed under `@{uri}local`. Multilingual
//! properties are additionally indexed once per locale under
//! `@{uri}local.<locale>`; the [`MlAnalysisMode`] decides which of those
//! variants a query touches.

use std::sync::Arc;

use crate::analysis::{Analyzer, KeywordAnalyzer, StandardAnalyzer};
use crate::dictionary::{DataType, Dictionary, NamespacePrefixResolver, QName};
use crate::error::{DocQueryError, Result};
use crate::query::params::{Locale, MlAnalysisMode};
use crate::query::snapshot::IndexSnapshot;

/// Full-text content of the whole entity.
pub const FIELD_TEXT: &str = "TEXT";
/// Entity identifier.
pub const FIELD_ID: &str = "ID";
/// Qualified type name of the entity.
pub const FIELD_TYPE: &str = "TYPE";
/// Identifier of the entity's primary parent.
pub const FIELD_PARENT: &str = "PARENT";
/// Tenant domain the entity belongs to.
pub const FIELD_TENANT: &str = "TENANT";
/// Clients the entity is hidden from.
pub const FIELD_HIDDEN: &str = "HIDDEN";

/// Index field name for a property.
pub fn property_field(name: &QName) -> String {
    format!("@{name}")
}

/// The outcome of resolving a logical field name.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    /// The property, or `None` for reserved fields.
    pub property: Option<QName>,
    /// Index fields to query, at least one.
    pub fields: Vec<String>,
    /// Analyzer for literal values on these fields.
    pub analyzer: Arc<dyn Analyzer>,
    pub data_type: DataType,
}

/// Resolves logical names against a dictionary.
///
/// Read-only after construction and safe to share across threads.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    dictionary: Arc<dyn Dictionary>,
    namespaces: Arc<dyn NamespacePrefixResolver>,
    snapshot: Arc<dyn IndexSnapshot>,
    default_mode: MlAnalysisMode,
    locale: Locale,
    text_analyzer: Arc<dyn Analyzer>,
    keyword_analyzer: Arc<dyn Analyzer>,
}

impl FieldResolver {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        namespaces: Arc<dyn NamespacePrefixResolver>,
        snapshot: Arc<dyn IndexSnapshot>,
        default_mode: MlAnalysisMode,
        locale: Locale,
    ) -> Self {
        FieldResolver {
            dictionary,
            namespaces,
            snapshot,
            default_mode,
            locale,
            text_analyzer: Arc::new(StandardAnalyzer::new()),
            keyword_analyzer: Arc::new(KeywordAnalyzer::new()),
        }
    }

    pub fn default_mode(&self) -> MlAnalysisMode {
        self.default_mode
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Analyzer used for a data type.
    pub fn analyzer_for(&self, data_type: DataType) -> Arc<dyn Analyzer> {
        if data_type.is_textual() {
            Arc::clone(&self.text_analyzer)
        } else {
            Arc::clone(&self.keyword_analyzer)
        }
    }

    /// Resolve `logical_name` under `mode`, or the default mode when `None`.
    ///
    /// Fails with [`DocQueryError::UnknownField`] when the dictionary does
    /// not define the property, and with [`DocQueryError::Dictionary`] when
    /// the name uses an unregistered namespace prefix.
    pub fn resolve(&self, logical_name: &str, mode: Option<MlAnalysisMode>) -> Result<ResolvedField> {
        if let Some(data_type) = reserved_field_type(logical_name) {
            return Ok(ResolvedField {
                property: None,
                fields: vec![logical_name.to_string()],
                analyzer: self.analyzer_for(data_type),
                data_type,
            });
        }

        let name = QName::resolve(logical_name, self.namespaces.as_ref())?;
        let data_type = self
            .dictionary
            .property_type(&name)
            .ok_or_else(|| DocQueryError::unknown_field(logical_name))?;

        let base = property_field(&name);
        let fields = if data_type.is_multilingual() {
            self.locale_fields(&base, mode.unwrap_or(self.default_mode))
        } else {
            vec![base]
        };

        Ok(ResolvedField {
            property: Some(name),
            fields,
            analyzer: self.analyzer_for(data_type),
            data_type,
        })
    }

    fn locale_fields(&self, base: &str, mode: MlAnalysisMode) -> Vec<String> {
        let exact = format!("{base}.{}", self.locale);
        let language = format!("{base}.{}", self.locale.language_only());

        let mut fields = match mode {
            MlAnalysisMode::ExactLocale => vec![exact],
            MlAnalysisMode::LocaleOnly => vec![exact, language],
            MlAnalysisMode::LocaleAndAll => vec![exact, language, base.to_string()],
            MlAnalysisMode::AllLanguages => {
                let prefix = format!("{base}.");
                let mut known: Vec<String> = self
                    .snapshot
                    .field_names()
                    .into_iter()
                    .filter(|field| field.starts_with(&prefix))
                    .collect();
                known.sort();
                known.push(base.to_string());
                known
            }
            MlAnalysisMode::AllOnly => vec![base.to_string()],
        };
        fields.dedup();
        fields
    }
}

fn reserved_field_type(name: &str) -> Option<DataType> {
    match name {
        FIELD_TEXT => Some(DataType::Content),
        FIELD_ID | FIELD_TYPE | FIELD_PARENT | FIELD_TENANT | FIELD_HIDDEN => Some(DataType::Id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{MemoryDictionary, NamespaceMap, TypeRegistry};
    use crate::query::snapshot::StaticSnapshot;

    const CM: &str = "urn:content";

    fn resolver(mode: MlAnalysisMode, locale: &str) -> FieldResolver {
        let dictionary = MemoryDictionary::new(TypeRegistry::default())
            .with_property(QName::new(CM, "name"), DataType::Text)
            .with_property(QName::new(CM, "title"), DataType::MlText)
            .with_property(QName::new(CM, "size"), DataType::Long);
        let namespaces = NamespaceMap::new().with_prefix("cm", CM);
        let snapshot = StaticSnapshot::new(3)
            .with_field(format!("@{{{CM}}}title.fr"))
            .with_field(format!("@{{{CM}}}title.de"))
            .with_field(format!("@{{{CM}}}name"));
        FieldResolver::new(
            Arc::new(dictionary),
            Arc::new(namespaces),
            Arc::new(snapshot),
            mode,
            locale.parse().unwrap(),
        )
    }

    #[test]
    fn test_resolve_plain_property() {
        let resolved = resolver(MlAnalysisMode::LocaleAndAll, "en")
            .resolve("cm:name", None)
            .unwrap();
        assert_eq!(resolved.fields, vec![format!("@{{{CM}}}name")]);
        assert_eq!(resolved.data_type, DataType::Text);
        assert_eq!(resolved.analyzer.name(), "standard");
        assert_eq!(resolved.property, Some(QName::new(CM, "name")));
    }

    #[test]
    fn test_resolve_keyword_property() {
        let resolved = resolver(MlAnalysisMode::LocaleAndAll, "en")
            .resolve("cm:size", Some(MlAnalysisMode::AllOnly))
            .unwrap();
        assert_eq!(resolved.fields.len(), 1);
        assert_eq!(resolved.analyzer.name(), "keyword");
    }

    #[test]
    fn test_multilingual_modes() {
        let base = format!("@{{{CM}}}title");
        let r = resolver(MlAnalysisMode::LocaleAndAll, "en_GB");

        let fields = |mode| r.resolve("cm:title", Some(mode)).unwrap().fields;

        assert_eq!(fields(MlAnalysisMode::ExactLocale), vec![format!("{base}.en_GB")]);
        assert_eq!(
            fields(MlAnalysisMode::LocaleOnly),
            vec![format!("{base}.en_GB"), format!("{base}.en")]
        );
        assert_eq!(
            fields(MlAnalysisMode::LocaleAndAll),
            vec![format!("{base}.en_GB"), format!("{base}.en"), base.clone()]
        );
        assert_eq!(
            fields(MlAnalysisMode::AllLanguages),
            vec![format!("{base}.de"), format!("{base}.fr"), base.clone()]
        );
        assert_eq!(fields(MlAnalysisMode::AllOnly), vec![base.clone()]);
    }

    #[test]
    fn test_default_mode_applies_when_none_given() {
        let base = format!("@{{{CM}}}title");
        let resolved = resolver(MlAnalysisMode::LocaleOnly, "fr")
            .resolve("cm:title", None)
            .unwrap();
        assert_eq!(resolved.fields, vec![format!("{base}.fr")]);
    }

    #[test]
    fn test_unknown_field() {
        let err = resolver(MlAnalysisMode::LocaleAndAll, "en")
            .resolve("cm:nosuchprop", None)
            .unwrap_err();
        match err {
            DocQueryError::UnknownField { property } => assert_eq!(property, "cm:nosuchprop"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reserved_fields() {
        let r = resolver(MlAnalysisMode::LocaleAndAll, "en");
        let text = r.resolve(FIELD_TEXT, None).unwrap();
        assert_eq!(text.fields, vec!["TEXT".to_string()]);
        assert_eq!(text.data_type, DataType::Content);
        assert!(text.property.is_none());

        let id = r.resolve(FIELD_ID, None).unwrap();
        assert_eq!(id.analyzer.name(), "keyword");
    }
}
