//! Request-scoped search parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DocQueryError, Result};

/// How multilingual text is matched against its per-locale index fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MlAnalysisMode {
    /// Only the exact search locale (language and country).
    ExactLocale,
    /// The search locale and its bare language.
    LocaleOnly,
    /// [`LocaleOnly`](Self::LocaleOnly) plus the locale-neutral field.
    #[default]
    LocaleAndAll,
    /// Every locale present in the index, plus the locale-neutral field.
    AllLanguages,
    /// Only the locale-neutral field.
    AllOnly,
}

/// Boolean operator joining full-text terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Or,
    And,
}

/// The client a request arrives through. Entities can be hidden from
/// individual clients; the compiler excludes those when a mode is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMode {
    Cifs,
    Imap,
    Webdav,
    Nfs,
    Script,
    WebClient,
    Ftp,
    Cmis,
}

impl ClientMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientMode::Cifs => "cifs",
            ClientMode::Imap => "imap",
            ClientMode::Webdav => "webdav",
            ClientMode::Nfs => "nfs",
            ClientMode::Script => "script",
            ClientMode::WebClient => "webclient",
            ClientMode::Ftp => "ftp",
            ClientMode::Cmis => "cmis",
        }
    }
}

impl FromStr for ClientMode {
    type Err = DocQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cifs" => Ok(ClientMode::Cifs),
            "imap" => Ok(ClientMode::Imap),
            "webdav" => Ok(ClientMode::Webdav),
            "nfs" => Ok(ClientMode::Nfs),
            "script" => Ok(ClientMode::Script),
            "webclient" => Ok(ClientMode::WebClient),
            "ftp" => Ok(ClientMode::Ftp),
            "cmis" => Ok(ClientMode::Cmis),
            other => Err(DocQueryError::invalid_argument(format!(
                "unknown client `{other}`"
            ))),
        }
    }
}

/// A search locale: a language with an optional country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    pub fn new<S: Into<String>>(language: S) -> Self {
        Locale {
            language: language.into().to_lowercase(),
            country: None,
        }
    }

    pub fn with_country<S: Into<String>>(mut self, country: S) -> Self {
        self.country = Some(country.into().to_uppercase());
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// The bare-language locale, dropping any country.
    pub fn language_only(&self) -> Locale {
        Locale::new(self.language.clone())
    }
}

impl FromStr for Locale {
    type Err = DocQueryError;

    /// Accepts `en`, `en_GB` and `en-GB`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DocQueryError::invalid_argument(format!("invalid locale `{s}`")));
        }
        let locale = Locale::new(language);
        match parts.next() {
            Some(country) if !country.is_empty() => Ok(locale.with_country(country)),
            Some(_) => Err(DocQueryError::invalid_argument(format!("invalid locale `{s}`"))),
            None => Ok(locale),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::new("en")
    }
}

/// Parameters of one search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Field searched by full-text expressions that name no property.
    pub default_field: String,

    /// Requested language-analysis mode; `None` uses the configured default.
    pub ml_analysis_mode: Option<MlAnalysisMode>,

    /// Operator joining full-text terms.
    pub default_operator: Operator,

    /// Search locales, most preferred first.
    pub locales: Vec<Locale>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        SearchParameters {
            default_field: crate::query::field_resolver::FIELD_TEXT.to_string(),
            ml_analysis_mode: None,
            default_operator: Operator::Or,
            locales: Vec::new(),
        }
    }
}

impl SearchParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = field.into();
        self
    }

    pub fn with_ml_analysis_mode(mut self, mode: MlAnalysisMode) -> Self {
        self.ml_analysis_mode = Some(mode);
        self
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locales.push(locale);
        self
    }
}
