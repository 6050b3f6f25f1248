//! Analyzers combine a tokenizer with token normalization.
//!
//! Two analyzers cover the field kinds the field resolver hands out:
//!
//! - [`StandardAnalyzer`] for free text: Unicode word boundaries, lowercased.
//! - [`KeywordAnalyzer`] for identifiers and encoded values: the whole
//!   input as a single token, untouched.
//!
//! # Examples
//!
//! ```
//! use docquery::analysis::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Annual Report").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "annual");
//! assert_eq!(tokens[1].text, "report");
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer, WholeTokenizer};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers are shared between concurrent compilations, hence
/// `Send + Sync`.
pub trait Analyzer: Send + Sync + Debug {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &'static str;

    /// Whether this analyzer lowercases tokens; wildcard patterns are
    /// normalized the same way when it does.
    fn lowercases(&self) -> bool {
        false
    }
}

/// Free-text analyzer: Unicode word tokenization followed by lowercasing.
#[derive(Clone)]
pub struct StandardAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl StandardAnalyzer {
    pub fn new() -> Self {
        StandardAnalyzer {
            tokenizer: Arc::new(UnicodeWordTokenizer::new()),
        }
    }

    /// A standard analyzer whose tokenizer keeps `*` and `?` inside words.
    pub fn with_wildcards() -> Self {
        StandardAnalyzer {
            tokenizer: Arc::new(UnicodeWordTokenizer::new().keep_wildcards(true)),
        }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let tokens = self.tokenizer.tokenize(text)?;
        Ok(Box::new(tokens.map(|token| {
            let lowered = token.text.to_lowercase();
            token.with_text(lowered)
        })))
    }

    fn name(&self) -> &'static str {
        "standard"
    }

    fn lowercases(&self) -> bool {
        true
    }
}

impl Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

/// Keyword analyzer: the entire input is a single token.
#[derive(Clone, Debug, Default)]
pub struct KeywordAnalyzer {
    tokenizer: WholeTokenizer,
}

impl KeywordAnalyzer {
    pub fn new() -> Self {
        KeywordAnalyzer {
            tokenizer: WholeTokenizer::new(),
        }
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
