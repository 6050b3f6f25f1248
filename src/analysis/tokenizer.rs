//! Tokenizers that split text into tokens.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}

/// Splits text on Unicode word boundaries (UAX #29), dropping punctuation
/// and whitespace segments.
///
/// Wildcard characters (`*`, `?`) are kept inside words when
/// `keep_wildcards` is set, so a full-text term such as `doc*` survives
/// tokenization as one token.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer {
    keep_wildcards: bool,
}

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer {
            keep_wildcards: false,
        }
    }

    /// Keep `*` and `?` attached to the surrounding word.
    pub fn keep_wildcards(mut self, keep: bool) -> Self {
        self.keep_wildcards = keep;
        self
    }

    fn tokenize_words(text: &str) -> Vec<Token> {
        text.unicode_word_indices()
            .enumerate()
            .map(|(position, (start, word))| {
                Token::with_offsets(word, position, start, start + word.len())
            })
            .collect()
    }

    /// Word segmentation as in [`Self::tokenize_words`], with runs of `*`
    /// and `?` joined to the words they touch.
    fn tokenize_with_wildcards(text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut span: Option<(usize, usize)> = None;
        let mut after_wildcard = false;

        for (start, segment) in text.split_word_bound_indices() {
            let end = start + segment.len();
            let wildcard = is_wildcard_run(segment);
            let word = !wildcard && segment.chars().any(char::is_alphanumeric);

            span = match span {
                Some((begin, _)) if wildcard || (word && after_wildcard) => Some((begin, end)),
                current => {
                    if let Some((begin, stop)) = current {
                        tokens.push(Token::with_offsets(
                            &text[begin..stop],
                            tokens.len(),
                            begin,
                            stop,
                        ));
                    }
                    (wildcard || word).then_some((start, end))
                }
            };
            after_wildcard = wildcard;
        }
        if let Some((begin, stop)) = span {
            tokens.push(Token::with_offsets(&text[begin..stop], tokens.len(), begin, stop));
        }
        tokens
    }
}

fn is_wildcard_run(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|ch| ch == '*' || ch == '?')
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens = if self.keep_wildcards {
            Self::tokenize_with_wildcards(text)
        } else {
            Self::tokenize_words(text)
        };
        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}

/// Treats the entire input as a single token.
#[derive(Clone, Debug, Default)]
pub struct WholeTokenizer;

impl WholeTokenizer {
    pub fn new() -> Self {
        WholeTokenizer
    }
}

impl Tokenizer for WholeTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            Ok(Box::new(std::iter::empty()))
        } else {
            let token = Token::with_offsets(text, 0, 0, text.len());
            Ok(Box::new(std::iter::once(token)))
        }
    }

    fn name(&self) -> &'static str {
        "whole"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_word_tokenizer() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("Hello, world! café").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "Hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[2].text, "café");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 7);
    }

    #[test]
    fn test_unicode_word_tokenizer_keeps_wildcards() {
        let tokenizer = UnicodeWordTokenizer::new().keep_wildcards(true);
        let tokens: Vec<Token> = tokenizer.tokenize("annual rep*rt, q?").unwrap().collect();

        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["annual", "rep*rt", "q?"]);
        assert_eq!(tokens[2].end_offset, 17);
    }

    #[test]
    fn test_wildcard_tokenizer_follows_word_boundaries() {
        let plain = UnicodeWordTokenizer::new();
        let wildcards = UnicodeWordTokenizer::new().keep_wildcards(true);

        for text in ["3.14 don't", "snake_case, e-mail", "東京タワー"] {
            let expected: Vec<String> = plain.tokenize(text).unwrap().map(|t| t.text).collect();
            let actual: Vec<String> = wildcards.tokenize(text).unwrap().map(|t| t.text).collect();
            assert_eq!(actual, expected, "tokens of {text:?}");
        }

        let texts: Vec<String> = wildcards
            .tokenize("*port v1.2* don't?")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["*port", "v1.2*", "don't?"]);
    }

    #[test]
    fn test_whole_tokenizer() {
        let tokenizer = WholeTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello world").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "hello world");
        assert_eq!(tokens[0].end_offset, 11);

        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
    }
}
