//! Token representation produced by tokenizers and analyzers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single token emitted by analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The token text after normalization.
    pub text: String,

    /// Position of the token in the stream (0-based).
    pub position: usize,

    /// Byte offset where the token starts in the source text.
    pub start_offset: usize,

    /// Byte offset just past the end of the token.
    pub end_offset: usize,
}

impl Token {
    /// Create a token without offsets.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a token with byte offsets into the source text.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Replace the text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A boxed stream of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

/// Collect the text of every token in a stream.
pub fn token_texts(stream: TokenStream) -> Vec<String> {
    stream.map(|token| token.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_with_offsets() {
        let token = Token::with_offsets("Hello", 0, 4, 9).with_text("hello");
        assert_eq!(token.text, "hello");
        assert_eq!(token.start_offset, 4);
        assert_eq!(token.end_offset, 9);
        assert_eq!(token.to_string(), "hello");
    }

    #[test]
    fn test_token_texts() {
        let tokens = vec![Token::new("a", 0), Token::new("b", 1)];
        let stream: TokenStream = Box::new(tokens.into_iter());
        assert_eq!(token_texts(stream), vec!["a", "b"]);
    }
}
