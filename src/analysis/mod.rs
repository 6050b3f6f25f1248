//! Text analysis used when compiling literal values into index terms.
//!
//! Query literals must be tokenized the same way the indexer tokenized
//! the stored text, so every resolved field carries an [`Analyzer`].

pub mod analyzer;
pub mod token;
pub mod tokenizer;

pub use analyzer::*;
pub use token::*;
pub use tokenizer::*;
