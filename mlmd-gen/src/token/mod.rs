//! Stream tokens and directive recognition
//!
//! Tokenizing reduces the input to a small set of stream tokens:
//! plain text, escaped text, end-of-line and language open/close
//! markers. Directives that act immediately (`.languages`, `.toc`,
//! headings, escapers, single-line settings) never land in the stream;
//! they are recognized as [`catalog::Marker`] values and handled by the
//! lexer, possibly synthesizing more stream tokens.

pub mod catalog;

pub use catalog::{Marker, TokenCatalog};

/// One token of the pending output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain text, subject to variable expansion at flush time.
    Text(String),
    /// Escaped text copied verbatim, never expanded.
    Escaped(String),
    /// End of line.
    Eol,
    /// A language section opening; `code` is a declared language or one
    /// of `all` / `default` / `ignore`.
    Open { code: String, line: usize },
    /// End of the innermost open language section.
    Close,
}

impl Token {
    pub fn is_eol(&self) -> bool {
        matches!(self, Token::Eol)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Token::Open { .. })
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::Close)
    }

    pub fn is_text_or_escaped(&self) -> bool {
        matches!(self, Token::Text(_) | Token::Escaped(_))
    }

    /// True for text tokens made only of whitespace.
    pub fn is_spacing(&self) -> bool {
        match self {
            Token::Text(text) | Token::Escaped(text) => {
                !text.is_empty() && text.chars().all(char::is_whitespace)
            }
            _ => false,
        }
    }

    /// True for tokens carrying no significant content (EOLs and empty
    /// text); used to drop EOLs before the first real content.
    pub fn is_empty(&self) -> bool {
        match self {
            Token::Text(text) | Token::Escaped(text) => text.is_empty(),
            _ => true,
        }
    }
}
