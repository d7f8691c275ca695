//! Value tokens.
//!
//!     The matcher never sees characters: it consumes a flat sequence of lexical tokens in
//!     the shape produced by a CSS-syntax tokenizer. Blocks and functions are not nested in
//!     the stream; a `Function` or open-bracket token is followed by its contents and then by
//!     the matching close token, and the matcher pairs them up itself.
//!
//! Token Layers
//!
//!     Raw Tokens:
//!         Produced by the logos lexer in [lexer]. They carry only the matched slice and are
//!         immediately cooked into [Token] values (numbers parsed, quotes stripped, units split).
//!
//!     Tokens:
//!         The [Token] enum below. This is the only token type the rest of the crate consumes.
//!
//!     Whitespace is kept as a token because it is significant in exactly one place: the `+`
//!     and `-` operators of a calculation sum must be surrounded by it. Everywhere else the
//!     [Cursor] skips it on significant reads.

pub mod cursor;
pub mod formatting;
pub mod lexer;

pub use cursor::Cursor;
pub use formatting::{detokenize, ToCssString};
pub use lexer::{tokenize, tokenize_spanned};

use serde::Serialize;

/// A lexical token of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    Ident(String),
    /// A function name immediately followed by `(`; the name excludes the parenthesis.
    Function(String),
    AtKeyword(String),
    /// `#` followed by name characters. `is_id` is set when the name would be a valid
    /// identifier.
    Hash { value: String, is_id: bool },
    String(String),
    BadString,
    /// An unquoted `url(...)`; the value excludes `url(` and `)`.
    Url(String),
    BadUrl,
    Delim(char),
    Number { value: f64, int: bool, signed: bool },
    Percentage(f64),
    Dimension { value: f64, int: bool, unit: String },
    UnicodeRange(u32, u32),
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
    Cdo,
    Cdc,
}

/// The kind of a token, used by `<*-token>` grammar markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Ident,
    Function,
    AtKeyword,
    Hash,
    String,
    Url,
    Delim,
    Number,
    Percentage,
    Dimension,
    UnicodeRange,
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    Cdo,
    Cdc,
}

impl TokenKind {
    /// Look up a kind by its grammar marker name, without the `-token` suffix.
    pub fn from_marker(name: &str) -> Option<Self> {
        let kind = match name {
            "ident" => TokenKind::Ident,
            "function" => TokenKind::Function,
            "at-keyword" => TokenKind::AtKeyword,
            "hash" => TokenKind::Hash,
            "string" => TokenKind::String,
            "url" => TokenKind::Url,
            "delim" => TokenKind::Delim,
            "number" => TokenKind::Number,
            "percentage" => TokenKind::Percentage,
            "dimension" => TokenKind::Dimension,
            "urange" | "unicode-range" => TokenKind::UnicodeRange,
            "whitespace" => TokenKind::Whitespace,
            "colon" => TokenKind::Colon,
            "semicolon" => TokenKind::Semicolon,
            "comma" => TokenKind::Comma,
            "cdo" | "CDO" => TokenKind::Cdo,
            "cdc" | "CDC" => TokenKind::Cdc,
            _ => return None,
        };
        Some(kind)
    }

    /// The marker name used in grammar text, without the `-token` suffix.
    pub fn marker(self) -> &'static str {
        match self {
            TokenKind::Ident => "ident",
            TokenKind::Function => "function",
            TokenKind::AtKeyword => "at-keyword",
            TokenKind::Hash => "hash",
            TokenKind::String => "string",
            TokenKind::Url => "url",
            TokenKind::Delim => "delim",
            TokenKind::Number => "number",
            TokenKind::Percentage => "percentage",
            TokenKind::Dimension => "dimension",
            TokenKind::UnicodeRange => "urange",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Colon => "colon",
            TokenKind::Semicolon => "semicolon",
            TokenKind::Comma => "comma",
            TokenKind::Cdo => "CDO",
            TokenKind::Cdc => "CDC",
        }
    }
}

impl Token {
    /// The kind of this token, if it has a grammar marker.
    pub fn kind(&self) -> Option<TokenKind> {
        let kind = match self {
            Token::Ident(_) => TokenKind::Ident,
            Token::Function(_) => TokenKind::Function,
            Token::AtKeyword(_) => TokenKind::AtKeyword,
            Token::Hash { .. } => TokenKind::Hash,
            Token::String(_) => TokenKind::String,
            Token::Url(_) => TokenKind::Url,
            Token::Delim(_) => TokenKind::Delim,
            Token::Number { .. } => TokenKind::Number,
            Token::Percentage(_) => TokenKind::Percentage,
            Token::Dimension { .. } => TokenKind::Dimension,
            Token::UnicodeRange(..) => TokenKind::UnicodeRange,
            Token::Whitespace => TokenKind::Whitespace,
            Token::Colon => TokenKind::Colon,
            Token::Semicolon => TokenKind::Semicolon,
            Token::Comma => TokenKind::Comma,
            Token::Cdo => TokenKind::Cdo,
            Token::Cdc => TokenKind::Cdc,
            Token::BadString
            | Token::BadUrl
            | Token::OpenParen
            | Token::CloseParen
            | Token::OpenSquare
            | Token::CloseSquare
            | Token::OpenCurly
            | Token::CloseCurly => return None,
        };
        Some(kind)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace)
    }

    /// Tokens that can never appear in a valid value.
    pub fn is_bad(&self) -> bool {
        matches!(self, Token::BadString | Token::BadUrl)
    }

    /// The close token matching an opening one, for functions and simple blocks.
    pub fn closing(&self) -> Option<Token> {
        match self {
            Token::Function(_) | Token::OpenParen => Some(Token::CloseParen),
            Token::OpenSquare => Some(Token::CloseSquare),
            Token::OpenCurly => Some(Token::CloseCurly),
            _ => None,
        }
    }

    pub fn is_closing(&self) -> bool {
        matches!(
            self,
            Token::CloseParen | Token::CloseSquare | Token::CloseCurly
        )
    }

    /// Case-insensitive identifier comparison.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(ident) if ident.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trip() {
        for kind in [
            TokenKind::Ident,
            TokenKind::AtKeyword,
            TokenKind::Dimension,
            TokenKind::UnicodeRange,
            TokenKind::Cdc,
        ] {
            assert_eq!(TokenKind::from_marker(kind.marker()), Some(kind));
        }
    }

    #[test]
    fn test_closing_pairs() {
        assert_eq!(
            Token::Function("calc".into()).closing(),
            Some(Token::CloseParen)
        );
        assert_eq!(Token::OpenSquare.closing(), Some(Token::CloseSquare));
        assert_eq!(Token::Comma.closing(), None);
    }
}
