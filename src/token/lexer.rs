//! Base tokenization of value text.
//!
//! This module provides the raw tokenization using the logos lexer library. It is the entry
//! point where value strings become token streams. The core treats the tokenizer as an
//! external collaborator, so this is deliberately a plain CSS-syntax-shaped lexer: no escape
//! processing in identifiers, comments dropped, unrecognised characters kept as `Delim`.

use super::Token;
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
    #[regex(r"[ \t\n\r\x0C]+")]
    Whitespace,

    #[regex(r"[uU]\+[0-9a-fA-F?]{1,6}(-[0-9a-fA-F]{1,6})?")]
    UnicodeRange,

    #[regex(r#"[uU][rR][lL]\([ \t\n\r\x0C]*([^\x00-\x20"'()\\\x7F])*[ \t\n\r\x0C]*\)"#)]
    Url,

    #[regex(r"-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_\-]|[^\x00-\x7F])*\(")]
    #[regex(r"--([a-zA-Z0-9_\-]|[^\x00-\x7F])*\(")]
    Function,

    #[regex(r"-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_\-]|[^\x00-\x7F])*")]
    #[regex(r"--([a-zA-Z0-9_\-]|[^\x00-\x7F])*")]
    Ident,

    #[regex(r"@-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_\-]|[^\x00-\x7F])*")]
    AtKeyword,

    #[regex(r"#([a-zA-Z0-9_\-]|[^\x00-\x7F])+")]
    Hash,

    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'?"#)]
    String,

    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?", priority = 10)]
    Number,

    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?%")]
    Percentage,

    #[regex(
        r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_\-]|[^\x00-\x7F])*"
    )]
    Dimension,

    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,
    #[token("<!--")]
    Cdo,
    #[token("-->")]
    Cdc,
}

/// Tokenize value text.
///
/// Comments are dropped and runs of whitespace collapse into a single `Whitespace` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_spanned(source)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Tokenize value text, keeping the byte range of every token.
pub fn tokenize_spanned(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens: Vec<(Token, Range<usize>)> = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        match result {
            Ok(raw) => {
                let token = cook(raw, slice, span.end == source.len());
                // Comments between two whitespace runs would otherwise leave two tokens
                if token.is_whitespace()
                    && matches!(tokens.last(), Some((Token::Whitespace, _)))
                {
                    if let Some((_, last)) = tokens.last_mut() {
                        last.end = span.end;
                    }
                    continue;
                }
                tokens.push((token, span));
            }
            Err(()) => {
                for (offset, c) in slice.char_indices() {
                    let start = span.start + offset;
                    tokens.push((Token::Delim(c), start..start + c.len_utf8()));
                }
            }
        }
    }

    tokens
}

fn cook(raw: RawToken, slice: &str, at_eof: bool) -> Token {
    match raw {
        RawToken::Whitespace => Token::Whitespace,
        RawToken::UnicodeRange => cook_unicode_range(&slice[2..]),
        RawToken::Url => {
            let inner = &slice[4..slice.len() - 1];
            Token::Url(inner.trim().to_string())
        }
        RawToken::Function => Token::Function(slice[..slice.len() - 1].to_string()),
        RawToken::Ident => Token::Ident(slice.to_string()),
        RawToken::AtKeyword => Token::AtKeyword(slice[1..].to_string()),
        RawToken::Hash => {
            let value = slice[1..].to_string();
            let is_id = starts_identifier(&value);
            Token::Hash { value, is_id }
        }
        RawToken::String => cook_string(slice, at_eof),
        RawToken::Number => {
            let value = slice.parse::<f64>().unwrap_or(f64::NAN);
            Token::Number {
                value,
                int: is_integer_literal(slice),
                signed: slice.starts_with('+') || slice.starts_with('-'),
            }
        }
        RawToken::Percentage => {
            let number = &slice[..slice.len() - 1];
            Token::Percentage(number.parse::<f64>().unwrap_or(f64::NAN))
        }
        RawToken::Dimension => {
            let (number, unit) = split_dimension(slice);
            Token::Dimension {
                value: number.parse::<f64>().unwrap_or(f64::NAN),
                int: is_integer_literal(number),
                unit: unit.to_string(),
            }
        }
        RawToken::Colon => Token::Colon,
        RawToken::Semicolon => Token::Semicolon,
        RawToken::Comma => Token::Comma,
        RawToken::OpenParen => Token::OpenParen,
        RawToken::CloseParen => Token::CloseParen,
        RawToken::OpenSquare => Token::OpenSquare,
        RawToken::CloseSquare => Token::CloseSquare,
        RawToken::OpenCurly => Token::OpenCurly,
        RawToken::CloseCurly => Token::CloseCurly,
        RawToken::Cdo => Token::Cdo,
        RawToken::Cdc => Token::Cdc,
    }
}

/// A string is bad when a newline cut it off; an unterminated string at the end of input
/// is still a string.
fn cook_string(slice: &str, at_eof: bool) -> Token {
    let mut chars = slice.chars();
    let quote = chars.next().unwrap_or('"');
    let mut value = String::with_capacity(slice.len());
    let mut terminated = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            }
            c if c == quote => {
                terminated = true;
                break;
            }
            c => value.push(c),
        }
    }
    if !terminated && !at_eof {
        return Token::BadString;
    }
    Token::String(value)
}

fn cook_unicode_range(digits: &str) -> Token {
    let (start, end) = match digits.split_once('-') {
        Some((start, end)) => (
            u32::from_str_radix(start, 16).unwrap_or(u32::MAX),
            u32::from_str_radix(end, 16).unwrap_or(u32::MAX),
        ),
        None if digits.contains('?') => (
            u32::from_str_radix(&digits.replace('?', "0"), 16).unwrap_or(u32::MAX),
            u32::from_str_radix(&digits.replace('?', "F"), 16).unwrap_or(u32::MAX),
        ),
        None => {
            let value = u32::from_str_radix(digits, 16).unwrap_or(u32::MAX);
            (value, value)
        }
    };
    Token::UnicodeRange(start, end)
}

fn is_integer_literal(number: &str) -> bool {
    !number.contains(['.', 'e', 'E'])
}

fn starts_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some('-') => matches!(chars.next(), Some(c) if c == '-' || c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()),
        Some(c) => c.is_ascii_alphabetic() || c == '_' || !c.is_ascii(),
        None => false,
    }
}

/// Split a dimension slice into its numeric part and its unit.
fn split_dimension(slice: &str) -> (&str, &str) {
    let bytes = slice.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    slice.split_at(i)
}
