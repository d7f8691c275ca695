//! Rendering tokens back to text.
//!
//! Used for opaque runs (arbitrary values, block contents) that the serializer reproduces
//! token by token rather than structurally.

use super::Token;
use crate::serialize::format_number;

/// Precision used for numbers inside raw token runs.
const RAW_PRECISION: u32 = 6;

/// Trait for converting a token to its CSS text.
pub trait ToCssString {
    fn to_css_string(&self) -> String;
}

impl ToCssString for Token {
    fn to_css_string(&self) -> String {
        match self {
            Token::Ident(name) => name.clone(),
            Token::Function(name) => format!("{name}("),
            Token::AtKeyword(name) => format!("@{name}"),
            Token::Hash { value, .. } => format!("#{value}"),
            Token::String(value) => quote_string(value),
            Token::BadString => "\"".to_string(),
            Token::Url(value) => format!("url({value})"),
            Token::BadUrl => "url(".to_string(),
            Token::Delim(c) => c.to_string(),
            Token::Number { value, signed, .. } => {
                let text = format_number(*value, RAW_PRECISION);
                if *signed && *value >= 0.0 {
                    format!("+{text}")
                } else {
                    text
                }
            }
            Token::Percentage(value) => format!("{}%", format_number(*value, RAW_PRECISION)),
            Token::Dimension { value, unit, .. } => {
                format!("{}{unit}", format_number(*value, RAW_PRECISION))
            }
            Token::UnicodeRange(start, end) if start == end => format!("U+{start:X}"),
            Token::UnicodeRange(start, end) => format!("U+{start:X}-{end:X}"),
            Token::Whitespace => " ".to_string(),
            Token::Colon => ":".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Comma => ",".to_string(),
            Token::OpenParen => "(".to_string(),
            Token::CloseParen => ")".to_string(),
            Token::OpenSquare => "[".to_string(),
            Token::CloseSquare => "]".to_string(),
            Token::OpenCurly => "{".to_string(),
            Token::CloseCurly => "}".to_string(),
            Token::Cdo => "<!--".to_string(),
            Token::Cdc => "-->".to_string(),
        }
    }
}

/// Serialize a string value with double quotes, escaping quotes and backslashes.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Detokenize a stream of tokens into a string.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(ToCssString::to_css_string).collect()
}
