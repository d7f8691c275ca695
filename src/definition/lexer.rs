//! Tokenization of value definition text.
//!
//! The definition notation has its own small lexicon, separate from value tokens: keywords,
//! quoted literals, non-terminal brackets, combinators, multipliers and range bounds.
//! Whitespace only separates tokens; juxtaposition is expressed by adjacency in the token
//! stream, not by whitespace tokens.

use crate::error::DefinitionError;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Bounds written as `{m}`, `{m,}` or `{m,n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min: u32,
    /// `None` for `{m,}`.
    pub max: Option<u32>,
    /// Written as `{m}`.
    pub exact: bool,
}

fn bounds(lex: &mut logos::Lexer<DefToken>) -> Option<Bounds> {
    let inner = lex.slice().trim_start_matches('{').trim_end_matches('}');
    match inner.split_once(',') {
        Some((min, max)) => {
            let min = min.trim().parse().ok()?;
            let max = max.trim();
            let max = if max.is_empty() {
                None
            } else {
                Some(max.parse().ok()?)
            };
            Some(Bounds {
                min,
                max,
                exact: false,
            })
        }
        None => {
            let exact: u32 = inner.trim().parse().ok()?;
            Some(Bounds {
                min: exact,
                max: Some(exact),
                exact: true,
            })
        }
    }
}

/// All tokens of the definition notation.
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\n\r\x0C]+")]
pub enum DefToken {
    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string())]
    Keyword(String),

    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_\-]*\(", |lex| {
        let slice = lex.slice();
        slice[..slice.len() - 1].to_string()
    })]
    Function(String),

    #[regex(r"'[^']*'", |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    Literal(String),

    #[regex(r"<[a-zA-Z][a-zA-Z0-9+\-]*(\(\))?>", |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    NonTerminal(String),

    /// `<name` followed by a range or a parameter before the closing `>`.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9+\-]*(\(\))?", |lex| lex.slice()[1..].to_string())]
    NonTerminalOpen(String),

    #[regex(r"<'[a-zA-Z\-][a-zA-Z0-9\-]*'>", |lex| {
        let slice = lex.slice();
        slice[2..slice.len() - 2].to_string()
    })]
    Property(String),

    #[token(">")]
    AngleClose,

    /// A range bound: a number with an optional unit.
    #[regex(r"-?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+\-]?[0-9]+)?[a-zA-Z%]*", |lex| lex.slice().to_string())]
    Number(String),

    /// `∞` or `-∞`; the flag is set for the negative one.
    #[token("∞", |_| false)]
    #[token("-∞", |_| true)]
    Infinity(bool),

    #[regex(r"\{[ \t]*[0-9]+[ \t]*(,[ \t]*[0-9]*[ \t]*)?\}", bounds)]
    Bounds(Bounds),

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("|")]
    Bar,
    #[token("?")]
    Question,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("#")]
    Hash,
    #[token("!")]
    Bang,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,
    #[token("/")]
    Slash,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Equals,
}

impl fmt::Display for DefToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefToken::Keyword(name) => write!(f, "keyword {name}"),
            DefToken::Function(name) => write!(f, "function {name}("),
            DefToken::Literal(literal) => write!(f, "'{literal}'"),
            DefToken::NonTerminal(name) => write!(f, "<{name}>"),
            DefToken::NonTerminalOpen(name) => write!(f, "<{name}"),
            DefToken::Property(name) => write!(f, "<'{name}'>"),
            DefToken::AngleClose => write!(f, "'>'"),
            DefToken::Number(number) => write!(f, "number {number}"),
            DefToken::Infinity(true) => write!(f, "-∞"),
            DefToken::Infinity(false) => write!(f, "∞"),
            DefToken::Bounds(Bounds { min, max, .. }) => match max {
                Some(max) => write!(f, "{{{min},{max}}}"),
                None => write!(f, "{{{min},}}"),
            },
            DefToken::AndAnd => write!(f, "'&&'"),
            DefToken::OrOr => write!(f, "'||'"),
            DefToken::Bar => write!(f, "'|'"),
            DefToken::Question => write!(f, "'?'"),
            DefToken::Star => write!(f, "'*'"),
            DefToken::Plus => write!(f, "'+'"),
            DefToken::Hash => write!(f, "'#'"),
            DefToken::Bang => write!(f, "'!'"),
            DefToken::OpenBracket => write!(f, "'['"),
            DefToken::CloseBracket => write!(f, "']'"),
            DefToken::OpenParen => write!(f, "'('"),
            DefToken::CloseParen => write!(f, "')'"),
            DefToken::Comma => write!(f, "','"),
            DefToken::Slash => write!(f, "'/'"),
            DefToken::Colon => write!(f, "':'"),
            DefToken::Semicolon => write!(f, "';'"),
            DefToken::Equals => write!(f, "'='"),
        }
    }
}

/// Tokenize definition text with byte spans.
///
/// Unlike value text, definition text has no error recovery: the first character that
/// starts no token is a [DefinitionError::UnexpectedCharacter].
pub fn tokenize_definition(source: &str) -> Result<Vec<(DefToken, Range<usize>)>, DefinitionError> {
    let mut lexer = DefToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let found = lexer.slice().chars().next().unwrap_or('\u{fffd}');
                return Err(DefinitionError::UnexpectedCharacter {
                    found,
                    offset: span.start,
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<DefToken> {
        tokenize_definition(source)
            .expect("definition to tokenize")
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_combinators_and_multipliers() {
        assert_eq!(
            kinds("a && b || c | d? e* f+ g# h!"),
            vec![
                DefToken::Keyword("a".into()),
                DefToken::AndAnd,
                DefToken::Keyword("b".into()),
                DefToken::OrOr,
                DefToken::Keyword("c".into()),
                DefToken::Bar,
                DefToken::Keyword("d".into()),
                DefToken::Question,
                DefToken::Keyword("e".into()),
                DefToken::Star,
                DefToken::Keyword("f".into()),
                DefToken::Plus,
                DefToken::Keyword("g".into()),
                DefToken::Hash,
                DefToken::Keyword("h".into()),
                DefToken::Bang,
            ]
        );
    }

    #[test]
    fn test_non_terminals() {
        assert_eq!(
            kinds("<length> <calc()> <'width'> <an+b>"),
            vec![
                DefToken::NonTerminal("length".into()),
                DefToken::NonTerminal("calc()".into()),
                DefToken::Property("width".into()),
                DefToken::NonTerminal("an+b".into()),
            ]
        );
    }

    #[test]
    fn test_ranged_non_terminal() {
        assert_eq!(
            kinds("<length [0px,∞]>"),
            vec![
                DefToken::NonTerminalOpen("length".into()),
                DefToken::OpenBracket,
                DefToken::Number("0px".into()),
                DefToken::Comma,
                DefToken::Infinity(false),
                DefToken::CloseBracket,
                DefToken::AngleClose,
            ]
        );
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            kinds("a{2,3} b{1,} c{4} d#{1,2}"),
            vec![
                DefToken::Keyword("a".into()),
                DefToken::Bounds(Bounds {
                    min: 2,
                    max: Some(3),
                    exact: false
                }),
                DefToken::Keyword("b".into()),
                DefToken::Bounds(Bounds {
                    min: 1,
                    max: None,
                    exact: false
                }),
                DefToken::Keyword("c".into()),
                DefToken::Bounds(Bounds {
                    min: 4,
                    max: Some(4),
                    exact: true
                }),
                DefToken::Keyword("d".into()),
                DefToken::Hash,
                DefToken::Bounds(Bounds {
                    min: 1,
                    max: Some(2),
                    exact: false
                }),
            ]
        );
    }

    #[test]
    fn test_functions_and_literals() {
        assert_eq!(
            kinds("rgb( <number>#{3} ) '/' , -infinity"),
            vec![
                DefToken::Function("rgb".into()),
                DefToken::NonTerminal("number".into()),
                DefToken::Hash,
                DefToken::Bounds(Bounds {
                    min: 3,
                    max: Some(3),
                    exact: true
                }),
                DefToken::CloseParen,
                DefToken::Literal("/".into()),
                DefToken::Comma,
                DefToken::Keyword("-infinity".into()),
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            tokenize_definition("a ~ b"),
            Err(DefinitionError::UnexpectedCharacter {
                found: '~',
                offset: 2
            })
        );
    }
}
