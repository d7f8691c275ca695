//! Error types.
//!
//! Only malformed grammar text is an error in this crate. An input that does not satisfy a
//! grammar is the ordinary `None` outcome of a match, never an `Err`: alternatives fail many
//! times before a grammar as a whole succeeds, so failure carries no diagnostic payload.

use std::ops::Range;
use thiserror::Error;

/// A malformed value definition.
///
/// Definitions are compiled all-or-nothing; no partial grammar is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition lexer found a character it has no token for.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    /// The definition parser found a token where none of the expected ones could appear.
    #[error("unexpected {found} at {span:?}, expected one of: {}", expected.join(", "))]
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
        span: Range<usize>,
    },

    /// The definition ended before a construct was closed.
    #[error("unexpected end of definition, expected one of: {}", expected.join(", "))]
    UnexpectedEnd { expected: Vec<String> },

    /// A construct was lexically well-formed but semantically invalid, such as `{3,1}`,
    /// a range bound with an unknown unit, or `a && b || c` without brackets.
    #[error("{message} at {span:?}")]
    Invalid { message: String, span: Range<usize> },

    /// The definition contained nothing to match.
    #[error("empty definition")]
    Empty,
}

/// Crate-level error returned by the property entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A grammar string failed to compile.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The registry has no grammar for the requested property.
    #[error("unknown property {0:?}")]
    UnknownProperty(String),
}
