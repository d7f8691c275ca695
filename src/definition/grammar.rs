//! The grammar AST produced by the definition parser.
//!
//! A [Grammar] is a plain tree: every combinator and multiplier owns its children. Recursion
//! between productions is by name, through [NonTerminal] and [Grammar::Property] lookups at
//! match time, never by structural sharing. Compiled grammars are immutable and shared
//! read-only (behind `Arc`) across match attempts.

use crate::token::TokenKind;
use serde::Serialize;

/// A compiled value definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Grammar {
    /// A literal delimiter or a `<*-token>` marker.
    Token(TokenPattern),
    /// A bare identifier, matched ASCII case-insensitively. Stored lowercase.
    Keyword(String),
    NonTerminal(NonTerminal),
    /// `name( body )`.
    Function {
        name: String,
        body: Option<Box<Grammar>>,
    },
    /// `( body )`, `'[' body ']'` or `'{' body '}'`.
    Block {
        kind: BlockKind,
        body: Option<Box<Grammar>>,
    },
    /// `<'property-name'>`, resolved through the registry.
    Property(String),
    /// `<declaration-value>` or `<any-value>`.
    Arbitrary(ArbitraryKind),
    /// `<block-contents>`.
    BlockContents,
    /// `<forgiving-selector-list>` and friends; the name is kept for serialization.
    Forgiving(String),
    /// Juxtaposition: all components, in order.
    Sequence(Vec<Grammar>),
    /// `&&`: all components, any order.
    Permutation(Vec<Grammar>),
    /// `||`: one or more components, any order.
    Arrangement(Vec<Grammar>),
    /// `|`: exactly one component, first match in declaration order.
    Alternation(Vec<Grammar>),
    /// `?`
    Optional(Box<Grammar>),
    /// `!`: the group must produce at least one present component.
    Required(Box<Grammar>),
    Repetition(Repetition),
}

/// What a `Token` grammar node accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenPattern {
    Delim(char),
    Comma,
    Colon,
    Semicolon,
    Kind(TokenKind),
}

/// A named reference to another production.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonTerminal {
    pub name: String,
    pub range: Option<NumericRange>,
    /// The nested definition of a parametric production, e.g. the test grammar of
    /// `<boolean-expr[ <media-feature> ]>`.
    pub parameter: Option<Box<Grammar>>,
}

/// An inclusive range constraint, in the non-terminal's canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    /// Bounds as written, kept for serialization.
    pub written: (String, String),
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Paren,
    Square,
    Curly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArbitraryKind {
    /// No top-level `;` or `!`.
    DeclarationValue,
    AnyValue,
}

/// A bounded repetition. Unbounded notations get their `max` baked in at parse time from
/// the context-sensitive defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repetition {
    pub inner: Box<Grammar>,
    pub min: u32,
    pub max: u32,
    /// Separator required between items; `#` repetitions use a comma.
    pub separator: Option<TokenPattern>,
    pub notation: RepetitionNotation,
}

/// How a repetition was written, so it can be written back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepetitionNotation {
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `#`
    Hash,
    /// `{m}`, `{m,}` or `{m,n}`; `explicit_max` is `None` for `{m,}`.
    Range { exact: bool, explicit_max: Option<u32> },
    /// `#{m}`, `#{m,}` or `#{m,n}`
    HashRange { exact: bool, explicit_max: Option<u32> },
}

impl Grammar {
    /// The literal comma of a comma-separated sequence.
    pub fn is_comma(&self) -> bool {
        matches!(self, Grammar::Token(TokenPattern::Comma))
    }

    /// Combinator nodes, which need brackets when used as a multiplier operand.
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            Grammar::Sequence(_)
                | Grammar::Permutation(_)
                | Grammar::Arrangement(_)
                | Grammar::Alternation(_)
        )
    }

    /// The production name of a non-terminal, if this is one.
    pub fn non_terminal_name(&self) -> Option<&str> {
        match self {
            Grammar::NonTerminal(non_terminal) => Some(&non_terminal.name),
            _ => None,
        }
    }

    /// Whether this grammar can succeed without consuming anything.
    pub fn accepts_empty(&self) -> bool {
        match self {
            Grammar::Optional(_) | Grammar::BlockContents | Grammar::Forgiving(_) => true,
            Grammar::Repetition(repetition) => {
                repetition.min == 0 || repetition.inner.accepts_empty()
            }
            Grammar::Sequence(items) | Grammar::Permutation(items) => {
                items.iter().all(Grammar::accepts_empty)
            }
            Grammar::Alternation(items) => items.iter().any(Grammar::accepts_empty),
            _ => false,
        }
    }
}
