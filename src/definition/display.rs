//! Writing compiled grammars back as definition text.
//!
//! The output is canonical rather than a copy of the source: whitespace is normalized,
//! keywords are lowercase and brackets appear only where precedence requires them. Parsing
//! the output yields the same grammar.

use std::fmt;

use super::grammar::{
    ArbitraryKind, BlockKind, Grammar, NonTerminal, Repetition, RepetitionNotation, TokenPattern,
};

impl fmt::Display for TokenPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPattern::Comma => write!(f, ","),
            TokenPattern::Colon => write!(f, "':'"),
            TokenPattern::Semicolon => write!(f, "';'"),
            TokenPattern::Delim(c) => write!(f, "'{c}'"),
            TokenPattern::Kind(kind) => write!(f, "<{}-token>", kind.marker()),
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        if let Some(range) = &self.range {
            write!(f, " [{},{}]", range.written.0, range.written.1)?;
        }
        if let Some(parameter) = &self.parameter {
            write!(f, "[ {parameter} ]")?;
        }
        write!(f, ">")
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Token(pattern) => write!(f, "{pattern}"),
            Grammar::Keyword(name) => write!(f, "{name}"),
            Grammar::NonTerminal(non_terminal) => write!(f, "{non_terminal}"),
            Grammar::Function { name, body } => match body {
                Some(body) => write!(f, "{name}( {body} )"),
                None => write!(f, "{name}()"),
            },
            Grammar::Block { kind, body } => {
                let (open, close) = match kind {
                    BlockKind::Paren => ("(", ")"),
                    BlockKind::Square => ("'['", "']'"),
                    BlockKind::Curly => ("'{'", "'}'"),
                };
                match body {
                    Some(body) => write!(f, "{open} {body} {close}"),
                    None => write!(f, "{open} {close}"),
                }
            }
            Grammar::Property(name) => write!(f, "<'{name}'>"),
            Grammar::Arbitrary(ArbitraryKind::DeclarationValue) => write!(f, "<declaration-value>"),
            Grammar::Arbitrary(ArbitraryKind::AnyValue) => write!(f, "<any-value>"),
            Grammar::BlockContents => write!(f, "<block-contents>"),
            Grammar::Forgiving(name) => write!(f, "<{name}>"),
            Grammar::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 && !item.is_comma() {
                        write!(f, " ")?;
                    }
                    write_operand(f, item, needs_brackets_in_sequence(item))?;
                }
                Ok(())
            }
            Grammar::Permutation(items) => write_joined(f, items, " && "),
            Grammar::Arrangement(items) => write_joined(f, items, " || "),
            Grammar::Alternation(items) => write_joined(f, items, " | "),
            Grammar::Optional(inner) => {
                write_operand(f, inner, inner.is_combinator())?;
                write!(f, "?")
            }
            Grammar::Required(inner) => {
                write_operand(f, inner, inner.is_combinator())?;
                write!(f, "!")
            }
            Grammar::Repetition(repetition) => {
                write_operand(f, &repetition.inner, repetition.inner.is_combinator())?;
                write_notation(f, repetition)
            }
        }
    }
}

fn needs_brackets_in_sequence(item: &Grammar) -> bool {
    matches!(
        item,
        Grammar::Sequence(_)
            | Grammar::Permutation(_)
            | Grammar::Arrangement(_)
            | Grammar::Alternation(_)
    )
}

fn needs_brackets_in_combinator(item: &Grammar) -> bool {
    matches!(
        item,
        Grammar::Permutation(_) | Grammar::Arrangement(_) | Grammar::Alternation(_)
    )
}

fn write_operand(f: &mut fmt::Formatter<'_>, grammar: &Grammar, bracket: bool) -> fmt::Result {
    if bracket {
        write!(f, "[ {grammar} ]")
    } else {
        write!(f, "{grammar}")
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Grammar], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, "{separator}")?;
        }
        write_operand(f, item, needs_brackets_in_combinator(item))?;
    }
    Ok(())
}

fn write_bounds(
    f: &mut fmt::Formatter<'_>,
    min: u32,
    exact: bool,
    explicit_max: Option<u32>,
) -> fmt::Result {
    match (exact, explicit_max) {
        (true, _) => write!(f, "{{{min}}}"),
        (false, Some(max)) => write!(f, "{{{min},{max}}}"),
        (false, None) => write!(f, "{{{min},}}"),
    }
}

fn write_notation(f: &mut fmt::Formatter<'_>, repetition: &Repetition) -> fmt::Result {
    match repetition.notation {
        RepetitionNotation::Star => write!(f, "*"),
        RepetitionNotation::Plus => write!(f, "+"),
        RepetitionNotation::Hash => write!(f, "#"),
        RepetitionNotation::Range {
            exact,
            explicit_max,
        } => write_bounds(f, repetition.min, exact, explicit_max),
        RepetitionNotation::HashRange {
            exact,
            explicit_max,
        } => {
            write!(f, "#")?;
            write_bounds(f, repetition.min, exact, explicit_max)
        }
    }
}

/// Render a grammar as canonical definition text.
pub fn serialize_definition(grammar: &Grammar) -> String {
    grammar.to_string()
}
