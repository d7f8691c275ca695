//! Value definition grammars.
//!
//!     A value definition is a small grammar language: keywords, literal delimiters,
//!     references to other productions, combinators and multipliers. This module compiles
//!     definition text into a [Grammar] tree and writes trees back out.
//!
//! Pipeline
//!
//!     Lexing:
//!         [lexer] turns text into [DefToken]s with logos. Whitespace is dropped.
//!
//!     Parsing:
//!         [parser] builds the tree with chumsky. Unbounded repetitions receive a concrete
//!         upper bound from [RepetitionDefaults], which depend on the productions being
//!         compiled (see [defaults]).
//!
//!     Display:
//!         [display] renders a tree as canonical definition text.
//!
//! Compilation is all-or-nothing: any token the parser cannot place is a
//! [DefinitionError](crate::error::DefinitionError).

pub mod defaults;
pub mod display;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use defaults::RepetitionDefaults;
pub use display::serialize_definition;
pub use grammar::{
    ArbitraryKind, BlockKind, Grammar, NonTerminal, NumericRange, Repetition, RepetitionNotation,
    TokenPattern,
};
pub use lexer::{tokenize_definition, DefToken};
pub use parser::parse_definition;
