//! # vds
//!
//! A matcher for CSS-style value definition grammars.
//!
//! Layout
//!
//! The crate is one pipeline with a few stages that are usable on their own:
//!
//!     src/
//!       ├── token        Value tokens: the logos tokenizer, the cursor, formatting back to text
//!       ├── definition   Definition text to Grammar trees (logos + chumsky) and back
//!       ├── registry     Named productions and properties the matcher expands
//!       ├── matching     The backtracking matcher, primitive parsers, the Engine
//!       ├── calc         Math functions: typing, simplification, evaluation
//!       └── serialize    Match trees and calculation trees back to canonical text
//!
//! A grammar is compiled once and cached per engine; matching is a pure function of the
//! tokens, the grammar and the context production, so an [Engine] can be shared across
//! threads.
//!
//! The free functions here use a default engine over the [StandardRegistry]. Build an
//! [Engine] directly to add productions, change [Limits] or seed `random()`.

#![allow(rustdoc::invalid_html_tags)]

pub mod calc;
pub mod definition;
pub mod error;
pub mod limits;
pub mod matching;
pub mod registry;
pub mod serialize;
pub mod token;

use once_cell::sync::Lazy;

pub use calc::{CalcValue, FixedRandom, HashedRandom, RandomSource};
pub use definition::{parse_definition, serialize_definition, Grammar};
pub use error::{DefinitionError, Error};
pub use limits::Limits;
pub use matching::{Engine, Match, Separator, Value};
pub use registry::{Definition, MapRegistry, Registry, StandardRegistry};
pub use serialize::serialize_component_value;
pub use token::{tokenize, Token};

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(|| Engine::new(StandardRegistry));

/// The shared engine behind the free functions.
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Match all of `text` against `definition`, read as the production `context` when given.
///
/// `Err` means the definition is malformed; `Ok(None)` means the text does not match.
pub fn parse_grammar(
    text: &str,
    definition: &str,
    context: Option<&str>,
) -> Result<Option<Match>, DefinitionError> {
    DEFAULT_ENGINE.parse_grammar(text, definition, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let matched = parse_grammar("B  a", "a && b", None).unwrap().unwrap();
        assert_eq!(serialize_component_value(&matched), "a b");
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Engine>();
    }
}
