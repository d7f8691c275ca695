//! Matching token streams against compiled grammars.
//!
//!     [Engine] is the entry point: it owns the registry, the limits and the grammar cache,
//!     and hands out a [Matcher] per call. The matcher walks the grammar with full
//!     backtracking ([matcher]), expanding non-terminals either through closed-form
//!     primitive parsers ([primitives], [anb], [colors]) or through the registry, in a new
//!     [Context] frame.
//!
//!     The result is a [Match] tree ([result]); nothing in it refers back to the tokens.

pub mod anb;
pub mod colors;
pub mod context;
pub mod engine;
pub mod matcher;
pub mod primitives;
pub mod result;

pub use context::Context;
pub use engine::{CacheKey, Engine, GrammarCache};
pub use matcher::Matcher;
pub use primitives::{Primitive, CSS_WIDE_KEYWORDS};
pub use result::{Match, Separator, Value};
