//! The engine: a registry, limits, a random source and a cache of compiled grammars.

use std::collections::HashMap;
use std::iter;
use std::sync::{Arc, PoisonError, RwLock};

use super::context::Context;
use super::matcher::Matcher;
use super::primitives::CSS_WIDE_KEYWORDS;
use super::result::{Match, Value};
use crate::calc::{HashedRandom, RandomSource};
use crate::definition::{parse_definition, Grammar, RepetitionDefaults};
use crate::error::{DefinitionError, Error};
use crate::limits::Limits;
use crate::registry::{property_key, Registry, StandardRegistry};
use crate::serialize::serialize_match;
use crate::token::{tokenize, Token};

/// What a compiled grammar was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A registry entry, by registry key.
    Production(String),
    /// Definition text supplied by a caller.
    Definition(String),
}

/// Compiled grammars keyed by source and repetition defaults.
///
/// The same production compiles differently under different enclosing productions, so the
/// defaults are part of the key.
#[derive(Debug, Default)]
pub struct GrammarCache {
    grammars: RwLock<HashMap<(CacheKey, RepetitionDefaults), Arc<Grammar>>>,
}

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled grammar for `key`, compiling `syntax` on a miss.
    pub fn get_or_compile(
        &self,
        key: CacheKey,
        syntax: &str,
        defaults: RepetitionDefaults,
    ) -> Result<Arc<Grammar>, DefinitionError> {
        let cache_key = (key, defaults);
        let cached = self
            .grammars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key)
            .cloned();
        if let Some(grammar) = cached {
            return Ok(grammar);
        }

        log::debug!("compiling {:?} with {:?}", cache_key.0, defaults);
        let grammar = Arc::new(parse_definition(syntax, defaults)?);
        self.grammars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, Arc::clone(&grammar));
        Ok(grammar)
    }

    pub fn len(&self) -> usize {
        self.grammars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry point for compiling definitions and matching values.
///
/// An engine is `Sync`: the registry and compiled grammars are read-only, the cache is
/// behind a lock, and every match works on its own cursor and result tree.
pub struct Engine<R: Registry = StandardRegistry> {
    registry: R,
    limits: Limits,
    random: Arc<dyn RandomSource>,
    grammars: GrammarCache,
}

impl Default for Engine<StandardRegistry> {
    fn default() -> Self {
        Self::new(StandardRegistry)
    }
}

impl<R: Registry> Engine<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            limits: Limits::default(),
            random: Arc::new(HashedRandom::default()),
            grammars: GrammarCache::new(),
        }
    }

    /// Replace the limits. Grammars compiled so far are dropped, since their repetition
    /// bounds came from the old limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self.grammars = GrammarCache::new();
        self
    }

    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn grammars(&self) -> &GrammarCache {
        &self.grammars
    }

    /// Compile definition text, as the production `context` when given.
    pub fn parse_definition(
        &self,
        definition: &str,
        context: Option<&str>,
    ) -> Result<Arc<Grammar>, DefinitionError> {
        let defaults = RepetitionDefaults::for_productions(context.into_iter(), &self.limits);
        self.grammars
            .get_or_compile(CacheKey::Definition(definition.to_string()), definition, defaults)
    }

    /// Match the whole of `tokens` against `grammar`.
    pub fn match_tokens(
        &self,
        tokens: &[Token],
        grammar: &Grammar,
        context: Option<&str>,
    ) -> Option<Match> {
        self.matcher()
            .match_all(grammar, tokens, &Context::root(context))
    }

    /// Compile `definition` and match the whole of `text` against it.
    ///
    /// `Err` means the definition is malformed; `Ok(None)` means the text does not match.
    pub fn parse_grammar(
        &self,
        text: &str,
        definition: &str,
        context: Option<&str>,
    ) -> Result<Option<Match>, DefinitionError> {
        let grammar = self.parse_definition(definition, context)?;
        let tokens = tokenize(text);
        Ok(self.match_tokens(&tokens, &grammar, context))
    }

    /// Match `text` against the registered grammar of `property`. The CSS-wide keywords are
    /// accepted for every property.
    pub fn parse_property_value(&self, property: &str, text: &str) -> Result<Option<Match>, Error> {
        let key = property_key(property);
        let definition = self
            .registry
            .lookup(&key)
            .ok_or_else(|| Error::UnknownProperty(property.to_string()))?;

        let tokens = tokenize(text);
        if let Some(keyword) = css_wide_keyword(&tokens) {
            return Ok(Some(Match::leaf(
                Value::Keyword(keyword.to_string()),
                "css-wide-keyword",
            )));
        }

        let defaults = RepetitionDefaults::for_productions(iter::once(key.as_str()), &self.limits);
        let grammar = self.grammars.get_or_compile(
            CacheKey::Production(key.clone()),
            &definition.syntax,
            defaults,
        )?;
        Ok(self
            .matcher()
            .match_all(&grammar, &tokens, &Context::root(Some(&key))))
    }

    /// Serialize a match with this engine's precision.
    pub fn serialize(&self, matched: &Match) -> String {
        serialize_match(matched, self.limits.precision)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.registry, &self.grammars, &self.limits, self.random.as_ref())
    }
}

/// The CSS-wide keyword that makes up all of `tokens`, if any.
fn css_wide_keyword(tokens: &[Token]) -> Option<&'static str> {
    let mut significant = tokens.iter().filter(|token| !token.is_whitespace());
    let (Some(Token::Ident(name)), None) = (significant.next(), significant.next()) else {
        return None;
    };
    CSS_WIDE_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| keyword.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Definition, MapRegistry};

    #[test]
    fn test_definitions_are_cached() {
        let engine = Engine::new(StandardRegistry);
        let first = engine.parse_definition("a | b", None).unwrap();
        let second = engine.parse_definition("a | b", None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.grammars().len(), 1);
    }

    #[test]
    fn test_same_text_compiles_per_context() {
        let engine = Engine::new(StandardRegistry);
        let top = engine.parse_definition("a*", None).unwrap();
        let under_calc = engine.parse_definition("a*", Some("calc-sum")).unwrap();
        assert_ne!(top, under_calc);
    }

    #[test]
    fn test_malformed_definition_is_an_error() {
        let engine = Engine::new(StandardRegistry);
        assert!(engine.parse_grammar("a", "a &&", None).is_err());
    }

    #[test]
    fn test_unknown_property() {
        let engine = Engine::new(StandardRegistry);
        assert_eq!(
            engine.parse_property_value("no-such-thing", "1px"),
            Err(Error::UnknownProperty("no-such-thing".into()))
        );
    }

    #[test]
    fn test_css_wide_keywords() {
        let engine = Engine::new(
            MapRegistry::new().with_property("gap", Definition::new("<length>")),
        );
        let matched = engine
            .parse_property_value("gap", " INHERIT ")
            .unwrap()
            .unwrap();
        assert_eq!(matched.types(), ["css-wide-keyword"]);
        assert_eq!(matched.value(), Some(&Value::Keyword("inherit".into())));
        let inherit_plus = engine.parse_property_value("gap", "inherit 1px").unwrap();
        assert_eq!(inherit_plus, None);
    }

    #[test]
    fn test_serialize_uses_precision() {
        let limits = Limits {
            precision: 2,
            ..Limits::default()
        };
        let engine = Engine::new(StandardRegistry).with_limits(limits);
        let matched = engine
            .parse_grammar("0.123456", "<number>", None)
            .unwrap()
            .unwrap();
        assert_eq!(engine.serialize(&matched), "0.12");
    }
}
