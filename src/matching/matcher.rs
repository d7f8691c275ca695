//! The backtracking matcher.
//!
//! Every combinator is a function of a grammar node, a cursor, a context frame and a
//! continuation `k`. A node that matches calls `k` with the cursor after it and its match;
//! whatever `k` returns is the result of the whole attempt. When `k` fails, the node tries
//! its next way of matching (another alternative, one repetition fewer, a different
//! permutation order) and calls `k` again. Failure therefore propagates to exactly the
//! choice points that can still change something, which is what lets `[a | a a | a a a] a`
//! accept four `a`s: the alternation retries until its continuation is satisfied.
//!
//! Cursors are `Copy`, so there is nothing to restore on failure. The only mutable state is
//! the slot buffer a sequence, repetition or permutation is filling, and each attempt pops
//! what it pushed before returning.
//!
//! Continuations nest, so the native stack grows with every token consumed, not only with
//! grammar depth. [Matcher::match_grammar] moves onto a fresh heap-allocated stack segment
//! whenever the remaining stack runs low.

use std::iter;

use super::context::Context;
use super::engine::{CacheKey, GrammarCache};
use super::primitives::{self, Primitive};
use super::result::{Match, Separator, Value};
use crate::calc::{self, is_math_function, Expected, RandomSource};
use crate::definition::{
    ArbitraryKind, BlockKind, Grammar, NonTerminal, NumericRange, Repetition, RepetitionDefaults,
    TokenPattern,
};
use crate::limits::Limits;
use crate::registry::{property_key, Registry};
use crate::token::{Cursor, Token, TokenKind};

/// The continuation of a match attempt.
pub type Next<'k, 't> = dyn FnMut(Cursor<'t>, Match) -> Option<Match> + 'k;

/// Stack left before a new segment is allocated.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each new stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// How an opaque run of tokens ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawMode {
    /// Stops before a top-level `;` or `!`.
    DeclarationValue,
    AnyValue,
    /// May be empty.
    Contents,
}

pub struct Matcher<'e> {
    registry: &'e dyn Registry,
    grammars: &'e GrammarCache,
    limits: &'e Limits,
    random: &'e dyn RandomSource,
}

impl<'e> Matcher<'e> {
    pub fn new(
        registry: &'e dyn Registry,
        grammars: &'e GrammarCache,
        limits: &'e Limits,
        random: &'e dyn RandomSource,
    ) -> Self {
        Self {
            registry,
            grammars,
            limits,
            random,
        }
    }

    /// Match `grammar` against all of `tokens`.
    pub fn match_all(&self, grammar: &Grammar, tokens: &[Token], ctx: &Context<'_>) -> Option<Match> {
        let mut at_end = |rest: Cursor<'_>, matched: Match| rest.is_at_end().then_some(matched);
        self.match_grammar(grammar, Cursor::new(tokens), ctx, &mut at_end)
    }

    pub fn match_grammar<'t>(
        &self,
        grammar: &Grammar,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.match_node(grammar, cursor, ctx, k)
        })
    }

    fn match_node<'t>(
        &self,
        grammar: &Grammar,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        match grammar {
            Grammar::Token(pattern) => {
                let (value, after) = token_value(*pattern, cursor)?;
                k(after, Match::literal(value))
            }
            Grammar::Keyword(word) => {
                let (token, after) = cursor.next_token()?;
                if !token.is_ident(word) {
                    return None;
                }
                k(after, Match::literal(Value::Keyword(word.clone())))
            }
            Grammar::NonTerminal(non_terminal) => {
                self.match_non_terminal(non_terminal, cursor, ctx, k)
            }
            Grammar::Property(name) => {
                let key = property_key(name);
                self.expand(&key, &key, None, cursor, ctx, k)
            }
            Grammar::Function { name, body } => {
                let (token, inside) = cursor.next_token()?;
                match token {
                    Token::Function(found) if found.eq_ignore_ascii_case(name) => {}
                    _ => return None,
                }
                let mut wrap = |after: Cursor<'t>, value: Match| {
                    k(
                        after,
                        Match::Function {
                            name: name.to_ascii_lowercase(),
                            value: Box::new(value),
                        },
                    )
                };
                self.match_enclosed(body.as_deref(), inside, &Token::CloseParen, ctx, &mut wrap)
            }
            Grammar::Block { kind, body } => {
                let (open, close) = brackets(*kind);
                let (token, inside) = cursor.next_token()?;
                if *token != open {
                    return None;
                }
                let mut wrap = |after: Cursor<'t>, value: Match| {
                    k(
                        after,
                        Match::Block {
                            kind: *kind,
                            value: Box::new(value),
                        },
                    )
                };
                self.match_enclosed(body.as_deref(), inside, &close, ctx, &mut wrap)
            }
            Grammar::Arbitrary(ArbitraryKind::DeclarationValue) => {
                match_raw(RawMode::DeclarationValue, cursor, k)
            }
            Grammar::Arbitrary(ArbitraryKind::AnyValue) => match_raw(RawMode::AnyValue, cursor, k),
            Grammar::BlockContents | Grammar::Forgiving(_) => {
                match_raw(RawMode::Contents, cursor, k)
            }
            Grammar::Sequence(items) => {
                self.match_sequence(items, cursor, ctx, &mut Vec::with_capacity(items.len()), None, k)
            }
            Grammar::Permutation(items) => {
                self.match_unordered(items, cursor, ctx, &mut vec![None; items.len()], false, k)
            }
            Grammar::Arrangement(items) => {
                self.match_unordered(items, cursor, ctx, &mut vec![None; items.len()], true, k)
            }
            Grammar::Alternation(items) => {
                for item in items {
                    if let Some(found) = self.match_grammar(item, cursor, ctx, k) {
                        return Some(found);
                    }
                }
                None
            }
            Grammar::Optional(inner) => {
                if let Some(found) = self.match_grammar(inner, cursor, ctx, k) {
                    return Some(found);
                }
                k(cursor, Match::Omitted)
            }
            Grammar::Required(inner) => {
                let mut present = |after: Cursor<'t>, matched: Match| {
                    if matched.is_present() {
                        k(after, matched)
                    } else {
                        None
                    }
                };
                self.match_grammar(inner, cursor, ctx, &mut present)
            }
            Grammar::Repetition(repetition) => {
                self.match_repetition(repetition, cursor, ctx, &mut Vec::new(), k)
            }
        }
    }

    /// The body of a function or block, then its closing token. A missing close at the end
    /// of the input is accepted.
    fn match_enclosed<'t>(
        &self,
        body: Option<&Grammar>,
        inside: Cursor<'t>,
        close: &Token,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        let mut closed = |rest: Cursor<'t>, value: Match| match rest.next_token() {
            Some((token, after)) if token == close => k(after, value),
            Some(_) => None,
            None => k(rest, value),
        };
        match body {
            Some(body) => self.match_grammar(body, inside, ctx, &mut closed),
            None => closed(inside, Match::Omitted),
        }
    }

    /// Match `items[acc.len()..]`, with `acc` holding the slots matched so far.
    ///
    /// A comma is not consumed where it stands. It becomes pending, and is only consumed in
    /// front of the next present component; if every component after it is omitted, it is
    /// elided. A comma with nothing present before it in the list (the cursor still opens
    /// the value, a function, a block or a comma-separated item) is elided outright.
    fn match_sequence<'t>(
        &self,
        items: &[Grammar],
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        acc: &mut Vec<Match>,
        pending: Option<usize>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        let index = acc.len();
        let Some(item) = items.get(index) else {
            return k(
                cursor,
                Match::List {
                    items: acc.clone(),
                    separator: Separator::Space,
                },
            );
        };

        if item.is_comma() {
            let elided = cursor.opens_list();
            let pending = match pending {
                Some(slot) => Some(slot),
                None if elided => None,
                None => Some(index),
            };
            acc.push(Match::Omitted);
            let found = self.match_sequence(items, cursor, ctx, acc, pending, k);
            acc.pop();
            return found;
        }

        let Some(slot) = pending else {
            let mut rest = |after: Cursor<'t>, matched: Match| {
                acc.push(matched);
                let found = self.match_sequence(items, after, ctx, acc, None, k);
                acc.pop();
                found
            };
            return self.match_grammar(item, cursor, ctx, &mut rest);
        };

        // The pending comma is consumed here, in front of a present component...
        if let Some((_, after_comma)) = token_value(TokenPattern::Comma, cursor) {
            let mut rest = |after: Cursor<'t>, matched: Match| {
                if !matched.is_present() {
                    return None;
                }
                acc[slot] = Match::literal(Value::Delim(','));
                acc.push(matched);
                let found = self.match_sequence(items, after, ctx, acc, None, k);
                acc.pop();
                acc[slot] = Match::Omitted;
                found
            };
            if let Some(found) = self.match_grammar(item, after_comma, ctx, &mut rest) {
                return Some(found);
            }
        }

        // ...or stays pending across an omitted one.
        let mut rest = |after: Cursor<'t>, matched: Match| {
            if matched.is_present() || !after.same_significant_position(&cursor) {
                return None;
            }
            acc.push(matched);
            let found = self.match_sequence(items, after, ctx, acc, pending, k);
            acc.pop();
            found
        };
        self.match_grammar(item, cursor, ctx, &mut rest)
    }

    /// `&&` and `||`: fill the slots in any order, one per component. With `partial`, any
    /// non-empty subset will do.
    fn match_unordered<'t>(
        &self,
        items: &[Grammar],
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        slots: &mut Vec<Option<Match>>,
        partial: bool,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        for (index, item) in items.iter().enumerate() {
            if slots[index].is_some() {
                continue;
            }
            let mut rest = |after: Cursor<'t>, matched: Match| {
                if partial && !matched.is_present() {
                    return None;
                }
                slots[index] = Some(matched);
                let found = self.match_unordered(items, after, ctx, slots, partial, k);
                slots[index] = None;
                found
            };
            if let Some(found) = self.match_grammar(item, cursor, ctx, &mut rest) {
                return Some(found);
            }
        }

        let filled = slots.iter().filter(|slot| slot.is_some()).count();
        let complete = if partial {
            filled > 0
        } else {
            filled == items.len()
        };
        if !complete {
            return None;
        }
        let items = slots
            .iter()
            .map(|slot| slot.clone().unwrap_or(Match::Omitted))
            .collect();
        k(
            cursor,
            Match::List {
                items,
                separator: Separator::Space,
            },
        )
    }

    /// Greedy: one more item is always tried before stopping.
    fn match_repetition<'t>(
        &self,
        repetition: &Repetition,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        acc: &mut Vec<Match>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        let count = acc.len() as u32;
        if count < repetition.max {
            let item_start = match repetition.separator {
                Some(separator) if count > 0 => {
                    token_value(separator, cursor).map(|(_, after)| after)
                }
                _ => Some(cursor),
            };
            if let Some(item_start) = item_start {
                let mut rest = |after: Cursor<'t>, matched: Match| {
                    // An empty item past the minimum would only repeat forever.
                    if count >= repetition.min && after.same_significant_position(&cursor) {
                        return None;
                    }
                    acc.push(matched);
                    let found = self.match_repetition(repetition, after, ctx, acc, k);
                    acc.pop();
                    found
                };
                if let Some(found) = self.match_grammar(&repetition.inner, item_start, ctx, &mut rest)
                {
                    return Some(found);
                }
            }
        }

        if count < repetition.min {
            return None;
        }
        let separator = match repetition.separator {
            Some(_) => Separator::Comma,
            None => Separator::Space,
        };
        k(
            cursor,
            Match::List {
                items: acc.clone(),
                separator,
            },
        )
    }

    fn match_non_terminal<'t>(
        &self,
        non_terminal: &NonTerminal,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        let name = non_terminal.name.as_str();
        if name == "test" {
            let Some((parameter, scope)) = ctx.parameter_scope() else {
                log::trace!("<test> outside of a parametric production");
                return None;
            };
            return self.match_grammar(parameter, cursor, scope, k);
        }

        match Primitive::from_name(name) {
            Some(primitive) if primitive.is_numeric() => {
                self.match_numeric(primitive, non_terminal, cursor, ctx, k)
            }
            Some(primitive) => {
                let (value, after) = primitives::literal(primitive, cursor)?;
                k(after, Match::leaf(value, name))
            }
            None => self.expand(
                name,
                name,
                non_terminal.parameter.as_deref(),
                cursor,
                ctx,
                k,
            ),
        }
    }

    /// A numeric primitive: a literal token, or a math function whose resolved type fits.
    fn match_numeric<'t>(
        &self,
        primitive: Primitive,
        non_terminal: &NonTerminal,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        let name = non_terminal.name.as_str();
        let range = non_terminal.range.as_ref();
        let (token, after) = cursor.next_token()?;

        if let Token::Function(function) = token {
            if !is_math_function(function) {
                return None;
            }
            let expected = Expected::for_production(name)?;
            let mut resolved = |after: Cursor<'t>, matched: Match| {
                let mut value = calc::resolve(&matched, expected, self.limits, self.random)?;
                if primitive == Primitive::Integer {
                    value = value.rounded();
                }
                if !in_range(range, value.canonical_value()) {
                    log::trace!("{function}() resolves outside the range of <{name}>");
                    return None;
                }
                k(after, Match::leaf(Value::Calc(value), name))
            };
            return self.expand("math-function", "math-function", None, cursor, ctx, &mut resolved);
        }

        let (value, canonical) = primitives::numeric(primitive, token)?;
        if !in_range(range, canonical) {
            return None;
        }
        k(after, Match::leaf(value, name))
    }

    /// Match the registered grammar of `key` in a new context frame for `production`, and
    /// tag the result with it.
    fn expand<'t>(
        &self,
        key: &str,
        production: &str,
        parameter: Option<&Grammar>,
        cursor: Cursor<'t>,
        ctx: &Context<'_>,
        k: &mut Next<'_, 't>,
    ) -> Option<Match> {
        if ctx.depth() >= self.limits.max_context_depth {
            log::trace!(
                "context depth {} reached expanding <{production}>",
                self.limits.max_context_depth
            );
            return None;
        }
        let Some(definition) = self.registry.lookup(key) else {
            log::trace!("no grammar registered for {key}");
            return None;
        };

        let chain = iter::once(production).chain(ctx.productions());
        let defaults = RepetitionDefaults::for_productions(chain, self.limits);
        let grammar = match self.grammars.get_or_compile(
            CacheKey::Production(key.to_string()),
            &definition.syntax,
            defaults,
        ) {
            Ok(grammar) => grammar,
            Err(error) => {
                log::debug!("definition of {key} does not compile: {error}");
                return None;
            }
        };

        let frame = ctx.push(production, parameter);
        let mut tagged = |after: Cursor<'t>, matched: Match| k(after, matched.tagged(production));
        self.match_grammar(&grammar, cursor, &frame, &mut tagged)
    }
}

/// Read a literal token pattern at the cursor.
///
/// `+` and `-` only match with whitespace on both sides, so that `1 -2` is two numbers and
/// never a subtraction.
fn token_value(pattern: TokenPattern, cursor: Cursor<'_>) -> Option<(Value, Cursor<'_>)> {
    if pattern == TokenPattern::Kind(TokenKind::Whitespace) {
        let (token, after) = cursor.next_raw()?;
        return token
            .is_whitespace()
            .then(|| (Value::Token(token.clone()), after));
    }

    let start = cursor.skip_whitespace();
    let (token, after) = start.next_token()?;
    let value = match (pattern, token) {
        (TokenPattern::Comma, Token::Comma) => Value::Delim(','),
        (TokenPattern::Colon, Token::Colon) => Value::Delim(':'),
        (TokenPattern::Semicolon, Token::Semicolon) => Value::Delim(';'),
        (TokenPattern::Delim(expected @ ('+' | '-')), Token::Delim(found)) if expected == *found => {
            let spaced =
                start.follows_whitespace() && after.peek_raw().is_some_and(Token::is_whitespace);
            if !spaced {
                log::trace!("'{expected}' without surrounding whitespace");
                return None;
            }
            Value::Delim(expected)
        }
        (TokenPattern::Delim(expected), Token::Delim(found)) if expected == *found => {
            Value::Delim(expected)
        }
        (TokenPattern::Kind(kind), token) if token.kind() == Some(kind) => {
            Value::Token(token.clone())
        }
        _ => return None,
    };
    Some((value, after))
}

/// An opaque run of tokens: balanced brackets, no bad tokens. Every top-level token
/// boundary is a candidate end; the longest is offered first.
fn match_raw<'t>(mode: RawMode, cursor: Cursor<'t>, k: &mut Next<'_, 't>) -> Option<Match> {
    let start = cursor.skip_whitespace();
    let mut ends = Vec::new();
    if mode == RawMode::Contents {
        ends.push(start);
    }

    let mut closers: Vec<Token> = Vec::new();
    let mut position = start;
    while let Some((token, next)) = position.next_raw() {
        if token.is_bad() {
            break;
        }
        if token.is_closing() {
            if closers.last() != Some(token) {
                break;
            }
            closers.pop();
        } else if closers.is_empty()
            && mode == RawMode::DeclarationValue
            && matches!(token, Token::Semicolon | Token::Delim('!'))
        {
            break;
        } else if let Some(close) = token.closing() {
            closers.push(close);
        }
        position = next;
        if closers.is_empty() && !token.is_whitespace() {
            ends.push(position);
        }
    }
    // Blocks left open by the end of the input close there.
    if !closers.is_empty() && position.peek_raw().is_none() {
        ends.push(position);
    }

    ends.into_iter().rev().find_map(|end| {
        let raw = start.slice_to(&end).to_vec();
        k(end, Match::literal(Value::Raw(raw)))
    })
}

fn brackets(kind: BlockKind) -> (Token, Token) {
    match kind {
        BlockKind::Paren => (Token::OpenParen, Token::CloseParen),
        BlockKind::Square => (Token::OpenSquare, Token::CloseSquare),
        BlockKind::Curly => (Token::OpenCurly, Token::CloseCurly),
    }
}

fn in_range(range: Option<&NumericRange>, value: Option<f64>) -> bool {
    match (range, value) {
        (Some(range), Some(value)) => range.contains(value),
        _ => true,
    }
}
