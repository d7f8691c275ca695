//! Parser for value definition text using chumsky.
//!
//! The parser consumes the [DefToken] stream and builds a [Grammar]. Precedence, from
//! tightest to loosest:
//!
//!     Multipliers:
//!         `?`, `*`, `+`, `#`, `#{m,n}`, `{m,n}` and `!` attach to the atom or bracketed
//!         group immediately before them, and stack left to right (`<x>+#`).
//!
//!     Juxtaposition:
//!         Adjacent terms form a sequence.
//!
//!     Combinators:
//!         `&&`, `||` and `|` join sequences. One nesting level holds a single kind of
//!         combinator; `a && b | c` must be written with brackets.
//!
//! Unbounded multipliers get their upper bound from the [RepetitionDefaults] the parser is
//! built with, so the resulting tree never carries an open-ended repetition.

use chumsky::prelude::*;
use chumsky::Stream;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::defaults::RepetitionDefaults;
use super::grammar::{
    ArbitraryKind, BlockKind, Grammar, NonTerminal, NumericRange, Repetition, RepetitionNotation,
    TokenPattern,
};
use super::lexer::{tokenize_definition, Bounds, DefToken};
use crate::calc::units;
use crate::error::DefinitionError;
use crate::token::TokenKind;

/// Type alias for parser error
pub(crate) type ParserError = Simple<DefToken>;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?-?[a-zA-Z_][a-zA-Z0-9_\-]*$").expect("identifier pattern"));

static RANGE_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:[eE][+\-]?[0-9]+)?)([a-zA-Z%]*)$")
        .expect("range bound pattern")
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Multiplier {
    Optional,
    Star,
    Plus,
    Hash(Option<Bounds>),
    Required,
    Range(Bounds),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    All,
    Any,
    One,
}

impl Combinator {
    fn symbol(self) -> &'static str {
        match self {
            Combinator::All => "&&",
            Combinator::Any => "||",
            Combinator::One => "|",
        }
    }

    fn build(self, items: Vec<Grammar>) -> Grammar {
        match self {
            Combinator::All => Grammar::Permutation(items),
            Combinator::Any => Grammar::Arrangement(items),
            Combinator::One => Grammar::Alternation(items),
        }
    }
}

/// A parsed range bound, kept with its source text.
#[derive(Debug, Clone)]
struct Bound {
    written: String,
    value: f64,
    base: Option<units::BaseType>,
}

fn unexpected(span: Range<usize>, token: DefToken) -> ParserError {
    Simple::expected_input_found(span, Vec::new(), Some(token))
}

fn token(expected: DefToken) -> impl Parser<DefToken, DefToken, Error = ParserError> + Clone {
    just(expected)
}

/// Parse definition text into a grammar, baking `defaults` into unbounded repetitions.
pub fn parse_definition(
    source: &str,
    defaults: RepetitionDefaults,
) -> Result<Grammar, DefinitionError> {
    let tokens = tokenize_definition(source)?;
    if tokens.is_empty() {
        return Err(DefinitionError::Empty);
    }

    let eoi = source.len();
    let stream = Stream::from_iter(eoi..eoi + 1, tokens.into_iter());

    definition(defaults)
        .then_ignore(end())
        .parse(stream)
        .map_err(|errors| convert_error(errors, eoi))
}

/// The full definition grammar, without the end-of-input anchor.
fn definition(
    defaults: RepetitionDefaults,
) -> impl Parser<DefToken, Grammar, Error = ParserError> + Clone {
    recursive(move |group| {
        let keyword = filter_map(|span, token| match token {
            DefToken::Keyword(name) => Ok(Grammar::Keyword(name.to_ascii_lowercase())),
            other => Err(unexpected(span, other)),
        });

        let delimiter = filter_map(|span, token| match token {
            DefToken::Comma => Ok(Grammar::Token(TokenPattern::Comma)),
            DefToken::Slash => Ok(Grammar::Token(TokenPattern::Delim('/'))),
            DefToken::Colon => Ok(Grammar::Token(TokenPattern::Colon)),
            DefToken::Semicolon => Ok(Grammar::Token(TokenPattern::Semicolon)),
            DefToken::Equals => Ok(Grammar::Token(TokenPattern::Delim('='))),
            other => Err(unexpected(span, other)),
        });

        let literal = filter_map(|span: Range<usize>, token| match token {
            DefToken::Literal(text) => literal_grammar(&text).ok_or_else(|| {
                Simple::custom(span, format!("'{text}' cannot be used as a literal"))
            }),
            other => Err(unexpected(span, other)),
        });

        let non_terminal = filter_map(|span: Range<usize>, token| match token {
            DefToken::NonTerminal(name) => special_non_terminal(&name, None, None)
                .map_err(|message| Simple::custom(span, message)),
            other => Err(unexpected(span, other)),
        });

        let property = filter_map(|span, token| match token {
            DefToken::Property(name) => Ok(Grammar::Property(name.to_ascii_lowercase())),
            other => Err(unexpected(span, other)),
        });

        let bound = filter_map(|span, token| match token {
            DefToken::Number(text) => Ok(text),
            DefToken::Infinity(true) => Ok("-∞".to_string()),
            DefToken::Infinity(false) => Ok("∞".to_string()),
            other => Err(unexpected(span, other)),
        });

        let range = bound
            .clone()
            .then_ignore(token(DefToken::Comma))
            .then(bound)
            .delimited_by(token(DefToken::OpenBracket), token(DefToken::CloseBracket))
            .map(Argument::Range);

        let parameter = group
            .clone()
            .delimited_by(token(DefToken::OpenBracket), token(DefToken::CloseBracket))
            .map(|grammar| Argument::Parameter(Box::new(grammar)));

        let open_non_terminal = filter_map(|span, token| match token {
            DefToken::NonTerminalOpen(name) => Ok(name),
            other => Err(unexpected(span, other)),
        })
        .then(range.or(parameter))
        .then_ignore(token(DefToken::AngleClose))
        .try_map(|(name, argument), span: Range<usize>| {
            let result = match argument {
                Argument::Range((min, max)) => ranged_non_terminal(&name, &min, &max),
                Argument::Parameter(parameter) => {
                    special_non_terminal(&name, None, Some(parameter))
                }
            };
            result.map_err(|message| Simple::custom(span, message))
        });

        let function = filter_map(|span, token| match token {
            DefToken::Function(name) => Ok(name.to_ascii_lowercase()),
            other => Err(unexpected(span, other)),
        })
        .then(group.clone().or_not())
        .then_ignore(token(DefToken::CloseParen))
        .map(|(name, body)| Grammar::Function {
            name,
            body: body.map(Box::new),
        });

        let block = |kind: BlockKind, open: DefToken, close: DefToken| {
            group
                .clone()
                .or_not()
                .delimited_by(token(open), token(close))
                .map(move |body| Grammar::Block {
                    kind,
                    body: body.map(Box::new),
                })
        };

        let bracketed = group
            .clone()
            .delimited_by(token(DefToken::OpenBracket), token(DefToken::CloseBracket));

        let atom = choice((
            bracketed,
            function,
            block(BlockKind::Paren, DefToken::OpenParen, DefToken::CloseParen),
            block(
                BlockKind::Paren,
                DefToken::Literal("(".into()),
                DefToken::Literal(")".into()),
            ),
            block(
                BlockKind::Square,
                DefToken::Literal("[".into()),
                DefToken::Literal("]".into()),
            ),
            block(
                BlockKind::Curly,
                DefToken::Literal("{".into()),
                DefToken::Literal("}".into()),
            ),
            keyword,
            non_terminal,
            open_non_terminal,
            property,
            literal,
            delimiter,
        ));

        let bounds = filter_map(|span, token| match token {
            DefToken::Bounds(bounds) => Ok(bounds),
            other => Err(unexpected(span, other)),
        });

        let multiplier = choice((
            token(DefToken::Question).to(Multiplier::Optional),
            token(DefToken::Star).to(Multiplier::Star),
            token(DefToken::Plus).to(Multiplier::Plus),
            token(DefToken::Hash)
                .ignore_then(bounds.clone().or_not())
                .map(Multiplier::Hash),
            token(DefToken::Bang).to(Multiplier::Required),
            bounds.map(Multiplier::Range),
        ))
        .map_with_span(|multiplier, span| (multiplier, span));

        let term = atom
            .then(multiplier.repeated())
            .try_map(move |(atom, multipliers), _| {
                multipliers
                    .into_iter()
                    .try_fold(atom, |grammar, (multiplier, span)| {
                        apply_multiplier(grammar, multiplier, defaults)
                            .map_err(|message| Simple::custom(span, message))
                    })
            });

        let sequence = term.repeated().at_least(1).map(|mut items| {
            if items.len() == 1 {
                items.remove(0)
            } else {
                Grammar::Sequence(items)
            }
        });

        let combinator = choice((
            token(DefToken::AndAnd).to(Combinator::All),
            token(DefToken::OrOr).to(Combinator::Any),
            token(DefToken::Bar).to(Combinator::One),
        ))
        .map_with_span(|combinator, span| (combinator, span));

        sequence
            .clone()
            .then(combinator.then(sequence).repeated())
            .try_map(|(first, rest), _| {
                let Some(((kind, _), _)) = rest.first() else {
                    return Ok(first);
                };
                let kind = *kind;
                let mut items = Vec::with_capacity(rest.len() + 1);
                items.push(first);
                for ((other, span), item) in rest {
                    if other != kind {
                        return Err(Simple::custom(
                            span,
                            format!(
                                "'{}' and '{}' cannot be mixed without brackets",
                                kind.symbol(),
                                other.symbol()
                            ),
                        ));
                    }
                    items.push(item);
                }
                Ok(kind.build(items))
            })
    })
}

#[derive(Debug, Clone)]
enum Argument {
    Range((String, String)),
    Parameter(Box<Grammar>),
}

/// A quoted literal: single characters are delimiter tokens, longer text is a keyword.
fn literal_grammar(text: &str) -> Option<Grammar> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => match c {
            '(' | ')' | '[' | ']' | '{' | '}' => None,
            ',' => Some(Grammar::Token(TokenPattern::Comma)),
            ':' => Some(Grammar::Token(TokenPattern::Colon)),
            ';' => Some(Grammar::Token(TokenPattern::Semicolon)),
            c if c.is_ascii_alphabetic() => {
                Some(Grammar::Keyword(c.to_ascii_lowercase().to_string()))
            }
            c => Some(Grammar::Token(TokenPattern::Delim(c))),
        },
        (Some(_), Some(_)) if IDENTIFIER.is_match(text) => {
            Some(Grammar::Keyword(text.to_ascii_lowercase()))
        }
        _ => None,
    }
}

/// Map the names with built-in meaning to their dedicated grammar nodes.
fn special_non_terminal(
    name: &str,
    range: Option<NumericRange>,
    parameter: Option<Box<Grammar>>,
) -> Result<Grammar, String> {
    let plain = range.is_none() && parameter.is_none();

    if let Some(marker) = name.strip_suffix("-token") {
        return match TokenKind::from_marker(marker) {
            Some(kind) if plain => Ok(Grammar::Token(TokenPattern::Kind(kind))),
            Some(_) => Err(format!("<{name}> takes no arguments")),
            None => Err(format!("unknown token marker <{name}>")),
        };
    }

    let special = match name {
        "declaration-value" => Some(Grammar::Arbitrary(ArbitraryKind::DeclarationValue)),
        "any-value" => Some(Grammar::Arbitrary(ArbitraryKind::AnyValue)),
        "block-contents" => Some(Grammar::BlockContents),
        _ if name.starts_with("forgiving-") => Some(Grammar::Forgiving(name.to_string())),
        _ => None,
    };

    match special {
        Some(grammar) if plain => Ok(grammar),
        Some(_) => Err(format!("<{name}> takes no arguments")),
        None => Ok(Grammar::NonTerminal(NonTerminal {
            name: name.to_string(),
            range,
            parameter,
        })),
    }
}

fn parse_bound(text: &str) -> Result<Bound, String> {
    match text {
        "∞" => {
            return Ok(Bound {
                written: text.to_string(),
                value: f64::INFINITY,
                base: None,
            })
        }
        "-∞" => {
            return Ok(Bound {
                written: text.to_string(),
                value: f64::NEG_INFINITY,
                base: None,
            })
        }
        _ => {}
    }

    let captures = RANGE_BOUND
        .captures(text)
        .ok_or_else(|| format!("invalid range bound {text}"))?;
    let number: f64 = captures[1]
        .parse()
        .map_err(|_| format!("invalid range bound {text}"))?;
    let unit = &captures[2];

    if unit.is_empty() {
        return Ok(Bound {
            written: text.to_string(),
            value: number,
            base: None,
        });
    }

    let (value, base) = units::to_canonical(number, unit)
        .ok_or_else(|| format!("unknown unit '{unit}' in range bound {text}"))?;
    Ok(Bound {
        written: text.to_string(),
        value,
        base: Some(base),
    })
}

/// Build `<name [min,max]>`, converting unit-bearing bounds to the canonical unit of the
/// production's type.
fn ranged_non_terminal(name: &str, min: &str, max: &str) -> Result<Grammar, String> {
    let min = parse_bound(min)?;
    let max = parse_bound(max)?;
    let expected = units::BaseType::for_production(name);
    for bound in [&min, &max] {
        if let (Some(found), Some(expected)) = (bound.base, expected) {
            if found != expected && found != units::BaseType::Percent {
                return Err(format!("range bound {} does not fit <{name}>", bound.written));
            }
        }
    }
    if min.value > max.value {
        return Err(format!(
            "empty range [{},{}] on <{name}>",
            min.written, max.written
        ));
    }

    special_non_terminal(
        name,
        Some(NumericRange {
            min: min.value,
            max: max.value,
            written: (min.written, max.written),
        }),
        None,
    )
}

fn apply_multiplier(
    grammar: Grammar,
    multiplier: Multiplier,
    defaults: RepetitionDefaults,
) -> Result<Grammar, String> {
    let inner = Box::new(grammar);
    let repetition = match multiplier {
        Multiplier::Optional => return Ok(Grammar::Optional(inner)),
        Multiplier::Required => return Ok(Grammar::Required(inner)),
        Multiplier::Star => Repetition {
            inner,
            min: 0,
            max: defaults.space,
            separator: None,
            notation: RepetitionNotation::Star,
        },
        Multiplier::Plus => Repetition {
            inner,
            min: 1,
            max: defaults.space,
            separator: None,
            notation: RepetitionNotation::Plus,
        },
        Multiplier::Hash(None) => Repetition {
            inner,
            min: 1,
            max: defaults.comma,
            separator: Some(TokenPattern::Comma),
            notation: RepetitionNotation::Hash,
        },
        Multiplier::Hash(Some(bounds)) => Repetition {
            inner,
            min: bounds.min,
            max: bounds.max.unwrap_or(defaults.comma.max(bounds.min)),
            separator: Some(TokenPattern::Comma),
            notation: RepetitionNotation::HashRange {
                exact: bounds.exact,
                explicit_max: bounds.max,
            },
        },
        Multiplier::Range(bounds) => Repetition {
            inner,
            min: bounds.min,
            max: bounds.max.unwrap_or(defaults.space.max(bounds.min)),
            separator: None,
            notation: RepetitionNotation::Range {
                exact: bounds.exact,
                explicit_max: bounds.max,
            },
        },
    };

    if repetition.min > repetition.max {
        return Err(format!(
            "repetition minimum {} exceeds maximum {}",
            repetition.min, repetition.max
        ));
    }
    Ok(Grammar::Repetition(repetition))
}

fn convert_error(errors: Vec<ParserError>, eoi: usize) -> DefinitionError {
    let Some(error) = errors.into_iter().next() else {
        return DefinitionError::Empty;
    };

    if let chumsky::error::SimpleReason::Custom(message) = error.reason() {
        return DefinitionError::Invalid {
            message: message.clone(),
            span: error.span(),
        };
    }

    let mut expected: Vec<String> = error
        .expected()
        .map(|token| match token {
            Some(token) => token.to_string(),
            None => "end of definition".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    match error.found() {
        Some(found) => DefinitionError::UnexpectedToken {
            found: found.to_string(),
            expected,
            span: error.span(),
        },
        None if error.span().start >= eoi => DefinitionError::UnexpectedEnd { expected },
        None => DefinitionError::UnexpectedToken {
            found: "end of definition".to_string(),
            expected,
            span: error.span(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;

    fn parse(source: &str) -> Result<Grammar, DefinitionError> {
        parse_definition(source, RepetitionDefaults::top_level(&Limits::default()))
    }

    fn keyword(name: &str) -> Grammar {
        Grammar::Keyword(name.to_string())
    }

    #[test]
    fn test_single_keyword() {
        assert_eq!(parse("Auto").unwrap(), keyword("auto"));
    }

    #[test]
    fn test_sequence_binds_tighter_than_alternation() {
        assert_eq!(
            parse("a b | c").unwrap(),
            Grammar::Alternation(vec![
                Grammar::Sequence(vec![keyword("a"), keyword("b")]),
                keyword("c"),
            ])
        );
    }

    #[test]
    fn test_brackets_group_without_wrapper() {
        assert_eq!(
            parse("[a | b] c").unwrap(),
            Grammar::Sequence(vec![
                Grammar::Alternation(vec![keyword("a"), keyword("b")]),
                keyword("c"),
            ])
        );
    }

    #[test]
    fn test_mixed_combinators_are_rejected() {
        assert!(matches!(
            parse("a && b || c"),
            Err(DefinitionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_star_gets_default_bound() {
        let Grammar::Repetition(repetition) = parse("a*").unwrap() else {
            panic!("expected a repetition");
        };
        assert_eq!((repetition.min, repetition.max), (0, 20));
        assert_eq!(repetition.separator, None);
    }

    #[test]
    fn test_hash_range_keeps_separator() {
        let Grammar::Repetition(repetition) = parse("<number>#{3}").unwrap() else {
            panic!("expected a repetition");
        };
        assert_eq!((repetition.min, repetition.max), (3, 3));
        assert_eq!(repetition.separator, Some(TokenPattern::Comma));
    }

    #[test]
    fn test_stacked_multipliers() {
        let Grammar::Repetition(outer) = parse("a+#").unwrap() else {
            panic!("expected a repetition");
        };
        assert_eq!(outer.notation, RepetitionNotation::Hash);
        assert!(matches!(*outer.inner, Grammar::Repetition(_)));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        assert!(matches!(
            parse("a{3,1}"),
            Err(DefinitionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_range_bound_converted_to_canonical_unit() {
        let Grammar::NonTerminal(non_terminal) = parse("<angle [0deg,1turn]>").unwrap() else {
            panic!("expected a non-terminal");
        };
        let range = non_terminal.range.unwrap();
        assert_eq!((range.min, range.max), (0.0, 360.0));
        assert_eq!(range.written, ("0deg".to_string(), "1turn".to_string()));
    }

    #[test]
    fn test_infinite_range() {
        let Grammar::NonTerminal(non_terminal) = parse("<length [0,∞]>").unwrap() else {
            panic!("expected a non-terminal");
        };
        assert_eq!(non_terminal.range.unwrap().max, f64::INFINITY);
    }

    #[test]
    fn test_range_with_unknown_unit_is_rejected() {
        assert!(matches!(
            parse("<length [0foo,1px]>"),
            Err(DefinitionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_parametric_non_terminal() {
        let Grammar::NonTerminal(non_terminal) =
            parse("<boolean-expr[ <media-feature> ]>").unwrap()
        else {
            panic!("expected a non-terminal");
        };
        assert_eq!(non_terminal.name, "boolean-expr");
        assert_eq!(
            non_terminal.parameter.as_deref(),
            Some(&Grammar::NonTerminal(NonTerminal {
                name: "media-feature".into(),
                range: None,
                parameter: None,
            }))
        );
    }

    #[test]
    fn test_special_names() {
        assert_eq!(
            parse("<ident-token>").unwrap(),
            Grammar::Token(TokenPattern::Kind(TokenKind::Ident))
        );
        assert_eq!(
            parse("<declaration-value>").unwrap(),
            Grammar::Arbitrary(ArbitraryKind::DeclarationValue)
        );
        assert_eq!(parse("<block-contents>").unwrap(), Grammar::BlockContents);
    }

    #[test]
    fn test_function_and_blocks() {
        assert_eq!(
            parse("foo()").unwrap(),
            Grammar::Function {
                name: "foo".into(),
                body: None
            }
        );
        assert_eq!(
            parse("'[' a ']'").unwrap(),
            Grammar::Block {
                kind: BlockKind::Square,
                body: Some(Box::new(keyword("a")))
            }
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse("'/'").unwrap(),
            Grammar::Token(TokenPattern::Delim('/'))
        );
        assert_eq!(parse("','").unwrap(), Grammar::Token(TokenPattern::Comma));
        assert_eq!(parse("'by'").unwrap(), keyword("by"));
    }

    #[test]
    fn test_empty_definition() {
        assert_eq!(parse("   "), Err(DefinitionError::Empty));
    }

    #[test]
    fn test_unclosed_group() {
        assert!(matches!(
            parse("[a b"),
            Err(DefinitionError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_dangling_combinator() {
        assert!(parse("a |").is_err());
        assert!(parse("| a").is_err());
    }
}
