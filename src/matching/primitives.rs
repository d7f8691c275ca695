//! Closed-form value parsers for primitive productions.
//!
//! Primitives are the non-terminals that never go through the registry: each one reads a
//! fixed shape of tokens. Numeric primitives also accept math functions; that path needs
//! the matcher and lives there, so this module only covers literal tokens.

use super::anb::parse_anb;
use super::colors;
use super::result::Value;
use crate::calc::units::{self, BaseType};
use crate::token::{Cursor, Token};

/// Keywords every property accepts, and no `<custom-ident>` may be.
pub const CSS_WIDE_KEYWORDS: &[&str] = &["initial", "inherit", "unset", "revert", "revert-layer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Number,
    Integer,
    Percentage,
    /// `<length>`, `<angle>`, ...
    Quantity(BaseType),
    /// `<length-percentage>`, `<angle-percentage>`, ...
    QuantityPercentage(BaseType),
    Dimension,
    Ident,
    CustomIdent,
    DashedIdent,
    String,
    Url,
    UnicodeRange,
    AnB,
    HexColor,
    NamedColor,
    SystemColor,
    GeneralEnclosed,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "number" => Primitive::Number,
            "integer" => Primitive::Integer,
            "percentage" => Primitive::Percentage,
            "dimension" => Primitive::Dimension,
            "ident" => Primitive::Ident,
            "custom-ident" => Primitive::CustomIdent,
            "dashed-ident" => Primitive::DashedIdent,
            "string" => Primitive::String,
            "url" => Primitive::Url,
            "urange" => Primitive::UnicodeRange,
            "an+b" => Primitive::AnB,
            "hex-color" => Primitive::HexColor,
            "named-color" => Primitive::NamedColor,
            "system-color" => Primitive::SystemColor,
            "general-enclosed" => Primitive::GeneralEnclosed,
            _ => {
                let base = BaseType::for_production(name)?;
                if name.ends_with("-percentage") {
                    Primitive::QuantityPercentage(base)
                } else {
                    Primitive::Quantity(base)
                }
            }
        };
        Some(primitive)
    }

    /// Whether math functions may stand in for a literal of this primitive.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Primitive::Number
                | Primitive::Integer
                | Primitive::Percentage
                | Primitive::Quantity(_)
                | Primitive::QuantityPercentage(_)
        )
    }
}

/// Read a literal numeric token. Returns the value and its magnitude in the canonical unit,
/// when it has one, for range checks.
pub fn numeric(primitive: Primitive, token: &Token) -> Option<(Value, Option<f64>)> {
    match (primitive, token) {
        (Primitive::Number, Token::Number { value, .. })
        | (Primitive::Integer, Token::Number { value, int: true, .. }) => {
            Some((Value::Number(*value), Some(*value)))
        }
        (Primitive::Percentage | Primitive::QuantityPercentage(_), Token::Percentage(value)) => {
            Some((Value::Percentage(*value), Some(*value)))
        }
        // A unitless zero is a length.
        (
            Primitive::Quantity(BaseType::Length) | Primitive::QuantityPercentage(BaseType::Length),
            Token::Number { value, .. },
        ) if *value == 0.0 => Some((Value::Number(0.0), Some(0.0))),
        (
            Primitive::Quantity(base) | Primitive::QuantityPercentage(base),
            Token::Dimension { value, unit, .. },
        ) => {
            let info = units::unit_info(unit)?;
            if info.base != base {
                return None;
            }
            let canonical = info.factor.map(|factor| value * factor);
            Some((
                Value::Dimension {
                    value: *value,
                    unit: info.name.to_string(),
                },
                canonical,
            ))
        }
        (Primitive::Dimension, Token::Dimension { value, unit, .. }) => {
            let unit = units::unit_info(unit)
                .map(|info| info.name.to_string())
                .unwrap_or_else(|| unit.to_ascii_lowercase());
            Some((Value::Dimension { value: *value, unit }, None))
        }
        _ => None,
    }
}

/// Read a non-numeric primitive at the cursor.
pub fn literal<'t>(primitive: Primitive, cursor: Cursor<'t>) -> Option<(Value, Cursor<'t>)> {
    match primitive {
        Primitive::AnB => {
            let (a, b, after) = parse_anb(cursor)?;
            return Some((Value::AnB { a, b }, after));
        }
        Primitive::Url => return url(cursor),
        Primitive::GeneralEnclosed => return general_enclosed(cursor),
        _ => {}
    }

    let (token, after) = cursor.next_token()?;
    let value = match (primitive, token) {
        (Primitive::Ident, Token::Ident(name)) => Value::Ident(name.clone()),
        (Primitive::CustomIdent, Token::Ident(name)) if is_custom_ident(name) => {
            Value::Ident(name.clone())
        }
        (Primitive::DashedIdent, Token::Ident(name)) if name.starts_with("--") => {
            Value::Ident(name.clone())
        }
        (Primitive::String, Token::String(value)) => Value::String(value.clone()),
        (Primitive::UnicodeRange, Token::UnicodeRange(start, end)) if start <= end => {
            Value::UnicodeRange {
                start: *start,
                end: *end,
            }
        }
        (Primitive::HexColor, Token::Hash { value, .. }) if colors::is_hex_color(value) => {
            Value::HexColor(value.to_ascii_lowercase())
        }
        (Primitive::NamedColor, Token::Ident(name)) if colors::is_named_color(name) => {
            Value::Keyword(name.to_ascii_lowercase())
        }
        (Primitive::SystemColor, Token::Ident(name)) if colors::is_system_color(name) => {
            Value::Keyword(name.to_ascii_lowercase())
        }
        _ => return None,
    };
    Some((value, after))
}

fn is_custom_ident(name: &str) -> bool {
    let reserved = CSS_WIDE_KEYWORDS
        .iter()
        .chain(&["default"])
        .any(|keyword| keyword.eq_ignore_ascii_case(name));
    !reserved
}

/// `<url-token>`, or `url( <string> )` / `src( <string> )`.
fn url(cursor: Cursor<'_>) -> Option<(Value, Cursor<'_>)> {
    match cursor.next_token()? {
        (Token::Url(value), after) => Some((Value::Url(value.clone()), after)),
        (Token::Function(name), inside)
            if name.eq_ignore_ascii_case("url") || name.eq_ignore_ascii_case("src") =>
        {
            let (Token::String(value), after) = inside.next_token()? else {
                return None;
            };
            match after.next_token() {
                Some((Token::CloseParen, after)) => Some((Value::Url(value.clone()), after)),
                None => Some((Value::Url(value.clone()), after)),
                Some(_) => None,
            }
        }
        _ => None,
    }
}

/// `[ <function-token> <any-value>? ) ] | ( <any-value>? )`, kept as raw tokens.
fn general_enclosed(cursor: Cursor<'_>) -> Option<(Value, Cursor<'_>)> {
    let start = cursor.skip_whitespace();
    let (open, mut position) = start.next_raw()?;
    if !matches!(open, Token::Function(_) | Token::OpenParen) {
        return None;
    }

    let mut closers = vec![Token::CloseParen];
    while let Some((token, next)) = position.next_raw() {
        if token.is_bad() {
            return None;
        }
        if token.is_closing() {
            if closers.last() != Some(token) {
                return None;
            }
            closers.pop();
        } else if let Some(close) = token.closing() {
            closers.push(close);
        }
        position = next;
        if closers.is_empty() {
            break;
        }
    }

    Some((Value::Raw(start.slice_to(&position).to_vec()), position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use rstest::rstest;

    fn read(primitive: Primitive, source: &str) -> Option<Value> {
        let tokens = tokenize(source);
        let (value, rest) = literal(primitive, Cursor::new(&tokens))?;
        rest.is_at_end().then_some(value)
    }

    fn read_numeric(primitive: Primitive, source: &str) -> Option<Value> {
        let tokens = tokenize(source);
        let (token, _) = Cursor::new(&tokens).next_token()?;
        numeric(primitive, token).map(|(value, _)| value)
    }

    #[rstest]
    #[case("length", Primitive::Quantity(BaseType::Length))]
    #[case("angle-percentage", Primitive::QuantityPercentage(BaseType::Angle))]
    #[case("an+b", Primitive::AnB)]
    #[case("urange", Primitive::UnicodeRange)]
    fn test_from_name(#[case] name: &str, #[case] expected: Primitive) {
        assert_eq!(Primitive::from_name(name), Some(expected));
    }

    #[test]
    fn test_unknown_names_are_not_primitives() {
        assert_eq!(Primitive::from_name("color"), None);
        assert_eq!(Primitive::from_name("calc-sum"), None);
    }

    #[test]
    fn test_unitless_zero_is_a_length_only() {
        let length = Primitive::Quantity(BaseType::Length);
        assert_eq!(read_numeric(length, "0"), Some(Value::Number(0.0)));
        assert_eq!(read_numeric(length, "1"), None);
        assert_eq!(read_numeric(Primitive::Quantity(BaseType::Angle), "0"), None);
    }

    #[test]
    fn test_units_are_checked() {
        let angle = Primitive::Quantity(BaseType::Angle);
        assert_eq!(
            read_numeric(angle, "1TURN"),
            Some(Value::Dimension {
                value: 1.0,
                unit: "turn".into()
            })
        );
        assert_eq!(read_numeric(angle, "1px"), None);
    }

    #[test]
    fn test_integer_rejects_fractions() {
        assert_eq!(read_numeric(Primitive::Integer, "1.5"), None);
        assert_eq!(read_numeric(Primitive::Integer, "3"), Some(Value::Number(3.0)));
    }

    #[test]
    fn test_custom_ident_excludes_reserved_words() {
        assert_eq!(read(Primitive::CustomIdent, "foo"), Some(Value::Ident("foo".into())));
        assert_eq!(read(Primitive::CustomIdent, "inherit"), None);
        assert_eq!(read(Primitive::CustomIdent, "DEFAULT"), None);
    }

    #[test]
    fn test_urls() {
        assert_eq!(read(Primitive::Url, "url(a.png)"), Some(Value::Url("a.png".into())));
        assert_eq!(
            read(Primitive::Url, "url(\"a b.png\")"),
            Some(Value::Url("a b.png".into()))
        );
        assert_eq!(read(Primitive::Url, "src('x')"), Some(Value::Url("x".into())));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(read(Primitive::HexColor, "#ABC"), Some(Value::HexColor("abc".into())));
        assert_eq!(read(Primitive::HexColor, "#abcde"), None);
    }

    #[test]
    fn test_general_enclosed_is_balanced() {
        let tokens = tokenize("foo(a [b]) c");
        let (value, rest) = literal(Primitive::GeneralEnclosed, Cursor::new(&tokens)).unwrap();
        let Value::Raw(raw) = value else {
            panic!("expected raw tokens");
        };
        assert_eq!(crate::token::detokenize(&raw), "foo(a [b])");
        assert_eq!(rest.peek(), Some(&Token::Ident("c".into())));
        let unbalanced = tokenize("(a ]");
        assert!(literal(Primitive::GeneralEnclosed, Cursor::new(&unbalanced)).is_none());
    }
}
