//! The `An+B` microsyntax.
//!
//! `An+B` spans several tokens in ways the ordinary tokenizer splits unevenly: `2n+1` is a
//! dimension with unit `n` followed by a signed number, `-n-1` is a single identifier, and
//! `+n` is a delimiter glued to an identifier. Each shape is handled explicitly.

use crate::token::{Cursor, Token};

/// Parse `An+B` at the cursor, returning `(a, b)` and the cursor after it.
pub fn parse_anb(cursor: Cursor<'_>) -> Option<(i32, i32, Cursor<'_>)> {
    let (token, after) = cursor.next_token()?;
    let (a, rest, after) = match token {
        Token::Number {
            value, int: true, ..
        } => return Some((0, integer(*value)?, after)),
        Token::Ident(ident) => {
            let lower = ident.to_ascii_lowercase();
            match lower.as_str() {
                "even" => return Some((2, 0, after)),
                "odd" => return Some((2, 1, after)),
                _ => {}
            }
            let (a, unsigned) = match lower.strip_prefix('-') {
                Some(unsigned) => (-1, unsigned),
                None => (1, lower.as_str()),
            };
            (a, unsigned.strip_prefix('n')?.to_string(), after)
        }
        Token::Delim('+') => {
            // `+n` must not have whitespace between the sign and the `n`.
            let (Token::Ident(ident), after) = after.next_raw()? else {
                return None;
            };
            let lower = ident.to_ascii_lowercase();
            (1, lower.strip_prefix('n')?.to_string(), after)
        }
        Token::Dimension {
            value,
            int: true,
            unit,
        } => {
            let lower = unit.to_ascii_lowercase();
            (integer(*value)?, lower.strip_prefix('n')?.to_string(), after)
        }
        _ => return None,
    };
    offset(a, &rest, after)
}

/// Parse the `B` part following `An`, given whatever trailed the `n` in the same token.
fn offset<'t>(a: i32, rest: &str, cursor: Cursor<'t>) -> Option<(i32, i32, Cursor<'t>)> {
    match rest {
        "" => {
            let signed = match cursor.next_token() {
                Some((
                    Token::Number {
                        value,
                        int: true,
                        signed: true,
                    },
                    after,
                )) => integer(*value).map(|b| (b, after)),
                Some((Token::Delim(sign @ ('+' | '-')), after)) => unsigned(after)
                    .map(|(b, after)| (if *sign == '-' { -b } else { b }, after)),
                _ => None,
            };
            match signed {
                Some((b, after)) => Some((a, b, after)),
                None => Some((a, 0, cursor)),
            }
        }
        "-" => {
            let (b, after) = unsigned(cursor)?;
            Some((a, -b, after))
        }
        rest => {
            let digits = rest.strip_prefix('-')?;
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let b: i32 = digits.parse().ok()?;
            Some((a, -b, cursor))
        }
    }
}

fn unsigned(cursor: Cursor<'_>) -> Option<(i32, Cursor<'_>)> {
    match cursor.next_token()? {
        (
            Token::Number {
                value,
                int: true,
                signed: false,
            },
            after,
        ) => Some((integer(*value)?, after)),
        _ => None,
    }
}

fn integer(value: f64) -> Option<i32> {
    let in_range = value.fract() == 0.0 && value.abs() <= i32::MAX as f64;
    in_range.then_some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use rstest::rstest;

    #[rstest]
    #[case("2n+1", 2, 1)]
    #[case("2n + 1", 2, 1)]
    #[case("2n- 1", 2, -1)]
    #[case("2n-1", 2, -1)]
    #[case("-n-1", -1, -1)]
    #[case("+n", 1, 0)]
    #[case("n", 1, 0)]
    #[case("odd", 2, 1)]
    #[case("EVEN", 2, 0)]
    #[case("5", 0, 5)]
    #[case("-3n + 0", -3, 0)]
    fn test_parse_anb(#[case] source: &str, #[case] a: i32, #[case] b: i32) {
        let tokens = tokenize(source);
        let (found_a, found_b, rest) = parse_anb(Cursor::new(&tokens)).unwrap();
        assert_eq!((found_a, found_b), (a, b));
        assert!(rest.is_at_end(), "{source} left input");
    }

    #[rstest]
    #[case("+ n")]
    #[case("2x")]
    #[case("1.5n")]
    #[case("foo")]
    fn test_rejects(#[case] source: &str) {
        let tokens = tokenize(source);
        assert!(parse_anb(Cursor::new(&tokens)).is_none());
    }
}
