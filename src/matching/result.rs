//! The match tree.
//!
//! A [Match] is built bottom-up while a match attempt succeeds and is never mutated
//! afterwards; tagging a leaf with an enclosing production produces a new leaf. Lists keep
//! one slot per declared component of the combinator that built them, so permutation and
//! arrangement results can be read positionally regardless of input order.

use serde::Serialize;

use crate::calc::CalcValue;
use crate::definition::BlockKind;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Match {
    /// An optional component that was not supplied.
    Omitted,
    /// A consumed token or resolved value. `types` lists the productions it satisfied,
    /// innermost first.
    Leaf { value: Value, types: Vec<String> },
    List {
        items: Vec<Match>,
        separator: Separator,
    },
    Function { name: String, value: Box<Match> },
    Block { kind: BlockKind, value: Box<Match> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Separator {
    Space,
    Comma,
}

/// The payload of a leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// A grammar keyword, lowercase.
    Keyword(String),
    /// An identifier matched by `<ident>` and friends, as written.
    Ident(String),
    String(String),
    Url(String),
    Number(f64),
    Percentage(f64),
    Dimension { value: f64, unit: String },
    /// A literal delimiter from the grammar, including `,`, `:` and `;`.
    Delim(char),
    /// A token matched by a `<*-token>` marker.
    Token(Token),
    /// An opaque run of tokens.
    Raw(Vec<Token>),
    /// A resolved math function.
    Calc(CalcValue),
    AnB { a: i32, b: i32 },
    UnicodeRange { start: u32, end: u32 },
    /// A hex color, digits only.
    HexColor(String),
}

impl Match {
    pub fn leaf(value: Value, production: &str) -> Self {
        Match::Leaf {
            value,
            types: vec![production.to_string()],
        }
    }

    /// A leaf for a literal grammar token, not tagged with any production.
    pub fn literal(value: Value) -> Self {
        Match::Leaf {
            value,
            types: Vec::new(),
        }
    }

    /// This match with `production` appended to a leaf's type chain. Other nodes are
    /// returned unchanged.
    pub fn tagged(self, production: &str) -> Self {
        match self {
            Match::Leaf { value, mut types } => {
                types.push(production.to_string());
                Match::Leaf { value, types }
            }
            other => other,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Match::Omitted)
    }

    /// Whether anything other than `Omitted` appears in this match.
    pub fn is_present(&self) -> bool {
        match self {
            Match::Omitted => false,
            Match::List { items, .. } => items.iter().any(Match::is_present),
            _ => true,
        }
    }

    /// The comma leaf a sequence keeps in a comma slot.
    pub fn is_comma(&self) -> bool {
        matches!(
            self,
            Match::Leaf {
                value: Value::Delim(','),
                ..
            }
        )
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Match::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn types(&self) -> &[String] {
        match self {
            Match::Leaf { types, .. } => types,
            _ => &[],
        }
    }

    pub fn items(&self) -> Option<&[Match]> {
        match self {
            Match::List { items, .. } => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagging_appends_outermost_last() {
        let leaf = Match::leaf(Value::Number(1.0), "number")
            .tagged("alpha-value")
            .tagged("color");
        assert_eq!(leaf.types(), ["number", "alpha-value", "color"]);
    }

    #[test]
    fn test_tagging_leaves_lists_alone() {
        let list = Match::List {
            items: vec![Match::Omitted],
            separator: Separator::Space,
        };
        assert_eq!(list.clone().tagged("x"), list);
    }

    #[test]
    fn test_presence() {
        let empty = Match::List {
            items: vec![Match::Omitted, Match::Omitted],
            separator: Separator::Space,
        };
        assert!(!empty.is_present());
        let one = Match::List {
            items: vec![Match::Omitted, Match::literal(Value::Keyword("a".into()))],
            separator: Separator::Space,
        };
        assert!(one.is_present());
    }
}
