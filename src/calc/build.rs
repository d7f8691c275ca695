//! Building calculation trees from matched math functions.
//!
//! The grammar matcher has already checked the shape of the input against the math
//! function productions; this walks the resulting match tree. The layout it expects is the
//! one those productions produce:
//!
//!     calc-sum:
//!         a list of the first product and a list of `[op, product]` pairs.
//!
//!     calc-product:
//!         a list of the first value and a list of `[op, value]` pairs.
//!
//!     calc-value:
//!         a number, dimension or percentage token, a constant keyword, a parenthesized
//!         sum, or a nested math function.
//!
//! Arguments of multi-argument functions sit at the even slots of a sequence whose odd
//! slots hold the separating commas. Any other shape fails the build.

use std::f64::consts::{E, PI};

use super::node::{CalcNode, MathFunction};
use super::units;
use crate::definition::BlockKind;
use crate::matching::{Match, Separator, Value};
use crate::token::Token;

/// Build the tree of a matched math function.
///
/// `max_depth` bounds the nesting of parentheses and functions.
pub fn build(matched: &Match, max_depth: u32) -> Option<CalcNode> {
    Builder { max_depth }.value(matched, 0)
}

struct Builder {
    max_depth: u32,
}

impl Builder {
    fn nested(&self, depth: u32) -> Option<u32> {
        if depth >= self.max_depth {
            log::trace!("calculation nesting exceeds {}", self.max_depth);
            return None;
        }
        Some(depth + 1)
    }

    fn sum(&self, matched: &Match, depth: u32) -> Option<CalcNode> {
        self.operation(matched, depth, Self::product, |op, node| match op {
            '+' => Some(node),
            '-' => Some(CalcNode::Negate(Box::new(node))),
            _ => None,
        })
        .map(|terms| flatten(terms, CalcNode::Sum))
    }

    fn product(&self, matched: &Match, depth: u32) -> Option<CalcNode> {
        self.operation(matched, depth, Self::value, |op, node| match op {
            '*' => Some(node),
            '/' => Some(CalcNode::Invert(Box::new(node))),
            _ => None,
        })
        .map(|factors| flatten(factors, CalcNode::Product))
    }

    /// Shared walk of `first [op next]*` lists.
    fn operation(
        &self,
        matched: &Match,
        depth: u32,
        operand: fn(&Self, &Match, u32) -> Option<CalcNode>,
        combine: impl Fn(char, CalcNode) -> Option<CalcNode>,
    ) -> Option<Vec<CalcNode>> {
        let [first, rest] = matched.items()? else {
            return None;
        };
        let mut nodes = vec![operand(self, first, depth)?];
        for pair in rest.items()? {
            let [op, next] = pair.items()? else {
                return None;
            };
            let Some(Value::Delim(op)) = op.value() else {
                return None;
            };
            nodes.push(combine(*op, operand(self, next, depth)?)?);
        }
        Some(nodes)
    }

    fn value(&self, matched: &Match, depth: u32) -> Option<CalcNode> {
        match matched {
            Match::Leaf { value, .. } => leaf(value),
            Match::Block {
                kind: BlockKind::Paren,
                value,
            } => self.sum(value, self.nested(depth)?),
            Match::Function { name, value } => {
                let function = MathFunction::from_name(name)?;
                let args = self.arguments(function, value, self.nested(depth)?)?;
                Some(CalcNode::Function(function, args))
            }
            _ => None,
        }
    }

    fn arguments(&self, function: MathFunction, body: &Match, depth: u32) -> Option<Vec<CalcNode>> {
        let sum = |matched: &Match| self.sum(matched, depth);
        match function {
            MathFunction::Calc
            | MathFunction::Sin
            | MathFunction::Cos
            | MathFunction::Tan
            | MathFunction::Asin
            | MathFunction::Acos
            | MathFunction::Atan
            | MathFunction::Sqrt
            | MathFunction::Exp
            | MathFunction::Abs
            | MathFunction::Sign => Some(vec![sum(body)?]),
            MathFunction::Min | MathFunction::Max | MathFunction::Hypot => {
                comma_list(body)?.iter().map(sum).collect()
            }
            MathFunction::Mod
            | MathFunction::Rem
            | MathFunction::Atan2
            | MathFunction::Pow
            | MathFunction::Progress
            | MathFunction::CalcMix => positional(body)?.into_iter().map(sum).collect(),
            MathFunction::Log => present(positional(body)?).into_iter().map(sum).collect(),
            MathFunction::Clamp => positional(body)?
                .into_iter()
                .map(|arg| match keyword(arg) {
                    Some("none") => Some(CalcNode::Keyword("none".into())),
                    Some(_) => None,
                    None => sum(arg),
                })
                .collect(),
            MathFunction::Round => {
                let slots = positional(body)?;
                let [strategy, rest @ ..] = slots.as_slice() else {
                    return None;
                };
                let mut args = Vec::new();
                if let Some(strategy) = keyword(strategy) {
                    args.push(CalcNode::Keyword(strategy.to_string()));
                }
                for arg in present(rest.to_vec()) {
                    args.push(sum(arg)?);
                }
                Some(args)
            }
            MathFunction::CalcInterpolate => {
                let [progress, stops] = positional(body)?[..] else {
                    return None;
                };
                let mut args = vec![sum(progress)?];
                for stop in comma_list(stops)? {
                    let [input, _, output] = stop.items()? else {
                        return None;
                    };
                    args.push(sum(input)?);
                    args.push(sum(output)?);
                }
                Some(args)
            }
            MathFunction::Random => {
                let slots = positional(body)?;
                let [options, min, max, step] = slots[..] else {
                    return None;
                };
                let mut args = Vec::new();
                if let Some(options) = options.items() {
                    for option in options {
                        match option.value() {
                            Some(Value::Ident(name) | Value::Keyword(name)) => {
                                args.push(CalcNode::Keyword(name.clone()))
                            }
                            _ if option.is_omitted() => {}
                            _ => return None,
                        }
                    }
                }
                args.push(sum(min)?);
                args.push(sum(max)?);
                if let Some([_, step]) = step.items() {
                    args.push(sum(step)?);
                }
                Some(args)
            }
        }
    }
}

fn flatten(mut nodes: Vec<CalcNode>, wrap: fn(Vec<CalcNode>) -> CalcNode) -> CalcNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}

fn leaf(value: &Value) -> Option<CalcNode> {
    match value {
        Value::Token(Token::Number { value, .. }) => Some(CalcNode::Number(*value)),
        Value::Token(Token::Percentage(value)) => Some(CalcNode::Percentage(*value)),
        Value::Token(Token::Dimension { value, unit, .. }) => {
            let Some(info) = units::unit_info(unit) else {
                log::trace!("unknown unit {unit:?} in calculation");
                return None;
            };
            Some(CalcNode::Dimension(*value, info.name.to_string()))
        }
        Value::Keyword(keyword) => constant(keyword).map(CalcNode::Number),
        _ => None,
    }
}

fn constant(keyword: &str) -> Option<f64> {
    match keyword {
        "e" => Some(E),
        "pi" => Some(PI),
        "infinity" => Some(f64::INFINITY),
        "-infinity" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    }
}

fn keyword(matched: &Match) -> Option<&str> {
    match matched.value()? {
        Value::Keyword(keyword) => Some(keyword),
        _ => None,
    }
}

/// Items of a `#` list.
fn comma_list(matched: &Match) -> Option<&[Match]> {
    match matched {
        Match::List {
            items,
            separator: Separator::Comma,
        } => Some(items),
        _ => None,
    }
}

/// The argument slots of a comma-separated sequence: every even slot.
fn positional(matched: &Match) -> Option<Vec<&Match>> {
    let items = matched.items()?;
    if items.len() % 2 == 0 {
        return None;
    }
    Some(items.iter().step_by(2).collect())
}

fn present(slots: Vec<&Match>) -> Vec<&Match> {
    slots.into_iter().filter(|slot| !slot.is_omitted()).collect()
}
