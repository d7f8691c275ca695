//! Serialization of match trees and calculation trees.
//!
//! The output is canonical: lists are joined with exactly one separator, components come out
//! in declaration order, keywords are lowercase, units use their canonical spelling, and
//! numbers are rounded to a fixed number of fractional digits. Serializing a match and
//! matching the result against the same grammar gives back an equal match.

use std::fmt::Write;

use crate::calc::{units, CalcNode, CalcValue, MathFunction};
use crate::definition::BlockKind;
use crate::matching::{Match, Separator, Value};
use crate::token::formatting::quote_string;
use crate::token::{detokenize, ToCssString, Token};

/// Fractional digits used unless a caller asks otherwise.
pub const DEFAULT_PRECISION: u32 = 6;

/// Format `value` with at most `precision` fractional digits, trailing zeros removed.
/// Negative zero is written `0`.
pub fn format_number(value: f64, precision: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "infinity" } else { "-infinity" }.to_string();
    }
    let mut text = format!("{value:.prec$}", prec = precision as usize);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Serialize a match with the default precision.
pub fn serialize_component_value(matched: &Match) -> String {
    serialize_match(matched, DEFAULT_PRECISION)
}

pub fn serialize_match(matched: &Match, precision: u32) -> String {
    let mut out = String::new();
    write_match(&mut out, matched, precision);
    out
}

fn write_match(out: &mut String, matched: &Match, precision: u32) {
    match matched {
        Match::Omitted => {}
        Match::Leaf { value, .. } => write_value(out, value, precision),
        Match::List {
            items,
            separator: Separator::Space,
        } => {
            // A comma, or a nested list opening with one, attaches to what precedes it.
            let mut started = false;
            for item in items {
                if item.is_comma() {
                    out.push(',');
                    started = true;
                    continue;
                }
                let text = serialize_match(item, precision);
                if text.is_empty() {
                    continue;
                }
                if started && !text.starts_with(',') {
                    out.push(' ');
                }
                out.push_str(&text);
                started = true;
            }
        }
        Match::List {
            items,
            separator: Separator::Comma,
        } => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| serialize_match(item, precision))
                .filter(|text| !text.is_empty())
                .collect();
            out.push_str(&parts.join(", "));
        }
        Match::Function { name, value } => {
            out.push_str(name);
            out.push('(');
            write_match(out, value, precision);
            out.push(')');
        }
        Match::Block { kind, value } => {
            let (open, close) = match kind {
                BlockKind::Paren => ('(', ')'),
                BlockKind::Square => ('[', ']'),
                BlockKind::Curly => ('{', '}'),
            };
            out.push(open);
            write_match(out, value, precision);
            out.push(close);
        }
    }
}

fn write_value(out: &mut String, value: &Value, precision: u32) {
    match value {
        Value::Keyword(text) | Value::Ident(text) => out.push_str(text),
        Value::String(text) => out.push_str(&quote_string(text)),
        Value::Url(url) => {
            let _ = write!(out, "url({})", quote_string(url));
        }
        Value::Number(number) => out.push_str(&format_number(*number, precision)),
        Value::Percentage(number) => {
            let _ = write!(out, "{}%", format_number(*number, precision));
        }
        Value::Dimension { value, unit } => {
            let _ = write!(out, "{}{}", format_number(*value, precision), unit_name(unit));
        }
        Value::Delim(c) => out.push(*c),
        Value::Token(token) => out.push_str(&token.to_css_string()),
        Value::Raw(tokens) => out.push_str(&detokenize(tokens)),
        Value::Calc(calc) => out.push_str(&serialize_calc(calc, precision)),
        Value::AnB { a, b } => out.push_str(&format_anb(*a, *b)),
        Value::UnicodeRange { start, end } => {
            out.push_str(&Token::UnicodeRange(*start, *end).to_css_string())
        }
        Value::HexColor(digits) => {
            let _ = write!(out, "#{digits}");
        }
    }
}

/// Canonical spelling of a unit: lowercase, except `Q`.
fn unit_name(unit: &str) -> String {
    match units::unit_info(unit) {
        Some(info) => info.name.to_string(),
        None => unit.to_ascii_lowercase(),
    }
}

/// Canonical `An+B` text: `2n+1`, `-n-1`, `5`, `2n`.
pub fn format_anb(a: i32, b: i32) -> String {
    let step = match a {
        0 => return b.to_string(),
        1 => "n".to_string(),
        -1 => "-n".to_string(),
        _ => format!("{a}n"),
    };
    match b {
        0 => step,
        b if b > 0 => format!("{step}+{b}"),
        b => format!("{step}{b}"),
    }
}

/// Serialize a resolved math function. A tree that is still a function other than `calc()`
/// is written as that function; anything else is wrapped in `calc()`.
pub fn serialize_calc(value: &CalcValue, precision: u32) -> String {
    match &value.root {
        CalcNode::Function(function, _) if *function != MathFunction::Calc => {
            serialize_calc_node(&value.root, precision)
        }
        root => format!("calc({})", serialize_calc_node(root, precision)),
    }
}

/// Serialize a calculation node without any `calc()` wrapper.
pub fn serialize_calc_node(node: &CalcNode, precision: u32) -> String {
    let mut out = String::new();
    write_node(&mut out, node, precision);
    out
}

fn write_node(out: &mut String, node: &CalcNode, precision: u32) {
    match node {
        CalcNode::Number(value) => out.push_str(&calc_number(*value, precision)),
        CalcNode::Percentage(value) => write_quantity(out, *value, "%", precision),
        CalcNode::Dimension(value, unit) => write_quantity(out, *value, &unit_name(unit), precision),
        CalcNode::Keyword(keyword) => out.push_str(keyword),
        CalcNode::Sum(terms) => {
            for (index, term) in terms.iter().enumerate() {
                match (index, subtracted(term)) {
                    (0, _) => write_node(out, term, precision),
                    (_, Some(positive)) => {
                        out.push_str(" - ");
                        write_node(out, &positive, precision);
                    }
                    (_, None) => {
                        out.push_str(" + ");
                        write_node(out, term, precision);
                    }
                }
            }
        }
        CalcNode::Product(factors) => {
            for (index, factor) in factors.iter().enumerate() {
                match factor {
                    CalcNode::Invert(inner) => {
                        out.push_str(if index == 0 { "1 / " } else { " / " });
                        write_factor(out, inner, precision);
                    }
                    _ => {
                        if index > 0 {
                            out.push_str(" * ");
                        }
                        write_factor(out, factor, precision);
                    }
                }
            }
        }
        CalcNode::Negate(inner) => {
            out.push_str("-1 * ");
            write_factor(out, inner, precision);
        }
        CalcNode::Invert(inner) => {
            out.push_str("1 / ");
            write_factor(out, inner, precision);
        }
        CalcNode::Function(function, args) => write_function(out, *function, args, precision),
    }
}

/// The positive counterpart of a term written after ` - `.
fn subtracted(term: &CalcNode) -> Option<CalcNode> {
    match term {
        CalcNode::Negate(inner) => Some((**inner).clone()),
        _ => {
            let value = term.value()?;
            (value < 0.0).then(|| term.with_value(-value)).flatten()
        }
    }
}

fn write_factor(out: &mut String, factor: &CalcNode, precision: u32) {
    if matches!(factor, CalcNode::Sum(_) | CalcNode::Product(_)) {
        out.push('(');
        write_node(out, factor, precision);
        out.push(')');
    } else {
        write_node(out, factor, precision);
    }
}

fn write_function(out: &mut String, function: MathFunction, args: &[CalcNode], precision: u32) {
    let node = |arg: &CalcNode| serialize_calc_node(arg, precision);
    let parts: Vec<String> = match function {
        MathFunction::Random => {
            let split = args
                .iter()
                .take_while(|arg| matches!(arg, CalcNode::Keyword(_)))
                .count();
            let (options, operands) = args.split_at(split);
            let mut parts = Vec::new();
            if !options.is_empty() {
                parts.push(options.iter().map(node).collect::<Vec<_>>().join(" "));
            }
            for (index, operand) in operands.iter().enumerate() {
                if index == 2 {
                    parts.push(format!("by {}", node(operand)));
                } else {
                    parts.push(node(operand));
                }
            }
            parts
        }
        MathFunction::CalcInterpolate => {
            let Some((progress, stops)) = args.split_first() else {
                return;
            };
            let mut parts = vec![node(progress)];
            parts.extend(
                stops
                    .chunks(2)
                    .map(|stop| stop.iter().map(node).collect::<Vec<_>>().join(": ")),
            );
            parts
        }
        _ => args.iter().map(node).collect(),
    };
    let _ = write!(out, "{}({})", function.name(), parts.join(", "));
}

/// Numbers inside math functions keep their special values.
fn calc_number(value: f64, precision: u32) -> String {
    if value == 0.0 && value.is_sign_negative() {
        return "-0".to_string();
    }
    format_number(value, precision)
}

fn write_quantity(out: &mut String, value: f64, unit: &str, precision: u32) {
    if value.is_finite() {
        let _ = write!(out, "{}{unit}", calc_number(value, precision));
    } else {
        let _ = write!(out, "{} * 1{unit}", calc_number(value, precision));
    }
}
