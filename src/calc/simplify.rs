//! Simplification of calculation trees.
//!
//! Simplification is bottom-up: children first, then the node itself. Sums fold every group
//! of comparable terms into one, products fold numbers and canonical units, and math
//! functions evaluate once their arguments are plain values. Whatever cannot be reduced
//! exactly stays symbolic. Sums come out ordered as numbers, percentages, dimensions by
//! unit, then anything else.

use super::functions;
use super::node::CalcNode;
use super::random::RandomSource;
use super::units;

pub fn simplify(node: CalcNode, random: &dyn RandomSource) -> CalcNode {
    match node {
        CalcNode::Negate(inner) => negate(simplify(*inner, random)),
        CalcNode::Invert(inner) => invert(simplify(*inner, random)),
        CalcNode::Sum(terms) => sum(terms.into_iter().map(|term| simplify(term, random)).collect()),
        CalcNode::Product(factors) => product(
            factors
                .into_iter()
                .map(|factor| simplify(factor, random))
                .collect(),
        ),
        CalcNode::Function(function, args) => {
            let args = args.into_iter().map(|arg| simplify(arg, random)).collect();
            functions::evaluate(function, args, random)
        }
        leaf => leaf,
    }
}

fn negate(node: CalcNode) -> CalcNode {
    match node {
        CalcNode::Number(value) => CalcNode::Number(-value),
        CalcNode::Percentage(value) => CalcNode::Percentage(-value),
        CalcNode::Dimension(value, unit) => CalcNode::Dimension(-value, unit),
        CalcNode::Negate(inner) => *inner,
        CalcNode::Sum(terms) => CalcNode::Sum(terms.into_iter().map(negate).collect()),
        CalcNode::Product(mut factors) if matches!(factors.first(), Some(CalcNode::Number(_))) => {
            let first = std::mem::replace(&mut factors[0], CalcNode::Number(0.0));
            factors[0] = negate(first);
            CalcNode::Product(factors)
        }
        other => CalcNode::Negate(Box::new(other)),
    }
}

fn invert(node: CalcNode) -> CalcNode {
    match node {
        CalcNode::Number(value) => CalcNode::Number(1.0 / value),
        CalcNode::Invert(inner) => *inner,
        other => CalcNode::Invert(Box::new(other)),
    }
}

fn sum(terms: Vec<CalcNode>) -> CalcNode {
    let mut number: Option<f64> = None;
    let mut percentage: Option<f64> = None;
    let mut dimensions: Vec<(f64, String)> = Vec::new();
    let mut others = Vec::new();

    for term in flatten(terms, |node| match node {
        CalcNode::Sum(nested) => Ok(nested),
        other => Err(other),
    }) {
        match term {
            CalcNode::Number(value) => number = Some(number.map_or(value, |total| total + value)),
            CalcNode::Percentage(value) => {
                percentage = Some(percentage.map_or(value, |total| total + value))
            }
            CalcNode::Dimension(value, unit) => {
                let merged = dimensions.iter_mut().find_map(|(total, existing)| {
                    *total += units::convert(value, &unit, existing)?;
                    Some(())
                });
                if merged.is_none() {
                    dimensions.push((value, unit));
                }
            }
            other => others.push(other),
        }
    }
    dimensions.sort_by(|(_, a), (_, b)| a.cmp(b));

    let mut result: Vec<CalcNode> = number.map(CalcNode::Number).into_iter().collect();
    result.extend(percentage.map(CalcNode::Percentage));
    result.extend(
        dimensions
            .into_iter()
            .map(|(value, unit)| CalcNode::Dimension(value, unit)),
    );
    result.extend(others);

    match result.len() {
        0 => CalcNode::Number(0.0),
        1 => result.remove(0),
        _ => CalcNode::Sum(result),
    }
}

fn product(factors: Vec<CalcNode>) -> CalcNode {
    let mut coefficient = 1.0;
    let mut others = Vec::new();

    for factor in flatten(factors, |node| match node {
        CalcNode::Product(nested) => Ok(nested),
        other => Err(other),
    }) {
        match factor {
            CalcNode::Number(value) => coefficient *= value,
            other => others.push(other),
        }
    }

    match others.len() {
        0 => return CalcNode::Number(coefficient),
        1 => {
            let other = others.remove(0);
            if let Some(scaled) = other.value().and_then(|value| other.with_value(coefficient * value)) {
                return scaled;
            }
            if let CalcNode::Sum(terms) = &other {
                let scaled: Option<Vec<CalcNode>> = terms
                    .iter()
                    .map(|term| term.with_value(coefficient * term.value()?))
                    .collect();
                if let Some(scaled) = scaled {
                    return CalcNode::Sum(scaled);
                }
            }
            if coefficient == 1.0 {
                return other;
            }
            others.push(other);
        }
        _ => {
            if let Some(folded) = fold_canonical(coefficient, &others) {
                return folded;
            }
        }
    }

    let mut result = Vec::with_capacity(others.len() + 1);
    if coefficient != 1.0 {
        result.push(CalcNode::Number(coefficient));
    }
    result.extend(others);
    CalcNode::Product(result)
}

/// Splice nested nodes of the same operator into their parent.
fn flatten(nodes: Vec<CalcNode>, nested: fn(CalcNode) -> Result<Vec<CalcNode>, CalcNode>) -> Vec<CalcNode> {
    let mut flat = Vec::with_capacity(nodes.len());
    for node in nodes {
        match nested(node) {
            Ok(children) => flat.extend(flatten(children, nested)),
            Err(node) => flat.push(node),
        }
    }
    flat
}

/// Multiply out factors that all have canonical values into a single leaf of the product's
/// type, when that type is a number or a single base type.
fn fold_canonical(coefficient: f64, factors: &[CalcNode]) -> Option<CalcNode> {
    let mut value = coefficient;
    for factor in factors {
        match factor {
            CalcNode::Invert(inner) => value /= canonical_value(inner)?,
            other => value *= canonical_value(other)?,
        }
    }

    let ty = CalcNode::Product(factors.to_vec()).calc_type()?;
    if ty.percent_hint().is_some() {
        return None;
    }
    if ty.is_number() {
        return Some(CalcNode::Number(value));
    }
    match ty.single_base()? {
        units::BaseType::Percent => Some(CalcNode::Percentage(value)),
        base => Some(CalcNode::Dimension(value, base.canonical_unit().to_string())),
    }
}

fn canonical_value(node: &CalcNode) -> Option<f64> {
    match node {
        CalcNode::Number(value) | CalcNode::Percentage(value) => Some(*value),
        CalcNode::Dimension(value, unit) => units::to_canonical(*value, unit).map(|(value, _)| value),
        _ => None,
    }
}
