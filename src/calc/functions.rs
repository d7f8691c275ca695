//! Evaluation of math functions over simplified arguments.
//!
//! Each function evaluates when its arguments are numeric leaves that share a unit, or
//! can be converted to the first argument's unit. Otherwise the function node is kept, with
//! whatever partial simplification is exact (comparable `min()` arguments are merged, for
//! instance). All arithmetic follows IEEE-754: zeros keep their sign and infinities and
//! NaN propagate.

use super::node::{CalcNode, MathFunction};
use super::random::RandomSource;
use super::units::{self, BaseType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingStrategy {
    Nearest,
    Up,
    Down,
    ToZero,
}

impl RoundingStrategy {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "nearest" => Some(RoundingStrategy::Nearest),
            "up" => Some(RoundingStrategy::Up),
            "down" => Some(RoundingStrategy::Down),
            "to-zero" => Some(RoundingStrategy::ToZero),
            _ => None,
        }
    }
}

/// Evaluate `function` over already simplified `args`.
pub fn evaluate(function: MathFunction, args: Vec<CalcNode>, random: &dyn RandomSource) -> CalcNode {
    let evaluated = match function {
        MathFunction::Calc => args.first().cloned(),
        MathFunction::Min => return extremum(function, args, f64::min),
        MathFunction::Max => return extremum(function, args, f64::max),
        MathFunction::Clamp => clamp(&args),
        MathFunction::Round => round_node(&args),
        MathFunction::Mod => binary(&args, modulo),
        MathFunction::Rem => binary(&args, remainder),
        MathFunction::Sin => radians(&args).map(|x| CalcNode::Number(x.sin())),
        MathFunction::Cos => radians(&args).map(|x| CalcNode::Number(x.cos())),
        MathFunction::Tan => tangent(&args),
        MathFunction::Asin => number_arg(&args).map(|x| degrees(x.asin())),
        MathFunction::Acos => number_arg(&args).map(|x| degrees(x.acos())),
        MathFunction::Atan => number_arg(&args).map(|x| degrees(x.atan())),
        MathFunction::Atan2 => unify(&args).and_then(|values| match values[..] {
            [y, x] => Some(degrees(y.atan2(x))),
            _ => None,
        }),
        MathFunction::Pow => numbers(&args).and_then(|values| match values[..] {
            [base, exponent] => Some(CalcNode::Number(base.powf(exponent))),
            _ => None,
        }),
        MathFunction::Sqrt => number_arg(&args).map(|x| CalcNode::Number(x.sqrt())),
        MathFunction::Hypot => unify(&args).and_then(|values| {
            let total = values.iter().map(|value| value * value).sum::<f64>().sqrt();
            args.first()?.with_value(total)
        }),
        MathFunction::Log => numbers(&args).and_then(|values| match values[..] {
            [value] => Some(CalcNode::Number(value.ln())),
            [value, base] => Some(CalcNode::Number(value.ln() / base.ln())),
            _ => None,
        }),
        MathFunction::Exp => number_arg(&args).map(|x| CalcNode::Number(x.exp())),
        MathFunction::Abs => args
            .first()
            .and_then(|arg| arg.with_value(arg.value()?.abs())),
        MathFunction::Sign => args.first().and_then(|arg| {
            let value = arg.value()?;
            let sign = if value == 0.0 || value.is_nan() {
                value
            } else {
                value.signum()
            };
            Some(CalcNode::Number(sign))
        }),
        MathFunction::Progress => unify(&args).and_then(|values| match values[..] {
            [value, start, end] => Some(CalcNode::Number(progress(value, start, end))),
            _ => None,
        }),
        MathFunction::CalcMix => mix(&args),
        MathFunction::CalcInterpolate => interpolate(&args),
        MathFunction::Random => random_value(&args, random),
    };

    evaluated.unwrap_or(CalcNode::Function(function, args))
}

/// `min()` and `max()`: merge every group of comparable arguments into its extremum.
fn extremum(function: MathFunction, args: Vec<CalcNode>, pick: fn(f64, f64) -> f64) -> CalcNode {
    let mut kept: Vec<CalcNode> = Vec::with_capacity(args.len());
    for arg in args {
        let merged = kept.iter_mut().find_map(|slot| {
            let value = arg.value_in(slot)?;
            let current = slot.value()?;
            let picked = if value.is_nan() || current.is_nan() {
                f64::NAN
            } else {
                pick(current, value)
            };
            *slot = slot.with_value(picked)?;
            Some(())
        });
        if merged.is_none() {
            kept.push(arg);
        }
    }

    if kept.len() == 1 {
        kept.remove(0)
    } else {
        CalcNode::Function(function, kept)
    }
}

fn clamp(args: &[CalcNode]) -> Option<CalcNode> {
    let [min, value, max] = args else {
        return None;
    };
    let mut result = value.value()?;
    let bound = |node: &CalcNode| -> Option<Option<f64>> {
        if node.is_keyword("none") {
            Some(None)
        } else {
            node.value_in(value).map(Some)
        }
    };
    let (min, max) = (bound(min)?, bound(max)?);

    if [Some(result), min, max].iter().flatten().any(|v| v.is_nan()) {
        return value.with_value(f64::NAN);
    }
    if let Some(max) = max {
        result = result.min(max);
    }
    if let Some(min) = min {
        result = result.max(min);
    }
    value.with_value(result)
}

fn round_node(args: &[CalcNode]) -> Option<CalcNode> {
    let (strategy, operands) = match args.split_first()? {
        (CalcNode::Keyword(keyword), rest) => (RoundingStrategy::from_keyword(keyword)?, rest),
        _ => (RoundingStrategy::Nearest, args),
    };
    let (value, step) = match operands {
        [value] => (value.value()?, 1.0),
        [value, step] => (value.value()?, step.value_in(value)?),
        _ => return None,
    };
    operands[0].with_value(round(strategy, value, step))
}

/// Round `value` to a multiple of `step`.
pub fn round(strategy: RoundingStrategy, value: f64, step: f64) -> f64 {
    if value.is_nan() || step.is_nan() || step == 0.0 {
        return f64::NAN;
    }
    if value.is_infinite() {
        return if step.is_infinite() { f64::NAN } else { value };
    }
    let negative_zero_or = |positive: f64| if value.is_sign_negative() { -0.0 } else { positive };
    if step.is_infinite() {
        return match strategy {
            RoundingStrategy::Nearest | RoundingStrategy::ToZero => negative_zero_or(0.0),
            RoundingStrategy::Up if value > 0.0 => f64::INFINITY,
            RoundingStrategy::Up => negative_zero_or(0.0),
            RoundingStrategy::Down if value < 0.0 => f64::NEG_INFINITY,
            RoundingStrategy::Down => negative_zero_or(0.0),
        };
    }

    let step = step.abs();
    let lower = (value / step).floor() * step;
    let upper = (value / step).ceil() * step;
    let rounded = if lower == upper {
        value
    } else {
        match strategy {
            RoundingStrategy::Nearest if value - lower < upper - value => lower,
            RoundingStrategy::Nearest => upper,
            RoundingStrategy::Up => upper,
            RoundingStrategy::Down => lower,
            RoundingStrategy::ToZero if value > 0.0 => lower,
            RoundingStrategy::ToZero => upper,
        }
    };

    if rounded == 0.0 {
        negative_zero_or(0.0)
    } else {
        rounded
    }
}

/// `mod()`: the result takes the sign of the divisor.
pub fn modulo(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 || value.is_infinite() {
        return f64::NAN;
    }
    if divisor.is_infinite() {
        let same_sign = value.is_sign_negative() == divisor.is_sign_negative();
        return if same_sign { value } else { f64::NAN };
    }
    let remainder = value % divisor;
    if remainder != 0.0 && (remainder < 0.0) != (divisor < 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

/// `rem()`: the result takes the sign of the dividend.
pub fn remainder(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 || value.is_infinite() {
        return f64::NAN;
    }
    if divisor.is_infinite() {
        return value;
    }
    value % divisor
}

/// `progress()`: where `value` sits between `start` and `end`, unclamped.
pub fn progress(value: f64, start: f64, end: f64) -> f64 {
    if start == end {
        return 0.0;
    }
    (value - start) / (end - start)
}

fn binary(args: &[CalcNode], operation: fn(f64, f64) -> f64) -> Option<CalcNode> {
    let [value, divisor] = args else {
        return None;
    };
    value.with_value(operation(value.value()?, divisor.value_in(value)?))
}

/// All arguments expressed in the unit of the first.
fn unify(args: &[CalcNode]) -> Option<Vec<f64>> {
    let first = args.first()?;
    args.iter().map(|arg| arg.value_in(first)).collect()
}

fn numbers(args: &[CalcNode]) -> Option<Vec<f64>> {
    args.iter()
        .map(|arg| match arg {
            CalcNode::Number(value) => Some(*value),
            _ => None,
        })
        .collect()
}

fn number_arg(args: &[CalcNode]) -> Option<f64> {
    match args {
        [CalcNode::Number(value)] => Some(*value),
        _ => None,
    }
}

/// The argument of a trigonometric function in radians.
fn radians(args: &[CalcNode]) -> Option<f64> {
    match args {
        [CalcNode::Number(value)] => Some(*value),
        [CalcNode::Dimension(value, unit)] => {
            let (degrees, base) = units::to_canonical(*value, unit)?;
            (base == BaseType::Angle).then(|| degrees.to_radians())
        }
        _ => None,
    }
}

fn tangent(args: &[CalcNode]) -> Option<CalcNode> {
    let radians = radians(args)?;
    let degrees = radians.to_degrees();
    // Asymptotes are exact in degrees, not in radians.
    if degrees.is_finite() {
        let turn = degrees.rem_euclid(360.0);
        if (turn - 90.0).abs() < 1e-9 {
            return Some(CalcNode::Number(f64::INFINITY));
        }
        if (turn - 270.0).abs() < 1e-9 {
            return Some(CalcNode::Number(f64::NEG_INFINITY));
        }
    }
    Some(CalcNode::Number(radians.tan()))
}

fn degrees(radians: f64) -> CalcNode {
    CalcNode::Dimension(radians.to_degrees(), "deg".into())
}

fn mix(args: &[CalcNode]) -> Option<CalcNode> {
    let [progress, from, to] = args else {
        return None;
    };
    let progress = match progress {
        CalcNode::Number(value) => *value,
        CalcNode::Percentage(value) => value / 100.0,
        _ => return None,
    };
    let start = from.value()?;
    let end = to.value_in(from)?;
    from.with_value(start + (end - start) * progress)
}

fn interpolate(args: &[CalcNode]) -> Option<CalcNode> {
    let (progress, stops) = args.split_first()?;
    let inputs: Vec<&CalcNode> = stops.iter().step_by(2).collect();
    let outputs: Vec<&CalcNode> = stops.iter().skip(1).step_by(2).collect();
    let reference = *outputs.first()?;

    let position = progress.value()?;
    let inputs: Vec<f64> = inputs
        .iter()
        .map(|input| input.value_in(progress))
        .collect::<Option<_>>()?;
    let outputs: Vec<f64> = outputs
        .iter()
        .map(|output| output.value_in(reference))
        .collect::<Option<_>>()?;

    let last = inputs.len().checked_sub(1)?;
    if position <= inputs[0] {
        return reference.with_value(outputs[0]);
    }
    if position >= inputs[last] {
        return reference.with_value(outputs[last]);
    }
    for index in 0..last {
        let (start, end) = (inputs[index], inputs[index + 1]);
        if position >= start && position <= end {
            let value = if end == start {
                outputs[index + 1]
            } else {
                let fraction = (position - start) / (end - start);
                outputs[index] + (outputs[index + 1] - outputs[index]) * fraction
            };
            return reference.with_value(value);
        }
    }
    None
}

fn random_value(args: &[CalcNode], source: &dyn RandomSource) -> Option<CalcNode> {
    let split = args.iter().take_while(|arg| matches!(arg, CalcNode::Keyword(_))).count();
    let (options, operands) = args.split_at(split);
    let (min, max, step) = match operands {
        [min, max] => (min, max.value_in(min)?, None),
        [min, max, step] => (min, max.value_in(min)?, Some(step.value_in(min)?)),
        _ => return None,
    };
    let low = min.value()?;

    let dashed = options.iter().find_map(|option| match option {
        CalcNode::Keyword(name) if name.starts_with("--") => Some(name.clone()),
        _ => None,
    });
    let key = match dashed {
        Some(name) => name,
        None => crate::serialize::serialize_calc_node(
            &CalcNode::Function(MathFunction::Random, args.to_vec()),
            crate::serialize::DEFAULT_PRECISION,
        ),
    };
    let draw = source.value(&key);

    if !(low.is_finite() && max.is_finite()) || max < low {
        return min.with_value(if max < low { low } else { f64::NAN });
    }
    let value = match step {
        Some(step) if step > 0.0 && step.is_finite() => {
            let steps = ((max - low) / step).floor();
            low + (draw * (steps + 1.0)).floor().min(steps) * step
        }
        _ => low + draw * (max - low),
    };
    min.with_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RoundingStrategy::Nearest, 2.5, 1.0, 3.0)]
    #[case(RoundingStrategy::Nearest, -2.5, 1.0, -2.0)]
    #[case(RoundingStrategy::Up, 2.1, 1.0, 3.0)]
    #[case(RoundingStrategy::Down, 2.9, 1.0, 2.0)]
    #[case(RoundingStrategy::ToZero, -2.9, 1.0, -2.0)]
    #[case(RoundingStrategy::Nearest, 17.0, 5.0, 15.0)]
    fn test_round(
        #[case] strategy: RoundingStrategy,
        #[case] value: f64,
        #[case] step: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(round(strategy, value, step), expected);
    }

    #[test]
    fn test_round_zero_step_is_nan() {
        assert!(round(RoundingStrategy::Nearest, 1.0, 0.0).is_nan());
    }

    #[test]
    fn test_round_to_zero_from_negative_is_negative_zero() {
        let rounded = round(RoundingStrategy::Nearest, -1.0, 2.0);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_negative());
    }

    #[rstest]
    #[case(RoundingStrategy::Nearest, 5.0, 0.0)]
    #[case(RoundingStrategy::Nearest, -5.0, -0.0)]
    #[case(RoundingStrategy::Up, 5.0, f64::INFINITY)]
    #[case(RoundingStrategy::Up, -5.0, -0.0)]
    #[case(RoundingStrategy::Down, -5.0, f64::NEG_INFINITY)]
    #[case(RoundingStrategy::Down, 5.0, 0.0)]
    fn test_round_infinite_step(
        #[case] strategy: RoundingStrategy,
        #[case] value: f64,
        #[case] expected: f64,
    ) {
        let rounded = round(strategy, value, f64::INFINITY);
        assert_eq!(rounded, expected);
        assert_eq!(rounded.is_sign_negative(), expected.is_sign_negative());
    }

    #[test]
    fn test_mod_and_rem_signs() {
        assert_eq!(modulo(-5.0, 3.0), 1.0);
        assert_eq!(remainder(-5.0, 3.0), -2.0);
        assert_eq!(modulo(5.0, -3.0), -1.0);
        assert!(modulo(1.0, 0.0).is_nan());
        assert_eq!(remainder(3.0, f64::INFINITY), 3.0);
        assert!(modulo(-3.0, f64::INFINITY).is_nan());
        assert!(modulo(-0.0, f64::INFINITY).is_nan());
        assert!(modulo(0.0, f64::NEG_INFINITY).is_nan());
        let zero = modulo(0.0, f64::INFINITY);
        assert!(zero == 0.0 && zero.is_sign_positive());
        let negative_zero = modulo(-0.0, f64::NEG_INFINITY);
        assert!(negative_zero == 0.0 && negative_zero.is_sign_negative());
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(15.0, 10.0, 20.0), 0.5);
        assert_eq!(progress(30.0, 10.0, 20.0), 2.0);
        assert_eq!(progress(1.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn test_min_merges_comparable_arguments() {
        let args = vec![
            CalcNode::Dimension(2.0, "px".into()),
            CalcNode::Dimension(1.0, "em".into()),
            CalcNode::Dimension(1.0, "px".into()),
        ];
        let source = super::super::random::FixedRandom(0.0);
        assert_eq!(
            evaluate(MathFunction::Min, args, &source),
            CalcNode::Function(
                MathFunction::Min,
                vec![
                    CalcNode::Dimension(1.0, "px".into()),
                    CalcNode::Dimension(1.0, "em".into()),
                ]
            )
        );
    }

    #[test]
    fn test_tan_asymptote() {
        let source = super::super::random::FixedRandom(0.0);
        let tan = evaluate(
            MathFunction::Tan,
            vec![CalcNode::Dimension(90.0, "deg".into())],
            &source,
        );
        assert_eq!(tan, CalcNode::Number(f64::INFINITY));
    }

    #[test]
    fn test_random_with_step() {
        let source = super::super::random::FixedRandom(0.99);
        let value = evaluate(
            MathFunction::Random,
            vec![
                CalcNode::Number(0.0),
                CalcNode::Number(10.0),
                CalcNode::Number(5.0),
            ],
            &source,
        );
        assert_eq!(value, CalcNode::Number(10.0));
    }
}
