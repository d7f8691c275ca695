//! The calculation tree.

use serde::Serialize;

use super::types::CalcType;
use super::units::{self, BaseType};

/// Math functions, by the name they are written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MathFunction {
    Calc,
    Min,
    Max,
    Clamp,
    Round,
    Mod,
    Rem,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Pow,
    Sqrt,
    Hypot,
    Log,
    Exp,
    Abs,
    Sign,
    Progress,
    CalcMix,
    CalcInterpolate,
    Random,
}

impl MathFunction {
    pub const ALL: [MathFunction; 25] = [
        MathFunction::Calc,
        MathFunction::Min,
        MathFunction::Max,
        MathFunction::Clamp,
        MathFunction::Round,
        MathFunction::Mod,
        MathFunction::Rem,
        MathFunction::Sin,
        MathFunction::Cos,
        MathFunction::Tan,
        MathFunction::Asin,
        MathFunction::Acos,
        MathFunction::Atan,
        MathFunction::Atan2,
        MathFunction::Pow,
        MathFunction::Sqrt,
        MathFunction::Hypot,
        MathFunction::Log,
        MathFunction::Exp,
        MathFunction::Abs,
        MathFunction::Sign,
        MathFunction::Progress,
        MathFunction::CalcMix,
        MathFunction::CalcInterpolate,
        MathFunction::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MathFunction::Calc => "calc",
            MathFunction::Min => "min",
            MathFunction::Max => "max",
            MathFunction::Clamp => "clamp",
            MathFunction::Round => "round",
            MathFunction::Mod => "mod",
            MathFunction::Rem => "rem",
            MathFunction::Sin => "sin",
            MathFunction::Cos => "cos",
            MathFunction::Tan => "tan",
            MathFunction::Asin => "asin",
            MathFunction::Acos => "acos",
            MathFunction::Atan => "atan",
            MathFunction::Atan2 => "atan2",
            MathFunction::Pow => "pow",
            MathFunction::Sqrt => "sqrt",
            MathFunction::Hypot => "hypot",
            MathFunction::Log => "log",
            MathFunction::Exp => "exp",
            MathFunction::Abs => "abs",
            MathFunction::Sign => "sign",
            MathFunction::Progress => "progress",
            MathFunction::CalcMix => "calc-mix",
            MathFunction::CalcInterpolate => "calc-interpolate",
            MathFunction::Random => "random",
        }
    }

    /// Look up a function by name, with or without the `()` of its production name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_suffix("()").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|function| function.name().eq_ignore_ascii_case(name))
    }
}

/// A node of a calculation tree.
///
/// Subtraction and division are not nodes of their own: `a - b` is a sum with a negated
/// term and `a / b` a product with an inverted factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CalcNode {
    Number(f64),
    Percentage(f64),
    /// A value with a known unit, in the unit's canonical spelling.
    Dimension(f64, String),
    /// A keyword argument: a rounding strategy, `none`, or a random caching option.
    Keyword(String),
    Sum(Vec<CalcNode>),
    Product(Vec<CalcNode>),
    Negate(Box<CalcNode>),
    Invert(Box<CalcNode>),
    Function(MathFunction, Vec<CalcNode>),
}

impl CalcNode {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CalcNode::Number(_) | CalcNode::Percentage(_) | CalcNode::Dimension(..)
        )
    }

    /// The numeric value of a leaf.
    pub fn value(&self) -> Option<f64> {
        match self {
            CalcNode::Number(value) | CalcNode::Percentage(value) | CalcNode::Dimension(value, _) => {
                Some(*value)
            }
            _ => None,
        }
    }

    /// A leaf of the same kind and unit with another value.
    pub fn with_value(&self, value: f64) -> Option<CalcNode> {
        match self {
            CalcNode::Number(_) => Some(CalcNode::Number(value)),
            CalcNode::Percentage(_) => Some(CalcNode::Percentage(value)),
            CalcNode::Dimension(_, unit) => Some(CalcNode::Dimension(value, unit.clone())),
            _ => None,
        }
    }

    /// The value of this leaf expressed in the unit of `reference`, when both are leaves of
    /// the same kind that can be compared directly.
    pub fn value_in(&self, reference: &CalcNode) -> Option<f64> {
        match (self, reference) {
            (CalcNode::Number(value), CalcNode::Number(_))
            | (CalcNode::Percentage(value), CalcNode::Percentage(_)) => Some(*value),
            (CalcNode::Dimension(value, unit), CalcNode::Dimension(_, target)) => {
                units::convert(*value, unit, target)
            }
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, CalcNode::Keyword(word) if word.eq_ignore_ascii_case(keyword))
    }

    /// The calculation type of this node, or `None` when its operands cannot combine.
    pub fn calc_type(&self) -> Option<CalcType> {
        match self {
            CalcNode::Number(_) => Some(CalcType::number()),
            CalcNode::Percentage(_) => Some(CalcType::percentage()),
            CalcNode::Dimension(_, unit) => {
                units::unit_info(unit).map(|info| CalcType::of(info.base))
            }
            CalcNode::Keyword(_) => None,
            CalcNode::Sum(terms) => sum_type(terms.iter()),
            CalcNode::Product(factors) => {
                let mut factors = factors.iter();
                let first = factors.next()?.calc_type()?;
                factors.try_fold(first, |ty, factor| ty.multiply(factor.calc_type()?))
            }
            CalcNode::Negate(inner) => inner.calc_type(),
            CalcNode::Invert(inner) => inner.calc_type().map(CalcType::invert),
            CalcNode::Function(function, args) => function_type(*function, args),
        }
    }

    /// Numeric leaves in this tree. Keyword arguments are not operands.
    pub fn operand_count(&self) -> u32 {
        match self {
            CalcNode::Sum(children) | CalcNode::Product(children) | CalcNode::Function(_, children) => {
                children.iter().map(CalcNode::operand_count).sum()
            }
            CalcNode::Negate(inner) | CalcNode::Invert(inner) => inner.operand_count(),
            leaf => u32::from(leaf.is_numeric()),
        }
    }
}

/// The type shared by several operands, e.g. the arguments of `min()`.
fn sum_type<'a>(mut terms: impl Iterator<Item = &'a CalcNode>) -> Option<CalcType> {
    let first = terms.next()?.calc_type()?;
    terms.try_fold(first, |ty, term| ty.add(term.calc_type()?))
}

fn is_number_or_percentage(ty: CalcType) -> bool {
    ty.is_number() || ty.add(CalcType::percentage()) == Some(CalcType::percentage())
}

fn function_type(function: MathFunction, args: &[CalcNode]) -> Option<CalcType> {
    let numeric = || args.iter().filter(|arg| !matches!(arg, CalcNode::Keyword(_)));
    let number = CalcType::number();

    match function {
        MathFunction::Calc | MathFunction::Min | MathFunction::Max | MathFunction::Hypot => {
            sum_type(numeric())
        }
        MathFunction::Clamp => {
            let ty = sum_type(numeric())?;
            (args.len() == 3).then_some(ty)
        }
        MathFunction::Abs => sum_type(args.iter()),
        MathFunction::Round => {
            let values: Vec<&CalcNode> = numeric().collect();
            let ty = sum_type(values.iter().copied())?;
            // The step may only be left out for plain numbers.
            (values.len() == 2 || ty.is_number()).then_some(ty)
        }
        MathFunction::Mod | MathFunction::Rem => sum_type(args.iter()),
        MathFunction::Sin | MathFunction::Cos | MathFunction::Tan => {
            let ty = args.first()?.calc_type()?;
            let angle = CalcType::of(BaseType::Angle);
            (ty == number || ty == angle).then_some(number)
        }
        MathFunction::Asin | MathFunction::Acos | MathFunction::Atan => {
            (args.first()?.calc_type()? == number).then_some(CalcType::of(BaseType::Angle))
        }
        MathFunction::Atan2 => {
            sum_type(args.iter())?;
            Some(CalcType::of(BaseType::Angle))
        }
        MathFunction::Pow | MathFunction::Sqrt | MathFunction::Log | MathFunction::Exp => args
            .iter()
            .try_fold(number, |_, arg| (arg.calc_type()? == number).then_some(number)),
        MathFunction::Sign => {
            args.first()?.calc_type()?;
            Some(number)
        }
        MathFunction::Progress => {
            sum_type(args.iter())?;
            Some(number)
        }
        MathFunction::CalcMix => {
            let [progress, from, to] = args else {
                return None;
            };
            if !is_number_or_percentage(progress.calc_type()?) {
                return None;
            }
            sum_type([from, to].into_iter())
        }
        MathFunction::CalcInterpolate => {
            let (progress, stops) = args.split_first()?;
            if stops.is_empty() || stops.len() % 2 != 0 {
                return None;
            }
            let inputs = stops.iter().step_by(2);
            let outputs = stops.iter().skip(1).step_by(2);
            sum_type(std::iter::once(progress).chain(inputs))?;
            sum_type(outputs)
        }
        MathFunction::Random => sum_type(numeric()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: f64) -> CalcNode {
        CalcNode::Dimension(value, "px".into())
    }

    #[test]
    fn test_function_lookup() {
        assert_eq!(MathFunction::from_name("calc()"), Some(MathFunction::Calc));
        assert_eq!(MathFunction::from_name("CALC-MIX"), Some(MathFunction::CalcMix));
        assert_eq!(MathFunction::from_name("var"), None);
    }

    #[test]
    fn test_sum_type_rejects_mixed_kinds() {
        let sum = CalcNode::Sum(vec![px(1.0), CalcNode::Number(1.0)]);
        assert_eq!(sum.calc_type(), None);
    }

    #[test]
    fn test_product_type() {
        let product = CalcNode::Product(vec![
            px(3.0),
            px(2.0),
            CalcNode::Invert(Box::new(px(2.0))),
        ]);
        assert_eq!(product.calc_type(), Some(CalcType::of(BaseType::Length)));
    }

    #[test]
    fn test_trig_accepts_angles_only() {
        let sin = CalcNode::Function(
            MathFunction::Sin,
            vec![CalcNode::Dimension(90.0, "deg".into())],
        );
        assert_eq!(sin.calc_type(), Some(CalcType::number()));
        let bad = CalcNode::Function(MathFunction::Sin, vec![px(1.0)]);
        assert_eq!(bad.calc_type(), None);
    }

    #[test]
    fn test_round_without_step_needs_number() {
        let length = CalcNode::Function(MathFunction::Round, vec![px(1.0)]);
        assert_eq!(length.calc_type(), None);
        let number = CalcNode::Function(MathFunction::Round, vec![CalcNode::Number(1.5)]);
        assert_eq!(number.calc_type(), Some(CalcType::number()));
    }

    #[test]
    fn test_operand_count() {
        let nested = CalcNode::Sum(vec![
            px(1.0),
            CalcNode::Product(vec![
                CalcNode::Number(2.0),
                CalcNode::Invert(Box::new(px(1.0))),
            ]),
            CalcNode::Function(
                MathFunction::Round,
                vec![CalcNode::Keyword("up".into()), px(3.0), px(2.0)],
            ),
        ]);
        assert_eq!(nested.operand_count(), 5);
        assert_eq!(CalcNode::Keyword("none".into()).operand_count(), 0);
    }
}
