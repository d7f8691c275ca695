//! Context-sensitive upper bounds for unbounded repetitions.
//!
//! `*`, `+` and `#` never stay unbounded: the definition parser bakes a concrete `max` into
//! every repetition. Which bound applies depends on the production being compiled and on
//! the productions enclosing it, so the same grammar text (`<calc-sum>`'s, for instance) can
//! compile to different trees under `calc()` and under `min()`.

use crate::calc::is_math_function;
use crate::limits::Limits;

/// Productions whose repetitions count calculation operands.
const OPERAND_PRODUCTIONS: &[&str] = &["calc-sum", "calc-product"];

/// The bounds baked into unbounded repetitions of one compiled production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepetitionDefaults {
    /// Bound for `*` and `+`.
    pub space: u32,
    /// Bound for `#`.
    pub comma: u32,
}

impl RepetitionDefaults {
    /// Plain top-level defaults.
    pub fn top_level(limits: &Limits) -> Self {
        Self {
            space: limits.default_repetition_max,
            comma: limits.default_repetition_max,
        }
    }

    /// Defaults for the production at the head of `chain`, given the productions enclosing
    /// it, innermost first.
    pub fn for_productions<'a>(
        mut chain: impl Iterator<Item = &'a str>,
        limits: &Limits,
    ) -> Self {
        let Some(innermost) = chain.next() else {
            return Self::top_level(limits);
        };

        if OPERAND_PRODUCTIONS.contains(&innermost) {
            let budget = match chain.find(|production| is_math_function(production)) {
                None | Some("calc()") => limits.calc_operand_budget,
                Some(_) => limits.nested_operand_budget,
            };
            // One operand is the head of the sum or product; the repetition holds the rest.
            let max = budget.saturating_sub(1).max(1);
            return Self {
                space: max,
                comma: max,
            };
        }

        if is_math_function(innermost) {
            return Self {
                space: limits.default_repetition_max,
                comma: limits.calc_argument_budget,
            };
        }

        Self::top_level(limits)
    }
}
