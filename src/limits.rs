//! Resource ceilings for the matcher and the calculation engine.
//!
//! A match attempt that would exceed one of these ceilings simply fails, letting an outer
//! alternative try a smaller shape. They bound grammar shapes, not input length: native
//! stack use grows with the number of tokens matched and is handled by the matcher, which
//! extends its stack on demand. There is no timeout mechanism.

use serde::Deserialize;

/// Limits applied while compiling and matching grammars.
///
/// The values mirror `vds-config`'s embedded defaults; [`Limits::default`] and the TOML
/// defaults are kept in sync by a test in that crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limits {
    /// Upper bound baked into an unbounded `*`, `+` or `#` outside calculation productions.
    pub default_repetition_max: u32,
    /// Leaf operands allowed in one top-level math function.
    pub calc_operand_budget: u32,
    /// Operand budget for a sum or product nested in a math function other than `calc()`.
    pub nested_operand_budget: u32,
    /// Upper bound for comma-separated math function arguments.
    pub calc_argument_budget: u32,
    /// Nesting ceiling for calculation trees.
    pub max_calc_depth: u32,
    /// Ceiling on context frames pushed by non-terminal expansion.
    pub max_context_depth: u32,
    /// Fractional digits kept when serializing numbers.
    pub precision: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_repetition_max: 20,
            calc_operand_budget: 32,
            nested_operand_budget: 16,
            calc_argument_budget: 32,
            max_calc_depth: 32,
            max_context_depth: 128,
            precision: 6,
        }
    }
}
