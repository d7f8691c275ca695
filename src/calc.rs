//! The calculation engine.
//!
//!     When a numeric production meets a math function, the matcher first matches the
//!     function against the built-in math function grammars, then hands the match tree
//!     here. Resolution is a short pipeline; any stage can fail, and a failure is an
//!     ordinary match failure for the enclosing numeric production.
//!
//! Pipeline
//!
//!     Building:
//!         [build] walks the match tree into a [CalcNode] tree, bounded in depth. The
//!         whole tree may hold at most `calc_operand_budget` numeric leaves.
//!
//!     Typing:
//!         [CalcNode::calc_type] derives the calculation type bottom-up ([types]); operands
//!         that cannot combine fail here. The type must then satisfy the [Expected] type of
//!         the production that asked.
//!
//!     Simplification:
//!         [simplify] folds comparable terms, converts units ([units]) and evaluates math
//!         functions ([functions]) in full double precision. `random()` draws from a keyed
//!         [RandomSource] ([random]).
//!
//! Precision is only reduced at serialization time.

pub mod build;
pub mod functions;
pub mod node;
pub mod random;
pub mod simplify;
pub mod types;
pub mod units;

use serde::Serialize;

use crate::limits::Limits;
use crate::matching::Match;

pub use node::{CalcNode, MathFunction};
pub use random::{FixedRandom, HashedRandom, RandomSource};
pub use types::{CalcType, Expected};
pub use units::BaseType;

/// A resolved math function: its simplified tree and the type it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcValue {
    pub root: CalcNode,
    pub ty: CalcType,
}

impl CalcValue {
    /// The value in the canonical unit of its type, when the tree reduced to a single
    /// leaf with an absolute unit.
    pub fn canonical_value(&self) -> Option<f64> {
        match &self.root {
            CalcNode::Number(value) | CalcNode::Percentage(value) => Some(*value),
            CalcNode::Dimension(value, unit) => units::to_canonical(*value, unit).map(|(v, _)| v),
            _ => None,
        }
    }

    /// This value rounded to the nearest integer, for integer contexts. Symbolic values are
    /// left alone.
    pub fn rounded(self) -> Self {
        match self.root {
            CalcNode::Number(value) => Self {
                root: CalcNode::Number(functions::round(
                    functions::RoundingStrategy::Nearest,
                    value,
                    1.0,
                )),
                ..self
            },
            _ => self,
        }
    }
}

/// Whether `name` names a math function, with or without `()`.
pub fn is_math_function(name: &str) -> bool {
    MathFunction::from_name(name).is_some()
}

/// Resolve a matched math function against the type a production expects.
pub fn resolve(
    matched: &Match,
    expected: Expected,
    limits: &Limits,
    random: &dyn RandomSource,
) -> Option<CalcValue> {
    let tree = build::build(matched, limits.max_calc_depth)?;
    let operands = tree.operand_count();
    if operands > limits.calc_operand_budget {
        log::trace!(
            "{operands} calculation operands exceed {}",
            limits.calc_operand_budget
        );
        return None;
    }
    let Some(ty) = tree.calc_type() else {
        log::trace!("calculation operands do not combine");
        return None;
    };
    if !ty.matches(expected) {
        log::trace!("calculation type {ty:?} does not satisfy {expected:?}");
        return None;
    }
    Some(CalcValue {
        root: simplify::simplify(tree, random),
        ty,
    })
}
