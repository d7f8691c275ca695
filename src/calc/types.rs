//! Calculation types.
//!
//! A type is a map from base type to exponent plus an optional percent hint. `1px` is
//! `{length: 1}`, `2px * 3px` is `{length: 2}`, `1px / 1px` is empty (a number). Adding a
//! percentage to a length moves the percent exponent onto length and records the hint, so
//! the result still remembers that it only resolves once percentages do.

use serde::Serialize;

use super::units::BaseType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalcType {
    exponents: [i32; 9],
    percent_hint: Option<BaseType>,
}

impl CalcType {
    pub fn number() -> Self {
        Self::default()
    }

    pub fn percentage() -> Self {
        Self::of(BaseType::Percent)
    }

    /// The type of a single value measured in `base`.
    pub fn of(base: BaseType) -> Self {
        let mut ty = Self::default();
        ty.exponents[base.index()] = 1;
        ty
    }

    pub fn exponent(&self, base: BaseType) -> i32 {
        self.exponents[base.index()]
    }

    pub fn percent_hint(&self) -> Option<BaseType> {
        self.percent_hint
    }

    pub fn is_number(&self) -> bool {
        self.exponents.iter().all(|&exponent| exponent == 0)
    }

    fn apply_hint(mut self, hint: BaseType) -> Self {
        let percent = self.exponents[BaseType::Percent.index()];
        self.exponents[BaseType::Percent.index()] = 0;
        self.exponents[hint.index()] += percent;
        self.percent_hint = Some(hint);
        self
    }

    /// Bring two types to a shared percent hint, if they have compatible ones.
    fn unify_hints(self, other: Self) -> Option<(Self, Self)> {
        match (self.percent_hint, other.percent_hint) {
            (Some(a), Some(b)) if a != b => None,
            (Some(hint), None) => Some((self, other.apply_hint(hint))),
            (None, Some(hint)) => Some((self.apply_hint(hint), other)),
            _ => Some((self, other)),
        }
    }

    /// The type of a sum of values of these two types.
    pub fn add(self, other: Self) -> Option<Self> {
        let (left, right) = self.unify_hints(other)?;
        if left.exponents == right.exponents {
            return Some(Self {
                exponents: left.exponents,
                percent_hint: left.percent_hint.or(right.percent_hint),
            });
        }

        let has_percent = left.exponent(BaseType::Percent) != 0
            || right.exponent(BaseType::Percent) != 0;
        let has_other = BaseType::ALL
            .iter()
            .filter(|&&base| base != BaseType::Percent)
            .any(|&base| left.exponent(base) != 0 || right.exponent(base) != 0);
        if !(has_percent && has_other) {
            return None;
        }

        BaseType::ALL
            .iter()
            .filter(|&&base| base != BaseType::Percent)
            .find_map(|&hint| {
                let left = left.apply_hint(hint);
                let right = right.apply_hint(hint);
                (left.exponents == right.exponents).then_some(left)
            })
    }

    /// The type of a product of values of these two types.
    pub fn multiply(self, other: Self) -> Option<Self> {
        let (left, right) = self.unify_hints(other)?;
        let mut exponents = left.exponents;
        for (exponent, other) in exponents.iter_mut().zip(right.exponents) {
            *exponent += other;
        }
        Some(Self {
            exponents,
            percent_hint: left.percent_hint.or(right.percent_hint),
        })
    }

    pub fn invert(self) -> Self {
        Self {
            exponents: self.exponents.map(|exponent| -exponent),
            percent_hint: self.percent_hint,
        }
    }

    /// The base type of a type that is exactly one base type to the first power.
    pub fn single_base(&self) -> Option<BaseType> {
        BaseType::ALL
            .into_iter()
            .find(|&base| self.is_single(base))
    }

    /// Whether the type is exactly `base` to the first power.
    fn is_single(&self, base: BaseType) -> bool {
        BaseType::ALL.iter().all(|&other| {
            let expected = if other == base { 1 } else { 0 };
            self.exponent(other) == expected
        })
    }

    /// Whether a value of this type is acceptable where `expected` is.
    pub fn matches(&self, expected: Expected) -> bool {
        match expected.base {
            None => self.is_number() && self.percent_hint.is_none(),
            Some(BaseType::Percent) => self.is_single(BaseType::Percent),
            Some(base) => {
                if self.is_single(base) {
                    self.percent_hint.is_none() || expected.percent
                } else {
                    expected.percent && self.is_single(BaseType::Percent)
                }
            }
        }
    }
}

/// The type a numeric production expects a math function to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    /// `None` for numbers.
    pub base: Option<BaseType>,
    /// Percentages are accepted and may mix with `base`.
    pub percent: bool,
}

impl Expected {
    pub const NUMBER: Expected = Expected {
        base: None,
        percent: false,
    };

    pub fn for_production(name: &str) -> Option<Expected> {
        match name {
            "number" | "integer" => Some(Self::NUMBER),
            _ => BaseType::for_production(name).map(|base| Expected {
                base: Some(base),
                percent: name.ends_with("-percentage"),
            }),
        }
    }
}
