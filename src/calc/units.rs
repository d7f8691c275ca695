//! Units and the base types they measure.
//!
//! Absolute units carry a linear factor to their base type's canonical unit (`px`, `deg`,
//! `s`, `hz`, `dppx`). Relative units (`em`, `vw`, ...) have no factor: they combine only
//! with themselves and stay symbolic otherwise.

use serde::Serialize;

/// The base types of a calculation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BaseType {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
    Flex,
    Decibel,
    Semitones,
    Percent,
}

impl BaseType {
    pub const ALL: [BaseType; 9] = [
        BaseType::Length,
        BaseType::Angle,
        BaseType::Time,
        BaseType::Frequency,
        BaseType::Resolution,
        BaseType::Flex,
        BaseType::Decibel,
        BaseType::Semitones,
        BaseType::Percent,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn canonical_unit(self) -> &'static str {
        match self {
            BaseType::Length => "px",
            BaseType::Angle => "deg",
            BaseType::Time => "s",
            BaseType::Frequency => "hz",
            BaseType::Resolution => "dppx",
            BaseType::Flex => "fr",
            BaseType::Decibel => "db",
            BaseType::Semitones => "st",
            BaseType::Percent => "%",
        }
    }

    /// The base type measured by a numeric production, e.g. `length` or
    /// `angle-percentage`.
    pub fn for_production(name: &str) -> Option<BaseType> {
        let base = match name.strip_suffix("-percentage").unwrap_or(name) {
            "length" => BaseType::Length,
            "angle" => BaseType::Angle,
            "time" => BaseType::Time,
            "frequency" => BaseType::Frequency,
            "resolution" => BaseType::Resolution,
            "flex" => BaseType::Flex,
            "decibel" => BaseType::Decibel,
            "semitones" => BaseType::Semitones,
            "percentage" => BaseType::Percent,
            _ => return None,
        };
        Some(base)
    }
}

/// What a unit measures and, for absolute units, how many canonical units it is worth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitInfo {
    /// Canonical spelling of the unit.
    pub name: &'static str,
    pub base: BaseType,
    pub factor: Option<f64>,
}

const UNITS: &[(&str, BaseType, Option<f64>)] = &[
    // Absolute lengths
    ("px", BaseType::Length, Some(1.0)),
    ("cm", BaseType::Length, Some(96.0 / 2.54)),
    ("mm", BaseType::Length, Some(96.0 / 25.4)),
    ("Q", BaseType::Length, Some(96.0 / 101.6)),
    ("in", BaseType::Length, Some(96.0)),
    ("pt", BaseType::Length, Some(96.0 / 72.0)),
    ("pc", BaseType::Length, Some(16.0)),
    // Font-relative lengths
    ("em", BaseType::Length, None),
    ("rem", BaseType::Length, None),
    ("ex", BaseType::Length, None),
    ("rex", BaseType::Length, None),
    ("cap", BaseType::Length, None),
    ("rcap", BaseType::Length, None),
    ("ch", BaseType::Length, None),
    ("rch", BaseType::Length, None),
    ("ic", BaseType::Length, None),
    ("ric", BaseType::Length, None),
    ("lh", BaseType::Length, None),
    ("rlh", BaseType::Length, None),
    // Viewport and container lengths
    ("vw", BaseType::Length, None),
    ("vh", BaseType::Length, None),
    ("vi", BaseType::Length, None),
    ("vb", BaseType::Length, None),
    ("vmin", BaseType::Length, None),
    ("vmax", BaseType::Length, None),
    ("svw", BaseType::Length, None),
    ("svh", BaseType::Length, None),
    ("lvw", BaseType::Length, None),
    ("lvh", BaseType::Length, None),
    ("dvw", BaseType::Length, None),
    ("dvh", BaseType::Length, None),
    ("cqw", BaseType::Length, None),
    ("cqh", BaseType::Length, None),
    ("cqi", BaseType::Length, None),
    ("cqb", BaseType::Length, None),
    ("cqmin", BaseType::Length, None),
    ("cqmax", BaseType::Length, None),
    // Angles
    ("deg", BaseType::Angle, Some(1.0)),
    ("grad", BaseType::Angle, Some(0.9)),
    ("rad", BaseType::Angle, Some(180.0 / std::f64::consts::PI)),
    ("turn", BaseType::Angle, Some(360.0)),
    // Times
    ("s", BaseType::Time, Some(1.0)),
    ("ms", BaseType::Time, Some(0.001)),
    // Frequencies
    ("hz", BaseType::Frequency, Some(1.0)),
    ("khz", BaseType::Frequency, Some(1000.0)),
    // Resolutions
    ("dppx", BaseType::Resolution, Some(1.0)),
    ("x", BaseType::Resolution, Some(1.0)),
    ("dpi", BaseType::Resolution, Some(1.0 / 96.0)),
    ("dpcm", BaseType::Resolution, Some(2.54 / 96.0)),
    // Others
    ("fr", BaseType::Flex, Some(1.0)),
    ("db", BaseType::Decibel, Some(1.0)),
    ("st", BaseType::Semitones, Some(1.0)),
    ("%", BaseType::Percent, Some(1.0)),
];

/// Look up a unit, ASCII case-insensitively.
pub fn unit_info(unit: &str) -> Option<UnitInfo> {
    UNITS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(unit))
        .map(|&(name, base, factor)| UnitInfo { name, base, factor })
}

/// Convert `value` in `unit` to its base type's canonical unit. Relative units have no
/// canonical value.
pub fn to_canonical(value: f64, unit: &str) -> Option<(f64, BaseType)> {
    let info = unit_info(unit)?;
    Some((value * info.factor?, info.base))
}

/// Convert `value` from one unit to another of the same base type.
///
/// Identical units always convert, relative ones included.
pub fn convert(value: f64, from: &str, to: &str) -> Option<f64> {
    let from = unit_info(from)?;
    let to = unit_info(to)?;
    if from.name == to.name {
        return Some(value);
    }
    if from.base != to.base {
        return None;
    }
    Some(value * from.factor? / to.factor?)
}
