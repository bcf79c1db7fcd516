//! Save schema: version number, field table, compensation schedule.
//!
//! Bump `CURRENT_VERSION` exactly once per incompatible shape change and
//! add a matching entry to `COMPENSATION_SCHEDULE`. Saves written under any
//! other version are bought out on load.

use serde_json::Value;

/// Schema revision written into every save produced by this build.
///
/// v1 = initial release
/// v2 = brand name, Robert, specialist, filler (`purchasedFiller`)
/// v3 = `hasFiller` rename, `helpCount`
pub const CURRENT_VERSION: u32 = 3;

/// Starting money of a blank save.
pub const BLANK_MONEY: f64 = 5.0;

/// Buy-out compensation per version bump: `(version_bump_number, amount)`.
/// Sorted ascending by version. Raise the amount with every bump.
pub const COMPENSATION_SCHEDULE: &[(u32, f64)] = &[(2, 25.0), (3, 50.0)];

/// JSON shape a persisted field must have to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-negative integer schema revision. Checked by the version gate only.
    Version,
    Flag,
    /// Non-negative integer.
    Counter,
    /// Finite, non-negative number.
    Money,
    /// String or null.
    OptionalText,
}

/// Every persisted field in canonical order.
/// Must list exactly the keys of `SaveState::blank()`.
pub const FIELDS: &[(&str, FieldKind)] = &[
    ("version", FieldKind::Version),
    ("wasBoughtOut", FieldKind::Flag),
    ("money", FieldKind::Money),
    ("hasBoughtBottle", FieldKind::Flag),
    ("emptyBottles", FieldKind::Counter),
    ("hasFilledBottle", FieldKind::Flag),
    ("filledBottles", FieldKind::Counter),
    ("hasSoldBottle", FieldKind::Flag),
    ("soldBottles", FieldKind::Counter),
    ("brandName", FieldKind::OptionalText),
    ("hasRobert", FieldKind::Flag),
    ("robertSoldBottles", FieldKind::Counter),
    ("payingRobert", FieldKind::Flag),
    ("hasSpecialist", FieldKind::Flag),
    ("specialistSoldBottles", FieldKind::Counter),
    ("hasFiller", FieldKind::Flag),
    ("fillerFilledBottles", FieldKind::Counter),
    ("helpCount", FieldKind::Counter),
];

/// Look up the kind of a wire field name.
pub fn field_kind(name: &str) -> Option<FieldKind> {
    FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}

impl FieldKind {
    /// Coerce a raw value into this kind, or `None` if it cannot be accepted.
    ///
    /// Integral floats are accepted as counters (`7.0` becomes `7`).
    /// Version values pass through untouched; the gate judges them.
    pub fn accept(self, value: &Value) -> Option<Value> {
        match self {
            FieldKind::Version => Some(value.clone()),
            FieldKind::Flag => value.as_bool().map(Value::Bool),
            FieldKind::Counter => {
                if let Some(n) = value.as_u64() {
                    return Some(Value::from(n));
                }
                let f = value.as_f64()?;
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 {
                    Some(Value::from(f as u64))
                } else {
                    None
                }
            }
            FieldKind::Money => {
                let f = value.as_f64()?;
                if f.is_finite() && f >= 0.0 {
                    Some(value.clone())
                } else {
                    None
                }
            }
            FieldKind::OptionalText => match value {
                Value::Null | Value::String(_) => Some(value.clone()),
                _ => None,
            },
        }
    }
}

/// Compensation paid when a save from another version is bought out.
///
/// Uses the entry for `version`; falls back to the highest entry below it,
/// then the lowest entry, then the blank money.
pub fn compensation_for(version: u32) -> f64 {
    compensation_from(COMPENSATION_SCHEDULE.iter().copied(), version)
}

/// Same fallback rule as `compensation_for`, over any schedule.
pub fn compensation_from<I>(schedule: I, version: u32) -> f64
where
    I: IntoIterator<Item = (u32, f64)>,
{
    let mut at_or_below: Option<(u32, f64)> = None;
    let mut lowest: Option<(u32, f64)> = None;
    for (v, amount) in schedule {
        if v <= version && at_or_below.map_or(true, |(best, _)| v > best) {
            at_or_below = Some((v, amount));
        }
        if lowest.map_or(true, |(low, _)| v < low) {
            lowest = Some((v, amount));
        }
    }
    at_or_below
        .or(lowest)
        .map(|(_, amount)| amount)
        .unwrap_or(BLANK_MONEY)
}
