//! Intra-version compatibility rules.
//!
//! Saves that carry the current version number but were written by an
//! earlier build of that version may use legacy field names, or hold a
//! nonzero counter without the flag it implies. Each rule repairs one
//! field and is idempotent.
//!
//! Renames run before type checking, flag derivations after. Derivations
//! only ever set a flag to `true`, so order within each phase is irrelevant.

use serde_json::Value;

use crate::domain::RawSave;

/// A single declarative repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatRule {
    /// If `legacy` is present, move its value into `modern`.
    Rename {
        legacy: &'static str,
        modern: &'static str,
    },
    /// If `counter > 0`, force `flag = true`.
    CounterImpliesFlag {
        counter: &'static str,
        flag: &'static str,
    },
}

/// Legacy field renames, applied before type checking.
pub const RENAME_RULES: &[CompatRule] = &[CompatRule::Rename {
    legacy: "purchasedFiller",
    modern: "hasFiller",
}];

/// Counter/flag gates, applied after type checking.
pub const GATE_RULES: &[CompatRule] = &[
    CompatRule::CounterImpliesFlag {
        counter: "emptyBottles",
        flag: "hasBoughtBottle",
    },
    CompatRule::CounterImpliesFlag {
        counter: "filledBottles",
        flag: "hasFilledBottle",
    },
    CompatRule::CounterImpliesFlag {
        counter: "soldBottles",
        flag: "hasSoldBottle",
    },
    CompatRule::CounterImpliesFlag {
        counter: "robertSoldBottles",
        flag: "hasRobert",
    },
    CompatRule::CounterImpliesFlag {
        counter: "specialistSoldBottles",
        flag: "hasSpecialist",
    },
    CompatRule::CounterImpliesFlag {
        counter: "fillerFilledBottles",
        flag: "hasFiller",
    },
];

impl CompatRule {
    /// Field this rule writes.
    pub fn target(&self) -> &'static str {
        match self {
            CompatRule::Rename { modern, .. } => *modern,
            CompatRule::CounterImpliesFlag { flag, .. } => *flag,
        }
    }

    /// Apply to `save` in place. Returns true if anything changed.
    pub fn apply(&self, save: &mut RawSave) -> bool {
        match *self {
            CompatRule::Rename { legacy, modern } => match save.remove(legacy) {
                Some(value) => {
                    log::debug!("compat: {} -> {}", legacy, modern);
                    save.insert(modern.to_string(), value);
                    true
                }
                None => false,
            },
            CompatRule::CounterImpliesFlag { counter, flag } => {
                let used = save.get(counter).and_then(Value::as_u64).unwrap_or(0) > 0;
                let set = save.get(flag).and_then(Value::as_bool).unwrap_or(false);
                if used && !set {
                    log::debug!("compat: {} > 0 implies {}", counter, flag);
                    save.insert(flag.to_string(), Value::Bool(true));
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CompatRule::Rename { legacy, modern } => format!("rename {} -> {}", legacy, modern),
            CompatRule::CounterImpliesFlag { counter, flag } => {
                format!("{} > 0 implies {}", counter, flag)
            }
        }
    }
}

/// Whether `name` is a legacy key some rule consumes.
pub fn is_legacy_field(name: &str) -> bool {
    RENAME_RULES.iter().any(|rule| match rule {
        CompatRule::Rename { legacy, .. } => *legacy == name,
        CompatRule::CounterImpliesFlag { .. } => false,
    })
}
