//! Rectifier: decoded object in, complete current-version save out.
//!
//! Steps, in order:
//!   1. Default-fill: overlay the raw object onto the blank instance.
//!   2. Version gate: any version other than `CURRENT_VERSION` yields the
//!      buy-out state. No cross-version migration.
//!   3. Compatibility: legacy renames, type checking, counter/flag gates.
//!   4. Convert to a typed `SaveState`.
//!
//! Total: every input produces a usable state.

use serde_json::Value;

use crate::domain::{RawSave, SaveState};
use crate::report::{RectifyReport, Verdict};
use crate::rules::{is_legacy_field, GATE_RULES, RENAME_RULES};
use crate::schema::{compensation_for, field_kind, CURRENT_VERSION, FIELDS};

/// Migration engine, parameterised by the buy-out compensation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectifier {
    compensation: f64,
}

impl Default for Rectifier {
    fn default() -> Self {
        Self::new(compensation_for(CURRENT_VERSION))
    }
}

impl Rectifier {
    pub fn new(compensation: f64) -> Self {
        Self { compensation }
    }

    pub fn compensation(&self) -> f64 {
        self.compensation
    }

    /// Blank save flagged as bought out with this rectifier's compensation.
    pub fn buyout(&self) -> SaveState {
        SaveState::bought_out(self.compensation)
    }

    pub fn rectify(&self, raw: &RawSave) -> SaveState {
        self.rectify_with_report(raw).0
    }

    /// Rectify and describe every repair made along the way.
    pub fn rectify_with_report(&self, raw: &RawSave) -> (SaveState, RectifyReport) {
        let mut report = RectifyReport::new();
        let blank = SaveState::blank().to_raw();

        // -- 1. default-fill --
        let mut merged = blank.clone();
        for (key, value) in raw {
            merged.insert(key.clone(), value.clone());
        }

        // -- 2. version gate --
        let found = merged.get("version").cloned().unwrap_or(Value::Null);
        if found.as_u64() != Some(u64::from(CURRENT_VERSION)) {
            log::warn!(
                "Save version {} does not match current version {}; buying out with {}",
                found,
                CURRENT_VERSION,
                self.compensation
            );
            report.verdict = Verdict::BoughtOut { found };
            return (self.buyout(), report);
        }

        report.defaulted = FIELDS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !raw.contains_key(*name))
            .collect();
        report.ignored = raw
            .keys()
            .filter(|key| field_kind(key).is_none() && !is_legacy_field(key))
            .cloned()
            .collect();

        // -- 3a. legacy renames --
        for rule in RENAME_RULES {
            if rule.apply(&mut merged) {
                report.applied_rules.push(rule.describe());
                report.defaulted.retain(|name| *name != rule.target());
            }
        }

        // -- 3b. type checking --
        for (name, kind) in FIELDS {
            let Some(value) = merged.get(*name) else {
                continue;
            };
            match kind.accept(value) {
                Some(accepted) => {
                    merged.insert(name.to_string(), accepted);
                }
                None => {
                    log::warn!("Save field {} has unusable value {}; using default", name, value);
                    if let Some(default) = blank.get(*name) {
                        merged.insert(name.to_string(), default.clone());
                    }
                    report.rejected.push(*name);
                }
            }
        }

        // -- 3c. counter implies flag --
        for rule in GATE_RULES {
            if rule.apply(&mut merged) {
                report.applied_rules.push(rule.describe());
            }
        }

        // -- 4. typed state --
        match serde_json::from_value::<SaveState>(Value::Object(merged)) {
            Ok(state) => (state, report),
            Err(err) => {
                // Unreachable while every field passes its type check.
                log::error!(
                    "Current-version save failed typed conversion after repair ({}); buying out",
                    err
                );
                report.verdict = Verdict::Unconvertible {
                    error: err.to_string(),
                };
                (self.buyout(), report)
            }
        }
    }
}

/// Rectify with the default compensation schedule.
pub fn rectify(raw: &RawSave) -> SaveState {
    Rectifier::default().rectify(raw)
}

/// `rectify` plus the report of what changed.
pub fn rectify_with_report(raw: &RawSave) -> (SaveState, RectifyReport) {
    Rectifier::default().rectify_with_report(raw)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSave {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    // ── Version gate ────────────────────────────────────────────────

    #[test]
    fn older_version_is_bought_out() {
        let (state, report) = rectify_with_report(&raw(json!({
            "version": 2,
            "money": 12,
            "hasFiller": false,
            "fillerFilledBottles": 7
        })));
        assert_eq!(state, SaveState::bought_out(50.0));
        assert_eq!(state.filler_filled_bottles, 0);
        assert_eq!(report.verdict, Verdict::BoughtOut { found: json!(2) });
    }

    #[test]
    fn newer_and_malformed_versions_are_bought_out() {
        for version in [json!(4), json!("3"), json!(3.5), json!(null), json!(-3)] {
            let state = rectify(&raw(json!({ "version": version, "money": 900 })));
            assert_eq!(state, SaveState::bought_out(50.0), "version {}", version);
        }
    }

    #[test]
    fn buyout_uses_configured_compensation() {
        let rectifier = Rectifier::new(75.0);
        let state = rectifier.rectify(&raw(json!({ "version": 1 })));
        assert!(state.was_bought_out);
        assert_eq!(state.money, 75.0);
    }

    #[test]
    fn missing_version_inherits_current() {
        let state = rectify(&raw(json!({ "money": 9 })));
        assert_eq!(state.version, CURRENT_VERSION);
        assert_eq!(state.money, 9.0);
        assert!(!state.was_bought_out);
    }

    // ── Default-fill and compatibility ──────────────────────────────

    #[test]
    fn missing_flag_is_derived_from_counter() {
        let (state, report) = rectify_with_report(&raw(json!({
            "version": 3,
            "money": 12,
            "fillerFilledBottles": 7
        })));
        assert_eq!(state.money, 12.0);
        assert_eq!(state.filler_filled_bottles, 7);
        assert!(state.has_filler);
        assert_eq!(
            state,
            SaveState {
                money: 12.0,
                has_filler: true,
                filler_filled_bottles: 7,
                ..SaveState::blank()
            }
        );
        assert_eq!(report.verdict, Verdict::Current);
        assert!(report.defaulted.contains(&"hasFiller"));
        assert_eq!(report.applied_rules, vec!["fillerFilledBottles > 0 implies hasFiller"]);
    }

    #[test]
    fn legacy_filler_name_is_renamed() {
        let (state, report) = rectify_with_report(&raw(json!({
            "version": 3,
            "purchasedFiller": true
        })));
        assert!(state.has_filler);
        assert!(!report.defaulted.contains(&"hasFiller"));
        assert!(report.ignored.is_empty());
        assert_eq!(report.applied_rules, vec!["rename purchasedFiller -> hasFiller"]);
    }

    #[test]
    fn counter_wins_over_false_legacy_flag() {
        let state = rectify(&raw(json!({
            "version": 3,
            "purchasedFiller": false,
            "fillerFilledBottles": 2
        })));
        assert!(state.has_filler);
    }

    #[test]
    fn flag_true_with_zero_counter_is_kept() {
        let state = rectify(&raw(json!({
            "version": 3,
            "hasRobert": true,
            "robertSoldBottles": 0
        })));
        assert!(state.has_robert);
        assert_eq!(state.robert_sold_bottles, 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let (state, report) = rectify_with_report(&raw(json!({
            "version": 3,
            "money": 7,
            "prestigeLevel": 4
        })));
        assert_eq!(state.money, 7.0);
        assert_eq!(report.ignored, vec!["prestigeLevel".to_string()]);
    }

    #[test]
    fn wrongly_typed_fields_fall_back_to_defaults() {
        let (state, report) = rectify_with_report(&raw(json!({
            "version": 3,
            "money": "lots",
            "emptyBottles": -4,
            "filledBottles": 3.0,
            "brandName": 12,
            "hasSoldBottle": "yes"
        })));
        assert_eq!(state.money, 5.0);
        assert_eq!(state.empty_bottles, 0);
        assert_eq!(state.filled_bottles, 3);
        assert!(state.has_filled_bottle);
        assert_eq!(state.brand_name, None);
        assert!(!state.has_sold_bottle);
        assert_eq!(report.rejected, vec!["money", "emptyBottles", "hasSoldBottle", "brandName"]);
    }

    #[test]
    fn complete_current_save_is_clean() {
        let save = SaveState {
            money: 31.5,
            has_bought_bottle: true,
            empty_bottles: 4,
            brand_name: Some("Clear Spring".to_string()),
            paying_robert: true,
            ..SaveState::blank()
        };
        let (state, report) = rectify_with_report(&save.to_raw());
        assert_eq!(state, save);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn empty_object_rectifies_to_blank() {
        let (state, report) = rectify_with_report(&RawSave::new());
        assert_eq!(state, SaveState::blank());
        assert_eq!(report.defaulted.len(), FIELDS.len());
    }

    #[test]
    fn rectifying_twice_changes_nothing() {
        let first = rectify(&raw(json!({
            "version": 3,
            "purchasedFiller": true,
            "soldBottles": 9,
            "junk": [1, 2]
        })));
        let second = rectify(&first.to_raw());
        assert_eq!(first, second);
    }
}
