//! Save domain types.
//!
//! `SaveState` is the single persisted entity. `RawSave` is what the codec
//! hands back before rectification: a JSON object of unknown shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{BLANK_MONEY, CURRENT_VERSION};

/// Decoded, untrusted save object.
pub type RawSave = Map<String, Value>;

// ── Core Domain Types ──────────────────────────────────────────────

/// Complete save state. Field order is the canonical text order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub version: u32,
    /// Set when this save came from a forced buy-out, not organic play.
    pub was_bought_out: bool,
    pub money: f64,
    pub has_bought_bottle: bool,
    pub empty_bottles: u64,
    pub has_filled_bottle: bool,
    pub filled_bottles: u64,
    pub has_sold_bottle: bool,
    pub sold_bottles: u64,
    pub brand_name: Option<String>,
    pub has_robert: bool,
    pub robert_sold_bottles: u64,
    /// Independent of `has_robert`.
    pub paying_robert: bool,
    pub has_specialist: bool,
    pub specialist_sold_bottles: u64,
    pub has_filler: bool,
    pub filler_filled_bottles: u64,
    pub help_count: u64,
}

impl SaveState {
    /// All-defaults save for the current schema version.
    pub fn blank() -> Self {
        Self {
            version: CURRENT_VERSION,
            was_bought_out: false,
            money: BLANK_MONEY,
            has_bought_bottle: false,
            empty_bottles: 0,
            has_filled_bottle: false,
            filled_bottles: 0,
            has_sold_bottle: false,
            sold_bottles: 0,
            brand_name: None,
            has_robert: false,
            robert_sold_bottles: 0,
            paying_robert: false,
            has_specialist: false,
            specialist_sold_bottles: 0,
            has_filler: false,
            filler_filled_bottles: 0,
            help_count: 0,
        }
    }

    /// Blank save flagged as bought out, carrying `compensation` money.
    pub fn bought_out(compensation: f64) -> Self {
        Self {
            was_bought_out: true,
            money: compensation,
            ..Self::blank()
        }
    }

    /// The state as a raw object, in canonical field order.
    pub fn to_raw(&self) -> RawSave {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of plain fields always serializes to an object.
            _ => RawSave::new(),
        }
    }
}

impl Default for SaveState {
    fn default() -> Self {
        Self::blank()
    }
}

// ── Partial updates ────────────────────────────────────────────────

/// Shallow patch over a `SaveState`. `None` leaves the field as is.
///
/// `brand_name: Some(None)` clears the brand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavePatch {
    pub was_bought_out: Option<bool>,
    pub money: Option<f64>,
    pub has_bought_bottle: Option<bool>,
    pub empty_bottles: Option<u64>,
    pub has_filled_bottle: Option<bool>,
    pub filled_bottles: Option<u64>,
    pub has_sold_bottle: Option<bool>,
    pub sold_bottles: Option<u64>,
    pub brand_name: Option<Option<String>>,
    pub has_robert: Option<bool>,
    pub robert_sold_bottles: Option<u64>,
    pub paying_robert: Option<bool>,
    pub has_specialist: Option<bool>,
    pub specialist_sold_bottles: Option<u64>,
    pub has_filler: Option<bool>,
    pub filler_filled_bottles: Option<u64>,
    pub help_count: Option<u64>,
}

impl SavePatch {
    /// Copy of `base` with every set field of the patch overlaid.
    pub fn apply_to(&self, base: &SaveState) -> SaveState {
        let mut next = base.clone();
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        next.$field = value.clone();
                    }
                )*
            };
        }
        overlay!(
            was_bought_out,
            money,
            has_bought_bottle,
            empty_bottles,
            has_filled_bottle,
            filled_bottles,
            has_sold_bottle,
            sold_bottles,
            brand_name,
            has_robert,
            robert_sold_bottles,
            paying_robert,
            has_specialist,
            specialist_sold_bottles,
            has_filler,
            filler_filled_bottles,
            help_count,
        );
        next
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FIELDS;

    #[test]
    fn blank_matches_documented_defaults() {
        let blank = SaveState::blank();
        assert_eq!(blank.version, CURRENT_VERSION);
        assert_eq!(blank.money, 5.0);
        assert!(!blank.was_bought_out);
        assert_eq!(blank.brand_name, None);
        assert_eq!(blank.filled_bottles + blank.help_count, 0);
    }

    #[test]
    fn blank_keys_match_field_table_in_order() {
        let raw = SaveState::blank().to_raw();
        let keys: Vec<&str> = raw.keys().map(|k| k.as_str()).collect();
        let table: Vec<&str> = FIELDS.iter().map(|(name, _)| *name).collect();
        assert_eq!(keys, table);
    }

    #[test]
    fn bought_out_is_blank_except_flag_and_money() {
        let bought = SaveState::bought_out(50.0);
        assert!(bought.was_bought_out);
        assert_eq!(bought.money, 50.0);
        let reset = SaveState {
            was_bought_out: false,
            money: 5.0,
            ..bought
        };
        assert_eq!(reset, SaveState::blank());
    }

    #[test]
    fn patch_overlays_only_set_fields() {
        let base = SaveState {
            money: 12.0,
            brand_name: Some("Aqua".to_string()),
            ..SaveState::blank()
        };
        let patch = SavePatch {
            empty_bottles: Some(3),
            has_bought_bottle: Some(true),
            ..SavePatch::default()
        };
        let next = patch.apply_to(&base);
        assert_eq!(next.money, 12.0);
        assert_eq!(next.brand_name.as_deref(), Some("Aqua"));
        assert_eq!(next.empty_bottles, 3);
        assert!(next.has_bought_bottle);
        // base untouched
        assert_eq!(base.empty_bottles, 0);
    }

    #[test]
    fn patch_can_clear_brand_name() {
        let base = SaveState {
            brand_name: Some("Aqua".to_string()),
            ..SaveState::blank()
        };
        let patch = SavePatch {
            brand_name: Some(None),
            ..SavePatch::default()
        };
        assert_eq!(patch.apply_to(&base).brand_name, None);
    }

    #[test]
    fn empty_patch_is_identity() {
        let patch = SavePatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply_to(&SaveState::blank()), SaveState::blank());
    }
}
