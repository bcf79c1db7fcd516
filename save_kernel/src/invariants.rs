//! Consistency checks for a typed save.
//!
//! Every rectified save passes. Gameplay may briefly violate the gate
//! check between loads; callers decide whether to log or reject.

use crate::domain::SaveState;
use crate::rules::{CompatRule, GATE_RULES};
use crate::schema::CURRENT_VERSION;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all checks. Returns `Err(message)` on the first failure.
pub fn try_validate_save(save: &SaveState) -> Result<(), String> {
    try_check_version(save)?;
    try_check_money(save)?;
    try_check_counter_gates(save)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn try_check_version(save: &SaveState) -> Result<(), String> {
    if save.version != CURRENT_VERSION {
        return Err(format!(
            "[INVARIANT:version] save version {} is not current version {}",
            save.version, CURRENT_VERSION
        ));
    }
    Ok(())
}

fn try_check_money(save: &SaveState) -> Result<(), String> {
    if !save.money.is_finite() || save.money < 0.0 {
        return Err(format!(
            "[INVARIANT:money] money {} must be finite and non-negative",
            save.money
        ));
    }
    Ok(())
}

/// A counter above zero requires its flag. The reverse is not checked.
fn try_check_counter_gates(save: &SaveState) -> Result<(), String> {
    let raw = save.to_raw();
    for rule in GATE_RULES {
        let CompatRule::CounterImpliesFlag { counter, flag } = *rule else {
            continue;
        };
        let count = raw.get(counter).and_then(|v| v.as_u64()).unwrap_or(0);
        let set = raw.get(flag).and_then(|v| v.as_bool()).unwrap_or(false);
        if count > 0 && !set {
            return Err(format!(
                "[INVARIANT:counter_gate] {} is {} but {} is false",
                counter, count, flag
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_buyout_pass() {
        assert!(try_validate_save(&SaveState::blank()).is_ok());
        assert!(try_validate_save(&SaveState::bought_out(50.0)).is_ok());
    }

    #[test]
    fn stale_version_fails() {
        let save = SaveState {
            version: 2,
            ..SaveState::blank()
        };
        let msg = try_validate_save(&save).unwrap_err();
        assert!(msg.contains("version"), "{}", msg);
    }

    #[test]
    fn negative_or_nan_money_fails() {
        for money in [-1.0, f64::NAN, f64::INFINITY] {
            let save = SaveState {
                money,
                ..SaveState::blank()
            };
            let msg = try_validate_save(&save).unwrap_err();
            assert!(msg.contains("money"), "{}", msg);
        }
    }

    #[test]
    fn counter_without_flag_fails() {
        let save = SaveState {
            specialist_sold_bottles: 3,
            ..SaveState::blank()
        };
        let msg = try_validate_save(&save).unwrap_err();
        assert!(msg.contains("specialistSoldBottles"), "{}", msg);
        assert!(msg.contains("hasSpecialist"), "{}", msg);
    }

    #[test]
    fn flag_without_counter_passes() {
        let save = SaveState {
            has_specialist: true,
            ..SaveState::blank()
        };
        assert!(try_validate_save(&save).is_ok());
    }
}
