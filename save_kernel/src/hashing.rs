//! Canonical text form and fingerprint.
//!
//! The canonical text is compact JSON with fields in schema order. It is
//! the codec's pre-compression form, so two equal saves always produce
//! byte-identical text. The fingerprint is SHA-256 of that text.

use sha2::{Digest, Sha256};

use crate::domain::SaveState;

/// Compact JSON in canonical field order. No whitespace.
pub fn canonical_text(save: &SaveState) -> serde_json::Result<String> {
    serde_json::to_string(save)
}

/// SHA-256 of the canonical text. Lowercase hex string.
pub fn fingerprint(save: &SaveState) -> serde_json::Result<String> {
    let text = canonical_text(save)?;
    let digest = Sha256::digest(text.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// First 12 hex digits of the fingerprint, for log lines.
pub fn short_fingerprint(save: &SaveState) -> String {
    match fingerprint(save) {
        Ok(hex) => hex[..12].to_string(),
        Err(_) => "unhashable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_starts_with_version() {
        let text = canonical_text(&SaveState::blank()).unwrap();
        assert!(text.starts_with(r#"{"version":3,"wasBoughtOut":false,"money":5.0,"#), "{}", text);
        assert!(!text.contains(' '));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint(&SaveState::blank()).unwrap();
        let b = fingerprint(&SaveState::blank()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_changes_with_state() {
        let richer = SaveState {
            money: 6.0,
            ..SaveState::blank()
        };
        assert_ne!(
            fingerprint(&SaveState::blank()).unwrap(),
            fingerprint(&richer).unwrap()
        );
        assert_eq!(short_fingerprint(&richer).len(), 12);
    }
}
