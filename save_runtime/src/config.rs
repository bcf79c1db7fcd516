//! Save configuration: slot key and buy-out compensation schedule.
//!
//! ```toml
//! slot_key = "water-incremental-save"
//!
//! [[compensation]]
//! version = 2
//! amount = 25.0
//!
//! [[compensation]]
//! version = 3
//! amount = 50.0
//! ```

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use water_save_kernel::schema::{compensation_from, COMPENSATION_SCHEDULE, CURRENT_VERSION};
use water_save_kernel::Rectifier;

use crate::store::FileStore;

/// Storage key shared by every released build. Changing it orphans all saves.
pub const DEFAULT_SLOT_KEY: &str = "water-incremental-save";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid save config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid compensation for version {version}: {amount}")]
    Compensation { version: u32, amount: f64 },
}

/// One `{version_bump_number: compensation_amount}` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub version: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    pub slot_key: String,
    pub compensation: Vec<Compensation>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            compensation: COMPENSATION_SCHEDULE
                .iter()
                .map(|&(version, amount)| Compensation { version, amount })
                .collect(),
        }
    }
}

impl SaveConfig {
    /// Parse from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SaveConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Every compensation amount must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.compensation {
            if !entry.amount.is_finite() || entry.amount < 0.0 {
                return Err(ConfigError::Compensation {
                    version: entry.version,
                    amount: entry.amount,
                });
            }
        }
        Ok(())
    }

    /// Compensation for a buy-out under `version`, with schedule fallback.
    pub fn compensation_for(&self, version: u32) -> f64 {
        compensation_from(self.compensation.iter().map(|c| (c.version, c.amount)), version)
    }

    /// Rectifier paying this build's compensation.
    pub fn rectifier(&self) -> Rectifier {
        Rectifier::new(self.compensation_for(CURRENT_VERSION))
    }

    /// File store for this config's slot inside `dir`.
    pub fn open_file_store(&self, dir: &Path) -> io::Result<FileStore> {
        FileStore::open(dir, &self.slot_key)
    }

    /// Browser store for this config's slot.
    #[cfg(target_arch = "wasm32")]
    pub fn local_storage(&self) -> crate::store::LocalStorage {
        crate::store::LocalStorage::new(self.slot_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_kernel_schedule() {
        let config = SaveConfig::default();
        assert_eq!(config.slot_key, "water-incremental-save");
        assert_eq!(config.compensation_for(CURRENT_VERSION), 50.0);
        assert_eq!(config.rectifier(), Rectifier::default());
    }

    #[test]
    fn toml_overrides_schedule() {
        let config = SaveConfig::from_toml_str(
            r#"
            slot_key = "test-slot"

            [[compensation]]
            version = 2
            amount = 25.0

            [[compensation]]
            version = 3
            amount = 60.0
            "#,
        )
        .unwrap();
        assert_eq!(config.slot_key, "test-slot");
        assert_eq!(config.rectifier().compensation(), 60.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SaveConfig::from_toml_str(r#"slot_key = "other""#).unwrap();
        assert_eq!(config.compensation, SaveConfig::default().compensation);
    }

    #[test]
    fn schedule_without_current_entry_falls_back() {
        let config = SaveConfig::from_toml_str("[[compensation]]\nversion = 2\namount = 25.0\n").unwrap();
        assert_eq!(config.compensation_for(CURRENT_VERSION), 25.0);
    }

    #[test]
    fn negative_compensation_is_rejected() {
        let err = SaveConfig::from_toml_str("[[compensation]]\nversion = 3\namount = -5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Compensation { version: 3, .. }));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = SaveConfig::from_toml_str("slot_key = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
