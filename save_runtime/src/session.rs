//! Save session: owns the single active save.
//!
//! Lifecycle:
//!   1. `new`      blank active save
//!   2. `load`     store.get → decode → rectify, replacing the active save
//!   3. `update`   gameplay replaces the active save by patched copy
//!   4. `persist`  encode → store.set
//!
//! Single writer, single reader. Every `load` re-rectifies; the session
//! never assumes the stored save still matches the active one.

use thiserror::Error;

use water_save_kernel::hashing::short_fingerprint;
use water_save_kernel::invariants::try_validate_save;
use water_save_kernel::{Rectifier, RectifyReport, SavePatch, SaveState, Verdict};

use crate::codec::{self, DecodeError, EncodeError};
use crate::config::SaveConfig;
use crate::store::{SaveStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Why a load fell back to the buy-out state.
#[derive(Debug)]
pub enum BuyoutCause {
    /// Stored text failed to decode.
    Corrupt(DecodeError),
    /// Save decoded but carried another schema version.
    VersionMismatch { found: serde_json::Value },
    /// Save carried the current version but could not be made into a
    /// typed state.
    Unconvertible { error: String },
}

/// What `load` did to the active save.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Slot was empty; the active save is blank.
    Fresh,
    /// Save restored; the report lists any repairs.
    Restored { report: RectifyReport },
    /// Save could not be trusted; the active save is the buy-out state.
    BoughtOut { cause: BuyoutCause },
}

impl LoadOutcome {
    pub fn is_bought_out(&self) -> bool {
        matches!(self, LoadOutcome::BoughtOut { .. })
    }
}

/// The owned save session handed to gameplay and rendering.
pub struct SaveSession<S: SaveStore> {
    store: S,
    config: SaveConfig,
    rectifier: Rectifier,
    active: SaveState,
}

impl<S: SaveStore> SaveSession<S> {
    /// Session with the default config. The active save starts blank.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SaveConfig::default())
    }

    /// The store decides the slot. Build it from the config
    /// (`SaveConfig::open_file_store`) to keep the two in step.
    pub fn with_config(store: S, config: SaveConfig) -> Self {
        if store.slot_key() != config.slot_key {
            log::warn!(
                "Store slot {:?} differs from configured slot {:?}; using the store's",
                store.slot_key(),
                config.slot_key
            );
        }
        let rectifier = config.rectifier();
        Self {
            store,
            config,
            rectifier,
            active: SaveState::blank(),
        }
    }

    /// Replace the active save with the stored one.
    ///
    /// Store read failures are returned and leave the active save alone.
    /// Decode failures and version mismatches never fail: they buy out.
    pub fn load(&mut self) -> Result<LoadOutcome, SessionError> {
        let Some(stored) = self.store.get()? else {
            log::info!("Found no save in slot {:?}; starting blank", self.store.slot_key());
            self.active = SaveState::blank();
            return Ok(LoadOutcome::Fresh);
        };

        let raw = match codec::decode(&stored) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("Failed to decode save in slot {:?}: {}", self.store.slot_key(), err);
                self.active = self.rectifier.buyout();
                log::warn!(
                    "Unreadable save bought out with {}",
                    self.rectifier.compensation()
                );
                return Ok(LoadOutcome::BoughtOut {
                    cause: BuyoutCause::Corrupt(err),
                });
            }
        };

        let (state, report) = self.rectifier.rectify_with_report(&raw);
        self.active = state;
        match &report.verdict {
            Verdict::Current => {}
            Verdict::BoughtOut { found } => {
                return Ok(LoadOutcome::BoughtOut {
                    cause: BuyoutCause::VersionMismatch {
                        found: found.clone(),
                    },
                });
            }
            Verdict::Unconvertible { error } => {
                return Ok(LoadOutcome::BoughtOut {
                    cause: BuyoutCause::Unconvertible {
                        error: error.clone(),
                    },
                });
            }
        }
        log::info!(
            "Read save from slot {:?} ({}, {})",
            self.store.slot_key(),
            short_fingerprint(&self.active),
            report.summary()
        );
        Ok(LoadOutcome::Restored { report })
    }

    /// Encode the active save and write it to the store.
    pub fn persist(&mut self) -> Result<(), SessionError> {
        let text = codec::encode(&self.active)?;
        self.store.set(&text)?;
        log::info!(
            "Wrote save to slot {:?} ({})",
            self.store.slot_key(),
            short_fingerprint(&self.active)
        );
        Ok(())
    }

    /// Replace the active save with a patched copy.
    pub fn update(&mut self, patch: &SavePatch) {
        if patch.is_empty() {
            return;
        }
        self.replace(patch.apply_to(&self.active));
    }

    /// Replace the active save with a copy edited by `edit`.
    pub fn update_with<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut SaveState),
    {
        let mut next = self.active.clone();
        edit(&mut next);
        self.replace(next);
    }

    /// Forced reset: the active save becomes blank. Not persisted.
    pub fn reset(&mut self) {
        log::info!("Save reset to blank");
        self.active = SaveState::blank();
    }

    pub fn active(&self) -> &SaveState {
        &self.active
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn replace(&mut self, next: SaveState) {
        if let Err(msg) = try_validate_save(&next) {
            log::warn!("Active save inconsistent after update: {}", msg);
        }
        self.active = next;
    }
}
