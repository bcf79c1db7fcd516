#![forbid(unsafe_code)]

//! Water incremental save kernel.
//!
//! Pure logic for the persisted save: the versioned schema and its blank
//! instance, the compatibility rules, and the rectifier that turns any
//! decoded object into a complete, current-version `SaveState`.
//!
//! Nothing in this crate touches storage. Encoding, backends and the
//! session live in `water_save_runtime`.

pub mod schema;
pub mod domain;
pub mod rules;
pub mod report;
pub mod rectify;
pub mod invariants;
pub mod hashing;

pub use domain::{RawSave, SavePatch, SaveState};
pub use rectify::{rectify, rectify_with_report, Rectifier};
pub use report::{RectifyReport, Verdict};
pub use schema::CURRENT_VERSION;
