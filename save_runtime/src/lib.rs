#![forbid(unsafe_code)]

//! Water incremental save runtime.
//!
//! Wraps the save kernel with the codec, storage backends, configuration
//! and the save session that owns the active state.
//!
//! No schema logic lives here. Rectification is delegated to the kernel.

pub mod codec;
pub mod config;
pub mod store;
pub mod session;

pub use codec::{decode, encode, DecodeError, EncodeError};
pub use config::{Compensation, ConfigError, SaveConfig};
pub use session::{BuyoutCause, LoadOutcome, SaveSession, SessionError};
pub use store::{FileStore, MemoryStore, SaveStore, StoreError};
