//! Save codec: `SaveState` ⇄ storable text.
//!
//! Pure codec layer. No storage, no rectification.
//!
//! - `encode`: canonical JSON → zlib → base64
//! - `decode`: base64 → zlib → JSON object (untrusted `RawSave`)
//!
//! Decode is the only place corruption is detected mechanically. A
//! successful decode says nothing about the shape of the object.

use std::io::{Read, Write};
use std::string::FromUtf8Error;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;
use thiserror::Error;

use water_save_kernel::hashing::canonical_text;
use water_save_kernel::{RawSave, SaveState};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Stored text is not a product of `encode`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("base64 layer rejected input: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("{0} bytes follow the compressed stream")]
    TrailingData(usize),
    #[error("decompressed payload is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is JSON but not an object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encode a save to its storable text form. Deterministic.
pub fn encode(save: &SaveState) -> Result<String, EncodeError> {
    let text = canonical_text(save)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decode stored text into an untrusted raw object.
///
/// Surrounding whitespace is ignored. Anything that is not base64 of
/// exactly one zlib stream of a JSON object fails.
pub fn decode(stored: &str) -> Result<RawSave, DecodeError> {
    let compressed = STANDARD.decode(stored.trim())?;
    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    let consumed = usize::try_from(decoder.total_in()).unwrap_or(usize::MAX);
    if consumed < compressed.len() {
        return Err(DecodeError::TrailingData(compressed.len() - consumed));
    }
    let text = String::from_utf8(bytes)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
