//! Save codec: deterministic `GameState` encoder/decoder.
//!
//! A save is a small JSON envelope around the state:
//!
//! ```text
//! {"kernelVersion":1,"hash":"<canonical_hash(state)>","state":{...}}
//! ```
//!
//! - `encode_save`:  GameState → envelope JSON
//! - `decode_save`:  envelope JSON → GameState (strict, hash checked)
//! - `restore_save`: decode + invariant validation
//! - `export_save_to_file` / `import_save_from_file`: file I/O

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use market_trial_engine::domain::GameState;
use market_trial_engine::hashing::canonical_hash;
use market_trial_engine::invariants::try_validate_invariants;
use market_trial_engine::KERNEL_VERSION;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SnapshotError {
    SerializationError(String),
    /// Malformed JSON, missing fields or unknown fields.
    DeserializationError(String),
    /// Written by a kernel whose hashes are not comparable with ours.
    VersionMismatch { found: u32, expected: u32 },
    /// The state does not hash to the value stored beside it.
    IntegrityMismatch { stored: String, computed: String },
    InvariantViolation(String),
    IoError(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::SerializationError(msg) => write!(f, "SerializationError: {}", msg),
            SnapshotError::DeserializationError(msg) => {
                write!(f, "DeserializationError: {}", msg)
            }
            SnapshotError::VersionMismatch { found, expected } => {
                write!(f, "VersionMismatch: save={} kernel={}", found, expected)
            }
            SnapshotError::IntegrityMismatch { stored, computed } => {
                write!(f, "IntegrityMismatch: stored={} computed={}", stored, computed)
            }
            SnapshotError::InvariantViolation(msg) => write!(f, "InvariantViolation: {}", msg),
            SnapshotError::IoError(msg) => write!(f, "IoError: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> Self {
        SnapshotError::IoError(err.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveEnvelopeRef<'a> {
    kernel_version: u32,
    hash: String,
    state: &'a GameState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SaveEnvelope {
    kernel_version: u32,
    hash: String,
    state: GameState,
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a game as a save envelope. Identical states give identical bytes.
pub fn encode_save(state: &GameState) -> Result<String, SnapshotError> {
    let envelope = SaveEnvelopeRef {
        kernel_version: KERNEL_VERSION,
        hash: canonical_hash(state),
        state,
    };
    serde_json::to_string(&envelope).map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a save envelope and check its version and integrity hash.
/// No invariant validation: use `restore_save` for untrusted input.
pub fn decode_save(json: &str) -> Result<GameState, SnapshotError> {
    let envelope: SaveEnvelope = serde_json::from_str(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))?;
    if envelope.kernel_version != KERNEL_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: envelope.kernel_version,
            expected: KERNEL_VERSION,
        });
    }
    let computed = canonical_hash(&envelope.state);
    if computed != envelope.hash {
        return Err(SnapshotError::IntegrityMismatch {
            stored: envelope.hash,
            computed,
        });
    }
    Ok(envelope.state)
}

/// Decode and validate invariants. The safe entry point for saves from disk.
pub fn restore_save(json: &str) -> Result<GameState, SnapshotError> {
    let state = decode_save(json)?;
    try_validate_invariants(&state).map_err(SnapshotError::InvariantViolation)?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Creates parent directories if needed.
pub fn export_save_to_file(state: &GameState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_save(state)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_save_from_file(path: &Path) -> Result<GameState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_save(&content)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
