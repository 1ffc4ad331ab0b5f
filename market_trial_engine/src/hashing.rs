//! Market Trial kernel: canonical hashing.
//!
//! Deterministic serialization + SHA-256. Used by replay checks and by the
//! save codec's integrity field.
//!
//! Rules:
//!   - `kernel_version` first, then the payload
//!   - struct fields in declaration order (serde_json `preserve_order`)
//!   - maps keyed by enums serialize in `Ord` order (BTreeMap)
//!   - UTF-8 JSON, no whitespace

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::content::ContentCatalog;
use crate::domain::GameState;
use crate::KERNEL_VERSION;

/// Canonical serialization of a `GameState` to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &GameState) -> Vec<u8> {
    let obj = build_canonical_value("game_state", state);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex.
pub fn canonical_hash(state: &GameState) -> String {
    hex_digest(&canonical_serialize(state))
}

/// SHA-256 of a content catalog, binding journals and saves to the content
/// they were played against.
pub fn catalog_hash(catalog: &ContentCatalog) -> String {
    let obj = build_canonical_value("content_catalog", catalog);
    let bytes = serde_json::to_vec(&obj).expect("catalog_hash: JSON serialization failed");
    hex_digest(&bytes)
}

pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value<T: Serialize>(kind: &str, payload: &T) -> Value {
    let mut root = Map::new();
    // kernel_version MUST be first: it is part of the hash identity.
    root.insert(
        "kernel_version".to_string(),
        Value::Number((KERNEL_VERSION as i64).into()),
    );
    root.insert("kind".to_string(), Value::String(kind.to_string()));
    root.insert(
        "payload".to_string(),
        serde_json::to_value(payload).expect("canonical value: serialization failed"),
    );
    Value::Object(root)
}
