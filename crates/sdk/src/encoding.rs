//! Signing-input encoding.
//!
//! Regular values are hashed over their canonical JSON bytes directly.
//! Data updates submitted to an L1 are first base64-encoded and wrapped
//! in the Constellation envelope, which is what the network nodes
//! reconstruct before checking signatures.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::Value as Json;

use crate::canonical::to_canonical_json;
use crate::error::{Result, SdkError};

/// Leading marker of the data-update signing envelope.
pub const DATA_UPDATE_PREFIX: &str = "\x19Constellation Signed Data:\n";

/// The bytes that get hashed and signed for `value`.
pub fn to_sign_bytes<T: Serialize>(value: &T, as_data_update: bool) -> Result<Vec<u8>> {
    let canonical = to_canonical_json(value)?;
    if as_data_update {
        Ok(wrap_data_update(&canonical).into_bytes())
    } else {
        Ok(canonical.into_bytes())
    }
}

/// The full data-update envelope for `value`, as text.
pub fn encode_data_update<T: Serialize>(value: &T) -> Result<String> {
    Ok(wrap_data_update(&to_canonical_json(value)?))
}

fn wrap_data_update(canonical: &str) -> String {
    let encoded = BASE64.encode(canonical.as_bytes());
    format!("{DATA_UPDATE_PREFIX}{}\n{encoded}", encoded.len())
}

/// Recovers the JSON value from an envelope produced by
/// [`encode_data_update`]. The declared payload length must match.
pub fn decode_data_update(envelope: &str) -> Result<Json> {
    let rest = envelope
        .strip_prefix(DATA_UPDATE_PREFIX)
        .ok_or_else(|| SdkError::encoding("missing data-update prefix"))?;
    let (length_line, payload) = rest
        .split_once('\n')
        .ok_or_else(|| SdkError::encoding("missing length separator"))?;
    let declared: usize = length_line
        .parse()
        .map_err(|_| SdkError::encoding(format!("invalid length line '{length_line}'")))?;
    if payload.len() != declared {
        return Err(SdkError::encoding(format!(
            "length mismatch: envelope declares {declared}, payload has {}",
            payload.len()
        )));
    }
    let decoded = BASE64
        .decode(payload)
        .map_err(|e| SdkError::encoding(format!("invalid base64 payload: {e}")))?;
    serde_json::from_slice(&decoded).map_err(SdkError::from)
}
