//! RFC 8785 (JCS) canonical JSON.
//!
//! Every signature in the protocol is computed over the canonical form,
//! so two implementations serializing the same value must produce
//! byte-identical output. Object keys are sorted and numbers take their
//! shortest round-trippable form.

use serde::Serialize;

use crate::error::{Result, SdkError};

/// Canonical JSON text for any serializable value.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| SdkError::serialization(e.to_string()))
}

/// Canonical JSON as UTF-8 bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json_canonicalizer::to_vec(value).map_err(|e| SdkError::serialization(e.to_string()))
}
