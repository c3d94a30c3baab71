//! Protocol digests.
//!
//! Two distinct hashing roles. [`hash_bytes`]/[`hash_value`] produce the
//! SHA-256 content hash that travels as hex (transaction hashes, parent
//! references). [`signing_digest_of_hash`] derives the 32 bytes the curve
//! actually signs: SHA-512 over the lowercase hex *string* of the SHA-256,
//! truncated. Every implementation on the network hashes the hex text, not
//! the raw hash bytes, and signatures only verify if we do the same.

use serde::Serialize;
use sha2::{Digest as _, Sha256, Sha512};

use crate::encoding::to_sign_bytes;
use crate::error::Result;

/// A SHA-256 output in both transport forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Lowercase hex, 64 characters.
    pub hex: String,
    /// Raw 32 bytes.
    pub bytes: Vec<u8>,
}

/// SHA-256 of raw bytes.
pub fn hash_bytes(bytes: &[u8]) -> Digest {
    let output = Sha256::digest(bytes);
    Digest {
        hex: hex::encode(output),
        bytes: output.to_vec(),
    }
}

/// SHA-256 of a value's signing bytes (canonical JSON, optionally wrapped
/// in the data-update envelope).
pub fn hash_value<T: Serialize>(value: &T, as_data_update: bool) -> Result<Digest> {
    Ok(hash_bytes(&to_sign_bytes(value, as_data_update)?))
}

/// The 32 bytes handed to ECDSA for a value.
pub fn signing_digest<T: Serialize>(value: &T, as_data_update: bool) -> Result<[u8; 32]> {
    Ok(signing_digest_of_hash(&hash_value(value, as_data_update)?.hex))
}

/// The 32 bytes handed to ECDSA for an already-computed SHA-256 hex hash.
pub fn signing_digest_of_hash(hash_hex: &str) -> [u8; 32] {
    let wide = Sha512::digest(hash_hex.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&wide[..32]);
    digest
}
