//! ECDSA signing over the protocol digest.

use secp256k1::{Message, Secp256k1, SecretKey};
use serde::Serialize;

use crate::error::Result;
use crate::hash::{hash_value, signing_digest_of_hash};
use crate::keys::signer_id;
use crate::signed::SignatureProof;

/// Identifier of the signing scheme, carried in envelope metadata.
pub const ALGORITHM: &str = "SECP256K1_RFC8785_V1";

/// Signs a value with the regular protocol (canonical JSON bytes).
pub fn sign<T: Serialize>(value: &T, secret_hex: &str) -> Result<SignatureProof> {
    sign_with(value, secret_hex, false)
}

/// Signs a value wrapped in the data-update envelope.
pub fn sign_data_update<T: Serialize>(value: &T, secret_hex: &str) -> Result<SignatureProof> {
    sign_with(value, secret_hex, true)
}

fn sign_with<T: Serialize>(
    value: &T,
    secret_hex: &str,
    as_data_update: bool,
) -> Result<SignatureProof> {
    let hash = hash_value(value, as_data_update)?;
    Ok(SignatureProof {
        id: signer_id(secret_hex)?,
        signature: sign_hash(&hash.hex, secret_hex)?,
    })
}

/// Signs a precomputed SHA-256 hex hash. Returns the DER signature as
/// lowercase hex.
pub fn sign_hash(hash_hex: &str, secret_hex: &str) -> Result<String> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(&hex::decode(secret_hex)?)?;
    let message = Message::from_digest_slice(&signing_digest_of_hash(hash_hex))?;
    let signature = secp.sign_ecdsa(&message, &secret_key);
    Ok(hex::encode(signature.serialize_der()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_keypair;
    use serde_json::json;

    #[test]
    fn test_sign_produces_der_hex() {
        let pair = generate_keypair();
        let proof = sign(&json!({"id": "t", "value": 42}), &pair.secret_key).unwrap();
        assert_eq!(proof.id.len(), 128);
        // DER sequences start with 0x30.
        assert!(proof.signature.starts_with("30"));
        assert!(proof.signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_data_update_signature_differs() {
        let pair = generate_keypair();
        let value = json!({"id": "t"});
        let plain = sign(&value, &pair.secret_key).unwrap();
        let update = sign_data_update(&value, &pair.secret_key).unwrap();
        assert_eq!(plain.id, update.id);
        assert_ne!(plain.signature, update.signature);
    }

    #[test]
    fn test_sign_is_deterministic() {
        // RFC 6979 nonces make repeated signatures identical.
        let pair = generate_keypair();
        let value = json!({"id": "t"});
        let first = sign(&value, &pair.secret_key).unwrap();
        let second = sign(&value, &pair.secret_key).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_rejects_bad_secret() {
        assert!(sign_hash(&"a".repeat(64), "not-hex").is_err());
        assert!(sign_hash(&"a".repeat(64), &"0".repeat(64)).is_err());
    }
}
