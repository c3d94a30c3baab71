//! Signature verification.
//!
//! Verification is total over hostile input: malformed hex, DER or key
//! material makes a proof invalid instead of raising an error. Signatures
//! are normalized to low-S before checking so envelopes produced by
//! implementations that do not normalize still verify.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1};
use serde::Serialize;

use crate::error::Result;
use crate::hash::{hash_value, signing_digest_of_hash};
use crate::keys::with_point_prefix;
use crate::signed::{SignatureProof, Signed, VerificationReport};

/// Checks every proof on a signed envelope.
pub fn verify<T: Serialize>(
    signed: &Signed<T>,
    as_data_update: bool,
) -> Result<VerificationReport> {
    let hash = hash_value(&signed.value, as_data_update)?;
    Ok(collect_report(&hash.hex, &signed.proofs))
}

/// Checks a single proof against a bare value.
pub fn verify_signature<T: Serialize>(
    value: &T,
    proof: &SignatureProof,
    as_data_update: bool,
) -> Result<bool> {
    let hash = hash_value(value, as_data_update)?;
    Ok(verify_hash(&hash.hex, &proof.signature, &proof.id))
}

/// Checks a DER hex signature over a SHA-256 hex hash against a signer id.
/// Malformed components verify false.
pub fn verify_hash(hash_hex: &str, signature_hex: &str, signer_id: &str) -> bool {
    let signature_der = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut signature = match Signature::from_der(&signature_der) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let key_bytes = match hex::decode(with_point_prefix(signer_id)) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let public_key = match PublicKey::from_slice(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let message = match Message::from_digest_slice(&signing_digest_of_hash(hash_hex)) {
        Ok(message) => message,
        Err(_) => return false,
    };

    signature.normalize_s();
    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

/// Splits proofs into valid and invalid against one hash. An envelope is
/// only valid when every proof checks out and at least one is present.
pub(crate) fn collect_report(hash_hex: &str, proofs: &[SignatureProof]) -> VerificationReport {
    let mut valid_proofs = Vec::new();
    let mut invalid_proofs = Vec::new();
    for proof in proofs {
        if verify_hash(hash_hex, &proof.signature, &proof.id) {
            valid_proofs.push(proof.clone());
        } else {
            invalid_proofs.push(proof.clone());
        }
    }
    VerificationReport {
        is_valid: invalid_proofs.is_empty() && !valid_proofs.is_empty(),
        valid_proofs,
        invalid_proofs,
    }
}
