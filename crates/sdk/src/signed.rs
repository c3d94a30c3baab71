//! Signed envelopes.
//!
//! `Signed<T>` is the wire shape every metagraph payload travels in. The
//! `value`/`proofs` and `id`/`signature` field names are part of the
//! protocol and must not change.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};
use crate::sign::{sign, sign_data_update};

/// One signature over a value, identified by the signer's public key id
/// (uncompressed hex without the `04` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProof {
    pub id: String,
    pub signature: String,
}

/// A value plus the accumulated proofs over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub value: T,
    pub proofs: Vec<SignatureProof>,
}

/// Outcome of checking every proof on an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub is_valid: bool,
    pub valid_proofs: Vec<SignatureProof>,
    pub invalid_proofs: Vec<SignatureProof>,
}

/// Signs `value` and wraps it with its first proof.
pub fn create_signed<T: Serialize>(
    value: T,
    secret_hex: &str,
    as_data_update: bool,
) -> Result<Signed<T>> {
    let proof = proof_for(&value, secret_hex, as_data_update)?;
    Ok(Signed {
        value,
        proofs: vec![proof],
    })
}

/// Appends one more signature to an existing envelope.
pub fn add_signature<T: Serialize>(
    signed: &mut Signed<T>,
    secret_hex: &str,
    as_data_update: bool,
) -> Result<()> {
    let proof = proof_for(&signed.value, secret_hex, as_data_update)?;
    signed.proofs.push(proof);
    Ok(())
}

/// Signs `value` once per secret key, in order.
pub fn batch_sign<T: Serialize, S: AsRef<str>>(
    value: T,
    secret_keys: &[S],
    as_data_update: bool,
) -> Result<Signed<T>> {
    let mut keys = secret_keys.iter();
    let first = keys.next().ok_or(SdkError::NoSigners)?;
    let mut signed = create_signed(value, first.as_ref(), as_data_update)?;
    for key in keys {
        add_signature(&mut signed, key.as_ref(), as_data_update)?;
    }
    Ok(signed)
}

fn proof_for<T: Serialize>(
    value: &T,
    secret_hex: &str,
    as_data_update: bool,
) -> Result<SignatureProof> {
    if as_data_update {
        sign_data_update(value, secret_hex)
    } else {
        sign(value, secret_hex)
    }
}
