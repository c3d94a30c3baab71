//! Signing and transaction toolkit for Constellation metagraphs.
//!
//! Everything a data application needs around the expression VM: RFC 8785
//! canonical JSON, the two-step protocol digest, secp256k1 keypairs and
//! DAG addresses, signed envelopes with multi-signature support, currency
//! transactions with their legacy wire encoding, and the rule validation
//! boundary that runs a `lattice-logic` expression over a payload.
//!
//! # Quick Start
//!
//! ```
//! use lattice_sdk::{create_signed, generate_keypair, verify};
//! use serde_json::json;
//!
//! let pair = generate_keypair();
//! let data = json!({"action": "transfer", "amount": 100});
//!
//! let signed = create_signed(data, &pair.secret_key, false)?;
//! assert!(verify(&signed, false)?.is_valid);
//! # Ok::<(), lattice_sdk::SdkError>(())
//! ```
//!
//! # Rule Validation
//!
//! Payloads are checked against a metagraph's rule expression before
//! acceptance:
//!
//! ```
//! use lattice_logic::{GasConfig, GasLimit};
//! use lattice_sdk::check_rule;
//! use serde_json::json;
//!
//! let rule = json!({"<=": [{"var": "amount"}, 1000]});
//! let verdict = check_rule(&rule, &json!({"amount": 250}), &GasConfig::default(), GasLimit(10_000))?;
//! assert!(verdict.accepted);
//! # Ok::<(), lattice_sdk::SdkError>(())
//! ```

pub mod canonical;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod keys;
pub mod rules;
pub mod sign;
pub mod signed;
pub mod transaction;
pub mod verify;

pub use canonical::{to_canonical_bytes, to_canonical_json};
pub use encoding::{DATA_UPDATE_PREFIX, decode_data_update, encode_data_update, to_sign_bytes};
pub use error::{Result, SdkError};
pub use hash::{Digest, hash_bytes, hash_value, signing_digest, signing_digest_of_hash};
pub use keys::{
    KeyPair, derive_address, generate_keypair, is_valid_address, is_valid_public_key,
    is_valid_secret_key, keypair_from_secret, public_key_hex, signer_id, strip_point_prefix,
    with_point_prefix,
};
pub use rules::{RuleVerdict, check_rule};
pub use sign::{ALGORITHM, sign, sign_data_update, sign_hash};
pub use signed::{
    SignatureProof, Signed, VerificationReport, add_signature, batch_sign, create_signed,
};
pub use transaction::{
    CurrencyTransaction, CurrencyTransactionValue, MIN_SALT, TOKEN_DECIMALS,
    TransactionReference, TransferParams, create_transaction, create_transaction_batch,
    encode_transaction, hash_transaction, sign_transaction, token_to_units,
    transaction_reference, units_to_token, verify_transaction,
};
pub use verify::{verify, verify_hash, verify_signature};
