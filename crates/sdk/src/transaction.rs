//! Currency transactions.
//!
//! Transfers do not hash their canonical JSON. The network hashes a
//! legacy length-prefixed string encoding wrapped in a Kryo string
//! envelope, so this module carries its own codec next to the signing
//! plumbing. Getting one byte of it wrong produces hashes no validator
//! will accept.

use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};
use crate::hash::{Digest, hash_bytes};
use crate::keys::{derive_address, is_valid_address, public_key_hex, signer_id};
use crate::sign::sign_hash;
use crate::signed::{SignatureProof, Signed, VerificationReport};
use crate::verify::{collect_report, verify_hash};

/// Value of one integer unit: wire amounts are multiples of 1e-8 token.
pub const TOKEN_DECIMALS: f64 = 1e-8;

/// Lower bound for generated salts; 48 random bits are added on top.
pub const MIN_SALT: u64 = (1u64 << 53) - (1u64 << 48);

/// Pointer to the previous accepted transaction from the same source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReference {
    pub hash: String,
    pub ordinal: i64,
}

impl TransactionReference {
    /// Reference used by a source with no prior transactions.
    pub fn genesis() -> Self {
        Self {
            hash: "0".repeat(64),
            ordinal: 0,
        }
    }
}

/// Body of a transfer, exactly as serialized on the wire. Other SDKs emit
/// the salt as either a JSON string or a number; both deserialize here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTransactionValue {
    pub source: String,
    pub destination: String,
    pub amount: i64,
    pub fee: i64,
    pub parent: TransactionReference,
    #[serde(deserialize_with = "salt_as_string")]
    pub salt: String,
}

pub type CurrencyTransaction = Signed<CurrencyTransactionValue>;

/// Parameters for building a transfer, amounts in whole tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferParams {
    pub destination: String,
    pub amount: f64,
    pub fee: f64,
}

fn salt_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SaltRepr {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match SaltRepr::deserialize(deserializer)? {
        SaltRepr::Text(text) => text,
        SaltRepr::Number(number) => number.to_string(),
    })
}

/// Whole-token amount to integer units, flooring sub-unit remainders.
pub fn token_to_units(amount: f64) -> i64 {
    (amount * 1e8).floor() as i64
}

/// Integer units back to a whole-token amount.
pub fn units_to_token(units: i64) -> f64 {
    units as f64 * TOKEN_DECIMALS
}

fn generate_salt() -> String {
    let mut noise = [0u8; 8];
    rand::thread_rng().fill(&mut noise[2..]);
    (MIN_SALT + u64::from_be_bytes(noise)).to_string()
}

/// Length-prefixed string encoding hashed by the network. Field order is
/// fixed: parent count, source, destination, hex amount, parent hash,
/// parent ordinal, fee, hex salt.
pub fn encode_transaction(tx: &CurrencyTransaction) -> Result<String> {
    let value = &tx.value;
    let amount_hex = format!("{:x}", value.amount);
    let ordinal = value.parent.ordinal.to_string();
    let fee = value.fee.to_string();
    let salt_hex = salt_hex(&value.salt)?;

    // v2 transactions always declare two parents.
    let mut encoded = String::from("2");
    for field in [
        value.source.as_str(),
        value.destination.as_str(),
        amount_hex.as_str(),
        value.parent.hash.as_str(),
        ordinal.as_str(),
        fee.as_str(),
        salt_hex.as_str(),
    ] {
        encoded.push_str(&field.len().to_string());
        encoded.push_str(field);
    }
    Ok(encoded)
}

fn salt_hex(salt: &str) -> Result<String> {
    let parsed = salt
        .parse::<BigUint>()
        .map_err(|_| SdkError::transaction(format!("salt '{salt}' is not a decimal integer")))?;
    Ok(format!("{parsed:x}"))
}

/// Kryo string envelope: 0x03 type marker, optional 0x01 reference flag
/// (never set for v2 transactions), then a varint of length + 1.
fn kryo_wrap(message: &str, set_references: bool) -> Vec<u8> {
    let mut bytes = vec![0x03];
    if set_references {
        bytes.push(0x01);
    }
    bytes.extend(utf8_length(message.len() + 1));
    bytes.extend_from_slice(message.as_bytes());
    bytes
}

/// Kryo's UTF-8-style length marker: 6 bits in the first byte, 7 in each
/// continuation, low bits first.
fn utf8_length(value: usize) -> Vec<u8> {
    if value >> 6 == 0 {
        vec![(value | 0x80) as u8]
    } else if value >> 13 == 0 {
        vec![(value | 0x40 | 0x80) as u8, (value >> 6) as u8]
    } else if value >> 20 == 0 {
        vec![
            (value | 0x40 | 0x80) as u8,
            ((value >> 6) | 0x80) as u8,
            (value >> 13) as u8,
        ]
    } else if value >> 27 == 0 {
        vec![
            (value | 0x40 | 0x80) as u8,
            ((value >> 6) | 0x80) as u8,
            ((value >> 13) | 0x80) as u8,
            (value >> 20) as u8,
        ]
    } else {
        vec![
            (value | 0x40 | 0x80) as u8,
            ((value >> 6) | 0x80) as u8,
            ((value >> 13) | 0x80) as u8,
            ((value >> 20) | 0x80) as u8,
            (value >> 27) as u8,
        ]
    }
}

/// SHA-256 over the Kryo-wrapped encoding; the hash validators track.
pub fn hash_transaction(tx: &CurrencyTransaction) -> Result<Digest> {
    Ok(hash_bytes(&kryo_wrap(&encode_transaction(tx)?, false)))
}

/// Builds and signs a transfer against the source's latest reference.
pub fn create_transaction(
    params: TransferParams,
    secret_hex: &str,
    parent: TransactionReference,
) -> Result<CurrencyTransaction> {
    let source = derive_address(&public_key_hex(secret_hex, false)?);
    if !is_valid_address(&source) {
        return Err(SdkError::address(format!("invalid source address '{source}'")));
    }
    if !is_valid_address(&params.destination) {
        return Err(SdkError::address(format!(
            "invalid destination address '{}'",
            params.destination
        )));
    }
    if source == params.destination {
        return Err(SdkError::address(
            "source and destination are the same address",
        ));
    }

    let amount = token_to_units(params.amount);
    if amount < 1 {
        return Err(SdkError::amount("transfer amount must be at least 1e-8"));
    }
    let fee = token_to_units(params.fee);
    if fee < 0 {
        return Err(SdkError::amount("fee must not be negative"));
    }

    let mut tx = Signed {
        value: CurrencyTransactionValue {
            source,
            destination: params.destination,
            amount,
            fee,
            parent,
            salt: generate_salt(),
        },
        proofs: Vec::new(),
    };
    sign_transaction(&mut tx, secret_hex)?;
    Ok(tx)
}

/// Appends `secret_hex`'s signature to the transaction. Used both for the
/// creator's own proof and for additional co-signers.
pub fn sign_transaction(tx: &mut CurrencyTransaction, secret_hex: &str) -> Result<()> {
    let hash = hash_transaction(tx)?;
    let signature = sign_hash(&hash.hex, secret_hex)?;
    let id = signer_id(secret_hex)?;
    if !verify_hash(&hash.hex, &signature, &id) {
        return Err(SdkError::signature("freshly signed proof failed verification"));
    }
    log::debug!("signed transaction {}", hash.hex);
    tx.proofs.push(SignatureProof { id, signature });
    Ok(())
}

/// Checks every proof against the transaction hash.
pub fn verify_transaction(tx: &CurrencyTransaction) -> Result<VerificationReport> {
    let hash = hash_transaction(tx)?;
    Ok(collect_report(&hash.hex, &tx.proofs))
}

/// Reference for the next transaction once `tx` is accepted at `ordinal`.
pub fn transaction_reference(
    tx: &CurrencyTransaction,
    ordinal: i64,
) -> Result<TransactionReference> {
    Ok(TransactionReference {
        hash: hash_transaction(tx)?.hex,
        ordinal,
    })
}

/// Builds a chain of transfers, each parented on the previous one's hash
/// with an incremented ordinal.
pub fn create_transaction_batch(
    transfers: Vec<TransferParams>,
    secret_hex: &str,
    last_ref: TransactionReference,
) -> Result<Vec<CurrencyTransaction>> {
    let mut chain = Vec::with_capacity(transfers.len());
    let mut parent = last_ref;
    for params in transfers {
        let tx = create_transaction(params, secret_hex, parent.clone())?;
        parent = TransactionReference {
            hash: hash_transaction(&tx)?.hex,
            ordinal: parent.ordinal + 1,
        };
        chain.push(tx);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vector shared across the network SDK implementations.
    const SECRET: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
    const SOURCE: &str = "DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR";
    const DESTINATION: &str = "DAG4o41NzhfX6DyYBTTXu6sJa6awm36abJpv89jB";
    const PARENT_HASH: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const SALT: &str = "9007199254740992";
    const ENCODED: &str = "240DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR40DAG4o41NzhfX6DyYBTTXu6sJa6awm36abJpv89jB925706d48064aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa10101420000000000000";
    const KRYO_HEX: &str = "03f6023234304441473176546d726844506b4e6b554562357947624839693552397854444e4d46704851775276523430444147346f34314e7a68665836447959425454587536734a613661776d333661624a707638396a42393235373036643438303634616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161616161613130313031343230303030303030303030303030";
    const HASH: &str = "5b7e930be16d49adaf75ee5e5c63ac27f61a4a47058ab54ff10e9095f3bf6409";

    fn vector_transaction() -> CurrencyTransaction {
        Signed {
            value: CurrencyTransactionValue {
                source: SOURCE.into(),
                destination: DESTINATION.into(),
                amount: 10_050_000_000,
                fee: 0,
                parent: TransactionReference {
                    hash: PARENT_HASH.into(),
                    ordinal: 0,
                },
                salt: SALT.into(),
            },
            proofs: Vec::new(),
        }
    }

    #[test]
    fn test_token_unit_conversions() {
        assert_eq!(token_to_units(100.5), 10_050_000_000);
        assert_eq!(token_to_units(0.00000001), 1);
        assert_eq!(token_to_units(0.0), 0);
        assert_eq!(units_to_token(10_050_000_000), 100.5);
        assert_eq!(units_to_token(1), 0.00000001);
    }

    #[test]
    fn test_generated_salt_range() {
        for _ in 0..16 {
            let salt: u64 = generate_salt().parse().unwrap();
            assert!(salt >= MIN_SALT);
            assert!(salt < MIN_SALT + (1 << 48));
        }
    }

    #[test]
    fn test_encoding_matches_reference_vector() {
        assert_eq!(encode_transaction(&vector_transaction()).unwrap(), ENCODED);
    }

    #[test]
    fn test_kryo_envelope_matches_reference_vector() {
        let wrapped = kryo_wrap(ENCODED, false);
        assert_eq!(hex::encode(&wrapped), KRYO_HEX);
        // 0x03 marker, no reference flag for v2.
        assert_eq!(wrapped[0], 0x03);
        assert_ne!(wrapped[1], 0x01);
    }

    #[test]
    fn test_hash_matches_reference_vector() {
        assert_eq!(hash_transaction(&vector_transaction()).unwrap().hex, HASH);
    }

    #[test]
    fn test_utf8_length_boundaries() {
        assert_eq!(utf8_length(1), vec![0x81]);
        assert_eq!(utf8_length(63), vec![0xbf]);
        assert_eq!(utf8_length(64), vec![0xc0, 0x01]);
        assert_eq!(utf8_length(182), vec![0xf6, 0x02]);
        assert_eq!(utf8_length(8191), vec![0xff, 0x7f]);
        assert_eq!(utf8_length(8192), vec![0xc0, 0x80, 0x01]);
    }

    #[test]
    fn test_salt_hex_rejects_garbage() {
        let mut tx = vector_transaction();
        tx.value.salt = "not-a-number".into();
        assert!(matches!(
            encode_transaction(&tx),
            Err(SdkError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_salt_deserializes_from_string_or_number() {
        let from_string: CurrencyTransactionValue = serde_json::from_value(serde_json::json!({
            "source": SOURCE,
            "destination": DESTINATION,
            "amount": 1,
            "fee": 0,
            "parent": {"hash": PARENT_HASH, "ordinal": 0},
            "salt": "9007199254740992"
        }))
        .unwrap();
        let from_number: CurrencyTransactionValue = serde_json::from_value(serde_json::json!({
            "source": SOURCE,
            "destination": DESTINATION,
            "amount": 1,
            "fee": 0,
            "parent": {"hash": PARENT_HASH, "ordinal": 0},
            "salt": 9007199254740992u64
        }))
        .unwrap();
        assert_eq!(from_string.salt, SALT);
        assert_eq!(from_number.salt, SALT);
    }

    #[test]
    fn test_create_rejects_bad_destination() {
        let err = create_transaction(
            TransferParams {
                destination: "invalid".into(),
                amount: 1.0,
                fee: 0.0,
            },
            SECRET,
            TransactionReference::genesis(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_create_rejects_self_transfer() {
        let err = create_transaction(
            TransferParams {
                destination: SOURCE.into(),
                amount: 1.0,
                fee: 0.0,
            },
            SECRET,
            TransactionReference::genesis(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("same address"));
    }

    #[test]
    fn test_create_rejects_sub_unit_amount_and_negative_fee() {
        let params = |amount, fee| TransferParams {
            destination: DESTINATION.into(),
            amount,
            fee,
        };
        assert!(matches!(
            create_transaction(params(0.000000001, 0.0), SECRET, TransactionReference::genesis()),
            Err(SdkError::InvalidAmount(_))
        ));
        assert!(matches!(
            create_transaction(params(1.0, -0.5), SECRET, TransactionReference::genesis()),
            Err(SdkError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_genesis_reference() {
        let genesis = TransactionReference::genesis();
        assert_eq!(genesis.hash, "0".repeat(64));
        assert_eq!(genesis.ordinal, 0);
    }
}
