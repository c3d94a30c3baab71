//! Key generation and DAG address derivation.
//!
//! Addresses are derived from the X.509 DER encoding of the public key:
//! SHA-256 of the DER bytes, base58, last 36 characters, then a check
//! digit (sum of decimal digits mod 9) sandwiched between the `DAG`
//! prefix and the tail.

use std::sync::LazyLock;

use rand::rngs::OsRng;
use regex::Regex;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest as _, Sha256};

use crate::error::{Result, SdkError};

/// Bitcoin-style base58 alphabet shared by every network implementation.
const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// X.509 DER header preceding an uncompressed secp256k1 public key.
const PKCS_PREFIX: &str = "3056301006072a8648ce3d020106052b8104000a034200";

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DAG[0-8][123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz]{36}$")
        .expect("BUG: invalid ADDRESS_RE regex literal")
});

/// A secp256k1 keypair with its derived DAG address, all hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// 64 hex characters.
    pub secret_key: String,
    /// Uncompressed, 130 hex characters including the `04` prefix.
    pub public_key: String,
    /// `DAG` + check digit + 36 base58 characters.
    pub address: String,
}

/// Generates a fresh keypair from the operating system RNG.
pub fn generate_keypair() -> KeyPair {
    let secp = Secp256k1::new();
    let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
    let public_hex = hex::encode(public_key.serialize_uncompressed());
    let address = derive_address(&public_hex);
    KeyPair {
        secret_key: hex::encode(secret_key.secret_bytes()),
        public_key: public_hex,
        address,
    }
}

/// Rebuilds the full keypair from a stored secret key.
pub fn keypair_from_secret(secret_hex: &str) -> Result<KeyPair> {
    if !is_valid_secret_key(secret_hex) {
        return Err(SdkError::secret_key("expected 64 hex characters"));
    }
    let public_hex = public_key_hex(secret_hex, false)?;
    let address = derive_address(&public_hex);
    Ok(KeyPair {
        secret_key: secret_hex.to_string(),
        public_key: public_hex,
        address,
    })
}

/// Public key for a secret key: uncompressed (130 hex characters) or
/// compressed (66).
pub fn public_key_hex(secret_hex: &str, compressed: bool) -> Result<String> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(&hex::decode(secret_hex)?)?;
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    if compressed {
        Ok(hex::encode(public_key.serialize()))
    } else {
        Ok(hex::encode(public_key.serialize_uncompressed()))
    }
}

/// Signer id carried in proofs: the uncompressed key without its `04`
/// point prefix (128 hex characters).
pub fn signer_id(secret_hex: &str) -> Result<String> {
    Ok(strip_point_prefix(&public_key_hex(secret_hex, false)?))
}

/// Ensures the `04` uncompressed-point prefix is present.
pub fn with_point_prefix(public_key: &str) -> String {
    if public_key.len() == 128 {
        format!("04{public_key}")
    } else {
        public_key.to_string()
    }
}

/// Drops the `04` uncompressed-point prefix if present.
pub fn strip_point_prefix(public_key: &str) -> String {
    match public_key.strip_prefix("04") {
        Some(id) if public_key.len() == 130 => id.to_string(),
        _ => public_key.to_string(),
    }
}

/// DAG address for a public key, accepted with or without the `04` prefix.
pub fn derive_address(public_key: &str) -> String {
    let pkcs = format!("{PKCS_PREFIX}{}", with_point_prefix(public_key));
    let der = hex::decode(&pkcs).unwrap_or_default();
    let encoded = base58_encode(&Sha256::digest(&der));

    let tail = if encoded.len() > 36 {
        &encoded[encoded.len() - 36..]
    } else {
        &encoded
    };
    let digit_sum: u32 = tail.chars().filter_map(|c| c.to_digit(10)).sum();
    format!("DAG{}{tail}", digit_sum % 9)
}

pub fn is_valid_secret_key(secret_hex: &str) -> bool {
    secret_hex.len() == 64 && secret_hex.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_valid_public_key(public_key: &str) -> bool {
    (public_key.len() == 128 || public_key.len() == 130)
        && public_key.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

fn base58_encode(data: &[u8]) -> String {
    let leading_zeros = data.iter().take_while(|&&b| b == 0).count();

    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in data {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(leading_zeros + digits.len());
    for _ in 0..leading_zeros {
        out.push('1');
    }
    out.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
    const PUBLIC: &str = "04bb50e2d89a4ed70663d080659fe0ad4b9bc3e06c17a227433966cb59ceee020decddbf6e00192011648d13b1c00af770c0c1bb609d4d3a5c98a43772e0e18ef4";
    const ADDRESS: &str = "DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR";

    #[test]
    fn test_public_key_derivation() {
        assert_eq!(public_key_hex(SECRET, false).unwrap(), PUBLIC);
    }

    #[test]
    fn test_address_derivation() {
        assert_eq!(derive_address(PUBLIC), ADDRESS);
        // The 04 prefix must not change the result.
        assert_eq!(derive_address(&PUBLIC[2..]), ADDRESS);
    }

    #[test]
    fn test_keypair_from_secret() {
        let pair = keypair_from_secret(SECRET).unwrap();
        assert_eq!(pair.public_key, PUBLIC);
        assert_eq!(pair.address, ADDRESS);
    }

    #[test]
    fn test_generate_keypair_shape() {
        let pair = generate_keypair();
        assert_eq!(pair.secret_key.len(), 64);
        assert_eq!(pair.public_key.len(), 130);
        assert!(pair.public_key.starts_with("04"));
        assert!(is_valid_address(&pair.address));
    }

    #[test]
    fn test_generated_keypair_round_trips_import() {
        let pair = generate_keypair();
        let imported = keypair_from_secret(&pair.secret_key).unwrap();
        assert_eq!(imported, pair);
    }

    #[test]
    fn test_signer_id_strips_prefix() {
        let id = signer_id(SECRET).unwrap();
        assert_eq!(id.len(), 128);
        assert_eq!(id, &PUBLIC[2..]);
    }

    #[test]
    fn test_point_prefix_normalization() {
        assert_eq!(with_point_prefix(&PUBLIC[2..]), PUBLIC);
        assert_eq!(with_point_prefix(PUBLIC), PUBLIC);
        assert_eq!(strip_point_prefix(PUBLIC), &PUBLIC[2..]);
        assert_eq!(strip_point_prefix(&PUBLIC[2..]), &PUBLIC[2..]);
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid_secret_key(&"a".repeat(64)));
        assert!(!is_valid_secret_key(&"a".repeat(63)));
        assert!(!is_valid_secret_key(&"g".repeat(64)));
        assert!(is_valid_public_key(&"a".repeat(128)));
        assert!(is_valid_public_key(&"a".repeat(130)));
        assert!(!is_valid_public_key(&"a".repeat(127)));
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(ADDRESS));
        assert!(is_valid_address("DAG4o41NzhfX6DyYBTTXu6sJa6awm36abJpv89jB"));
        assert!(!is_valid_address("DAG9vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR")); // check digit 9
        assert!(!is_valid_address("DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRv")); // too short
        assert!(!is_valid_address("DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpH0wRvR")); // '0' not base58
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("not an address"));
    }

    #[test]
    fn test_base58_leading_zeros() {
        assert_eq!(base58_encode(&[0, 0, 1]), "112");
        assert_eq!(base58_encode(&[]), "");
    }
}
