use lattice_logic::LogicError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

/// Failure raised anywhere in the signing and transaction toolkit.
///
/// Verification paths deliberately do not produce these: a proof that
/// cannot be decoded is reported invalid, not as an error.
#[derive(Error, Debug, Clone)]
pub enum SdkError {
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Hex decoding failed: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] secp256k1::Error),

    #[error("At least one secret key is required")]
    NoSigners,

    #[error("Rule evaluation failed: {0}")]
    Rule(#[from] LogicError),
}

impl SdkError {
    pub fn secret_key(message: impl Into<String>) -> Self {
        Self::InvalidSecretKey(message.into())
    }

    pub fn public_key(message: impl Into<String>) -> Self {
        Self::InvalidPublicKey(message.into())
    }

    pub fn signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature(message.into())
    }

    pub fn address(message: impl Into<String>) -> Self {
        Self::InvalidAddress(message.into())
    }

    pub fn amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::MalformedTransaction(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}
