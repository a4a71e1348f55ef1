//! Error types for Avax Core
//!
//! Error taxonomy for the codec, transaction building and signing.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Avax Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// CB58 or hex checksum does not match the payload
    #[error("Checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// Malformed base58, hex or bech32 text
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Value does not fit the requested width
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Ran out of bytes while decoding
    #[error("Buffer underflow: {0}")]
    BufferUnderflow(String),

    /// Type ID not registered for the codec
    #[error("Unknown type ID: {0}")]
    UnknownTypeId(String),

    /// Malformed address or mixed chain prefixes
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Missing, wrong-length or undecodable chain ID
    #[error("Invalid chain ID: {0}")]
    InvalidChainId(String),

    /// Missing, wrong-length or undecodable asset ID
    #[error("Invalid asset ID: {0}")]
    InvalidAssetId(String),

    /// Import with nothing to import
    #[error("No atomic UTXOs to import: {0}")]
    NoAtomicUtxos(String),

    /// Not enough spendable value
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount overflow
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Invalid owner set (threshold / addresses)
    #[error("Invalid owners: {0}")]
    InvalidOwners(String),

    /// Invalid staking parameters
    #[error("Invalid stake: {0}")]
    InvalidStake(String),

    /// Keychain has no key for a required signer
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Invalid key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signature creation or recovery failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Transaction failed sanity validation
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Payload handed to issue is not a transaction
    #[error("Unexpected transaction input: {0}")]
    UnexpectedTransactionInput(String),
}

impl Error {
    /// Check if error is caused by caller input (vs internal error)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::InvalidChainId(_)
                | Error::InvalidAssetId(_)
                | Error::NoAtomicUtxos(_)
                | Error::InsufficientFunds(_)
                | Error::InvalidAmount(_)
                | Error::InvalidOwners(_)
                | Error::InvalidStake(_)
                | Error::KeyNotFound(_)
                | Error::UnexpectedTransactionInput(_)
        )
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::InsufficientFunds(_) => {
                "You don't have enough funds for this transaction. Please check your balance and try again.".to_string()
            }
            Error::NoAtomicUtxos(_) => {
                "There is nothing to import from the source chain yet.".to_string()
            }
            Error::InvalidAddress(_) => {
                "The recipient address is invalid. Please check and try again.".to_string()
            }
            Error::InvalidChainId(_) => {
                "The chain identifier is invalid. Please check and try again.".to_string()
            }
            Error::InvalidAmount(_) => {
                "The amount is invalid. Please enter a valid amount.".to_string()
            }
            Error::KeyNotFound(_) => {
                "A key required to sign this transaction is not in the keychain.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ChecksumMismatch(_)
            | Error::InvalidEncoding(_)
            | Error::OutOfRange(_)
            | Error::BufferUnderflow(_)
            | Error::UnknownTypeId(_) => ErrorCategory::Codec,
            Error::InvalidAddress(_) => ErrorCategory::Address,
            Error::InvalidChainId(_) | Error::InvalidAssetId(_) => ErrorCategory::Identifier,
            Error::NoAtomicUtxos(_)
            | Error::InsufficientFunds(_)
            | Error::InvalidAmount(_)
            | Error::AmountOverflow(_) => ErrorCategory::Amount,
            Error::InvalidOwners(_) | Error::InvalidStake(_) | Error::InvalidTransaction(_) => {
                ErrorCategory::Transaction
            }
            Error::KeyNotFound(_) | Error::InvalidKey(_) | Error::Signing(_) => ErrorCategory::Keys,
            Error::UnexpectedTransactionInput(_) => ErrorCategory::Transaction,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Encoding/decoding errors
    Codec,
    /// Address-related errors
    Address,
    /// Chain/asset identifier errors
    Identifier,
    /// Amount-related errors
    Amount,
    /// Transaction-related errors
    Transaction,
    /// Key-related errors
    Keys,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Codec => write!(f, "Codec"),
            ErrorCategory::Address => write!(f, "Address"),
            ErrorCategory::Identifier => write!(f, "Identifier"),
            ErrorCategory::Amount => write!(f, "Amount"),
            ErrorCategory::Transaction => write!(f, "Transaction"),
            ErrorCategory::Keys => write!(f, "Keys"),
        }
    }
}
