//! Normalize what callers hand to `issueTx`

use crate::cb58;
use crate::codec::Codec;
use crate::tx::Tx;
use crate::{Error, Result};

/// A signed transaction in any form a caller may hold it
#[derive(Debug, Clone)]
pub enum IssuePayload<'a> {
    /// CB58 or checksummed `0x` hex
    Encoded(String),
    /// Signed bytes
    Bytes(Vec<u8>),
    /// Decoded transaction
    Tx(&'a Tx),
}

impl<'a> From<&'a Tx> for IssuePayload<'a> {
    fn from(tx: &'a Tx) -> Self {
        IssuePayload::Tx(tx)
    }
}

impl From<&str> for IssuePayload<'_> {
    fn from(s: &str) -> Self {
        IssuePayload::Encoded(s.to_string())
    }
}

impl From<String> for IssuePayload<'_> {
    fn from(s: String) -> Self {
        IssuePayload::Encoded(s)
    }
}

impl From<Vec<u8>> for IssuePayload<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        IssuePayload::Bytes(bytes)
    }
}

fn unexpected(detail: impl std::fmt::Display) -> Error {
    Error::UnexpectedTransactionInput(detail.to_string())
}

impl IssuePayload<'_> {
    /// Checksummed hex of the signed bytes.
    ///
    /// Strings and bytes must decode as a signed transaction for `codec`;
    /// anything else fails with [`Error::UnexpectedTransactionInput`].
    pub fn to_hex(&self, codec: Codec) -> Result<String> {
        let bytes = match self {
            IssuePayload::Tx(tx) => return tx.to_string_hex(),
            IssuePayload::Encoded(s) => {
                cb58::decode_any(s).map_err(|e| unexpected(format!("not CB58 or hex: {}", e)))?
            }
            IssuePayload::Bytes(bytes) => bytes.clone(),
        };
        Tx::from_bytes(codec, &bytes)
            .map_err(|e| unexpected(format!("not a signed {} transaction: {}", codec, e)))?;
        Ok(cb58::encode_hex(&bytes))
    }
}
