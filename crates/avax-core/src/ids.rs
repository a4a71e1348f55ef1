//! Fixed-size identifiers
//!
//! [`Id`] (32 bytes) names transactions, assets and chains. [`ShortId`]
//! (20 bytes) names addresses and nodes. Both display as CB58.

use crate::{cb58, Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an [`Id`]
pub const ID_LEN: usize = 32;
/// Length of a [`ShortId`]
pub const SHORT_ID_LEN: usize = 20;

const NODE_ID_PREFIX: &str = "NodeID-";

/// 32-byte identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub [u8; ID_LEN]);

impl Id {
    /// The all-zero ID (P-chain blockchain ID)
    pub const EMPTY: Id = Id([0u8; ID_LEN]);

    /// Build from a slice, failing on the wrong length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!("expected {} bytes, got {}", ID_LEN, bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Decode from CB58
    pub fn from_cb58(s: &str) -> Result<Self> {
        Self::from_slice(&cb58::decode(s)?)
    }

    /// Encode as CB58
    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.0)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// SHA-256 of `data` as an ID
    pub fn hash(data: &[u8]) -> Self {
        Self(cb58::sha256(data))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cb58(s)
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::from_cb58(&s).map_err(serde::de::Error::custom)
    }
}

/// 20-byte identifier (address hash or node ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShortId(pub [u8; SHORT_ID_LEN]);

impl ShortId {
    /// Build from a slice, failing on the wrong length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SHORT_ID_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidAddress(format!(
                "expected {} bytes, got {}",
                SHORT_ID_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Decode from CB58
    pub fn from_cb58(s: &str) -> Result<Self> {
        Self::from_slice(&cb58::decode(s)?)
    }

    /// Encode as CB58
    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.0)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SHORT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl From<[u8; SHORT_ID_LEN]> for ShortId {
    fn from(bytes: [u8; SHORT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ShortId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Validator node ID, displayed as `NodeID-<cb58>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub ShortId);

impl NodeId {
    /// Parse `NodeID-<cb58>` (the prefix is optional)
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix(NODE_ID_PREFIX).unwrap_or(s);
        let bytes = cb58::decode(body)?;
        let id = ShortId::from_slice(&bytes)
            .map_err(|_| Error::InvalidEncoding(format!("node ID must be 20 bytes: {}", s)))?;
        Ok(Self(id))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, self.0.to_cb58())
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A 32-byte ID as callers supply it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdInput {
    /// Already decoded
    Raw(Id),
    /// Raw bytes of unchecked length
    Bytes(Vec<u8>),
    /// CB58 string
    Encoded(String),
}

impl IdInput {
    fn resolve(&self) -> std::result::Result<Id, String> {
        match self {
            IdInput::Raw(id) => Ok(*id),
            IdInput::Bytes(bytes) => {
                Id::from_slice(bytes).map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
            }
            IdInput::Encoded(s) => Id::from_cb58(s).map_err(|e| format!("{}: {}", s, e)),
        }
    }
}

impl From<Id> for IdInput {
    fn from(id: Id) -> Self {
        IdInput::Raw(id)
    }
}

impl From<[u8; ID_LEN]> for IdInput {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        IdInput::Raw(Id(bytes))
    }
}

impl From<Vec<u8>> for IdInput {
    fn from(bytes: Vec<u8>) -> Self {
        IdInput::Bytes(bytes)
    }
}

impl From<&[u8]> for IdInput {
    fn from(bytes: &[u8]) -> Self {
        IdInput::Bytes(bytes.to_vec())
    }
}

impl From<&str> for IdInput {
    fn from(s: &str) -> Self {
        IdInput::Encoded(s.to_string())
    }
}

impl From<String> for IdInput {
    fn from(s: String) -> Self {
        IdInput::Encoded(s)
    }
}

/// Normalize a chain ID, failing with [`Error::InvalidChainId`]
pub fn resolve_chain_id(input: &IdInput) -> Result<Id> {
    input.resolve().map_err(Error::InvalidChainId)
}

/// Normalize an asset ID, failing with [`Error::InvalidAssetId`]
pub fn resolve_asset_id(input: &IdInput) -> Result<Id> {
    input.resolve().map_err(Error::InvalidAssetId)
}
