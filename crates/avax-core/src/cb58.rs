//! CB58 and checksummed hex encodings
//!
//! CB58 is base58 over `payload || checksum` where the checksum is the last
//! four bytes of `sha256(payload)`. The node also accepts the same checksummed
//! payload as `0x`-prefixed hex.

use crate::{Error, Result};
use sha2::{Digest, Sha256};

/// Checksum length in bytes
pub const CHECKSUM_LEN: usize = 4;

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Last four bytes of `sha256(data)`
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
    out
}

/// Append the checksum to `data`
pub fn add_checksum(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum(data));
    out
}

/// Split off and verify a trailing checksum
pub fn strip_checksum(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < CHECKSUM_LEN {
        return Err(Error::InvalidEncoding(format!(
            "{} bytes is too short to carry a checksum",
            data.len()
        )));
    }
    let (payload, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(payload) != sum {
        return Err(Error::ChecksumMismatch(format!(
            "expected {}, found {}",
            hex::encode(checksum(payload)),
            hex::encode(sum)
        )));
    }
    Ok(payload.to_vec())
}

/// Encode bytes as CB58
pub fn encode(data: &[u8]) -> String {
    bs58::encode(add_checksum(data)).into_string()
}

/// Decode a CB58 string
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let raw = bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InvalidEncoding(format!("base58: {}", e)))?;
    strip_checksum(&raw)
}

/// Encode bytes as `0x` + hex(bytes || checksum)
pub fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(add_checksum(data)))
}

/// Decode `0x` + hex(bytes || checksum)
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidEncoding("hex string must start with 0x".to_string()))?;
    let raw = hex::decode(digits).map_err(|e| Error::InvalidEncoding(format!("hex: {}", e)))?;
    strip_checksum(&raw)
}

/// Decode either checksummed form, picking hex when the `0x` prefix is present
pub fn decode_any(s: &str) -> Result<Vec<u8>> {
    if s.starts_with("0x") {
        decode_hex(s)
    } else {
        decode(s)
    }
}
