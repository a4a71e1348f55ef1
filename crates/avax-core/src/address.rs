//! Address display formats
//!
//! On the wire an address is a 20-byte [`ShortId`]. For display it is
//! bech32-encoded with the network HRP and prefixed with the chain alias,
//! e.g. `X-avax1...`. C-chain accounts use [`EthAddress`].

use crate::ids::ShortId;
use crate::{Error, Result};
use bech32::{Bech32, Hrp};
use std::fmt;
use std::str::FromStr;

/// Format `addr` as `ALIAS-hrp1...`
pub fn format_address(alias: &str, hrp: &str, addr: &ShortId) -> Result<String> {
    let hrp = Hrp::parse(hrp)
        .map_err(|e| Error::InvalidAddress(format!("bad HRP {}: {}", hrp, e)))?;
    let encoded = bech32::encode::<Bech32>(hrp, addr.as_bytes())
        .map_err(|e| Error::InvalidAddress(format!("bech32 encode: {}", e)))?;
    Ok(format!("{}-{}", alias, encoded))
}

/// A parsed display address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// Chain alias before the dash (`X`, `P`, `C` or a blockchain ID)
    pub alias: String,
    /// Bech32 HRP
    pub hrp: String,
    /// Address bytes
    pub id: ShortId,
}

/// Parse `ALIAS-hrp1...`
pub fn parse_address(s: &str) -> Result<ParsedAddress> {
    let (alias, body) = s
        .split_once('-')
        .ok_or_else(|| Error::InvalidAddress(format!("missing chain alias: {}", s)))?;
    if alias.is_empty() {
        return Err(Error::InvalidAddress(format!("empty chain alias: {}", s)));
    }
    let (hrp, data) =
        bech32::decode(body).map_err(|e| Error::InvalidAddress(format!("{}: {}", s, e)))?;
    let id = ShortId::from_slice(&data)?;
    Ok(ParsedAddress {
        alias: alias.to_string(),
        hrp: hrp.as_str().to_ascii_lowercase(),
        id,
    })
}

/// An address as callers supply it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    /// Raw 20-byte address
    Raw(ShortId),
    /// `ALIAS-hrp1...` string
    Encoded(String),
}

impl From<ShortId> for AddressInput {
    fn from(id: ShortId) -> Self {
        AddressInput::Raw(id)
    }
}

impl From<&str> for AddressInput {
    fn from(s: &str) -> Self {
        AddressInput::Encoded(s.to_string())
    }
}

impl From<String> for AddressInput {
    fn from(s: String) -> Self {
        AddressInput::Encoded(s)
    }
}

/// Resolve a set of addresses to raw IDs.
///
/// Encoded addresses in one set must share a chain alias; mixing `X-` and
/// `P-` destinations fails with [`Error::InvalidAddress`].
pub fn resolve_addresses(inputs: &[AddressInput]) -> Result<Vec<ShortId>> {
    let mut alias: Option<String> = None;
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            AddressInput::Raw(id) => out.push(*id),
            AddressInput::Encoded(s) => {
                let parsed = parse_address(s)?;
                match &alias {
                    Some(seen) if *seen != parsed.alias => {
                        return Err(Error::InvalidAddress(format!(
                            "mixed chain prefixes {} and {} in one address set",
                            seen, parsed.alias
                        )));
                    }
                    Some(_) => {}
                    None => alias = Some(parsed.alias.clone()),
                }
                out.push(parsed.id);
            }
        }
    }
    Ok(out)
}

/// C-chain account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EthAddress(pub [u8; 20]);

impl EthAddress {
    /// Build from a slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| {
            Error::InvalidAddress(format!("EVM address must be 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EthAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_known_vector() {
        let id = ShortId([0u8; 20]);
        assert_eq!(
            format_address("X", "avax", &id).unwrap(),
            "X-avax1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqxpdk7q"
        );
    }

    #[test]
    fn test_roundtrip() {
        let id = ShortId([0x3c; 20]);
        let s = format_address("P", "fuji", &id).unwrap();
        assert!(s.starts_with("P-fuji1"));
        let parsed = parse_address(&s).unwrap();
        assert_eq!(parsed.alias, "P");
        assert_eq!(parsed.hrp, "fuji");
        assert_eq!(parsed.id, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_address("avax1qqq"), Err(Error::InvalidAddress(_))));
        assert!(matches!(parse_address("X-avax1zzzz"), Err(Error::InvalidAddress(_))));
        assert!(matches!(parse_address("-avax1qqq"), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let hrp = Hrp::parse("avax").unwrap();
        let body = bech32::encode::<Bech32>(hrp, &[1u8; 19]).unwrap();
        assert!(matches!(
            parse_address(&format!("X-{}", body)),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_resolve_mixed_prefixes() {
        let a = format_address("X", "avax", &ShortId([1; 20])).unwrap();
        let b = format_address("P", "avax", &ShortId([2; 20])).unwrap();
        let c = format_address("X", "avax", &ShortId([3; 20])).unwrap();

        let ok = resolve_addresses(&[a.clone().into(), c.into(), ShortId([4; 20]).into()]).unwrap();
        assert_eq!(ok, vec![ShortId([1; 20]), ShortId([3; 20]), ShortId([4; 20])]);

        assert!(matches!(
            resolve_addresses(&[a.into(), b.into()]),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_eth_address() {
        let addr: EthAddress = "0x8db97C7cEcE249c2b98bDC0226Cc4C2A57BF52FC".parse().unwrap();
        assert_eq!(addr.to_string(), "0x8db97c7cece249c2b98bdc0226cc4c2a57bf52fc");
        assert!("0x1234".parse::<EthAddress>().is_err());
    }
}
