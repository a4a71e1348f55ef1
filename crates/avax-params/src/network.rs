//! Avalanche network definitions

use crate::consensus::ConsensusParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mainnet network ID
pub const MAINNET_ID: u32 = 1;
/// Fuji testnet network ID
pub const FUJI_ID: u32 = 5;
/// Conventional ID for ad-hoc custom networks
pub const CUSTOM_ID: u32 = 1337;
/// Default local network ID
pub const LOCAL_ID: u32 = 12345;

/// Bech32 human-readable part used by a network ID
pub fn hrp_for_network_id(network_id: u32) -> &'static str {
    match network_id {
        MAINNET_ID => "avax",
        2 => "cascade",
        3 => "denali",
        4 => "everest",
        FUJI_ID => "fuji",
        LOCAL_ID => "local",
        _ => "custom",
    }
}

/// Chain alias used as the address prefix (`X-avax1...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainAlias {
    /// Exchange chain (AVM)
    X,
    /// Platform chain (PlatformVM)
    P,
    /// Contract chain (EVM)
    C,
}

impl ChainAlias {
    /// Alias as it appears in addresses
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainAlias::X => "X",
            ChainAlias::P => "P",
            ChainAlias::C => "C",
        }
    }
}

impl fmt::Display for ChainAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainAlias {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "X" | "x" => Ok(ChainAlias::X),
            "P" | "p" => Ok(ChainAlias::P),
            "C" | "c" => Ok(ChainAlias::C),
            other => Err(Error::UnknownChainAlias(other.to_string())),
        }
    }
}

/// Network configuration
///
/// Chain and asset identifiers are kept in their CB58 string form; the core
/// crate decodes them when it builds a chain context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Numeric network ID embedded in every transaction
    pub network_id: u32,
    /// Human-readable name
    pub name: String,
    /// Bech32 HRP for addresses
    pub hrp: String,
    /// X-chain blockchain ID (CB58)
    pub x_chain_id: String,
    /// P-chain blockchain ID (CB58)
    pub p_chain_id: String,
    /// C-chain blockchain ID (CB58)
    pub c_chain_id: String,
    /// Primary asset (AVAX) ID (CB58)
    pub avax_asset_id: String,
    /// EVM chain ID of the C-chain
    pub evm_chain_id: u64,
    /// Fees and staking limits
    pub consensus: ConsensusParams,
}

/// The P-chain ID is the zero ID on every network.
const P_CHAIN_ID: &str = "11111111111111111111111111111111LpoYY";

impl Network {
    /// Get mainnet parameters
    pub fn mainnet() -> Self {
        Self {
            network_id: MAINNET_ID,
            name: "mainnet".to_string(),
            hrp: hrp_for_network_id(MAINNET_ID).to_string(),
            x_chain_id: "2oYMBNV4eNHyqk2fjjV5nVQLDbtmNJzq5s3qs3Lo6ftnC6FByM".to_string(),
            p_chain_id: P_CHAIN_ID.to_string(),
            c_chain_id: "2q9e4r6Mu3U68nU1fYjgbR6JvwrRx36CohpAX5UQxse55x1Q5".to_string(),
            avax_asset_id: "FvwEAhmxKfeiG8SnEvq42hc6whRyY3EFYAvebMqDNDGCgxN5Z".to_string(),
            evm_chain_id: 43_114,
            consensus: ConsensusParams::from_network_id(MAINNET_ID),
        }
    }

    /// Get Fuji testnet parameters
    pub fn fuji() -> Self {
        Self {
            network_id: FUJI_ID,
            name: "fuji".to_string(),
            hrp: hrp_for_network_id(FUJI_ID).to_string(),
            x_chain_id: "2JVSBoinj9C2J33VntvzYtVJNZdN2NKiwwKjcumHUWEb5DbBrm".to_string(),
            p_chain_id: P_CHAIN_ID.to_string(),
            c_chain_id: "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp".to_string(),
            avax_asset_id: "U8iRqJoiJm8xZHAacmvYyZVwqQx6uDNtQeP3CQ6fcgQk3JqnK".to_string(),
            evm_chain_id: 43_113,
            consensus: ConsensusParams::from_network_id(FUJI_ID),
        }
    }

    /// Get local network parameters (default local genesis)
    pub fn local() -> Self {
        Self {
            network_id: LOCAL_ID,
            name: "local".to_string(),
            hrp: hrp_for_network_id(LOCAL_ID).to_string(),
            x_chain_id: "2eNy1mUFdmaxXNj1eQHUe7Np4gju9sJsEtWQ4MX3ToiNKuADed".to_string(),
            p_chain_id: P_CHAIN_ID.to_string(),
            c_chain_id: "2CA6j5zYzasynPsFeNoqWkmTCt3VScMvXUZHbfDJ8k3oGzAPtU".to_string(),
            avax_asset_id: "2fombhL7aGPwj3KH4bfrmJwW6PVnMobf9Y2fn9GwxiAAJyFDbe".to_string(),
            evm_chain_id: 43_112,
            consensus: ConsensusParams::from_network_id(LOCAL_ID),
        }
    }

    /// Get a preset network by numeric ID
    pub fn from_id(network_id: u32) -> Result<Self> {
        match network_id {
            MAINNET_ID => Ok(Self::mainnet()),
            FUJI_ID => Ok(Self::fuji()),
            LOCAL_ID => Ok(Self::local()),
            other => Err(Error::InvalidNetwork(format!(
                "no preset for network ID {}",
                other
            ))),
        }
    }

    /// Get a preset network by name or HRP
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" | "avax" => Ok(Self::mainnet()),
            "fuji" | "testnet" => Ok(Self::fuji()),
            "local" => Ok(Self::local()),
            other => Err(Error::InvalidNetwork(other.to_string())),
        }
    }

    /// Blockchain ID (CB58) for a chain alias
    pub fn chain_id(&self, alias: ChainAlias) -> &str {
        match alias {
            ChainAlias::X => &self.x_chain_id,
            ChainAlias::P => &self.p_chain_id,
            ChainAlias::C => &self.c_chain_id,
        }
    }

    /// Reverse lookup of a chain alias by blockchain ID (CB58)
    pub fn alias_for_chain_id(&self, chain_id: &str) -> Option<ChainAlias> {
        [ChainAlias::X, ChainAlias::P, ChainAlias::C]
            .into_iter()
            .find(|alias| self.chain_id(*alias) == chain_id)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_params() {
        let net = Network::mainnet();
        assert_eq!(net.network_id, 1);
        assert_eq!(net.hrp, "avax");
        assert_eq!(net.evm_chain_id, 43_114);
        assert_eq!(net.chain_id(ChainAlias::P), P_CHAIN_ID);
    }

    #[test]
    fn test_network_lookup() {
        assert_eq!(Network::from_id(FUJI_ID).unwrap().hrp, "fuji");
        assert_eq!(Network::from_name("Mainnet").unwrap().network_id, MAINNET_ID);
        assert!(Network::from_id(42).is_err());
        assert!(Network::from_name("moonnet").is_err());
    }

    #[test]
    fn test_hrp_for_network_id() {
        assert_eq!(hrp_for_network_id(1), "avax");
        assert_eq!(hrp_for_network_id(5), "fuji");
        assert_eq!(hrp_for_network_id(12345), "local");
        assert_eq!(hrp_for_network_id(9999), "custom");
    }

    #[test]
    fn test_chain_alias_parse() {
        assert_eq!("X".parse::<ChainAlias>().unwrap(), ChainAlias::X);
        assert_eq!("p".parse::<ChainAlias>().unwrap(), ChainAlias::P);
        assert!("Q".parse::<ChainAlias>().is_err());
        assert_eq!(ChainAlias::C.to_string(), "C");
    }

    #[test]
    fn test_alias_for_chain_id() {
        let net = Network::fuji();
        let x = net.x_chain_id.clone();
        assert_eq!(net.alias_for_chain_id(&x), Some(ChainAlias::X));
        assert_eq!(net.alias_for_chain_id("nope"), None);
    }
}
