//! Custom network configuration loaded from JSON

use crate::consensus::{ConsensusParams, FeeConfig, StakingConfig};
use crate::network::{hrp_for_network_id, Network};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON shape of a custom network
///
/// Only the network ID and the chain/asset identifiers are required. The HRP
/// defaults from the network ID, fees and staking limits default from the
/// closest preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Numeric network ID
    pub network_id: u32,
    /// Optional name (defaults to `network-<id>`)
    #[serde(default)]
    pub name: Option<String>,
    /// Optional HRP override
    #[serde(default)]
    pub hrp: Option<String>,
    /// X-chain blockchain ID (CB58)
    pub x_chain_id: String,
    /// P-chain blockchain ID (CB58), defaults to the zero ID
    #[serde(default)]
    pub p_chain_id: Option<String>,
    /// C-chain blockchain ID (CB58)
    pub c_chain_id: String,
    /// Primary asset ID (CB58)
    pub avax_asset_id: String,
    /// EVM chain ID
    #[serde(default)]
    pub evm_chain_id: Option<u64>,
    /// Fee schedule override
    #[serde(default)]
    pub fees: Option<FeeConfig>,
    /// Staking limits override
    #[serde(default)]
    pub staking: Option<StakingConfig>,
}

impl NetworkConfig {
    /// Validate and turn into a [`Network`]
    pub fn into_network(self) -> Result<Network> {
        if self.network_id == 0 {
            return Err(Error::Config("network_id must be non-zero".to_string()));
        }
        for (field, value) in [
            ("x_chain_id", &self.x_chain_id),
            ("c_chain_id", &self.c_chain_id),
            ("avax_asset_id", &self.avax_asset_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", field)));
            }
        }

        let defaults = ConsensusParams::from_network_id(self.network_id);
        let preset_p_chain = Network::mainnet().p_chain_id;

        Ok(Network {
            network_id: self.network_id,
            name: self
                .name
                .unwrap_or_else(|| format!("network-{}", self.network_id)),
            hrp: self
                .hrp
                .unwrap_or_else(|| hrp_for_network_id(self.network_id).to_string()),
            x_chain_id: self.x_chain_id,
            p_chain_id: self.p_chain_id.unwrap_or(preset_p_chain),
            c_chain_id: self.c_chain_id,
            avax_asset_id: self.avax_asset_id,
            evm_chain_id: self.evm_chain_id.unwrap_or(43_112),
            consensus: ConsensusParams {
                fees: self.fees.unwrap_or(defaults.fees),
                staking: self.staking.unwrap_or(defaults.staking),
            },
        })
    }
}

impl Network {
    /// Parse a custom network from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        config.into_network()
    }

    /// Load a custom network from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
