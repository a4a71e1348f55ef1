//! Decoded per-chain parameters the builder and signer work against

use crate::codec::Codec;
use crate::ids::Id;
use crate::{Error, Result};
use avax_params::{ChainAlias, FeeConfig, Network, StakingConfig};

/// Everything a transaction builder needs to know about its chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    /// Network ID embedded in transactions
    pub network_id: u32,
    /// Bech32 HRP
    pub hrp: String,
    /// Alias of the chain this context builds for
    pub alias: ChainAlias,
    /// Blockchain ID of this chain
    pub blockchain_id: Id,
    /// X-chain ID
    pub x_chain_id: Id,
    /// P-chain ID
    pub p_chain_id: Id,
    /// C-chain ID
    pub c_chain_id: Id,
    /// Primary asset, which pays fees
    pub avax_asset_id: Id,
    /// Fee schedule
    pub fees: FeeConfig,
    /// Staking limits
    pub staking: StakingConfig,
}

fn decode_chain(name: &str, cb58: &str) -> Result<Id> {
    Id::from_cb58(cb58).map_err(|e| Error::InvalidChainId(format!("{} {}: {}", name, cb58, e)))
}

impl ChainContext {
    /// Build the context for `alias` on `network`
    pub fn from_network(network: &Network, alias: ChainAlias) -> Result<Self> {
        let x_chain_id = decode_chain("X-chain", &network.x_chain_id)?;
        let p_chain_id = decode_chain("P-chain", &network.p_chain_id)?;
        let c_chain_id = decode_chain("C-chain", &network.c_chain_id)?;
        let avax_asset_id = Id::from_cb58(&network.avax_asset_id).map_err(|e| {
            Error::InvalidAssetId(format!("{}: {}", network.avax_asset_id, e))
        })?;
        let blockchain_id = match alias {
            ChainAlias::X => x_chain_id,
            ChainAlias::P => p_chain_id,
            ChainAlias::C => c_chain_id,
        };
        Ok(Self {
            network_id: network.network_id,
            hrp: network.hrp.clone(),
            alias,
            blockchain_id,
            x_chain_id,
            p_chain_id,
            c_chain_id,
            avax_asset_id,
            fees: network.consensus.fees.clone(),
            staking: network.consensus.staking.clone(),
        })
    }

    /// Codec of this chain
    pub fn codec(&self) -> Codec {
        Codec::for_chain(self.alias)
    }

    /// Blockchain ID for another chain on the same network
    pub fn chain_id(&self, alias: ChainAlias) -> Id {
        match alias {
            ChainAlias::X => self.x_chain_id,
            ChainAlias::P => self.p_chain_id,
            ChainAlias::C => self.c_chain_id,
        }
    }

    /// Alias for a blockchain ID on this network
    pub fn alias_of(&self, chain_id: &Id) -> Option<ChainAlias> {
        [ChainAlias::X, ChainAlias::P, ChainAlias::C]
            .into_iter()
            .find(|alias| self.chain_id(*alias) == *chain_id)
    }

    /// Same network, different chain
    pub fn for_chain(&self, alias: ChainAlias) -> Self {
        Self {
            alias,
            blockchain_id: self.chain_id(alias),
            ..self.clone()
        }
    }
}
