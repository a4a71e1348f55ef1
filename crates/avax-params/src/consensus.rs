//! Fee schedule and staking limits

use crate::network::{FUJI_ID, MAINNET_ID};
use serde::{Deserialize, Serialize};

/// Smallest denomination (nAVAX)
pub const NANO_AVAX: u64 = 1;

/// One AVAX in nAVAX
pub const ONE_AVAX: u64 = 1_000_000_000;

const MILLI_AVAX: u64 = ONE_AVAX / 1_000;

/// Denominator for delegation shares (1_000_000 = 100%)
pub const PERCENT_DENOMINATOR: u32 = 1_000_000;

/// Static fee schedule (nAVAX)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Base transaction fee (X and P chain)
    pub tx_fee: u64,
    /// Fee for creating an asset on the X-chain
    pub create_asset_fee: u64,
    /// Fee for creating a subnet
    pub create_subnet_fee: u64,
    /// Fee for creating a blockchain
    pub create_blockchain_fee: u64,
    /// Fee for adding a primary network validator
    pub add_validator_fee: u64,
    /// Fee for adding a primary network delegator
    pub add_delegator_fee: u64,
    /// Fixed fee burned by C-chain atomic transactions
    pub evm_atomic_fee: u64,
}

impl FeeConfig {
    /// Mainnet fee schedule
    pub fn mainnet() -> Self {
        Self {
            tx_fee: MILLI_AVAX,
            create_asset_fee: 10 * MILLI_AVAX,
            create_subnet_fee: ONE_AVAX,
            create_blockchain_fee: ONE_AVAX,
            add_validator_fee: 0,
            add_delegator_fee: 0,
            evm_atomic_fee: MILLI_AVAX,
        }
    }

    /// Fuji fee schedule
    pub fn fuji() -> Self {
        Self {
            create_subnet_fee: 100 * MILLI_AVAX,
            create_blockchain_fee: 100 * MILLI_AVAX,
            ..Self::mainnet()
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Primary network staking limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Minimum validator stake (nAVAX)
    pub min_validator_stake: u64,
    /// Maximum validator stake (nAVAX)
    pub max_validator_stake: u64,
    /// Minimum delegator stake (nAVAX)
    pub min_delegator_stake: u64,
    /// Minimum delegation fee in shares of [`PERCENT_DENOMINATOR`]
    pub min_delegation_fee: u32,
    /// Minimum staking duration (seconds)
    pub min_stake_duration: u64,
    /// Maximum staking duration (seconds)
    pub max_stake_duration: u64,
}

impl StakingConfig {
    /// Mainnet staking limits
    pub fn mainnet() -> Self {
        Self {
            min_validator_stake: 2_000 * ONE_AVAX,
            max_validator_stake: 3_000_000 * ONE_AVAX,
            min_delegator_stake: 25 * ONE_AVAX,
            min_delegation_fee: 20_000, // 2%
            min_stake_duration: 14 * 24 * 60 * 60,
            max_stake_duration: 365 * 24 * 60 * 60,
        }
    }

    /// Fuji staking limits
    pub fn fuji() -> Self {
        Self {
            min_validator_stake: ONE_AVAX,
            min_delegator_stake: ONE_AVAX,
            min_stake_duration: 24 * 60 * 60,
            ..Self::mainnet()
        }
    }

    /// Local network staking limits
    pub fn local() -> Self {
        Self {
            min_stake_duration: 24 * 60 * 60,
            ..Self::mainnet()
        }
    }

    /// Check a delegation fee (in shares) is within limits
    pub fn is_valid_delegation_fee(&self, shares: u32) -> bool {
        shares >= self.min_delegation_fee && shares <= PERCENT_DENOMINATOR
    }

    /// Check a staking period (seconds) is within limits
    pub fn is_valid_stake_duration(&self, duration: u64) -> bool {
        duration >= self.min_stake_duration && duration <= self.max_stake_duration
    }

    /// Check a validator weight (nAVAX) is within limits
    pub fn is_valid_validator_stake(&self, amount: u64) -> bool {
        amount >= self.min_validator_stake && amount <= self.max_validator_stake
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Consensus parameters relevant to transaction building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Fee schedule
    pub fees: FeeConfig,
    /// Staking limits
    pub staking: StakingConfig,
}

impl ConsensusParams {
    /// Get consensus params by network ID
    pub fn from_network_id(network_id: u32) -> Self {
        match network_id {
            MAINNET_ID => Self {
                fees: FeeConfig::mainnet(),
                staking: StakingConfig::mainnet(),
            },
            FUJI_ID => Self {
                fees: FeeConfig::fuji(),
                staking: StakingConfig::fuji(),
            },
            _ => Self {
                fees: FeeConfig::mainnet(),
                staking: StakingConfig::local(),
            },
        }
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::from_network_id(MAINNET_ID)
    }
}
