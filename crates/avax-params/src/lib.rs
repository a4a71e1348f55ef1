//! Avalanche network parameters and constants
//!
//! This crate provides network IDs, bech32 HRPs, chain identifiers, the
//! primary asset ID, the fee schedule and staking limits for the networks the
//! wallet SDK talks to, plus JSON loading for custom networks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod consensus;
pub mod network;

pub use config::NetworkConfig;
pub use consensus::{
    ConsensusParams, FeeConfig, StakingConfig, NANO_AVAX, ONE_AVAX, PERCENT_DENOMINATOR,
};
pub use network::{
    hrp_for_network_id, ChainAlias, Network, CUSTOM_ID, FUJI_ID, LOCAL_ID, MAINNET_ID,
};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Unknown chain alias
    #[error("Unknown chain alias: {0}")]
    UnknownChainAlias(String),

    /// Invalid network configuration
    #[error("Invalid network config: {0}")]
    Config(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
