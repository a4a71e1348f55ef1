//! Node boundary for the Avalanche wallet SDK
//!
//! Defines the [`NodeClient`] trait the wallet talks to, paginated UTXO
//! fetching, and [`ChainWallet`] flows that fetch, build, sign and issue.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fetch;
#[cfg(feature = "test-helpers")]
pub mod memory;
pub mod node;
pub mod wallet;

pub use fetch::{fetch_utxo_set, DEFAULT_PAGE_SIZE};
#[cfg(feature = "test-helpers")]
pub use memory::{IssuedTx, MemoryNode};
pub use node::{GetUtxosRequest, NodeClient, UtxoIndex, UtxoPage};
pub use wallet::ChainWallet;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Codec, build or signing failure
    #[error("Core error: {0}")]
    Core(#[from] avax_core::Error),

    /// Node rejected or failed a request
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Node reported a full page but returned no UTXOs
    #[error("Empty UTXO page: {0}")]
    EmptyPage(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
