//! Avalanche wallet core
//!
//! This crate implements the node's binary codec (CB58, typed inputs,
//! outputs and credentials), the UTXO set, unsigned transaction building for
//! the X-, P- and C-chain, and secp256k1 signing with a keychain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod binary;
pub mod builder;
pub mod cb58;
pub mod codec;
pub mod context;
pub mod credentials;
pub mod error;
pub mod evm;
pub mod fees;
pub mod ids;
pub mod inputs;
pub mod issue;
pub mod keychain;
pub mod outputs;
pub mod selection;
pub mod tx;
pub mod utxo;

pub use address::{format_address, parse_address, AddressInput, EthAddress, ParsedAddress};
pub use builder::{SpendOptions, StakeRequest, TxBuilder};
pub use codec::{Codec, Serializable, TypeKind, CODEC_VERSION};
pub use context::ChainContext;
pub use credentials::{Credential, Signature};
pub use error::{Error, ErrorCategory, Result};
pub use evm::{EvmInput, EvmOutput};
pub use fees::{FeeCalculator, FeeSplitPolicy, SeparateFeeAsset, GOOSE_EGG_FEE_MULTIPLIER};
pub use ids::{Id, IdInput, NodeId, ShortId};
pub use inputs::{Input, SecpTransferInput, SigIndex, StakeableLockIn, TransferableInput};
pub use issue::IssuePayload;
pub use keychain::{KeyChain, KeyPair};
pub use outputs::{
    Output, OutputOwners, SecpMintOutput, SecpOwnerOutput, SecpTransferOutput, StakeableLockOut,
    TransferableOutput,
};
pub use selection::{AssetRequirement, SelectionResult, SelectionStrategy, UtxoSelector};
pub use tx::{Tx, UnsignedTx};
pub use utxo::{RawUtxo, Utxo, UtxoId, UtxoSet};
