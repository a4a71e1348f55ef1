//! Transaction structures for the X-, P- and C-chain

pub mod atomic;
pub mod base;
pub mod evm;
pub mod pvm;
pub mod signed;
pub mod unsigned;

pub use atomic::{ExportTx, ImportTx};
pub use base::{BaseTx, MAX_MEMO_LEN};
pub use evm::{EvmExportTx, EvmImportTx};
pub use pvm::{AddDelegatorTx, AddValidatorTx, CreateSubnetTx, Validator};
pub use signed::Tx;
pub use unsigned::{CredentialSigners, UnsignedTx};
