//! C-chain account-side inputs and outputs of atomic transactions

use crate::address::EthAddress;
use crate::binary::{Reader, Writer};
use crate::codec::{Codec, Serializable};
use crate::ids::Id;
use crate::Result;

/// Credit to an EVM account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmOutput {
    /// Receiving account
    pub address: EthAddress,
    /// Amount
    pub amount: u64,
    /// Asset ID
    pub asset_id: Id,
}

impl Serializable for EvmOutput {
    fn write_to(&self, _codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_bytes(self.address.as_bytes());
        w.write_u64(self.amount);
        w.write_bytes(self.asset_id.as_bytes());
        Ok(())
    }

    fn read_from(_codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            address: EthAddress(r.read_array()?),
            amount: r.read_u64()?,
            asset_id: Id(r.read_array()?),
        })
    }
}

/// Debit from an EVM account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmInput {
    /// Debited account
    pub address: EthAddress,
    /// Amount
    pub amount: u64,
    /// Asset ID
    pub asset_id: Id,
    /// Account nonce
    pub nonce: u64,
}

impl Serializable for EvmInput {
    fn write_to(&self, _codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_bytes(self.address.as_bytes());
        w.write_u64(self.amount);
        w.write_bytes(self.asset_id.as_bytes());
        w.write_u64(self.nonce);
        Ok(())
    }

    fn read_from(_codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            address: EthAddress(r.read_array()?),
            amount: r.read_u64()?,
            asset_id: Id(r.read_array()?),
            nonce: r.read_u64()?,
        })
    }
}

/// Sort EVM outputs by address, then asset
pub fn sort_evm_outputs(outputs: &mut [EvmOutput]) {
    outputs.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
}

/// Sort EVM inputs by address, then asset
pub fn sort_evm_inputs(inputs: &mut [EvmInput]) {
    inputs.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
}
