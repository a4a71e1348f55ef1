//! C-chain atomic transactions

use super::base::{MIN_INPUT_LEN, MIN_OUTPUT_LEN};
use crate::binary::{Reader, Writer};
use crate::codec::{read_vec, write_vec, Codec, Serializable};
use crate::evm::{sort_evm_inputs, sort_evm_outputs, EvmInput, EvmOutput};
use crate::ids::Id;
use crate::inputs::{sort_inputs, TransferableInput};
use crate::outputs::{sort_outputs, TransferableOutput};
use crate::Result;

const EVM_OUTPUT_LEN: usize = 20 + 8 + 32;
const EVM_INPUT_LEN: usize = 20 + 8 + 32 + 8;

/// Credit EVM accounts from UTXOs exported to the C-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmImportTx {
    /// Network ID
    pub network_id: u32,
    /// C-chain ID
    pub blockchain_id: Id,
    /// Chain the UTXOs were exported from
    pub source_chain: Id,
    /// Inputs spending shared-memory UTXOs
    pub imported_inputs: Vec<TransferableInput>,
    /// Account credits
    pub outputs: Vec<EvmOutput>,
}

impl EvmImportTx {
    /// Canonical order for all collections
    pub fn sort(&mut self) {
        sort_inputs(&mut self.imported_inputs);
        sort_evm_outputs(&mut self.outputs);
    }
}

impl Serializable for EvmImportTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u32(self.network_id);
        w.write_bytes(self.blockchain_id.as_bytes());
        w.write_bytes(self.source_chain.as_bytes());
        write_vec(codec, w, &self.imported_inputs)?;
        write_vec(codec, w, &self.outputs)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            network_id: r.read_u32()?,
            blockchain_id: Id(r.read_array()?),
            source_chain: Id(r.read_array()?),
            imported_inputs: read_vec(codec, r, MIN_INPUT_LEN)?,
            outputs: read_vec(codec, r, EVM_OUTPUT_LEN)?,
        })
    }
}

/// Debit EVM accounts into shared memory for `destination_chain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmExportTx {
    /// Network ID
    pub network_id: u32,
    /// C-chain ID
    pub blockchain_id: Id,
    /// Chain that may import the exported outputs
    pub destination_chain: Id,
    /// Account debits
    pub inputs: Vec<EvmInput>,
    /// Outputs placed in shared memory
    pub exported_outputs: Vec<TransferableOutput>,
}

impl EvmExportTx {
    /// Canonical order for all collections
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        sort_evm_inputs(&mut self.inputs);
        sort_outputs(codec, &mut self.exported_outputs)
    }
}

impl Serializable for EvmExportTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u32(self.network_id);
        w.write_bytes(self.blockchain_id.as_bytes());
        w.write_bytes(self.destination_chain.as_bytes());
        write_vec(codec, w, &self.inputs)?;
        write_vec(codec, w, &self.exported_outputs)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            network_id: r.read_u32()?,
            blockchain_id: Id(r.read_array()?),
            destination_chain: Id(r.read_array()?),
            inputs: read_vec(codec, r, EVM_INPUT_LEN)?,
            exported_outputs: read_vec(codec, r, MIN_OUTPUT_LEN)?,
        })
    }
}
