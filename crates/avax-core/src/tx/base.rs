//! Fields shared by every UTXO-side transaction

use crate::binary::{Reader, Writer};
use crate::codec::{read_vec, write_vec, Codec, Serializable};
use crate::ids::Id;
use crate::inputs::{sort_inputs, TransferableInput};
use crate::outputs::{sort_outputs, TransferableOutput};
use crate::Result;

/// Maximum memo length accepted by the node
pub const MAX_MEMO_LEN: usize = 256;

// assetID + typeID
pub(crate) const MIN_OUTPUT_LEN: usize = 32 + 4;
// txID + index + assetID + typeID
pub(crate) const MIN_INPUT_LEN: usize = 32 + 4 + 32 + 4;

/// Network, chain, inputs, outputs and memo
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BaseTx {
    /// Network ID
    pub network_id: u32,
    /// Chain the transaction is issued on
    pub blockchain_id: Id,
    /// Outputs created on this chain
    pub outputs: Vec<TransferableOutput>,
    /// Inputs consumed on this chain
    pub inputs: Vec<TransferableInput>,
    /// Free-form memo
    pub memo: Vec<u8>,
}

impl BaseTx {
    /// Create a base transaction
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> Self {
        Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo,
        }
    }

    /// Put inputs and outputs into canonical order
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        sort_outputs(codec, &mut self.outputs)?;
        sort_inputs(&mut self.inputs);
        Ok(())
    }
}

impl Serializable for BaseTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u32(self.network_id);
        w.write_bytes(self.blockchain_id.as_bytes());
        write_vec(codec, w, &self.outputs)?;
        write_vec(codec, w, &self.inputs)?;
        w.write_sized_bytes(&self.memo)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let network_id = r.read_u32()?;
        let blockchain_id = Id(r.read_array()?);
        let outputs = read_vec(codec, r, MIN_OUTPUT_LEN)?;
        let inputs = read_vec(codec, r, MIN_INPUT_LEN)?;
        let memo = r.read_sized_bytes()?.to_vec();
        Ok(Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo,
        })
    }
}
