//! Cross-chain import and export, shared by the X- and P-chain

use super::base::{BaseTx, MIN_INPUT_LEN, MIN_OUTPUT_LEN};
use crate::binary::{Reader, Writer};
use crate::codec::{read_vec, write_vec, Codec, Serializable};
use crate::ids::Id;
use crate::inputs::{sort_inputs, TransferableInput};
use crate::outputs::{sort_outputs, TransferableOutput};
use crate::Result;

/// Consume UTXOs exported to this chain from `source_chain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTx {
    /// Local inputs and outputs
    pub base: BaseTx,
    /// Chain the UTXOs were exported from
    pub source_chain: Id,
    /// Inputs spending shared-memory UTXOs
    pub imported_inputs: Vec<TransferableInput>,
}

impl ImportTx {
    /// Canonical order for all collections
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        self.base.sort(codec)?;
        sort_inputs(&mut self.imported_inputs);
        Ok(())
    }
}

impl Serializable for ImportTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        self.base.write_to(codec, w)?;
        w.write_bytes(self.source_chain.as_bytes());
        write_vec(codec, w, &self.imported_inputs)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read_from(codec, r)?;
        let source_chain = Id(r.read_array()?);
        let imported_inputs = read_vec(codec, r, MIN_INPUT_LEN)?;
        Ok(Self {
            base,
            source_chain,
            imported_inputs,
        })
    }
}

/// Move value from this chain into shared memory for `destination_chain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    /// Local inputs and change outputs
    pub base: BaseTx,
    /// Chain that may import the exported outputs
    pub destination_chain: Id,
    /// Outputs placed in shared memory
    pub exported_outputs: Vec<TransferableOutput>,
}

impl ExportTx {
    /// Canonical order for all collections
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        self.base.sort(codec)?;
        sort_outputs(codec, &mut self.exported_outputs)
    }
}

impl Serializable for ExportTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        self.base.write_to(codec, w)?;
        w.write_bytes(self.destination_chain.as_bytes());
        write_vec(codec, w, &self.exported_outputs)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read_from(codec, r)?;
        let destination_chain = Id(r.read_array()?);
        let exported_outputs = read_vec(codec, r, MIN_OUTPUT_LEN)?;
        Ok(Self {
            base,
            destination_chain,
            exported_outputs,
        })
    }
}
