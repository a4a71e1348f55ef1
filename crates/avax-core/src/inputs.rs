//! Transaction inputs
//!
//! An input references a UTXO and lists which of its owners sign. Each
//! signature index remembers, in memory only, the address that must produce
//! the signature so the signer can look the key up without the UTXO set.

use crate::binary::{Reader, Writer};
use crate::codec::{Codec, Serializable, TypeKind};
use crate::ids::{Id, ShortId};
use crate::utxo::UtxoId;
use crate::{Error, Result};

/// Owner index that signs an input, plus the owner's address when known
#[derive(Debug, Clone, Copy, Eq)]
pub struct SigIndex {
    /// Index into the spent output's owner list
    pub index: u32,
    /// Address that must sign (not serialized)
    pub source: Option<ShortId>,
}

impl SigIndex {
    /// Index with a known signer
    pub fn new(index: u32, source: ShortId) -> Self {
        Self {
            index,
            source: Some(source),
        }
    }

    /// Index decoded from bytes, signer unknown
    pub fn bare(index: u32) -> Self {
        Self {
            index,
            source: None,
        }
    }
}

// Only the index is part of the wire form.
impl PartialEq for SigIndex {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

/// secp256k1 transfer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecpTransferInput {
    /// Amount consumed
    pub amount: u64,
    /// Signing owner indices, ascending
    pub sig_indices: Vec<SigIndex>,
}

impl SecpTransferInput {
    /// Create a transfer input
    pub fn new(amount: u64, sig_indices: Vec<SigIndex>) -> Self {
        Self {
            amount,
            sig_indices,
        }
    }
}

impl Serializable for SecpTransferInput {
    fn write_to(&self, _codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u64(self.amount);
        w.write_len(self.sig_indices.len())?;
        for sig in &self.sig_indices {
            w.write_u32(sig.index);
        }
        Ok(())
    }

    fn read_from(_codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let amount = r.read_u64()?;
        let len = r.read_len(4)?;
        let mut sig_indices = Vec::with_capacity(len);
        for _ in 0..len {
            sig_indices.push(SigIndex::bare(r.read_u32()?));
        }
        if sig_indices.windows(2).any(|w| w[0].index >= w[1].index) {
            return Err(Error::InvalidEncoding(
                "signature indices must be ascending and unique".to_string(),
            ));
        }
        Ok(Self {
            amount,
            sig_indices,
        })
    }
}

/// Transfer input spending a stakeable locked output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeableLockIn {
    /// Locktime of the spent output
    pub locktime: u64,
    /// Wrapped transfer input
    pub transfer: SecpTransferInput,
}

/// A typed input (type ID + body on the wire)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Transfer input
    SecpTransfer(SecpTransferInput),
    /// Stakeable lock input
    StakeableLock(StakeableLockIn),
}

impl Input {
    /// Registered kind
    pub fn kind(&self) -> TypeKind {
        match self {
            Input::SecpTransfer(_) => TypeKind::SecpTransferInput,
            Input::StakeableLock(_) => TypeKind::StakeableLockIn,
        }
    }

    fn transfer(&self) -> &SecpTransferInput {
        match self {
            Input::SecpTransfer(input) => input,
            Input::StakeableLock(input) => &input.transfer,
        }
    }

    fn transfer_mut(&mut self) -> &mut SecpTransferInput {
        match self {
            Input::SecpTransfer(input) => input,
            Input::StakeableLock(input) => &mut input.transfer,
        }
    }

    /// Amount consumed
    pub fn amount(&self) -> u64 {
        self.transfer().amount
    }

    /// Signing owner indices
    pub fn sig_indices(&self) -> &[SigIndex] {
        &self.transfer().sig_indices
    }

    /// Mutable signing owner indices
    pub fn sig_indices_mut(&mut self) -> &mut Vec<SigIndex> {
        &mut self.transfer_mut().sig_indices
    }
}

impl Serializable for Input {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        codec.write_type(w, self.kind())?;
        match self {
            Input::SecpTransfer(input) => input.write_to(codec, w),
            Input::StakeableLock(input) => {
                w.write_u64(input.locktime);
                codec.write_type(w, TypeKind::SecpTransferInput)?;
                input.transfer.write_to(codec, w)
            }
        }
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        match codec.read_type(r)? {
            TypeKind::SecpTransferInput => {
                Ok(Input::SecpTransfer(SecpTransferInput::read_from(codec, r)?))
            }
            TypeKind::StakeableLockIn => {
                let locktime = r.read_u64()?;
                codec.expect_type(r, TypeKind::SecpTransferInput)?;
                let transfer = SecpTransferInput::read_from(codec, r)?;
                Ok(Input::StakeableLock(StakeableLockIn { locktime, transfer }))
            }
            other => Err(Error::UnknownTypeId(format!("{:?} is not an input", other))),
        }
    }
}

/// Input spending a specific UTXO of a specific asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    /// Transaction that created the UTXO
    pub tx_id: Id,
    /// Output index within that transaction
    pub output_index: u32,
    /// Asset ID
    pub asset_id: Id,
    /// Typed input
    pub input: Input,
}

impl TransferableInput {
    /// Create a transferable input
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, input: Input) -> Self {
        Self {
            tx_id,
            output_index,
            asset_id,
            input,
        }
    }

    /// ID of the spent UTXO
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    /// Addresses that must sign, in signature order
    pub fn signers(&self) -> Result<Vec<ShortId>> {
        self.input
            .sig_indices()
            .iter()
            .map(|sig| {
                sig.source.ok_or_else(|| {
                    Error::Signing(format!(
                        "input {} index {} has no signer; attach signers from the UTXO set first",
                        self.utxo_id(),
                        sig.index
                    ))
                })
            })
            .collect()
    }
}

impl Serializable for TransferableInput {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_bytes(self.tx_id.as_bytes());
        w.write_u32(self.output_index);
        w.write_bytes(self.asset_id.as_bytes());
        self.input.write_to(codec, w)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let tx_id = Id(r.read_array()?);
        let output_index = r.read_u32()?;
        let asset_id = Id(r.read_array()?);
        let input = Input::read_from(codec, r)?;
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            input,
        })
    }
}

/// Sort inputs by (txID, output index), which matches bytewise order of
/// `txID || outputIndex (big-endian)`
pub fn sort_inputs(inputs: &mut [TransferableInput]) {
    inputs.sort_by(|a, b| (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index)));
}

/// Whether inputs are sorted and reference distinct UTXOs
pub fn inputs_sorted_and_unique(inputs: &[TransferableInput]) -> bool {
    inputs
        .windows(2)
        .all(|w| (w[0].tx_id, w[0].output_index) < (w[1].tx_id, w[1].output_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tx: u8, index: u32) -> TransferableInput {
        TransferableInput::new(
            Id([tx; 32]),
            index,
            Id([0xaa; 32]),
            Input::SecpTransfer(SecpTransferInput::new(
                10,
                vec![SigIndex::new(0, ShortId([1; 20]))],
            )),
        )
    }

    #[test]
    fn test_sig_index_equality_ignores_source() {
        assert_eq!(SigIndex::new(3, ShortId([1; 20])), SigIndex::bare(3));
        assert_ne!(SigIndex::bare(3), SigIndex::bare(4));
    }

    #[test]
    fn test_input_layout_and_roundtrip() {
        let inp = input(0x01, 2);
        let bytes = inp.to_bytes(Codec::Avm).unwrap();

        let mut expected = vec![0x01; 32];
        expected.extend_from_slice(&2u32.to_be_bytes());
        expected.extend_from_slice(&[0xaa; 32]);
        expected.extend_from_slice(&5u32.to_be_bytes());
        expected.extend_from_slice(&10u64.to_be_bytes());
        expected.extend_from_slice(&1u32.to_be_bytes());
        expected.extend_from_slice(&0u32.to_be_bytes());
        assert_eq!(bytes, expected);

        let (back, next) = TransferableInput::from_bytes(Codec::Avm, &bytes, 0).unwrap();
        assert_eq!(back, inp);
        assert_eq!(next, bytes.len());
        // Signer metadata does not survive the wire
        assert!(back.input.sig_indices()[0].source.is_none());
        assert!(matches!(back.signers(), Err(Error::Signing(_))));
    }

    #[test]
    fn test_stakeable_lock_in() {
        let inp = Input::StakeableLock(StakeableLockIn {
            locktime: 42,
            transfer: SecpTransferInput::new(7, vec![SigIndex::bare(0), SigIndex::bare(2)]),
        });
        let bytes = inp.to_bytes(Codec::Pvm).unwrap();
        assert_eq!(&bytes[..4], &21u32.to_be_bytes());
        let (back, _) = Input::from_bytes(Codec::Pvm, &bytes, 0).unwrap();
        assert_eq!(back, inp);
        assert_eq!(back.amount(), 7);
    }

    #[test]
    fn test_rejects_unsorted_sig_indices() {
        let inp = SecpTransferInput::new(1, vec![SigIndex::bare(2), SigIndex::bare(1)]);
        let bytes = inp.to_bytes(Codec::Avm).unwrap();
        assert!(SecpTransferInput::from_bytes(Codec::Avm, &bytes, 0).is_err());
    }

    #[test]
    fn test_sort_inputs() {
        let mut ins = vec![input(2, 0), input(1, 5), input(1, 1)];
        sort_inputs(&mut ins);
        let order: Vec<_> = ins.iter().map(|i| (i.tx_id.0[0], i.output_index)).collect();
        assert_eq!(order, vec![(1, 1), (1, 5), (2, 0)]);
        assert!(inputs_sorted_and_unique(&ins));

        ins.push(input(2, 0));
        sort_inputs(&mut ins);
        assert!(!inputs_sorted_and_unique(&ins));
    }

    #[test]
    fn test_output_index_sorts_big_endian() {
        // 256 > 1 numerically and in big-endian bytes
        let mut ins = vec![input(1, 256), input(1, 1)];
        sort_inputs(&mut ins);
        assert_eq!(ins[0].output_index, 1);
    }
}
