//! The unsigned transaction sum type and its sanity checks

use super::atomic::{ExportTx, ImportTx};
use super::base::{BaseTx, MAX_MEMO_LEN};
use super::evm::{EvmExportTx, EvmImportTx};
use super::pvm::{AddDelegatorTx, AddValidatorTx, CreateSubnetTx};
use crate::address::EthAddress;
use crate::binary::{Reader, Writer};
use crate::cb58::sha256;
use crate::codec::{read_codec_version, Codec, Serializable, TypeKind, CODEC_VERSION};
use crate::fees::check_goose_egg;
use crate::ids::{Id, ShortId};
use crate::inputs::{inputs_sorted_and_unique, TransferableInput};
use crate::outputs::{outputs_sorted, Output, TransferableOutput};
use crate::utxo::UtxoSet;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Any unsigned transaction this crate builds or decodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    /// X-chain transfer
    AvmBase(BaseTx),
    /// X-chain import
    AvmImport(ImportTx),
    /// X-chain export
    AvmExport(ExportTx),
    /// P-chain import
    PvmImport(ImportTx),
    /// P-chain export
    PvmExport(ExportTx),
    /// P-chain subnet creation
    PvmCreateSubnet(CreateSubnetTx),
    /// P-chain validator
    PvmAddValidator(AddValidatorTx),
    /// P-chain delegator
    PvmAddDelegator(AddDelegatorTx),
    /// C-chain import
    EvmImport(EvmImportTx),
    /// C-chain export
    EvmExport(EvmExportTx),
}

/// Who produces the signatures of one credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSigners {
    /// UTXO owners, one signature each, in signature-index order
    Owners(Vec<ShortId>),
    /// EVM account debited by the input
    Account(EthAddress),
}

fn add_amount(totals: &mut BTreeMap<Id, u64>, asset_id: Id, amount: u64) -> Result<()> {
    let total = totals.entry(asset_id).or_insert(0);
    *total = total
        .checked_add(amount)
        .ok_or_else(|| Error::AmountOverflow(format!("total of {} overflows u64", asset_id)))?;
    Ok(())
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidTransaction(msg.into())
}

impl UnsignedTx {
    /// Chain family
    pub fn codec(&self) -> Codec {
        match self {
            UnsignedTx::AvmBase(_) | UnsignedTx::AvmImport(_) | UnsignedTx::AvmExport(_) => {
                Codec::Avm
            }
            UnsignedTx::PvmImport(_)
            | UnsignedTx::PvmExport(_)
            | UnsignedTx::PvmCreateSubnet(_)
            | UnsignedTx::PvmAddValidator(_)
            | UnsignedTx::PvmAddDelegator(_) => Codec::Pvm,
            UnsignedTx::EvmImport(_) | UnsignedTx::EvmExport(_) => Codec::Evm,
        }
    }

    /// Registered kind
    pub fn kind(&self) -> TypeKind {
        match self {
            UnsignedTx::AvmBase(_) => TypeKind::BaseTx,
            UnsignedTx::AvmImport(_) | UnsignedTx::PvmImport(_) | UnsignedTx::EvmImport(_) => {
                TypeKind::ImportTx
            }
            UnsignedTx::AvmExport(_) | UnsignedTx::PvmExport(_) | UnsignedTx::EvmExport(_) => {
                TypeKind::ExportTx
            }
            UnsignedTx::PvmCreateSubnet(_) => TypeKind::CreateSubnetTx,
            UnsignedTx::PvmAddValidator(_) => TypeKind::AddValidatorTx,
            UnsignedTx::PvmAddDelegator(_) => TypeKind::AddDelegatorTx,
        }
    }

    /// Shared base fields (absent on C-chain transactions)
    pub fn base(&self) -> Option<&BaseTx> {
        match self {
            UnsignedTx::AvmBase(tx) => Some(tx),
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => Some(&tx.base),
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => Some(&tx.base),
            UnsignedTx::PvmCreateSubnet(tx) => Some(&tx.base),
            UnsignedTx::PvmAddValidator(tx) => Some(&tx.base),
            UnsignedTx::PvmAddDelegator(tx) => Some(&tx.base),
            UnsignedTx::EvmImport(_) | UnsignedTx::EvmExport(_) => None,
        }
    }

    /// Network ID
    pub fn network_id(&self) -> u32 {
        match self {
            UnsignedTx::EvmImport(tx) => tx.network_id,
            UnsignedTx::EvmExport(tx) => tx.network_id,
            other => other.base().map(|b| b.network_id).unwrap_or_default(),
        }
    }

    /// Chain the transaction is issued on
    pub fn blockchain_id(&self) -> Id {
        match self {
            UnsignedTx::EvmImport(tx) => tx.blockchain_id,
            UnsignedTx::EvmExport(tx) => tx.blockchain_id,
            other => other.base().map(|b| b.blockchain_id).unwrap_or_default(),
        }
    }

    fn write_body(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        match self {
            UnsignedTx::AvmBase(tx) => tx.write_to(codec, w),
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => tx.write_to(codec, w),
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => tx.write_to(codec, w),
            UnsignedTx::PvmCreateSubnet(tx) => tx.write_to(codec, w),
            UnsignedTx::PvmAddValidator(tx) => tx.write_to(codec, w),
            UnsignedTx::PvmAddDelegator(tx) => tx.write_to(codec, w),
            UnsignedTx::EvmImport(tx) => tx.write_to(codec, w),
            UnsignedTx::EvmExport(tx) => tx.write_to(codec, w),
        }
    }

    /// Write codec version, type ID and body
    pub fn write_to(&self, w: &mut Writer) -> Result<()> {
        let codec = self.codec();
        w.write_u16(CODEC_VERSION);
        codec.write_type(w, self.kind())?;
        self.write_body(codec, w)
    }

    /// Read codec version, type ID and body
    pub fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        read_codec_version(r)?;
        let kind = codec.read_type(r)?;
        let tx = match (codec, kind) {
            (Codec::Avm, TypeKind::BaseTx) => UnsignedTx::AvmBase(BaseTx::read_from(codec, r)?),
            (Codec::Avm, TypeKind::ImportTx) => {
                UnsignedTx::AvmImport(ImportTx::read_from(codec, r)?)
            }
            (Codec::Avm, TypeKind::ExportTx) => {
                UnsignedTx::AvmExport(ExportTx::read_from(codec, r)?)
            }
            (Codec::Pvm, TypeKind::ImportTx) => {
                UnsignedTx::PvmImport(ImportTx::read_from(codec, r)?)
            }
            (Codec::Pvm, TypeKind::ExportTx) => {
                UnsignedTx::PvmExport(ExportTx::read_from(codec, r)?)
            }
            (Codec::Pvm, TypeKind::CreateSubnetTx) => {
                UnsignedTx::PvmCreateSubnet(CreateSubnetTx::read_from(codec, r)?)
            }
            (Codec::Pvm, TypeKind::AddValidatorTx) => {
                UnsignedTx::PvmAddValidator(AddValidatorTx::read_from(codec, r)?)
            }
            (Codec::Pvm, TypeKind::AddDelegatorTx) => {
                UnsignedTx::PvmAddDelegator(AddDelegatorTx::read_from(codec, r)?)
            }
            (Codec::Evm, TypeKind::ImportTx) => {
                UnsignedTx::EvmImport(EvmImportTx::read_from(codec, r)?)
            }
            (Codec::Evm, TypeKind::ExportTx) => {
                UnsignedTx::EvmExport(EvmExportTx::read_from(codec, r)?)
            }
            (codec, kind) => {
                return Err(Error::UnknownTypeId(format!(
                    "{:?} is not a transaction on {}",
                    kind, codec
                )))
            }
        };
        Ok(tx)
    }

    /// Canonical unsigned bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write_to(&mut w)?;
        Ok(w.into_bytes())
    }

    /// Decode at `offset`, returning the transaction and the next offset
    pub fn from_bytes(codec: Codec, bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::at(bytes, offset)?;
        let tx = Self::read_from(codec, &mut r)?;
        Ok((tx, r.offset()))
    }

    /// Digest every signature commits to: sha256 of the unsigned bytes
    pub fn signing_hash(&self) -> Result<[u8; 32]> {
        Ok(sha256(&self.to_bytes()?))
    }

    /// Put every collection into canonical order
    pub fn sort(&mut self) -> Result<()> {
        let codec = self.codec();
        match self {
            UnsignedTx::AvmBase(tx) => tx.sort(codec),
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => tx.sort(codec),
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => tx.sort(codec),
            UnsignedTx::PvmCreateSubnet(tx) => tx.base.sort(codec),
            UnsignedTx::PvmAddValidator(tx) => tx.sort(codec),
            UnsignedTx::PvmAddDelegator(tx) => tx.sort(codec),
            UnsignedTx::EvmImport(tx) => {
                tx.sort();
                Ok(())
            }
            UnsignedTx::EvmExport(tx) => tx.sort(codec),
        }
    }

    /// UTXO-spending inputs in credential order: local inputs, then imported
    pub fn utxo_inputs(&self) -> Vec<&TransferableInput> {
        match self {
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => tx
                .base
                .inputs
                .iter()
                .chain(tx.imported_inputs.iter())
                .collect(),
            UnsignedTx::EvmImport(tx) => tx.imported_inputs.iter().collect(),
            UnsignedTx::EvmExport(_) => Vec::new(),
            other => other
                .base()
                .map(|b| b.inputs.iter().collect())
                .unwrap_or_default(),
        }
    }

    fn utxo_inputs_mut(&mut self) -> Vec<&mut TransferableInput> {
        match self {
            UnsignedTx::AvmBase(tx) => tx.inputs.iter_mut().collect(),
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => tx
                .base
                .inputs
                .iter_mut()
                .chain(tx.imported_inputs.iter_mut())
                .collect(),
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => {
                tx.base.inputs.iter_mut().collect()
            }
            UnsignedTx::PvmCreateSubnet(tx) => tx.base.inputs.iter_mut().collect(),
            UnsignedTx::PvmAddValidator(tx) => tx.base.inputs.iter_mut().collect(),
            UnsignedTx::PvmAddDelegator(tx) => tx.base.inputs.iter_mut().collect(),
            UnsignedTx::EvmImport(tx) => tx.imported_inputs.iter_mut().collect(),
            UnsignedTx::EvmExport(_) => Vec::new(),
        }
    }

    /// Signers of each credential, aligned with credential position
    pub fn credential_signers(&self) -> Result<Vec<CredentialSigners>> {
        if let UnsignedTx::EvmExport(tx) = self {
            return Ok(tx
                .inputs
                .iter()
                .map(|input| CredentialSigners::Account(input.address))
                .collect());
        }
        self.utxo_inputs()
            .into_iter()
            .map(|input| Ok(CredentialSigners::Owners(input.signers()?)))
            .collect()
    }

    /// Restore signer addresses on inputs decoded from bytes, using the
    /// owners of the spent UTXOs in `utxos`
    pub fn attach_signers(&mut self, utxos: &UtxoSet) -> Result<()> {
        for input in self.utxo_inputs_mut() {
            let utxo_id = input.utxo_id();
            let utxo = utxos
                .get(&utxo_id)
                .ok_or_else(|| invalid(format!("spent UTXO {} is not in the set", utxo_id)))?;
            let owners = utxo.output.owners().clone();
            for sig in input.input.sig_indices_mut() {
                let address = owners.address_at(sig.index).ok_or_else(|| {
                    invalid(format!(
                        "signature index {} out of range for UTXO {}",
                        sig.index, utxo_id
                    ))
                })?;
                sig.source = Some(address);
            }
        }
        Ok(())
    }

    /// Value consumed per asset
    pub fn consumed(&self) -> Result<BTreeMap<Id, u64>> {
        let mut totals = BTreeMap::new();
        for input in self.utxo_inputs() {
            add_amount(&mut totals, input.asset_id, input.input.amount())?;
        }
        if let UnsignedTx::EvmExport(tx) = self {
            for input in &tx.inputs {
                add_amount(&mut totals, input.asset_id, input.amount)?;
            }
        }
        Ok(totals)
    }

    fn produced_outputs(&self) -> Vec<&TransferableOutput> {
        let mut outs: Vec<&TransferableOutput> = self
            .base()
            .map(|b| b.outputs.iter().collect())
            .unwrap_or_default();
        match self {
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => {
                outs.extend(tx.exported_outputs.iter())
            }
            UnsignedTx::PvmAddValidator(tx) => outs.extend(tx.stake.iter()),
            UnsignedTx::PvmAddDelegator(tx) => outs.extend(tx.stake.iter()),
            UnsignedTx::EvmExport(tx) => outs.extend(tx.exported_outputs.iter()),
            _ => {}
        }
        outs
    }

    /// Value produced per asset (outputs, exports and stake)
    pub fn produced(&self) -> Result<BTreeMap<Id, u64>> {
        let mut totals = BTreeMap::new();
        for out in self.produced_outputs() {
            add_amount(&mut totals, out.asset_id, out.output.amount())?;
        }
        if let UnsignedTx::EvmImport(tx) = self {
            for out in &tx.outputs {
                add_amount(&mut totals, out.asset_id, out.amount)?;
            }
        }
        Ok(totals)
    }

    /// Consumed minus produced for `asset_id`
    pub fn burned(&self, asset_id: &Id) -> Result<u64> {
        let consumed = self.consumed()?.get(asset_id).copied().unwrap_or(0);
        let produced = self.produced()?.get(asset_id).copied().unwrap_or(0);
        consumed.checked_sub(produced).ok_or_else(|| {
            invalid(format!(
                "asset {} produces {} but consumes only {}",
                asset_id, produced, consumed
            ))
        })
    }

    /// Sanity checks run before a built transaction is handed out.
    ///
    /// Collections must be canonical, value must be conserved per asset,
    /// `fee` of `fee_asset_id` must be burned, and the burn must pass
    /// [`check_goose_egg`].
    pub fn validate(&self, fee_asset_id: &Id, fee: u64) -> Result<()> {
        let codec = self.codec();

        if let Some(base) = self.base() {
            if base.memo.len() > MAX_MEMO_LEN {
                return Err(invalid(format!(
                    "memo is {} bytes, limit {}",
                    base.memo.len(),
                    MAX_MEMO_LEN
                )));
            }
            if !inputs_sorted_and_unique(&base.inputs) {
                return Err(invalid("inputs are not sorted and unique"));
            }
            if !outputs_sorted(codec, &base.outputs)? {
                return Err(invalid("outputs are not sorted"));
            }
        }

        match self {
            UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => {
                if !inputs_sorted_and_unique(&tx.imported_inputs) {
                    return Err(invalid("imported inputs are not sorted and unique"));
                }
            }
            UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => {
                if !outputs_sorted(codec, &tx.exported_outputs)? {
                    return Err(invalid("exported outputs are not sorted"));
                }
            }
            UnsignedTx::PvmAddValidator(tx) => {
                if !outputs_sorted(codec, &tx.stake)? {
                    return Err(invalid("stake outputs are not sorted"));
                }
            }
            UnsignedTx::PvmAddDelegator(tx) => {
                if !outputs_sorted(codec, &tx.stake)? {
                    return Err(invalid("stake outputs are not sorted"));
                }
            }
            UnsignedTx::EvmImport(tx) => {
                if !inputs_sorted_and_unique(&tx.imported_inputs) {
                    return Err(invalid("imported inputs are not sorted and unique"));
                }
                if tx
                    .outputs
                    .windows(2)
                    .any(|w| (w[0].address, w[0].asset_id) >= (w[1].address, w[1].asset_id))
                {
                    return Err(invalid("EVM outputs are not sorted and unique"));
                }
            }
            UnsignedTx::EvmExport(tx) => {
                if tx
                    .inputs
                    .windows(2)
                    .any(|w| (w[0].address, w[0].asset_id) >= (w[1].address, w[1].asset_id))
                {
                    return Err(invalid("EVM inputs are not sorted and unique"));
                }
                if !outputs_sorted(codec, &tx.exported_outputs)? {
                    return Err(invalid("exported outputs are not sorted"));
                }
            }
            _ => {}
        }

        for out in self.produced_outputs() {
            if matches!(out.output, Output::SecpTransfer(_) | Output::StakeableLock(_))
                && out.output.amount() == 0
            {
                return Err(invalid(format!("zero-value output of asset {}", out.asset_id)));
            }
        }

        let consumed = self.consumed()?;
        let produced = self.produced()?;
        for (asset_id, out_total) in &produced {
            let in_total = consumed.get(asset_id).copied().unwrap_or(0);
            if in_total < *out_total {
                return Err(invalid(format!(
                    "asset {} produces {} but consumes only {}",
                    asset_id, out_total, in_total
                )));
            }
        }

        let burned = self.burned(fee_asset_id)?;
        if burned < fee {
            return Err(invalid(format!("burns {} but the fee is {}", burned, fee)));
        }
        let fee_asset_out = produced.get(fee_asset_id).copied().unwrap_or(0);
        if !check_goose_egg(burned, fee_asset_out, fee) {
            return Err(invalid(format!(
                "burns {} of the fee asset against a fee of {} and outputs of {}",
                burned, fee, fee_asset_out
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::{EvmInput, EvmOutput};
    use crate::ids::NodeId;
    use crate::inputs::{Input, SecpTransferInput, SigIndex};
    use crate::outputs::OutputOwners;
    use crate::tx::Validator;

    const AVAX: Id = Id([0xaa; 32]);
    const TOKEN: Id = Id([0xbb; 32]);
    const CHAIN: Id = Id([2; 32]);
    const OTHER_CHAIN: Id = Id([3; 32]);
    const ME: ShortId = ShortId([1; 20]);
    const ACCOUNT: EthAddress = EthAddress([0x42; 20]);

    fn input(tx: u8, asset_id: Id, amount: u64) -> TransferableInput {
        TransferableInput::new(
            Id([tx; 32]),
            0,
            asset_id,
            Input::SecpTransfer(SecpTransferInput::new(amount, vec![SigIndex::bare(0)])),
        )
    }

    fn output(asset_id: Id, amount: u64) -> TransferableOutput {
        TransferableOutput::new(asset_id, Output::transfer(amount, OutputOwners::single(ME)))
    }

    fn base(outputs: Vec<TransferableOutput>, inputs: Vec<TransferableInput>) -> BaseTx {
        BaseTx::new(12345, CHAIN, outputs, inputs, b"memo".to_vec())
    }

    fn validator() -> Validator {
        Validator {
            node_id: NodeId(ShortId([7; 20])),
            start_time: 1_000,
            end_time: 2_000,
            weight: 5,
        }
    }

    /// One well-formed transaction per variant, each burning 1 AVAX unit
    fn every_variant() -> Vec<UnsignedTx> {
        let import = || ImportTx {
            base: base(vec![output(AVAX, 9)], Vec::new()),
            source_chain: OTHER_CHAIN,
            imported_inputs: vec![input(1, AVAX, 10)],
        };
        let export = || ExportTx {
            base: base(vec![output(AVAX, 4)], vec![input(1, AVAX, 10)]),
            destination_chain: OTHER_CHAIN,
            exported_outputs: vec![output(AVAX, 5)],
        };
        vec![
            UnsignedTx::AvmBase(base(vec![output(AVAX, 9)], vec![input(1, AVAX, 10)])),
            UnsignedTx::AvmImport(import()),
            UnsignedTx::AvmExport(export()),
            UnsignedTx::PvmImport(import()),
            UnsignedTx::PvmExport(export()),
            UnsignedTx::PvmCreateSubnet(CreateSubnetTx {
                base: base(vec![output(AVAX, 9)], vec![input(1, AVAX, 10)]),
                owner: OutputOwners::single(ME),
            }),
            UnsignedTx::PvmAddValidator(AddValidatorTx {
                base: base(vec![output(AVAX, 4)], vec![input(1, AVAX, 10)]),
                validator: validator(),
                stake: vec![output(AVAX, 5)],
                rewards_owner: OutputOwners::single(ME),
                delegation_shares: 20_000,
            }),
            UnsignedTx::PvmAddDelegator(AddDelegatorTx {
                base: base(vec![output(AVAX, 4)], vec![input(1, AVAX, 10)]),
                validator: validator(),
                stake: vec![output(AVAX, 5)],
                rewards_owner: OutputOwners::single(ME),
            }),
            UnsignedTx::EvmImport(EvmImportTx {
                network_id: 12345,
                blockchain_id: CHAIN,
                source_chain: OTHER_CHAIN,
                imported_inputs: vec![input(1, AVAX, 10)],
                outputs: vec![EvmOutput {
                    address: ACCOUNT,
                    amount: 9,
                    asset_id: AVAX,
                }],
            }),
            UnsignedTx::EvmExport(EvmExportTx {
                network_id: 12345,
                blockchain_id: CHAIN,
                destination_chain: OTHER_CHAIN,
                inputs: vec![EvmInput {
                    address: ACCOUNT,
                    amount: 10,
                    asset_id: AVAX,
                    nonce: 0,
                }],
                exported_outputs: vec![output(AVAX, 9)],
            }),
        ]
    }

    fn rejection(tx: &UnsignedTx) -> String {
        match tx.validate(&AVAX, 1) {
            Err(Error::InvalidTransaction(msg)) => msg,
            other => panic!("expected InvalidTransaction, got {:?}", other),
        }
    }

    #[test]
    fn test_every_variant_decodes_back() {
        let txs = every_variant();
        assert_eq!(txs.len(), 10);
        for tx in txs {
            let bytes = tx.to_bytes().unwrap();
            let (decoded, end) = UnsignedTx::from_bytes(tx.codec(), &bytes, 0).unwrap();
            assert_eq!(decoded, tx, "{:?} on {}", tx.kind(), tx.codec());
            assert_eq!(end, bytes.len());
            assert_eq!(decoded.to_bytes().unwrap(), bytes);
            assert_eq!(decoded.network_id(), 12345);
            assert_eq!(decoded.blockchain_id(), CHAIN);
        }
    }

    #[test]
    fn test_decode_at_offset() {
        let tx = every_variant().remove(6);
        let mut bytes = vec![0xff; 3];
        bytes.extend(tx.to_bytes().unwrap());
        bytes.push(0xee);

        let (decoded, end) = UnsignedTx::from_bytes(Codec::Pvm, &bytes, 3).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(end, bytes.len() - 1);
    }

    #[test]
    fn test_decode_rejects_foreign_codec() {
        let tx = every_variant().remove(0);
        let bytes = tx.to_bytes().unwrap();
        assert!(matches!(
            UnsignedTx::from_bytes(Codec::Pvm, &bytes, 0),
            Err(Error::UnknownTypeId(_))
        ));
    }

    #[test]
    fn test_every_variant_validates() {
        for tx in every_variant() {
            tx.validate(&AVAX, 1).unwrap();
            assert_eq!(tx.burned(&AVAX).unwrap(), 1);
        }
    }

    #[test]
    fn test_memo_limit() {
        let mut tx = base(vec![output(AVAX, 9)], vec![input(1, AVAX, 10)]);
        tx.memo = vec![0; MAX_MEMO_LEN];
        UnsignedTx::AvmBase(tx.clone()).validate(&AVAX, 1).unwrap();

        tx.memo.push(0);
        assert_eq!(rejection(&UnsignedTx::AvmBase(tx)), "memo is 257 bytes, limit 256");
    }

    #[test]
    fn test_unsorted_or_duplicate_inputs() {
        let unsorted = base(
            vec![output(AVAX, 19)],
            vec![input(2, AVAX, 10), input(1, AVAX, 10)],
        );
        assert_eq!(
            rejection(&UnsignedTx::AvmBase(unsorted)),
            "inputs are not sorted and unique"
        );

        let duplicate = base(
            vec![output(AVAX, 19)],
            vec![input(1, AVAX, 10), input(1, AVAX, 10)],
        );
        assert_eq!(
            rejection(&UnsignedTx::AvmBase(duplicate)),
            "inputs are not sorted and unique"
        );

        let mut import = every_variant().remove(3);
        if let UnsignedTx::PvmImport(tx) = &mut import {
            tx.imported_inputs = vec![input(4, AVAX, 5), input(3, AVAX, 5)];
        }
        assert_eq!(rejection(&import), "imported inputs are not sorted and unique");
    }

    #[test]
    fn test_unsorted_evm_outputs() {
        let mut tx = every_variant().remove(8);
        if let UnsignedTx::EvmImport(import) = &mut tx {
            import.outputs = vec![
                EvmOutput {
                    address: EthAddress([0x50; 20]),
                    amount: 4,
                    asset_id: AVAX,
                },
                EvmOutput {
                    address: ACCOUNT,
                    amount: 5,
                    asset_id: AVAX,
                },
            ];
        }
        assert_eq!(rejection(&tx), "EVM outputs are not sorted and unique");
    }

    #[test]
    fn test_zero_value_output() {
        let tx = UnsignedTx::AvmExport(ExportTx {
            base: base(vec![output(AVAX, 9)], vec![input(1, AVAX, 10)]),
            destination_chain: OTHER_CHAIN,
            exported_outputs: vec![output(TOKEN, 0)],
        });
        assert_eq!(rejection(&tx), format!("zero-value output of asset {}", TOKEN));
    }

    #[test]
    fn test_value_conservation() {
        let minted = UnsignedTx::AvmBase(base(vec![output(AVAX, 11)], vec![input(1, AVAX, 10)]));
        assert_eq!(
            rejection(&minted),
            format!("asset {} produces 11 but consumes only 10", AVAX)
        );

        let mut from_nothing = UnsignedTx::AvmBase(base(
            vec![output(AVAX, 9), output(TOKEN, 1)],
            vec![input(1, AVAX, 10)],
        ));
        from_nothing.sort().unwrap();
        assert_eq!(
            rejection(&from_nothing),
            format!("asset {} produces 1 but consumes only 0", TOKEN)
        );

        let no_fee = UnsignedTx::AvmBase(base(vec![output(AVAX, 10)], vec![input(1, AVAX, 10)]));
        assert_eq!(rejection(&no_fee), "burns 0 but the fee is 1");

        let mut stake = every_variant().remove(6);
        if let UnsignedTx::PvmAddValidator(tx) = &mut stake {
            tx.stake = vec![output(AVAX, 6)];
        }
        assert_eq!(rejection(&stake), "burns 0 but the fee is 1");
    }

    #[test]
    fn test_goose_egg_burn() {
        let tx = UnsignedTx::AvmBase(base(vec![output(AVAX, 1)], vec![input(1, AVAX, 1_000)]));
        assert!(tx.validate(&AVAX, 1).is_err());
        tx.validate(&AVAX, 999).unwrap();
    }
}
