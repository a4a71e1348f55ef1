//! Transaction outputs
//!
//! Every output kind wraps an [`OutputOwners`] set. Owner addresses are kept
//! sorted ascending, which is how the node expects them on the wire.

use crate::binary::{Reader, Writer};
use crate::codec::{Codec, Serializable, TypeKind};
use crate::ids::{Id, ShortId, SHORT_ID_LEN};
use crate::{Error, Result};

/// Owners of an output: who may spend it, how many must sign, and from when
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputOwners {
    /// Earliest unix time the output may be spent
    pub locktime: u64,
    /// Number of owner signatures required
    pub threshold: u32,
    addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// Create an owner set. Addresses are sorted and deduplicated.
    pub fn new(addresses: Vec<ShortId>, locktime: u64, threshold: u32) -> Result<Self> {
        let mut addresses = addresses;
        addresses.sort();
        addresses.dedup();
        let owners = Self {
            locktime,
            threshold,
            addresses,
        };
        owners.validate()?;
        Ok(owners)
    }

    /// Single owner, threshold 1, no locktime
    pub fn single(address: ShortId) -> Self {
        Self {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    fn validate(&self) -> Result<()> {
        if self.threshold as usize > self.addresses.len() {
            return Err(Error::InvalidOwners(format!(
                "threshold {} exceeds {} addresses",
                self.threshold,
                self.addresses.len()
            )));
        }
        if self.threshold == 0 && !self.addresses.is_empty() {
            return Err(Error::InvalidOwners(
                "threshold must be positive when addresses are present".to_string(),
            ));
        }
        if self.addresses.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidOwners(
                "addresses must be sorted and unique".to_string(),
            ));
        }
        Ok(())
    }

    /// Sorted owner addresses
    pub fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }

    /// Position of `address` in the owner list
    pub fn address_index(&self, address: &ShortId) -> Option<u32> {
        self.addresses
            .binary_search(address)
            .ok()
            .map(|i| i as u32)
    }

    /// Owner address at `index`
    pub fn address_at(&self, index: u32) -> Option<ShortId> {
        self.addresses.get(index as usize).copied()
    }

    /// Whether any of `addresses` is an owner
    pub fn contains_any(&self, addresses: &[ShortId]) -> bool {
        addresses.iter().any(|a| self.address_index(a).is_some())
    }

    /// Pick the owners that will sign when spending with keys for `from`.
    ///
    /// Returns `(owner index, address)` pairs in ascending index order, or
    /// `None` if the output is still locked at `as_of` or `from` cannot meet
    /// the threshold.
    pub fn spenders(&self, from: &[ShortId], as_of: u64) -> Option<Vec<(u32, ShortId)>> {
        if self.locktime > as_of {
            return None;
        }
        let needed = self.threshold as usize;
        let picked: Vec<(u32, ShortId)> = self
            .addresses
            .iter()
            .enumerate()
            .filter(|(_, a)| from.contains(a))
            .take(needed)
            .map(|(i, a)| (i as u32, *a))
            .collect();
        (picked.len() == needed).then_some(picked)
    }
}

impl Serializable for OutputOwners {
    fn write_to(&self, _codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u64(self.locktime);
        w.write_u32(self.threshold);
        w.write_len(self.addresses.len())?;
        for addr in &self.addresses {
            w.write_bytes(addr.as_bytes());
        }
        Ok(())
    }

    fn read_from(_codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let locktime = r.read_u64()?;
        let threshold = r.read_u32()?;
        let len = r.read_len(SHORT_ID_LEN)?;
        let mut addresses = Vec::with_capacity(len);
        for _ in 0..len {
            addresses.push(ShortId(r.read_array()?));
        }
        let owners = Self {
            locktime,
            threshold,
            addresses,
        };
        owners.validate()?;
        Ok(owners)
    }
}

/// secp256k1 transfer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecpTransferOutput {
    /// Amount in the asset's smallest unit
    pub amount: u64,
    /// Owners
    pub owners: OutputOwners,
}

impl SecpTransferOutput {
    /// Create a transfer output
    pub fn new(amount: u64, owners: OutputOwners) -> Self {
        Self { amount, owners }
    }
}

impl Serializable for SecpTransferOutput {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u64(self.amount);
        self.owners.write_to(codec, w)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let amount = r.read_u64()?;
        let owners = OutputOwners::read_from(codec, r)?;
        Ok(Self { amount, owners })
    }
}

/// secp256k1 mint output (mint rights, carries no value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecpMintOutput {
    /// Owners
    pub owners: OutputOwners,
}

/// secp256k1 owner output (P-chain rewards and subnet control keys)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecpOwnerOutput {
    /// Owners
    pub owners: OutputOwners,
}

/// Transfer output locked for spending until `locktime` but usable for staking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeableLockOut {
    /// Unix time after which the funds are spendable
    pub locktime: u64,
    /// Wrapped transfer output
    pub transfer: SecpTransferOutput,
}

/// A typed output (type ID + body on the wire)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Transfer output
    SecpTransfer(SecpTransferOutput),
    /// Mint output
    SecpMint(SecpMintOutput),
    /// Owner output
    SecpOwner(SecpOwnerOutput),
    /// Stakeable lock output
    StakeableLock(StakeableLockOut),
}

impl Output {
    /// Plain transfer output of `amount` to `owners`
    pub fn transfer(amount: u64, owners: OutputOwners) -> Self {
        Output::SecpTransfer(SecpTransferOutput::new(amount, owners))
    }

    /// Registered kind
    pub fn kind(&self) -> TypeKind {
        match self {
            Output::SecpTransfer(_) => TypeKind::SecpTransferOutput,
            Output::SecpMint(_) => TypeKind::SecpMintOutput,
            Output::SecpOwner(_) => TypeKind::SecpOwnerOutput,
            Output::StakeableLock(_) => TypeKind::StakeableLockOut,
        }
    }

    /// Value carried (zero for mint and owner outputs)
    pub fn amount(&self) -> u64 {
        match self {
            Output::SecpTransfer(out) => out.amount,
            Output::StakeableLock(out) => out.transfer.amount,
            Output::SecpMint(_) | Output::SecpOwner(_) => 0,
        }
    }

    /// Owner set
    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer(out) => &out.owners,
            Output::SecpMint(out) => &out.owners,
            Output::SecpOwner(out) => &out.owners,
            Output::StakeableLock(out) => &out.transfer.owners,
        }
    }

    /// Stakeable locktime, zero for non-stakeable outputs
    pub fn stake_locktime(&self) -> u64 {
        match self {
            Output::StakeableLock(out) => out.locktime,
            _ => 0,
        }
    }

    /// Whether the output carries value that can be moved by a transfer input
    pub fn is_transferable(&self) -> bool {
        matches!(self, Output::SecpTransfer(_) | Output::StakeableLock(_))
    }
}

impl Serializable for Output {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        codec.write_type(w, self.kind())?;
        match self {
            Output::SecpTransfer(out) => out.write_to(codec, w),
            Output::SecpMint(out) => out.owners.write_to(codec, w),
            Output::SecpOwner(out) => out.owners.write_to(codec, w),
            Output::StakeableLock(out) => {
                w.write_u64(out.locktime);
                codec.write_type(w, TypeKind::SecpTransferOutput)?;
                out.transfer.write_to(codec, w)
            }
        }
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        match codec.read_type(r)? {
            TypeKind::SecpTransferOutput => {
                Ok(Output::SecpTransfer(SecpTransferOutput::read_from(codec, r)?))
            }
            TypeKind::SecpMintOutput => Ok(Output::SecpMint(SecpMintOutput {
                owners: OutputOwners::read_from(codec, r)?,
            })),
            TypeKind::SecpOwnerOutput => Ok(Output::SecpOwner(SecpOwnerOutput {
                owners: OutputOwners::read_from(codec, r)?,
            })),
            TypeKind::StakeableLockOut => {
                let locktime = r.read_u64()?;
                codec.expect_type(r, TypeKind::SecpTransferOutput)?;
                let transfer = SecpTransferOutput::read_from(codec, r)?;
                Ok(Output::StakeableLock(StakeableLockOut { locktime, transfer }))
            }
            other => Err(Error::UnknownTypeId(format!("{:?} is not an output", other))),
        }
    }
}

/// Output tagged with the asset it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    /// Asset ID
    pub asset_id: Id,
    /// Typed output
    pub output: Output,
}

impl TransferableOutput {
    /// Create a transferable output
    pub fn new(asset_id: Id, output: Output) -> Self {
        Self { asset_id, output }
    }

    /// Canonical sort key: asset ID, type ID and output bytes
    pub fn sort_key(&self, codec: Codec) -> Result<Vec<u8>> {
        self.to_bytes(codec)
    }
}

impl Serializable for TransferableOutput {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_bytes(self.asset_id.as_bytes());
        self.output.write_to(codec, w)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let asset_id = Id(r.read_array()?);
        let output = Output::read_from(codec, r)?;
        Ok(Self { asset_id, output })
    }
}

/// Sort outputs into canonical order
pub fn sort_outputs(codec: Codec, outputs: &mut Vec<TransferableOutput>) -> Result<()> {
    let mut keyed = outputs
        .drain(..)
        .map(|out| -> Result<(Vec<u8>, TransferableOutput)> { Ok((out.sort_key(codec)?, out)) })
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    outputs.extend(keyed.into_iter().map(|(_, out)| out));
    Ok(())
}

/// Whether `outputs` are in canonical order
pub fn outputs_sorted(codec: Codec, outputs: &[TransferableOutput]) -> Result<bool> {
    let keys = outputs
        .iter()
        .map(|out| out.sort_key(codec))
        .collect::<Result<Vec<_>>>()?;
    Ok(keys.windows(2).all(|w| w[0] <= w[1]))
}
