//! P-chain staking and subnet transactions

use super::base::{BaseTx, MIN_OUTPUT_LEN};
use crate::binary::{Reader, Writer};
use crate::codec::{read_vec, write_vec, Codec, Serializable, TypeKind};
use crate::ids::{NodeId, ShortId};
use crate::outputs::{sort_outputs, OutputOwners, TransferableOutput};
use crate::Result;

/// Validator being staked to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    /// Node ID
    pub node_id: NodeId,
    /// Unix start time
    pub start_time: u64,
    /// Unix end time
    pub end_time: u64,
    /// Stake weight
    pub weight: u64,
}

impl Serializable for Validator {
    fn write_to(&self, _codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_bytes(self.node_id.0.as_bytes());
        w.write_u64(self.start_time);
        w.write_u64(self.end_time);
        w.write_u64(self.weight);
        Ok(())
    }

    fn read_from(_codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            node_id: NodeId(ShortId(r.read_array()?)),
            start_time: r.read_u64()?,
            end_time: r.read_u64()?,
            weight: r.read_u64()?,
        })
    }
}

fn write_owner(codec: Codec, w: &mut Writer, owners: &OutputOwners) -> Result<()> {
    codec.write_type(w, TypeKind::SecpOwnerOutput)?;
    owners.write_to(codec, w)
}

fn read_owner(codec: Codec, r: &mut Reader<'_>) -> Result<OutputOwners> {
    codec.expect_type(r, TypeKind::SecpOwnerOutput)?;
    OutputOwners::read_from(codec, r)
}

/// Create a subnet controlled by `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubnetTx {
    /// Fee inputs and change
    pub base: BaseTx,
    /// Subnet control keys and threshold
    pub owner: OutputOwners,
}

impl Serializable for CreateSubnetTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        self.base.write_to(codec, w)?;
        write_owner(codec, w, &self.owner)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read_from(codec, r)?;
        let owner = read_owner(codec, r)?;
        Ok(Self { base, owner })
    }
}

/// Add a primary network validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddValidatorTx {
    /// Stake inputs, fee and change
    pub base: BaseTx,
    /// Validator period and weight
    pub validator: Validator,
    /// Outputs locked as stake, returned after `end_time`
    pub stake: Vec<TransferableOutput>,
    /// Where validation rewards go
    pub rewards_owner: OutputOwners,
    /// Delegation fee in shares of 1_000_000
    pub delegation_shares: u32,
}

impl AddValidatorTx {
    /// Canonical order for all collections
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        self.base.sort(codec)?;
        sort_outputs(codec, &mut self.stake)
    }
}

impl Serializable for AddValidatorTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        self.base.write_to(codec, w)?;
        self.validator.write_to(codec, w)?;
        write_vec(codec, w, &self.stake)?;
        write_owner(codec, w, &self.rewards_owner)?;
        w.write_u32(self.delegation_shares);
        Ok(())
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read_from(codec, r)?;
        let validator = Validator::read_from(codec, r)?;
        let stake = read_vec(codec, r, MIN_OUTPUT_LEN)?;
        let rewards_owner = read_owner(codec, r)?;
        let delegation_shares = r.read_u32()?;
        Ok(Self {
            base,
            validator,
            stake,
            rewards_owner,
            delegation_shares,
        })
    }
}

/// Delegate stake to a primary network validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDelegatorTx {
    /// Stake inputs, fee and change
    pub base: BaseTx,
    /// Validator delegated to, with the delegation period and weight
    pub validator: Validator,
    /// Outputs locked as stake
    pub stake: Vec<TransferableOutput>,
    /// Where delegation rewards go
    pub rewards_owner: OutputOwners,
}

impl AddDelegatorTx {
    /// Canonical order for all collections
    pub fn sort(&mut self, codec: Codec) -> Result<()> {
        self.base.sort(codec)?;
        sort_outputs(codec, &mut self.stake)
    }
}

impl Serializable for AddDelegatorTx {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        self.base.write_to(codec, w)?;
        self.validator.write_to(codec, w)?;
        write_vec(codec, w, &self.stake)?;
        write_owner(codec, w, &self.rewards_owner)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read_from(codec, r)?;
        let validator = Validator::read_from(codec, r)?;
        let stake = read_vec(codec, r, MIN_OUTPUT_LEN)?;
        let rewards_owner = read_owner(codec, r)?;
        Ok(Self {
            base,
            validator,
            stake,
            rewards_owner,
        })
    }
}
