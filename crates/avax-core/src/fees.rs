//! Fee lookup, fee splitting and the burn sanity check
//!
//! Fees are static per transaction type and always paid in the primary
//! asset. How a spend of some asset plus a fee turns into per-asset
//! requirements is a [`FeeSplitPolicy`].

use crate::codec::{Codec, TypeKind};
use crate::ids::Id;
use crate::selection::AssetRequirement;
use crate::Result;
use avax_params::FeeConfig;
use std::fmt;

/// Burn may not exceed this multiple of the configured fee unless it is also
/// covered by the output total
pub const GOOSE_EGG_FEE_MULTIPLIER: u64 = 10;

/// Static fee lookup per transaction kind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeCalculator {
    fees: FeeConfig,
}

impl FeeCalculator {
    /// Create calculator over a fee schedule
    pub fn new(fees: FeeConfig) -> Self {
        Self { fees }
    }

    /// Underlying schedule
    pub fn schedule(&self) -> &FeeConfig {
        &self.fees
    }

    /// Fee for a transaction of `kind` on `codec`'s chain
    pub fn fee_for(&self, codec: Codec, kind: TypeKind) -> u64 {
        let fee = match (codec, kind) {
            (Codec::Evm, _) => self.fees.evm_atomic_fee,
            (Codec::Pvm, TypeKind::CreateSubnetTx) => self.fees.create_subnet_fee,
            (Codec::Pvm, TypeKind::AddValidatorTx) => self.fees.add_validator_fee,
            (Codec::Pvm, TypeKind::AddDelegatorTx) => self.fees.add_delegator_fee,
            _ => self.fees.tx_fee,
        };
        tracing::debug!("Fee for {:?} on {}: {}", kind, codec, fee);
        fee
    }
}

/// Splits "move `amount` of an asset and pay `fee`" into per-asset needs
pub trait FeeSplitPolicy: fmt::Debug + Send + Sync {
    /// Per-asset requirements for the spend
    fn split(
        &self,
        asset_id: Id,
        amount: u64,
        fee_asset_id: Id,
        fee: u64,
    ) -> Result<Vec<AssetRequirement>>;
}

/// Merge amount and fee when the spent asset pays fees, otherwise require
/// the fee separately in the fee asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeparateFeeAsset;

impl FeeSplitPolicy for SeparateFeeAsset {
    fn split(
        &self,
        asset_id: Id,
        amount: u64,
        fee_asset_id: Id,
        fee: u64,
    ) -> Result<Vec<AssetRequirement>> {
        if asset_id == fee_asset_id {
            let req = AssetRequirement::new(asset_id, amount, fee);
            req.total()?;
            return Ok(vec![req]);
        }
        let mut reqs = vec![AssetRequirement::new(asset_id, amount, 0)];
        if fee > 0 {
            reqs.push(AssetRequirement::new(fee_asset_id, 0, fee));
        }
        Ok(reqs)
    }
}

/// Burn sanity check: `burned` must be at most
/// [`GOOSE_EGG_FEE_MULTIPLIER`] times `fee`, or at most the output total.
pub fn check_goose_egg(burned: u64, output_total: u64, fee: u64) -> bool {
    burned <= fee.saturating_mul(GOOSE_EGG_FEE_MULTIPLIER) || burned <= output_total
}
