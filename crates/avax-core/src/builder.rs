//! Unsigned transaction builder for the X-, P- and C-chain
//!
//! Every build follows the same pipeline: resolve identifiers, split the
//! spend and fee into per-asset requirements, select UTXOs, assemble
//! destination, change and stake outputs, sort, then sanity-validate.
//! Builders never touch the network and never mutate the UTXO set.

use crate::address::{resolve_addresses, AddressInput, EthAddress};
use crate::codec::{Codec, TypeKind};
use crate::context::ChainContext;
use crate::evm::{EvmInput, EvmOutput};
use crate::fees::{FeeCalculator, FeeSplitPolicy, SeparateFeeAsset};
use crate::ids::{resolve_asset_id, resolve_chain_id, Id, IdInput, NodeId, ShortId};
use crate::inputs::TransferableInput;
use crate::outputs::{Output, OutputOwners, TransferableOutput};
use crate::selection::{spend_all, AssetRequirement, SelectionStrategy, UtxoSelector};
use crate::tx::{
    AddDelegatorTx, AddValidatorTx, BaseTx, CreateSubnetTx, EvmExportTx, EvmImportTx, ExportTx,
    ImportTx, UnsignedTx, Validator,
};
use crate::utxo::UtxoSet;
use crate::{Error, Result};
use avax_params::{ChainAlias, PERCENT_DENOMINATOR};
use std::collections::BTreeMap;

/// Who pays, where change goes, and how new outputs are locked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendOptions {
    /// Addresses whose UTXOs may be spent
    pub from: Vec<ShortId>,
    /// Change owners (defaults to `from` when empty)
    pub change: Vec<ShortId>,
    /// Current time, used for locktime checks
    pub as_of: u64,
    /// Memo bytes
    pub memo: Vec<u8>,
    /// Locktime of destination outputs
    pub locktime: u64,
    /// Threshold of destination outputs
    pub threshold: u32,
}

impl Default for SpendOptions {
    fn default() -> Self {
        Self {
            from: Vec::new(),
            change: Vec::new(),
            as_of: 0,
            memo: Vec::new(),
            locktime: 0,
            threshold: 1,
        }
    }
}

impl SpendOptions {
    /// Spend from `from`, change back to `from`
    pub fn new(from: Vec<ShortId>) -> Self {
        Self {
            from,
            ..Self::default()
        }
    }

    /// Set change owners
    pub fn with_change(mut self, change: Vec<ShortId>) -> Self {
        self.change = change;
        self
    }

    /// Set the time locktimes are checked against
    pub fn as_of(mut self, as_of: u64) -> Self {
        self.as_of = as_of;
        self
    }

    /// Set the memo
    pub fn with_memo(mut self, memo: impl Into<Vec<u8>>) -> Self {
        self.memo = memo.into();
        self
    }

    fn change_owners(&self) -> Result<OutputOwners> {
        let change = if self.change.is_empty() {
            self.from.clone()
        } else {
            self.change.clone()
        };
        OutputOwners::new(change, 0, 1)
    }

    fn destination_owners(&self, to: Vec<ShortId>) -> Result<OutputOwners> {
        if to.is_empty() {
            return Err(Error::InvalidAddress("no destination addresses".to_string()));
        }
        OutputOwners::new(to, self.locktime, self.threshold)
    }
}

/// Validator or delegator being added on the P-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeRequest {
    /// Node to validate with or delegate to
    pub node_id: NodeId,
    /// Unix start time, after `as_of`
    pub start_time: u64,
    /// Unix end time, after `start_time`
    pub end_time: u64,
    /// Amount locked for the staking period
    pub stake_amount: u64,
    /// Owners the stake returns to
    pub stake_owners: Vec<AddressInput>,
    /// Owners of staking rewards
    pub reward_owners: Vec<AddressInput>,
    /// Locktime of the reward owner
    pub reward_locktime: u64,
    /// Threshold of the reward owner
    pub reward_threshold: u32,
}

/// Selected inputs and change for one spend
struct Funding {
    inputs: Vec<TransferableInput>,
    change: Vec<TransferableOutput>,
}

/// Builds unsigned transactions for one chain
#[derive(Debug)]
pub struct TxBuilder<'a> {
    ctx: &'a ChainContext,
    fees: FeeCalculator,
    selector: UtxoSelector,
    policy: Box<dyn FeeSplitPolicy>,
    fee_override: Option<u64>,
}

impl<'a> TxBuilder<'a> {
    /// Builder for `ctx`'s chain with first-fit selection
    pub fn new(ctx: &'a ChainContext) -> Self {
        Self {
            ctx,
            fees: FeeCalculator::new(ctx.fees.clone()),
            selector: UtxoSelector::default(),
            policy: Box::new(SeparateFeeAsset),
            fee_override: None,
        }
    }

    /// Use a different UTXO selection strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selector = UtxoSelector::new(strategy);
        self
    }

    /// Use a different fee split policy
    pub fn with_fee_policy(mut self, policy: Box<dyn FeeSplitPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Charge a fixed fee instead of the schedule
    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee_override = Some(fee);
        self
    }

    /// Chain context
    pub fn context(&self) -> &ChainContext {
        self.ctx
    }

    /// Fee a transaction of `kind` pays on this chain
    pub fn fee_for(&self, kind: TypeKind) -> u64 {
        self.fee_override
            .unwrap_or_else(|| self.fees.fee_for(self.ctx.codec(), kind))
    }

    fn require_chain(&self, allowed: &[ChainAlias], what: &str) -> Result<()> {
        if allowed.contains(&self.ctx.alias) {
            Ok(())
        } else {
            Err(Error::InvalidChainId(format!(
                "{} cannot be built on the {}-chain",
                what, self.ctx.alias
            )))
        }
    }

    /// Another primary-network chain to import from or export to
    fn counterpart_chain(&self, input: &IdInput) -> Result<Id> {
        let chain_id = resolve_chain_id(input)?;
        if chain_id == self.ctx.blockchain_id {
            return Err(Error::InvalidChainId(format!(
                "{} is this chain; atomic transactions need another chain",
                chain_id
            )));
        }
        if self.ctx.alias_of(&chain_id).is_none() {
            return Err(Error::InvalidChainId(format!(
                "{} is not a chain of network {}",
                chain_id, self.ctx.network_id
            )));
        }
        Ok(chain_id)
    }

    fn fund(
        &self,
        utxos: &UtxoSet,
        opts: &SpendOptions,
        requirements: &[AssetRequirement],
    ) -> Result<Funding> {
        if opts.from.is_empty() && requirements.iter().any(|r| r.amount > 0 || r.burn > 0) {
            return Err(Error::InvalidAddress("no source addresses".to_string()));
        }
        let selection = self
            .selector
            .select(utxos, &opts.from, opts.as_of, requirements)?;

        let mut change = Vec::new();
        for asset in &selection.assets {
            let amount = asset.change();
            if amount > 0 {
                change.push(TransferableOutput::new(
                    asset.asset_id,
                    Output::transfer(amount, opts.change_owners()?),
                ));
            }
        }

        Ok(Funding {
            inputs: selection.inputs,
            change,
        })
    }

    fn finish(&self, mut tx: UnsignedTx, fee: u64) -> Result<UnsignedTx> {
        tx.sort()?;
        tx.validate(&self.ctx.avax_asset_id, fee)?;
        tracing::info!(
            "Built {:?} on {}: {} inputs, fee {}",
            tx.kind(),
            tx.codec(),
            tx.credential_signers()?.len(),
            fee
        );
        Ok(tx)
    }

    fn base(
        &self,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
        memo: &[u8],
    ) -> BaseTx {
        BaseTx::new(
            self.ctx.network_id,
            self.ctx.blockchain_id,
            outputs,
            inputs,
            memo.to_vec(),
        )
    }

    /// Send `amount` of `asset` to `to` on the X-chain
    pub fn build_base_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        asset: &IdInput,
        to: &[AddressInput],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::X], "a base transaction")?;
        let asset_id = resolve_asset_id(asset)?;
        if amount == 0 {
            return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
        }
        let destination = opts.destination_owners(resolve_addresses(to)?)?;

        let fee = self.fee_for(TypeKind::BaseTx);
        let requirements = self
            .policy
            .split(asset_id, amount, self.ctx.avax_asset_id, fee)?;
        let funding = self.fund(utxos, opts, &requirements)?;

        let mut outputs = vec![TransferableOutput::new(
            asset_id,
            Output::transfer(amount, destination),
        )];
        outputs.extend(funding.change);

        let tx = UnsignedTx::AvmBase(self.base(outputs, funding.inputs, &opts.memo));
        self.finish(tx, fee)
    }

    /// Export `amount` of `asset` from this chain (X or P) to
    /// `destination_chain`, owned there by `to`
    pub fn build_export_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        asset: &IdInput,
        destination_chain: &IdInput,
        to: &[AddressInput],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::X, ChainAlias::P], "an export transaction")?;
        let asset_id = resolve_asset_id(asset)?;
        let destination_chain = self.counterpart_chain(destination_chain)?;
        if amount == 0 {
            return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
        }
        let destination = opts.destination_owners(resolve_addresses(to)?)?;

        let fee = self.fee_for(TypeKind::ExportTx);
        let requirements = self
            .policy
            .split(asset_id, amount, self.ctx.avax_asset_id, fee)?;
        let funding = self.fund(utxos, opts, &requirements)?;

        let tx = ExportTx {
            base: self.base(funding.change, funding.inputs, &opts.memo),
            destination_chain,
            exported_outputs: vec![TransferableOutput::new(
                asset_id,
                Output::transfer(amount, destination),
            )],
        };
        let tx = match self.ctx.codec() {
            Codec::Pvm => UnsignedTx::PvmExport(tx),
            _ => UnsignedTx::AvmExport(tx),
        };
        self.finish(tx, fee)
    }

    /// Import every UTXO `opts.from` can spend in `atomic_utxos` from
    /// `source_chain` into this chain (X or P), owned by `to`.
    ///
    /// The fee is taken from the imported primary asset. If that does not
    /// cover it, the remainder is funded from `local_utxos`.
    pub fn build_import_tx(
        &self,
        local_utxos: &UtxoSet,
        atomic_utxos: &UtxoSet,
        source_chain: &IdInput,
        to: &[AddressInput],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::X, ChainAlias::P], "an import transaction")?;
        let source_chain = self.counterpart_chain(source_chain)?;
        let destination = opts.destination_owners(resolve_addresses(to)?)?;

        let imported_inputs = spend_all(atomic_utxos, &opts.from, opts.as_of)?;
        if imported_inputs.is_empty() {
            return Err(Error::NoAtomicUtxos(format!(
                "no spendable UTXOs exported from {}",
                source_chain
            )));
        }
        let mut imported = imported_totals(&imported_inputs)?;

        let fee = self.fee_for(TypeKind::ImportTx);
        let avax = self.ctx.avax_asset_id;
        let imported_avax = imported.get(&avax).copied().unwrap_or(0);
        let fee_from_import = imported_avax.min(fee);
        if let Some(total) = imported.get_mut(&avax) {
            *total -= fee_from_import;
        }
        let remaining_fee = fee - fee_from_import;

        tracing::debug!(
            "Importing {} inputs from {}: fee {} ({} from local UTXOs)",
            imported_inputs.len(),
            source_chain,
            fee,
            remaining_fee
        );

        let funding = if remaining_fee > 0 {
            self.fund(
                local_utxos,
                opts,
                &[AssetRequirement::new(avax, 0, remaining_fee)],
            )?
        } else {
            Funding {
                inputs: Vec::new(),
                change: Vec::new(),
            }
        };

        let mut outputs = funding.change;
        for (asset_id, amount) in imported {
            if amount > 0 {
                outputs.push(TransferableOutput::new(
                    asset_id,
                    Output::transfer(amount, destination.clone()),
                ));
            }
        }

        let tx = ImportTx {
            base: self.base(outputs, funding.inputs, &opts.memo),
            source_chain,
            imported_inputs,
        };
        let tx = match self.ctx.codec() {
            Codec::Pvm => UnsignedTx::PvmImport(tx),
            _ => UnsignedTx::AvmImport(tx),
        };
        self.finish(tx, fee)
    }

    /// Create a subnet controlled by `threshold` of `control_keys`
    pub fn build_create_subnet_tx(
        &self,
        utxos: &UtxoSet,
        control_keys: &[AddressInput],
        threshold: u32,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::P], "a subnet")?;
        let owner = OutputOwners::new(resolve_addresses(control_keys)?, 0, threshold)?;

        let fee = self.fee_for(TypeKind::CreateSubnetTx);
        let funding = self.fund(
            utxos,
            opts,
            &[AssetRequirement::new(self.ctx.avax_asset_id, 0, fee)],
        )?;

        let tx = UnsignedTx::PvmCreateSubnet(CreateSubnetTx {
            base: self.base(funding.change, funding.inputs, &opts.memo),
            owner,
        });
        self.finish(tx, fee)
    }

    fn check_period(&self, stake: &StakeRequest, as_of: u64) -> Result<()> {
        if stake.start_time <= as_of {
            return Err(Error::InvalidStake(format!(
                "start time {} must be after {}",
                stake.start_time, as_of
            )));
        }
        if stake.end_time <= stake.start_time {
            return Err(Error::InvalidStake(format!(
                "end time {} must be after start time {}",
                stake.end_time, stake.start_time
            )));
        }
        let duration = stake.end_time - stake.start_time;
        let limits = &self.ctx.staking;
        if !limits.is_valid_stake_duration(duration) {
            return Err(Error::InvalidStake(format!(
                "staking period of {}s outside [{}, {}]",
                duration, limits.min_stake_duration, limits.max_stake_duration
            )));
        }
        Ok(())
    }

    /// Stake inputs, change and stake outputs shared by validators and
    /// delegators
    fn fund_stake(
        &self,
        utxos: &UtxoSet,
        stake: &StakeRequest,
        fee: u64,
        opts: &SpendOptions,
    ) -> Result<(Funding, Vec<TransferableOutput>, OutputOwners)> {
        let stake_owners = opts.destination_owners(resolve_addresses(&stake.stake_owners)?)?;
        let reward_owners = OutputOwners::new(
            resolve_addresses(&stake.reward_owners)?,
            stake.reward_locktime,
            stake.reward_threshold,
        )?;

        let funding = self.fund(
            utxos,
            opts,
            &[AssetRequirement::new(
                self.ctx.avax_asset_id,
                stake.stake_amount,
                fee,
            )],
        )?;
        let stake_outputs = vec![TransferableOutput::new(
            self.ctx.avax_asset_id,
            Output::transfer(stake.stake_amount, stake_owners),
        )];
        Ok((funding, stake_outputs, reward_owners))
    }

    /// Add a primary network validator
    pub fn build_add_validator_tx(
        &self,
        utxos: &UtxoSet,
        stake: &StakeRequest,
        delegation_shares: u32,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::P], "a validator")?;
        self.check_period(stake, opts.as_of)?;
        let limits = &self.ctx.staking;
        if !limits.is_valid_validator_stake(stake.stake_amount) {
            return Err(Error::InvalidStake(format!(
                "validator stake {} outside [{}, {}]",
                stake.stake_amount, limits.min_validator_stake, limits.max_validator_stake
            )));
        }
        if !limits.is_valid_delegation_fee(delegation_shares) {
            return Err(Error::InvalidStake(format!(
                "delegation fee {} outside [{}, {}]",
                delegation_shares, limits.min_delegation_fee, PERCENT_DENOMINATOR
            )));
        }

        let fee = self.fee_for(TypeKind::AddValidatorTx);
        let (funding, stake_outputs, rewards_owner) = self.fund_stake(utxos, stake, fee, opts)?;

        let tx = UnsignedTx::PvmAddValidator(AddValidatorTx {
            base: self.base(funding.change, funding.inputs, &opts.memo),
            validator: Validator {
                node_id: stake.node_id,
                start_time: stake.start_time,
                end_time: stake.end_time,
                weight: stake.stake_amount,
            },
            stake: stake_outputs,
            rewards_owner,
            delegation_shares,
        });
        self.finish(tx, fee)
    }

    /// Delegate stake to a primary network validator
    pub fn build_add_delegator_tx(
        &self,
        utxos: &UtxoSet,
        stake: &StakeRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::P], "a delegator")?;
        self.check_period(stake, opts.as_of)?;
        if stake.stake_amount < self.ctx.staking.min_delegator_stake {
            return Err(Error::InvalidStake(format!(
                "delegator stake {} below minimum {}",
                stake.stake_amount, self.ctx.staking.min_delegator_stake
            )));
        }

        let fee = self.fee_for(TypeKind::AddDelegatorTx);
        let (funding, stake_outputs, rewards_owner) = self.fund_stake(utxos, stake, fee, opts)?;

        let tx = UnsignedTx::PvmAddDelegator(AddDelegatorTx {
            base: self.base(funding.change, funding.inputs, &opts.memo),
            validator: Validator {
                node_id: stake.node_id,
                start_time: stake.start_time,
                end_time: stake.end_time,
                weight: stake.stake_amount,
            },
            stake: stake_outputs,
            rewards_owner,
        });
        self.finish(tx, fee)
    }

    /// Credit `to` on the C-chain with every UTXO `opts.from` can spend in
    /// `atomic_utxos`, less the atomic fee in the primary asset
    pub fn build_evm_import_tx(
        &self,
        atomic_utxos: &UtxoSet,
        source_chain: &IdInput,
        to: EthAddress,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::C], "an EVM import")?;
        let source_chain = self.counterpart_chain(source_chain)?;

        let imported_inputs = spend_all(atomic_utxos, &opts.from, opts.as_of)?;
        if imported_inputs.is_empty() {
            return Err(Error::NoAtomicUtxos(format!(
                "no spendable UTXOs exported from {}",
                source_chain
            )));
        }
        let mut imported = imported_totals(&imported_inputs)?;

        let fee = self.fee_for(TypeKind::ImportTx);
        let avax = self.ctx.avax_asset_id;
        let imported_avax = imported.get(&avax).copied().unwrap_or(0);
        if imported_avax < fee {
            return Err(Error::InsufficientFunds(format!(
                "imported {} of the primary asset cannot cover the {} fee",
                imported_avax, fee
            )));
        }
        if let Some(total) = imported.get_mut(&avax) {
            *total -= fee;
        }

        let outputs = imported
            .into_iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(asset_id, amount)| EvmOutput {
                address: to,
                amount,
                asset_id,
            })
            .collect();

        let tx = UnsignedTx::EvmImport(EvmImportTx {
            network_id: self.ctx.network_id,
            blockchain_id: self.ctx.blockchain_id,
            source_chain,
            imported_inputs,
            outputs,
        });
        self.finish(tx, fee)
    }

    /// Debit `from` on the C-chain and export `amount` of `asset` to
    /// `destination_chain`, owned there by `to`.
    ///
    /// The account pays the atomic fee in the primary asset; exporting any
    /// other asset debits the account twice under the same nonce.
    #[allow(clippy::too_many_arguments)]
    pub fn build_evm_export_tx(
        &self,
        amount: u64,
        asset: &IdInput,
        destination_chain: &IdInput,
        to: &[AddressInput],
        from: EthAddress,
        nonce: u64,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx> {
        self.require_chain(&[ChainAlias::C], "an EVM export")?;
        let asset_id = resolve_asset_id(asset)?;
        let destination_chain = self.counterpart_chain(destination_chain)?;
        if amount == 0 {
            return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
        }
        let destination = opts.destination_owners(resolve_addresses(to)?)?;

        let fee = self.fee_for(TypeKind::ExportTx);
        let avax = self.ctx.avax_asset_id;
        let inputs = self
            .policy
            .split(asset_id, amount, avax, fee)?
            .into_iter()
            .map(|req| {
                Ok(EvmInput {
                    address: from,
                    amount: req.total()?,
                    asset_id: req.asset_id,
                    nonce,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tx = UnsignedTx::EvmExport(EvmExportTx {
            network_id: self.ctx.network_id,
            blockchain_id: self.ctx.blockchain_id,
            destination_chain,
            inputs,
            exported_outputs: vec![TransferableOutput::new(
                asset_id,
                Output::transfer(amount, destination),
            )],
        });
        self.finish(tx, fee)
    }
}

fn imported_totals(inputs: &[TransferableInput]) -> Result<BTreeMap<Id, u64>> {
    let mut totals = BTreeMap::new();
    for input in inputs {
        let total: &mut u64 = totals.entry(input.asset_id).or_insert(0);
        *total = total.checked_add(input.input.amount()).ok_or_else(|| {
            Error::AmountOverflow(format!("imported {} overflows u64", input.asset_id))
        })?;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Input;
    use crate::outputs::StakeableLockOut;
    use crate::utxo::Utxo;
    use avax_params::{Network, ONE_AVAX};

    const ME: ShortId = ShortId([1; 20]);
    const YOU: ShortId = ShortId([2; 20]);
    const TOKEN: Id = Id([0xbb; 32]);

    fn ctx(alias: ChainAlias) -> ChainContext {
        ChainContext::from_network(&Network::local(), alias).unwrap()
    }

    fn owned(set: &mut UtxoSet, tx: u8, asset: Id, amount: u64) {
        set.add(
            Utxo::new(Id([tx; 32]), 0, asset, Output::transfer(amount, OutputOwners::single(ME))),
            false,
        );
    }

    const DAY: u64 = 24 * 60 * 60;

    fn stake_request(start: u64, duration: u64, amount: u64) -> StakeRequest {
        StakeRequest {
            node_id: NodeId(ShortId([7; 20])),
            start_time: start,
            end_time: start + duration,
            stake_amount: amount,
            stake_owners: vec![ME.into()],
            reward_owners: vec![ME.into()],
            reward_locktime: 0,
            reward_threshold: 1,
        }
    }

    #[test]
    fn test_base_tx_with_change() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Avm);
        owned(&mut set, 1, avax, 10 * ONE_AVAX);

        let tx = TxBuilder::new(&ctx)
            .build_base_tx(
                &set,
                ONE_AVAX,
                &avax.into(),
                &[YOU.into()],
                &SpendOptions::new(vec![ME]),
            )
            .unwrap();
        let base = tx.base().unwrap();
        assert_eq!(base.inputs.len(), 1);
        assert_eq!(base.outputs.len(), 2);
        assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.tx_fee);
        let change = base
            .outputs
            .iter()
            .find(|o| o.output.owners().addresses() == [ME])
            .unwrap();
        assert_eq!(change.output.amount(), 9 * ONE_AVAX - ctx.fees.tx_fee);
    }

    #[test]
    fn test_base_tx_other_asset_pays_fee_in_avax() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Avm);
        owned(&mut set, 1, TOKEN, 50);
        owned(&mut set, 2, avax, ONE_AVAX);

        let tx = TxBuilder::new(&ctx)
            .build_base_tx(&set, 50, &TOKEN.into(), &[YOU.into()], &SpendOptions::new(vec![ME]))
            .unwrap();
        let base = tx.base().unwrap();
        assert_eq!(base.inputs.len(), 2);
        assert_eq!(tx.burned(&TOKEN).unwrap(), 0);
        assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.tx_fee);
    }

    #[test]
    fn test_base_tx_only_on_x_chain() {
        let ctx = ctx(ChainAlias::P);
        let set = UtxoSet::new(Codec::Pvm);
        let avax = ctx.avax_asset_id;
        assert!(matches!(
            TxBuilder::new(&ctx).build_base_tx(
                &set,
                1,
                &avax.into(),
                &[YOU.into()],
                &SpendOptions::new(vec![ME])
            ),
            Err(Error::InvalidChainId(_))
        ));
    }

    #[test]
    fn test_insufficient_funds() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Avm);
        owned(&mut set, 1, avax, ONE_AVAX);
        assert!(matches!(
            TxBuilder::new(&ctx).build_base_tx(
                &set,
                ONE_AVAX,
                &avax.into(),
                &[YOU.into()],
                &SpendOptions::new(vec![ME])
            ),
            Err(Error::InsufficientFunds(_))
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let ctx = ctx(ChainAlias::X);
        let set = UtxoSet::new(Codec::Avm);
        assert!(matches!(
            TxBuilder::new(&ctx).build_base_tx(
                &set,
                0,
                &ctx.avax_asset_id.into(),
                &[YOU.into()],
                &SpendOptions::new(vec![ME])
            ),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_bad_asset_and_chain_ids() {
        let ctx = ctx(ChainAlias::X);
        let set = UtxoSet::new(Codec::Avm);
        let builder = TxBuilder::new(&ctx);
        let opts = SpendOptions::new(vec![ME]);

        assert!(matches!(
            builder.build_base_tx(&set, 1, &IdInput::Bytes(vec![1, 2, 3]), &[YOU.into()], &opts),
            Err(Error::InvalidAssetId(_))
        ));
        assert!(matches!(
            builder.build_export_tx(
                &set,
                1,
                &ctx.avax_asset_id.into(),
                &"notcb58!".into(),
                &[YOU.into()],
                &opts
            ),
            Err(Error::InvalidChainId(_))
        ));
        assert!(matches!(
            builder.build_export_tx(
                &set,
                1,
                &ctx.avax_asset_id.into(),
                &ctx.x_chain_id.into(),
                &[YOU.into()],
                &opts
            ),
            Err(Error::InvalidChainId(_))
        ));
    }

    #[test]
    fn test_pvm_export_variant() {
        let ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Pvm);
        owned(&mut set, 1, avax, 5 * ONE_AVAX);

        let tx = TxBuilder::new(&ctx)
            .build_export_tx(
                &set,
                ONE_AVAX,
                &avax.into(),
                &ctx.x_chain_id.into(),
                &[YOU.into()],
                &SpendOptions::new(vec![ME]),
            )
            .unwrap();
        match &tx {
            UnsignedTx::PvmExport(export) => {
                assert_eq!(export.destination_chain, ctx.x_chain_id);
                assert_eq!(export.exported_outputs[0].output.amount(), ONE_AVAX);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_import_fee_from_imported_avax() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut atomic = UtxoSet::new(Codec::Avm);
        owned(&mut atomic, 1, avax, ONE_AVAX);
        owned(&mut atomic, 2, TOKEN, 40);

        let tx = TxBuilder::new(&ctx)
            .build_import_tx(
                &UtxoSet::new(Codec::Avm),
                &atomic,
                &ctx.p_chain_id.into(),
                &[ME.into()],
                &SpendOptions::new(vec![ME]),
            )
            .unwrap();
        match &tx {
            UnsignedTx::AvmImport(import) => {
                assert!(import.base.inputs.is_empty());
                assert_eq!(import.imported_inputs.len(), 2);
                assert_eq!(import.base.outputs.len(), 2);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.tx_fee);
        assert_eq!(tx.burned(&TOKEN).unwrap(), 0);
    }

    #[test]
    fn test_import_fee_from_local_utxos() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut atomic = UtxoSet::new(Codec::Avm);
        owned(&mut atomic, 1, TOKEN, 40);
        let mut local = UtxoSet::new(Codec::Avm);
        owned(&mut local, 2, avax, ONE_AVAX);

        let tx = TxBuilder::new(&ctx)
            .build_import_tx(
                &local,
                &atomic,
                &ctx.c_chain_id.into(),
                &[ME.into()],
                &SpendOptions::new(vec![ME]),
            )
            .unwrap();
        let base = tx.base().unwrap();
        assert_eq!(base.inputs.len(), 1);
        assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.tx_fee);
        assert_eq!(tx.credential_signers().unwrap().len(), 2);
    }

    #[test]
    fn test_import_nothing() {
        let ctx = ctx(ChainAlias::X);
        let empty = UtxoSet::new(Codec::Avm);
        assert!(matches!(
            TxBuilder::new(&ctx).build_import_tx(
                &empty,
                &empty,
                &ctx.p_chain_id.into(),
                &[ME.into()],
                &SpendOptions::new(vec![ME])
            ),
            Err(Error::NoAtomicUtxos(_))
        ));
    }

    #[test]
    fn test_create_subnet() {
        let ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Pvm);
        owned(&mut set, 1, avax, 2 * ctx.fees.create_subnet_fee);

        let tx = TxBuilder::new(&ctx)
            .build_create_subnet_tx(&set, &[YOU.into(), ME.into()], 2, &SpendOptions::new(vec![ME]))
            .unwrap();
        match &tx {
            UnsignedTx::PvmCreateSubnet(subnet) => {
                assert_eq!(subnet.owner.addresses(), &[ME, YOU]);
                assert_eq!(subnet.owner.threshold, 2);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.create_subnet_fee);
    }

    #[test]
    fn test_add_validator() {
        let ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let stake = ctx.staking.min_validator_stake;
        let mut set = UtxoSet::new(Codec::Pvm);
        owned(&mut set, 1, avax, stake + ONE_AVAX);

        let opts = SpendOptions::new(vec![ME]).as_of(1_000);
        let tx = TxBuilder::new(&ctx)
            .build_add_validator_tx(&set, &stake_request(2_000, 30 * DAY, stake), 20_000, &opts)
            .unwrap();
        match &tx {
            UnsignedTx::PvmAddValidator(add) => {
                assert_eq!(add.validator.weight, stake);
                assert_eq!(add.stake.len(), 1);
                assert_eq!(add.stake[0].output.amount(), stake);
                assert_eq!(add.delegation_shares, 20_000);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_validator_limits() {
        let ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let min = ctx.staking.min_validator_stake;
        let mut set = UtxoSet::new(Codec::Pvm);
        owned(&mut set, 1, avax, min * 2);
        let builder = TxBuilder::new(&ctx);
        let opts = SpendOptions::new(vec![ME]).as_of(1_000);

        let cases = [
            (stake_request(500, 30 * DAY, min), 20_000),
            (stake_request(2_000, 30 * DAY, min - 1), 20_000),
            (stake_request(2_000, 30 * DAY, min), 19_999),
            (stake_request(2_000, 30 * DAY, min), PERCENT_DENOMINATOR + 1),
            (stake_request(2_000, DAY - 1, min), 20_000),
            (stake_request(2_000, 400 * DAY, min), 20_000),
        ];
        for (request, shares) in cases {
            assert!(matches!(
                builder.build_add_validator_tx(&set, &request, shares, &opts),
                Err(Error::InvalidStake(_))
            ));
        }

        let mut backwards = stake_request(2_000, 30 * DAY, min);
        backwards.end_time = 1_500;
        assert!(matches!(
            builder.build_add_validator_tx(&set, &backwards, 20_000, &opts),
            Err(Error::InvalidStake(_))
        ));
    }

    #[test]
    fn test_validator_limits_follow_context() {
        let mut ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let min = ctx.staking.min_validator_stake;
        let mut set = UtxoSet::new(Codec::Pvm);
        owned(&mut set, 1, avax, min * 2);
        let opts = SpendOptions::new(vec![ME]).as_of(1_000);

        // Inclusive at both ends of the period and fee ranges
        let longest = stake_request(2_000, ctx.staking.max_stake_duration, min);
        let shortest = stake_request(2_000, ctx.staking.min_stake_duration, min);
        let builder = TxBuilder::new(&ctx);
        assert!(builder
            .build_add_validator_tx(&set, &longest, PERCENT_DENOMINATOR, &opts)
            .is_ok());
        assert!(builder
            .build_add_validator_tx(&set, &shortest, ctx.staking.min_delegation_fee, &opts)
            .is_ok());

        ctx.staking.min_stake_duration = 60 * DAY;
        ctx.staking.min_delegation_fee = 50_000;
        let builder = TxBuilder::new(&ctx);
        let month = stake_request(2_000, 30 * DAY, min);
        assert!(matches!(
            builder.build_add_validator_tx(&set, &month, 50_000, &opts),
            Err(Error::InvalidStake(msg)) if msg.contains("staking period")
        ));
        let season = stake_request(2_000, 90 * DAY, min);
        assert!(matches!(
            builder.build_add_validator_tx(&set, &season, 49_999, &opts),
            Err(Error::InvalidStake(msg)) if msg.contains("delegation fee")
        ));
        assert!(builder
            .build_add_validator_tx(&set, &season, 50_000, &opts)
            .is_ok());
    }

    #[test]
    fn test_add_delegator_skips_locked_funds() {
        let ctx = ctx(ChainAlias::P);
        let avax = ctx.avax_asset_id;
        let stake = ctx.staking.min_delegator_stake;
        let mut set = UtxoSet::new(Codec::Pvm);
        set.add(
            Utxo::new(
                Id([9; 32]),
                0,
                avax,
                Output::StakeableLock(StakeableLockOut {
                    locktime: u64::MAX,
                    transfer: crate::outputs::SecpTransferOutput::new(
                        stake * 10,
                        OutputOwners::single(ME),
                    ),
                }),
            ),
            false,
        );
        let builder = TxBuilder::new(&ctx);
        let opts = SpendOptions::new(vec![ME]).as_of(1_000);
        let request = stake_request(2_000, 30 * DAY, stake);

        assert!(matches!(
            builder.build_add_delegator_tx(&set, &request, &opts),
            Err(Error::InsufficientFunds(_))
        ));

        owned(&mut set, 1, avax, stake);
        let tx = builder.build_add_delegator_tx(&set, &request, &opts).unwrap();
        let inputs = tx.utxo_inputs();
        assert_eq!(inputs.len(), 1);
        assert!(matches!(inputs[0].input, Input::SecpTransfer(_)));
    }

    #[test]
    fn test_evm_import() {
        let ctx = ctx(ChainAlias::C);
        let avax = ctx.avax_asset_id;
        let mut atomic = UtxoSet::new(Codec::Evm);
        owned(&mut atomic, 1, avax, ONE_AVAX);
        let to = EthAddress([0x42; 20]);

        let tx = TxBuilder::new(&ctx)
            .build_evm_import_tx(&atomic, &ctx.x_chain_id.into(), to, &SpendOptions::new(vec![ME]))
            .unwrap();
        match &tx {
            UnsignedTx::EvmImport(import) => {
                assert_eq!(import.outputs.len(), 1);
                assert_eq!(import.outputs[0].address, to);
                assert_eq!(import.outputs[0].amount, ONE_AVAX - ctx.fees.evm_atomic_fee);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn test_evm_import_needs_fee_in_avax() {
        let ctx = ctx(ChainAlias::C);
        let mut atomic = UtxoSet::new(Codec::Evm);
        owned(&mut atomic, 1, TOKEN, 10);
        assert!(matches!(
            TxBuilder::new(&ctx).build_evm_import_tx(
                &atomic,
                &ctx.x_chain_id.into(),
                EthAddress([1; 20]),
                &SpendOptions::new(vec![ME])
            ),
            Err(Error::InsufficientFunds(_))
        ));
    }

    #[test]
    fn test_evm_export_inputs() {
        let ctx = ctx(ChainAlias::C);
        let avax = ctx.avax_asset_id;
        let from = EthAddress([0x42; 20]);
        let builder = TxBuilder::new(&ctx);
        let opts = SpendOptions::default();

        let tx = builder
            .build_evm_export_tx(
                ONE_AVAX,
                &avax.into(),
                &ctx.x_chain_id.into(),
                &[ME.into()],
                from,
                3,
                &opts,
            )
            .unwrap();
        match &tx {
            UnsignedTx::EvmExport(export) => {
                assert_eq!(export.inputs.len(), 1);
                assert_eq!(export.inputs[0].amount, ONE_AVAX + ctx.fees.evm_atomic_fee);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }

        let tx = builder
            .build_evm_export_tx(
                77,
                &TOKEN.into(),
                &ctx.p_chain_id.into(),
                &[ME.into()],
                from,
                3,
                &opts,
            )
            .unwrap();
        match &tx {
            UnsignedTx::EvmExport(export) => {
                assert_eq!(export.inputs.len(), 2);
                assert!(export.inputs.iter().all(|i| i.nonce == 3 && i.address == from));
                assert_eq!(tx.burned(&avax).unwrap(), ctx.fees.evm_atomic_fee);
                assert_eq!(tx.burned(&TOKEN).unwrap(), 0);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(
            tx.credential_signers().unwrap(),
            vec![
                crate::tx::CredentialSigners::Account(from),
                crate::tx::CredentialSigners::Account(from)
            ]
        );
    }

    #[test]
    fn test_fee_override() {
        let ctx = ctx(ChainAlias::X);
        let avax = ctx.avax_asset_id;
        let mut set = UtxoSet::new(Codec::Avm);
        owned(&mut set, 1, avax, 100);

        let tx = TxBuilder::new(&ctx)
            .with_fee(5)
            .build_base_tx(&set, 10, &avax.into(), &[YOU.into()], &SpendOptions::new(vec![ME]))
            .unwrap();
        assert_eq!(tx.burned(&avax).unwrap(), 5);
    }
}
