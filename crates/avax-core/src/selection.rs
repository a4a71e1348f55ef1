//! UTXO selection for transaction building
//!
//! Implements first-fit (insertion order), smallest-first and largest-first
//! selection across one or more assets.

use crate::ids::{Id, ShortId};
use crate::inputs::{Input, SecpTransferInput, SigIndex, TransferableInput};
use crate::utxo::{is_spendable, Utxo, UtxoSet};
use crate::{Error, Result};

/// Value of one asset a transaction must consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequirement {
    /// Asset ID
    pub asset_id: Id,
    /// Amount moved to outputs (destinations or stake)
    pub amount: u64,
    /// Amount burned as fee
    pub burn: u64,
}

impl AssetRequirement {
    /// Create a requirement
    pub fn new(asset_id: Id, amount: u64, burn: u64) -> Self {
        Self {
            asset_id,
            amount,
            burn,
        }
    }

    /// Amount plus burn
    pub fn total(&self) -> Result<u64> {
        self.amount.checked_add(self.burn).ok_or_else(|| {
            Error::AmountOverflow(format!(
                "{} + {} of {} overflows u64",
                self.amount, self.burn, self.asset_id
            ))
        })
    }
}

/// UTXO selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Select UTXOs in the order they were fetched
    #[default]
    FirstFit,
    /// Select smallest UTXOs first (consolidates dust)
    SmallestFirst,
    /// Select largest UTXOs first (minimize inputs)
    LargestFirst,
}

/// What was selected for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSelection {
    /// Asset ID
    pub asset_id: Id,
    /// Required total (amount + burn)
    pub required: u64,
    /// Total of the selected UTXOs
    pub selected: u64,
}

impl AssetSelection {
    /// Leftover to return as change
    pub fn change(&self) -> u64 {
        self.selected - self.required
    }
}

/// UTXO selection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// Inputs spending the selected UTXOs, in selection order
    pub inputs: Vec<TransferableInput>,
    /// Per-asset totals, in requirement order
    pub assets: Vec<AssetSelection>,
}

impl SelectionResult {
    /// Change for `asset_id` (zero if not selected)
    pub fn change_for(&self, asset_id: &Id) -> u64 {
        self.assets
            .iter()
            .find(|a| a.asset_id == *asset_id)
            .map(AssetSelection::change)
            .unwrap_or(0)
    }
}

/// Build a transfer input spending `utxo` with keys for `from`
pub fn spend_input(utxo: &Utxo, from: &[ShortId], as_of: u64) -> Result<TransferableInput> {
    let spenders = utxo.output.owners().spenders(from, as_of).ok_or_else(|| {
        Error::InsufficientFunds(format!(
            "UTXO {} is not spendable by the given addresses",
            utxo.id()
        ))
    })?;
    let sig_indices = spenders
        .into_iter()
        .map(|(index, address)| SigIndex::new(index, address))
        .collect();
    Ok(TransferableInput::new(
        utxo.tx_id,
        utxo.output_index,
        utxo.asset_id,
        Input::SecpTransfer(SecpTransferInput::new(utxo.output.amount(), sig_indices)),
    ))
}

/// Spend every UTXO in `utxos` that `from` can spend at `as_of`
pub fn spend_all(utxos: &UtxoSet, from: &[ShortId], as_of: u64) -> Result<Vec<TransferableInput>> {
    utxos
        .iter()
        .filter(|utxo| is_spendable(utxo, from, as_of))
        .map(|utxo| spend_input(utxo, from, as_of))
        .collect()
}

/// UTXO selector
#[derive(Debug, Clone, Default)]
pub struct UtxoSelector {
    strategy: SelectionStrategy,
}

impl UtxoSelector {
    /// Create selector with strategy
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy in use
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Select UTXOs covering every requirement.
    ///
    /// Requirements naming the same asset are merged. Fails with
    /// [`Error::InsufficientFunds`] if any asset cannot be covered.
    pub fn select(
        &self,
        utxos: &UtxoSet,
        from: &[ShortId],
        as_of: u64,
        requirements: &[AssetRequirement],
    ) -> Result<SelectionResult> {
        let mut merged: Vec<(Id, u64)> = Vec::new();
        for req in requirements {
            let total = req.total()?;
            match merged.iter_mut().find(|(asset, _)| *asset == req.asset_id) {
                Some((_, sum)) => {
                    *sum = sum.checked_add(total).ok_or_else(|| {
                        Error::AmountOverflow(format!(
                            "requirement for {} overflows u64",
                            req.asset_id
                        ))
                    })?;
                }
                None => merged.push((req.asset_id, total)),
            }
        }

        let mut candidates: Vec<&Utxo> = utxos
            .iter()
            .filter(|utxo| is_spendable(utxo, from, as_of))
            .collect();
        self.sort_candidates(&mut candidates);

        tracing::debug!(
            "Selecting UTXOs: {} assets, {} spendable candidates, strategy={:?}",
            merged.len(),
            candidates.len(),
            self.strategy
        );

        let mut inputs = Vec::new();
        let mut assets = Vec::with_capacity(merged.len());

        for (asset_id, required) in merged {
            let mut selected = 0u64;
            for utxo in candidates.iter().filter(|u| u.asset_id == asset_id) {
                if selected >= required {
                    break;
                }
                inputs.push(spend_input(utxo, from, as_of)?);
                selected = selected.checked_add(utxo.output.amount()).ok_or_else(|| {
                    Error::AmountOverflow(format!("selected value of {} overflows u64", asset_id))
                })?;
            }

            if selected < required {
                return Err(Error::InsufficientFunds(format!(
                    "need {} of asset {}, have {}",
                    required, asset_id, selected
                )));
            }

            tracing::debug!(
                "Asset {}: required={}, selected={}, change={}",
                asset_id,
                required,
                selected,
                selected - required
            );

            assets.push(AssetSelection {
                asset_id,
                required,
                selected,
            });
        }

        Ok(SelectionResult { inputs, assets })
    }

    fn sort_candidates(&self, candidates: &mut [&Utxo]) {
        match self.strategy {
            SelectionStrategy::FirstFit => {}
            SelectionStrategy::SmallestFirst => {
                candidates.sort_by_key(|u| u.output.amount());
            }
            SelectionStrategy::LargestFirst => {
                candidates.sort_by_key(|u| std::cmp::Reverse(u.output.amount()));
            }
        }
    }
}
