//! In-memory node for tests
//!
//! Keeps per-chain UTXO stores (local and atomic), applies issued
//! transactions to them, and records what was issued.

use crate::node::{GetUtxosRequest, NodeClient, UtxoIndex, UtxoPage};
use crate::{Error, Result};
use async_trait::async_trait;
use avax_core::tx::UnsignedTx;
use avax_core::{
    cb58, parse_address, ChainContext, Codec, Id, Serializable, ShortId, TransferableOutput, Tx,
    Utxo, UtxoId,
};
use avax_params::{ChainAlias, Network};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Store key: chain holding the UTXOs and, for atomic UTXOs, the chain
/// that exported them
type StoreKey = (ChainAlias, Option<ChainAlias>);

/// A transaction accepted by [`MemoryNode`]
#[derive(Debug, Clone)]
pub struct IssuedTx {
    /// Chain it was issued on
    pub chain: ChainAlias,
    /// Transaction ID
    pub tx_id: Id,
    /// Decoded transaction
    pub tx: Tx,
}

#[derive(Default)]
struct State {
    utxos: HashMap<StoreKey, Vec<Utxo>>,
    issued: Vec<IssuedTx>,
}

/// In-memory [`NodeClient`]
pub struct MemoryNode {
    ctx: ChainContext,
    state: Mutex<State>,
}

fn rpc(msg: impl Into<String>) -> Error {
    Error::Rpc(msg.into())
}

impl MemoryNode {
    /// Empty node for `network`
    pub fn new(network: &Network) -> Result<Self> {
        Ok(Self {
            ctx: ChainContext::from_network(network, ChainAlias::X)?,
            state: Mutex::new(State::default()),
        })
    }

    /// Seed a UTXO on `chain`, atomic when `source` is set
    pub async fn add_utxo(&self, chain: ChainAlias, source: Option<ChainAlias>, utxo: Utxo) {
        let mut state = self.state.lock().await;
        state.utxos.entry((chain, source)).or_default().push(utxo);
    }

    /// UTXOs held on `chain` (atomic from `source` when set)
    pub async fn utxos(&self, chain: ChainAlias, source: Option<ChainAlias>) -> Vec<Utxo> {
        let state = self.state.lock().await;
        state.utxos.get(&(chain, source)).cloned().unwrap_or_default()
    }

    /// Everything issued so far, in order
    pub async fn issued(&self) -> Vec<IssuedTx> {
        self.state.lock().await.issued.clone()
    }

    fn alias_of(&self, chain_id: &Id) -> Result<ChainAlias> {
        self.ctx
            .alias_of(chain_id)
            .ok_or_else(|| rpc(format!("unknown chain {}", chain_id)))
    }
}

fn exported(tx: &UnsignedTx) -> Option<(Id, &[TransferableOutput])> {
    match tx {
        UnsignedTx::AvmExport(tx) | UnsignedTx::PvmExport(tx) => {
            Some((tx.destination_chain, tx.exported_outputs.as_slice()))
        }
        UnsignedTx::EvmExport(tx) => Some((tx.destination_chain, tx.exported_outputs.as_slice())),
        _ => None,
    }
}

fn imported_from(tx: &UnsignedTx) -> Option<Id> {
    match tx {
        UnsignedTx::AvmImport(tx) | UnsignedTx::PvmImport(tx) => Some(tx.source_chain),
        UnsignedTx::EvmImport(tx) => Some(tx.source_chain),
        _ => None,
    }
}

#[async_trait]
impl NodeClient for MemoryNode {
    async fn get_utxos(&self, request: GetUtxosRequest) -> Result<UtxoPage> {
        let chain = request
            .chain
            .ok_or_else(|| rpc("request does not name a chain"))?;
        let source = match &request.source_chain {
            Some(s) => Some(self.alias_of(&Id::from_cb58(s)?)?),
            None => None,
        };
        let owners = request
            .addresses
            .iter()
            .map(|a| -> Result<ShortId> { Ok(parse_address(a)?.id) })
            .collect::<Result<Vec<ShortId>>>()?;

        let state = self.state.lock().await;
        let owned: Vec<&Utxo> = state
            .utxos
            .get(&(chain, source))
            .map(|utxos| {
                utxos
                    .iter()
                    .filter(|u| u.output.owners().contains_any(&owners))
                    .collect()
            })
            .unwrap_or_default();

        let start = match &request.start_index {
            Some(index) => owned
                .iter()
                .position(|u| u.id().to_string() == index.utxo)
                .map(|i| i + 1)
                .unwrap_or(owned.len()),
            None => 0,
        };
        let page: Vec<&Utxo> = owned
            .iter()
            .skip(start)
            .take(request.limit as usize)
            .copied()
            .collect();

        let codec = Codec::for_chain(chain);
        let utxos = page
            .iter()
            .map(|u| -> Result<String> { Ok(cb58::encode_hex(&u.to_bytes(codec)?)) })
            .collect::<Result<Vec<_>>>()?;
        let end_index = UtxoIndex {
            address: request.addresses.first().cloned().unwrap_or_default(),
            utxo: page
                .last()
                .map(|u| u.id().to_string())
                .or_else(|| request.start_index.as_ref().map(|i| i.utxo.clone()))
                .unwrap_or_default(),
        };

        Ok(UtxoPage {
            num_fetched: utxos.len() as u32,
            utxos,
            end_index,
        })
    }

    async fn issue_tx(&self, chain: ChainAlias, tx_hex: String) -> Result<Id> {
        let bytes =
            cb58::decode_hex(&tx_hex).map_err(|e| rpc(format!("bad tx encoding: {}", e)))?;
        let tx = Tx::from_bytes(Codec::for_chain(chain), &bytes)
            .map_err(|e| rpc(format!("bad tx: {}", e)))?;
        let tx_id = Id::hash(&bytes);

        let source = imported_from(&tx.unsigned)
            .map(|id| self.alias_of(&id))
            .transpose()?;
        let local_inputs: Vec<UtxoId> = tx
            .unsigned
            .base()
            .map(|b| b.inputs.iter().map(|i| i.utxo_id()).collect())
            .unwrap_or_default();
        let atomic_inputs: Vec<UtxoId> = tx
            .unsigned
            .utxo_inputs()
            .into_iter()
            .skip(local_inputs.len())
            .map(|i| i.utxo_id())
            .collect();

        let mut state = self.state.lock().await;
        let spends = local_inputs
            .iter()
            .map(|id| ((chain, None), *id))
            .chain(atomic_inputs.iter().map(|id| ((chain, source), *id)));
        for (key, id) in spends.clone() {
            let known = state
                .utxos
                .get(&key)
                .map_or(false, |utxos| utxos.iter().any(|u| u.id() == id));
            if !known {
                return Err(rpc(format!("input {} is missing or already spent", id)));
            }
        }
        for (key, id) in spends {
            if let Some(utxos) = state.utxos.get_mut(&key) {
                utxos.retain(|u| u.id() != id);
            }
        }

        let base_outputs = tx
            .unsigned
            .base()
            .map(|b| b.outputs.clone())
            .unwrap_or_default();
        let local = state.utxos.entry((chain, None)).or_default();
        for (index, out) in base_outputs.iter().enumerate() {
            local.push(Utxo::new(tx_id, index as u32, out.asset_id, out.output.clone()));
        }
        if let Some((destination, outputs)) = exported(&tx.unsigned) {
            let destination = self.alias_of(&destination)?;
            let atomic = state.utxos.entry((destination, Some(chain))).or_default();
            for (offset, out) in outputs.iter().enumerate() {
                let index = (base_outputs.len() + offset) as u32;
                atomic.push(Utxo::new(tx_id, index, out.asset_id, out.output.clone()));
            }
        }

        tracing::info!("MemoryNode accepted {} on {}-chain", tx_id, chain);
        state.issued.push(IssuedTx { chain, tx_id, tx });
        Ok(tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_core::format_address;

    const OWNER: ShortId = ShortId([4; 20]);

    #[tokio::test]
    async fn test_paging_by_owner() {
        let network = Network::local();
        let node = MemoryNode::new(&network).unwrap();
        let asset = Id([1; 32]);
        for tx in 1..=5u8 {
            node.add_utxo(ChainAlias::X, None, Utxo::test_transfer(tx, asset, 10, OWNER))
                .await;
        }
        node.add_utxo(ChainAlias::X, None, Utxo::test_transfer(9, asset, 10, ShortId([5; 20])))
            .await;

        let address = format_address("X", &network.hrp, &OWNER).unwrap();
        let first = node
            .get_utxos(GetUtxosRequest::new(ChainAlias::X, vec![address.clone()], 3))
            .await
            .unwrap();
        assert_eq!(first.num_fetched, 3);

        let mut next = GetUtxosRequest::new(ChainAlias::X, vec![address], 3);
        next.start_index = Some(first.end_index);
        let second = node.get_utxos(next).await.unwrap();
        assert_eq!(second.num_fetched, 2);
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let node = MemoryNode::new(&Network::local()).unwrap();
        assert!(matches!(
            node.issue_tx(ChainAlias::X, "0xdeadbeef".to_string()).await,
            Err(Error::Rpc(_))
        ));
    }
}
