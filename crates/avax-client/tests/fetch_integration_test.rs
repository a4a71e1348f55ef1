//! Integration tests for paginated UTXO fetching

use async_trait::async_trait;
use avax_client::{
    fetch_utxo_set, Error, GetUtxosRequest, MemoryNode, NodeClient, UtxoIndex, UtxoPage,
};
use avax_core::{ChainContext, Id, ShortId, Utxo};
use avax_params::{ChainAlias, Network};
use std::sync::atomic::{AtomicU32, Ordering};

const OWNER: ShortId = ShortId([3; 20]);

fn x_context() -> ChainContext {
    ChainContext::from_network(&Network::local(), ChainAlias::X).unwrap()
}

/// Node that claims full pages but sends nothing
struct HollowNode {
    calls: AtomicU32,
}

#[async_trait]
impl NodeClient for HollowNode {
    async fn get_utxos(&self, request: GetUtxosRequest) -> avax_client::Result<UtxoPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UtxoPage {
            utxos: Vec::new(),
            end_index: UtxoIndex::default(),
            num_fetched: request.limit,
        })
    }

    async fn issue_tx(&self, _chain: ChainAlias, _tx_hex: String) -> avax_client::Result<Id> {
        Err(Error::Rpc("read-only".to_string()))
    }
}

#[tokio::test]
async fn test_fetch_follows_cursor() {
    let ctx = x_context();
    let node = MemoryNode::new(&Network::local()).unwrap();
    for tx in 1..=7u8 {
        node.add_utxo(ChainAlias::X, None, Utxo::test_transfer(tx, ctx.avax_asset_id, 5, OWNER))
            .await;
    }

    let set = fetch_utxo_set(&node, &ctx, &[OWNER], None, 3).await.unwrap();
    assert_eq!(set.len(), 7);
    assert_eq!(set.get_balance(&[OWNER], &ctx.avax_asset_id, None).unwrap(), 35);
}

#[tokio::test]
async fn test_fetch_exact_multiple_of_page_size() {
    let ctx = x_context();
    let node = MemoryNode::new(&Network::local()).unwrap();
    for tx in 1..=4u8 {
        node.add_utxo(ChainAlias::X, None, Utxo::test_transfer(tx, ctx.avax_asset_id, 1, OWNER))
            .await;
    }

    let set = fetch_utxo_set(&node, &ctx, &[OWNER], None, 2).await.unwrap();
    assert_eq!(set.len(), 4);
}

#[tokio::test]
async fn test_fetch_atomic_from_source() {
    let ctx = x_context().for_chain(ChainAlias::P);
    let node = MemoryNode::new(&Network::local()).unwrap();
    node.add_utxo(
        ChainAlias::P,
        Some(ChainAlias::X),
        Utxo::test_transfer(1, ctx.avax_asset_id, 9, OWNER),
    )
    .await;
    node.add_utxo(ChainAlias::P, None, Utxo::test_transfer(2, ctx.avax_asset_id, 1, OWNER))
        .await;

    let atomic = fetch_utxo_set(&node, &ctx, &[OWNER], Some(ctx.x_chain_id), 10)
        .await
        .unwrap();
    assert_eq!(atomic.len(), 1);

    let local = fetch_utxo_set(&node, &ctx, &[OWNER], None, 10).await.unwrap();
    assert_eq!(local.len(), 1);
}

#[tokio::test]
async fn test_hollow_full_page_is_an_error() {
    let node = HollowNode {
        calls: AtomicU32::new(0),
    };
    let err = fetch_utxo_set(&node, &x_context(), &[OWNER], None, 4)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyPage(_)));
    assert_eq!(node.calls.load(Ordering::SeqCst), 1);
}
