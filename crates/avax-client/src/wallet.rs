//! End-to-end wallet flows: fetch UTXOs, build, sign, issue

use crate::fetch::{fetch_utxo_set, DEFAULT_PAGE_SIZE};
use crate::node::NodeClient;
use crate::Result;
use avax_core::{
    AddressInput, ChainContext, Error as CoreError, EthAddress, Id, IdInput, IssuePayload,
    KeyChain, ShortId, SpendOptions, Tx, TxBuilder, UnsignedTx, UtxoSet,
};
use avax_params::{ChainAlias, Network};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wallet over the three primary-network chains, backed by one keychain
pub struct ChainWallet<C: NodeClient> {
    client: C,
    x: ChainContext,
    p: ChainContext,
    c: ChainContext,
    keychain: KeyChain,
    page_size: u32,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl<C: NodeClient> ChainWallet<C> {
    /// Create a wallet for `network` that signs with `keychain`
    pub fn new(client: C, network: &Network, keychain: KeyChain) -> Result<Self> {
        let x = ChainContext::from_network(network, ChainAlias::X)?;
        Ok(Self {
            client,
            p: x.for_chain(ChainAlias::P),
            c: x.for_chain(ChainAlias::C),
            x,
            keychain,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the `getUTXOs` page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Node client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Signing keys
    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    /// Context of one chain
    pub fn context(&self, alias: ChainAlias) -> &ChainContext {
        match alias {
            ChainAlias::X => &self.x,
            ChainAlias::P => &self.p,
            ChainAlias::C => &self.c,
        }
    }

    fn spend_options(&self) -> SpendOptions {
        SpendOptions::new(self.keychain.addresses()).as_of(now())
    }

    fn first_address(&self) -> Result<ShortId> {
        self.keychain
            .addresses()
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::KeyNotFound("keychain is empty".to_string()).into())
    }

    async fn utxos(&self, ctx: &ChainContext, source: Option<ChainAlias>) -> Result<UtxoSet> {
        let source = source.map(|alias| ctx.chain_id(alias));
        fetch_utxo_set(
            &self.client,
            ctx,
            &self.keychain.addresses(),
            source,
            self.page_size,
        )
        .await
    }

    async fn sign_and_issue(&self, ctx: &ChainContext, unsigned: UnsignedTx) -> Result<Id> {
        let tx = Tx::sign(unsigned, &self.keychain)?;
        let hex = IssuePayload::from(&tx).to_hex(ctx.codec())?;
        let tx_id = self.client.issue_tx(ctx.alias, hex).await?;
        tracing::info!("Issued {} on {}-chain", tx_id, ctx.alias);
        Ok(tx_id)
    }

    /// Send `amount` of `asset` to `to` on the X-chain
    pub async fn send(
        &self,
        amount: u64,
        asset: &IdInput,
        to: &[AddressInput],
        memo: &[u8],
    ) -> Result<Id> {
        let ctx = &self.x;
        let utxos = self.utxos(ctx, None).await?;
        let opts = self.spend_options().with_memo(memo);
        let unsigned = TxBuilder::new(ctx).build_base_tx(&utxos, amount, asset, to, &opts)?;
        tracing::info!("Sending {} on X-chain to {} owner(s)", amount, to.len());
        self.sign_and_issue(ctx, unsigned).await
    }

    /// Export `amount` of the primary asset from `source` (X or P) to
    /// `destination`, owned there by `to`
    pub async fn export(
        &self,
        source: ChainAlias,
        destination: ChainAlias,
        amount: u64,
        to: &[AddressInput],
    ) -> Result<Id> {
        let ctx = self.context(source);
        let utxos = self.utxos(ctx, None).await?;
        let unsigned = TxBuilder::new(ctx).build_export_tx(
            &utxos,
            amount,
            &ctx.avax_asset_id.into(),
            &ctx.chain_id(destination).into(),
            to,
            &self.spend_options(),
        )?;
        tracing::info!(
            "Exporting {} from {}-chain to {}-chain",
            amount,
            source,
            destination
        );
        self.sign_and_issue(ctx, unsigned).await
    }

    /// Export `amount` of the primary asset from the C-chain account
    /// `from` to `destination`
    pub async fn export_evm(
        &self,
        destination: ChainAlias,
        amount: u64,
        to: &[AddressInput],
        from: EthAddress,
        nonce: u64,
    ) -> Result<Id> {
        let ctx = &self.c;
        let unsigned = TxBuilder::new(ctx).build_evm_export_tx(
            amount,
            &ctx.avax_asset_id.into(),
            &ctx.chain_id(destination).into(),
            to,
            from,
            nonce,
            &self.spend_options(),
        )?;
        tracing::info!(
            "Exporting {} from C-chain account {} to {}-chain",
            amount,
            from,
            destination
        );
        self.sign_and_issue(ctx, unsigned).await
    }

    /// Import everything exported from `source` into `destination`.
    ///
    /// On X and P the outputs go to the first keychain address; on C the
    /// balance is credited to that key's EVM account.
    pub async fn import(&self, destination: ChainAlias, source: ChainAlias) -> Result<Id> {
        let ctx = self.context(destination);
        let owner = self.first_address()?;
        let atomic = self.utxos(ctx, Some(source)).await?;
        let builder = TxBuilder::new(ctx);
        let opts = self.spend_options();
        let source_chain: IdInput = ctx.chain_id(source).into();

        let unsigned = match destination {
            ChainAlias::C => {
                let to = self.keychain.get_key_or_fail(&owner)?.eth_address();
                builder.build_evm_import_tx(&atomic, &source_chain, to, &opts)?
            }
            ChainAlias::X | ChainAlias::P => {
                let local = self.utxos(ctx, None).await?;
                builder.build_import_tx(&local, &atomic, &source_chain, &[owner.into()], &opts)?
            }
        };
        tracing::info!(
            "Importing {} atomic UTXOs from {}-chain into {}-chain",
            atomic.len(),
            source,
            destination
        );
        self.sign_and_issue(ctx, unsigned).await
    }
}
