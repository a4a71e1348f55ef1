//! Paginated UTXO fetching

use crate::node::{GetUtxosRequest, NodeClient};
use crate::{Error, Result};
use avax_core::{format_address, ChainContext, Id, RawUtxo, ShortId, UtxoSet};

/// Page size the node accepts by default
pub const DEFAULT_PAGE_SIZE: u32 = 1024;

/// Fetch every UTXO owned by `addresses` on `ctx`'s chain.
///
/// With `source_chain`, fetches the atomic UTXOs exported from that chain
/// instead. Pages until the node returns a short page.
pub async fn fetch_utxo_set(
    client: &dyn NodeClient,
    ctx: &ChainContext,
    addresses: &[ShortId],
    source_chain: Option<Id>,
    page_size: u32,
) -> Result<UtxoSet> {
    let encoded = addresses
        .iter()
        .map(|a| format_address(ctx.alias.as_str(), &ctx.hrp, a))
        .collect::<avax_core::Result<Vec<_>>>()?;

    let mut request = GetUtxosRequest::new(ctx.alias, encoded, page_size);
    if let Some(source) = source_chain {
        request = request.from_source(source);
    }

    let mut set = UtxoSet::new(ctx.codec());
    let mut pages = 0u32;
    loop {
        let page = client.get_utxos(request.clone()).await?;
        pages += 1;

        if page.utxos.is_empty() && page.num_fetched >= page_size {
            return Err(Error::EmptyPage(format!(
                "page {} on {}-chain claims {} UTXOs but carries none",
                pages, ctx.alias, page.num_fetched
            )));
        }

        let raws: Vec<RawUtxo> = page.utxos.iter().map(|s| RawUtxo::from(s.as_str())).collect();
        set.add_array(&raws, false)?;

        tracing::debug!(
            "UTXO page {} on {}-chain: {} fetched, {} total",
            pages,
            ctx.alias,
            page.num_fetched,
            set.len()
        );

        if page.num_fetched < page_size {
            break;
        }
        request.start_index = Some(page.end_index);
    }

    tracing::info!(
        "Fetched {} UTXOs on {}-chain in {} pages",
        set.len(),
        ctx.alias,
        pages
    );
    Ok(set)
}
