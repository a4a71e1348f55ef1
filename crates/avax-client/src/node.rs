//! Requests and responses the wallet exchanges with a node

use crate::Result;
use async_trait::async_trait;
use avax_core::Id;
use avax_params::ChainAlias;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Pagination cursor returned by `getUTXOs`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoIndex {
    /// Address the page ended on
    pub address: String,
    /// UTXO ID the page ended on
    pub utxo: String,
}

/// Parameters of `getUTXOs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosRequest {
    /// Chain queried
    #[serde(skip)]
    pub chain: Option<ChainAlias>,
    /// Owner addresses, `ALIAS-hrp1...`
    pub addresses: Vec<String>,
    /// Set to fetch atomic UTXOs exported from this chain
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_chain: Option<String>,
    /// Page size
    pub limit: u32,
    /// Cursor from the previous page
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_index: Option<UtxoIndex>,
    /// UTXO string encoding
    pub encoding: String,
}

impl GetUtxosRequest {
    /// First page for `addresses` on `chain`
    pub fn new(chain: ChainAlias, addresses: Vec<String>, limit: u32) -> Self {
        Self {
            chain: Some(chain),
            addresses,
            source_chain: None,
            limit,
            start_index: None,
            encoding: "hex".to_string(),
        }
    }

    /// Fetch atomic UTXOs exported from `source_chain`
    pub fn from_source(mut self, source_chain: Id) -> Self {
        self.source_chain = Some(source_chain.to_cb58());
        self
    }
}

/// One page of `getUTXOs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoPage {
    /// UTXOs in CB58 or checksummed hex
    pub utxos: Vec<String>,
    /// Cursor for the next page
    pub end_index: UtxoIndex,
    /// Number of UTXOs in this page
    #[serde(serialize_with = "u32_as_string", deserialize_with = "u32_from_string")]
    pub num_fetched: u32,
}

// The node encodes counts as decimal strings
fn u32_as_string<S: Serializer>(value: &u32, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

fn u32_from_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Text(String),
        Number(u32),
    }
    match Count::deserialize(d)? {
        Count::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Count::Number(n) => Ok(n),
    }
}

/// What the wallet needs from a node
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch one page of UTXOs
    async fn get_utxos(&self, request: GetUtxosRequest) -> Result<UtxoPage>;

    /// Submit a signed transaction in checksummed hex, returning its ID
    async fn issue_tx(&self, chain: ChainAlias, tx_hex: String) -> Result<Id>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_node_json() {
        let json = r#"{
            "numFetched": "2",
            "utxos": ["0x00", "0x01"],
            "endIndex": {"address": "X-local1abc", "utxo": "2Qr7"}
        }"#;
        let page: UtxoPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.num_fetched, 2);
        assert_eq!(page.utxos.len(), 2);
        assert_eq!(page.end_index.utxo, "2Qr7");

        let back = serde_json::to_value(&page).unwrap();
        assert_eq!(back["numFetched"], "2");
    }

    #[test]
    fn test_request_params() {
        let request = GetUtxosRequest::new(ChainAlias::X, vec!["X-local1abc".to_string()], 100)
            .from_source(Id::EMPTY);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["limit"], 100);
        assert_eq!(value["encoding"], "hex");
        assert_eq!(value["sourceChain"], "11111111111111111111111111111111LpoYY");
        assert!(value.get("startIndex").is_none());
        assert!(value.get("chain").is_none());
    }
}
