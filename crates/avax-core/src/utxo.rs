//! UTXOs and the per-call UTXO set snapshot

use crate::binary::{Reader, Writer};
use crate::cb58;
use crate::codec::{read_codec_version, Codec, Serializable, CODEC_VERSION};
use crate::ids::{Id, ShortId};
use crate::outputs::Output;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// UTXO key: creating transaction and output index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoId {
    /// Creating transaction
    pub tx_id: Id,
    /// Output index
    pub output_index: u32,
}

impl UtxoId {
    /// Create a UTXO ID
    pub fn new(tx_id: Id, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    fn to_raw(self) -> [u8; 36] {
        let mut raw = [0u8; 36];
        raw[..32].copy_from_slice(self.tx_id.as_bytes());
        raw[32..].copy_from_slice(&self.output_index.to_be_bytes());
        raw
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58::encode(&self.to_raw()))
    }
}

impl FromStr for UtxoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = cb58::decode(s)?;
        if raw.len() != 36 {
            return Err(Error::InvalidEncoding(format!(
                "UTXO ID must be 36 bytes, got {}",
                raw.len()
            )));
        }
        let tx_id = Id::from_slice(&raw[..32])?;
        let mut index = [0u8; 4];
        index.copy_from_slice(&raw[32..]);
        Ok(Self::new(tx_id, u32::from_be_bytes(index)))
    }
}

/// One unspent output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Creating transaction
    pub tx_id: Id,
    /// Output index
    pub output_index: u32,
    /// Asset ID
    pub asset_id: Id,
    /// Output payload
    pub output: Output,
}

impl Utxo {
    /// Create a UTXO
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, output: Output) -> Self {
        Self {
            tx_id,
            output_index,
            asset_id,
            output,
        }
    }

    /// Key of this UTXO
    pub fn id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    /// Decode the node's CB58 or `0x` hex UTXO string
    pub fn from_string(codec: Codec, s: &str) -> Result<Self> {
        let bytes = cb58::decode_any(s)?;
        Self::decode(codec, &bytes)
    }

    /// Decode raw bytes, rejecting trailing data
    pub fn decode(codec: Codec, bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let utxo = Self::read_from(codec, &mut r)?;
        r.finish()?;
        Ok(utxo)
    }

    /// Encode as the node's CB58 string
    pub fn to_cb58(&self, codec: Codec) -> Result<String> {
        Ok(cb58::encode(&self.to_bytes(codec)?))
    }
}

impl Serializable for Utxo {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        w.write_u16(CODEC_VERSION);
        w.write_bytes(self.tx_id.as_bytes());
        w.write_u32(self.output_index);
        w.write_bytes(self.asset_id.as_bytes());
        self.output.write_to(codec, w)
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        read_codec_version(r)?;
        let tx_id = Id(r.read_array()?);
        let output_index = r.read_u32()?;
        let asset_id = Id(r.read_array()?);
        let output = Output::read_from(codec, r)?;
        Ok(Self::new(tx_id, output_index, asset_id, output))
    }
}

/// A UTXO as the node or caller hands it over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawUtxo {
    /// CB58 or checksummed `0x` hex string
    Encoded(String),
    /// Raw codec bytes
    Bytes(Vec<u8>),
    /// Already decoded
    Parsed(Utxo),
}

impl RawUtxo {
    /// Decode into a [`Utxo`]
    pub fn parse(&self, codec: Codec) -> Result<Utxo> {
        match self {
            RawUtxo::Encoded(s) => Utxo::from_string(codec, s),
            RawUtxo::Bytes(bytes) => Utxo::decode(codec, bytes),
            RawUtxo::Parsed(utxo) => Ok(utxo.clone()),
        }
    }
}

impl From<&str> for RawUtxo {
    fn from(s: &str) -> Self {
        RawUtxo::Encoded(s.to_string())
    }
}

impl From<String> for RawUtxo {
    fn from(s: String) -> Self {
        RawUtxo::Encoded(s)
    }
}

impl From<Vec<u8>> for RawUtxo {
    fn from(bytes: Vec<u8>) -> Self {
        RawUtxo::Bytes(bytes)
    }
}

impl From<Utxo> for RawUtxo {
    fn from(utxo: Utxo) -> Self {
        RawUtxo::Parsed(utxo)
    }
}

/// UTXOs fetched for one transaction build, in insertion order
#[derive(Debug, Clone)]
pub struct UtxoSet {
    codec: Codec,
    skip_malformed: bool,
    order: Vec<UtxoId>,
    utxos: HashMap<UtxoId, Utxo>,
}

impl UtxoSet {
    /// Empty set decoding with `codec`
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            skip_malformed: false,
            order: Vec::new(),
            utxos: HashMap::new(),
        }
    }

    /// Log and skip malformed raw UTXOs instead of failing
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// Codec used to decode raw UTXOs
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Add a UTXO. Returns `false` if it was already present and `overwrite`
    /// is unset. An overwrite keeps the original insertion position.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> bool {
        let id = utxo.id();
        if self.utxos.contains_key(&id) {
            if !overwrite {
                return false;
            }
        } else {
            self.order.push(id);
        }
        self.utxos.insert(id, utxo);
        true
    }

    /// Decode and add one raw UTXO
    pub fn add_raw(&mut self, raw: &RawUtxo, overwrite: bool) -> Result<bool> {
        let utxo = raw.parse(self.codec)?;
        Ok(self.add(utxo, overwrite))
    }

    /// Decode and add many raw UTXOs, returning the IDs actually added
    pub fn add_array(&mut self, raws: &[RawUtxo], overwrite: bool) -> Result<Vec<UtxoId>> {
        let mut added = Vec::new();
        for (i, raw) in raws.iter().enumerate() {
            let utxo = match raw.parse(self.codec) {
                Ok(utxo) => utxo,
                Err(e) if self.skip_malformed => {
                    tracing::warn!("Skipping malformed UTXO at position {}: {}", i, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let id = utxo.id();
            if self.add(utxo, overwrite) {
                added.push(id);
            }
        }
        tracing::debug!("Added {} of {} UTXOs", added.len(), raws.len());
        Ok(added)
    }

    /// Look up by ID
    pub fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(id)
    }

    /// Whether `id` is present
    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Remove by ID
    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo> {
        let utxo = self.utxos.remove(id)?;
        self.order.retain(|o| o != id);
        Some(utxo)
    }

    /// Remove many, returning those that were present
    pub fn remove_array(&mut self, ids: &[UtxoId]) -> Vec<Utxo> {
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }

    /// All UTXOs in insertion order
    pub fn get_all_utxos(&self) -> Vec<&Utxo> {
        self.iter().collect()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> + '_ {
        self.order.iter().filter_map(move |id| self.utxos.get(id))
    }

    /// All UTXO IDs in insertion order
    pub fn get_utxo_ids(&self) -> Vec<UtxoId> {
        self.order.clone()
    }

    /// IDs of UTXOs owned by any of `addresses`.
    ///
    /// With `spendable_as_of`, only UTXOs those addresses can spend at that
    /// time are returned.
    pub fn get_utxo_ids_by_addresses(
        &self,
        addresses: &[ShortId],
        spendable_as_of: Option<u64>,
    ) -> Vec<UtxoId> {
        self.iter()
            .filter(|utxo| match spendable_as_of {
                Some(as_of) => is_spendable(utxo, addresses, as_of),
                None => utxo.output.owners().contains_any(addresses),
            })
            .map(Utxo::id)
            .collect()
    }

    /// Total of `asset_id` held by `addresses`, optionally only what is
    /// spendable at `spendable_as_of`
    pub fn get_balance(
        &self,
        addresses: &[ShortId],
        asset_id: &Id,
        spendable_as_of: Option<u64>,
    ) -> Result<u64> {
        self.get_utxo_ids_by_addresses(addresses, spendable_as_of)
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|utxo| utxo.asset_id == *asset_id)
            .try_fold(0u64, |acc, utxo| {
                acc.checked_add(utxo.output.amount()).ok_or_else(|| {
                    Error::AmountOverflow(format!("balance of {} overflows u64", asset_id))
                })
            })
    }

    /// Distinct asset IDs, first-seen order, optionally filtered by owner
    pub fn get_asset_ids(&self, addresses: Option<&[ShortId]>) -> Vec<Id> {
        let mut seen = Vec::new();
        for utxo in self.iter() {
            if let Some(addrs) = addresses {
                if !utxo.output.owners().contains_any(addrs) {
                    continue;
                }
            }
            if !seen.contains(&utxo.asset_id) {
                seen.push(utxo.asset_id);
            }
        }
        seen
    }

    /// Number of UTXOs
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Whether `from` can spend `utxo` at `as_of`: the value is transferable, any
/// stakeable lock has expired, and the owner threshold is satisfiable.
pub fn is_spendable(utxo: &Utxo, from: &[ShortId], as_of: u64) -> bool {
    utxo.output.is_transferable()
        && utxo.output.stake_locktime() <= as_of
        && utxo.output.owners().spenders(from, as_of).is_some()
}

// Test helpers
#[cfg(any(test, feature = "test-helpers"))]
impl Utxo {
    /// Plain transfer UTXO with a single owner (for testing only)
    pub fn test_transfer(tx: u8, asset_id: Id, amount: u64, owner: ShortId) -> Self {
        Self::new(
            Id([tx; 32]),
            0,
            asset_id,
            Output::transfer(amount, crate::outputs::OutputOwners::single(owner)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::{OutputOwners, SecpTransferOutput, StakeableLockOut};

    fn addr(b: u8) -> ShortId {
        ShortId([b; 20])
    }

    fn utxo(tx: u8, index: u32, asset: u8, amount: u64, owner: u8) -> Utxo {
        Utxo::new(
            Id([tx; 32]),
            index,
            Id([asset; 32]),
            Output::transfer(amount, OutputOwners::single(addr(owner))),
        )
    }

    #[test]
    fn test_utxo_roundtrip_and_strings() {
        let u = utxo(1, 3, 2, 500, 9);
        let bytes = u.to_bytes(Codec::Avm).unwrap();
        assert_eq!(&bytes[..2], &[0, 0]);
        assert_eq!(Utxo::decode(Codec::Avm, &bytes).unwrap(), u);

        let s = u.to_cb58(Codec::Avm).unwrap();
        assert_eq!(Utxo::from_string(Codec::Avm, &s).unwrap(), u);
        let hex = cb58::encode_hex(&bytes);
        assert_eq!(Utxo::from_string(Codec::Avm, &hex).unwrap(), u);
    }

    #[test]
    fn test_utxo_id_string() {
        let id = UtxoId::new(Id([4; 32]), 7);
        let s = id.to_string();
        assert_eq!(s.parse::<UtxoId>().unwrap(), id);
        assert!(Id([4; 32]).to_string().parse::<UtxoId>().is_err());
    }

    #[test]
    fn test_insertion_order_and_overwrite() {
        let mut set = UtxoSet::new(Codec::Avm);
        assert!(set.add(utxo(3, 0, 1, 10, 1), false));
        assert!(set.add(utxo(1, 0, 1, 20, 1), false));
        assert!(set.add(utxo(2, 0, 1, 30, 1), false));

        let order: Vec<u8> = set.get_all_utxos().iter().map(|u| u.tx_id.0[0]).collect();
        assert_eq!(order, vec![3, 1, 2]);

        assert!(!set.add(utxo(1, 0, 1, 99, 1), false));
        assert_eq!(set.get(&UtxoId::new(Id([1; 32]), 0)).unwrap().output.amount(), 20);

        assert!(set.add(utxo(1, 0, 1, 99, 1), true));
        assert_eq!(set.get(&UtxoId::new(Id([1; 32]), 0)).unwrap().output.amount(), 99);
        let order: Vec<u8> = set.get_all_utxos().iter().map(|u| u.tx_id.0[0]).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_array_malformed() {
        let good: RawUtxo = utxo(1, 0, 1, 10, 1).to_cb58(Codec::Avm).unwrap().into();
        let bad: RawUtxo = "definitely-not-a-utxo".into();

        let mut strict = UtxoSet::new(Codec::Avm);
        assert!(strict.add_array(&[good.clone(), bad.clone()], false).is_err());

        let mut lenient = UtxoSet::new(Codec::Avm).with_skip_malformed(true);
        let added = lenient.add_array(&[good, bad], false).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn test_add_array_bytes_reject_trailing() {
        let mut bytes = utxo(1, 0, 1, 10, 1).to_bytes(Codec::Avm).unwrap();
        bytes.push(0);
        let mut set = UtxoSet::new(Codec::Avm);
        assert!(set.add_array(&[bytes.into()], false).is_err());
    }

    #[test]
    fn test_remove() {
        let mut set = UtxoSet::new(Codec::Avm);
        set.add(utxo(1, 0, 1, 10, 1), false);
        set.add(utxo(2, 0, 1, 10, 1), false);
        let id = UtxoId::new(Id([1; 32]), 0);
        assert!(set.contains(&id));
        assert!(set.remove(&id).is_some());
        assert!(!set.contains(&id));
        assert_eq!(set.get_utxo_ids(), vec![UtxoId::new(Id([2; 32]), 0)]);
        assert_eq!(set.remove_array(&[id, UtxoId::new(Id([2; 32]), 0)]).len(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_balances_and_assets() {
        let mut set = UtxoSet::new(Codec::Pvm);
        set.add(utxo(1, 0, 0xaa, 10, 1), false);
        set.add(utxo(2, 0, 0xbb, 7, 1), false);
        set.add(utxo(3, 0, 0xaa, 5, 2), false);
        set.add(
            Utxo::new(
                Id([4; 32]),
                0,
                Id([0xaa; 32]),
                Output::StakeableLock(StakeableLockOut {
                    locktime: 1_000,
                    transfer: SecpTransferOutput::new(100, OutputOwners::single(addr(1))),
                }),
            ),
            false,
        );

        let avax = Id([0xaa; 32]);
        assert_eq!(set.get_balance(&[addr(1)], &avax, None).unwrap(), 110);
        assert_eq!(set.get_balance(&[addr(1)], &avax, Some(999)).unwrap(), 10);
        assert_eq!(set.get_balance(&[addr(1)], &avax, Some(1_000)).unwrap(), 110);
        assert_eq!(set.get_balance(&[addr(1), addr(2)], &avax, Some(0)).unwrap(), 15);

        assert_eq!(set.get_asset_ids(None), vec![avax, Id([0xbb; 32])]);
        assert_eq!(set.get_asset_ids(Some(&[addr(2)])), vec![avax]);
        assert_eq!(set.get_utxo_ids_by_addresses(&[addr(2)], None).len(), 1);
    }
}
