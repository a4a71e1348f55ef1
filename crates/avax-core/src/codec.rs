//! Per-VM codec: type-ID registry and the [`Serializable`] contract
//!
//! Each chain family registers its own numbering for polymorphic structures.
//! The same numeric ID can mean different things on different chains (`0` is
//! an AVM `BaseTx` but an EVM `ImportTx`), so a [`Codec`] value is always
//! passed explicitly when encoding or decoding.

use crate::binary::{Reader, Writer};
use crate::{Error, Result};
use avax_params::ChainAlias;
use std::fmt;

/// Codec version prefixed to transactions and UTXOs
pub const CODEC_VERSION: u16 = 0;

/// Chain family whose type-ID table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// X-chain
    Avm,
    /// P-chain
    Pvm,
    /// C-chain atomic transactions
    Evm,
}

/// Polymorphic structure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// secp256k1 transfer input
    SecpTransferInput,
    /// secp256k1 mint output
    SecpMintOutput,
    /// secp256k1 transfer output
    SecpTransferOutput,
    /// secp256k1 credential
    SecpCredential,
    /// secp256k1 owner output (rewards and subnet owners)
    SecpOwnerOutput,
    /// Stakeable lock wrapper around a transfer input
    StakeableLockIn,
    /// Stakeable lock wrapper around a transfer output
    StakeableLockOut,
    /// AVM base transaction
    BaseTx,
    /// Atomic import
    ImportTx,
    /// Atomic export
    ExportTx,
    /// Primary network validator
    AddValidatorTx,
    /// Primary network delegator
    AddDelegatorTx,
    /// Subnet creation
    CreateSubnetTx,
}

static SECP_TYPES: [(TypeKind, u32); 4] = [
    (TypeKind::SecpTransferInput, 5),
    (TypeKind::SecpMintOutput, 6),
    (TypeKind::SecpTransferOutput, 7),
    (TypeKind::SecpCredential, 9),
];

static AVM_TYPES: [(TypeKind, u32); 3] = [
    (TypeKind::BaseTx, 0),
    (TypeKind::ImportTx, 3),
    (TypeKind::ExportTx, 4),
];

static PVM_TYPES: [(TypeKind, u32); 8] = [
    (TypeKind::SecpOwnerOutput, 11),
    (TypeKind::AddValidatorTx, 12),
    (TypeKind::AddDelegatorTx, 14),
    (TypeKind::CreateSubnetTx, 16),
    (TypeKind::ImportTx, 17),
    (TypeKind::ExportTx, 18),
    (TypeKind::StakeableLockIn, 21),
    (TypeKind::StakeableLockOut, 22),
];

static EVM_TYPES: [(TypeKind, u32); 3] = [
    (TypeKind::ImportTx, 0),
    (TypeKind::ExportTx, 1),
    (TypeKind::SecpOwnerOutput, 11),
];

impl Codec {
    /// Codec of the chain named by `alias`
    pub fn for_chain(alias: ChainAlias) -> Self {
        match alias {
            ChainAlias::X => Codec::Avm,
            ChainAlias::P => Codec::Pvm,
            ChainAlias::C => Codec::Evm,
        }
    }

    fn table(&self) -> &'static [(TypeKind, u32)] {
        match self {
            Codec::Avm => &AVM_TYPES,
            Codec::Pvm => &PVM_TYPES,
            Codec::Evm => &EVM_TYPES,
        }
    }

    fn entries(&self) -> impl Iterator<Item = &'static (TypeKind, u32)> {
        SECP_TYPES.iter().chain(self.table().iter())
    }

    /// Numeric type ID for `kind`
    pub fn type_id(&self, kind: TypeKind) -> Result<u32> {
        self.entries()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .ok_or_else(|| {
                Error::UnknownTypeId(format!("{:?} is not registered on {}", kind, self))
            })
    }

    /// Kind registered under `type_id`
    pub fn kind_of(&self, type_id: u32) -> Result<TypeKind> {
        self.entries()
            .find(|(_, id)| *id == type_id)
            .map(|(k, _)| *k)
            .ok_or_else(|| Error::UnknownTypeId(format!("{} on {}", type_id, self)))
    }

    /// Write the type ID for `kind`
    pub fn write_type(&self, w: &mut Writer, kind: TypeKind) -> Result<()> {
        w.write_u32(self.type_id(kind)?);
        Ok(())
    }

    /// Read a type ID and resolve it
    pub fn read_type(&self, r: &mut Reader<'_>) -> Result<TypeKind> {
        let type_id = r.read_u32()?;
        self.kind_of(type_id)
    }

    /// Read a type ID that must be `expected`
    pub fn expect_type(&self, r: &mut Reader<'_>, expected: TypeKind) -> Result<()> {
        let kind = self.read_type(r)?;
        if kind != expected {
            return Err(Error::UnknownTypeId(format!(
                "expected {:?}, found {:?}",
                expected, kind
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Avm => write!(f, "avm"),
            Codec::Pvm => write!(f, "platformvm"),
            Codec::Evm => write!(f, "evm"),
        }
    }
}

/// Read the leading codec version, rejecting anything but [`CODEC_VERSION`]
pub fn read_codec_version(r: &mut Reader<'_>) -> Result<u16> {
    let version = r.read_u16()?;
    if version != CODEC_VERSION {
        return Err(Error::InvalidEncoding(format!(
            "unsupported codec version {}",
            version
        )));
    }
    Ok(version)
}

/// Binary wire form of a structure
pub trait Serializable: Sized {
    /// Append the wire form to `w`
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()>;

    /// Parse one value from `r`
    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self>;

    /// Encode to a fresh buffer
    fn to_bytes(&self, codec: Codec) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write_to(codec, &mut w)?;
        Ok(w.into_bytes())
    }

    /// Decode one value at `offset`, returning it with the next unread offset
    fn from_bytes(codec: Codec, bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::at(bytes, offset)?;
        let value = Self::read_from(codec, &mut r)?;
        Ok((value, r.offset()))
    }
}

/// Write a u32 count followed by each item
pub fn write_vec<T: Serializable>(codec: Codec, w: &mut Writer, items: &[T]) -> Result<()> {
    w.write_len(items.len())?;
    for item in items {
        item.write_to(codec, w)?;
    }
    Ok(())
}

/// Read a u32 count followed by that many items
///
/// `min_item_size` bounds the count against the remaining input.
pub fn read_vec<T: Serializable>(
    codec: Codec,
    r: &mut Reader<'_>,
    min_item_size: usize,
) -> Result<Vec<T>> {
    let len = r.read_len(min_item_size)?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(T::read_from(codec, r)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_secp_ids() {
        for codec in [Codec::Avm, Codec::Pvm, Codec::Evm] {
            assert_eq!(codec.type_id(TypeKind::SecpTransferInput).unwrap(), 5);
            assert_eq!(codec.type_id(TypeKind::SecpTransferOutput).unwrap(), 7);
            assert_eq!(codec.type_id(TypeKind::SecpCredential).unwrap(), 9);
        }
    }

    #[test]
    fn test_tx_ids_differ_by_vm() {
        assert_eq!(Codec::Avm.type_id(TypeKind::ImportTx).unwrap(), 3);
        assert_eq!(Codec::Pvm.type_id(TypeKind::ImportTx).unwrap(), 17);
        assert_eq!(Codec::Evm.type_id(TypeKind::ImportTx).unwrap(), 0);
        assert_eq!(Codec::Avm.kind_of(0).unwrap(), TypeKind::BaseTx);
        assert_eq!(Codec::Evm.kind_of(0).unwrap(), TypeKind::ImportTx);
    }

    #[test]
    fn test_unregistered_kinds() {
        assert!(matches!(
            Codec::Avm.type_id(TypeKind::StakeableLockOut),
            Err(Error::UnknownTypeId(_))
        ));
        assert!(matches!(Codec::Pvm.kind_of(999), Err(Error::UnknownTypeId(_))));
        assert!(matches!(Codec::Evm.kind_of(22), Err(Error::UnknownTypeId(_))));
    }

    #[test]
    fn test_expect_type() {
        let bytes = 7u32.to_be_bytes();
        let mut r = Reader::new(&bytes);
        assert!(Codec::Avm.expect_type(&mut r, TypeKind::SecpTransferOutput).is_ok());

        let mut r = Reader::new(&bytes);
        assert!(Codec::Avm.expect_type(&mut r, TypeKind::SecpMintOutput).is_err());
    }

    #[test]
    fn test_codec_version() {
        let mut r = Reader::new(&[0, 0]);
        assert_eq!(read_codec_version(&mut r).unwrap(), 0);
        let mut r = Reader::new(&[0, 1]);
        assert!(matches!(read_codec_version(&mut r), Err(Error::InvalidEncoding(_))));
    }
}
