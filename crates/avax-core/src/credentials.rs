//! Credentials: the signatures authorizing one input

use crate::binary::{Reader, Writer};
use crate::codec::{Codec, Serializable, TypeKind};
use crate::{Error, Result};
use std::fmt;

/// Recoverable signature length: r (32) || s (32) || recovery id (1)
pub const SIGNATURE_LEN: usize = 65;

/// Recoverable secp256k1 signature
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    /// Build from a slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            Error::Signing(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Signatures for one input, in signature-index order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    /// Signatures
    pub signatures: Vec<Signature>,
}

impl Credential {
    /// Create a credential
    pub fn new(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }
}

impl Serializable for Credential {
    fn write_to(&self, codec: Codec, w: &mut Writer) -> Result<()> {
        codec.write_type(w, TypeKind::SecpCredential)?;
        w.write_len(self.signatures.len())?;
        for sig in &self.signatures {
            w.write_bytes(sig.as_bytes());
        }
        Ok(())
    }

    fn read_from(codec: Codec, r: &mut Reader<'_>) -> Result<Self> {
        codec.expect_type(r, TypeKind::SecpCredential)?;
        let len = r.read_len(SIGNATURE_LEN)?;
        let mut signatures = Vec::with_capacity(len);
        for _ in 0..len {
            signatures.push(Signature(r.read_array()?));
        }
        Ok(Self { signatures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_layout() {
        let cred = Credential::new(vec![Signature([0x11; 65]), Signature([0x22; 65])]);
        let bytes = cred.to_bytes(Codec::Avm).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 2 * 65);
        assert_eq!(&bytes[..4], &9u32.to_be_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_be_bytes());

        for codec in [Codec::Avm, Codec::Pvm, Codec::Evm] {
            let (back, next) = Credential::from_bytes(codec, &bytes, 0).unwrap();
            assert_eq!(back, cred);
            assert_eq!(next, bytes.len());
        }
    }

    #[test]
    fn test_truncated_credential() {
        let bytes = Credential::new(vec![Signature([1; 65])])
            .to_bytes(Codec::Avm)
            .unwrap();
        assert!(matches!(
            Credential::from_bytes(Codec::Avm, &bytes[..bytes.len() - 1], 0),
            Err(Error::BufferUnderflow(_))
        ));
    }

    #[test]
    fn test_signature_from_slice() {
        assert!(Signature::from_slice(&[0u8; 64]).is_err());
        assert!(Signature::from_slice(&[0u8; 65]).is_ok());
    }
}
