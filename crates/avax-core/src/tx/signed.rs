//! Signed transactions: unsigned body plus one credential per input

use super::unsigned::{CredentialSigners, UnsignedTx};
use crate::binary::{Reader, Writer};
use crate::cb58;
use crate::codec::{Codec, Serializable};
use crate::credentials::{Credential, SIGNATURE_LEN};
use crate::ids::Id;
use crate::keychain::{eth_address_from_public_key, recover_address, recover_public_key, KeyChain};
use crate::{Error, Result};

// typeID + count
const MIN_CREDENTIAL_LEN: usize = 4 + 4;

/// A transaction ready to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    /// Transaction body
    pub unsigned: UnsignedTx,
    /// Credentials, aligned with [`UnsignedTx::credential_signers`]
    pub credentials: Vec<Credential>,
}

impl Tx {
    /// Wrap a body and its credentials
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    /// Sign every input of `unsigned` with keys from `keychain`.
    ///
    /// Each credential carries one signature per signer named by its input,
    /// in signature-index order. Fails with [`Error::KeyNotFound`] if any
    /// signer is missing from the keychain.
    pub fn sign(unsigned: UnsignedTx, keychain: &KeyChain) -> Result<Self> {
        let digest = unsigned.signing_hash()?;
        let mut credentials = Vec::new();

        for signers in unsigned.credential_signers()? {
            let signatures = match signers {
                CredentialSigners::Owners(addresses) => addresses
                    .iter()
                    .map(|address| keychain.get_key_or_fail(address)?.sign(&digest))
                    .collect::<Result<Vec<_>>>()?,
                CredentialSigners::Account(eth_address) => {
                    vec![keychain
                        .get_key_by_eth_address_or_fail(&eth_address)?
                        .sign(&digest)?]
                }
            };
            credentials.push(Credential::new(signatures));
        }

        tracing::info!(
            "Signed {:?} on {}: {} credentials",
            unsigned.kind(),
            unsigned.codec(),
            credentials.len()
        );

        Ok(Self::new(unsigned, credentials))
    }

    /// Signed bytes: unsigned bytes followed by the credentials
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let codec = self.unsigned.codec();
        let mut w = Writer::new();
        self.unsigned.write_to(&mut w)?;
        w.write_len(self.credentials.len())?;
        for cred in &self.credentials {
            cred.write_to(codec, &mut w)?;
        }
        Ok(w.into_bytes())
    }

    /// Decode a signed transaction, rejecting trailing bytes
    pub fn from_bytes(codec: Codec, bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let unsigned = UnsignedTx::read_from(codec, &mut r)?;
        let len = r.read_len(MIN_CREDENTIAL_LEN)?;
        let mut credentials = Vec::with_capacity(len);
        for _ in 0..len {
            credentials.push(Credential::read_from(codec, &mut r)?);
        }
        r.finish()?;
        Ok(Self::new(unsigned, credentials))
    }

    /// CB58 form
    pub fn to_cb58(&self) -> Result<String> {
        Ok(cb58::encode(&self.to_bytes()?))
    }

    /// Checksummed `0x` hex form, as submitted to `issueTx`
    pub fn to_string_hex(&self) -> Result<String> {
        Ok(cb58::encode_hex(&self.to_bytes()?))
    }

    /// Decode from CB58 or checksummed hex
    pub fn from_string(codec: Codec, s: &str) -> Result<Self> {
        Self::from_bytes(codec, &cb58::decode_any(s)?)
    }

    /// Transaction ID: sha256 of the signed bytes
    pub fn tx_id(&self) -> Result<Id> {
        Ok(Id::hash(&self.to_bytes()?))
    }

    /// Check every signature recovers to the signer its input names.
    ///
    /// Inputs decoded from bytes need [`UnsignedTx::attach_signers`] first.
    pub fn verify_signatures(&self) -> Result<()> {
        let digest = self.unsigned.signing_hash()?;
        let expected = self.unsigned.credential_signers()?;
        if expected.len() != self.credentials.len() {
            return Err(Error::Signing(format!(
                "{} inputs but {} credentials",
                expected.len(),
                self.credentials.len()
            )));
        }

        for (position, (signers, cred)) in expected.iter().zip(&self.credentials).enumerate() {
            match signers {
                CredentialSigners::Owners(addresses) => {
                    if addresses.len() != cred.signatures.len() {
                        return Err(Error::Signing(format!(
                            "credential {} has {} signatures, input needs {}",
                            position,
                            cred.signatures.len(),
                            addresses.len()
                        )));
                    }
                    for (address, sig) in addresses.iter().zip(&cred.signatures) {
                        let recovered = recover_address(&digest, sig)?;
                        if recovered != *address {
                            return Err(Error::Signing(format!(
                                "credential {} signed by {}, expected {}",
                                position, recovered, address
                            )));
                        }
                    }
                }
                CredentialSigners::Account(eth_address) => {
                    let [sig] = cred.signatures.as_slice() else {
                        return Err(Error::Signing(format!(
                            "credential {} must hold one {}-byte signature",
                            position, SIGNATURE_LEN
                        )));
                    };
                    let recovered = eth_address_from_public_key(&recover_public_key(&digest, sig)?);
                    if recovered != *eth_address {
                        return Err(Error::Signing(format!(
                            "credential {} signed by {}, expected {}",
                            position, recovered, eth_address
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
