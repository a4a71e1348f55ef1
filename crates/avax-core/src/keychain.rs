//! secp256k1 key pairs and the keychain used for signing
//!
//! Signatures are RFC 6979 deterministic, low-S, and carry the recovery ID as
//! a trailing byte so the node can recover the signer's public key.

use crate::address::{format_address, EthAddress};
use crate::cb58::{self, sha256};
use crate::credentials::{Signature, SIGNATURE_LEN};
use crate::ids::ShortId;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use rand::RngCore;
use ripemd::{Digest, Ripemd160};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha3::Keccak256;
use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroizing;

static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// Address for a compressed public key: ripemd160(sha256(pubkey))
pub fn address_from_public_key(public_key: &PublicKey) -> ShortId {
    let digest = Ripemd160::digest(sha256(&public_key.serialize()));
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    ShortId(out)
}

/// EVM address for a public key: keccak256(uncompressed[1..])[12..]
pub fn eth_address_from_public_key(public_key: &PublicKey) -> EthAddress {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = Keccak256::digest(&uncompressed[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    EthAddress(out)
}

fn message(digest: &[u8; 32]) -> Result<Message> {
    Message::from_slice(digest).map_err(|e| Error::Signing(format!("digest: {}", e)))
}

/// Recover the public key that produced `signature` over `digest`
pub fn recover_public_key(digest: &[u8; 32], signature: &Signature) -> Result<PublicKey> {
    let bytes = signature.as_bytes();
    let recovery_id = RecoveryId::from_i32(i32::from(bytes[SIGNATURE_LEN - 1]))
        .map_err(|e| Error::Signing(format!("recovery id: {}", e)))?;
    let sig = RecoverableSignature::from_compact(&bytes[..SIGNATURE_LEN - 1], recovery_id)
        .map_err(|e| Error::Signing(format!("signature: {}", e)))?;
    SECP.recover_ecdsa(&message(digest)?, &sig)
        .map_err(|e| Error::Signing(format!("recovery failed: {}", e)))
}

/// Recover the signer's address
pub fn recover_address(digest: &[u8; 32], signature: &Signature) -> Result<ShortId> {
    Ok(address_from_public_key(&recover_public_key(digest, signature)?))
}

/// A secp256k1 key pair
#[derive(Clone)]
pub struct KeyPair {
    secret: Zeroizing<[u8; 32]>,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a random key
    pub fn generate() -> Result<Self> {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut bytes[..]);
            // Out-of-range scalars are astronomically rare; draw again
            if SecretKey::from_slice(&bytes[..]).is_ok() {
                return Self::from_secret_bytes(&bytes[..]);
            }
        }
    }

    /// Import a raw 32-byte secret
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| Error::InvalidKey(format!("secret key: {}", e)))?;
        let public = PublicKey::from_secret_key(&SECP, &secret);
        let mut stored = Zeroizing::new([0u8; 32]);
        stored.copy_from_slice(bytes);
        Ok(Self {
            secret: stored,
            public,
        })
    }

    /// Import `PrivateKey-<cb58>`
    pub fn from_private_key_string(s: &str) -> Result<Self> {
        let body = s.strip_prefix(PRIVATE_KEY_PREFIX).ok_or_else(|| {
            Error::InvalidKey(format!("private key must start with {}", PRIVATE_KEY_PREFIX))
        })?;
        let bytes = Zeroizing::new(cb58::decode(body)?);
        Self::from_secret_bytes(&bytes)
    }

    /// Export as `PrivateKey-<cb58>`
    pub fn to_private_key_string(&self) -> String {
        format!("{}{}", PRIVATE_KEY_PREFIX, cb58::encode(&self.secret[..]))
    }

    /// Compressed public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Compressed public key bytes
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public.serialize()
    }

    /// 20-byte address
    pub fn address(&self) -> ShortId {
        address_from_public_key(&self.public)
    }

    /// Display address for `alias` and `hrp`
    pub fn address_string(&self, alias: &str, hrp: &str) -> Result<String> {
        format_address(alias, hrp, &self.address())
    }

    /// C-chain account address
    pub fn eth_address(&self) -> EthAddress {
        eth_address_from_public_key(&self.public)
    }

    /// Sign a 32-byte digest
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature> {
        let secret = SecretKey::from_slice(&self.secret[..])
            .map_err(|e| Error::InvalidKey(format!("secret key: {}", e)))?;
        let sig = SECP.sign_ecdsa_recoverable(&message(digest)?, &secret);
        let (recovery_id, compact) = sig.serialize_compact();
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8;
        Ok(Signature(out))
    }

    /// Whether `signature` over `digest` was made by this key
    pub fn verify(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        recover_public_key(digest, signature)
            .map(|pk| pk == self.public)
            .unwrap_or(false)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Keys scoped to one network HRP and chain alias
#[derive(Debug, Clone)]
pub struct KeyChain {
    hrp: String,
    chain_alias: String,
    keys: BTreeMap<ShortId, KeyPair>,
}

impl KeyChain {
    /// Empty keychain
    pub fn new(hrp: impl Into<String>, chain_alias: impl Into<String>) -> Self {
        Self {
            hrp: hrp.into(),
            chain_alias: chain_alias.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Network HRP
    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    /// Chain alias
    pub fn chain_alias(&self) -> &str {
        &self.chain_alias
    }

    /// Generate, store and return a new key
    pub fn make_key(&mut self) -> Result<&KeyPair> {
        let key = KeyPair::generate()?;
        Ok(self.add_key(key))
    }

    /// Import a raw secret or `PrivateKey-<cb58>` string
    pub fn import_key(&mut self, secret: &str) -> Result<&KeyPair> {
        let key = if secret.starts_with(PRIVATE_KEY_PREFIX) {
            KeyPair::from_private_key_string(secret)?
        } else {
            let bytes = Zeroizing::new(cb58::decode(secret)?);
            KeyPair::from_secret_bytes(&bytes)?
        };
        Ok(self.add_key(key))
    }

    /// Store a key, replacing any key for the same address
    pub fn add_key(&mut self, key: KeyPair) -> &KeyPair {
        let address = key.address();
        tracing::debug!("Keychain {}: added {}", self.chain_alias, address);
        self.keys.insert(address, key);
        &self.keys[&address]
    }

    /// Key for `address`
    pub fn get_key(&self, address: &ShortId) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    /// Key for `address`, failing with [`Error::KeyNotFound`]
    pub fn get_key_or_fail(&self, address: &ShortId) -> Result<&KeyPair> {
        self.get_key(address).ok_or_else(|| {
            let shown = format_address(&self.chain_alias, &self.hrp, address)
                .unwrap_or_else(|_| address.to_string());
            Error::KeyNotFound(shown)
        })
    }

    /// Key whose EVM address is `address`, failing with [`Error::KeyNotFound`]
    pub fn get_key_by_eth_address_or_fail(&self, address: &EthAddress) -> Result<&KeyPair> {
        self.keys
            .values()
            .find(|key| key.eth_address() == *address)
            .ok_or_else(|| Error::KeyNotFound(address.to_string()))
    }

    /// Whether a key for `address` is held
    pub fn has_key(&self, address: &ShortId) -> bool {
        self.keys.contains_key(address)
    }

    /// Remove the key for `address`
    pub fn remove_key(&mut self, address: &ShortId) -> Option<KeyPair> {
        self.keys.remove(address)
    }

    /// Addresses held, ascending
    pub fn addresses(&self) -> Vec<ShortId> {
        self.keys.keys().copied().collect()
    }

    /// Display addresses held, ascending by raw address
    pub fn address_strings(&self) -> Result<Vec<String>> {
        self.keys
            .keys()
            .map(|a| format_address(&self.chain_alias, &self.hrp, a))
            .collect()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys are held
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// Test helpers
#[cfg(any(test, feature = "test-helpers"))]
impl KeyPair {
    /// Deterministic key from a repeated seed byte (for testing only)
    pub fn test_key(seed: u8) -> Self {
        Self::from_secret_bytes(&[seed.clamp(1, 0xfe); 32]).expect("constant scalar is in range")
    }
}
