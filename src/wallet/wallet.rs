//! In-memory wallets
//!
//! A wallet is the decrypted form of a stored blob: a name plus a key pair.
//! It exists only for the lifetime of the request that unlocked it and is
//! never written back in plaintext by the gateway.

use crate::crypto::{KeyError, KeyPair};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wallet errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Malformed wallet data")]
    Malformed,
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// Plaintext wallet form, only ever serialized inside the sealed vault blob
#[derive(Serialize, Deserialize)]
struct WalletData {
    name: String,
    privkey: String,
}

/// A named key-bearing wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    pub name: String,
    keypair: KeyPair,
}

impl Wallet {
    /// Generate a wallet with a fresh key pair
    pub fn generate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            keypair: KeyPair::generate(),
        }
    }

    /// The wallet's address
    pub fn address(&self) -> String {
        self.keypair.address()
    }

    /// The wallet's public key (hex, compressed)
    pub fn public_key(&self) -> String {
        self.keypair.public_key_hex()
    }

    /// The wallet's private key (hex). Handle with care.
    pub fn private_key(&self) -> String {
        self.keypair.private_key_hex()
    }

    /// Sign a 32-byte digest with the wallet's private key
    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, KeyError> {
        self.keypair.sign(digest)
    }

    /// Serialize the plaintext form for sealing
    pub fn to_bytes(&self) -> Vec<u8> {
        let data = WalletData {
            name: self.name.clone(),
            privkey: self.private_key(),
        };
        // WalletData has no unserializable members
        serde_json::to_vec(&data).unwrap_or_default()
    }

    /// Parse a plaintext wallet produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let data: WalletData =
            serde_json::from_slice(bytes).map_err(|_| WalletError::Malformed)?;
        let keypair = KeyPair::from_private_key_hex(&data.privkey)?;
        Ok(Self {
            name: data.name,
            keypair,
        })
    }
}
