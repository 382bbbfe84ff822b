//! Transaction records
//!
//! The gateway builds `spend` transactions and reads both kinds back out of
//! blocks and the pending pool. A spend carries exactly one signature computed
//! over a deterministic digest of every other field; validity against chain
//! rules (balance, double-spend) is the engine's job, not ours.

use crate::codec::HexBytes;
use crate::crypto::{public_key_from_hex, public_key_to_address, sha256, verify_signature};
use serde::{Deserialize, Serialize};

/// Transaction kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    /// A transfer signed by the sender
    Spend,
    /// The per-block reward transaction identifying the miner
    Mint,
}

impl TxType {
    fn as_str(&self) -> &'static str {
        match self {
            TxType::Spend => "spend",
            TxType::Mint => "mint",
        }
    }
}

/// A transaction as it lives in blocks and the pending pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: u64,
    pub to: String,
    #[serde(default)]
    pub message: String,
    pub count: u64,
    pub pubkeys: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<HexBytes>,
}

impl Transaction {
    /// Deterministic digest over every field except the signatures.
    ///
    /// Fields are written with explicit separators and length prefixes so two
    /// distinct transactions can never produce the same byte stream.
    pub fn signing_digest(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.tx_type.as_str().as_bytes());
        buf.push(0);
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.count.to_be_bytes());
        buf.extend_from_slice(&(self.to.len() as u64).to_be_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&(self.message.len() as u64).to_be_bytes());
        buf.extend_from_slice(self.message.as_bytes());
        for pubkey in &self.pubkeys {
            buf.push(0);
            buf.extend_from_slice(pubkey.as_bytes());
        }
        sha256(&buf)
    }

    /// Address of the transaction's first signer, if the pubkey parses
    pub fn owner_address(&self) -> Option<String> {
        let pubkey = self.pubkeys.first()?;
        let parsed = public_key_from_hex(pubkey).ok()?;
        Some(public_key_to_address(&parsed))
    }

    /// Check every attached signature against the matching pubkey
    pub fn verify_signatures(&self) -> bool {
        if self.signatures.len() != self.pubkeys.len() {
            return false;
        }
        let digest = self.signing_digest();
        self.pubkeys
            .iter()
            .zip(&self.signatures)
            .all(|(pubkey, sig)| {
                public_key_from_hex(pubkey)
                    .ok()
                    .and_then(|pk| verify_signature(&pk, &digest, sig.as_slice()).ok())
                    .unwrap_or(false)
            })
    }
}
