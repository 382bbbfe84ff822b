//! Wallet-at-rest encryption
//!
//! Stored wallets are opaque sealed blobs: Argon2id-derived key, AES-256-GCM
//! encryption, JSON container with hex-rendered fields. Opening a blob with
//! the wrong password, a corrupt blob, or malformed plaintext all collapse to
//! the single `Unlock` error kind so callers cannot distinguish them.

use crate::codec::HexBytes;
use crate::wallet::Wallet;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use argon2::Argon2;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Vault errors
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Wallet could not be sealed")]
    Seal,
    #[error("Wallet could not be unlocked")]
    Unlock,
}

/// The sealed on-store form of a wallet
#[derive(Serialize, Deserialize)]
struct SealedWallet {
    salt: HexBytes,
    nonce: HexBytes,
    ciphertext: HexBytes,
}

// The derived key stays wrapped in `Zeroizing` so it is scrubbed on every
// exit path, including the early error returns.
fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, VaultError> {
    let params =
        argon2::Params::new(19_456, 2, 1, Some(32)).map_err(|_| VaultError::Unlock)?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, key.as_mut_slice())
        .map_err(|_| VaultError::Unlock)?;
    Ok(key)
}

/// Seal a wallet under a password into a stored blob
pub fn seal(password: &str, wallet: &Wallet) -> Result<Vec<u8>, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    thread_rng().fill(&mut salt);
    let key = derive_key(password, &salt).map_err(|_| VaultError::Seal)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));
    let nonce_bytes = thread_rng().gen::<[u8; NONCE_LEN]>();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, wallet.to_bytes().as_ref())
        .map_err(|_| VaultError::Seal)?;

    let sealed = SealedWallet {
        salt: salt.to_vec().into(),
        nonce: nonce_bytes.to_vec().into(),
        ciphertext: ciphertext.into(),
    };
    serde_json::to_vec(&sealed).map_err(|_| VaultError::Seal)
}

/// Open a stored blob with a password
///
/// Every failure mode surfaces as `VaultError::Unlock`.
pub fn open(password: &str, blob: &[u8]) -> Result<Wallet, VaultError> {
    let sealed: SealedWallet = serde_json::from_slice(blob).map_err(|_| VaultError::Unlock)?;
    if sealed.nonce.as_slice().len() != NONCE_LEN {
        return Err(VaultError::Unlock);
    }

    let key = derive_key(password, sealed.salt.as_slice())?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));
    let nonce = Nonce::from_slice(sealed.nonce.as_slice());

    let plaintext = cipher
        .decrypt(nonce, sealed.ciphertext.as_slice())
        .map_err(|_| VaultError::Unlock)?;

    Wallet::from_bytes(&plaintext).map_err(|_| VaultError::Unlock)
}
