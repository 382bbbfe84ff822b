//! Cryptographic primitives: hashing, keys, signatures, addresses

pub mod hash;
pub mod keys;

pub use hash::sha256;
pub use keys::{public_key_from_hex, public_key_to_address, verify_signature, KeyError, KeyPair};
