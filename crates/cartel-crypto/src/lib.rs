//! # Cartel Crypto
//!
//! Cryptographic primitives for the cartel economy:
//! - `KeyPair` - Ed25519 member keys; the address IS the verifying key
//! - authorization payload encoding + sign/verify for delegated execution
//! - BLAKE3 hashing utilities
//!
//! Authorization payloads are domain-separated (vault address + version
//! tag) and nonce-scoped; see [`authorization`] for the canonical layout.

pub mod authorization;
pub mod error;
pub mod hash;
pub mod keys;

pub use authorization::{
    action_payload, sign_action, verify_action, AuthSignature, AUTH_VERSION, DOMAIN_TAG,
};
pub use error::{CryptoError, Result};
pub use hash::{hash_blake3, hash_concat};
pub use keys::KeyPair;
