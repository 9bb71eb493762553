//! # Cartel Vault
//!
//! Delegated execution for the cartel economy: members prepay fees into a
//! per-member vault balance and sign nonce-scoped authorizations off-line;
//! a relayer submits them and the vault executes the action through the
//! engine's delegated entry points. See [`vault`] for the execution rules
//! and `cartel-crypto` for the authorization payload layout.

pub mod vault;

pub use vault::{ActionRequest, DelegationRecord, Vault};
