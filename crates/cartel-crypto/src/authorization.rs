//! Delegated-action authorizations
//!
//! A member signs a canonical payload off-line; a relayer later submits it
//! to the vault, which reconstructs the exact payload from current state
//! and verifies the signature. The payload is domain-separated by the
//! vault's own address and a version tag, so a signature produced for one
//! deployment or payload version can never be replayed against another.
//!
//! ## Payload layout (fixed 132 bytes)
//!
//! | Field | Size | Notes |
//! |-------|------|-------|
//! | domain tag | 17 | `CARTEL-VAULT-AUTH` |
//! | version | 1 | `AUTH_VERSION` |
//! | vault address | 32 | deployment binding |
//! | member address | 32 | the authorizing signer |
//! | action | 1 | `ActionKind::as_u8` |
//! | target flag | 1 | 1 if a target follows |
//! | target address | 32 | zeroed when absent |
//! | nonce | 8 | little-endian, consumed once |
//! | deadline | 8 | little-endian unix seconds |
//!
//! The signature is Ed25519 over the BLAKE3 hash of this payload.

use crate::error::{CryptoError, Result};
use crate::hash::hash_blake3;
use crate::keys::KeyPair;
use cartel_core::types::{ActionKind, Address};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Domain separation tag bound into every authorization payload
pub const DOMAIN_TAG: &[u8] = b"CARTEL-VAULT-AUTH";

/// Payload version tag; bump on any layout change
pub const AUTH_VERSION: u8 = 1;

/// Total encoded payload size in bytes
pub const PAYLOAD_SIZE: usize = 17 + 1 + 32 + 32 + 1 + 1 + 32 + 8 + 8;

/// A detached Ed25519 signature over an authorization payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSignature {
    /// Raw 64-byte Ed25519 signature
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

impl AuthSignature {
    /// Wrap a raw 64-byte signature
    pub fn new(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Get the raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Build the canonical authorization payload
pub fn action_payload(
    vault: &Address,
    member: &Address,
    action: ActionKind,
    target: Option<&Address>,
    nonce: u64,
    deadline: i64,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(PAYLOAD_SIZE);
    payload.extend_from_slice(DOMAIN_TAG);
    payload.push(AUTH_VERSION);
    payload.extend_from_slice(vault.as_bytes());
    payload.extend_from_slice(member.as_bytes());
    payload.push(action.as_u8());
    match target {
        Some(target) => {
            payload.push(1);
            payload.extend_from_slice(target.as_bytes());
        }
        None => {
            payload.push(0);
            payload.extend_from_slice(Address::ZERO.as_bytes());
        }
    }
    payload.extend_from_slice(&nonce.to_le_bytes());
    payload.extend_from_slice(&deadline.to_le_bytes());
    debug_assert_eq!(payload.len(), PAYLOAD_SIZE);
    payload
}

/// Sign an action authorization with the member's keypair
pub fn sign_action(
    keypair: &KeyPair,
    vault: &Address,
    action: ActionKind,
    target: Option<&Address>,
    nonce: u64,
    deadline: i64,
) -> AuthSignature {
    let payload = action_payload(vault, &keypair.address(), action, target, nonce, deadline);
    let digest = hash_blake3(&payload);
    AuthSignature::new(keypair.sign(&digest))
}

/// Verify a signature over the reconstructed payload
///
/// Returns `Ok(false)` when the signature does not match; `Err` only when
/// the key or signature bytes are structurally invalid.
pub fn verify_action(
    vault: &Address,
    member: &Address,
    action: ActionKind,
    target: Option<&Address>,
    nonce: u64,
    deadline: i64,
    signature: &AuthSignature,
) -> Result<bool> {
    let verifying_key = VerifyingKey::from_bytes(member.as_bytes())
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;

    let sig_bytes: [u8; 64] = signature
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::InvalidSignature("expected 64 bytes".to_string()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    let payload = action_payload(vault, member, action, target, nonce, deadline);
    let digest = hash_blake3(&payload);

    Ok(verifying_key.verify(&digest, &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vault_address() -> Address {
        Address::new([0xAA; 32])
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate();
        let target = KeyPair::generate().address();
        let vault = vault_address();

        let sig = sign_action(&keypair, &vault, ActionKind::Raid, Some(&target), 0, 1_000);

        let ok = verify_action(
            &vault,
            &keypair.address(),
            ActionKind::Raid,
            Some(&target),
            0,
            1_000,
            &sig,
        )
        .unwrap();
        assert!(ok);
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let keypair = KeyPair::generate();
        let vault = vault_address();

        let sig = sign_action(&keypair, &vault, ActionKind::ClaimProfit, None, 0, 1_000);

        let ok = verify_action(
            &vault,
            &keypair.address(),
            ActionKind::ClaimProfit,
            None,
            1, // nonce already consumed
            1_000,
            &sig,
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_wrong_vault_fails() {
        let keypair = KeyPair::generate();

        let sig = sign_action(
            &keypair,
            &vault_address(),
            ActionKind::Retire,
            None,
            3,
            1_000,
        );

        let other_vault = Address::new([0xBB; 32]);
        let ok = verify_action(
            &other_vault,
            &keypair.address(),
            ActionKind::Retire,
            None,
            3,
            1_000,
            &sig,
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_wrong_signer_fails() {
        let keypair = KeyPair::generate();
        let impostor = KeyPair::generate();
        let vault = vault_address();

        let sig = sign_action(&impostor, &vault, ActionKind::Retire, None, 0, 1_000);

        let ok = verify_action(
            &vault,
            &keypair.address(),
            ActionKind::Retire,
            None,
            0,
            1_000,
            &sig,
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_payload_is_canonical() {
        let vault = vault_address();
        let member = Address::new([1u8; 32]);

        let a = action_payload(&vault, &member, ActionKind::Raid, None, 7, 99);
        let b = action_payload(&vault, &member, ActionKind::Raid, None, 7, 99);
        assert_eq!(a, b);
        assert_eq!(a.len(), PAYLOAD_SIZE);

        // Any field change produces a different payload
        let c = action_payload(&vault, &member, ActionKind::Raid, None, 8, 99);
        assert_ne!(a, c);
    }

    proptest! {
        /// A signature verifies for exactly the (nonce, deadline) it was
        /// produced over
        #[test]
        fn signature_bound_to_nonce(nonce: u64, deadline: i64) {
            let keypair = KeyPair::from_seed([5u8; 32]);
            let vault = vault_address();
            let member = keypair.address();

            let sig = sign_action(&keypair, &vault, ActionKind::ClaimProfit, None, nonce, deadline);
            prop_assert!(verify_action(
                &vault, &member, ActionKind::ClaimProfit, None, nonce, deadline, &sig
            ).unwrap());
            prop_assert!(!verify_action(
                &vault, &member, ActionKind::ClaimProfit, None, nonce.wrapping_add(1), deadline, &sig
            ).unwrap());
        }
    }

    #[test]
    fn test_garbage_public_key_rejected() {
        let keypair = KeyPair::generate();
        let vault = vault_address();
        let sig = sign_action(&keypair, &vault, ActionKind::Retire, None, 0, 1);

        // Not all 32-byte strings decode as curve points
        let bogus = Address::new([0xFF; 32]);
        let result = verify_action(&vault, &bogus, ActionKind::Retire, None, 0, 1, &sig);
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey(_)) | Ok(false)));
    }
}
