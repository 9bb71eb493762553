//! Delegated-execution vault
//!
//! Holds a prepaid settlement balance per member and executes game
//! actions on their behalf when presented with a valid pre-signed,
//! nonce-scoped authorization. The vault itself is a settlement identity:
//! deposits move cash into its custody account, and its address is what
//! authorization payloads are domain-bound to.
//!
//! Custody invariant: the vault's settlement account always holds the sum
//! of all `vault_balance` records, so funding a fee can never fail once
//! the member's record covers it.
//!
//! A failed `execute_action` has zero side effects - in particular the
//! nonce is only consumed by a successful execution, so the caller can
//! distinguish "retry later" failures from the permanent
//! `InvalidSignature` a replayed authorization earns.

use cartel_core::error::{CartelError, Result};
use cartel_core::types::{ActionKind, Address};
use cartel_crypto::authorization::{verify_action, AuthSignature};
use cartel_engine::GameEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-member delegation state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    /// Prepaid settlement funds available to cover action fees
    pub vault_balance: u128,

    /// Next authorization nonce; strictly increasing, one per execution
    pub nonce: u64,
}

/// A relayer-submitted delegated action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// The member the action is executed as
    pub member: Address,

    /// Which action to perform
    pub action: ActionKind,

    /// Raid target; `None` for claim and retire
    pub target: Option<Address>,

    /// Unix-seconds deadline after which the authorization is dead
    pub deadline: i64,
}

/// The delegated-execution vault
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vault {
    address: Address,
    records: HashMap<Address, DelegationRecord>,
}

impl Vault {
    /// Create a vault with its own settlement identity
    ///
    /// The address must be registered as an authorized agent on the
    /// engine before delegated actions can execute.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            records: HashMap::new(),
        }
    }

    /// The vault's settlement identity, bound into every authorization
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Move settlement funds from the member into their prepaid balance
    ///
    /// The record is created lazily on first deposit.
    pub fn deposit(&mut self, engine: &mut GameEngine, member: Address, amount: u128) -> Result<()> {
        let record = self.records.get(&member).copied().unwrap_or_default();
        let new_balance = record
            .vault_balance
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;

        engine.settlement_transfer(&member, &self.address, amount)?;
        self.records
            .entry(member)
            .or_default()
            .vault_balance = new_balance;

        debug!(%member, amount, new_balance, "vault deposit");
        Ok(())
    }

    /// Move prepaid funds back to the member's settlement account
    ///
    /// Withdrawal is member-initiated: the substrate authenticates
    /// `member` as the caller, the vault only checks the balance.
    pub fn withdraw(
        &mut self,
        engine: &mut GameEngine,
        member: Address,
        amount: u128,
    ) -> Result<()> {
        let available = self.vault_balance_of(&member);
        if available < amount {
            return Err(CartelError::InsufficientVaultBalance {
                address: member,
                available,
                required: amount,
            });
        }

        engine.settlement_transfer(&self.address, &member, amount)?;
        if let Some(record) = self.records.get_mut(&member) {
            record.vault_balance -= amount;
        }

        debug!(%member, amount, "vault withdrawal");
        Ok(())
    }

    /// Execute a pre-signed action as the member
    ///
    /// Verifies the deadline and the signature over the reconstructed
    /// payload (bound to this vault's address, the payload version, and
    /// the member's current nonce), charges the action fee from the
    /// prepaid balance, and forwards to the engine's delegated entry
    /// point. The nonce is consumed in the same atomic step as the
    /// successful action, so the identical signature can never be
    /// accepted twice. Returns the fee charged.
    pub fn execute_action(
        &mut self,
        engine: &mut GameEngine,
        request: &ActionRequest,
        signature: &AuthSignature,
        now: i64,
    ) -> Result<u128> {
        if now > request.deadline {
            return Err(CartelError::Expired {
                deadline: request.deadline,
                now,
            });
        }

        let record = self
            .records
            .get(&request.member)
            .copied()
            .unwrap_or_default();

        let verified = verify_action(
            &self.address,
            &request.member,
            request.action,
            request.target.as_ref(),
            record.nonce,
            request.deadline,
            signature,
        )
        .unwrap_or(false);
        if !verified {
            return Err(CartelError::InvalidSignature);
        }

        let fee = engine.fee_for(request.action);
        if record.vault_balance < fee {
            return Err(CartelError::InsufficientVaultBalance {
                address: request.member,
                available: record.vault_balance,
                required: fee,
            });
        }

        // Fund the fee through the member's settlement account so the
        // engine's fee collection is identical to the direct path.
        if fee > 0 {
            engine.settlement_transfer(&self.address, &request.member, fee)?;
        }

        let outcome = self.dispatch(engine, request, now);
        if let Err(err) = outcome {
            if fee > 0 {
                // The engine rejected the action without touching
                // settlement state, so the interim credit is still there.
                engine.settlement_transfer(&request.member, &self.address, fee)?;
            }
            return Err(err);
        }

        // Commit: consume the nonce and the prepaid fee together.
        let record = self.records.entry(request.member).or_default();
        record.vault_balance -= fee;
        record.nonce += 1;

        engine.note_action_executed(self.address, request.member, request.action, fee)?;
        info!(
            member = %request.member,
            action = %request.action,
            fee,
            nonce = record.nonce,
            "delegated action executed"
        );
        Ok(fee)
    }

    fn dispatch(
        &self,
        engine: &mut GameEngine,
        request: &ActionRequest,
        now: i64,
    ) -> Result<()> {
        match (request.action, request.target) {
            (ActionKind::Raid, Some(target)) => {
                engine.raid_for(self.address, request.member, target, now)?;
            }
            (ActionKind::HighStakesRaid, Some(target)) => {
                engine.high_stakes_raid_for(self.address, request.member, target, now)?;
            }
            (ActionKind::ClaimProfit, None) => {
                engine.claim_profit_for(self.address, request.member)?;
            }
            (ActionKind::Retire, None) => {
                engine.retire_for(self.address, request.member, now)?;
            }
            // A well-formed authorization always pairs raids with a
            // target and nothing else; a member never signs this shape.
            _ => return Err(CartelError::InvalidSignature),
        }
        Ok(())
    }

    /// Current authorization nonce for a member
    pub fn nonce_of(&self, member: &Address) -> u64 {
        self.records.get(member).map(|r| r.nonce).unwrap_or(0)
    }

    /// Prepaid balance of a member
    pub fn vault_balance_of(&self, member: &Address) -> u128 {
        self.records
            .get(member)
            .map(|r| r.vault_balance)
            .unwrap_or(0)
    }
}
