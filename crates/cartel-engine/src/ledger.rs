//! Shares ledger
//!
//! Single-asset balance table with an incrementally maintained total
//! supply. `total_supply == sum(balances)` holds after every operation by
//! construction: mint and burn adjust the counter in the same step as the
//! balance, and steal never touches it.

use cartel_core::error::{CartelError, Result};
use cartel_core::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balance table for the single ownership unit
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SharesLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl SharesLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an address (0 if never credited)
    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Current total supply
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Addresses with a non-zero balance, for pro-rata distribution
    pub fn holders(&self) -> impl Iterator<Item = (&Address, u128)> {
        self.balances
            .iter()
            .filter(|(_, &shares)| shares > 0)
            .map(|(addr, &shares)| (addr, shares))
    }

    /// Check that `amount` more units can be minted without overflow
    pub fn ensure_mint_capacity(&self, amount: u128) -> Result<()> {
        // Every balance is bounded by total_supply, so checking the
        // supply counter covers the recipient balance too.
        self.total_supply
            .checked_add(amount)
            .map(|_| ())
            .ok_or(CartelError::Overflow)
    }

    /// Create `amount` units for `to`, growing total supply
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;
        let balance = self.balance_of(to);
        self.balances.insert(*to, balance + amount);
        self.total_supply = supply;
        Ok(())
    }

    /// Destroy `amount` units held by `from`, shrinking total supply
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(CartelError::InsufficientShares {
                address: *from,
                available: balance,
                required: amount,
            });
        }
        self.balances.insert(*from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Atomic debit-then-credit; conserves total supply
    pub fn steal(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(CartelError::InsufficientShares {
                address: *from,
                available: from_balance,
                required: amount,
            });
        }
        // to's balance + amount <= total_supply, so the credit cannot
        // overflow once the debit is in range.
        let to_balance = self.balance_of(to);
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance + amount);
        Ok(())
    }
}
