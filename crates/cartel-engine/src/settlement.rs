//! Settlement accounts
//!
//! Per-address balances of the stable-value currency that fees, sponsor
//! revenue and payouts are denominated in. Funds enter through the
//! operator on-ramp and only move by balance-checked transfer after that.

use cartel_core::error::{CartelError, Result};
use cartel_core::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable-value cash accounts
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SettlementAccounts {
    balances: HashMap<Address, u128>,
}

impl SettlementAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an address (0 if never funded)
    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Check a debit would not underflow
    pub fn ensure(&self, address: &Address, amount: u128) -> Result<()> {
        let available = self.balance_of(address);
        if available < amount {
            return Err(CartelError::InsufficientFunds {
                address: *address,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Credit external funds (on-ramp; not conserved internally)
    pub fn fund(&mut self, address: &Address, amount: u128) -> Result<()> {
        let balance = self.balance_of(address);
        let new_balance = balance.checked_add(amount).ok_or(CartelError::Overflow)?;
        self.balances.insert(*address, new_balance);
        Ok(())
    }

    /// Balance-checked internal transfer
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        self.ensure(from, amount)?;
        let from_balance = self.balance_of(from);
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    /// Debit without a matching internal credit (treasury intake)
    pub fn debit(&mut self, address: &Address, amount: u128) -> Result<()> {
        self.ensure(address, amount)?;
        let balance = self.balance_of(address);
        self.balances.insert(*address, balance - amount);
        Ok(())
    }

    /// Credit without a matching internal debit (treasury payout)
    pub fn credit(&mut self, address: &Address, amount: u128) -> Result<()> {
        self.fund(address, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::new([tag; 32])
    }

    #[test]
    fn test_transfer() {
        let mut accounts = SettlementAccounts::new();
        accounts.fund(&addr(1), 100).unwrap();

        accounts.transfer(&addr(1), &addr(2), 30).unwrap();

        assert_eq!(accounts.balance_of(&addr(1)), 70);
        assert_eq!(accounts.balance_of(&addr(2)), 30);
    }

    #[test]
    fn test_transfer_underflow_rejected() {
        let mut accounts = SettlementAccounts::new();
        accounts.fund(&addr(1), 10).unwrap();

        let err = accounts.transfer(&addr(1), &addr(2), 11).unwrap_err();
        assert!(matches!(err, CartelError::InsufficientFunds { .. }));
        assert_eq!(accounts.balance_of(&addr(1)), 10);
        assert_eq!(accounts.balance_of(&addr(2)), 0);
    }

    #[test]
    fn test_debit_credit() {
        let mut accounts = SettlementAccounts::new();
        accounts.fund(&addr(1), 10).unwrap();

        accounts.debit(&addr(1), 4).unwrap();
        accounts.credit(&addr(1), 1).unwrap();

        assert_eq!(accounts.balance_of(&addr(1)), 7);
    }
}
