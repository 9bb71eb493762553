//! Treasury
//!
//! Holds the cartel's settlement funds, accrues fee and sponsor revenue
//! into a daily pool, and converts that pool into pro-rata claims once per
//! cooldown window.
//!
//! Structural invariant, maintained by every operation:
//!
//! ```text
//! settlement_balance >= total_pending + daily_revenue_pool
//! ```
//!
//! so allocated claims are always payable and the next distribution is
//! always fully backed. Retirement payouts draw on
//! `settlement_balance - total_pending` (a retiree cashes out their slice
//! of the undistributed pool along with any rounding dust), and the pool
//! is clamped back under the invariant afterwards. Cumulative
//! intake/outflow counters make the accounting identity
//! `settlement_balance == fees + sponsor - claims - payouts` checkable in
//! O(1).

use crate::settlement::SettlementAccounts;
use cartel_core::error::{CartelError, Result};
use cartel_core::math::pro_rata;
use cartel_core::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Result of one profit distribution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Pool size before allocation
    pub pool: u128,

    /// Total allocated into pending claims
    pub allocated: u128,

    /// Truncation remainder left in the settlement balance
    pub dust: u128,

    /// Number of members credited
    pub recipients: u64,
}

/// The cartel treasury
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Treasury {
    settlement_balance: u128,
    daily_revenue_pool: u128,
    pending_claims: HashMap<Address, u128>,
    total_pending: u128,
    last_distribution_at: Option<i64>,

    // Cumulative accounting
    total_fees_collected: u128,
    total_sponsor_revenue: u128,
    total_claims_paid: u128,
    total_payouts: u128,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull a fee from the payer's settlement account
    ///
    /// The amount lands in both the settlement balance and the daily
    /// revenue pool.
    pub fn collect_fee(
        &mut self,
        accounts: &mut SettlementAccounts,
        payer: &Address,
        amount: u128,
    ) -> Result<()> {
        accounts.ensure(payer, amount)?;
        let balance = self
            .settlement_balance
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;
        let pool = self
            .daily_revenue_pool
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;

        accounts.debit(payer, amount)?;
        self.settlement_balance = balance;
        self.daily_revenue_pool = pool;
        self.total_fees_collected = self.total_fees_collected.saturating_add(amount);
        Ok(())
    }

    /// Inject externally sourced revenue (no payer account involved)
    pub fn sponsor_revenue(&mut self, amount: u128) -> Result<()> {
        let balance = self
            .settlement_balance
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;
        let pool = self
            .daily_revenue_pool
            .checked_add(amount)
            .ok_or(CartelError::Overflow)?;

        self.settlement_balance = balance;
        self.daily_revenue_pool = pool;
        self.total_sponsor_revenue = self.total_sponsor_revenue.saturating_add(amount);
        Ok(())
    }

    /// Allocate the daily pool pro-rata across current share holders
    ///
    /// At most once per cooldown window; an empty pool is a no-op that
    /// does not consume the window. Entitlements are integer-truncated;
    /// the remainder stays in the settlement balance as accepted rounding
    /// loss.
    pub fn distribute<'a>(
        &mut self,
        holders: impl Iterator<Item = (&'a Address, u128)>,
        total_supply: u128,
        now: i64,
        cooldown_secs: u64,
    ) -> Result<DistributionSummary> {
        if let Some(last) = self.last_distribution_at {
            let ready_at = last.saturating_add(cooldown_secs as i64);
            if now < ready_at {
                return Err(CartelError::TooSoon {
                    remaining_secs: (ready_at - now) as u64,
                });
            }
        }

        let pool = self.daily_revenue_pool;
        if pool == 0 {
            return Ok(DistributionSummary::default());
        }

        // Phase 1: compute every entitlement without mutating, so an
        // arithmetic failure cannot leave a partial allocation.
        let mut allocations: Vec<(Address, u128, u128)> = Vec::new();
        let mut allocated: u128 = 0;
        for (address, shares) in holders {
            let entitlement = pro_rata(pool, shares, total_supply)?;
            if entitlement == 0 {
                continue;
            }
            let claim = self.pending_claims.get(address).copied().unwrap_or(0);
            let new_claim = claim
                .checked_add(entitlement)
                .ok_or(CartelError::Overflow)?;
            allocated = allocated
                .checked_add(entitlement)
                .ok_or(CartelError::Overflow)?;
            allocations.push((*address, new_claim, entitlement));
        }

        // Phase 2: commit.
        let recipients = allocations.len() as u64;
        for (address, new_claim, _) in allocations {
            self.pending_claims.insert(address, new_claim);
        }
        self.total_pending += allocated;
        self.daily_revenue_pool = 0;
        self.last_distribution_at = Some(now);

        let dust = pool - allocated;
        debug!(pool, allocated, dust, recipients, "distributed daily profits");
        Ok(DistributionSummary {
            pool,
            allocated,
            dust,
            recipients,
        })
    }

    /// Pay a member's pending claim into their settlement account
    pub fn claim(&mut self, accounts: &mut SettlementAccounts, member: &Address) -> Result<u128> {
        let amount = self.pending_claims.get(member).copied().unwrap_or(0);
        if amount == 0 {
            return Err(CartelError::NothingToClaim(*member));
        }

        accounts.credit(member, amount)?;
        self.pending_claims.remove(member);
        self.total_pending -= amount;
        self.settlement_balance -= amount;
        self.total_claims_paid = self.total_claims_paid.saturating_add(amount);
        Ok(amount)
    }

    /// Pay a computed amount directly, bypassing the claims table
    ///
    /// Retirement path. The amount must fit in `available_for_exit`;
    /// already-allocated pending claims are never spendable here. The
    /// payout eats into the undistributed pool first, so the next
    /// distribution simply allocates less.
    pub fn payout(
        &mut self,
        accounts: &mut SettlementAccounts,
        member: &Address,
        amount: u128,
    ) -> Result<()> {
        let available = self.available_for_exit();
        if amount > available {
            return Err(CartelError::InsufficientFunds {
                address: *member,
                available,
                required: amount,
            });
        }

        accounts.credit(member, amount)?;
        self.settlement_balance -= amount;
        // Re-establish settlement_balance >= total_pending + pool
        self.daily_revenue_pool = self
            .daily_revenue_pool
            .min(self.settlement_balance - self.total_pending);
        self.total_payouts = self.total_payouts.saturating_add(amount);
        Ok(())
    }

    // === Queries ===

    /// Funds actually held
    pub fn settlement_balance(&self) -> u128 {
        self.settlement_balance
    }

    /// Revenue accrued since the last distribution
    pub fn daily_revenue_pool(&self) -> u128 {
        self.daily_revenue_pool
    }

    /// A member's computed, unclaimed entitlement
    pub fn pending_claim_of(&self, member: &Address) -> u128 {
        self.pending_claims.get(member).copied().unwrap_or(0)
    }

    /// Sum of all pending claims
    pub fn total_pending(&self) -> u128 {
        self.total_pending
    }

    /// Funds spendable on retirement payouts (everything not already
    /// allocated to pending claims)
    pub fn available_for_exit(&self) -> u128 {
        self.settlement_balance - self.total_pending
    }

    /// Timestamp of the last distribution, if any
    pub fn last_distribution_at(&self) -> Option<i64> {
        self.last_distribution_at
    }

    /// Cumulative fees collected
    pub fn total_fees_collected(&self) -> u128 {
        self.total_fees_collected
    }

    /// Cumulative sponsor revenue
    pub fn total_sponsor_revenue(&self) -> u128 {
        self.total_sponsor_revenue
    }

    /// Cumulative claims paid out
    pub fn total_claims_paid(&self) -> u128 {
        self.total_claims_paid
    }

    /// Cumulative retirement payouts
    pub fn total_payouts(&self) -> u128 {
        self.total_payouts
    }

    /// Check the accounting identity in O(1)
    pub fn accounting_identity_holds(&self) -> bool {
        self.settlement_balance
            == self.total_fees_collected + self.total_sponsor_revenue
                - self.total_claims_paid
                - self.total_payouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::new([tag; 32])
    }

    fn funded_accounts(pairs: &[(Address, u128)]) -> SettlementAccounts {
        let mut accounts = SettlementAccounts::new();
        for (address, amount) in pairs {
            accounts.fund(address, *amount).unwrap();
        }
        accounts
    }

    #[test]
    fn test_collect_fee_feeds_pool() {
        let mut treasury = Treasury::new();
        let mut accounts = funded_accounts(&[(addr(1), 100)]);

        treasury.collect_fee(&mut accounts, &addr(1), 30).unwrap();

        assert_eq!(treasury.settlement_balance(), 30);
        assert_eq!(treasury.daily_revenue_pool(), 30);
        assert_eq!(accounts.balance_of(&addr(1)), 70);
        assert!(treasury.accounting_identity_holds());
    }

    #[test]
    fn test_collect_fee_insufficient_payer() {
        let mut treasury = Treasury::new();
        let mut accounts = funded_accounts(&[(addr(1), 5)]);

        let err = treasury.collect_fee(&mut accounts, &addr(1), 6).unwrap_err();
        assert!(matches!(err, CartelError::InsufficientFunds { .. }));
        assert_eq!(treasury.settlement_balance(), 0);
        assert_eq!(accounts.balance_of(&addr(1)), 5);
    }

    #[test]
    fn test_distribute_pro_rata_with_dust() {
        let mut treasury = Treasury::new();
        treasury.sponsor_revenue(100).unwrap();

        // 88:110 split of 100: 44 + 55 allocated, 1 unit of dust
        let a = addr(1);
        let b = addr(2);
        let holders = [(&a, 88u128), (&b, 110u128)];
        let summary = treasury
            .distribute(holders.iter().map(|&(addr, s)| (addr, s)), 198, 1_000, 60)
            .unwrap();

        assert_eq!(summary.allocated, 99);
        assert_eq!(summary.dust, 1);
        assert_eq!(summary.recipients, 2);
        assert_eq!(treasury.pending_claim_of(&a), 44);
        assert_eq!(treasury.pending_claim_of(&b), 55);
        assert_eq!(treasury.daily_revenue_pool(), 0);
        // Dust never leaves the settlement balance
        assert_eq!(treasury.settlement_balance(), 100);
    }

    #[test]
    fn test_distribute_cooldown() {
        let mut treasury = Treasury::new();
        treasury.sponsor_revenue(10).unwrap();

        let a = addr(1);
        treasury
            .distribute([(&a, 5u128)].into_iter(), 5, 1_000, 3600)
            .unwrap();

        treasury.sponsor_revenue(10).unwrap();
        let err = treasury
            .distribute([(&a, 5u128)].into_iter(), 5, 1_500, 3600)
            .unwrap_err();
        assert_eq!(
            err,
            CartelError::TooSoon {
                remaining_secs: 3100
            }
        );

        // Window elapsed
        assert!(treasury
            .distribute([(&a, 5u128)].into_iter(), 5, 4_600, 3600)
            .is_ok());
    }

    #[test]
    fn test_distribute_empty_pool_noop() {
        let mut treasury = Treasury::new();
        let a = addr(1);

        let summary = treasury
            .distribute([(&a, 5u128)].into_iter(), 5, 1_000, 3600)
            .unwrap();

        assert_eq!(summary, DistributionSummary::default());
        // A no-op does not consume the cooldown window
        assert_eq!(treasury.last_distribution_at(), None);
    }

    #[test]
    fn test_claim() {
        let mut treasury = Treasury::new();
        let mut accounts = SettlementAccounts::new();
        treasury.sponsor_revenue(100).unwrap();

        let a = addr(1);
        treasury
            .distribute([(&a, 10u128)].into_iter(), 10, 1_000, 60)
            .unwrap();

        let paid = treasury.claim(&mut accounts, &a).unwrap();
        assert_eq!(paid, 100);
        assert_eq!(accounts.balance_of(&a), 100);
        assert_eq!(treasury.settlement_balance(), 0);
        assert!(treasury.accounting_identity_holds());

        // Second claim finds nothing
        assert_eq!(
            treasury.claim(&mut accounts, &a),
            Err(CartelError::NothingToClaim(a))
        );
    }

    #[test]
    fn test_payout_never_touches_pending_claims() {
        let mut treasury = Treasury::new();
        let mut accounts = SettlementAccounts::new();
        treasury.sponsor_revenue(100).unwrap();

        let a = addr(1);
        treasury
            .distribute([(&a, 10u128)].into_iter(), 10, 1_000, 60)
            .unwrap();

        // Everything is pending claims; nothing spendable on exits
        assert_eq!(treasury.available_for_exit(), 0);
        let err = treasury.payout(&mut accounts, &a, 1).unwrap_err();
        assert!(matches!(err, CartelError::InsufficientFunds { .. }));

        treasury.claim(&mut accounts, &a).unwrap();
        assert!(treasury.accounting_identity_holds());
    }

    #[test]
    fn test_payout_shrinks_undistributed_pool() {
        let mut treasury = Treasury::new();
        let mut accounts = SettlementAccounts::new();
        treasury.sponsor_revenue(100).unwrap();

        let a = addr(1);
        let b = addr(2);
        treasury.payout(&mut accounts, &a, 40).unwrap();

        assert_eq!(accounts.balance_of(&a), 40);
        assert_eq!(treasury.settlement_balance(), 60);
        // The pool is clamped so the next distribution stays fully backed
        assert_eq!(treasury.daily_revenue_pool(), 60);
        assert!(treasury.accounting_identity_holds());

        treasury
            .distribute([(&b, 10u128)].into_iter(), 10, 1_000, 60)
            .unwrap();
        let paid = treasury.claim(&mut accounts, &b).unwrap();
        assert_eq!(paid, 60);
        assert_eq!(treasury.settlement_balance(), 0);
        assert!(treasury.accounting_identity_holds());
    }
}
