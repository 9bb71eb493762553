//! Game-action state machine
//!
//! Orchestrates the member lifecycle and every economy action against the
//! shares ledger and treasury. The settlement substrate executes one
//! transition at a time, so each public method is a single atomic unit:
//! all fallible checks run before the first state mutation, and the
//! event is appended only after the mutation commits. A rejected
//! transition has zero side effects.
//!
//! Caller identities are parameters, not ambient state: authenticating
//! the caller is the substrate's concern, access control (operator,
//! authorized agents) is this engine's.

use crate::config::EngineConfig;
use crate::ledger::SharesLedger;
use crate::member::{Member, MemberStatus};
use crate::settlement::SettlementAccounts;
use crate::treasury::{DistributionSummary, Treasury};
use cartel_core::error::{CartelError, Result};
use cartel_core::event::{Event, EventLog, SequencedEvent};
use cartel_core::math::{pct_of, pro_rata};
use cartel_core::types::constants::{HIGH_STAKES_REPUTATION, RAID_REPUTATION};
use cartel_core::types::{ActionKind, Address};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Outcome of a high-stakes raid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighStakesOutcome {
    /// Shares transferred from the target
    pub stolen: u128,

    /// Attacker shares burned, computed on the pre-raid balance
    pub self_penalty: u128,
}

/// The cartel ledger-and-economy engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEngine {
    config: EngineConfig,
    operator: Address,
    agents: HashSet<Address>,
    members: HashMap<Address, Member>,
    ledger: SharesLedger,
    treasury: Treasury,
    settlement: SettlementAccounts,
    events: EventLog,
}

impl GameEngine {
    /// Create an engine with a validated configuration
    pub fn new(operator: Address, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            operator,
            agents: HashSet::new(),
            members: HashMap::new(),
            ledger: SharesLedger::new(),
            treasury: Treasury::new(),
            settlement: SettlementAccounts::new(),
            events: EventLog::new(),
        })
    }

    // === Membership lifecycle ===

    /// Join the cartel
    ///
    /// Charges the join fee, mints the starting share allotment, and mints
    /// a referral bonus when the referrer is an active member. Exit is
    /// terminal: a retired address can never rejoin.
    pub fn join(&mut self, member: Address, referrer: Option<Address>, now: i64) -> Result<()> {
        if let Some(existing) = self.members.get(&member) {
            return Err(match existing.status {
                MemberStatus::Active => CartelError::AlreadyJoined(member),
                MemberStatus::Exited => CartelError::MemberExited(member),
            });
        }
        if referrer == Some(member) {
            return Err(CartelError::SelfReferral);
        }

        let fee = self.config.join_fee;
        self.settlement.ensure(&member, fee)?;

        let bonus_recipient = referrer.filter(|r| {
            self.members
                .get(r)
                .map(|m| m.is_active())
                .unwrap_or(false)
        });
        let bonus = if bonus_recipient.is_some() {
            self.config.referral_bonus
        } else {
            0
        };
        let minted = self
            .config
            .starting_shares
            .checked_add(bonus)
            .ok_or(CartelError::Overflow)?;
        self.ledger.ensure_mint_capacity(minted)?;

        // Commit: nothing below can fail after the checks above.
        self.treasury.collect_fee(&mut self.settlement, &member, fee)?;
        self.ledger.mint(&member, self.config.starting_shares)?;
        if let Some(recipient) = bonus_recipient {
            self.ledger.mint(&recipient, bonus)?;
        }
        self.members
            .insert(member, Member::new(member, referrer, now));

        info!(%member, referrer = ?referrer, fee, "member joined");
        self.events.append(Event::Joined {
            member,
            referrer,
            shares: self.config.starting_shares,
            fee,
        });
        Ok(())
    }

    /// Retire from the cartel
    ///
    /// Pays a proportional cash-out of the treasury funds not already
    /// allocated to pending claims, burns all shares, forfeits
    /// reputation, and moves the member to the terminal `Exited` state.
    /// Returns the payout.
    pub fn retire(&mut self, member: Address, _now: i64) -> Result<u128> {
        self.ensure_active(&member)?;

        let shares = self.ledger.balance_of(&member);
        let payout = pro_rata(
            self.treasury.available_for_exit(),
            shares,
            self.ledger.total_supply(),
        )?;

        self.treasury.payout(&mut self.settlement, &member, payout)?;
        self.ledger.burn(&member, shares)?;

        let record = self
            .members
            .get_mut(&member)
            .ok_or(CartelError::NotJoined(member))?;
        record.status = MemberStatus::Exited;
        record.reputation = 0;

        info!(%member, burned = shares, payout, "member retired");
        self.events.append(Event::Retired {
            member,
            burned_shares: shares,
            payout,
        });
        Ok(payout)
    }

    // === Raids ===

    /// Standard raid: steal a fixed percentage of the target's shares
    ///
    /// Deterministic given the inputs; raiding a target with too few
    /// shares to yield anything steals 0 and is not an error. Returns the
    /// stolen amount.
    pub fn raid(&mut self, attacker: Address, target: Address, now: i64) -> Result<u128> {
        self.raid_inner(attacker, target, now)
    }

    /// High-stakes raid: bigger steal, plus a self-penalty burn computed
    /// on the attacker's pre-raid balance
    pub fn high_stakes_raid(
        &mut self,
        attacker: Address,
        target: Address,
        now: i64,
    ) -> Result<HighStakesOutcome> {
        self.high_stakes_raid_inner(attacker, target, now)
    }

    fn raid_inner(&mut self, attacker: Address, target: Address, _now: i64) -> Result<u128> {
        self.ensure_raid_preconditions(&attacker, &target)?;
        let fee = self.config.raid_fee;
        self.settlement.ensure(&attacker, fee)?;

        let stolen = pct_of(self.ledger.balance_of(&target), self.config.raid_steal_pct);

        self.treasury
            .collect_fee(&mut self.settlement, &attacker, fee)?;
        self.ledger.steal(&target, &attacker, stolen)?;
        self.record_raid_stats(&attacker, &target, RAID_REPUTATION);

        debug!(%attacker, %target, stolen, fee, "raid");
        self.events.append(Event::Raided {
            attacker,
            target,
            stolen,
            fee,
        });
        Ok(stolen)
    }

    fn high_stakes_raid_inner(
        &mut self,
        attacker: Address,
        target: Address,
        _now: i64,
    ) -> Result<HighStakesOutcome> {
        self.ensure_raid_preconditions(&attacker, &target)?;
        let fee = self.config.high_stakes_fee;
        self.settlement.ensure(&attacker, fee)?;

        let stolen = pct_of(self.ledger.balance_of(&target), self.config.hs_steal_pct);
        // Penalty is evaluated against the balance before the stolen
        // amount is credited.
        let self_penalty = pct_of(
            self.ledger.balance_of(&attacker),
            self.config.hs_penalty_pct,
        );

        self.treasury
            .collect_fee(&mut self.settlement, &attacker, fee)?;
        self.ledger.steal(&target, &attacker, stolen)?;
        self.ledger.burn(&attacker, self_penalty)?;
        self.record_raid_stats(&attacker, &target, HIGH_STAKES_REPUTATION);

        debug!(%attacker, %target, stolen, self_penalty, fee, "high-stakes raid");
        self.events.append(Event::HighStakesRaided {
            attacker,
            target,
            stolen,
            self_penalty,
            fee,
        });
        Ok(HighStakesOutcome {
            stolen,
            self_penalty,
        })
    }

    fn ensure_raid_preconditions(&self, attacker: &Address, target: &Address) -> Result<()> {
        self.ensure_active(attacker)?;
        self.ensure_active(target)?;
        if attacker == target {
            return Err(CartelError::SelfTarget);
        }
        Ok(())
    }

    fn record_raid_stats(&mut self, attacker: &Address, target: &Address, reputation: u64) {
        if let Some(member) = self.members.get_mut(attacker) {
            member.reputation = member.reputation.saturating_add(reputation);
            member.raids_launched = member.raids_launched.saturating_add(1);
        }
        if let Some(member) = self.members.get_mut(target) {
            member.raids_suffered = member.raids_suffered.saturating_add(1);
        }
    }

    // === Treasury pass-throughs ===

    /// Allocate the daily revenue pool pro-rata across share holders
    ///
    /// Callable by anyone; gated by the distribution cooldown. An empty
    /// pool is a no-op.
    pub fn distribute_daily_profits(&mut self, now: i64) -> Result<DistributionSummary> {
        let total_supply = self.ledger.total_supply();
        let summary = self.treasury.distribute(
            self.ledger.holders(),
            total_supply,
            now,
            self.config.distribution_cooldown_secs,
        )?;

        if summary.pool > 0 {
            self.events.append(Event::ProfitsDistributed {
                pool: summary.pool,
                recipients: summary.recipients,
                dust: summary.dust,
            });
        }
        Ok(summary)
    }

    /// Claim the caller's pending profit into their settlement account
    pub fn claim_profit(&mut self, member: Address) -> Result<u128> {
        self.claim_profit_inner(member)
    }

    fn claim_profit_inner(&mut self, member: Address) -> Result<u128> {
        self.ensure_active(&member)?;
        let amount = self.treasury.claim(&mut self.settlement, &member)?;
        self.events.append(Event::ProfitClaimed { member, amount });
        Ok(amount)
    }

    /// Inject sponsor revenue into the treasury (operator-only)
    pub fn sponsor_revenue(&mut self, caller: Address, amount: u128) -> Result<()> {
        self.ensure_operator(&caller)?;
        self.treasury.sponsor_revenue(amount)?;
        info!(amount, "sponsor revenue");
        self.events.append(Event::SponsorRevenue { amount });
        Ok(())
    }

    // === Access control ===

    /// Add or remove an authorized agent (operator-only)
    pub fn set_agent(&mut self, caller: Address, agent: Address, allowed: bool) -> Result<()> {
        self.ensure_operator(&caller)?;
        if allowed {
            self.agents.insert(agent);
        } else {
            self.agents.remove(&agent);
        }
        info!(%agent, allowed, "agent registry updated");
        Ok(())
    }

    /// Credit external settlement funds to an account (operator-only
    /// on-ramp; the external source is outside the treasury identity)
    pub fn fund_settlement(&mut self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.ensure_operator(&caller)?;
        self.settlement.fund(&to, amount)
    }

    /// Substrate-mediated settlement transfer between trusted identities
    pub fn settlement_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        self.settlement.transfer(from, to, amount)
    }

    // === Delegated entry points ===
    //
    // Identical business logic to the direct entry points, but callable
    // only by a registered agent acting as `member`.

    /// Raid on a member's behalf (authorized agents only)
    pub fn raid_for(
        &mut self,
        caller: Address,
        member: Address,
        target: Address,
        now: i64,
    ) -> Result<u128> {
        self.ensure_agent(&caller)?;
        self.raid_inner(member, target, now)
    }

    /// High-stakes raid on a member's behalf (authorized agents only)
    pub fn high_stakes_raid_for(
        &mut self,
        caller: Address,
        member: Address,
        target: Address,
        now: i64,
    ) -> Result<HighStakesOutcome> {
        self.ensure_agent(&caller)?;
        self.high_stakes_raid_inner(member, target, now)
    }

    /// Claim profit on a member's behalf (authorized agents only)
    pub fn claim_profit_for(&mut self, caller: Address, member: Address) -> Result<u128> {
        self.ensure_agent(&caller)?;
        self.claim_profit_inner(member)
    }

    /// Retire a member on their behalf (authorized agents only)
    pub fn retire_for(&mut self, caller: Address, member: Address, now: i64) -> Result<u128> {
        self.ensure_agent(&caller)?;
        self.retire(member, now)
    }

    /// Record a completed delegated execution (authorized agents only)
    pub fn note_action_executed(
        &mut self,
        caller: Address,
        member: Address,
        action: ActionKind,
        fee_charged: u128,
    ) -> Result<u64> {
        self.ensure_agent(&caller)?;
        Ok(self.events.append(Event::ActionExecuted {
            member,
            action,
            fee_charged,
        }))
    }

    /// The fee the schedule charges for a delegable action
    pub fn fee_for(&self, action: ActionKind) -> u128 {
        match action {
            ActionKind::Raid => self.config.raid_fee,
            ActionKind::HighStakesRaid => self.config.high_stakes_fee,
            ActionKind::ClaimProfit | ActionKind::Retire => 0,
        }
    }

    fn ensure_active(&self, address: &Address) -> Result<()> {
        match self.members.get(address) {
            Some(member) if member.is_active() => Ok(()),
            _ => Err(CartelError::NotJoined(*address)),
        }
    }

    fn ensure_operator(&self, caller: &Address) -> Result<()> {
        if *caller != self.operator {
            return Err(CartelError::NotOperator(*caller));
        }
        Ok(())
    }

    fn ensure_agent(&self, caller: &Address) -> Result<()> {
        if !self.agents.contains(caller) {
            return Err(CartelError::NotAuthorizedAgent(*caller));
        }
        Ok(())
    }

    // === Read-only queries ===

    /// Share balance of an address
    pub fn balance_of(&self, address: &Address) -> u128 {
        self.ledger.balance_of(address)
    }

    /// Total share supply
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Unclaimed profit entitlement of an address
    pub fn pending_profit(&self, address: &Address) -> u128 {
        self.treasury.pending_claim_of(address)
    }

    /// Treasury settlement balance
    pub fn treasury_balance(&self) -> u128 {
        self.treasury.settlement_balance()
    }

    /// Settlement account balance of an address
    pub fn settlement_balance_of(&self, address: &Address) -> u128 {
        self.settlement.balance_of(address)
    }

    /// Whether an address is a registered agent
    pub fn is_agent_authorized(&self, address: &Address) -> bool {
        self.agents.contains(address)
    }

    /// The member record, if the address ever joined
    pub fn member(&self, address: &Address) -> Option<&Member> {
        self.members.get(address)
    }

    /// Reputation of an address (0 if unknown or exited)
    pub fn reputation_of(&self, address: &Address) -> u64 {
        self.members
            .get(address)
            .map(|m| m.reputation)
            .unwrap_or(0)
    }

    /// The operator identity
    pub fn operator(&self) -> &Address {
        &self.operator
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Treasury view, for accounting queries
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// All emitted events in order
    pub fn events(&self) -> &[SequencedEvent] {
        self.events.all()
    }

    /// Events at or after a replay cursor
    pub fn events_since(&self, seq: u64) -> &[SequencedEvent] {
        self.events.since(seq)
    }
}
