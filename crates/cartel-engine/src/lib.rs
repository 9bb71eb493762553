//! # Cartel Engine
//!
//! The ledger-and-economy core of the cartel:
//! - `SharesLedger` - single-asset balance table with incremental supply
//! - `SettlementAccounts` - stable-value cash accounts
//! - `Treasury` - fee collection, sponsor revenue, pro-rata distribution,
//!   claims, retirement payouts
//! - `GameEngine` - the game-action state machine (join, raid,
//!   high-stakes raid, retire, distribute, claim) with operator and
//!   authorized-agent access control and an append-only event log
//!
//! ## Economy flow
//!
//! ```text
//!   join fee ──┐                       ┌──> pending claims ──> claim
//!   raid fees ─┼──> daily revenue pool ┤        (pro-rata by shares)
//!   sponsor  ──┘     (24h cooldown)    └──> truncation dust stays put
//!
//!   retire: burn all shares, cash out shares/total of the
//!           non-pending treasury balance
//! ```
//!
//! Every public operation is a single atomic unit: validation precedes
//! the first mutation, and the event is appended after the commit.

pub mod config;
pub mod engine;
pub mod ledger;
pub mod member;
pub mod settlement;
pub mod treasury;

pub use config::EngineConfig;
pub use engine::{GameEngine, HighStakesOutcome};
pub use ledger::SharesLedger;
pub use member::{Member, MemberStatus};
pub use settlement::SettlementAccounts;
pub use treasury::{DistributionSummary, Treasury};
