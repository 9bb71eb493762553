//! Event model - the only channel out of the core
//!
//! Every committed transition appends exactly one event to the engine's log.
//! Downstream consumers (indexer, quest engine, social poster) replay the
//! log and dedupe by `seq`, which is strictly increasing and never reused.
//! Consumers only read; nothing downstream writes back into core state.

use crate::types::{ActionKind, Address};
use serde::{Deserialize, Serialize};

/// A fact describing one committed state transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A new member joined
    Joined {
        member: Address,
        referrer: Option<Address>,
        shares: u128,
        fee: u128,
    },

    /// A standard raid transferred shares from target to attacker
    Raided {
        attacker: Address,
        target: Address,
        stolen: u128,
        fee: u128,
    },

    /// A high-stakes raid: larger steal plus a self-penalty burn
    HighStakesRaided {
        attacker: Address,
        target: Address,
        stolen: u128,
        self_penalty: u128,
        fee: u128,
    },

    /// A member exited, burning all shares for a payout
    Retired {
        member: Address,
        burned_shares: u128,
        payout: u128,
    },

    /// The daily revenue pool was allocated pro-rata to share holders
    ProfitsDistributed {
        pool: u128,
        recipients: u64,
        dust: u128,
    },

    /// A member claimed their pending profit
    ProfitClaimed { member: Address, amount: u128 },

    /// An operator injected sponsor revenue into the treasury
    SponsorRevenue { amount: u128 },

    /// The vault executed a pre-signed action on a member's behalf
    ActionExecuted {
        member: Address,
        action: ActionKind,
        fee_charged: u128,
    },
}

/// An event stamped with its unique, strictly increasing log position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// Log position; the idempotency key for at-least-once consumers
    pub seq: u64,

    /// The transition fact
    pub event: Event,
}

/// Append-only event log
///
/// Sequence numbers are assigned incrementally at append time; position in
/// the backing vec always equals `seq`, so range reads are O(1).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<SequencedEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning it the next sequence number
    pub fn append(&mut self, event: Event) -> u64 {
        let seq = self.entries.len() as u64;
        self.entries.push(SequencedEvent { seq, event });
        seq
    }

    /// All events in order
    pub fn all(&self) -> &[SequencedEvent] {
        &self.entries
    }

    /// Events at or after `seq` (replay cursor for consumers)
    pub fn since(&self, seq: u64) -> &[SequencedEvent] {
        let start = (seq as usize).min(self.entries.len());
        &self.entries[start..]
    }

    /// Number of events appended so far
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent event, if any
    pub fn last(&self) -> Option<&SequencedEvent> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_increase() {
        let mut log = EventLog::new();

        let s0 = log.append(Event::SponsorRevenue { amount: 1 });
        let s1 = log.append(Event::SponsorRevenue { amount: 2 });
        let s2 = log.append(Event::SponsorRevenue { amount: 3 });

        assert_eq!((s0, s1, s2), (0, 1, 2));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_since_cursor() {
        let mut log = EventLog::new();
        for amount in 0..5 {
            log.append(Event::SponsorRevenue { amount });
        }

        assert_eq!(log.since(0).len(), 5);
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].seq, 3);
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn test_seq_matches_position() {
        let mut log = EventLog::new();
        for amount in 0..10 {
            log.append(Event::SponsorRevenue { amount });
        }

        for (i, entry) in log.all().iter().enumerate() {
            assert_eq!(entry.seq, i as u64);
        }
    }
}
