//! Member records
//!
//! Share balances live in the ledger; the member record tracks lifecycle
//! state and the non-monetary history external systems read (reputation,
//! raid counters). Records persist after exit.

use cartel_core::types::Address;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a member
///
/// `Unjoined` is the absence of a record; exit is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Joined and able to act
    Active,

    /// Retired; shares burned, cannot rejoin
    Exited,
}

/// A cartel member
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    /// Member identity
    pub address: Address,

    /// Lifecycle state
    pub status: MemberStatus,

    /// Join timestamp (unix seconds)
    pub joined_at: i64,

    /// Referrer recorded at join, if any
    pub referrer: Option<Address>,

    /// Non-monetary standing; earned on raids, forfeited on exit
    pub reputation: u64,

    /// Raids this member launched
    pub raids_launched: u64,

    /// Raids this member suffered
    pub raids_suffered: u64,
}

impl Member {
    /// Create a freshly joined member
    pub fn new(address: Address, referrer: Option<Address>, joined_at: i64) -> Self {
        Self {
            address,
            status: MemberStatus::Active,
            joined_at,
            referrer,
            reputation: 0,
            raids_launched: 0,
            raids_suffered: 0,
        }
    }

    /// Whether the member can currently act
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_is_active() {
        let member = Member::new(Address::new([1u8; 32]), None, 42);
        assert!(member.is_active());
        assert_eq!(member.joined_at, 42);
        assert_eq!(member.reputation, 0);
    }
}
