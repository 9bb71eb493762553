//! Core type definitions for the cartel economy
//!
//! Identities are Ed25519 verifying keys; the ledger and treasury deal in
//! two units: shares (the single fungible ownership unit) and settlement
//! credits (the stable-value currency fees and payouts are denominated in).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Address - a member identity, the raw bytes of an Ed25519 verifying key
///
/// Serializes as a hex string so addresses read naturally in JSON output
/// and can key serialized maps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address {
    key: [u8; 32],
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Address {
    /// Create an address from raw verifying-key bytes
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut key = [0u8; 32];
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Zero address (never a valid signer)
    pub const ZERO: Self = Self { key: [0u8; 32] };
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

/// Actions a member can authorize the vault to execute on their behalf
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Standard raid against a target member
    Raid,

    /// High-stakes raid: bigger steal, self-penalty burn
    HighStakesRaid,

    /// Claim accumulated profit distributions
    ClaimProfit,

    /// Retire from the cartel, burning all shares for a payout
    Retire,
}

impl ActionKind {
    /// Convert to u8 for payload encoding
    pub fn as_u8(&self) -> u8 {
        match self {
            ActionKind::Raid => 0,
            ActionKind::HighStakesRaid => 1,
            ActionKind::ClaimProfit => 2,
            ActionKind::Retire => 3,
        }
    }

    /// Create from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ActionKind::Raid),
            1 => Some(ActionKind::HighStakesRaid),
            2 => Some(ActionKind::ClaimProfit),
            3 => Some(ActionKind::Retire),
            _ => None,
        }
    }

    /// Whether this action carries a target address in its payload
    pub fn takes_target(&self) -> bool {
        matches!(self, ActionKind::Raid | ActionKind::HighStakesRaid)
    }

    /// Action name for logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Raid => "raid",
            ActionKind::HighStakesRaid => "high_stakes_raid",
            ActionKind::ClaimProfit => "claim_profit",
            ActionKind::Retire => "retire",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// System constants - the default economy parameters
pub mod constants {
    /// Shares minted to every new member at join
    pub const STARTING_SHARES: u128 = 100;

    /// Shares minted to an active referrer when their referee joins
    pub const REFERRAL_BONUS_SHARES: u128 = 25;

    /// Settlement credits charged to join
    pub const JOIN_FEE: u128 = 10;

    /// Settlement credits charged per standard raid
    pub const RAID_FEE: u128 = 5;

    /// Settlement credits charged per high-stakes raid
    pub const HIGH_STAKES_FEE: u128 = 15;

    /// Percentage of the target's shares stolen by a standard raid
    pub const RAID_STEAL_PCT: u8 = 10;

    /// Percentage of the target's shares stolen by a high-stakes raid
    pub const HS_STEAL_PCT: u8 = 20;

    /// Percentage of the attacker's own pre-raid shares burned by a
    /// high-stakes raid
    pub const HS_PENALTY_PCT: u8 = 3;

    /// Minimum seconds between profit distributions (rolling 24h window)
    pub const DISTRIBUTION_COOLDOWN_SECS: u64 = 24 * 3600;

    /// Reputation earned per standard raid
    pub const RAID_REPUTATION: u64 = 1;

    /// Reputation earned per high-stakes raid
    pub const HIGH_STAKES_REPUTATION: u64 = 2;
}
