//! Engine configuration
//!
//! All economy parameters in one serde-deserializable struct. Defaults
//! come from the constants in `cartel-core`; percentages are validated to
//! at most 100 so steal and penalty amounts can never exceed the balance
//! they are computed from.

use cartel_core::error::{CartelError, Result};
use cartel_core::types::constants::*;
use serde::{Deserialize, Serialize};

/// Economy parameters for a [`crate::GameEngine`](crate::GameEngine)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Settlement credits charged to join (may be zero)
    pub join_fee: u128,

    /// Settlement credits charged per standard raid
    pub raid_fee: u128,

    /// Settlement credits charged per high-stakes raid
    pub high_stakes_fee: u128,

    /// Percentage of the target's shares a standard raid steals
    pub raid_steal_pct: u8,

    /// Percentage of the target's shares a high-stakes raid steals
    pub hs_steal_pct: u8,

    /// Percentage of the attacker's pre-raid shares burned as self-penalty
    pub hs_penalty_pct: u8,

    /// Shares minted to every new member
    pub starting_shares: u128,

    /// Shares minted to an active referrer at join
    pub referral_bonus: u128,

    /// Minimum seconds between profit distributions
    pub distribution_cooldown_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            join_fee: JOIN_FEE,
            raid_fee: RAID_FEE,
            high_stakes_fee: HIGH_STAKES_FEE,
            raid_steal_pct: RAID_STEAL_PCT,
            hs_steal_pct: HS_STEAL_PCT,
            hs_penalty_pct: HS_PENALTY_PCT,
            starting_shares: STARTING_SHARES,
            referral_bonus: REFERRAL_BONUS_SHARES,
            distribution_cooldown_secs: DISTRIBUTION_COOLDOWN_SECS,
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("raid_steal_pct", self.raid_steal_pct),
            ("hs_steal_pct", self.hs_steal_pct),
            ("hs_penalty_pct", self.hs_penalty_pct),
        ] {
            if pct > 100 {
                return Err(CartelError::InvalidConfig(format!(
                    "{name} must be at most 100, got {pct}"
                )));
            }
        }
        if self.starting_shares == 0 {
            return Err(CartelError::InvalidConfig(
                "starting_shares must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
