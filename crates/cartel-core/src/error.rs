//! Error types for cartel economy operations

use crate::types::Address;
use thiserror::Error;

/// Result type alias for cartel operations
pub type Result<T> = std::result::Result<T, CartelError>;

/// Errors that can occur in cartel economy operations
///
/// Every error is surfaced synchronously to the caller of the failing
/// operation; a rejected transition has zero side effects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartelError {
    // === Membership ===
    /// Address has already joined and is active
    #[error("Member already joined: {0}")]
    AlreadyJoined(Address),

    /// Action requires active membership
    #[error("Not an active member: {0}")]
    NotJoined(Address),

    /// Address retired previously; exit is terminal
    #[error("Member has exited and cannot rejoin: {0}")]
    MemberExited(Address),

    /// A member cannot refer themself
    #[error("Self-referral is not allowed")]
    SelfReferral,

    /// A member cannot raid themself
    #[error("Self-targeting is not allowed")]
    SelfTarget,

    // === Balances ===
    /// A share debit exceeds the available balance
    #[error("Insufficient shares: {address} has {available}, needs {required}")]
    InsufficientShares {
        address: Address,
        available: u128,
        required: u128,
    },

    /// A settlement debit exceeds the available balance
    #[error("Insufficient settlement funds: {address} has {available}, needs {required}")]
    InsufficientFunds {
        address: Address,
        available: u128,
        required: u128,
    },

    /// A delegated action fee exceeds the member's prepaid vault balance
    #[error("Insufficient vault balance: {address} has {available}, needs {required}")]
    InsufficientVaultBalance {
        address: Address,
        available: u128,
        required: u128,
    },

    /// A credit would exceed the representable range
    #[error("Arithmetic overflow")]
    Overflow,

    // === Treasury ===
    /// Distribution cooldown has not elapsed
    #[error("Distribution cooldown not elapsed: {remaining_secs}s remaining")]
    TooSoon { remaining_secs: u64 },

    /// No pending profit to claim
    #[error("Nothing to claim for {0}")]
    NothingToClaim(Address),

    // === Access control ===
    /// Caller is not in the authorized-agent registry
    #[error("Caller is not an authorized agent: {0}")]
    NotAuthorizedAgent(Address),

    /// Caller is not the operator
    #[error("Caller is not the operator: {0}")]
    NotOperator(Address),

    // === Delegated execution ===
    /// Signature does not verify over the reconstructed payload
    #[error("Invalid authorization signature")]
    InvalidSignature,

    /// Delegated action deadline has passed
    #[error("Authorization expired: deadline {deadline}, now {now}")]
    Expired { deadline: i64, now: i64 },

    // === Configuration ===
    /// Engine configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Numeric error codes for API-style responses
impl CartelError {
    /// Get the error code for API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::AlreadyJoined(_) => 1001,
            Self::NotJoined(_) => 1002,
            Self::MemberExited(_) => 1003,
            Self::SelfReferral | Self::SelfTarget => 1004,
            Self::InsufficientShares { .. } => 2001,
            Self::InsufficientFunds { .. } => 2002,
            Self::InsufficientVaultBalance { .. } => 2003,
            Self::Overflow => 2004,
            Self::TooSoon { .. } => 3001,
            Self::NothingToClaim(_) => 3002,
            Self::NotAuthorizedAgent(_) => 4001,
            Self::NotOperator(_) => 4002,
            Self::InvalidSignature => 5001,
            Self::Expired { .. } => 5002,
            Self::InvalidConfig(_) => 9001,
        }
    }

    /// Check if retrying the identical call can ever succeed
    ///
    /// `InvalidSignature` for a replayed authorization is permanent: the
    /// nonce it was computed over is spent, so only a fresh signature helps.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TooSoon { .. } | Self::InsufficientFunds { .. })
    }
}
