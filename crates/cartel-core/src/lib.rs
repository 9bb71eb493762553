//! # Cartel Core
//!
//! Core types for the cartel economy engine:
//! - `Address` - member identity (Ed25519 verifying-key bytes)
//! - `CartelError` - the full error taxonomy, surfaced synchronously
//! - `Event` / `EventLog` - the append-only fact log consumed downstream
//! - truncating percentage and pro-rata share arithmetic
//!
//! The engine executes one state transition at a time to completion; a
//! transition either fully applies and emits its event, or has no effect.

pub mod error;
pub mod event;
pub mod math;
pub mod types;

pub use error::*;
pub use event::*;
pub use math::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{CartelError, Result};
    pub use crate::event::{Event, EventLog, SequencedEvent};
    pub use crate::math::{pct_of, pro_rata};
    pub use crate::types::{ActionKind, Address};
}
