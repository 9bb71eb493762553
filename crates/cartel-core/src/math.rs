//! Truncating share arithmetic
//!
//! All percentage and pro-rata computations floor toward zero; the rounding
//! policy is truncation everywhere it applies (steals, penalties,
//! distributions). `pct_of` decomposes the amount so the intermediate
//! product cannot overflow `u128` for any input.

use crate::error::{CartelError, Result};

/// Exact floor of `amount * pct / 100`, overflow-free for all inputs
///
/// Decomposition: with `amount = 100q + r`, the result is
/// `q * pct + (r * pct) / 100`, and `r * pct < 100 * 100` always fits.
pub fn pct_of(amount: u128, pct: u8) -> u128 {
    debug_assert!(pct <= 100);
    let q = amount / 100;
    let r = amount % 100;
    q * pct as u128 + r * pct as u128 / 100
}

/// Floor of `pool * share / total`
///
/// Fails with `Overflow` if the intermediate product exceeds `u128`;
/// returns 0 when `total` is 0.
pub fn pro_rata(pool: u128, share: u128, total: u128) -> Result<u128> {
    if total == 0 {
        return Ok(0);
    }
    pool.checked_mul(share)
        .map(|product| product / total)
        .ok_or(CartelError::Overflow)
}
