//! Period deltas between the current pool state and a prior snapshot.

use {
    crate::model::{Pool, PoolSnapshot},
    bigdecimal::BigDecimal,
    chrono::{DateTime, Duration, Utc},
};

/// Swap fees collected since `prior`. Without a snapshot the delta is
/// unknown and reported as zero, never as the lifetime total.
///
/// The result is not clamped, a negative delta is passed on as is.
pub fn fees_snapshot(pool: &Pool, prior: Option<&PoolSnapshot>) -> BigDecimal {
    match prior {
        Some(prior) => &pool.total_swap_fee - &prior.total_swap_fee,
        None => BigDecimal::from(0),
    }
}

/// Swap volume since `prior`, following the same rules as [`fees_snapshot`].
pub fn volume_snapshot(pool: &Pool, prior: Option<&PoolSnapshot>) -> BigDecimal {
    match prior {
        Some(prior) => &pool.total_swap_volume - &prior.total_swap_volume,
        None => BigDecimal::from(0),
    }
}

/// Whether the pool was created less than `window` before `now`. New pools
/// are expected to lack snapshots.
pub fn is_new(pool: &Pool, now: DateTime<Utc>, window: Duration) -> bool {
    match DateTime::from_timestamp(pool.create_time, 0) {
        Some(created) => now.signed_duration_since(created) < window,
        None => {
            tracing::warn!(create_time = pool.create_time, "invalid pool creation time");
            false
        }
    }
}
