//! Time source seam.
//!
//! The engine consults the clock on creation, contribution, and detail
//! update. Keeping it behind a trait lets tests drive deadlines without
//! sleeping.

use chrono::Utc;

/// Current time as unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}
