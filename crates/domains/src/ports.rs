//! # Core Traits (Ports)
//!
//! Collaborators the engine consumes from whatever host embeds it.
//! Caller identity is not a port: every operation takes the caller explicitly.

use chrono::{DateTime, Utc};

/// Timestamp source for post creation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
