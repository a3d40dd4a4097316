#![allow(dead_code)]

use chrono::{DateTime, Utc};
use domains::{Address, MockClock};
use services::Registry;

/// Start of the fake timeline handed out by [`ticking_clock`].
pub const T0: i64 = 1_520_000_000;

/// Numbered accounts, `account(0)` deploys boards in every suite.
pub fn account(n: usize) -> Address {
    Address::from_label(&format!("account-{n}"))
}

pub fn owner() -> Address {
    account(0)
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap()
}

/// A clock that advances one second per reading, starting at [`T0`].
pub fn ticking_clock() -> MockClock {
    let mut clock = MockClock::new();
    let mut next = T0;
    clock.expect_now().returning(move || {
        let now = at(next);
        next += 1;
        now
    });
    clock
}

pub fn registry() -> Registry<MockClock> {
    Registry::new(ticking_clock())
}
