//! # Domain Models
//!
//! These types represent the core entities of bump-board.
//! Accounts, boards and threads share one identity type, [`Address`], so a
//! thread can call into its board the same way an account does.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text written over a soft-deleted post.
pub const TOMBSTONE_TEXT: &str = "にゃーん";

/// Opaque 128-bit identity of an account, a board, or a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Uuid);

impl Address {
    /// The default handle answered by reads on a torn-down instance.
    pub const ZERO: Address = Address(Uuid::nil());

    /// Sentinel poster written into tombstoned posts.
    pub const TOMBSTONE: Address = Address(Uuid::from_bytes([0x22; 16]));

    /// Allocates a fresh, time-ordered address (UUID v7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Derives a stable address from an account label (UUID v5).
    pub fn from_label(label: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes()))
    }

    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Stable identity a board assigns to every inserted handle.
///
/// Issued from `0` upward, never reused, and unchanged by bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalId(pub u64);

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The fundamental unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub poster: Address,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl Post {
    pub fn new(poster: Address, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            poster,
            timestamp,
            text: text.into(),
        }
    }

    /// The fixed triple a soft-deleted post is overwritten with.
    pub fn tombstone() -> Self {
        Self {
            poster: Address::TOMBSTONE,
            timestamp: epoch(),
            text: TOMBSTONE_TEXT.to_string(),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        *self == Self::tombstone()
    }
}

impl Default for Post {
    /// What a destroyed thread answers for any post.
    fn default() -> Self {
        Self {
            poster: Address::ZERO,
            timestamp: epoch(),
            text: String::new(),
        }
    }
}

/// A contiguous run of a collection returned by array getters.
///
/// `count` is authoritative; `items` never holds more than `count` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The zero timestamp (Unix epoch).
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}
