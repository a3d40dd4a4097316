//! # AccessController
//!
//! Owner identity plus the `Active -> Locked -> Destroyed` state machine that
//! gates every mutation on a board or thread.
//!
//! Checks always run in the same order: liveness, then ownership, then lock.
//! A torn-down instance therefore answers `AlreadyDestroyed` to everybody.

use domains::{Address, DomainError, DomainResult};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Active,
    Locked,
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct AccessController {
    /// Fixed at construction; ownership is not transferable.
    owner: Address,
    state: AccessState,
}

impl AccessController {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            state: AccessState::Active,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn is_owner(&self, caller: Address) -> bool {
        caller == self.owner
    }

    pub fn is_locked(&self) -> bool {
        self.state == AccessState::Locked
    }

    pub fn is_alive(&self) -> bool {
        self.state != AccessState::Destroyed
    }

    pub fn require_owner(&self, caller: Address) -> DomainResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            warn!(%caller, owner = %self.owner, "rejected non-owner caller");
            Err(DomainError::Unauthorized(caller))
        }
    }

    pub fn require_not_locked(&self) -> DomainResult<()> {
        if self.is_locked() {
            Err(DomainError::BoardLocked)
        } else {
            Ok(())
        }
    }

    pub fn require_alive(&self) -> DomainResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(DomainError::AlreadyDestroyed)
        }
    }

    /// Gate for lock-exempt operations: the owner passes even while locked.
    pub fn require_lock_affectable(&self, caller: Address) -> DomainResult<()> {
        self.require_alive()?;
        if self.is_owner(caller) {
            return Ok(());
        }
        self.require_not_locked()
    }

    /// Gate for owner-only operations that the lock does not affect.
    pub fn require_live_owner(&self, caller: Address) -> DomainResult<()> {
        self.require_alive()?;
        self.require_owner(caller)
    }

    pub fn lock(&mut self, caller: Address) -> DomainResult<()> {
        self.require_live_owner(caller)?;
        self.state = AccessState::Locked;
        Ok(())
    }

    pub fn unlock(&mut self, caller: Address) -> DomainResult<()> {
        self.require_live_owner(caller)?;
        self.state = AccessState::Active;
        Ok(())
    }

    /// Terminal transition; there is no way back to `Active`.
    pub fn destroy(&mut self, caller: Address) -> DomainResult<()> {
        self.require_live_owner(caller)?;
        self.state = AccessState::Destroyed;
        Ok(())
    }
}
