//! # Board
//!
//! Owner-administered, bump-ordered collection of thread handles.
//!
//! Position 0 is the most recently created, registered or bumped thread.
//! Every handle also carries an [`InternalId`] that survives bumps, so the
//! owner can detach a thread by either coordinate.
//!
//! Lock policy: creation, registration and detachment stay open to the owner
//! while the board is locked. Bumps never do, whoever asks.

use chrono::{DateTime, Utc};
use domains::{Address, DomainError, DomainResult, InternalId, Page, Post};
use tracing::{debug, info};

use crate::access::AccessController;
use crate::identity_index::IdentityIndex;
use crate::thread::{Thread, ThreadParent};

#[derive(Debug, Clone)]
pub struct Board {
    address: Address,
    access: AccessController,
    threads: IdentityIndex<Address>,
}

impl Board {
    /// A fresh board: owned by `owner`, unlocked, alive, empty.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            access: AccessController::new(owner),
            threads: IdentityIndex::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn is_locked(&self) -> bool {
        self.access.is_locked()
    }

    pub fn is_alive(&self) -> bool {
        self.access.is_alive()
    }

    /// Creates a thread at the front of the board.
    ///
    /// Open to anyone while unlocked; only the owner may create while locked.
    /// The returned thread is owned by the board's owner and must be handed to
    /// the host, the board only keeps its handle.
    pub fn create_thread(
        &mut self,
        caller: Address,
        title: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<(Thread, InternalId)> {
        self.access.require_lock_affectable(caller)?;
        let thread = Thread::attached(
            Address::generate(),
            self.address,
            self.owner(),
            title,
            Post::new(caller, now, text),
        )?;
        let id = self.threads.insert_front(thread.address());
        info!(board = %self.address, thread = %thread.address(), %id, "thread created");
        Ok((thread, id))
    }

    /// Adds an existing thread handle at the front. Owner only, lock exempt.
    ///
    /// The caller (host) is responsible for checking that `handle` is a thread.
    pub fn register_thread(&mut self, caller: Address, handle: Address) -> DomainResult<InternalId> {
        self.access.require_live_owner(caller)?;
        if self.threads.contains(&handle) {
            return Err(DomainError::DuplicateHandle(handle));
        }
        let id = self.threads.insert_front(handle);
        info!(board = %self.address, thread = %handle, %id, "thread registered");
        Ok(id)
    }

    pub fn detach_thread_by_index(&mut self, caller: Address, index: usize) -> DomainResult<Address> {
        self.access.require_live_owner(caller)?;
        let (id, handle) = self.threads.remove_at(index)?;
        info!(board = %self.address, thread = %handle, %id, index, "thread detached");
        Ok(handle)
    }

    pub fn detach_thread_by_internal_id(
        &mut self,
        caller: Address,
        id: InternalId,
    ) -> DomainResult<Address> {
        self.access.require_live_owner(caller)?;
        let handle = self.threads.remove_by_id(id)?;
        info!(board = %self.address, thread = %handle, %id, "thread detached");
        Ok(handle)
    }

    pub fn lock(&mut self, caller: Address) -> DomainResult<()> {
        self.access.lock(caller)?;
        info!(board = %self.address, "board locked");
        Ok(())
    }

    pub fn unlock(&mut self, caller: Address) -> DomainResult<()> {
        self.access.unlock(caller)?;
        info!(board = %self.address, "board unlocked");
        Ok(())
    }

    /// Tears the board down. Terminal; reads answer defaults from now on.
    pub fn destruct_board(&mut self, caller: Address) -> DomainResult<()> {
        self.access.destroy(caller)?;
        self.threads.clear();
        info!(board = %self.address, "board destroyed");
        Ok(())
    }

    pub fn thread_at(&self, index: usize) -> DomainResult<Address> {
        if !self.is_alive() {
            return Ok(Address::ZERO);
        }
        self.threads.get(index).copied()
    }

    pub fn first_thread(&self) -> DomainResult<Address> {
        self.thread_at(0)
    }

    pub fn last_thread(&self) -> DomainResult<Address> {
        match self.threads.len() {
            0 => self.thread_at(0),
            size => self.thread_at(size - 1),
        }
    }

    pub fn thread_array(&self, start: usize, count: usize) -> DomainResult<Page<Address>> {
        if !self.is_alive() {
            return Ok(Page::empty());
        }
        self.threads.slice(start, count)
    }

    pub fn number_of_threads(&self) -> usize {
        self.threads.len()
    }

    pub fn internal_id_of_index(&self, index: usize) -> DomainResult<InternalId> {
        if !self.is_alive() {
            return Ok(InternalId::default());
        }
        self.threads.id_of(index)
    }

    pub fn position_of_internal_id(&self, id: InternalId) -> DomainResult<usize> {
        if !self.is_alive() {
            return Ok(0);
        }
        self.threads.position_of(id)
    }

    pub fn is_registered(&self, handle: Address) -> bool {
        self.threads.contains(&handle)
    }
}

impl ThreadParent for Board {
    fn address(&self) -> Address {
        self.address
    }

    /// Only a registered thread may bump itself, and never while locked.
    fn bump_thread(&mut self, caller: Address) -> DomainResult<()> {
        self.access.require_alive()?;
        self.access.require_not_locked()?;
        let id = self
            .threads
            .id_of_handle(&caller)
            .ok_or(DomainError::Unauthorized(caller))?;
        self.threads.move_to_front(id)?;
        debug!(board = %self.address, thread = %caller, %id, "thread bumped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::from_label("owner")
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_500_000_000, 0).unwrap()
    }

    fn board() -> Board {
        Board::new(Address::generate(), owner())
    }

    fn create(board: &mut Board, caller: Address, title: &str) -> Thread {
        board.create_thread(caller, title, "text", now()).unwrap().0
    }

    fn order(board: &Board) -> Vec<Address> {
        let page = board.thread_array(0, board.number_of_threads()).unwrap();
        page.items
    }

    #[test]
    fn test_empty_board() {
        let board = board();
        assert_eq!(board.number_of_threads(), 0);
        assert!(board.thread_array(0, 1).is_err());
        assert!(board.thread_at(0).is_err());
        assert!(board.first_thread().is_err());
        assert!(board.last_thread().is_err());
        assert!(board.internal_id_of_index(0).is_err());
        assert!(!board.is_locked());
        assert!(board.is_alive());
    }

    #[test]
    fn test_created_threads_are_owned_by_board_owner() {
        let mut board = board();
        let (thread, id) = board.create_thread(alice(), "t", "op", now()).unwrap();
        assert_eq!(id, InternalId(0));
        assert_eq!(thread.owner(), owner());
        assert_eq!(thread.parent_board(), board.address());
        assert_eq!(thread.poster(0), Ok(alice()));
        assert_eq!(board.first_thread(), Ok(thread.address()));
        assert_eq!(board.last_thread(), Ok(thread.address()));
    }

    #[test]
    fn test_create_rejects_empty_text_without_registering() {
        let mut board = board();
        assert_eq!(
            board.create_thread(alice(), "t", "", now()).unwrap_err(),
            DomainError::EmptyPost
        );
        assert_eq!(board.number_of_threads(), 0);
        let (_, id) = board.create_thread(alice(), "t", "op", now()).unwrap();
        assert_eq!(id, InternalId(0));
    }

    #[test]
    fn test_detach_by_id_and_bump() {
        let mut board = board();
        let a = create(&mut board, alice(), "A");
        let b = create(&mut board, alice(), "B");
        let c = create(&mut board, alice(), "C");
        assert_eq!(order(&board), vec![c.address(), b.address(), a.address()]);

        let b_id = board.internal_id_of_index(1).unwrap();
        assert_eq!(board.detach_thread_by_internal_id(owner(), b_id), Ok(b.address()));
        assert_eq!(order(&board), vec![c.address(), a.address()]);

        let a_id = board.internal_id_of_index(1).unwrap();
        board.bump_thread(a.address()).unwrap();
        assert_eq!(order(&board), vec![a.address(), c.address()]);
        assert_eq!(board.internal_id_of_index(0), Ok(a_id));
        assert_eq!(board.position_of_internal_id(a_id), Ok(0));
    }

    #[test]
    fn test_bump_requires_registered_caller() {
        let mut board = board();
        let thread = create(&mut board, alice(), "t");
        assert_eq!(
            board.bump_thread(owner()),
            Err(DomainError::Unauthorized(owner()))
        );
        assert_eq!(
            board.bump_thread(alice()),
            Err(DomainError::Unauthorized(alice()))
        );
        board.detach_thread_by_index(owner(), 0).unwrap();
        assert_eq!(
            board.bump_thread(thread.address()),
            Err(DomainError::Unauthorized(thread.address()))
        );
    }

    #[test]
    fn test_owner_only_operations() {
        let mut board = board();
        create(&mut board, alice(), "t");
        let denied = Err(DomainError::Unauthorized(alice()));
        assert_eq!(board.detach_thread_by_index(alice(), 0).map(|_| ()), denied);
        assert_eq!(
            board.detach_thread_by_internal_id(alice(), InternalId(0)).map(|_| ()),
            denied
        );
        assert_eq!(board.lock(alice()), denied);
        assert_eq!(board.unlock(alice()), denied);
        assert_eq!(board.destruct_board(alice()), denied);
        assert_eq!(
            board.register_thread(alice(), Address::generate()).map(|_| ()),
            denied
        );
        assert_eq!(board.number_of_threads(), 1);
    }

    #[test]
    fn test_lock_exemption() {
        let mut board = board();
        let thread = create(&mut board, alice(), "t");
        board.lock(owner()).unwrap();
        assert!(board.is_locked());

        assert_eq!(
            board.create_thread(alice(), "no", "no", now()).unwrap_err(),
            DomainError::BoardLocked
        );
        assert_eq!(board.bump_thread(thread.address()), Err(DomainError::BoardLocked));

        let fresh = create(&mut board, owner(), "owner thread");
        assert_eq!(board.detach_thread_by_index(owner(), 0), Ok(fresh.address()));
        assert_eq!(
            board.detach_thread_by_internal_id(owner(), InternalId(0)),
            Ok(thread.address())
        );
        assert_eq!(board.number_of_threads(), 0);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut board = board();
        let handle = Address::generate();
        assert_eq!(board.register_thread(owner(), handle), Ok(InternalId(0)));
        assert_eq!(
            board.register_thread(owner(), handle),
            Err(DomainError::DuplicateHandle(handle))
        );
        board.lock(owner()).unwrap();
        assert_eq!(board.register_thread(owner(), Address::generate()), Ok(InternalId(1)));
    }

    #[test]
    fn test_detach_errors() {
        let mut board = board();
        assert_eq!(
            board.detach_thread_by_index(owner(), 0),
            Err(DomainError::out_of_range(0, 0))
        );
        assert_eq!(
            board.detach_thread_by_internal_id(owner(), InternalId(4)),
            Err(DomainError::UnknownId(InternalId(4)))
        );
    }

    #[test]
    fn test_destroyed_board_reads_defaults() {
        let mut board = board();
        let thread = create(&mut board, alice(), "t");
        board.lock(owner()).unwrap();
        board.destruct_board(owner()).unwrap();

        assert!(!board.is_alive());
        assert!(!board.is_locked());
        assert_eq!(board.thread_at(0), Ok(Address::ZERO));
        assert_eq!(board.first_thread(), Ok(Address::ZERO));
        assert_eq!(board.last_thread(), Ok(Address::ZERO));
        assert_eq!(board.thread_array(0, 5), Ok(Page::empty()));
        assert_eq!(board.internal_id_of_index(3), Ok(InternalId::default()));
        assert_eq!(board.position_of_internal_id(InternalId(0)), Ok(0));
        assert_eq!(board.position_of_internal_id(InternalId(9)), Ok(0));
        assert_eq!(board.number_of_threads(), 0);

        let gone = Err(DomainError::AlreadyDestroyed);
        assert_eq!(board.create_thread(owner(), "t", "t", now()).map(|_| ()), gone);
        assert_eq!(board.bump_thread(thread.address()), gone);
        assert_eq!(board.lock(owner()), gone);
        assert_eq!(board.unlock(owner()), gone);
        assert_eq!(board.destruct_board(owner()), gone);
        assert_eq!(board.detach_thread_by_index(owner(), 0).map(|_| ()), gone);
    }
}
