//! # Registry
//!
//! In-process host for boards and threads. It allocates addresses, supplies
//! the clock, resolves addresses to instances, and performs the one
//! cross-instance call of the model: a thread's post bumping its board.
//!
//! Torn-down instances stay registered in their `Destroyed` state so their
//! reads keep degrading to defaults instead of turning into lookup failures.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domains::{Address, Clock, DomainError, DomainResult, InternalId, Page, Post, SystemClock};
use tracing::{info, instrument};

use crate::board::Board;
use crate::thread::{Thread, ThreadParent};

pub struct Registry<C = SystemClock> {
    clock: C,
    boards: HashMap<Address, Board>,
    threads: HashMap<Address, Thread>,
}

impl Default for Registry<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Registry<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            boards: HashMap::new(),
            threads: HashMap::new(),
        }
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    pub fn board(&self, address: Address) -> DomainResult<&Board> {
        self.boards
            .get(&address)
            .ok_or(DomainError::UnknownAddress(address))
    }

    pub fn thread(&self, address: Address) -> DomainResult<&Thread> {
        self.threads
            .get(&address)
            .ok_or(DomainError::UnknownAddress(address))
    }

    fn board_mut(&mut self, address: Address) -> DomainResult<&mut Board> {
        self.boards
            .get_mut(&address)
            .ok_or(DomainError::UnknownAddress(address))
    }

    fn thread_mut(&mut self, address: Address) -> DomainResult<&mut Thread> {
        self.threads
            .get_mut(&address)
            .ok_or(DomainError::UnknownAddress(address))
    }

    pub fn is_thread(&self, address: Address) -> bool {
        self.threads.contains_key(&address)
    }

    // ── Deployment ──────────────────────────────────────────────────────────

    /// Creates an empty board owned by `caller`.
    pub fn deploy_board(&mut self, caller: Address) -> Address {
        let address = Address::generate();
        self.boards.insert(address, Board::new(address, caller));
        info!(board = %address, owner = %caller, "board deployed");
        address
    }

    /// Creates a standalone thread owned by `caller`.
    pub fn deploy_thread(&mut self, caller: Address, title: &str, text: &str) -> DomainResult<Address> {
        let address = Address::generate();
        let opening = Post::new(caller, self.clock.now(), text);
        let thread = Thread::standalone(address, caller, title, opening)?;
        self.threads.insert(address, thread);
        info!(thread = %address, owner = %caller, "standalone thread deployed");
        Ok(address)
    }

    // ── Board operations ────────────────────────────────────────────────────

    #[instrument(level = "debug", skip_all, fields(%caller, %board))]
    pub fn create_thread(
        &mut self,
        caller: Address,
        board: Address,
        title: &str,
        text: &str,
    ) -> DomainResult<Address> {
        let now = self.clock.now();
        let (thread, _) = self.board_mut(board)?.create_thread(caller, title, text, now)?;
        let address = thread.address();
        self.threads.insert(address, thread);
        Ok(address)
    }

    /// Registers an existing thread into `board`. Only thread addresses qualify.
    pub fn register_thread(
        &mut self,
        caller: Address,
        board: Address,
        handle: Address,
    ) -> DomainResult<InternalId> {
        if !self.is_thread(handle) {
            return Err(DomainError::UnknownAddress(handle));
        }
        self.board_mut(board)?.register_thread(caller, handle)
    }

    /// Direct bump request from `caller`; succeeds only when `caller` is a live
    /// thread registered in `board`.
    pub fn bump_thread(&mut self, caller: Address, board: Address) -> DomainResult<()> {
        if !self.threads.get(&caller).is_some_and(Thread::is_alive) {
            return Err(DomainError::Unauthorized(caller));
        }
        self.board_mut(board)?.bump_thread(caller)
    }

    pub fn detach_thread_by_index(
        &mut self,
        caller: Address,
        board: Address,
        index: usize,
    ) -> DomainResult<Address> {
        self.board_mut(board)?.detach_thread_by_index(caller, index)
    }

    pub fn detach_thread_by_internal_id(
        &mut self,
        caller: Address,
        board: Address,
        id: InternalId,
    ) -> DomainResult<Address> {
        self.board_mut(board)?.detach_thread_by_internal_id(caller, id)
    }

    pub fn lock(&mut self, caller: Address, board: Address) -> DomainResult<()> {
        self.board_mut(board)?.lock(caller)
    }

    pub fn unlock(&mut self, caller: Address, board: Address) -> DomainResult<()> {
        self.board_mut(board)?.unlock(caller)
    }

    pub fn destruct_board(&mut self, caller: Address, board: Address) -> DomainResult<()> {
        self.board_mut(board)?.destruct_board(caller)
    }

    // ── Thread operations ───────────────────────────────────────────────────

    /// Appends a post to `thread` and bumps its board, atomically.
    #[instrument(level = "debug", skip_all, fields(%caller, %thread))]
    pub fn post(&mut self, caller: Address, thread: Address, text: &str) -> DomainResult<usize> {
        let now = self.clock.now();
        let target = self
            .threads
            .get_mut(&thread)
            .ok_or(DomainError::UnknownAddress(thread))?;
        let parent = match target.parent() {
            Some(board) => {
                let board = self
                    .boards
                    .get_mut(&board)
                    .ok_or(DomainError::UnknownAddress(board))?;
                Some(board as &mut dyn ThreadParent)
            }
            None => None,
        };
        target.post(caller, text, now, parent)
    }

    pub fn remove_post(&mut self, caller: Address, thread: Address, index: usize) -> DomainResult<()> {
        self.thread_mut(thread)?.remove_post(caller, index)
    }

    pub fn destruct_thread(&mut self, caller: Address, thread: Address) -> DomainResult<()> {
        self.thread_mut(thread)?.destruct_thread(caller)
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub fn thread_at(&self, board: Address, index: usize) -> DomainResult<Address> {
        self.board(board)?.thread_at(index)
    }

    pub fn thread_array(&self, board: Address, start: usize, count: usize) -> DomainResult<Page<Address>> {
        self.board(board)?.thread_array(start, count)
    }

    /// Titles of a page of threads, in board order.
    pub fn thread_titles(&self, board: Address, start: usize, count: usize) -> DomainResult<Page<String>> {
        let page = self.thread_array(board, start, count)?;
        let items = page
            .items
            .iter()
            .map(|address| self.thread(*address).map(|t| t.title().to_string()))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page {
            items,
            count: page.count,
        })
    }

    pub fn post_at(&self, thread: Address, index: usize) -> DomainResult<Post> {
        self.thread(thread)?.post_at(index)
    }

    pub fn post_timestamp(&self, thread: Address, index: usize) -> DomainResult<DateTime<Utc>> {
        self.thread(thread)?.post_timestamp(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockClock;

    fn owner() -> Address {
        Address::from_label("owner")
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn fixed_clock(seconds: i64) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(DateTime::from_timestamp(seconds, 0).unwrap());
        clock
    }

    #[test]
    fn test_post_bumps_and_stamps() {
        let mut registry = Registry::new(fixed_clock(77));
        let board = registry.deploy_board(owner());
        let a = registry.create_thread(alice(), board, "A", "a").unwrap();
        let b = registry.create_thread(alice(), board, "B", "b").unwrap();
        assert_eq!(registry.thread_at(board, 0), Ok(b));

        assert_eq!(registry.post(alice(), a, "bump"), Ok(1));
        assert_eq!(registry.thread_at(board, 0), Ok(a));
        assert_eq!(
            registry.post_timestamp(a, 1),
            Ok(DateTime::from_timestamp(77, 0).unwrap())
        );
    }

    #[test]
    fn test_locked_board_rejects_post_atomically() {
        let mut registry = Registry::new(fixed_clock(1));
        let board = registry.deploy_board(owner());
        let thread = registry.create_thread(alice(), board, "t", "t").unwrap();
        registry.lock(owner(), board).unwrap();

        assert_eq!(registry.post(owner(), thread, "x"), Err(DomainError::BoardLocked));
        assert_eq!(registry.thread(thread).unwrap().number_of_posts(), 1);
    }

    #[test]
    fn test_detached_thread_cannot_post() {
        let mut registry = Registry::new(fixed_clock(1));
        let board = registry.deploy_board(owner());
        let thread = registry.create_thread(alice(), board, "t", "t").unwrap();
        registry.detach_thread_by_index(owner(), board, 0).unwrap();

        assert_eq!(
            registry.post(alice(), thread, "x"),
            Err(DomainError::Unauthorized(thread))
        );
        assert_eq!(registry.thread(thread).unwrap().title(), "t");
    }

    #[test]
    fn test_register_only_accepts_threads() {
        let mut registry = Registry::new(fixed_clock(1));
        let board = registry.deploy_board(owner());
        let decoy = registry.deploy_board(alice());
        assert_eq!(
            registry.register_thread(owner(), board, decoy),
            Err(DomainError::UnknownAddress(decoy))
        );

        let standalone = registry.deploy_thread(owner(), "t", "t").unwrap();
        assert_eq!(registry.register_thread(owner(), board, standalone), Ok(InternalId(0)));
        // standalone threads never bump, even when registered
        assert_eq!(registry.post(alice(), standalone, "reply"), Ok(1));
    }

    #[test]
    fn test_destroyed_thread_cannot_bump() {
        let mut registry = Registry::new(fixed_clock(1));
        let board = registry.deploy_board(owner());
        let a = registry.create_thread(alice(), board, "A", "a").unwrap();
        let b = registry.create_thread(alice(), board, "B", "b").unwrap();
        let c = registry.create_thread(alice(), board, "C", "c").unwrap();
        registry.destruct_thread(owner(), a).unwrap();

        assert_eq!(registry.bump_thread(a, board), Err(DomainError::Unauthorized(a)));
        let order = registry.thread_array(board, 0, 3).unwrap().items;
        assert_eq!(order, vec![c, b, a]);

        // a live registered thread still bumps directly
        registry.bump_thread(b, board).unwrap();
        assert_eq!(registry.thread_at(board, 0), Ok(b));
    }

    #[test]
    fn test_unknown_addresses() {
        let mut registry = Registry::new(fixed_clock(1));
        let nowhere = Address::generate();
        assert_eq!(
            registry.post(alice(), nowhere, "x"),
            Err(DomainError::UnknownAddress(nowhere))
        );
        assert!(registry.thread_at(nowhere, 0).is_err());
    }

    #[test]
    fn test_thread_titles_in_board_order() {
        let mut registry = Registry::new(fixed_clock(1));
        let board = registry.deploy_board(owner());
        for title in ["A", "B", "C"] {
            registry.create_thread(alice(), board, title, "text").unwrap();
        }
        let titles = registry.thread_titles(board, 0, 10).unwrap();
        assert_eq!(titles.count, 3);
        assert_eq!(titles.items, vec!["C", "B", "A"]);
    }
}
