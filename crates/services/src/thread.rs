//! # Thread
//!
//! An ordered post log with an immutable title. Post 0 is the opening post
//! and is permanent; later posts can only be soft-deleted (tombstoned), so
//! post indices never shift.
//!
//! A thread is either attached to a board (created by it, owned by the
//! board's owner, bumping the board on every post) or standalone (owned by
//! the account that created it, bumping nothing).

use chrono::{DateTime, Utc};
use domains::{Address, DomainError, DomainResult, Page, Post};
use tracing::{debug, info};

use crate::access::AccessController;
use crate::indexed_list::page_range;

/// The callback a thread uses to announce fresh activity to its board.
pub trait ThreadParent {
    fn address(&self) -> Address;

    /// Moves `caller` to the front of the parent's collection.
    fn bump_thread(&mut self, caller: Address) -> DomainResult<()>;
}

#[derive(Debug, Clone)]
pub struct Thread {
    address: Address,
    parent: Option<Address>,
    title: String,
    posts: Vec<Post>,
    /// Owner delegate: for attached threads this is the board's owner.
    access: AccessController,
}

impl Thread {
    /// Creates a thread that belongs to no board.
    pub fn standalone(
        address: Address,
        owner: Address,
        title: impl Into<String>,
        opening: Post,
    ) -> DomainResult<Self> {
        Self::build(address, None, owner, title.into(), opening)
    }

    /// Creates a thread whose ownership is its board's ownership.
    pub fn attached(
        address: Address,
        board: Address,
        board_owner: Address,
        title: impl Into<String>,
        opening: Post,
    ) -> DomainResult<Self> {
        Self::build(address, Some(board), board_owner, title.into(), opening)
    }

    fn build(
        address: Address,
        parent: Option<Address>,
        owner: Address,
        title: String,
        opening: Post,
    ) -> DomainResult<Self> {
        if opening.text.is_empty() {
            return Err(DomainError::EmptyPost);
        }
        Ok(Self {
            address,
            parent,
            title,
            posts: vec![opening],
            access: AccessController::new(owner),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Raw back-reference used by the host to route bumps.
    pub fn parent(&self) -> Option<Address> {
        self.parent
    }

    pub fn is_alive(&self) -> bool {
        self.access.is_alive()
    }

    /// Appends a post and bumps the parent board.
    ///
    /// The bump runs before the post is committed: if the board refuses it,
    /// the log is left untouched and the error is returned as is.
    pub fn post(
        &mut self,
        caller: Address,
        text: &str,
        now: DateTime<Utc>,
        parent: Option<&mut dyn ThreadParent>,
    ) -> DomainResult<usize> {
        self.access.require_alive()?;
        if text.is_empty() {
            return Err(DomainError::EmptyPost);
        }

        match (self.parent, parent) {
            (Some(expected), Some(board)) if board.address() == expected => {
                board.bump_thread(self.address)?;
            }
            (Some(expected), _) => return Err(DomainError::UnknownAddress(expected)),
            (None, _) => {}
        }

        self.posts.push(Post::new(caller, now, text));
        let index = self.posts.len() - 1;
        debug!(thread = %self.address, %caller, index, "post appended");
        Ok(index)
    }

    /// Soft-deletes post `index` by overwriting it with the tombstone triple.
    ///
    /// Idempotent: a tombstoned post can be tombstoned again.
    pub fn remove_post(&mut self, caller: Address, index: usize) -> DomainResult<()> {
        self.access.require_live_owner(caller)?;
        if index == 0 {
            return Err(DomainError::ProtectedRecord(index));
        }
        let size = self.posts.len();
        let post = self
            .posts
            .get_mut(index)
            .ok_or_else(|| DomainError::out_of_range(index, size))?;
        *post = Post::tombstone();
        info!(thread = %self.address, index, "post tombstoned");
        Ok(())
    }

    /// Tears the thread down; afterwards every read answers defaults.
    pub fn destruct_thread(&mut self, caller: Address) -> DomainResult<()> {
        self.access.destroy(caller)?;
        self.title.clear();
        self.posts.clear();
        self.parent = None;
        info!(thread = %self.address, "thread destroyed");
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn number_of_posts(&self) -> usize {
        self.posts.len()
    }

    pub fn parent_board(&self) -> Address {
        self.parent.unwrap_or(Address::ZERO)
    }

    pub fn post_at(&self, index: usize) -> DomainResult<Post> {
        if !self.is_alive() {
            return Ok(Post::default());
        }
        self.posts
            .get(index)
            .cloned()
            .ok_or_else(|| DomainError::out_of_range(index, self.posts.len()))
    }

    pub fn poster(&self, index: usize) -> DomainResult<Address> {
        self.post_at(index).map(|post| post.poster)
    }

    pub fn post_timestamp(&self, index: usize) -> DomainResult<DateTime<Utc>> {
        self.post_at(index).map(|post| post.timestamp)
    }

    pub fn post_text(&self, index: usize) -> DomainResult<String> {
        self.post_at(index).map(|post| post.text)
    }

    pub fn poster_array(&self, start: usize, count: usize) -> DomainResult<Page<Address>> {
        self.post_array(start, count, |post| post.poster)
    }

    pub fn post_timestamp_array(
        &self,
        start: usize,
        count: usize,
    ) -> DomainResult<Page<DateTime<Utc>>> {
        self.post_array(start, count, |post| post.timestamp)
    }

    pub fn post_text_array(&self, start: usize, count: usize) -> DomainResult<Page<String>> {
        self.post_array(start, count, |post| post.text.clone())
    }

    fn post_array<T>(
        &self,
        start: usize,
        count: usize,
        field: impl Fn(&Post) -> T,
    ) -> DomainResult<Page<T>> {
        if !self.is_alive() {
            return Ok(Page::empty());
        }
        let range = page_range(self.posts.len(), start, count)?;
        let items: Vec<T> = self.posts[range].iter().map(field).collect();
        Ok(Page {
            count: items.len(),
            items,
        })
    }
}
