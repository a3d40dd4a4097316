//! # IdentityIndex
//!
//! Stable-id layer over [`IndexedList`]. Every inserted handle receives an
//! [`InternalId`] that survives reordering, so callers can address a record
//! either by its current position or by the id it was born with.

use domains::{DomainError, DomainResult, InternalId, Page};

use crate::indexed_list::IndexedList;

#[derive(Debug, Clone)]
struct Entry<T> {
    id: InternalId,
    handle: T,
}

#[derive(Debug, Clone)]
pub struct IdentityIndex<T> {
    entries: IndexedList<Entry<T>>,
    next_id: u64,
}

impl<T> Default for IdentityIndex<T> {
    fn default() -> Self {
        Self {
            entries: IndexedList::new(),
            next_id: 0,
        }
    }
}

impl<T> IdentityIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `handle` and binds it to a fresh id.
    pub fn insert_front(&mut self, handle: T) -> InternalId {
        let id = InternalId(self.next_id);
        self.next_id += 1;
        self.entries.prepend(Entry { id, handle });
        id
    }

    pub fn get(&self, position: usize) -> DomainResult<&T> {
        self.entries.get(position).map(|entry| &entry.handle)
    }

    pub fn id_of(&self, position: usize) -> DomainResult<InternalId> {
        self.entries.get(position).map(|entry| entry.id)
    }

    pub fn position_of(&self, id: InternalId) -> DomainResult<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(DomainError::UnknownId(id))
    }

    pub fn remove_at(&mut self, position: usize) -> DomainResult<(InternalId, T)> {
        self.entries
            .remove_at(position)
            .map(|entry| (entry.id, entry.handle))
    }

    pub fn remove_by_id(&mut self, id: InternalId) -> DomainResult<T> {
        let position = self.position_of(id)?;
        self.remove_at(position).map(|(_, handle)| handle)
    }

    /// Bump primitive: moves `id` to position 0 while keeping the id.
    pub fn move_to_front(&mut self, id: InternalId) -> DomainResult<()> {
        let position = self.position_of(id)?;
        let entry = self.entries.remove_at(position)?;
        self.entries.prepend(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Issued ids stay retired.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: PartialEq> IdentityIndex<T> {
    /// Id currently bound to `handle`, if it is registered.
    pub fn id_of_handle(&self, handle: &T) -> Option<InternalId> {
        self.entries
            .iter()
            .find(|entry| entry.handle == *handle)
            .map(|entry| entry.id)
    }

    pub fn contains(&self, handle: &T) -> bool {
        self.id_of_handle(handle).is_some()
    }
}

impl<T: Clone> IdentityIndex<T> {
    pub fn slice(&self, start: usize, count: usize) -> DomainResult<Page<T>> {
        self.entries
            .slice(start, count)
            .map(|page| page.map(|entry| entry.handle))
    }
}
