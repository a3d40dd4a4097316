//! # IndexedList
//!
//! Position-addressable ordered collection. Position 0 is always the most
//! recently inserted element; positions stay contiguous in `[0, len)`.

use std::collections::VecDeque;
use std::ops::Range;

use domains::{DomainError, DomainResult, Page};

#[derive(Debug, Clone)]
pub struct IndexedList<T> {
    items: VecDeque<T>,
}

impl<T> Default for IndexedList<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> IndexedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front and returns the new position (always `0`).
    pub fn prepend(&mut self, item: T) -> usize {
        self.items.push_front(item);
        0
    }

    pub fn get(&self, index: usize) -> DomainResult<&T> {
        self.items
            .get(index)
            .ok_or_else(|| DomainError::out_of_range(index, self.items.len()))
    }

    /// Removes the element at `index`; everything behind it shifts down by one.
    pub fn remove_at(&mut self, index: usize) -> DomainResult<T> {
        let size = self.items.len();
        self.items
            .remove(index)
            .ok_or_else(|| DomainError::out_of_range(index, size))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> IndexedList<T> {
    /// Returns up to `count` elements starting at `start`.
    ///
    /// Fails on an empty list even for `(0, 0)`: there is no valid page over nothing.
    pub fn slice(&self, start: usize, count: usize) -> DomainResult<Page<T>> {
        let range = page_range(self.items.len(), start, count)?;
        let items: Vec<T> = self.items.range(range).cloned().collect();
        Ok(Page {
            count: items.len(),
            items,
        })
    }
}

/// Bounds contract shared by every array getter.
pub(crate) fn page_range(size: usize, start: usize, count: usize) -> DomainResult<Range<usize>> {
    if start >= size {
        return Err(DomainError::out_of_range(start, size));
    }
    let actual = count.min(size - start);
    Ok(start..start + actual)
}
