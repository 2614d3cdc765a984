//! Lazy, offset-paginated views over native collections
//!
//! An [`Enumerator`] borrows its parent entity and reads every item on
//! demand through the parent's native accessors. It never caches and never
//! pages by itself: when `offset() + size() < total()`, the next window is a
//! new parent query starting at `offset() + size()`.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{HallonError, Result};

/// Native accessors for one collection kind of parent `P`.
pub struct Collection<P, T> {
    /// Position of the fetched window within all available items.
    pub offset: fn(&P) -> usize,
    /// Items in the fetched window.
    pub size: fn(&P) -> usize,
    /// Items available on the native side.
    pub total: fn(&P) -> usize,
    /// The item at an index, or `None` when the native side has none there.
    pub item: fn(&P, usize) -> Option<T>,
}

impl<P, T> Clone for Collection<P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for Collection<P, T> {}

pub struct Enumerator<'a, P, T> {
    parent: &'a P,
    table: Collection<P, T>,
}

impl<P, T> Clone for Enumerator<'_, P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for Enumerator<'_, P, T> {}

impl<'a, P, T> Enumerator<'a, P, T> {
    pub fn new(parent: &'a P, table: Collection<P, T>) -> Self {
        Self { parent, table }
    }

    pub fn size(&self) -> usize {
        (self.table.size)(self.parent)
    }

    pub fn total(&self) -> usize {
        (self.table.total)(self.parent)
    }

    pub fn offset(&self) -> usize {
        (self.table.offset)(self.parent)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether further windows exist beyond this one.
    pub fn has_more(&self) -> bool {
        self.offset().saturating_add(self.size()) < self.total()
    }

    pub fn get(&self, index: usize) -> Result<Option<T>> {
        let size = self.size();
        if index >= size {
            return Err(HallonError::IndexOutOfRange { index, size });
        }
        Ok((self.table.item)(self.parent, index))
    }

    /// Items from 0 to `size() - 1`, read fresh on every call.
    pub fn iter(&self) -> Iter<'a, P, T> {
        Iter {
            enumerator: *self,
            index: 0,
            end: self.size(),
        }
    }
}

impl<P, T> fmt::Debug for Enumerator<'_, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumerator")
            .field("offset", &self.offset())
            .field("size", &self.size())
            .field("total", &self.total())
            .finish()
    }
}

pub struct Iter<'a, P, T> {
    enumerator: Enumerator<'a, P, T>,
    index: usize,
    end: usize,
}

impl<P, T> Iterator for Iter<'_, P, T> {
    type Item = Option<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let item = (self.enumerator.table.item)(self.enumerator.parent, self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl<P, T> ExactSizeIterator for Iter<'_, P, T> {}

impl<P, T> FusedIterator for Iter<'_, P, T> {}

impl<'a, P, T> IntoIterator for &Enumerator<'a, P, T> {
    type Item = Option<T>;
    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, P, T> IntoIterator for Enumerator<'a, P, T> {
    type Item = Option<T>;
    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
