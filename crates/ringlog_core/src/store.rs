//! Fixed-capacity ring of committed entries.

use crate::entry::Entry;
use crate::error::{RingError, RingResult};
use std::iter::FusedIterator;

/// A fixed-capacity circular store of committed entries.
///
/// The store is an arena of `capacity` slots addressed by two indices that
/// wrap modulo the capacity. Held entries form the contiguous run starting at
/// `read_index`. When the store is full, committing a new entry evicts the
/// entry at `read_index` and nothing else.
///
/// # Invariants
///
/// - `write_index == read_index` iff the store is full or empty; `full`
///   tells the two apart
/// - `held_count() <= capacity()`
/// - every held slot is `Some`, every other slot is `None`
///
/// The store performs no locking; callers serialize access.
#[derive(Debug)]
pub struct RingStore {
    slots: Vec<Option<Entry>>,
    write_index: usize,
    read_index: usize,
    full: bool,
}

impl RingStore {
    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidConfig`] if `capacity` is zero.
    pub fn new(capacity: usize) -> RingResult<Self> {
        if capacity == 0 {
            return Err(RingError::invalid_config("ring capacity must be at least 1"));
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            write_index: 0,
            read_index: 0,
            full: false,
        })
    }

    /// Commits `entry` as the newest held entry.
    ///
    /// If the store was full, the oldest entry is evicted and returned.
    /// Committing never fails.
    pub fn commit(&mut self, entry: Entry) -> Option<Entry> {
        debug_assert!(!entry.is_empty(), "zero-length entries are never committed");

        let evicted = if self.full {
            let oldest = self.slots[self.read_index].take();
            self.read_index = self.advance(self.read_index);
            oldest
        } else {
            None
        };

        self.slots[self.write_index] = Some(entry);
        self.write_index = self.advance(self.write_index);
        self.full = self.write_index == self.read_index;
        evicted
    }

    /// Returns an iterator over held entries, oldest first.
    pub fn held_entries(&self) -> HeldEntries<'_> {
        HeldEntries {
            store: self,
            position: 0,
            remaining: self.held_count(),
        }
    }

    /// Returns the entry `index` positions after the oldest held entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        if index >= self.held_count() {
            return None;
        }
        let slot = (self.read_index + index) % self.capacity();
        self.slots[slot].as_ref()
    }

    /// Returns the sum of the sizes of all held entries.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.held_entries().map(|e| e.size() as u64).sum()
    }

    /// Returns the number of held entries.
    #[must_use]
    pub fn held_count(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.write_index + self.capacity() - self.read_index) % self.capacity()
        }
    }

    /// Returns the maximum number of entries the store can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.write_index == self.read_index
    }

    /// Returns true if the next commit will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Releases every held entry and resets the indices.
    ///
    /// Returns the number of entries released.
    pub fn clear(&mut self) -> usize {
        let released = self.held_count();
        for slot in &mut self.slots {
            *slot = None;
        }
        self.write_index = 0;
        self.read_index = 0;
        self.full = false;
        released
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }
}

/// Iterator over held entries, oldest to newest.
#[derive(Debug, Clone)]
pub struct HeldEntries<'a> {
    store: &'a RingStore,
    position: usize,
    remaining: usize,
}

impl<'a> Iterator for HeldEntries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.store.get(self.position);
        self.position += 1;
        self.remaining -= 1;
        entry
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for HeldEntries<'_> {}

impl FusedIterator for HeldEntries<'_> {}
