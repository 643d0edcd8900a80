//! Translation between cumulative byte positions and entry positions.
//!
//! All positions are relative to the oldest entry currently held. Eviction
//! silently renumbers everything: entry index 0 is always the oldest held
//! entry, and cumulative offset 0 is always its first byte.

use crate::entry::Entry;
use crate::error::{RingError, RingResult};
use crate::store::RingStore;

/// A resolved position inside one held entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    /// Position of the entry counting from the oldest held entry.
    pub entry_index: usize,
    /// The entry containing the position.
    pub entry: &'a Entry,
    /// Byte offset within the entry.
    pub intra_offset: usize,
}

impl<'a> Location<'a> {
    /// Returns the bytes from the resolved position to the end of the entry.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.entry.as_bytes()[self.intra_offset..]
    }
}

/// Resolves a cumulative byte `cursor` to the entry containing it.
///
/// Returns `None` when `cursor >= store.total_bytes()`, which is the end of
/// the held data rather than an error.
pub fn locate_by_cursor(store: &RingStore, cursor: u64) -> Option<Location<'_>> {
    let mut bytes_before = 0u64;
    for (entry_index, entry) in store.held_entries().enumerate() {
        let size = entry.size() as u64;
        if cursor < bytes_before + size {
            return Some(Location {
                entry_index,
                entry,
                intra_offset: (cursor - bytes_before) as usize,
            });
        }
        bytes_before += size;
    }
    None
}

/// Converts an (entry index, intra-entry offset) pair into a cumulative
/// byte position.
///
/// # Errors
///
/// Returns [`RingError::InvalidArgument`] if `entry_index` is not a held
/// entry or `intra_offset` is not inside that entry.
pub fn locate_by_index(store: &RingStore, entry_index: usize, intra_offset: usize) -> RingResult<u64> {
    let held = store.held_count();
    let entry = store.get(entry_index).ok_or_else(|| {
        RingError::invalid_argument(format!(
            "entry index {} out of range ({} entries held)",
            entry_index, held
        ))
    })?;

    if intra_offset >= entry.size() {
        return Err(RingError::invalid_argument(format!(
            "offset {} out of range for entry {} of {} bytes",
            intra_offset,
            entry_index,
            entry.size()
        )));
    }

    let bytes_before: u64 = store
        .held_entries()
        .take(entry_index)
        .map(|e| e.size() as u64)
        .sum();
    Ok(bytes_before + intra_offset as u64)
}
