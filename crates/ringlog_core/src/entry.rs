//! Committed log entries.

use std::fmt;

/// One committed, terminator-delimited record held in the ring.
///
/// An entry owns its bytes. Its size is always the length of its data and is
/// never zero once committed.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    data: Vec<u8>,
}

impl Entry {
    /// Creates an entry taking ownership of `data`.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the entry's bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the size of the entry in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the entry holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the entry and returns its bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<&[u8]> for Entry {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl AsRef<[u8]> for Entry {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("data", &String::from_utf8_lossy(&self.data))
            .field("size", &self.data.len())
            .finish()
    }
}
