//! Coalescing of partial writes into complete entries.

use crate::entry::Entry;
use crate::error::RingResult;
#[cfg(test)]
use std::cell::Cell;
use std::mem;

/// Outcome of [`WriteAccumulator::append`].
#[derive(Debug, PartialEq, Eq)]
pub enum Appended {
    /// No terminator was seen; the bytes were added to the pending record.
    Incomplete,
    /// One or more records were completed, in the order they were written.
    ///
    /// A well-formed writer sends one terminated record per call, so this
    /// normally holds a single entry. Bytes following the last terminator
    /// stay pending.
    Completed(Vec<Entry>),
}

impl Appended {
    /// Returns the completed entries, if any.
    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            Self::Incomplete => Vec::new(),
            Self::Completed(entries) => entries,
        }
    }
}

/// Accumulates written chunks until a terminator completes a record.
///
/// The pending bytes are never handed out before a terminator has been
/// observed. Once handed out, pending is reset and ownership of the bytes
/// moves into the new [`Entry`].
#[derive(Debug)]
pub struct WriteAccumulator {
    pending: Vec<u8>,
    terminator: u8,
    /// Reservations allowed before an injected allocation failure.
    #[cfg(test)]
    fail_after: Cell<Option<usize>>,
}

impl WriteAccumulator {
    /// Creates an empty accumulator completing records on `terminator`.
    #[must_use]
    pub fn new(terminator: u8) -> Self {
        Self {
            pending: Vec::new(),
            terminator,
            #[cfg(test)]
            fail_after: Cell::new(None),
        }
    }

    /// Appends a chunk of written bytes.
    ///
    /// Every terminator in `chunk` completes a record. Bytes after the last
    /// terminator start the next pending record. An empty chunk changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::OutOfMemory`](crate::RingError::OutOfMemory) if
    /// buffer space cannot be reserved. All space is reserved before any byte
    /// is moved, so the pending record is unchanged on failure.
    pub fn append(&mut self, chunk: &[u8]) -> RingResult<Appended> {
        let terminator = self.terminator;
        let mut segments = chunk.split_inclusive(|&b| b == terminator);

        let Some(head) = segments.next() else {
            return Ok(Appended::Incomplete);
        };

        if head.last() != Some(&terminator) {
            // split_inclusive yields a single unterminated segment here
            self.may_reserve()?;
            self.pending.try_reserve(head.len())?;
            self.pending.extend_from_slice(head);
            return Ok(Appended::Incomplete);
        }

        let count = chunk.iter().filter(|&&b| b == terminator).count();
        let mut completed = Vec::new();
        self.may_reserve()?;
        completed.try_reserve_exact(count)?;
        self.may_reserve()?;
        self.pending.try_reserve(head.len())?;

        let mut rest = Vec::new();
        self.may_reserve()?;
        rest.try_reserve_exact(count - 1)?;
        let mut tail = Vec::new();
        for segment in segments {
            let mut buf = Vec::new();
            self.may_reserve()?;
            buf.try_reserve_exact(segment.len())?;
            buf.extend_from_slice(segment);
            if segment.last() == Some(&terminator) {
                rest.push(Entry::new(buf));
            } else {
                tail = buf;
            }
        }

        self.pending.extend_from_slice(head);
        completed.push(Entry::new(mem::replace(&mut self.pending, tail)));
        completed.extend(rest);
        Ok(Appended::Completed(completed))
    }

    /// Returns the number of pending, unterminated bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if a partial record is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns the record terminator byte.
    #[must_use]
    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    /// Drops the pending record and releases its storage.
    ///
    /// Returns the number of bytes discarded.
    pub fn discard(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending = Vec::new();
        discarded
    }

    #[cfg(not(test))]
    #[inline]
    fn may_reserve(&self) -> RingResult<()> {
        Ok(())
    }

    #[cfg(test)]
    fn may_reserve(&self) -> RingResult<()> {
        match self.fail_after.get() {
            Some(0) => {
                Vec::<u8>::new().try_reserve(usize::MAX)?;
                Ok(())
            }
            Some(n) => {
                self.fail_after.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}
