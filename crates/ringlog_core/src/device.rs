//! The shared log device.
//!
//! A [`LogDevice`] owns one ring and one write accumulator behind a single
//! gate. Sessions share the device through an `Arc`; every operation enters
//! the gate, works on the state, copies out whatever it returns and leaves
//! the gate before returning.

use crate::accumulator::{Appended, WriteAccumulator};
use crate::config::DeviceConfig;
use crate::error::{RingError, RingResult};
use crate::gate::{Gate, Interrupt};
use crate::offset::{locate_by_cursor, locate_by_index};
use crate::session::{Session, SessionId};
use crate::stats::{DeviceStats, StatsSnapshot};
use crate::store::RingStore;
use parking_lot::MutexGuard;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// State guarded by the device gate.
#[derive(Debug)]
struct DeviceState {
    store: RingStore,
    accumulator: WriteAccumulator,
    /// Sessions whose bytes make up the pending record.
    contributors: Vec<SessionId>,
}

/// Result of a positioned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes copied into the caller's buffer.
    pub copied: usize,
    /// Cursor following the copied bytes.
    pub cursor: u64,
}

/// A bounded circular log shared by any number of sessions.
///
/// # Example
///
/// ```rust
/// use ringlog_core::{DeviceConfig, LogDevice};
///
/// let device = LogDevice::new(DeviceConfig::new().capacity(3)).unwrap();
/// let mut session = device.open();
///
/// session.write(b"hello\n").unwrap();
///
/// let mut buf = [0u8; 100];
/// let n = session.read(&mut buf).unwrap();
/// assert_eq!(&buf[..n], b"hello\n");
/// assert_eq!(session.read(&mut buf).unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct LogDevice {
    gate: Gate<DeviceState>,
    config: DeviceConfig,
    stats: DeviceStats,
    /// Advanced whenever held entries are released; only under the gate.
    generation: AtomicU64,
    next_session: AtomicU64,
}

impl LogDevice {
    /// Creates an empty device.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidConfig`] if the configuration is rejected.
    pub fn new(config: DeviceConfig) -> RingResult<Arc<Self>> {
        config.validate()?;
        let state = DeviceState {
            store: RingStore::new(config.capacity)?,
            accumulator: WriteAccumulator::new(config.terminator),
            contributors: Vec::new(),
        };
        debug!(capacity = config.capacity, "log device initialized");
        Ok(Arc::new(Self {
            gate: Gate::new(state, config.interrupt_poll_interval),
            config,
            stats: DeviceStats::new(),
            generation: AtomicU64::new(0),
            next_session: AtomicU64::new(1),
        }))
    }

    /// Opens a new session positioned at the start of the held data.
    pub fn open(self: &Arc<Self>) -> Session {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let generation = self.generation();
        debug!(session = id.0, "session opened");
        Session::new(Arc::clone(self), id, generation)
    }

    /// Returns the device configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns the eviction generation.
    ///
    /// It advances with every eviction and with every [`LogDevice::teardown`]
    /// that released entries.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the device counters.
    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    /// Feeds `bytes` to the accumulator on behalf of `session`, committing
    /// every completed record.
    ///
    /// Returns the number of bytes accepted, which is always `bytes.len()`.
    ///
    /// # Errors
    ///
    /// - [`RingError::Interrupted`] if the wait for the gate was cancelled
    /// - [`RingError::OutOfMemory`] if buffer space could not be reserved;
    ///   nothing was accepted
    pub fn write(&self, session: SessionId, bytes: &[u8], interrupt: &Interrupt) -> RingResult<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }

        let mut state = self.enter(interrupt)?;
        if !state.contributors.contains(&session) {
            state.contributors.try_reserve(1)?;
        }
        let appended = state.accumulator.append(bytes)?;
        match appended {
            Appended::Incomplete => {
                if !state.contributors.contains(&session) {
                    state.contributors.push(session);
                }
                trace!(session = session.0, len = bytes.len(), "partial write buffered");
            }
            Appended::Completed(entries) => {
                // bytes after the last terminator came from this write alone
                state.contributors.clear();
                if state.accumulator.has_pending() {
                    state.contributors.push(session);
                }
                for entry in entries {
                    let size = entry.size();
                    if let Some(evicted) = state.store.commit(entry) {
                        self.generation.fetch_add(1, Ordering::AcqRel);
                        self.stats.record_eviction();
                        debug!(size = evicted.size(), "evicted oldest entry");
                    }
                    self.stats.record_commit();
                    debug!(
                        session = session.0,
                        size,
                        held = state.store.held_count(),
                        "committed entry"
                    );
                }
            }
        }
        drop(state);

        self.stats.record_write(bytes.len() as u64);
        Ok(bytes.len())
    }

    /// Copies bytes starting at `cursor` into `buf`.
    ///
    /// At most the rest of the entry containing `cursor` is copied; reads
    /// never span two entries. A cursor at or past the end of the held data
    /// yields zero bytes and an unchanged cursor.
    ///
    /// If `since_generation` is given, the read fails with
    /// [`RingError::StaleCursor`] when entries were evicted after that
    /// generation.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait for the gate was
    /// cancelled, or [`RingError::StaleCursor`] as described above.
    pub fn read_at(
        &self,
        cursor: u64,
        buf: &mut [u8],
        since_generation: Option<u64>,
        interrupt: &Interrupt,
    ) -> RingResult<ReadOutcome> {
        self.read_with(cursor, since_generation, interrupt, |available| {
            let copied = available.len().min(buf.len());
            buf[..copied].copy_from_slice(&available[..copied]);
            Ok(copied)
        })
    }

    /// Copies up to `max_bytes` starting at `cursor` into a new buffer.
    ///
    /// Returns the copied bytes and the cursor following them. Same
    /// single-entry and end-of-data rules as [`LogDevice::read_at`].
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled, or
    /// [`RingError::OutOfMemory`] if the output buffer cannot be allocated.
    pub fn read_to_vec(
        &self,
        cursor: u64,
        max_bytes: usize,
        interrupt: &Interrupt,
    ) -> RingResult<(Vec<u8>, u64)> {
        let mut out = Vec::new();
        let outcome = self.read_with(cursor, None, interrupt, |available| {
            let copied = available.len().min(max_bytes);
            out.try_reserve_exact(copied)?;
            out.extend_from_slice(&available[..copied]);
            Ok(copied)
        })?;
        Ok((out, outcome.cursor))
    }

    fn read_with<F>(
        &self,
        cursor: u64,
        since_generation: Option<u64>,
        interrupt: &Interrupt,
        copy: F,
    ) -> RingResult<ReadOutcome>
    where
        F: FnOnce(&[u8]) -> RingResult<usize>,
    {
        let state = self.enter(interrupt)?;

        if let Some(cursor_generation) = since_generation {
            let device_generation = self.generation();
            if cursor_generation != device_generation {
                return Err(RingError::StaleCursor {
                    cursor_generation,
                    device_generation,
                });
            }
        }

        let Some(location) = locate_by_cursor(&state.store, cursor) else {
            trace!(cursor, "read at end of held data");
            return Ok(ReadOutcome { copied: 0, cursor });
        };

        let copied = copy(location.remaining())?;
        drop(state);

        if copied > 0 {
            self.stats.record_read(copied as u64);
        }
        trace!(cursor, copied, "read");
        Ok(ReadOutcome {
            copied,
            cursor: cursor + copied as u64,
        })
    }

    /// Resolves an (entry index, intra-entry offset) pair to a cursor.
    ///
    /// Returns the cursor together with the current eviction generation.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidArgument`] if the pair does not address a
    /// held byte, or [`RingError::Interrupted`].
    pub fn locate(
        &self,
        entry_index: usize,
        intra_offset: usize,
        interrupt: &Interrupt,
    ) -> RingResult<(u64, u64)> {
        let state = self.enter(interrupt)?;
        let cursor = locate_by_index(&state.store, entry_index, intra_offset)?;
        Ok((cursor, self.generation()))
    }

    /// Returns the number of held bytes and the current eviction generation.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled.
    pub fn extent(&self, interrupt: &Interrupt) -> RingResult<(u64, u64)> {
        let state = self.enter(interrupt)?;
        Ok((state.store.total_bytes(), self.generation()))
    }

    /// Returns copies of every held entry, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled.
    pub fn entries(&self, interrupt: &Interrupt) -> RingResult<Vec<Vec<u8>>> {
        let state = self.enter(interrupt)?;
        Ok(state
            .store
            .held_entries()
            .map(|e| e.as_bytes().to_vec())
            .collect())
    }

    /// Returns the counters together with the current ring occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled.
    pub fn snapshot(&self, interrupt: &Interrupt) -> RingResult<StatsSnapshot> {
        let state = self.enter(interrupt)?;
        Ok(StatsSnapshot {
            capacity: state.store.capacity(),
            held_entries: state.store.held_count(),
            held_bytes: state.store.total_bytes(),
            pending_bytes: state.accumulator.pending_len(),
            writes: self.stats.writes(),
            bytes_written: self.stats.bytes_written(),
            reads: self.stats.reads(),
            bytes_read: self.stats.bytes_read(),
            commits: self.stats.commits(),
            evictions: self.stats.evictions(),
            discarded_pending: self.stats.discarded_pending(),
            interrupts: self.stats.interrupts(),
        })
    }

    /// Discards the pending record if `session` contributed bytes to it.
    ///
    /// Returns the number of bytes discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled.
    pub fn discard_pending(&self, session: SessionId, interrupt: &Interrupt) -> RingResult<usize> {
        let mut state = self.enter(interrupt)?;
        if !state.contributors.contains(&session) {
            return Ok(0);
        }
        state.contributors.clear();
        let discarded = state.accumulator.discard();
        drop(state);

        self.stats.record_discard();
        warn!(session = session.0, bytes = discarded, "discarded unterminated write");
        Ok(discarded)
    }

    /// Releases every held entry and any pending record.
    ///
    /// The device stays usable afterwards, starting empty. Returns the
    /// number of entries released.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled.
    pub fn teardown(&self, interrupt: &Interrupt) -> RingResult<usize> {
        let mut state = self.enter(interrupt)?;
        let released = state.store.clear();
        state.accumulator.discard();
        state.contributors.clear();
        if released > 0 {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        debug!(released, "log device torn down");
        Ok(released)
    }

    fn enter(&self, interrupt: &Interrupt) -> RingResult<MutexGuard<'_, DeviceState>> {
        self.gate.enter(interrupt).inspect_err(|_| {
            self.stats.record_interrupt();
        })
    }
}
