//! Device statistics.
//!
//! Counters are atomic so they can be read without entering the device
//! gate. Ring occupancy is sampled under the gate by
//! [`LogDevice::snapshot`](crate::LogDevice::snapshot).

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for a log device.
///
/// All counters are monotonically increasing.
#[derive(Debug, Default)]
pub struct DeviceStats {
    /// Total number of non-empty write calls.
    writes: AtomicU64,
    /// Total bytes accepted by writes.
    bytes_written: AtomicU64,
    /// Total number of read calls that returned data.
    reads: AtomicU64,
    /// Total bytes copied out by reads.
    bytes_read: AtomicU64,
    /// Total number of entries committed.
    commits: AtomicU64,
    /// Total number of entries evicted.
    evictions: AtomicU64,
    /// Total number of pending records discarded on close.
    discarded_pending: AtomicU64,
    /// Total number of gate acquisitions cancelled by an interrupt.
    interrupts: AtomicU64,
}

impl DeviceStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discard(&self) {
        self.discarded_pending.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of write calls.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the total bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the total number of reads that returned data.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the total number of committed entries.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Returns the total number of evicted entries.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns the number of pending records discarded on close.
    pub fn discarded_pending(&self) -> u64 {
        self.discarded_pending.load(Ordering::Relaxed)
    }

    /// Returns the number of interrupted gate acquisitions.
    pub fn interrupts(&self) -> u64 {
        self.interrupts.load(Ordering::Relaxed)
    }
}

/// A point-in-time view of a device.
///
/// Unlike [`DeviceStats`], this is a plain struct that can be serialized,
/// compared, or sent across threads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Maximum number of held entries.
    pub capacity: usize,
    /// Entries currently held.
    pub held_entries: usize,
    /// Bytes currently held across all entries.
    pub held_bytes: u64,
    /// Bytes of the unterminated pending record.
    pub pending_bytes: usize,
    /// Total number of write calls.
    pub writes: u64,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Total number of reads that returned data.
    pub reads: u64,
    /// Total bytes read.
    pub bytes_read: u64,
    /// Total committed entries.
    pub commits: u64,
    /// Total evicted entries.
    pub evictions: u64,
    /// Pending records discarded on close.
    pub discarded_pending: u64,
    /// Interrupted gate acquisitions.
    pub interrupts: u64,
}
