//! Sessions: the read/write/seek handle onto a shared device.

use crate::device::LogDevice;
use crate::error::{RingError, RingResult};
use crate::gate::Interrupt;
use std::io::{self, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// Identifies a session on its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// Returns the raw identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// An open handle onto a [`LogDevice`].
///
/// A session carries its own read cursor: a cumulative byte offset into the
/// concatenation of the held entries, oldest first. The cursor is not stable
/// across evictions. Once the oldest entry is evicted, the same offset
/// addresses whatever shifted into its place. With
/// [`DeviceConfig::detect_stale_cursors`](crate::DeviceConfig) enabled, reads
/// report [`RingError::StaleCursor`] instead until the session repositions.
///
/// Every operation waits for the device gate. Raising the session's
/// [`Interrupt`] (see [`Session::interrupt`]) cancels a pending wait with
/// [`RingError::Interrupted`].
///
/// Dropping a session closes it.
#[derive(Debug)]
pub struct Session {
    device: Arc<LogDevice>,
    id: SessionId,
    cursor: u64,
    /// Eviction generation when the cursor was last positioned.
    generation: u64,
    interrupt: Interrupt,
    closed: bool,
}

impl Session {
    pub(crate) fn new(device: Arc<LogDevice>, id: SessionId, generation: u64) -> Self {
        Self {
            device,
            id,
            cursor: 0,
            generation,
            interrupt: Interrupt::new(),
            closed: false,
        }
    }

    /// Returns this session's identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the device this session is open on.
    pub fn device(&self) -> &Arc<LogDevice> {
        &self.device
    }

    /// Returns the current read cursor.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Returns a handle that cancels this session's gate waits when raised.
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Writes a chunk of bytes.
    ///
    /// Bytes accumulate until a terminator completes a record, which is then
    /// committed, evicting the oldest entry if the ring is full. An empty
    /// chunk returns 0 without touching the device.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] or [`RingError::OutOfMemory`];
    /// in both cases nothing was accepted.
    pub fn write(&mut self, bytes: &[u8]) -> RingResult<usize> {
        self.device.write(self.id, bytes, &self.interrupt)
    }

    /// Reads from the session cursor into `buf` and advances the cursor.
    ///
    /// Returns 0 at the end of the held data. A single call never returns
    /// bytes from more than one entry.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`], or [`RingError::StaleCursor`] if
    /// stale cursor detection is enabled and entries were evicted since the
    /// cursor was positioned.
    pub fn read(&mut self, buf: &mut [u8]) -> RingResult<usize> {
        let since = self
            .device
            .config()
            .detect_stale_cursors
            .then_some(self.generation);
        let outcome = self
            .device
            .read_at(self.cursor, buf, since, &self.interrupt)?;
        self.cursor = outcome.cursor;
        Ok(outcome.copied)
    }

    /// Reads up to `max_bytes` starting at an explicit `cursor`.
    ///
    /// Returns the copied bytes and the cursor that follows them. The
    /// session cursor is not changed. At the end of the held data this
    /// returns no bytes and `cursor` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] or [`RingError::OutOfMemory`].
    pub fn read_at(&self, cursor: u64, max_bytes: usize) -> RingResult<(Vec<u8>, u64)> {
        self.device.read_to_vec(cursor, max_bytes, &self.interrupt)
    }

    /// Positions the cursor at byte `intra_offset` of held entry
    /// `entry_index`, counting from the oldest held entry.
    ///
    /// Returns the new cursor.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidArgument`] if the entry is not held or
    /// the offset is outside it; the cursor is unchanged.
    pub fn seek_to(&mut self, entry_index: usize, intra_offset: usize) -> RingResult<u64> {
        let (cursor, generation) = self
            .device
            .locate(entry_index, intra_offset, &self.interrupt)?;
        self.cursor = cursor;
        self.generation = generation;
        debug!(session = self.id.0, entry_index, intra_offset, cursor, "seek to entry");
        Ok(cursor)
    }

    /// Repositions the cursor relative to the start, the current position,
    /// or the end of the held data.
    ///
    /// The target must lie within `0..=total_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidArgument`] if the target falls outside
    /// the held data; the cursor is unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> RingResult<u64> {
        let (total, generation) = self.device.extent(&self.interrupt)?;
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.cursor) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(total) + i128::from(delta),
        };

        if target < 0 || target > i128::from(total) {
            return Err(RingError::invalid_argument(format!(
                "seek target {} outside held data of {} bytes",
                target, total
            )));
        }

        self.cursor = target as u64;
        self.generation = generation;
        Ok(self.cursor)
    }

    /// Closes the session.
    ///
    /// An unterminated record written by this session is discarded; it was
    /// never committed and cannot be recovered. Returns the number of
    /// discarded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Interrupted`] if the wait was cancelled. The
    /// pending record is then released when the session is dropped.
    pub fn close(mut self) -> RingResult<usize> {
        let interrupt = self.interrupt.clone();
        self.release(&interrupt)
    }

    fn release(&mut self, interrupt: &Interrupt) -> RingResult<usize> {
        if self.closed {
            return Ok(0);
        }
        let discarded = self.device.discard_pending(self.id, interrupt)?;
        self.closed = true;
        debug!(session = self.id.0, discarded, "session closed");
        Ok(discarded)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // an unraised interrupt waits for the gate unconditionally
        let _ = self.release(&Interrupt::new());
    }
}

impl io::Read for Session {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Session::read(self, buf)?)
    }
}

impl io::Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Session::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for Session {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(Session::seek(self, pos)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use std::io::{Read, Seek, Write};

    fn device(capacity: usize) -> Arc<LogDevice> {
        LogDevice::new(DeviceConfig::new().capacity(capacity)).unwrap()
    }

    fn read_all(session: &mut Session) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let n = Session::read(session, &mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn hello_round_trip() {
        let dev = device(10);
        let mut session = dev.open();
        assert_eq!(Session::write(&mut session, b"hello\n").unwrap(), 6);

        let (data, cursor) = session.read_at(0, 100).unwrap();
        assert_eq!(data, b"hello\n");
        assert_eq!(cursor, 6);

        let (data, cursor) = session.read_at(6, 100).unwrap();
        assert!(data.is_empty());
        assert_eq!(cursor, 6);
    }

    #[test]
    fn zero_length_write_is_noop() {
        let dev = device(10);
        let mut session = dev.open();
        for _ in 0..5 {
            assert_eq!(Session::write(&mut session, b"").unwrap(), 0);
        }
        let snap = dev.snapshot(&Interrupt::new()).unwrap();
        assert_eq!(snap.held_entries, 0);
        assert_eq!(snap.pending_bytes, 0);
        assert_eq!(snap.writes, 0);
    }

    #[test]
    fn read_advances_one_entry_per_call() {
        let dev = device(10);
        let mut session = dev.open();
        Session::write(&mut session, b"ab\n").unwrap();
        Session::write(&mut session, b"cde\n").unwrap();

        let mut buf = [0u8; 100];
        assert_eq!(Session::read(&mut session, &mut buf).unwrap(), 3);
        assert_eq!(session.position(), 3);
        assert_eq!(Session::read(&mut session, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"cde\n");
        assert_eq!(Session::read(&mut session, &mut buf).unwrap(), 0);
        assert_eq!(session.position(), 7);
    }

    #[test]
    fn eviction_scenario_with_capacity_three() {
        let dev = device(3);
        let mut writer = dev.open();
        for line in [&b"AAAA\n"[..], b"BB\n", b"C\n", b"DD\n"] {
            Session::write(&mut writer, line).unwrap();
        }

        let mut reader = dev.open();
        assert_eq!(read_all(&mut reader), b"BB\nC\nDD\n");

        assert_eq!(reader.seek_to(1, 0).unwrap(), 3);
        assert_eq!(read_all(&mut reader), b"C\nDD\n");

        let before = reader.position();
        assert!(matches!(
            reader.seek_to(5, 0),
            Err(RingError::InvalidArgument { .. })
        ));
        assert_eq!(reader.position(), before);
    }

    #[test]
    fn seek_to_zero_tracks_oldest() {
        let dev = device(2);
        let mut session = dev.open();
        for i in 0..7 {
            Session::write(&mut session, format!("line{}\n", i).as_bytes()).unwrap();
            assert_eq!(session.seek_to(0, 0).unwrap(), 0);
        }
        let (data, _) = session.read_at(0, 100).unwrap();
        assert_eq!(data, b"line5\n");
    }

    #[test]
    fn whence_seeking() {
        let dev = device(10);
        let mut session = dev.open();
        Session::write(&mut session, b"abc\ndef\n").unwrap();

        assert_eq!(Session::seek(&mut session, SeekFrom::End(0)).unwrap(), 8);
        assert_eq!(Session::seek(&mut session, SeekFrom::Current(-3)).unwrap(), 5);
        let mut buf = [0u8; 8];
        let n = Session::read(&mut session, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"ef\n");

        assert!(Session::seek(&mut session, SeekFrom::End(1)).is_err());
        assert!(Session::seek(&mut session, SeekFrom::Current(-100)).is_err());
        assert_eq!(session.position(), 8);
        assert_eq!(Session::seek(&mut session, SeekFrom::Start(2)).unwrap(), 2);
    }

    #[test]
    fn close_discards_own_pending_write() {
        let dev = device(10);
        let mut writer = dev.open();
        Session::write(&mut writer, b"never finished").unwrap();

        let reader = dev.open();
        assert_eq!(reader.close().unwrap(), 0);
        assert_eq!(dev.snapshot(&Interrupt::new()).unwrap().pending_bytes, 14);

        assert_eq!(writer.close().unwrap(), 14);
        let snap = dev.snapshot(&Interrupt::new()).unwrap();
        assert_eq!(snap.pending_bytes, 0);
        assert_eq!(snap.discarded_pending, 1);
        assert_eq!(snap.held_entries, 0);
    }

    #[test]
    fn close_discards_interleaved_pending_write() {
        let dev = device(10);
        let mut a = dev.open();
        let mut b = dev.open();
        Session::write(&mut a, b"abc").unwrap();
        Session::write(&mut b, b"def").unwrap();

        assert_eq!(a.close().unwrap(), 6);
        assert_eq!(dev.snapshot(&Interrupt::new()).unwrap().pending_bytes, 0);

        Session::write(&mut b, b"\n").unwrap();
        assert_eq!(dev.entries(&Interrupt::new()).unwrap(), vec![b"\n".to_vec()]);
    }

    #[test]
    fn drop_closes_session() {
        let dev = device(10);
        {
            let mut writer = dev.open();
            Session::write(&mut writer, b"partial").unwrap();
        }
        assert_eq!(dev.snapshot(&Interrupt::new()).unwrap().pending_bytes, 0);
    }

    #[test]
    fn stale_cursor_detection() {
        let dev = LogDevice::new(
            DeviceConfig::new()
                .capacity(2)
                .detect_stale_cursors(true),
        )
        .unwrap();
        let mut writer = dev.open();
        Session::write(&mut writer, b"a\nb\n").unwrap();

        let mut reader = dev.open();
        let mut buf = [0u8; 8];
        assert_eq!(Session::read(&mut reader, &mut buf).unwrap(), 2);

        Session::write(&mut writer, b"c\n").unwrap();
        assert!(matches!(
            Session::read(&mut reader, &mut buf),
            Err(RingError::StaleCursor { .. })
        ));

        reader.seek_to(0, 0).unwrap();
        assert_eq!(Session::read(&mut reader, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"b\n");
    }

    #[test]
    fn teardown_makes_cursor_stale() {
        let dev = LogDevice::new(DeviceConfig::new().detect_stale_cursors(true)).unwrap();
        let mut writer = dev.open();
        Session::write(&mut writer, b"AAAA\nBB\n").unwrap();

        let mut reader = dev.open();
        let mut buf = [0u8; 2];
        assert_eq!(Session::read(&mut reader, &mut buf).unwrap(), 2);

        dev.teardown(&Interrupt::new()).unwrap();
        Session::write(&mut writer, b"xyz\n").unwrap();
        assert!(matches!(
            Session::read(&mut reader, &mut buf),
            Err(RingError::StaleCursor { .. })
        ));

        Seek::rewind(&mut reader).unwrap();
        assert_eq!(Session::read(&mut reader, &mut buf).unwrap(), 2);
        assert_eq!(&buf, b"xy");
    }

    #[test]
    fn interrupted_read_leaves_cursor() {
        let dev = device(10);
        let mut session = dev.open();
        Session::write(&mut session, b"x\n").unwrap();

        session.interrupt().raise();
        let mut buf = [0u8; 8];
        assert!(matches!(
            Session::read(&mut session, &mut buf),
            Err(RingError::Interrupted)
        ));
        assert_eq!(session.position(), 0);
        assert_eq!(Session::read(&mut session, &mut buf).unwrap(), 2);
    }

    #[test]
    fn std_io_adapters() {
        let dev = device(10);
        let mut session = dev.open();
        Write::write_all(&mut session, b"first\nsecond\n").unwrap();
        Write::flush(&mut session).unwrap();

        let mut text = String::new();
        Read::read_to_string(&mut session, &mut text).unwrap();
        assert_eq!(text, "first\nsecond\n");

        Seek::rewind(&mut session).unwrap();
        let mut buf = [0u8; 3];
        Read::read_exact(&mut session, &mut buf).unwrap();
        assert_eq!(&buf, b"fir");

        let err = Seek::seek(&mut session, SeekFrom::End(10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
