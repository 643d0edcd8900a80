//! Property tests for record coalescing, eviction and addressing.

use proptest::prelude::*;
use ringlog_core::{DeviceConfig, Interrupt, LogDevice, RingError, SessionId};

/// Byte streams drawn from a small alphabet so terminators are frequent.
fn stream_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'\n']), 0..200)
}

/// Splits `stream` into consecutive chunks using the given cut lengths.
fn chunk<'a>(stream: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = stream;
    for &cut in cuts {
        if rest.is_empty() {
            break;
        }
        let n = cut.min(rest.len());
        chunks.push(&rest[..n]);
        rest = &rest[n..];
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

fn expected_records(stream: &[u8]) -> Vec<Vec<u8>> {
    stream
        .split_inclusive(|&b| b == b'\n')
        .filter(|s| s.last() == Some(&b'\n'))
        .map(<[u8]>::to_vec)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn chunking_does_not_change_records(
        stream in stream_strategy(),
        cuts in prop::collection::vec(0usize..12, 0..64),
        capacity in 1usize..16,
    ) {
        let device = LogDevice::new(DeviceConfig::new().capacity(capacity)).unwrap();
        let mut session = device.open();
        for piece in chunk(&stream, &cuts) {
            prop_assert_eq!(session.write(piece).unwrap(), piece.len());
        }

        let expected = expected_records(&stream);
        let keep = expected.len().min(capacity);
        let held = device.entries(&Interrupt::new()).unwrap();
        prop_assert_eq!(&held[..], &expected[expected.len() - keep..]);

        let snap = device.snapshot(&Interrupt::new()).unwrap();
        prop_assert_eq!(snap.commits as usize, expected.len());
        prop_assert_eq!(snap.evictions as usize, expected.len() - keep);
        prop_assert!(snap.held_entries <= capacity);
    }

    #[test]
    fn sequential_read_yields_concatenation(
        stream in stream_strategy(),
        capacity in 1usize..8,
        buf_len in 1usize..16,
    ) {
        let device = LogDevice::new(DeviceConfig::new().capacity(capacity)).unwrap();
        let mut writer = device.open();
        writer.write(&stream).unwrap();

        let held: Vec<u8> = device.entries(&Interrupt::new()).unwrap().concat();

        let mut reader = device.open();
        let mut out = Vec::new();
        let mut buf = vec![0u8; buf_len];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        prop_assert_eq!(out, held);
    }

    #[test]
    fn seek_to_origin_is_oldest_entry(
        lines in prop::collection::vec("[a-z]{1,8}", 1..40),
        capacity in 1usize..10,
    ) {
        let device = LogDevice::new(DeviceConfig::new().capacity(capacity)).unwrap();
        let mut session = device.open();
        for line in &lines {
            session.write(format!("{}\n", line).as_bytes()).unwrap();
        }

        prop_assert_eq!(session.seek_to(0, 0).unwrap(), 0);
        let oldest = &lines[lines.len().saturating_sub(capacity)];
        let (data, _) = session.read_at(0, 1024).unwrap();
        prop_assert_eq!(data, format!("{}\n", oldest).into_bytes());

        let held = lines.len().min(capacity);
        prop_assert!(
            matches!(session.seek_to(held, 0), Err(RingError::InvalidArgument { .. })),
            "entry {} must be out of range",
            held
        );
    }

    #[test]
    fn empty_writes_change_nothing(
        prefix in stream_strategy(),
        repeats in 1usize..20,
    ) {
        let device = LogDevice::new(DeviceConfig::new().capacity(4)).unwrap();
        let mut session = device.open();
        session.write(&prefix).unwrap();
        let before = device.snapshot(&Interrupt::new()).unwrap();

        for _ in 0..repeats {
            prop_assert_eq!(device.write(session.id(), b"", &Interrupt::new()).unwrap(), 0);
        }
        prop_assert_eq!(device.snapshot(&Interrupt::new()).unwrap(), before);
    }
}

#[test]
fn session_ids_are_distinct() {
    let device = LogDevice::new(DeviceConfig::new()).unwrap();
    let a = device.open();
    let b = device.open();
    assert_ne!(a.id(), b.id());
    let _: SessionId = a.id();
}
