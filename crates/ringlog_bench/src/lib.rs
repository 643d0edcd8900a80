//! Benchmark utilities.

/// Generates `count` newline-terminated records of `size` bytes each.
pub fn records(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut line: Vec<u8> = (0..size.saturating_sub(1))
                .map(|j| b'a' + ((i + j) % 26) as u8)
                .collect();
            line.push(b'\n');
            line
        })
        .collect()
}

/// Splits `data` into chunks of at most `chunk` bytes.
pub fn chunks(data: &[u8], chunk: usize) -> Vec<&[u8]> {
    data.chunks(chunk.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_terminated() {
        let recs = records(3, 8);
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.len() == 8 && r.ends_with(b"\n")));
    }

    #[test]
    fn chunks_cover_input() {
        let data = b"abcdefg";
        let parts = chunks(data, 3);
        assert_eq!(parts, vec![&b"abc"[..], b"def", b"g"]);
    }
}
