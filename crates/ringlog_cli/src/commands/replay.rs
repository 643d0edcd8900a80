//! Replay command implementation.

use super::Feed;
use ringlog_core::Session;
use serde::Serialize;
use std::io::{self, Write};

/// A held record for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position counted from the oldest held entry.
    pub index: usize,
    /// Cumulative offset of the first byte of the record.
    pub offset: u64,
    /// Record size in bytes.
    pub size: usize,
    /// Record contents (lossy UTF-8).
    pub text: String,
}

/// Parses an `ENTRY,OFFSET` seek argument.
pub fn parse_seek(arg: &str) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let (entry, offset) = arg
        .split_once(',')
        .ok_or_else(|| format!("expected ENTRY,OFFSET, got {:?}", arg))?;
    Ok((entry.trim().parse()?, offset.trim().parse()?))
}

/// Runs the replay command.
pub fn run(
    feed: &Feed,
    seek: Option<(usize, usize)>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (device, _writer) = feed.load()?;
    let mut reader = device.open();

    if let Some((entry, offset)) = seek {
        reader.seek_to(entry, offset)?;
    }

    match format {
        "json" => {
            let records = collect_records(&mut reader)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            io::copy(&mut reader, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Reads from the session cursor to the end, one record per read.
fn collect_records(reader: &mut Session) -> Result<Vec<RecordInfo>, Box<dyn std::error::Error>> {
    let mut records: Vec<RecordInfo> = Vec::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let offset = reader.position();
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        // a read never spans records, but a long record can take several reads
        let text = String::from_utf8_lossy(&buf[..n]);
        match records.last_mut() {
            Some(last) if !ends_record(last) => {
                last.size += n;
                last.text.push_str(&text);
                continue;
            }
            _ => {}
        }
        records.push(RecordInfo {
            index: records.len(),
            offset,
            size: n,
            text: text.into_owned(),
        });
    }
    Ok(records)
}

fn ends_record(record: &RecordInfo) -> bool {
    record.text.ends_with('\n')
}
