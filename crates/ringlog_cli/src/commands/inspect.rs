//! Inspect command implementation.

use super::Feed;
use ringlog_core::{Interrupt, StatsSnapshot};

/// Runs the inspect command.
pub fn run(feed: &Feed, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (device, _writer) = feed.load()?;
    let snapshot = device.snapshot(&Interrupt::new())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        _ => {
            print_text_output(&snapshot);
        }
    }

    Ok(())
}

fn print_text_output(snapshot: &StatsSnapshot) {
    println!("RingLog Device");
    println!("==============");
    println!();
    println!(
        "Entries:         {} / {}",
        snapshot.held_entries, snapshot.capacity
    );
    println!("Held bytes:      {}", snapshot.held_bytes);
    println!("Pending bytes:   {}", snapshot.pending_bytes);
    println!();
    println!("Writes:          {} ({} bytes)", snapshot.writes, snapshot.bytes_written);
    println!("Commits:         {}", snapshot.commits);
    println!("Evictions:       {}", snapshot.evictions);
}
