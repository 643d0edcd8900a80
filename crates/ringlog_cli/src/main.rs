//! RingLog CLI
//!
//! Command-line tools for exercising a RingLog device.
//!
//! # Commands
//!
//! - `replay` - Feed input into a device and print the held records
//! - `inspect` - Feed input into a device and display its statistics

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// RingLog command-line tools.
#[derive(Parser)]
#[command(name = "ringlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum number of held entries
    #[arg(global = true, short, long, default_value_t = ringlog_core::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Input file (reads stdin when omitted)
    #[arg(global = true, short, long)]
    input: Option<PathBuf>,

    /// Size of each write delivered to the device
    #[arg(global = true, long, default_value = "4096")]
    chunk_size: usize,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed input into a device and print the held records
    Replay {
        /// Start reading at ENTRY,OFFSET (entry counted from the oldest held)
        #[arg(short, long)]
        seek: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Feed input into a device and display its statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let feed = commands::Feed {
        capacity: cli.capacity,
        input: cli.input,
        chunk_size: cli.chunk_size,
    };

    match cli.command {
        Commands::Replay { seek, format } => {
            let seek = seek.as_deref().map(commands::replay::parse_seek).transpose()?;
            commands::replay::run(&feed, seek, &format)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&feed, &format)?;
        }
        Commands::Version => {
            println!("RingLog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("RingLog Core v{}", ringlog_core::VERSION);
        }
    }

    Ok(())
}
