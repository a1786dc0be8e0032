//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

/// Print a periodically refreshed status line for bars and terminals.
///
/// Each tick queries every configured module and writes one line to stdout.
#[derive(Parser, Debug)]
#[command(name = "swiftstatus")]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file (default: first of the standard locations that exists)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a single line and exit
    #[arg(long)]
    pub once: bool,

    /// Print the effective configuration in native syntax and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log level used when `RUST_LOG` is unset
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
