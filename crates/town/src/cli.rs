//! Command-line interface for the town server binary.
//!
//! Flags override the matching settings of the configuration file.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Real-time town and kitchen game server")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Listen address override (e.g. 127.0.0.1:8081)
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// Map file used for every configured town
    #[arg(short, long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long)]
    pub debug: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Length of a kitchen round in seconds
    #[arg(long, value_name = "N")]
    pub round_seconds: Option<u32>,
}
