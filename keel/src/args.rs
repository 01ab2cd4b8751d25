use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Keel problem-details server
#[derive(Debug, Parser)]
#[command(name = "keel", about = "Renders every failure as RFC 7807 problem details")]
pub struct Args {
    /// Path to configuration file [default: keel.toml, if present]
    #[arg(short, long, env = "KEEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "KEEL_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the log filter (e.g. "info,keel_server=debug")
    #[arg(long, env = "KEEL_LOG")]
    pub log_filter: Option<String>,
}
