use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nvhook::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "nvhook")]
#[command(about = "OCI hook that configures NVIDIA GPU access for containers")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, env = "NVHOOK_DEBUG")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Hook configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Configure GPU access before the container process starts
    Prestart,

    /// No-op
    Poststart,

    /// No-op
    Poststop,
}
