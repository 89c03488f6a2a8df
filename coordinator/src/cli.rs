//! `clap`-derived command-line surface: config file path, a log-level
//! override, and repeatable `KEY=VALUE` config overrides applied after the
//! TOML file loads.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "coordinator", about = "Apologies game coordination server")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Overrides the config file's `log_level`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Applies a `KEY=VALUE` override on top of the loaded config. May be
    /// repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}
