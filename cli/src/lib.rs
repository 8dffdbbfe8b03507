//! Command-line interface for iamledger.
//!
//! - `iamledger tail` moves a CloudTrail export onto the queue.
//! - `iamledger audit` projects one queue delivery onto the ledger repository.

pub mod commands;
pub mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use iamledger::config::{load_settings, LedgerSettings};

#[derive(Debug, Parser)]
#[command(name = "iamledger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON settings file. Environment overrides apply either way.
    #[arg(long, global = true, env = "IAMLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact, env = "IAMLEDGER_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn settings(&self) -> Result<LedgerSettings> {
        load_settings(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("Failed to load settings from {}", path.display()),
            None => "Failed to load settings".to_string(),
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Partition a bulk export and send it to the queue.
    Tail(commands::tail::TailArgs),
    /// Apply one queue delivery to the ledger repository and push.
    Audit(commands::audit::AuditArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}
