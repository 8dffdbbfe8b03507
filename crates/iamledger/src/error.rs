use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Audit failed: {0}")]
    Audit(#[from] crate::service::AuditError),

    #[error("Tail failed: {0}")]
    Tail(#[from] crate::service::TailError),
}

/// Malformed input. Always fatal for the batch that carried it.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Failed to parse CloudTrail export: {0}")]
    InvalidExport(#[source] serde_json::Error),

    #[error("Failed to parse CloudTrail record: {0}")]
    InvalidRecord(#[source] serde_json::Error),

    #[error("Failed to parse queue delivery: {0}")]
    InvalidDelivery(#[source] serde_json::Error),

    #[error("Event '{event_id}' has invalid eventTime '{value}': {reason}")]
    InvalidTimestamp {
        event_id: String,
        value: String,
        reason: String,
    },

    #[error("Event '{event_id}' ({kind}) is missing required parameter '{parameter}'")]
    MissingParameter {
        event_id: String,
        kind: String,
        parameter: &'static str,
    },

    #[error("Event '{event_id}' has unsafe {field} '{value}'")]
    UnsafeName {
        event_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Batch of {len} events exceeds the maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value '{value}' for environment variable {name}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
