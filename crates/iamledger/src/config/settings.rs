//! Settings schema. Every field has a default so a partial (or empty) JSON
//! document is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::event::MAX_BATCH_SIZE;

/// Placeholder author email; CloudTrail carries no email for the caller.
pub const DEFAULT_AUTHOR_EMAIL: &str = "iam-ledger@users.noreply.invalid";

/// Delivery delay absorbing eventual consistency in the upstream log.
pub const DEFAULT_DELAY_SECONDS: u32 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    #[serde(default)]
    pub git: GitSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub policies: PolicySettings,
}

/// Remote ledger repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSettings {
    /// Git repository URL.
    #[serde(default)]
    pub repository: String,

    /// Branch that receives the ledger commits.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Authentication settings.
    #[serde(default)]
    pub auth: GitAuthSettings,

    /// Email recorded on every commit.
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_author_email() -> String {
    DEFAULT_AUTHOR_EMAIL.to_string()
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            repository: String::new(),
            branch: default_branch(),
            auth: GitAuthSettings::default(),
            author_email: default_author_email(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GitAuthType {
    #[default]
    None,
    Token,
    SshKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitAuthSettings {
    #[serde(rename = "type", default)]
    pub auth_type: GitAuthType,

    /// Username sent alongside the token.
    #[serde(default = "default_username")]
    pub username: String,

    /// Token given inline. Only for local experiments.
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub token_insecure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<String>,

    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,

    /// Defaults to `~/.ssh/id_ed25519`.
    #[serde(default)]
    pub ssh_key_path: String,
}

fn default_username() -> String {
    "token".to_string()
}

fn default_token_env_var() -> String {
    "GIT_TOKEN".to_string()
}

impl Default for GitAuthSettings {
    fn default() -> Self {
        Self {
            auth_type: GitAuthType::None,
            username: default_username(),
            token_insecure: None,
            token_file: None,
            token_env_var: default_token_env_var(),
            ssh_key_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSettings {
    /// Directory backing the local spool queue.
    #[serde(default = "default_spool_directory")]
    pub spool_directory: PathBuf,

    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u32,

    /// Events per queue send call; at most [`MAX_BATCH_SIZE`].
    #[serde(default = "default_partition_size")]
    pub partition_size: usize,
}

fn default_spool_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("iamledger")
        .join("spool")
}

fn default_delay_seconds() -> u32 {
    DEFAULT_DELAY_SECONDS
}

fn default_partition_size() -> usize {
    MAX_BATCH_SIZE
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            spool_directory: default_spool_directory(),
            delay_seconds: default_delay_seconds(),
            partition_size: default_partition_size(),
        }
    }
}

/// Where bulk exports are read from: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    #[serde(default)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySettings {
    /// JSON file mapping policy ARN to version id to document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
}
