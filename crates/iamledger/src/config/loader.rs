use std::path::{Path, PathBuf};

use crate::config::settings::LedgerSettings;
use crate::error::ConfigError;
use crate::event::MAX_BATCH_SIZE;

pub const ENV_GIT_REPO: &str = "GIT_REPO";
pub const ENV_GIT_BRANCH: &str = "GIT_BRANCH";
pub const ENV_GIT_USERNAME: &str = "GIT_USERNAME";
pub const ENV_QUEUE_SPOOL_DIR: &str = "QUEUE_SPOOL_DIR";
pub const ENV_QUEUE_DELAY_SECONDS: &str = "QUEUE_DELAY_SECONDS";
pub const ENV_EXPORT_ROOT: &str = "EXPORT_ROOT";
pub const ENV_POLICY_CATALOG: &str = "POLICY_CATALOG";

/// Loads settings from an optional JSON file, then applies environment
/// overrides and validates the result.
pub fn load_settings(path: Option<&Path>) -> Result<LedgerSettings, ConfigError> {
    let mut settings = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&content)?
        }
        None => LedgerSettings::default(),
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    validate_settings(&settings)?;

    Ok(settings)
}

pub fn load_settings_from_str(content: &str) -> Result<LedgerSettings, ConfigError> {
    let settings: LedgerSettings = serde_json::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Overrides file values with non-empty environment values. `lookup` is
/// injectable so tests need not touch the process environment.
pub fn apply_env_overrides<F>(settings: &mut LedgerSettings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(repo) = get(ENV_GIT_REPO) {
        settings.git.repository = repo;
    }
    if let Some(branch) = get(ENV_GIT_BRANCH) {
        settings.git.branch = branch;
    }
    if let Some(username) = get(ENV_GIT_USERNAME) {
        settings.git.auth.username = username;
    }
    if let Some(dir) = get(ENV_QUEUE_SPOOL_DIR) {
        settings.queue.spool_directory = PathBuf::from(dir);
    }
    if let Some(delay) = get(ENV_QUEUE_DELAY_SECONDS) {
        settings.queue.delay_seconds =
            delay.parse::<u32>().map_err(|e| ConfigError::InvalidEnv {
                name: ENV_QUEUE_DELAY_SECONDS,
                value: delay.clone(),
                reason: e.to_string(),
            })?;
    }
    if let Some(root) = get(ENV_EXPORT_ROOT) {
        settings.export.root = PathBuf::from(root);
    }
    if let Some(catalog) = get(ENV_POLICY_CATALOG) {
        settings.policies.catalog_file = Some(PathBuf::from(catalog));
    }

    Ok(())
}

pub fn validate_settings(settings: &LedgerSettings) -> Result<(), ConfigError> {
    let size = settings.queue.partition_size;
    if size == 0 || size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation {
            message: format!(
                "queue.partitionSize must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, size
            ),
        });
    }

    if settings.git.branch.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "git.branch must not be empty".to_string(),
        });
    }

    if settings.git.author_email.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "git.authorEmail must not be empty".to_string(),
        });
    }

    Ok(())
}
