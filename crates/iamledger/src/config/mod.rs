//! Settings for the ledger service.

mod loader;
mod settings;

pub use loader::{
    apply_env_overrides, load_settings, load_settings_from_str, validate_settings, ENV_EXPORT_ROOT,
    ENV_GIT_BRANCH, ENV_GIT_REPO, ENV_GIT_USERNAME, ENV_POLICY_CATALOG, ENV_QUEUE_DELAY_SECONDS,
    ENV_QUEUE_SPOOL_DIR,
};
pub use settings::{
    ExportSettings, GitAuthSettings, GitAuthType, GitSettings, LedgerSettings, PolicySettings,
    QueueSettings, DEFAULT_AUTHOR_EMAIL, DEFAULT_DELAY_SECONDS,
};
