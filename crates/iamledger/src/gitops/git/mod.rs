mod auth;
mod parse;
mod repository;
mod types;

pub use auth::{build_auth_env, shell_quote, AuthEnv};
pub use parse::{format_git_date, format_git_error};
pub use repository::GitRepository;
pub use types::{CommitRecord, LogEntry};
