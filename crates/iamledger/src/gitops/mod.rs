//! Git plumbing for the ledger repository.

pub mod error;
pub mod git;
mod worktree;

#[cfg(test)]
pub(crate) mod testing;

pub use error::GitOpsError;
pub use git::{CommitRecord, GitRepository, LogEntry};
pub use worktree::Worktree;
