use std::path::Path;

use async_trait::async_trait;

use super::error::Result;
use super::git::CommitRecord;

/// A checked-out ledger tree that can stage, commit and publish changes.
///
/// Paths handed to `add` and `remove` are relative to [`Worktree::root`].
#[async_trait]
pub trait Worktree: Send {
    fn root(&self) -> &Path;

    async fn add(&mut self, path: &Path) -> Result<()>;

    /// Unstages `path`; the caller removes it from disk.
    async fn remove(&mut self, path: &Path) -> Result<()>;

    /// Commits whatever is staged, even nothing, and returns the new head id.
    async fn commit(&mut self, record: &CommitRecord) -> Result<String>;

    async fn push(&mut self) -> Result<()>;
}
