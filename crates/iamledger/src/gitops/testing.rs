//! In-memory stand-in for a git checkout, backed by a real temp directory.

use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use async_trait::async_trait;

use super::error::{GitOpsError, Result};
use super::git::CommitRecord;
use super::worktree::Worktree;

pub struct RecordingWorktree {
    pub dir: TempDir,
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub commits: Vec<CommitRecord>,
    pub pushes: usize,
    pub fail_staging: bool,
    pub fail_push: bool,
}

impl RecordingWorktree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            added: Vec::new(),
            removed: Vec::new(),
            commits: Vec::new(),
            pushes: 0,
            fail_staging: false,
            fail_push: false,
        }
    }

    pub fn commit_messages(&self) -> Vec<&str> {
        self.commits.iter().map(|c| c.message.as_str()).collect()
    }

    fn stage(&self, path: &Path) -> Result<()> {
        if self.fail_staging {
            Err(GitOpsError::GitOperation(format!(
                "fatal: unable to stage '{}'",
                path.display()
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Worktree for RecordingWorktree {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    async fn add(&mut self, path: &Path) -> Result<()> {
        self.stage(path)?;
        self.added.push(path.to_path_buf());
        Ok(())
    }

    async fn remove(&mut self, path: &Path) -> Result<()> {
        self.stage(path)?;
        self.removed.push(path.to_path_buf());
        Ok(())
    }

    async fn commit(&mut self, record: &CommitRecord) -> Result<String> {
        self.commits.push(record.clone());
        Ok(format!("{:040x}", self.commits.len()))
    }

    async fn push(&mut self) -> Result<()> {
        if self.fail_push {
            return Err(GitOpsError::GitNetworkError(
                "fatal: unable to access 'https://git.example.com/iam.git/'".to_string(),
            ));
        }
        self.pushes += 1;
        Ok(())
    }
}
