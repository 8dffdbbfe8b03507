//! Git repository operations, driven through the `git` binary.

use std::path::{Component, Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command as TokioCommand;

use super::auth::build_auth_env;
use super::parse::{format_git_error, parse_log, parse_object_id, LOG_FORMAT};
use super::types::{CommitRecord, LogEntry};
use crate::config::GitSettings;
use crate::gitops::error::{classify_git_error, GitOpsError, Result};
use crate::gitops::worktree::Worktree;

/// A local checkout of the ledger repository.
pub struct GitRepository {
    repo_path: PathBuf,
    settings: GitSettings,
    /// Owns the scratch checkout, if any; removed on drop.
    _scratch: Option<TempDir>,
}

impl GitRepository {
    /// Wraps an existing checkout.
    pub fn open(repo_path: impl Into<PathBuf>, settings: GitSettings) -> Self {
        Self {
            repo_path: repo_path.into(),
            settings,
            _scratch: None,
        }
    }

    /// Clones the configured remote into a fresh temp directory that lives as
    /// long as the returned handle.
    pub async fn clone_scratch(settings: &GitSettings) -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("iamledger-").tempdir()?;
        let mut repo = Self::clone_into(settings, scratch.path()).await?;
        repo._scratch = Some(scratch);
        Ok(repo)
    }

    /// Clones the configured remote into `dest` (absent or empty) and checks
    /// out the configured branch. An empty remote yields an unborn branch.
    pub async fn clone_into(settings: &GitSettings, dest: &Path) -> Result<Self> {
        if settings.repository.trim().is_empty() {
            return Err(GitOpsError::MissingRepository);
        }

        let auth = build_auth_env(&settings.auth)?;
        let mut cmd = TokioCommand::new("git");
        cmd.args(["clone", "--quiet", "--", &settings.repository])
            .arg(dest)
            .kill_on_drop(true);
        for (key, value) in &auth.env_vars {
            cmd.env(key, value);
        }

        log::debug!("Cloning {} into {}", settings.repository, dest.display());
        let output = cmd.output().await.map_err(GitOpsError::Spawn)?;
        drop(auth);

        if !output.status.success() {
            return Err(classify_git_error(&format_git_error(&output)));
        }

        let repo = Self::open(dest, settings.clone());
        repo.checkout_branch().await?;
        Ok(repo)
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn branch(&self) -> &str {
        &self.settings.branch
    }

    pub fn is_git_repo(&self) -> bool {
        self.repo_path.join(".git").exists()
    }

    pub async fn has_commits(&self) -> bool {
        self.is_git_repo() && self.rev_exists("HEAD").await
    }

    /// Name of the checked-out branch, born or not.
    pub async fn current_branch(&self) -> Result<String> {
        let output = self
            .git_ok(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Commits on the current branch, newest first.
    pub async fn log(&self) -> Result<Vec<LogEntry>> {
        if !self.has_commits().await {
            return Ok(Vec::new());
        }
        let output = self.git_ok(&["log", LOG_FORMAT]).await?;
        Ok(parse_log(&output.stdout))
    }

    async fn checkout_branch(&self) -> Result<()> {
        let branch = self.settings.branch.as_str();
        if self.current_branch().await.ok().as_deref() == Some(branch) {
            return Ok(());
        }

        if !self.has_commits().await {
            let head = format!("refs/heads/{}", branch);
            self.git_ok(&["symbolic-ref", "HEAD", &head]).await?;
            return Ok(());
        }

        let remote_ref = format!("refs/remotes/origin/{}", branch);
        if self.rev_exists(&remote_ref).await {
            self.git_ok(&["checkout", "--quiet", "-B", branch, &remote_ref])
                .await?;
        } else {
            log::info!("Branch '{}' not on remote, starting it from HEAD", branch);
            self.git_ok(&["checkout", "--quiet", "-B", branch]).await?;
        }
        Ok(())
    }

    async fn rev_exists(&self, rev: &str) -> bool {
        self.run_git(&["rev-parse", "--verify", "--quiet", rev])
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn ensure_repo(&self) -> Result<()> {
        if self.is_git_repo() {
            Ok(())
        } else {
            Err(GitOpsError::GitNotInitialized(self.repo_path.clone()))
        }
    }

    fn tree_path<'p>(&self, path: &'p Path) -> Result<&'p str> {
        let inside = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        match path.to_str() {
            Some(s) if inside && !s.is_empty() => Ok(s),
            _ => Err(GitOpsError::PathOutsideTree(path.to_path_buf())),
        }
    }

    async fn run_git(&self, args: &[&str]) -> Result<Output> {
        TokioCommand::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(GitOpsError::Spawn)
    }

    /// Runs git and turns a non-zero exit into an error.
    async fn git_ok(&self, args: &[&str]) -> Result<Output> {
        let output = self.run_git(args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(GitOpsError::GitOperation(format_git_error(&output)))
        }
    }
}

#[async_trait]
impl Worktree for GitRepository {
    fn root(&self) -> &Path {
        &self.repo_path
    }

    async fn add(&mut self, path: &Path) -> Result<()> {
        self.ensure_repo()?;
        let path = self.tree_path(path)?;
        self.git_ok(&["add", "--", path]).await?;
        Ok(())
    }

    async fn remove(&mut self, path: &Path) -> Result<()> {
        self.ensure_repo()?;
        let path = self.tree_path(path)?;
        self.git_ok(&["rm", "-r", "--cached", "--quiet", "--ignore-unmatch", "--", path])
            .await?;
        Ok(())
    }

    async fn commit(&mut self, record: &CommitRecord) -> Result<String> {
        self.ensure_repo()?;

        let output = TokioCommand::new("git")
            .current_dir(&self.repo_path)
            .args(["-c", "commit.gpgsign=false"])
            .args(["commit", "--allow-empty", "--no-verify", "--quiet", "-m"])
            .arg(&record.message)
            .envs(record.identity_env())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(GitOpsError::Spawn)?;

        if !output.status.success() {
            return Err(GitOpsError::GitOperation(format_git_error(&output)));
        }

        let head = self.git_ok(&["rev-parse", "HEAD"]).await?;
        parse_object_id(&head.stdout).ok_or_else(|| {
            GitOpsError::GitOperation("rev-parse HEAD returned no object id".to_string())
        })
    }

    async fn push(&mut self) -> Result<()> {
        self.ensure_repo()?;
        if !self.has_commits().await {
            log::debug!("Branch '{}' has no commits, nothing to push", self.branch());
            return Ok(());
        }

        let auth = build_auth_env(&self.settings.auth)?;
        let refspec = format!("HEAD:refs/heads/{}", self.settings.branch);

        let mut cmd = TokioCommand::new("git");
        cmd.current_dir(&self.repo_path)
            .args(["push", "--quiet", "origin", &refspec])
            .kill_on_drop(true);
        for (key, value) in &auth.env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().await.map_err(GitOpsError::Spawn)?;
        drop(auth);

        if output.status.success() {
            Ok(())
        } else {
            Err(classify_git_error(&format_git_error(&output)))
        }
    }
}
