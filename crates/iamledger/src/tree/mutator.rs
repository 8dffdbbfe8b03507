//! Filesystem effects of individual events.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::paths::{self, Resolver};
use crate::error::EventError;
use crate::event::{ChangeEvent, EventKind};
use crate::gitops::{GitOpsError, Worktree};

/// A single change to the tree, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a line, creating the file if needed. The parent must exist
    /// unless `create_parent` is set (only one level is ever created).
    Append {
        path: PathBuf,
        line: String,
        create_parent: bool,
    },
    /// Create (or replace) a file under a root directory that is created on demand.
    Create { path: PathBuf, content: String },
    /// Replace the content of an existing file.
    Overwrite { path: PathBuf, content: String },
    /// Create a role directory plus its placeholder file.
    CreateRole { dir: PathBuf, placeholder: PathBuf },
    RemoveFile { path: PathBuf },
    RemoveDir { path: PathBuf },
}

impl Effect {
    /// The path that gets staged after the effect is applied.
    pub fn staged_path(&self) -> &Path {
        match self {
            Effect::Append { path, .. }
            | Effect::Create { path, .. }
            | Effect::Overwrite { path, .. }
            | Effect::RemoveFile { path }
            | Effect::RemoveDir { path } => path,
            Effect::CreateRole { placeholder, .. } => placeholder,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Effect::RemoveFile { .. } | Effect::RemoveDir { .. })
    }
}

/// What to do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Apply(Effect),
    /// The new content has to be fetched first; the effect is an overwrite of `path`.
    FetchPolicyVersion {
        policy_arn: String,
        version_id: String,
        path: PathBuf,
    },
    Ignore(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnsupportedKind(String),
    FailedCall(String),
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::UnsupportedKind(name) => write!(f, "unsupported event kind {}", name),
            IgnoreReason::FailedCall(code) => write!(f, "failed call ({})", code),
        }
    }
}

/// Decides the effect of an event without touching anything.
pub fn plan(event: &ChangeEvent) -> Result<Plan, EventError> {
    if let EventKind::Unsupported(name) = &event.kind {
        return Ok(Plan::Ignore(IgnoreReason::UnsupportedKind(name.clone())));
    }
    if event.is_failed_call() {
        return Ok(Plan::Ignore(IgnoreReason::FailedCall(
            event.error_code.trim().to_string(),
        )));
    }

    let r = Resolver::new(event);
    let effect = match &event.kind {
        EventKind::AttachRolePolicy => Effect::Append {
            path: paths::attached_policy_file(r.role_name()?, r.policy_name()?),
            line: r.policy_arn()?.to_string(),
            create_parent: true,
        },
        EventKind::CreatePolicy => Effect::Create {
            path: paths::policy_file(r.policy_name()?),
            content: r.policy_document().to_string(),
        },
        EventKind::CreatePolicyVersion => Effect::Overwrite {
            path: paths::policy_file(r.policy_name()?),
            content: r.policy_document().to_string(),
        },
        EventKind::CreateRole => {
            let role = r.role_name()?;
            Effect::CreateRole {
                dir: paths::role_dir(role),
                placeholder: paths::role_placeholder_file(role),
            }
        }
        EventKind::DeletePolicy => Effect::RemoveFile {
            path: paths::policy_file(r.policy_name()?),
        },
        EventKind::DeleteRole => Effect::RemoveDir {
            path: paths::role_dir(r.role_name()?),
        },
        EventKind::DeleteRolePolicy => Effect::RemoveFile {
            path: paths::inline_policy_file(r.role_name()?),
        },
        EventKind::DetachRolePolicy => Effect::RemoveFile {
            path: paths::attached_policy_file(r.role_name()?, r.policy_name()?),
        },
        // CloudTrail records for inline policies rarely carry an ARN.
        EventKind::PutRolePolicy => Effect::Append {
            path: paths::inline_policy_file(r.role_name()?),
            line: r.policy_arn_or_empty().to_string(),
            create_parent: false,
        },
        EventKind::SetDefaultPolicyVersion => {
            return Ok(Plan::FetchPolicyVersion {
                policy_arn: r.policy_arn()?.to_string(),
                version_id: r.version_id()?.to_string(),
                path: paths::policy_file(r.policy_name()?),
            })
        }
        EventKind::Unsupported(name) => {
            return Ok(Plan::Ignore(IgnoreReason::UnsupportedKind(name.clone())))
        }
    };

    Ok(Plan::Apply(effect))
}

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("Failed to {op} '{path}': {source}")]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to stage '{path}': {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: GitOpsError,
    },
}

fn fs_err<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> MutationError + 'a {
    move |source| MutationError::Filesystem {
        op,
        path: path.to_path_buf(),
        source,
    }
}

/// Applies effects to a working tree and stages them.
pub struct TreeMutator<'w, W: Worktree + ?Sized> {
    worktree: &'w mut W,
}

impl<'w, W: Worktree + ?Sized> TreeMutator<'w, W> {
    pub fn new(worktree: &'w mut W) -> Self {
        Self { worktree }
    }

    /// Applies one effect then stages its path. Returns whether the file
    /// content changed.
    pub async fn apply(&mut self, effect: &Effect) -> Result<bool, MutationError> {
        let root = self.worktree.root().to_path_buf();
        let changed = match effect {
            Effect::Append {
                path,
                line,
                create_parent,
            } => append_line(&root.join(path), line, *create_parent)?,
            Effect::Create { path, content } => {
                let full = root.join(path);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).map_err(fs_err("create directory", parent))?;
                }
                fs::write(&full, content).map_err(fs_err("write", &full))?;
                true
            }
            Effect::Overwrite { path, content } => {
                let full = root.join(path);
                let mut file = OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(&full)
                    .map_err(fs_err("open", &full))?;
                file.write_all(content.as_bytes())
                    .map_err(fs_err("write", &full))?;
                true
            }
            Effect::CreateRole { dir, placeholder } => {
                let full_dir = root.join(dir);
                fs::create_dir_all(&full_dir).map_err(fs_err("create directory", &full_dir))?;
                let full = root.join(placeholder);
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&full)
                    .map_err(fs_err("create", &full))?;
                true
            }
            Effect::RemoveFile { path } => {
                let full = root.join(path);
                fs::remove_file(&full).map_err(fs_err("remove", &full))?;
                true
            }
            Effect::RemoveDir { path } => {
                let full = root.join(path);
                fs::remove_dir_all(&full).map_err(fs_err("remove directory", &full))?;
                true
            }
        };

        let staged = effect.staged_path();
        let result = if effect.is_removal() {
            self.worktree.remove(staged).await
        } else {
            self.worktree.add(staged).await
        };
        result.map_err(|source| MutationError::Stage {
            path: staged.to_path_buf(),
            source,
        })?;

        Ok(changed)
    }
}

/// Appends `line` unless the file already holds it.
fn append_line(full: &Path, line: &str, create_parent: bool) -> Result<bool, MutationError> {
    if create_parent {
        if let Some(parent) = full.parent() {
            match fs::create_dir(parent) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(fs_err("create directory", parent)(e)),
            }
        }
    }

    let existing = match fs::read_to_string(full) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(fs_err("read", full)(e)),
    };
    if existing.lines().any(|l| l == line) {
        return Ok(false);
    }
    if line.is_empty() {
        // Nothing to record, but the file must exist to be staged.
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(full)
            .map_err(fs_err("create", full))?;
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(full)
        .map_err(fs_err("open", full))?;

    let mut entry = String::with_capacity(line.len() + 2);
    if !existing.is_empty() && !existing.ends_with('\n') {
        entry.push('\n');
    }
    entry.push_str(line);
    entry.push('\n');
    file.write_all(entry.as_bytes())
        .map_err(fs_err("append", full))?;
    Ok(true)
}
