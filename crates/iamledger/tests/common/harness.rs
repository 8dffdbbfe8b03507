#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use iamledger::config::{GitSettings, LedgerSettings};
use iamledger::gitops::LogEntry;
use iamledger::{CloudTrailEvent, CommitRecord, GitRepository, Worktree};

use super::builders::export_json;

pub const BRANCH: &str = "main";

/// A bare git remote and the directories the services read and write.
pub struct LedgerHarness {
    temp_dir: TempDir,
    pub remote: PathBuf,
    pub export_root: PathBuf,
    pub spool_dir: PathBuf,
}

impl LedgerHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let remote = base.join("ledger.git");
        let export_root = base.join("exports");
        let spool_dir = base.join("spool");
        std::fs::create_dir_all(&remote).unwrap();
        std::fs::create_dir_all(&export_root).unwrap();

        git(
            &remote,
            &["init", "--quiet", "--bare", &format!("--initial-branch={BRANCH}")],
        );

        Self {
            temp_dir,
            remote,
            export_root,
            spool_dir,
        }
    }

    pub fn git_settings(&self) -> GitSettings {
        GitSettings {
            repository: self.remote.to_str().unwrap().to_string(),
            branch: BRANCH.to_string(),
            ..Default::default()
        }
    }

    pub fn settings(&self) -> LedgerSettings {
        let mut settings = LedgerSettings {
            git: self.git_settings(),
            ..Default::default()
        };
        settings.queue.spool_directory = self.spool_dir.clone();
        settings.queue.delay_seconds = 0;
        settings.export.root = self.export_root.clone();
        settings
    }

    /// Writes `{"Records": [...]}` to `<export_root>/<bucket>/<key>`.
    pub fn write_export(&self, bucket: &str, key: &str, records: &[CloudTrailEvent]) {
        let path = self.export_root.join(bucket).join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, export_json(records)).unwrap();
    }

    /// Commits `files` to the remote in one commit, as an existing ledger would have.
    pub async fn seed(&self, files: &[(&str, &str)]) {
        let mut repo = GitRepository::clone_scratch(&self.git_settings())
            .await
            .unwrap();
        for (path, content) in files {
            let full = repo.root().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, content).unwrap();
            repo.add(Path::new(path)).await.unwrap();
        }
        repo.commit(&CommitRecord {
            message: "Seed ledger".to_string(),
            author_name: "seed".to_string(),
            author_email: "seed@example.invalid".to_string(),
            when: chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        })
        .await
        .unwrap();
        repo.push().await.unwrap();
    }

    /// Commits on the remote branch, newest first.
    pub fn remote_log(&self) -> Vec<LogEntry> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["log", "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%cn%x1f%s", BRANCH])
            .output()
            .unwrap();
        if !output.status.success() {
            // Unborn branch: nothing was ever pushed.
            return Vec::new();
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| {
                let f: Vec<&str> = line.splitn(6, '\x1f').collect();
                LogEntry {
                    id: f[0].to_string(),
                    author_name: f[1].to_string(),
                    author_email: f[2].to_string(),
                    author_date: f[3].to_string(),
                    committer_name: f[4].to_string(),
                    subject: f[5].to_string(),
                }
            })
            .collect()
    }

    /// Commit subjects, oldest first.
    pub fn remote_subjects(&self) -> Vec<String> {
        let mut subjects: Vec<_> = self.remote_log().into_iter().map(|e| e.subject).collect();
        subjects.reverse();
        subjects
    }

    /// Content of `path` at the tip of the remote branch.
    pub fn remote_file(&self, path: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["show", &format!("{BRANCH}:{path}")])
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Every tracked path at the tip of the remote branch.
    pub fn remote_paths(&self) -> Vec<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["ls-tree", "-r", "--name-only", BRANCH])
            .output()
            .unwrap();
        if !output.status.success() {
            return Vec::new();
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .expect("git must be installed");
    assert!(status.success(), "git {:?} failed", args);
}
