//! A directory standing in for the message queue.
//!
//! Each send call becomes one file holding a complete delivery. The file
//! name starts with the zero-padded time (unix millis) at which it becomes
//! visible, so name order is delivery order.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::message::{QueueDelivery, QueueMessage, SendOutcome};
use super::{QueueClient, QueueError};
use crate::event::MAX_BATCH_SIZE;

const EXTENSION: &str = "json";

/// Subdirectory holding deliveries that were set aside.
pub const FAILED_DIR: &str = "failed";

#[derive(Debug, Clone)]
pub struct SpoolQueue {
    dir: PathBuf,
}

/// A received delivery; pass it back to [`SpoolQueue::acknowledge`] once
/// processed.
#[derive(Debug, Clone)]
pub struct SpooledDelivery {
    pub path: PathBuf,
    pub delivery: QueueDelivery,
}

impl SpoolQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Oldest delivery whose delay has elapsed, if any.
    pub async fn receive(&self) -> Result<Option<SpooledDelivery>, QueueError> {
        self.receive_at(Utc::now().timestamp_millis()).await
    }

    async fn receive_at(&self, now_millis: i64) -> Result<Option<SpooledDelivery>, QueueError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err("list", &self.dir)(e)),
        };

        let mut oldest: Option<PathBuf> = None;
        while let Some(entry) = entries.next_entry().await.map_err(io_err("list", &self.dir))? {
            let path = entry.path();
            let Some(visible_at) = visible_at(&path) else {
                continue;
            };
            if visible_at > now_millis {
                continue;
            }
            if oldest.as_ref().map_or(true, |o| path.file_name() < o.file_name()) {
                oldest = Some(path);
            }
        }

        let Some(path) = oldest else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&path).await.map_err(io_err("read", &path))?;
        let delivery = match QueueDelivery::parse(&bytes) {
            Ok(delivery) => delivery,
            Err(source) => {
                // Move it out of the way so later deliveries are not blocked.
                let path = self.quarantine(&path).await?;
                return Err(QueueError::Corrupt { path, source });
            }
        };

        debug!(path = %path.display(), entries = delivery.records.len(), "Received delivery");
        Ok(Some(SpooledDelivery { path, delivery }))
    }

    /// Deletes a processed delivery.
    pub async fn acknowledge(&self, spooled: &SpooledDelivery) -> Result<(), QueueError> {
        tokio::fs::remove_file(&spooled.path)
            .await
            .map_err(io_err("remove", &spooled.path))
    }

    /// Moves a delivery that can never succeed into [`FAILED_DIR`], where it
    /// is no longer received.
    pub async fn reject(&self, spooled: &SpooledDelivery) -> Result<PathBuf, QueueError> {
        self.quarantine(&spooled.path).await
    }

    pub fn failed_dir(&self) -> PathBuf {
        self.dir.join(FAILED_DIR)
    }

    async fn quarantine(&self, path: &Path) -> Result<PathBuf, QueueError> {
        let failed = self.failed_dir();
        tokio::fs::create_dir_all(&failed)
            .await
            .map_err(io_err("create directory", &failed))?;

        let Some(name) = path.file_name() else {
            return Err(QueueError::Io {
                op: "quarantine",
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
            });
        };
        let target = failed.join(name);
        tokio::fs::rename(path, &target)
            .await
            .map_err(io_err("rename", path))?;

        warn!(path = %target.display(), "Moved delivery aside");
        Ok(target)
    }

    /// Number of spooled deliveries, visible or not.
    pub async fn pending(&self) -> Result<usize, QueueError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_err("list", &self.dir)(e)),
        };
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await.map_err(io_err("list", &self.dir))? {
            if visible_at(&entry.path()).is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl QueueClient for SpoolQueue {
    async fn send_batch(&self, messages: Vec<QueueMessage>) -> Result<SendOutcome, QueueError> {
        if messages.len() > MAX_BATCH_SIZE {
            return Err(QueueError::TooManyMessages {
                len: messages.len(),
                max: MAX_BATCH_SIZE,
            });
        }
        if messages.is_empty() {
            return Ok(SendOutcome::default());
        }

        let delay = messages.iter().map(|m| m.delay_seconds).max().unwrap_or(0);
        let visible_at = Utc::now().timestamp_millis() + i64::from(delay) * 1000;
        let delivery = QueueDelivery::from_messages(&messages);
        let body = serde_json::to_vec_pretty(&delivery).map_err(QueueError::Encode)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_err("create directory", &self.dir))?;

        let name = format!("{:013}-{}", visible_at, uuid::Uuid::new_v4());
        let tmp = self.dir.join(format!(".{}.tmp", name));
        let path = self.dir.join(format!("{}.{}", name, EXTENSION));

        // Write then rename so a reader never sees a partial file.
        tokio::fs::write(&tmp, &body).await.map_err(io_err("write", &tmp))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(io_err("rename", &path))?;

        debug!(path = %path.display(), entries = messages.len(), "Spooled delivery");
        Ok(SendOutcome {
            successful: messages.len() as u32,
            failed: 0,
        })
    }
}

/// Visibility time encoded in a spool file name.
fn visible_at(path: &Path) -> Option<i64> {
    if path.extension()? != EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (millis, _) = stem.split_once('-')?;
    millis.parse().ok()
}

fn io_err<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> QueueError + 'a {
    move |source| QueueError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}
