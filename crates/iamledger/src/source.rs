//! Where bulk CloudTrail exports come from.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Object '{location}' not found")]
    NotFound { location: ExportLocation },

    #[error("Invalid object location '{location}': {reason}")]
    InvalidLocation {
        location: ExportLocation,
        reason: &'static str,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bucket and key of one export object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLocation {
    pub bucket: String,
    pub key: String,
}

impl ExportLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ExportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Raw bytes of `{"Records": [...]}`.
    async fn fetch(&self, location: &ExportLocation) -> Result<Vec<u8>, SourceError>;
}

/// Exports laid out on disk as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FileExportSource {
    root: PathBuf,
}

impl FileExportSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a location under the root; keys may contain `/` but must
    /// stay inside their bucket.
    pub fn resolve(&self, location: &ExportLocation) -> Result<PathBuf, SourceError> {
        let invalid = |reason| SourceError::InvalidLocation {
            location: location.clone(),
            reason,
        };

        if !is_plain_relative(Path::new(&location.bucket))
            || location.bucket.contains('/')
        {
            return Err(invalid("bucket must be a single path segment"));
        }
        if !is_plain_relative(Path::new(&location.key)) {
            return Err(invalid("key must be a relative path without '..'"));
        }

        Ok(self.root.join(&location.bucket).join(&location.key))
    }
}

fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

#[async_trait]
impl ExportSource for FileExportSource {
    async fn fetch(&self, location: &ExportLocation) -> Result<Vec<u8>, SourceError> {
        let path = self.resolve(location)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::NotFound {
                location: location.clone(),
            }),
            Err(source) => Err(SourceError::Read { path, source }),
        }
    }
}
