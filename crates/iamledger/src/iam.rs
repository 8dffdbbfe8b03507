//! Policy version lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyLookupError {
    #[error("Policy '{policy_arn}' has no version '{version_id}'")]
    VersionNotFound {
        policy_arn: String,
        version_id: String,
    },

    #[error("Failed to read policy catalog '{}': {source}", path.display())]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy catalog '{}': {source}", path.display())]
    ParseCatalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No policy version source configured")]
    NotConfigured,
}

/// Fetches the document of one policy version.
#[async_trait]
pub trait PolicyVersionSource: Send + Sync {
    async fn policy_version(
        &self,
        policy_arn: &str,
        version_id: &str,
    ) -> Result<String, PolicyLookupError>;
}

/// Policy versions held in memory, keyed by ARN then version id.
#[derive(Debug, Clone, Default)]
pub struct PolicyCatalog {
    versions: HashMap<String, HashMap<String, String>>,
}

impl PolicyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `{ "<policyArn>": { "<versionId>": "<document>" } }`.
    pub fn load(path: &Path) -> Result<Self, PolicyLookupError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| PolicyLookupError::ReadCatalog {
                path: path.to_path_buf(),
                source,
            })?;
        let versions =
            serde_json::from_str(&content).map_err(|source| PolicyLookupError::ParseCatalog {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { versions })
    }

    pub fn insert(
        &mut self,
        policy_arn: impl Into<String>,
        version_id: impl Into<String>,
        document: impl Into<String>,
    ) {
        self.versions
            .entry(policy_arn.into())
            .or_default()
            .insert(version_id.into(), document.into());
    }

    pub fn len(&self) -> usize {
        self.versions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PolicyVersionSource for PolicyCatalog {
    async fn policy_version(
        &self,
        policy_arn: &str,
        version_id: &str,
    ) -> Result<String, PolicyLookupError> {
        self.versions
            .get(policy_arn)
            .and_then(|versions| versions.get(version_id))
            .cloned()
            .ok_or_else(|| PolicyLookupError::VersionNotFound {
                policy_arn: policy_arn.to_string(),
                version_id: version_id.to_string(),
            })
    }
}

/// Source used when no catalog is configured; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPolicySource;

#[async_trait]
impl PolicyVersionSource for NoPolicySource {
    async fn policy_version(&self, _: &str, _: &str) -> Result<String, PolicyLookupError> {
        Err(PolicyLookupError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ARN: &str = "arn:aws:iam::111122223333:policy/Deploy";

    #[tokio::test]
    async fn test_catalog_lookup() {
        let mut catalog = PolicyCatalog::new();
        catalog.insert(ARN, "v2", r#"{"Version":"2012-10-17"}"#);

        let doc = catalog.policy_version(ARN, "v2").await.unwrap();
        assert_eq!(doc, r#"{"Version":"2012-10-17"}"#);

        let missing = catalog.policy_version(ARN, "v3").await;
        assert!(matches!(
            missing,
            Err(PolicyLookupError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"{ARN}": {{"v1": "one", "v2": "two"}}}}"#).unwrap();

        let catalog = PolicyCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.policy_version(ARN, "v1").await.unwrap(), "one");
    }

    #[test]
    fn test_catalog_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(matches!(
            PolicyCatalog::load(file.path()),
            Err(PolicyLookupError::ParseCatalog { .. })
        ));
        assert!(matches!(
            PolicyCatalog::load(Path::new("/nonexistent/policies.json")),
            Err(PolicyLookupError::ReadCatalog { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_source() {
        let result = NoPolicySource.policy_version(ARN, "v1").await;
        assert!(matches!(result, Err(PolicyLookupError::NotConfigured)));
    }
}
