use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use super::error::AuditError;
use crate::config::{GitSettings, LedgerSettings};
use crate::gitops::GitRepository;
use crate::iam::{NoPolicySource, PolicyCatalog, PolicyVersionSource};
use crate::projector::{BatchResult, EventProjector};
use crate::queue::QueueDelivery;

/// Projects one queue delivery onto a fresh clone of the ledger and pushes it.
pub struct Auditor {
    git: GitSettings,
    policies: Arc<dyn PolicyVersionSource>,
}

impl Auditor {
    pub fn new(git: GitSettings, policies: Arc<dyn PolicyVersionSource>) -> Self {
        Self { git, policies }
    }

    /// Uses the configured policy catalog, if any.
    pub fn from_settings(settings: &LedgerSettings) -> Result<Self, AuditError> {
        let policies: Arc<dyn PolicyVersionSource> = match &settings.policies.catalog_file {
            Some(path) => Arc::new(PolicyCatalog::load(path)?),
            None => Arc::new(NoPolicySource),
        };
        Ok(Self::new(settings.git.clone(), policies))
    }

    pub async fn audit(&self, delivery: &QueueDelivery) -> Result<BatchResult, AuditError> {
        let span = info_span!("audit", entries = delivery.records.len());
        self.audit_delivery(delivery).instrument(span).await
    }

    async fn audit_delivery(&self, delivery: &QueueDelivery) -> Result<BatchResult, AuditError> {
        // Malformed deliveries fail before anything is cloned.
        let batch = delivery.to_batch()?;

        let mut repo = GitRepository::clone_scratch(&self.git)
            .await
            .map_err(AuditError::Clone)?;
        info!(path = %repo.repo_path().display(), branch = repo.branch(), "Cloned ledger");

        let result = EventProjector::new(&mut repo, self.policies.as_ref())
            .with_author_email(self.git.author_email.as_str())
            .apply(&batch)
            .await?;
        Ok(result)
    }
}
