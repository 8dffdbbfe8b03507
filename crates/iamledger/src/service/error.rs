use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::error::EventError;
use crate::gitops::GitOpsError;
use crate::iam::PolicyLookupError;
use crate::projector::ProjectError;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum TailError {
    #[error("Failed to fetch export: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Failed to clone ledger repository: {0}")]
    Clone(#[source] GitOpsError),

    #[error("Failed to load policy catalog: {0}")]
    PolicyCatalog(#[from] PolicyLookupError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

impl AuditError {
    /// Whether redelivering the same batch could succeed without changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            AuditError::Clone(source) => source.is_retryable(),
            AuditError::Project(ProjectError::PushFailed { source, .. }) => source.is_retryable(),
            _ => false,
        }
    }
}
