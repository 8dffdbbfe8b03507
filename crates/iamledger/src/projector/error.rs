use thiserror::Error;

use super::outcome::BatchResult;
use crate::error::EventError;
use crate::gitops::GitOpsError;
use crate::iam::PolicyLookupError;
use crate::tree::MutationError;

/// Why a single event could not be projected.
#[derive(Error, Debug)]
pub enum ProjectionFailure {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Policy version lookup failed: {0}")]
    PolicyLookup(#[from] PolicyLookupError),

    #[error("Commit failed: {0}")]
    Git(#[from] GitOpsError),
}

/// A batch that did not complete. Both variants carry the counts reached
/// so far; local commits are never reverted.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Stopped at `index`. Nothing was pushed.
    #[error("Batch aborted at event {index} ('{event_id}'): {source}")]
    Aborted {
        index: usize,
        event_id: String,
        result: BatchResult,
        #[source]
        source: ProjectionFailure,
    },

    /// Every event was committed locally but publishing failed.
    #[error("Push failed after {} accepted events: {source}", .result.accepted)]
    PushFailed {
        result: BatchResult,
        #[source]
        source: GitOpsError,
    },
}

impl ProjectError {
    pub fn result(&self) -> &BatchResult {
        match self {
            ProjectError::Aborted { result, .. } | ProjectError::PushFailed { result, .. } => {
                result
            }
        }
    }
}
