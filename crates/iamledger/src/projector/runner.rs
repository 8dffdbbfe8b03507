use tracing::{debug, info, info_span, Instrument};

use super::error::{ProjectError, ProjectionFailure};
use super::outcome::BatchResult;
use crate::config::DEFAULT_AUTHOR_EMAIL;
use crate::event::{Batch, ChangeEvent};
use crate::gitops::{CommitRecord, Worktree};
use crate::iam::PolicyVersionSource;
use crate::tree::{plan, Effect, Plan, TreeMutator};

/// `"<eventName> by <actor>"`.
pub fn commit_message(event: &ChangeEvent) -> String {
    format!("{} by {}", event.kind, event.actor)
}

/// Replays a batch onto a working tree: one commit per accepted event, in
/// order, then a single push.
pub struct EventProjector<'a, W, P>
where
    W: Worktree + ?Sized,
    P: PolicyVersionSource + ?Sized,
{
    worktree: &'a mut W,
    policies: &'a P,
    author_email: String,
}

impl<'a, W, P> EventProjector<'a, W, P>
where
    W: Worktree + ?Sized,
    P: PolicyVersionSource + ?Sized,
{
    pub fn new(worktree: &'a mut W, policies: &'a P) -> Self {
        Self {
            worktree,
            policies,
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }

    pub fn with_author_email(mut self, email: impl Into<String>) -> Self {
        self.author_email = email.into();
        self
    }

    pub async fn apply(&mut self, batch: &Batch) -> Result<BatchResult, ProjectError> {
        let span = info_span!("project_batch", entries = batch.len());
        self.apply_batch(batch).instrument(span).await
    }

    async fn apply_batch(&mut self, batch: &Batch) -> Result<BatchResult, ProjectError> {
        // Validate the whole batch before the first mutation.
        let mut plans = Vec::with_capacity(batch.len());
        for (index, event) in batch.iter().enumerate() {
            let planned = plan(event).map_err(|source| {
                aborted(index, event, BatchResult::default(), source.into())
            })?;
            plans.push(planned);
        }

        let mut result = BatchResult::default();
        for (index, (event, planned)) in batch.iter().zip(plans).enumerate() {
            let projected = self
                .project_event(event, planned)
                .instrument(info_span!(
                    "project_event",
                    event_id = %event.event_id,
                    kind = %event.kind
                ))
                .await;

            match projected {
                Ok(Some(removal)) => result.record_accepted(removal),
                Ok(None) => result.record_ignored(),
                Err(source) => return Err(aborted(index, event, result, source)),
            }
        }

        self.worktree
            .push()
            .await
            .map_err(|source| ProjectError::PushFailed { result, source })?;

        info!(
            accepted = result.accepted,
            ignored = result.ignored,
            added = result.added,
            removed = result.removed,
            "Batch projected"
        );
        Ok(result)
    }

    /// Returns `Some(is_removal)` for a committed event, `None` when ignored.
    async fn project_event(
        &mut self,
        event: &ChangeEvent,
        planned: Plan,
    ) -> Result<Option<bool>, ProjectionFailure> {
        let effect = match planned {
            Plan::Ignore(reason) => {
                info!("Ignoring event: {}", reason);
                return Ok(None);
            }
            Plan::Apply(effect) => effect,
            Plan::FetchPolicyVersion {
                policy_arn,
                version_id,
                path,
            } => {
                let content = self
                    .policies
                    .policy_version(&policy_arn, &version_id)
                    .await?;
                Effect::Overwrite { path, content }
            }
        };

        let changed = TreeMutator::new(&mut *self.worktree)
            .apply(&effect)
            .await?;

        let record = CommitRecord {
            message: commit_message(event),
            author_name: event.actor.clone(),
            author_email: self.author_email.clone(),
            when: event.event_time,
        };
        let commit = self.worktree.commit(&record).await?;
        debug!(%commit, changed, path = %effect.staged_path().display(), "Committed");

        Ok(Some(effect.is_removal()))
    }
}

fn aborted(
    index: usize,
    event: &ChangeEvent,
    result: BatchResult,
    source: ProjectionFailure,
) -> ProjectError {
    ProjectError::Aborted {
        index,
        event_id: event.event_id.clone(),
        result,
        source,
    }
}
