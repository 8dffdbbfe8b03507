use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, info_span, Instrument};

use super::partition::partition;
use crate::config::DEFAULT_DELAY_SECONDS;
use crate::event::CloudTrailEvent;
use crate::queue::{QueueClient, QueueMessage};

/// Totals over every group of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    #[serde(rename = "Successful")]
    pub successful: u32,
    #[serde(rename = "Failed")]
    pub failed: u32,
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"{{"Successful":{},"Failed":{}}}"#,
            self.successful, self.failed
        )
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    /// Some messages were not accepted. Displays as the summary JSON.
    #[error("{0}")]
    PartialDelivery(DispatchSummary),

    #[error("Failed to encode event '{event_id}': {source}")]
    Encode {
        event_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Send task did not complete: {0}")]
    Join(#[from] JoinError),
}

impl DispatchError {
    pub fn summary(&self) -> Option<&DispatchSummary> {
        match self {
            DispatchError::PartialDelivery(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Sends groups of events to a queue concurrently, one send call per group.
pub struct Dispatcher<Q: QueueClient + ?Sized + 'static> {
    client: Arc<Q>,
    delay_seconds: u32,
}

impl<Q: QueueClient + ?Sized + 'static> Dispatcher<Q> {
    pub fn new(client: Arc<Q>) -> Self {
        Self {
            client,
            delay_seconds: DEFAULT_DELAY_SECONDS,
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: u32) -> Self {
        self.delay_seconds = delay_seconds;
        self
    }

    /// Partitions `events` into groups of `size` and dispatches them.
    pub async fn dispatch_events(
        &self,
        events: &[CloudTrailEvent],
        size: usize,
    ) -> Result<DispatchSummary, DispatchError> {
        self.dispatch(partition(events, size)).await
    }

    /// Waits for every group. A group whose send call fails counts all its
    /// messages as failed.
    pub async fn dispatch(
        &self,
        groups: Vec<Vec<CloudTrailEvent>>,
    ) -> Result<DispatchSummary, DispatchError> {
        let encoded = groups
            .iter()
            .map(|group| self.encode(group))
            .collect::<Result<Vec<_>, _>>()?;

        let successful = Arc::new(AtomicU32::new(0));
        let failed = Arc::new(AtomicU32::new(0));
        let mut tasks = JoinSet::new();

        for (index, messages) in encoded.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let len = messages.len() as u32;
            let span = info_span!("send_group", group = index, entries = len);

            tasks.spawn(
                async move {
                    match client.send_batch(messages).await {
                        Ok(outcome) => {
                            successful.fetch_add(outcome.successful, Ordering::SeqCst);
                            failed.fetch_add(outcome.failed, Ordering::SeqCst);
                            if outcome.failed > 0 {
                                error!(failed = outcome.failed, "Queue rejected messages");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Send call failed");
                            failed.fetch_add(len, Ordering::SeqCst);
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut join_error = None;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                join_error.get_or_insert(e);
            }
        }
        if let Some(e) = join_error {
            return Err(DispatchError::Join(e));
        }

        let summary = DispatchSummary {
            successful: successful.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
        };
        info!(
            successful = summary.successful,
            failed = summary.failed,
            "Dispatch finished"
        );

        if summary.failed > 0 {
            Err(DispatchError::PartialDelivery(summary))
        } else {
            Ok(summary)
        }
    }

    fn encode(&self, group: &[CloudTrailEvent]) -> Result<Vec<QueueMessage>, DispatchError> {
        group
            .iter()
            .map(|event| {
                QueueMessage::from_event(event, self.delay_seconds).map_err(|source| {
                    DispatchError::Encode {
                        event_id: event.event_id.clone(),
                        source,
                    }
                })
            })
            .collect()
    }
}
