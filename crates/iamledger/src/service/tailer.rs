use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use super::error::TailError;
use crate::config::LedgerSettings;
use crate::dispatch::{DispatchSummary, Dispatcher, PARTITION_SIZE};
use crate::event::parse_export;
use crate::queue::{QueueClient, SpoolQueue};
use crate::source::{ExportLocation, ExportSource, FileExportSource};

/// Moves one bulk export onto the queue.
pub struct Tailer {
    source: Arc<dyn ExportSource>,
    dispatcher: Dispatcher<dyn QueueClient>,
    partition_size: usize,
}

impl Tailer {
    pub fn new(source: Arc<dyn ExportSource>, queue: Arc<dyn QueueClient>) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(queue),
            partition_size: PARTITION_SIZE,
        }
    }

    /// File export source and spool queue from settings.
    pub fn from_settings(settings: &LedgerSettings) -> Self {
        let source = Arc::new(FileExportSource::new(&settings.export.root));
        let queue = Arc::new(SpoolQueue::new(&settings.queue.spool_directory));
        Self::new(source, queue)
            .with_partition_size(settings.queue.partition_size)
            .with_delay_seconds(settings.queue.delay_seconds)
    }

    pub fn with_partition_size(mut self, size: usize) -> Self {
        self.partition_size = size;
        self
    }

    pub fn with_delay_seconds(mut self, delay_seconds: u32) -> Self {
        self.dispatcher = self.dispatcher.with_delay_seconds(delay_seconds);
        self
    }

    pub async fn tail(&self, location: &ExportLocation) -> Result<DispatchSummary, TailError> {
        let span = info_span!("tail", location = %location);
        self.tail_export(location).instrument(span).await
    }

    async fn tail_export(&self, location: &ExportLocation) -> Result<DispatchSummary, TailError> {
        let bytes = self.source.fetch(location).await?;
        let records = parse_export(&bytes)?;
        info!(records = records.len(), "Fetched export");

        let summary = self
            .dispatcher
            .dispatch_events(&records, self.partition_size)
            .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::source::SourceError;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn export(n: usize) -> String {
        let records: Vec<_> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "eventID": format!("e-{i}"),
                    "eventName": "CreateRole",
                    "eventTime": "2024-03-01T12:30:00Z",
                    "requestParameters": {"roleName": format!("r{i}")}
                })
            })
            .collect();
        serde_json::json!({ "Records": records }).to_string()
    }

    fn tailer(root: &TempDir) -> (Tailer, SpoolQueue) {
        let spool = SpoolQueue::new(root.path().join("spool"));
        let tailer = Tailer::new(
            Arc::new(FileExportSource::new(root.path().join("exports"))),
            Arc::new(spool.clone()),
        )
        .with_delay_seconds(0);
        (tailer, spool)
    }

    #[tokio::test]
    async fn test_tail_spools_groups() {
        let root = TempDir::new().unwrap();
        root.child("exports/trail/export.json")
            .write_str(&export(23))
            .unwrap();
        let (tailer, spool) = tailer(&root);

        let summary = tailer
            .tail(&ExportLocation::new("trail", "export.json"))
            .await
            .unwrap();

        assert_eq!(summary.successful, 23);
        assert_eq!(summary.failed, 0);
        assert_eq!(spool.pending().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_tail_custom_partition_size() {
        let root = TempDir::new().unwrap();
        root.child("exports/trail/export.json")
            .write_str(&export(6))
            .unwrap();
        let (tailer, spool) = tailer(&root);

        tailer
            .with_partition_size(2)
            .tail(&ExportLocation::new("trail", "export.json"))
            .await
            .unwrap();
        assert_eq!(spool.pending().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_tail_errors() {
        let root = TempDir::new().unwrap();
        root.child("exports/trail/bad.json")
            .write_str("{not json")
            .unwrap();
        let (tailer, _) = tailer(&root);

        let missing = tailer.tail(&ExportLocation::new("trail", "none.json")).await;
        assert!(matches!(
            missing,
            Err(TailError::Source(SourceError::NotFound { .. }))
        ));

        let bad = tailer.tail(&ExportLocation::new("trail", "bad.json")).await;
        assert!(matches!(
            bad,
            Err(TailError::Event(EventError::InvalidExport(_)))
        ));
    }
}
