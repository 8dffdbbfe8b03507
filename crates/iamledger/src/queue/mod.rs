//! Queue plumbing between the tailer and the auditor.

mod message;
mod spool;

use async_trait::async_trait;
use thiserror::Error;

pub use message::{DeliveredMessage, QueueDelivery, QueueMessage, SendOutcome};
pub use spool::{SpoolQueue, SpooledDelivery, FAILED_DIR};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to {op} '{}': {source}", path.display())]
    Io {
        op: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode delivery: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Spooled delivery '{}' is corrupt: {source}", path.display())]
    Corrupt {
        path: std::path::PathBuf,
        #[source]
        source: crate::error::EventError,
    },

    #[error("Send call carries {len} messages, the limit is {max}")]
    TooManyMessages { len: usize, max: usize },
}

/// Sends groups of messages; one call per group.
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn send_batch(&self, messages: Vec<QueueMessage>) -> Result<SendOutcome, QueueError>;
}
