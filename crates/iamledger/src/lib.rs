//! Turns IAM change events into a git history: one commit per change,
//! authored by whoever made it, dated when they made it.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod gitops;
pub mod iam;
pub mod projector;
pub mod queue;
pub mod secrets;
pub mod service;
pub mod source;
pub mod tree;

pub use config::{load_settings, LedgerSettings};
pub use dispatch::{partition, DispatchError, DispatchSummary, Dispatcher};
pub use error::{ConfigError, EventError, LedgerError, Result};
pub use event::{Batch, ChangeEvent, CloudTrailEvent, EventKind};
pub use gitops::{CommitRecord, GitOpsError, GitRepository, Worktree};
pub use iam::{NoPolicySource, PolicyCatalog, PolicyLookupError, PolicyVersionSource};
pub use projector::{BatchResult, EventProjector, ProjectError, ProjectionFailure};
pub use queue::{QueueClient, QueueDelivery, QueueError, QueueMessage, SpoolQueue};
pub use service::{AuditError, Auditor, TailError, Tailer};
pub use source::{ExportLocation, ExportSource, FileExportSource, SourceError};
