//! The two entry points: tail an export onto the queue, audit a delivery.

mod auditor;
mod error;
mod tailer;

pub use auditor::Auditor;
pub use error::{AuditError, TailError};
pub use tailer::Tailer;
