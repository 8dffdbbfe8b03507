//! Fan-out of bulk exports onto the queue.

mod dispatcher;
mod partition;

pub use dispatcher::{DispatchError, DispatchSummary, Dispatcher};
pub use partition::{partition, PARTITION_SIZE};
