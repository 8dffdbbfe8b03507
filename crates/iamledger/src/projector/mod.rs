//! Projection of event batches onto a working tree.

mod error;
mod outcome;
mod runner;

pub use error::{ProjectError, ProjectionFailure};
pub use outcome::BatchResult;
pub use runner::{commit_message, EventProjector};
