//! Change events: the CloudTrail wire format and its normalized form.

pub mod change;
pub mod cloudtrail;
pub mod kind;

pub use change::{Batch, ChangeEvent, Parameters, MAX_BATCH_SIZE};
pub use cloudtrail::{
    parse_event, parse_export, CloudTrailEvent, CloudTrailExport, RequestParameters,
    UserIdentity,
};
pub use kind::EventKind;
