//! Shared fixtures for iamledger integration tests.
//!
//! - `LedgerHarness`: a bare remote plus export/spool directories in one temp dir
//! - `RecordBuilder`: CloudTrail records without the JSON boilerplate

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::LedgerHarness;
