//! The audited tree: where things live and how events change them.

pub mod mutator;
pub mod paths;

pub use mutator::{plan, Effect, IgnoreReason, MutationError, Plan, TreeMutator};
pub use paths::{parse_policy_name, Resolver};
