pub mod audit;
pub mod tail;
