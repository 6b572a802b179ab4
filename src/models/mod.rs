//! Data models for survey records and scoring batches.

mod batch;
mod record;

pub use batch::BatchResult;
pub use record::{Category, Record};
