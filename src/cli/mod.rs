//! Command-line interface for the dashboard.

mod commands;
mod helpers;

pub use commands::{is_verbose, run};
