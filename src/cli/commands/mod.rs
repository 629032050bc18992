//! CLI command implementations

pub mod browse;
pub mod check;
pub mod completions;
pub mod search;
pub mod status;
