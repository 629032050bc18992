//! areg: Asset Registry Report
//!
//! Loads a fixed-asset registry from a SQLite table, normalizes each row
//! (zero-padded tags, parsed acquisition dates, age in years) and filters the
//! result by text and age range.

pub mod cli;
pub mod core;
