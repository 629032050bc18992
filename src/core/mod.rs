//! Core module - registry loading, normalization, filtering and caching

pub mod cache;
pub mod config;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod record;

pub use cache::TableCache;
pub use config::{Config, ConfigError};
pub use filter::{evaluate, filter, FilterGate, FilterOutcome, FilterQuery};
pub use loader::{LoadError, NormalizeOptions, RawRow, RegistrySource, TableSource};
pub use normalize::{DateParsePolicy, NullTextPolicy};
pub use record::{AgeSpan, AssetRecord, AssetTable};
