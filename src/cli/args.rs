//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    browse::BrowseArgs, completions::CompletionsArgs, search::SearchArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "areg")]
#[command(author, version, about = "Asset Registry Report")]
#[command(long_about = "Query a fixed-asset registry stored in SQLite: normalized tags, dates and ages with text and age-range filters.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Registry database (default: cadastro_patrimonio.sqlite)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Registry table name (default: cadastro_patrimonio)
    #[arg(long, global = true)]
    pub table: Option<String>,
}

impl GlobalOpts {
    /// Layered configuration with command-line flags applied last
    pub fn config(&self) -> Config {
        let mut config = Config::load();
        self.apply(&mut config);
        config
    }

    fn apply(&self, config: &mut Config) {
        if let Some(ref database) = self.database {
            config.database = Some(database.clone());
        }
        if let Some(ref table) = self.table {
            config.table = Some(table.clone());
        }
    }

    /// The requested format, falling back to the configured default
    pub fn resolve_format(&self, config: &Config) -> OutputFormat {
        if self.format != OutputFormat::Auto {
            return self.format;
        }
        config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter the registry by tag/description text and age range
    Search(SearchArgs),

    /// Interactive search loop over the cached registry
    Browse(BrowseArgs),

    /// Show registry location, size and age span
    Status,

    /// Verify the registry database can be opened
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for terminals)
    #[default]
    Auto,
    /// Aligned columns (for terminals)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just tags, one per line
    Id,
}
