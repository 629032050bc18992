//! `areg search` command - Filter the registry by text and age range

use console::{style, Term};
use miette::{IntoDiagnostic, Result};
use std::io::Write;

use crate::cli::helpers::parse_age_arg;
use crate::cli::table::{TableConfig, TableFormatter, ASSET_COLUMNS, COMPACT_KEYS};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{evaluate, AssetTable, FilterGate, FilterOutcome, FilterQuery, TableCache};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Text matched against tag and description (case-insensitive)
    #[arg(default_value = "")]
    pub query: String,

    /// Minimum age in years (inclusive)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_age_arg)]
    pub min_age: Option<f64>,

    /// Maximum age in years (inclusive)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_age_arg)]
    pub max_age: Option<f64>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Show every column instead of the compact set
    #[arg(long, short = 'w')]
    pub wide: bool,

    /// Wrap long text columns at this width instead of truncating
    #[arg(long)]
    pub wrap: Option<usize>,

    /// Override the configured filter gate
    #[arg(long, value_enum)]
    pub gate: Option<FilterGate>,
}

/// Display options shared by the search and browse views
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    pub wide: bool,
    pub wrap: Option<usize>,
    pub limit: Option<usize>,
    pub count: bool,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let cache = TableCache::new(config.source());
    let table = cache.get_or_load()?;

    let query = FilterQuery::new(args.query).with_age_range(args.min_age, args.max_age);
    let gate = args.gate.unwrap_or_else(|| config.filter_gate());
    let view = ViewOptions {
        wide: args.wide,
        wrap: args.wrap,
        limit: args.limit,
        count: args.count,
    };

    let outcome = evaluate(&table, &query, gate);
    print_outcome(&outcome, &query, view, global.resolve_format(&config))
}

/// Print the result of a filter evaluation in the requested format
pub fn print_outcome(
    outcome: &FilterOutcome,
    query: &FilterQuery,
    view: ViewOptions,
    format: OutputFormat,
) -> Result<()> {
    let matches = match outcome {
        FilterOutcome::Inactive => {
            println!(
                "{}",
                style("Please enter a filter text or an age range.").yellow()
            );
            return Ok(());
        }
        FilterOutcome::Matches(matches) => matches,
    };

    if view.count {
        println!("{}", matches.len());
        return Ok(());
    }

    if matches.is_empty() {
        if query.text.trim().is_empty() {
            println!("No assets found in the selected age range.");
        } else {
            println!("No assets found for '{}'.", style(query.text.trim()).yellow());
        }
        return Ok(());
    }

    let limited;
    let shown = match view.limit {
        Some(limit) if limit < matches.len() => {
            limited = AssetTable::new(matches.records()[..limit].to_vec());
            &limited
        }
        _ => matches,
    };

    let config = match view.wrap {
        Some(width) => TableConfig::with_wrap(width),
        None if Term::stdout().is_term() => TableConfig::default(),
        None => TableConfig::for_pipe(),
    };
    let mut formatter = TableFormatter::new(ASSET_COLUMNS).with_config(config);
    if !view.wide {
        formatter = formatter.with_visible(COMPACT_KEYS);
    }

    let rendered = formatter.render(shown, format)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes()).into_diagnostic()?;

    if shown.len() < matches.len() && Term::stdout().is_term() {
        writeln!(
            stdout,
            "{}",
            style(format!("Showing {} of {} matches.", shown.len(), matches.len())).dim()
        )
        .into_diagnostic()?;
    }

    Ok(())
}
