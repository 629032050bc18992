//! `areg browse` command - Interactive search over the cached registry
//!
//! The registry is loaded once and kept in a [`TableCache`]. Each round asks
//! for a search text and an age range, then prints the matches. Enter `:r`
//! as the search text to drop the cache and reload from the database, or
//! `:q` to leave.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::search::{print_outcome, ViewOptions};
use crate::cli::helpers::{format_age, parse_bound_within};
use crate::cli::GlobalOpts;
use crate::core::{evaluate, AgeSpan, FilterQuery, TableCache};

const RELOAD: &str = ":r";
const QUIT: &str = ":q";

#[derive(clap::Args, Debug)]
pub struct BrowseArgs {
    /// Show every column instead of the compact set
    #[arg(long, short = 'w')]
    pub wide: bool,

    /// Wrap long text columns at this width instead of truncating
    #[arg(long)]
    pub wrap: Option<usize>,
}

pub fn run(args: BrowseArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let cache = TableCache::new(config.source());
    let gate = config.filter_gate();
    let format = global.resolve_format(&config);
    let view = ViewOptions {
        wide: args.wide,
        wrap: args.wrap,
        ..ViewOptions::default()
    };
    let theme = ColorfulTheme::default();

    loop {
        let table = cache.get_or_load()?;
        let span = table.age_span();

        if !global.quiet {
            print_header(table.len(), span.as_ref());
        }

        let text: String = Input::with_theme(&theme)
            .with_prompt(format!("Search tag or description ({} reload, {} quit)", RELOAD, QUIT))
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;

        match text.trim() {
            QUIT => break,
            RELOAD => {
                cache.invalidate();
                println!("{} Cache cleared, reloading registry", style("✓").green());
                continue;
            }
            _ => {}
        }

        let (low, high) = span.map(|s| s.whole_years()).unwrap_or((0, 0));
        let age_min = prompt_bound(&theme, "Minimum age (years)", low, (low, high))?;
        let age_max = prompt_bound(&theme, "Maximum age (years)", high, (low, high))?;

        let mut query = FilterQuery::new(text).with_age_range(age_min, age_max);
        if let Some(span) = span {
            query = query.clamped_to(&span);
        }

        let outcome = evaluate(&table, &query, gate);
        print_outcome(&outcome, &query, view, format)?;
        println!();
    }

    Ok(())
}

fn print_header(rows: usize, span: Option<&AgeSpan>) {
    match span {
        Some(span) => println!(
            "{} {} assets, ages {} to {} years",
            style("Registry:").bold(),
            style(rows).cyan(),
            format_age(span.min),
            format_age(span.max)
        ),
        None => println!("{} no assets loaded", style("Registry:").bold()),
    }
}

/// Ask for one age bound, accepting only values inside the whole-year span
fn prompt_bound(
    theme: &ColorfulTheme,
    prompt: &str,
    default: i64,
    (low, high): (i64, i64),
) -> Result<Option<f64>> {
    let answer: String = Input::with_theme(theme)
        .with_prompt(format!("{} [{}-{}]", prompt, low, high))
        .default(default.to_string())
        .allow_empty(true)
        .validate_with(|input: &String| parse_bound_within(input, low, high).map(|_| ()))
        .interact_text()
        .into_diagnostic()?;

    parse_bound_within(&answer, low, high).map_err(|e| miette::miette!("{}", e))
}
