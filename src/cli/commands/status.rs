//! `areg status` command - Registry overview

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::format_age;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{AssetTable, Config, TableSource};

#[derive(Debug, Serialize)]
struct RegistryStatus {
    database: String,
    table: String,
    rows: usize,
    undated: usize,
    age_min: Option<f64>,
    age_max: Option<f64>,
    null_text: String,
    date_parsing: String,
    filter_gate: String,
}

impl RegistryStatus {
    fn collect(config: &Config, table: &AssetTable) -> Self {
        let options = config.normalize_options();
        let span = table.age_span();
        Self {
            database: config.database().display().to_string(),
            table: config.table(),
            rows: table.len(),
            undated: table.undated_count(),
            age_min: span.map(|s| s.min),
            age_max: span.map(|s| s.max),
            null_text: value_name(&options.null_text),
            date_parsing: value_name(&options.date_parsing),
            filter_gate: value_name(&config.filter_gate()),
        }
    }
}

/// The command-line spelling of a policy value
fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let table = config.source().load()?;
    let status = RegistryStatus::collect(&config, &table);

    match global.resolve_format(&config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&status).into_diagnostic()?);
        }
        _ => print_dashboard(&status),
    }

    Ok(())
}

fn print_dashboard(status: &RegistryStatus) {
    let width = 48;
    println!("{}", style("Asset Registry Status").bold().underlined());
    println!("{}", "═".repeat(width));

    println!("{:<16}{}", "Database:", status.database);
    println!("{:<16}{}", "Table:", status.table);
    println!("{:<16}{}", "Assets:", style(status.rows).cyan());

    match (status.age_min, status.age_max) {
        (Some(min), Some(max)) => println!(
            "{:<16}{} to {} years",
            "Age span:",
            format_age(min),
            format_age(max)
        ),
        _ => println!("{:<16}-", "Age span:"),
    }

    if status.undated > 0 {
        println!(
            "{:<16}{}",
            "Undated:",
            style(format!("{} (age shown as 0)", status.undated)).yellow()
        );
    }

    println!("{}", "─".repeat(width));
    println!("{:<16}{}", "Null text:", status.null_text);
    println!("{:<16}{}", "Date parsing:", status.date_parsing);
    println!("{:<16}{}", "Filter gate:", status.filter_gate);
}
