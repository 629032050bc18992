//! `areg check` command - Verify the registry database is reachable

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let source = global.config().source();
    source.check()?;

    if !global.quiet {
        println!(
            "{} Connection established: {}",
            style("✓").green(),
            style(source.path().display()).cyan()
        );
    }
    Ok(())
}
