use areg::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) so piping into
    // `head` or `grep -q` does not panic on a broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    areg::cli::init_logging(&global);

    match cli.command {
        Commands::Search(args) => areg::cli::commands::search::run(args, &global),
        Commands::Browse(args) => areg::cli::commands::browse::run(args, &global),
        Commands::Status => areg::cli::commands::status::run(&global),
        Commands::Check => areg::cli::commands::check::run(&global),
        Commands::Completions(args) => areg::cli::commands::completions::run(args),
    }
}
