//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, sets up diagnostics for the chosen
//! command and dispatches to its handler.

use clap::Parser;

use logrelay_cli::{Cli, CliError, Commands, LogDestination, handlers, init_logging};

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let command = cli.into_command();

    // The viewer owns the terminal, so its diagnostics go to a file or nowhere
    let destination = match &command {
        Commands::View(args) => args
            .log_file
            .clone()
            .map_or(LogDestination::Discard, LogDestination::File),
        Commands::Tail(_) | Commands::Send(_) => LogDestination::Stderr,
    };
    if let Err(e) = init_logging(verbose, destination) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    let result = match command {
        Commands::View(args) => handlers::view::execute(&args).await,
        Commands::Tail(args) => handlers::tail::execute(&args).await,
        Commands::Send(args) => handlers::send::execute(&args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
