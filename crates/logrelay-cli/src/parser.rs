//! Main CLI parser and top-level argument handling.
//!
//! Running `logrelay` without a subcommand starts the terminal viewer, so
//! the viewer's flags are accepted at the top level too.

use clap::Parser;

use crate::commands::{Commands, ViewArgs};

/// Line-oriented TCP log relay with a terminal viewer.
#[derive(Parser, Debug)]
#[command(name = "logrelay")]
#[command(about = "Relay newline-delimited TCP messages into a terminal log view")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose/debug diagnostics
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Viewer options used when no subcommand is given
    #[command(flatten)]
    pub view: ViewArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run, defaulting to the viewer.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::View(self.view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_viewer_with_defaults() {
        let cli = Cli::parse_from(["logrelay"]);
        let Commands::View(args) = cli.into_command() else {
            panic!("expected view");
        };
        assert_eq!(args.relay.port, 9000);
        assert_eq!(args.relay.bind_address, "0.0.0.0");
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_top_level_viewer_flags() {
        let cli = Cli::parse_from(["logrelay", "--port", "9100", "--max-entries", "500"]);
        let Commands::View(args) = cli.into_command() else {
            panic!("expected view");
        };
        assert_eq!(args.relay.port, 9100);
        assert_eq!(args.relay.max_entries, Some(500));
    }

    #[test]
    fn test_send_joins_trailing_words() {
        let cli = Cli::parse_from(["logrelay", "send", "--port", "9001", "hello", "there", "-x"]);
        let Commands::Send(args) = cli.into_command() else {
            panic!("expected send");
        };
        assert_eq!(args.port, 9001);
        assert_eq!(args.host, "localhost");
        assert_eq!(args.message, ["hello", "there", "-x"]);
    }

    #[test]
    fn test_tail_flags() {
        let cli = Cli::parse_from(["logrelay", "-v", "tail", "--json", "--bind", "127.0.0.1"]);
        assert!(cli.verbose);
        let Commands::Tail(args) = cli.into_command() else {
            panic!("expected tail");
        };
        assert!(args.json);
        assert!(!args.timestamps);
        assert_eq!(args.relay.bind_address, "127.0.0.1");
    }
}
