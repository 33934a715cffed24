use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tl",
    about = concat!("ticklist v", env!("CARGO_PKG_VERSION"), " - tasks with swipe timers"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: $XDG_CONFIG_HOME/ticklist/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding store.json and the session lock
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks with their subtasks and elapsed times
    List,
    /// Show the resolved config, data and log locations
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["tl", "list", "--json", "--data-dir", "/tmp/x"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["tl", "--log-level", "debug"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
