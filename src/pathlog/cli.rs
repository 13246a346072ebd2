//! Argument grammar.
//!
//! clap owns parsing, help and version output. The subcommand list declared
//! here is also the source of the [`CommandRegistry`] used for prefix
//! resolution, so the two cannot drift apart.

use crate::command::{CommandRegistry, ValueOptions};
use crate::config::{DEFAULT_DATABASE, RunConfig};
use crate::handlers::{Command, DEFAULT_NAME};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pathlog",
    version,
    disable_help_subcommand = true,
    about = "Process paths one instance at a time, keeping a durable log of everything seen",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show more detailed messages and absolute paths
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// File backing the path log
    #[arg(
        short,
        long,
        global = true,
        env = "PATHLOG_DB",
        default_value = DEFAULT_DATABASE,
        value_name = "PATH"
    )]
    pub database: PathBuf,

    /// Expand directory arguments into the files beneath them
    #[arg(short, long, global = true)]
    pub recursive: bool,

    /// Descend into symlinked directories when expanding
    #[arg(long, global = true, requires = "recursive")]
    pub follow_symlinks: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Greet someone, then process paths
    Hello {
        /// Who to greet
        #[arg(long, default_value = DEFAULT_NAME)]
        name: String,

        /// Paths to process
        paths: Vec<String>,
    },

    /// Say goodbye, then process paths
    Bye {
        /// Paths to process
        paths: Vec<String>,
    },

    /// List paths recorded by previous runs, then process paths
    Seen {
        /// Paths to process
        paths: Vec<String>,
    },
}

impl Cli {
    /// Build the run configuration. `None` when no subcommand was given.
    pub fn into_config(self) -> Option<RunConfig> {
        let (command, paths) = match self.command? {
            Commands::Hello { name, paths } => (Command::Hello { name }, paths),
            Commands::Bye { paths } => (Command::Bye, paths),
            Commands::Seen { paths } => (Command::Seen, paths),
        };
        Some(
            RunConfig::new(command)
                .with_paths(paths)
                .with_database(self.database)
                .verbose(self.verbose)
                .recursive(self.recursive, self.follow_symlinks),
        )
    }
}

/// Registry of the declared subcommands, in declaration order, aware of which
/// options take a value.
pub fn registry() -> CommandRegistry {
    let cmd = Cli::command();

    let mut longs = Vec::new();
    let mut shorts = Vec::new();
    let args = cmd
        .get_arguments()
        .chain(cmd.get_subcommands().flat_map(|sub| sub.get_arguments()));
    for arg in args {
        if arg.is_positional() || !arg.get_action().takes_values() {
            continue;
        }
        longs.extend(arg.get_long().map(str::to_owned));
        shorts.extend(arg.get_short());
    }

    CommandRegistry::new(cmd.get_subcommands().map(|sub| sub.get_name().to_owned()))
        .with_value_options(ValueOptions::new(longs, shorts))
}

/// Usage text shown when no subcommand is given.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
