//! Subcommand handlers.
//!
//! Each [`Command`] variant is one registered subcommand. A handler runs once,
//! after the path log is open and before any input path is processed.

use crate::error::Result;
use crate::path_log::PathLog;
use crate::store::ShelfBackend;
use std::io::Write;

pub const DEFAULT_NAME: &str = "world";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hello { name: String },
    Bye,
    /// Print the paths recorded by previous runs.
    Seen,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Hello { .. } => "hello",
            Command::Bye => "bye",
            Command::Seen => "seen",
        }
    }

    pub fn run<B: ShelfBackend, W: Write>(&self, log: &PathLog<B>, out: &mut W) -> Result<()> {
        match self {
            Command::Hello { name } => writeln!(out, "Hello, {}!", name)?,
            Command::Bye => writeln!(out, "Goodbye!")?,
            Command::Seen => {
                for path in log.snapshot() {
                    writeln!(out, "{}", path)?;
                }
            }
        }
        Ok(())
    }
}
