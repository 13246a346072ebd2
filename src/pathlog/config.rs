use crate::handlers::Command;
use crate::tree::ScanOptions;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "data.db";

/// Everything a run needs to know, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub command: Command,
    pub paths: Vec<String>,
    pub verbose: bool,
    pub database: PathBuf,
    /// Expand directory inputs through the tree enumerator.
    pub recursive: bool,
    pub follow_symlinks: bool,
}

impl RunConfig {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            paths: Vec::new(),
            verbose: false,
            database: PathBuf::from(DEFAULT_DATABASE),
            recursive: false,
            follow_symlinks: false,
        }
    }

    pub fn with_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn recursive(mut self, recursive: bool, follow_symlinks: bool) -> Self {
        self.recursive = recursive;
        self.follow_symlinks = follow_symlinks;
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            follow_symlinks: self.follow_symlinks,
            recursive: true,
        }
    }
}
