//! # Durable Path Log
//!
//! Append-only record of every path processed, across runs. The log lives
//! under the [`PATHS_KEY`] key of a shelf as a JSON array of strings; entries
//! are never rewritten, reordered or deduplicated.
//!
//! A [`PathLog`] is a scoped handle. [`PathLog::close`] flushes and reports
//! errors; if the handle is dropped on any other path (an early return, a `?`,
//! an interrupt) pending records are still flushed, best-effort, in `Drop`.

use crate::error::{PathlogError, Result};
use crate::store::{Shelf, ShelfBackend};
use serde_json::Value;

pub const PATHS_KEY: &str = "paths";

pub struct PathLog<B: ShelfBackend> {
    backend: B,
    shelf: Shelf,
    paths: Vec<String>,
    previous_len: usize,
    dirty: bool,
}

impl<B: ShelfBackend> PathLog<B> {
    /// Load the shelf and its path list. A missing key starts an empty log.
    pub fn open(backend: B) -> Result<Self> {
        let shelf = backend.load().map_err(|e| match e {
            PathlogError::StorageUnavailable { .. } => e,
            other => PathlogError::storage(backend.location(), other),
        })?;

        let (paths, dirty) = match shelf.get(PATHS_KEY) {
            None => (Vec::new(), true),
            Some(value) => (parse_paths(value, &backend)?, false),
        };

        tracing::debug!(
            location = %backend.location(),
            previous = paths.len(),
            "path log opened"
        );

        Ok(Self {
            previous_len: paths.len(),
            backend,
            shelf,
            paths,
            dirty,
        })
    }

    /// Paths recorded by earlier runs, in append order.
    pub fn snapshot(&self) -> &[String] {
        &self.paths[..self.previous_len]
    }

    /// Paths recorded so far in this run.
    pub fn recorded(&self) -> &[String] {
        &self.paths[self.previous_len..]
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn record(&mut self, path: impl Into<String>) {
        self.paths.push(path.into());
        self.dirty = true;
    }

    /// Write pending records to the backend. A no-op when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let paths = self.paths.iter().cloned().map(Value::String).collect();
        self.shelf.insert(PATHS_KEY.to_string(), Value::Array(paths));
        self.backend.save(&self.shelf)?;
        self.dirty = false;
        tracing::info!(
            location = %self.backend.location(),
            total = self.paths.len(),
            "path log flushed"
        );
        Ok(())
    }

    /// Flush and release the backend.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush();
        self.dirty = false;
        result
    }
}

impl<B: ShelfBackend> Drop for PathLog<B> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(
                location = %self.backend.location(),
                error = %e,
                "failed to flush path log"
            );
        }
    }
}

fn parse_paths<B: ShelfBackend>(value: &Value, backend: &B) -> Result<Vec<String>> {
    let invalid = || {
        PathlogError::storage(
            backend.location(),
            format!("\"{PATHS_KEY}\" is not a list of strings"),
        )
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_owned).ok_or_else(invalid))
        .collect()
}
