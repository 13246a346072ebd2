//! # Storage Layer
//!
//! A shelf is a small persistent key-value document: string keys mapping to
//! JSON values, loaded whole and saved whole. The durable path log keeps its
//! data under one key of a shelf; other keys are carried through untouched.
//!
//! Storage is behind the [`ShelfBackend`] trait so the path log can be tested
//! without a filesystem.
//!
//! ## Implementations
//!
//! - [`fs::FileShelf`]: production backend, one pretty-printed JSON object per
//!   file, replaced atomically on save.
//! - [`memory::MemoryShelf`]: in-memory backend for tests. Clones share
//!   contents, so a test can reopen "the same file".
//!
//! ## Storage Format
//!
//! ```text
//! data.db
//! {
//!   "paths": [
//!     "a.txt",
//!     "b.txt"
//!   ]
//! }
//! ```
//!
//! No cross-process locking is done here; single-writer access comes from the
//! execution guard.

use crate::error::Result;
use serde_json::{Map, Value};

pub mod fs;
pub mod memory;

pub type Shelf = Map<String, Value>;

pub trait ShelfBackend {
    /// Read the whole shelf. A backend with nothing stored yet returns an
    /// empty shelf.
    fn load(&self) -> Result<Shelf>;

    /// Replace the stored shelf.
    fn save(&mut self, shelf: &Shelf) -> Result<()>;

    /// Human-readable location for diagnostics.
    fn location(&self) -> String;
}
