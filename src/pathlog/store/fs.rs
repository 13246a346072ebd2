use super::{Shelf, ShelfBackend};
use crate::error::{PathlogError, Result};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Shelf stored as a JSON object in a single file.
pub struct FileShelf {
    path: PathBuf,
}

impl FileShelf {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path
            .with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
    }
}

impl ShelfBackend for FileShelf {
    fn load(&self) -> Result<Shelf> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Shelf::new()),
            Err(e) => return Err(PathlogError::Io(e)),
        };
        if content.trim().is_empty() {
            return Ok(Shelf::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(shelf) => Ok(shelf),
            _ => Err(PathlogError::storage(
                self.location(),
                "expected a JSON object at the top level",
            )),
        }
    }

    fn save(&mut self, shelf: &Shelf) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling then rename, so readers see either the old or the
        // new document.
        let content = serde_json::to_string_pretty(shelf)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(PathlogError::Io(e));
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
