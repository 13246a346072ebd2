//! Path records for processed inputs.
//!
//! A [`PathInfo`] is computed purely from the input string and the current
//! working directory. Nothing touches the filesystem: the input need not exist
//! and symlinks are not resolved.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    /// Reserved for input validation; construction currently always succeeds.
    pub ok: bool,
    pub input_path: String,
    pub basename: String,
    pub abspath: String,
}

impl PathInfo {
    /// Resolve `path` against the process working directory.
    pub fn parse(path: &str) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::parse_from(path, &cwd)
    }

    /// Resolve `path` against an explicit base directory.
    pub fn parse_from(path: &str, cwd: &Path) -> Self {
        Self {
            ok: true,
            input_path: path.to_string(),
            basename: basename(path).to_string(),
            abspath: absolutize(path, cwd),
        }
    }

    /// The line emitted for this path: the absolute form when verbose,
    /// otherwise the basename.
    pub fn display_line(&self, verbose: bool) -> &str {
        if verbose { &self.abspath } else { &self.basename }
    }
}

impl fmt::Display for PathInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PathInfo(ok={}, input_path={:?}, basename={:?}, abspath={:?})",
            self.ok, self.input_path, self.basename, self.abspath
        )
    }
}

/// Everything after the final separator. A trailing separator yields "".
fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Lexically normalized absolute form: `.` dropped, `..` collapsed,
/// repeated separators folded.
fn absolutize(path: &str, cwd: &Path) -> String {
    let joined = cwd.join(path);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir.as_os_str());
    }
    out.to_string_lossy().into_owned()
}
