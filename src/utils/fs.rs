//! File system helpers for interface files.
//!
//! Every helper opens and closes its own handle, so nothing stays open
//! between calls.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;

/// Create `dir` and its parents; a no-op when it already exists
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// File content, or `None` when the file does not exist
pub fn read_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create `path` with `content`; fails if the file appeared meanwhile
pub fn write_new(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// Append `content` to an existing file
pub fn append(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// Interface file name for a source file: `shapes.py` + `i` -> `shapes.pyi`
pub fn interface_file_name(source: &Path, suffix: &str) -> Option<String> {
    source
        .file_name()
        .map(|name| format!("{}{suffix}", name.to_string_lossy()))
}
