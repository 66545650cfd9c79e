//! Append-only interface files, one per observed source file.

use crate::config::AutodocConfig;
use crate::utils::fs;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

/// What [`InterfaceStore::update`] did with a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The interface file was created with a header and the block
    Created,
    /// The block was appended to an existing file
    Appended,
    /// The key was already present; nothing was written
    Skipped,
    /// An I/O error occurred and was logged
    Failed,
}

impl SyncOutcome {
    pub fn wrote(&self) -> bool {
        matches!(self, SyncOutcome::Created | SyncOutcome::Appended)
    }
}

/// Owns the output directory and its interface files
#[derive(Debug, Clone)]
pub struct InterfaceStore {
    output_dir: PathBuf,
    suffix: String,
}

impl InterfaceStore {
    pub fn new(config: &AutodocConfig) -> Self {
        InterfaceStore {
            output_dir: config.output_dir.clone(),
            suffix: config.suffix.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/<file name><suffix>` for a source file
    pub fn interface_path(&self, source: &Path) -> Option<PathBuf> {
        fs::interface_file_name(source, &self.suffix).map(|name| self.output_dir.join(name))
    }

    /// Create, append or skip `block` depending on whether `key` is known.
    ///
    /// Never fails: errors are logged and reported as [`SyncOutcome::Failed`].
    pub fn update(&self, source: &Path, block: &str, key: &str) -> SyncOutcome {
        self.update_with_imports(source, block, key, &[])
    }

    /// Same as [`InterfaceStore::update`], writing the missing `imports`
    /// ahead of the block.
    ///
    /// Imports are only written together with the block. A known `key`
    /// leaves the file untouched, whatever classes the call involved. An
    /// import counts as present when its first line appears as a whole line.
    pub fn update_with_imports(
        &self,
        source: &Path,
        block: &str,
        key: &str,
        imports: &[String],
    ) -> SyncOutcome {
        match self.try_update(source, block, key, imports) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to update interface for {}: {e:#}", source.display());
                SyncOutcome::Failed
            }
        }
    }

    fn try_update(
        &self,
        source: &Path,
        block: &str,
        key: &str,
        imports: &[String],
    ) -> Result<SyncOutcome> {
        let path = self
            .interface_path(source)
            .ok_or_else(|| anyhow!("source path has no file name"))?;

        fs::ensure_dir(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let existing = fs::read_if_exists(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let header = header(source);

        match existing {
            None => {
                let content = format!("{header}{}", addition("", imports, block));
                fs::write_new(&path, &content)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                debug!("Created {} with `{key}`", path.display());
                Ok(SyncOutcome::Created)
            }
            Some(content) => {
                // The header names the source file, so it never counts as a match
                let body = content.strip_prefix(header.as_str()).unwrap_or(content.as_str());
                if body.contains(key) {
                    info!("Function {key} already documented in {}", path.display());
                    return Ok(SyncOutcome::Skipped);
                }
                fs::append(&path, &addition(body, imports, block))
                    .with_context(|| format!("Failed to append to {}", path.display()))?;
                debug!("Appended `{key}` to {}", path.display());
                Ok(SyncOutcome::Appended)
            }
        }
    }
}

/// Imports missing from `body`, then the block, each followed by a blank line
fn addition(body: &str, imports: &[String], block: &str) -> String {
    let mut text = String::new();
    let mut written: Vec<&str> = Vec::new();
    for snippet in imports {
        let Some(first) = snippet.lines().next() else {
            continue;
        };
        if written.contains(&first) || body.lines().any(|line| line == first) {
            continue;
        }
        written.push(first);
        text.push_str(snippet);
        text.push('\n');
    }
    text.push_str(block);
    text.push('\n');
    text
}

/// First lines of a new interface file
fn header(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!(
        "\"\"\"Interface for `{name}`, generated by autodoc.\n\n\
         Sign manual edits with author and date.\n\"\"\"\n\
         from typing import Any\n\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> InterfaceStore {
        InterfaceStore::new(&AutodocConfig::default().with_output_dir(dir.path().join("typings")))
    }

    const BLOCK: &str = "def area(width: int) -> int:\n    ...\n";

    #[test]
    fn test_interface_path() {
        let store = InterfaceStore::new(&AutodocConfig::default());
        assert_eq!(
            store.interface_path(Path::new("src/shapes.py")),
            Some(PathBuf::from("typings/shapes.pyi"))
        );
    }

    #[test]
    fn test_first_write_has_header() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");

        assert_eq!(store.update(source, BLOCK, "area"), SyncOutcome::Created);

        let content = std::fs::read_to_string(store.interface_path(source).unwrap()).unwrap();
        assert!(content.starts_with("\"\"\"Interface for `shapes.py`"));
        assert!(content.contains("author and date"));
        assert!(content.contains("from typing import Any\n\ndef area("));
        assert!(content.ends_with("    ...\n\n"));
    }

    #[test]
    fn test_known_key_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");
        let path = store.interface_path(source).unwrap();

        store.update(source, BLOCK, "area");
        let before = std::fs::read_to_string(&path).unwrap();
        assert_eq!(store.update(source, BLOCK, "area"), SyncOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_new_key_is_appended() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");

        store.update(source, BLOCK, "area");
        let other = "def perimeter(width: int) -> int:\n    ...\n";
        assert_eq!(store.update(source, other, "perimeter"), SyncOutcome::Appended);

        let content = std::fs::read_to_string(store.interface_path(source).unwrap()).unwrap();
        assert!(content.ends_with("    ...\n\ndef perimeter(width: int) -> int:\n    ...\n\n"));
        assert_eq!(content.matches("from typing import Any").count(), 1);
    }

    #[test]
    fn test_io_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("typings");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = store(&dir);
        assert_eq!(
            store.update(Path::new("shapes.py"), BLOCK, "area"),
            SyncOutcome::Failed
        );
    }

    #[test]
    fn test_imports_are_written_with_the_block() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");
        let path = store.interface_path(source).unwrap();
        let imports = vec![
            "from geometry import Point\n".to_string(),
            "class Cell:\n    ...\n".to_string(),
        ];

        assert_eq!(
            store.update_with_imports(source, BLOCK, "area", &imports),
            SyncOutcome::Created
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "from typing import Any\n\nfrom geometry import Point\n\nclass Cell:\n    ...\n\ndef area("
        ));

        let other = "def perimeter(cell: Cell) -> int:\n    ...\n";
        assert_eq!(
            store.update_with_imports(source, other, "perimeter", &imports),
            SyncOutcome::Appended
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("from geometry import Point").count(), 1);
        assert_eq!(content.matches("class Cell:").count(), 1);
    }

    #[test]
    fn test_known_key_writes_no_imports() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");
        let path = store.interface_path(source).unwrap();

        store.update(source, BLOCK, "area");
        let before = std::fs::read_to_string(&path).unwrap();
        let imports = vec!["from geometry import Vector\n".to_string()];
        assert_eq!(
            store.update_with_imports(source, BLOCK, "area", &imports),
            SyncOutcome::Skipped
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_import_prefix_is_not_a_match() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("shapes.py");

        let cloud = vec!["from geometry import PointCloud\n".to_string()];
        store.update_with_imports(source, "def load(c: PointCloud) -> None:\n    ...\n", "load", &cloud);
        let point = vec!["from geometry import Point\n".to_string()];
        store.update_with_imports(source, "def draw(p: Point) -> None:\n    ...\n", "draw", &point);

        let content = std::fs::read_to_string(store.interface_path(source).unwrap()).unwrap();
        assert!(content.contains("from geometry import PointCloud\n"));
        assert!(content.contains("from geometry import Point\n"));
    }

    #[test]
    fn test_header_does_not_count_as_documented() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let source = Path::new("main.py");

        store.update(source, BLOCK, "area");
        assert_eq!(
            store.update(source, "def main() -> None:\n    ...\n", "main"),
            SyncOutcome::Appended
        );
        assert_eq!(
            store.update(source, "def date() -> None:\n    ...\n", "date"),
            SyncOutcome::Appended
        );
    }
}
