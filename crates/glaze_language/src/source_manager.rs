//! Source buffer ownership and `#include` path resolution.
//!
//! The manager owns the text of every source unit in a compilation, keyed by
//! [`FileId`]. The three distinguished units (system preamble, user preamble,
//! main file) are buffer-backed slots filled by the orchestrator; further ids
//! are allocated as `#include`s resolve.
//!
//! Buffers are immutable once loaded and handed out as `Arc<str>`, so a
//! scanner can hold the text while the preprocessor keeps mutating the
//! manager (opening included files). Opening the same canonical path twice
//! returns the cached id.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use glaze_base::FileId;

/// Failure to read a source file.
#[derive(Debug)]
pub struct SourceError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot read '{}': {}", self.path.display(), self.source)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

struct SourceEntry {
    /// Canonical backing path; `None` for buffer-only units.
    path: Option<PathBuf>,
    text: Arc<str>,
}

/// Owns source buffers for one compilation.
pub struct SourceManager {
    entries: Vec<SourceEntry>,
    by_canonical_path: FxHashMap<PathBuf, FileId>,
}

impl SourceManager {
    /// Creates a manager with empty preamble and main slots.
    pub fn new() -> SourceManager {
        let empty: Arc<str> = Arc::from("");
        SourceManager {
            entries: vec![
                SourceEntry { path: None, text: empty.clone() },
                SourceEntry { path: None, text: empty.clone() },
                SourceEntry { path: None, text: empty },
            ],
            by_canonical_path: FxHashMap::default(),
        }
    }

    pub fn set_system_preamble(&mut self, text: &str) {
        self.entries[FileId::SYSTEM_PREAMBLE.raw() as usize].text = Arc::from(text);
    }

    pub fn set_user_preamble(&mut self, text: &str) {
        self.entries[FileId::USER_PREAMBLE.raw() as usize].text = Arc::from(text);
    }

    /// Fills the main slot from an in-memory buffer.
    pub fn set_main_from_buffer(&mut self, text: &str) {
        self.entries[FileId::MAIN.raw() as usize] = SourceEntry {
            path: None,
            text: Arc::from(text),
        };
    }

    /// Fills the main slot by reading `path`.
    pub fn set_main_from_file(&mut self, path: &Path) -> Result<(), SourceError> {
        let (canonical, text) = read_source(path)?;
        self.entries[FileId::MAIN.raw() as usize] = SourceEntry {
            path: Some(canonical),
            text,
        };
        Ok(())
    }

    /// Opens `path` as an included file, canonicalizing and caching by the
    /// canonical path.
    pub fn open_from_file(&mut self, path: &Path) -> Result<FileId, SourceError> {
        let (canonical, text) = read_source(path)?;
        if let Some(&id) = self.by_canonical_path.get(&canonical) {
            return Ok(id);
        }

        let id = FileId::from_raw(self.entries.len() as u32);
        self.by_canonical_path.insert(canonical.clone(), id);
        self.entries.push(SourceEntry {
            path: Some(canonical),
            text,
        });
        Ok(id)
    }

    /// Creates a buffer-only unit, e.g. for tests or generated text.
    pub fn open_from_buffer(&mut self, text: &str) -> FileId {
        let id = FileId::from_raw(self.entries.len() as u32);
        self.entries.push(SourceEntry {
            path: None,
            text: Arc::from(text),
        });
        id
    }

    /// The text of a unit. Cheap to clone; the buffer is shared.
    pub fn text(&self, file: FileId) -> Arc<str> {
        self.entries[file.raw() as usize].text.clone()
    }

    /// Backing path of a unit, if it has one.
    pub fn path(&self, file: FileId) -> Option<&Path> {
        self.entries[file.raw() as usize].path.as_deref()
    }

    pub fn file_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_source(path: &Path) -> Result<(PathBuf, Arc<str>), SourceError> {
    let canonical = path.canonicalize().map_err(|source| SourceError {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = std::fs::read_to_string(&canonical).map_err(|source| SourceError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((canonical, Arc::from(bytes.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn preamble_slots_are_preallocated() {
        let mut sources = SourceManager::new();
        sources.set_system_preamble("void system();");
        sources.set_user_preamble("void user();");
        sources.set_main_from_buffer("void main() {}");

        assert_eq!(&*sources.text(FileId::SYSTEM_PREAMBLE), "void system();");
        assert_eq!(&*sources.text(FileId::USER_PREAMBLE), "void user();");
        assert_eq!(&*sources.text(FileId::MAIN), "void main() {}");
        assert!(sources.path(FileId::MAIN).is_none());
    }

    #[test]
    fn open_from_buffer_allocates_include_ids() {
        let mut sources = SourceManager::new();
        let id = sources.open_from_buffer("int x;");
        assert!(id.is_include());
        assert_eq!(&*sources.text(id), "int x;");
    }

    #[test]
    fn open_from_file_caches_by_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("common.glsl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "float shared_fn();").unwrap();

        let mut sources = SourceManager::new();
        let first = sources.open_from_file(&path).unwrap();
        let second = sources.open_from_file(&path).unwrap();
        assert_eq!(first, second);
        assert!(sources.path(first).is_some());
        assert!(sources.text(first).contains("shared_fn"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut sources = SourceManager::new();
        let err = sources
            .open_from_file(Path::new("/nonexistent/path/shader.glsl"))
            .unwrap_err();
        assert!(err.to_string().contains("shader.glsl"));
    }
}
