use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::Document;

/// Error type for document persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("saved checklist is malformed: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("could not serialize checklist: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// Where a document lives between sessions
pub trait Store {
    /// The saved document, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Document>, StoreError>;
    fn save(&self, doc: &Document) -> Result<(), StoreError>;
}

/// Pretty-printed JSON in a single file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<Document>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let doc = serde_json::from_str(&text).map_err(StoreError::Parse)?;
        Ok(Some(doc))
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(doc).map_err(StoreError::Serialize)?;
        json.push('\n');
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        atomic_write(&self.path, json.as_bytes()).map_err(write_err)
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory store. Loads and saves can be made to fail to exercise
/// recovery paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RefCell<Option<Document>>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Document) -> Self {
        let store = Self::default();
        store.doc.replace(Some(doc));
        store
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    pub fn saved(&self) -> Option<Document> {
        self.doc.borrow().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Document>, StoreError> {
        if self.fail_loads.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(self.doc.borrow().clone())
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Unavailable);
        }
        self.doc.replace(Some(doc.clone()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
