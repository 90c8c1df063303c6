//! File-backed document store.
//!
//! One directory holds one project; each document is a single
//! `<name>.pixelbench.json` file containing the versioned envelope. The store
//! treats envelopes as opaque JSON — versioning, migration, and entity
//! restoration all live in `pixelbench-doc`.
//!
//! Writes are atomic: the envelope lands in a temp file first and is renamed
//! into place, so a crash mid-save never truncates an existing document.

mod error;

pub use error::{StoreError, StoreResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use pixelbench_doc::{Document, load_document};
use pixelbench_model::ClassRegistry;

const EXTENSION: &str = ".pixelbench.json";

/// A directory of saved documents.
#[derive(Debug)]
pub struct DocStore {
    dir: PathBuf,
}

impl DocStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves a document under its own name, replacing any previous save
    /// atomically. Returns the path written.
    pub fn save(&self, registry: &ClassRegistry, doc: &Document) -> StoreResult<PathBuf> {
        let path = self.path_for(doc.name())?;
        let envelope = doc.save(registry)?;
        let body = serde_json::to_vec_pretty(&envelope)?;

        // Temp file in the same directory so the rename stays on one
        // filesystem and is atomic.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &body)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        info!(doc = doc.name(), path = %path.display(), bytes = body.len(), "saved document");
        Ok(path)
    }

    /// Loads a document by name, running the version-upgrade chain if the
    /// file predates the current format.
    pub fn load(&self, registry: &ClassRegistry, name: &str) -> StoreResult<Document> {
        let path = self.path_for(name)?;
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let envelope: Value = serde_json::from_slice(&body)?;
        debug!(doc = name, path = %path.display(), "loading document");
        Ok(load_document(registry, envelope)?)
    }

    /// Whether a document with this name has been saved.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.exists())
    }

    /// Names of every saved document, sorted.
    pub fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(EXTENSION) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes a saved document.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Maps a document name onto its file path. Names must be usable as a
    /// bare file stem; anything path-like is refused.
    fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}{EXTENSION}")))
    }
}
