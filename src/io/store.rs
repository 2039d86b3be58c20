use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::book::SNAPSHOT_VERSION;
use crate::model::{Task, TaskBook};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string key-value slot, the local-storage equivalent.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the OS data directory for this app.
    pub fn in_data_dir() -> Self {
        Self::new(crate::config::data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        // Write to a sibling file first so a crash never leaves half a snapshot.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// Accepts both the versioned snapshot and a bare task array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Book(TaskBook),
    Bare(Vec<Task>),
}

/// Read the task book stored under `key`. `Ok(None)` when the key is absent.
pub fn load_book(store: &dyn KeyValueStore, key: &str) -> Result<Option<TaskBook>, StoreError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    let mut book = match serde_json::from_str::<Snapshot>(&raw)? {
        Snapshot::Book(book) => book,
        Snapshot::Bare(tasks) => TaskBook::new(tasks),
    };
    if book.version > SNAPSHOT_VERSION {
        tracing::warn!(
            version = book.version,
            supported = SNAPSHOT_VERSION,
            "snapshot written by a newer version; unknown fields are ignored"
        );
    }
    book.version = SNAPSHOT_VERSION;
    let dropped = book.sanitize();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped invalid tasks from snapshot");
    }
    Ok(Some(book))
}

/// Serialise `book` under `key`.
pub fn save_book(
    store: &mut dyn KeyValueStore,
    key: &str,
    book: &TaskBook,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(book)?;
    store.write(key, &json)
}
