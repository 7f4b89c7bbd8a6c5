use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::task::TaskList;

/// Default document name, relative to the working directory
pub const DEFAULT_FILE: &str = "todos.json";

/// Error type for task document I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid task document: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The persisted task document: one JSON file, read and written whole.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TaskStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing or empty file is an empty list.
    pub fn load(&self) -> Result<TaskList, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TaskList::default()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(TaskList::default());
        }
        decode(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Startup policy: never fail. A corrupt document is copied to
    /// `<file>.bak` before being treated as empty, so the next save cannot
    /// destroy it.
    pub fn load_or_default(&self) -> TaskList {
        match self.load() {
            Ok(list) => list,
            Err(StoreError::Corrupt { path, source }) => {
                let backup = backup_path(&path);
                match fs::copy(&path, &backup) {
                    Ok(_) => tracing::warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %source,
                        "task document is corrupt; backed up and starting empty"
                    ),
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %source,
                        backup_error = %e,
                        "task document is corrupt and could not be backed up; starting empty"
                    ),
                }
                TaskList::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load tasks; starting empty");
                TaskList::default()
            }
        }
    }

    /// Overwrite the document with the full list
    pub fn save(&self, list: &TaskList) -> Result<(), StoreError> {
        let mut content = encode(list)?;
        content.push('\n');
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), tasks = list.len(), "saved tasks");
        Ok(())
    }
}

/// Pretty-printed JSON, two-space indentation
pub fn encode(list: &TaskList) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(list)
}

pub fn decode(bytes: &[u8]) -> Result<TaskList, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// `todos.json` -> `todos.json.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write via a temp file in the same directory, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
