use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use uuid::Uuid;

use crate::{error::IngestError, ingest::FileFormat};

pub const DEFAULT_STORE_DIR: &str = "temp_files";

/// Byte-level storage for uploaded files, keyed by stored name.
pub trait FileStore {
    /// Stores `bytes` under a fresh unique name derived from `name` and returns it.
    fn save(&self, bytes: &[u8], name: &str) -> Result<String, IngestError>;
    fn read(&self, name: &str) -> Result<Vec<u8>, IngestError>;
    fn exists(&self, name: &str) -> bool;
    fn delete(&self, name: &str) -> Result<(), IngestError>;
    /// Stored names with an accepted extension, sorted.
    fn list(&self) -> Result<Vec<String>, IngestError>;
}

/// Flat directory store; the directory is created on first save.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(file_component(name))
    }

    fn io_error(path: PathBuf, source: io::Error) -> IngestError {
        if source.kind() == io::ErrorKind::NotFound {
            IngestError::NotFound {
                file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }
        } else {
            IngestError::Io { path, source }
        }
    }
}

impl FileStore for DirStore {
    fn save(&self, bytes: &[u8], name: &str) -> Result<String, IngestError> {
        fs::create_dir_all(&self.root).map_err(|source| IngestError::Io {
            path: self.root.clone(),
            source,
        })?;
        let stored = format!("{}_{}", Uuid::new_v4().simple(), file_component(name));
        let path = self.root.join(&stored);
        fs::write(&path, bytes).map_err(|source| IngestError::Io { path, source })?;
        debug!("Stored {} byte(s) as '{}'", bytes.len(), stored);
        Ok(stored)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, IngestError> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(IngestError::NotFound {
                file: name.to_string(),
            });
        }
        fs::read(&path).map_err(|source| Self::io_error(path, source))
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn delete(&self, name: &str) -> Result<(), IngestError> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(IngestError::NotFound {
                file: name.to_string(),
            });
        }
        fs::remove_file(&path).map_err(|source| Self::io_error(path, source))?;
        debug!("Deleted '{}'", name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, IngestError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(IngestError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| IngestError::Io {
                path: self.root.clone(),
                source,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if FileFormat::from_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Final path component of `name`, so stored names never escape the root.
fn file_component(name: &str) -> String {
    let component = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match component {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}
