#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tabular_digest::DirStore;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn fixture_bytes(name: &str) -> Vec<u8> {
    fs::read(fixture_path(name)).expect("read fixture")
}

/// Scratch directory with a file store rooted inside it; removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory used as the upload store by CLI tests.
    pub fn store_dir(&self) -> PathBuf {
        self.temp_dir.path().join("store")
    }

    pub fn store(&self) -> DirStore {
        DirStore::new(self.store_dir())
    }

    /// Writes raw `contents` under the workspace and returns the path.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }
}

pub fn parse(bytes: &[u8]) -> tabular_digest::ParsedTable {
    tabular_digest::TableParser::default()
        .parse(bytes, "fixture.csv")
        .expect("parse fixture")
}

pub fn cell<'a>(table: &'a tabular_digest::Table, row: usize, column: &str) -> Option<&'a str> {
    let idx = table.column_index(column).expect("column exists");
    table.rows()[row][idx].as_deref()
}
