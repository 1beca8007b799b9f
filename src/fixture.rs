use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::resolver::resolve_path;

#[derive(Debug, Error)]
pub enum FixtureLoadError {
    #[error("cannot read fixture file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("fixture file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A fixture document as loaded from disk.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub path: PathBuf,
    pub document: Arc<Value>,
}

/// Holds every fixture loaded during route construction.
///
/// Documents are read once and handed out behind an `Arc`; nothing here
/// writes to a document after it has been parsed.
#[derive(Debug)]
pub struct FixtureStore {
    root_folder: PathBuf,
    fixtures: Vec<Fixture>,
}

impl FixtureStore {
    pub fn new(root_folder: impl Into<PathBuf>) -> Self {
        Self {
            root_folder: root_folder.into(),
            fixtures: Vec::new(),
        }
    }

    /// Reads and parses the fixture named by `reference`, resolved against
    /// the store's root folder.
    pub fn load(&mut self, reference: &str) -> Result<Arc<Value>, FixtureLoadError> {
        let path = resolve_path(reference, &self.root_folder);
        let document = Arc::new(read_fixture(&path)?);
        debug!(path = %path.display(), "Loaded fixture");

        self.fixtures.push(Fixture {
            path,
            document: Arc::clone(&document),
        });
        Ok(document)
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }
}

fn read_fixture(path: &Path) -> Result<Value, FixtureLoadError> {
    let content = fs::read_to_string(path).map_err(|e| FixtureLoadError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| FixtureLoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_fixture_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("teams.json"), r#"[{"id":"1"}]"#).unwrap();

        let mut store = FixtureStore::new(dir.path());
        let doc = store.load("teams.json").unwrap();

        assert_eq!(*doc, json!([{"id": "1"}]));
        assert_eq!(store.fixtures().len(), 1);
        assert_eq!(store.fixtures()[0].path, dir.path().join("teams.json"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FixtureStore::new(dir.path());

        let err = store.load("absent.json").unwrap_err();
        assert!(matches!(err, FixtureLoadError::Read { .. }));
        assert!(store.fixtures().is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{\"id\": ").unwrap();

        let mut store = FixtureStore::new(dir.path());
        let err = store.load("broken.json").unwrap_err();
        assert!(matches!(err, FixtureLoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn scalar_fixture_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.json"), "\"hello\"").unwrap();

        let mut store = FixtureStore::new(dir.path());
        assert_eq!(*store.load("hello.json").unwrap(), json!("hello"));
    }
}
