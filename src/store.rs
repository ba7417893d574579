use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::scoring::{WeightCandidate, Weights};

/// Current on-disk format version of `FileStore` documents.
const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store document for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported store version {0}")]
    UnsupportedVersion(u32),
}

/// Durable key-value home for weight configurations.
///
/// `read` hands back whatever mapping is stored, unvalidated; the engine decides
/// whether to trust it.
pub trait ConfigStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<WeightCandidate>, StoreError>;
    fn write(&self, key: &str, weights: &Weights) -> Result<(), StoreError>;
}

/// In-process store, handy for tests and for embedding the engine without disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, WeightCandidate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one raw entry
    pub fn with_entry(key: &str, candidate: WeightCandidate) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), candidate);
        store
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<WeightCandidate>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, weights: &Weights) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), weights.to_candidate());
        Ok(())
    }
}

/// Entries are kept as raw JSON so one hand-edited entry cannot make the
/// whole document unreadable.
#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

/// Turn a raw stored entry into a candidate.
///
/// Whole-number floats such as `40.0` are accepted. Any other value is
/// dropped, which later surfaces as a missing component during validation.
fn candidate_from_value(key: &str, value: &Value) -> WeightCandidate {
    let Some(map) = value.as_object() else {
        tracing::warn!(key, "stored entry is not an object");
        return WeightCandidate::new();
    };

    map.iter()
        .filter_map(|(name, raw)| {
            let weight = raw.as_i64().or_else(|| {
                raw.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            });
            if weight.is_none() {
                tracing::warn!(key, component = %name, value = %raw, "ignoring non-integer stored weight");
            }
            weight.map(|w| (name.clone(), w))
        })
        .collect()
}

impl StoreDocument {
    fn new() -> Self {
        Self {
            version: STORE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSON file store. Every write rewrites the whole document atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::new());
        }

        let file = File::open(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let doc: StoreDocument =
            serde_json::from_reader(file).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if doc.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(doc.version));
        }
        Ok(doc)
    }

    fn save(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = AtomicWriteFile::open(&self.path).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut file, doc).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        file.commit().map_err(io_err)?;
        Ok(())
    }
}

impl ConfigStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<WeightCandidate>, StoreError> {
        let doc = self.load()?;
        Ok(doc.entries.get(key).map(|value| candidate_from_value(key, value)))
    }

    fn write(&self, key: &str, weights: &Weights) -> Result<(), StoreError> {
        let mut doc = self.load()?;
        let value = serde_json::to_value(weights.to_candidate()).map_err(|source| {
            StoreError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;
        doc.entries.insert(key.to_string(), value);
        self.save(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert!(store.read("weights").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_write_then_read() {
        let store = MemoryStore::new();
        store.write("weights", &Weights::default()).unwrap();
        let read = store.read("weights").unwrap().unwrap();
        assert_eq!(read, Weights::default().to_candidate());
    }

    #[test]
    fn test_file_store_missing_file_reads_none() {
        let path = temp_path("plugin_score_test_store_missing.json");
        let store = FileStore::new(&path);
        assert!(store.read("weights").unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_roundtrip_keeps_other_keys() {
        let path = temp_path("plugin_score_test_store_roundtrip.json");
        let store = FileStore::new(&path);

        store.write("a", &Weights::default()).unwrap();
        store.write("b", &Weights::default()).unwrap();

        let a = store.read("a").unwrap().unwrap();
        assert_eq!(a["user_rating"], 40);
        assert!(store.read("b").unwrap().is_some());
        assert!(store.read("c").unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_unknown_version() {
        let path = temp_path("plugin_score_test_store_version.json");
        std::fs::write(&path, r#"{"version": 7, "entries": {}}"#).unwrap();

        let err = FileStore::new(&path).read("weights").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion(7)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_accepts_whole_number_floats() {
        let path = temp_path("plugin_score_test_store_floats.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "entries": {"weights": {
                "user_rating": 40.0, "rating_count": 20,
                "installation_count": 25, "support_responsiveness": 15
            }}}"#,
        )
        .unwrap();

        let read = FileStore::new(&path).read("weights").unwrap().unwrap();
        assert_eq!(read, Weights::default().to_candidate());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_drops_non_integer_weights() {
        let path = temp_path("plugin_score_test_store_non_integer.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "entries": {
                "weights": {"user_rating": "forty", "rating_count": 20.5, "installation_count": 25},
                "other": [1, 2]
            }}"#,
        )
        .unwrap();

        let store = FileStore::new(&path);
        let read = store.read("weights").unwrap().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read["installation_count"], 25);
        assert!(store.read("other").unwrap().unwrap().is_empty());

        // A bad entry does not block writing a good one next to it
        store.write("weights", &Weights::default()).unwrap();
        assert_eq!(
            store.read("weights").unwrap(),
            Some(Weights::default().to_candidate())
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_serialize_error_is_not_reported_as_parse() {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = StoreError::Serialize {
            path: PathBuf::from("/tmp/weights.json"),
            source,
        };
        assert_eq!(
            err.to_string(),
            "failed to serialize store document for /tmp/weights.json"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_file_store_reports_corrupt_json() {
        let path = temp_path("plugin_score_test_store_corrupt.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).read("weights").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
