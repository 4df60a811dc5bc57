use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::StoreError;

/// Key under which the completed trips are persisted.
pub const TRIP_HISTORY_KEY: &str = "tripHistory";

/// Where a persisted history that can no longer be read is set aside.
pub const TRIP_HISTORY_BACKUP_KEY: &str = "tripHistoryUnreadable";

const JSON_EXTENSION: &str = "json";

/// String-keyed persistence of JSON values.
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing readable is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn clear_all(&self) -> Result<(), StoreError>;

    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        (**self).clear_all()
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.values.lock().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.values.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// One `<key>.json` file per key inside a folder.
///
/// Writes go to a temporary file in the same folder that is then renamed over the
/// target, so a failed write leaves the previous value in place. A file that no longer
/// parses is treated as absent and deleted on read.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    folder: PathBuf,
}

impl JsonFileStore {
    /// Creates the folder if needed.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let folder = folder.into();
        std::fs::create_dir_all(&folder)?;
        Ok(JsonFileStore { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let is_plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);

        if !is_plain {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }

        Ok(self.folder.join(format!("{key}.{JSON_EXTENSION}")))
    }

    fn json_files(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut files = vec![];

        for entry in std::fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != JSON_EXTENSION) {
                continue;
            }

            if let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((key.to_owned(), path.clone()));
            }
        }

        files.sort();
        Ok(files)
    }

    fn write_atomically<F>(&self, path: &Path, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BufWriter<NamedTempFile>) -> Result<(), StoreError>,
    {
        let mut writer = BufWriter::with_capacity(64 * 1024, NamedTempFile::new_in(&self.folder)?);
        write(&mut writer)?;

        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| err.error)?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.file_path(key)?;

        self.write_atomically(&path, |writer| {
            serde_json::to_writer(&mut *writer, &value)?;
            writer.flush()?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.file_path(key)?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("discarding unreadable value for key {}: {}", key, err);
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.file_path(key)?) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        for (_, path) in self.json_files()? {
            std::fs::remove_file(path)?;
        }

        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .json_files()?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }
}
