// src/store/repository.rs

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use serde::{Serialize, de::DeserializeOwned};

use super::StoreError;
use crate::models::Identifiable;

/// Generic repository holding one collection in memory, mirrored to a JSON
/// array on disk.
///
/// Reads share the lock; every write takes it exclusively and rewrites the
/// whole file before returning.
#[derive(Debug)]
pub struct Repository<T> {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, T>>,
}

impl<T> Repository<T>
where
    T: Identifiable + Serialize + DeserializeOwned + Clone,
{
    /// Opens the collection at `path`, creating an empty one if the file does
    /// not exist. Malformed content is an error, never silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        tracing::info!(path = %path.display(), "Loading collection");

        let entries = match fs::read(&path) {
            Ok(bytes) => decode(&path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                create_empty(&path)?;
                BTreeMap::new()
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        tracing::debug!(path = %path.display(), count = entries.len(), "Collection loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Opens `<dir>/<collection>.data.json`.
    pub fn in_dir(dir: impl AsRef<Path>, collection: &str) -> Result<Self, StoreError> {
        Self::open(dir.as_ref().join(format!("{collection}.data.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &str) -> Result<T, StoreError> {
        self.find(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(id)
    }

    /// Every entity, in identity order.
    pub fn list_all(&self) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces `entity` and rewrites the collection file.
    ///
    /// If the file cannot be written the in-memory change is undone.
    pub fn save(&self, entity: T) -> Result<(), StoreError> {
        let id = entity.id();
        if id.trim().is_empty() {
            return Err(StoreError::InvalidEntity("empty identity".to_string()));
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(id.clone(), entity);

        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(id, old),
                None => entries.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Deletes an entity and rewrites the collection file. Returns the
    /// removed entity, if any.
    pub fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(removed) = entries.remove(id) else {
            return Ok(None);
        };

        if let Err(e) = self.persist(&entries) {
            entries.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    /// Writes a full snapshot next to the target and renames it into place.
    fn persist(&self, entries: &BTreeMap<String, T>) -> Result<(), StoreError> {
        let items: Vec<&T> = entries.values().collect();
        let bytes = serde_json::to_vec_pretty(&items)?;

        let tmp = self.path.with_extension("json.tmp");
        write_and_sync(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

fn decode<T>(path: &Path, bytes: &[u8]) -> Result<BTreeMap<String, T>, StoreError>
where
    T: Identifiable + DeserializeOwned,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }

    let items: Vec<T> = serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(items.into_iter().map(|item| (item.id(), item)).collect())
}

fn create_empty(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    write_and_sync(path, b"[]")
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut f = fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    f.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
    f.sync_all().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        key: String,
        value: u32,
    }

    impl Identifiable for Item {
        fn id(&self) -> String {
            self.key.clone()
        }
    }

    fn item(key: &str, value: u32) -> Item {
        Item {
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn open_creates_missing_file_and_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/items.data.json");

        let repo = Repository::<Item>::open(&path).unwrap();

        assert!(repo.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn empty_file_is_an_empty_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.data.json");
        fs::write(&path, "  \n").unwrap();

        let repo = Repository::<Item>::open(&path).unwrap();
        assert!(repo.is_empty());
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.data.json");
        fs::write(&path, "[{\"key\": \"a\",").unwrap();

        let err = Repository::<Item>::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::<Item>::in_dir(dir.path(), "items").unwrap();

        let err = repo.get("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn save_rejects_blank_identity() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::<Item>::in_dir(dir.path(), "items").unwrap();

        let err = repo.save(item("  ", 1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEntity(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn save_upserts_and_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::<Item>::in_dir(dir.path(), "items").unwrap();

        repo.save(item("a", 1)).unwrap();
        repo.save(item("b", 2)).unwrap();
        repo.save(item("a", 3)).unwrap();

        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("a").unwrap().value, 3);

        let reopened = Repository::<Item>::open(repo.path()).unwrap();
        assert_eq!(reopened.list_all(), vec![item("a", 3), item("b", 2)]);

        // The file is always a plain JSON array.
        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(repo.path()).unwrap()).unwrap();
        assert_eq!(raw.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::<Item>::in_dir(dir.path(), "items").unwrap();
        repo.save(item("a", 1)).unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(repo.path().with_extension("json.tmp")).unwrap();

        assert!(matches!(
            repo.save(item("a", 2)).unwrap_err(),
            StoreError::Io { .. }
        ));
        assert!(repo.save(item("b", 1)).is_err());
        assert_eq!(repo.list_all(), vec![item("a", 1)]);
    }

    #[test]
    fn remove_deletes_from_disk() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::<Item>::in_dir(dir.path(), "items").unwrap();
        repo.save(item("a", 1)).unwrap();

        assert_eq!(repo.remove("a").unwrap(), Some(item("a", 1)));
        assert_eq!(repo.remove("a").unwrap(), None);

        let reopened = Repository::<Item>::open(repo.path()).unwrap();
        assert!(reopened.is_empty());
    }
}
