use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use ahash::{HashMap, HashMapExt};
use anyhow::{Context, Error, Result};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};

/// One serialized entity, exactly as the model layer produced it.
pub type Record = Map<String, Value>;

/// In-memory object index flushed to a single JSON document.
///
/// Keys are `"<Class>.<id>"`. Nothing reaches disk until [`FileStorage::flush`].
pub struct FileStorage {
    path: PathBuf,
    objects: Mutex<HashMap<String, Record>>,
}

impl FileStorage {
    pub fn new(path: &str) -> Self {
        hbnb_log::info(Some("⚡"), format!("[FileStorage] Initializing component at {path}"));

        Self {
            path: PathBuf::from(path),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn object_key(class: &str, id: &str) -> String {
        format!("{class}.{id}")
    }

    pub async fn insert_object(&self, key: &str, record: Record) {
        self.objects.lock().await.insert(key.to_owned(), record);
    }

    pub async fn remove_object(&self, key: &str) -> bool {
        self.objects.lock().await.remove(key).is_some()
    }

    /// Every record in the index, ordered by key.
    pub async fn select_objects(&self) -> Vec<(String, Record)> {
        let objects = self.objects.lock().await;
        let mut selected = objects
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect::<Vec<_>>();
        selected.sort_by(|(a, _), (b, _)| a.cmp(b));
        selected
    }

    pub async fn count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn flush(&self) -> Result<()> {
        let objects = self.objects.lock().await;
        let document = objects.iter().collect::<BTreeMap<_, _>>();
        let content = serde_json::to_vec_pretty(&document)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        hbnb_log::debug(
            None,
            format!("[FileStorage] Flushed {} objects", objects.len()),
        );
        Ok(())
    }

    /// Merges the records on disk into the index, overwriting entries that
    /// share a key. A file that does not exist yet leaves the index as is.
    pub async fn reload(&self) -> Result<()> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                hbnb_log::debug(
                    None,
                    format!("[FileStorage] {} does not exist yet", self.path.display()),
                );
                return Ok(());
            }
            Err(err) => {
                return Err(Error::new(err)
                    .context(format!("Failed to read {}", self.path.display())))
            }
        };

        let document = serde_json::from_slice::<Map<String, Value>>(&content)
            .with_context(|| format!("{} is not a JSON object", self.path.display()))?;

        let mut loaded = Vec::with_capacity(document.len());
        for (key, value) in document {
            match value {
                Value::Object(record) => loaded.push((key, record)),
                _ => {
                    return Err(Error::msg(format!(
                        "Stored object '{key}' is not a JSON object"
                    )))
                }
            }
        }

        let mut objects = self.objects.lock().await;
        let count = loaded.len();
        objects.extend(loaded);

        hbnb_log::debug(None, format!("[FileStorage] Reloaded {count} objects"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(id: &str) -> Record {
        match json!({ "id": id, "__class__": "User", "name": "Betty" }) {
            Value::Object(record) => record,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn flush_then_reload_into_fresh_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let path = path.to_str().unwrap();

        let storage = FileStorage::new(path);
        storage.insert_object("User.1", record("1")).await;
        storage.insert_object("User.2", record("2")).await;
        storage.flush().await.unwrap();

        let reopened = FileStorage::new(path);
        assert_eq!(reopened.count().await, 0);
        reopened.reload().await.unwrap();

        let objects = reopened.select_objects().await;
        assert_eq!(
            objects.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>(),
            vec!["User.1", "User.2"]
        );
        assert_eq!(objects[0].1, record("1"));
    }

    #[tokio::test]
    async fn reload_missing_file_keeps_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let storage = FileStorage::new(path.to_str().unwrap());
        storage.insert_object("User.1", record("1")).await;

        storage.reload().await.unwrap();

        assert_eq!(storage.count().await, 1);
    }

    #[tokio::test]
    async fn reload_rejects_non_object_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        std::fs::write(&path, r#"{"User.1": 42}"#).unwrap();

        let storage = FileStorage::new(path.to_str().unwrap());

        assert!(storage.reload().await.is_err());
    }

    #[tokio::test]
    async fn removal_is_durable_only_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let path = path.to_str().unwrap();

        let storage = FileStorage::new(path);
        storage.insert_object("User.1", record("1")).await;
        storage.flush().await.unwrap();

        assert!(storage.remove_object("User.1").await);
        assert!(!storage.remove_object("User.1").await);

        let before_flush = FileStorage::new(path);
        before_flush.reload().await.unwrap();
        assert_eq!(before_flush.count().await, 1);

        storage.flush().await.unwrap();
        let after_flush = FileStorage::new(path);
        after_flush.reload().await.unwrap();
        assert_eq!(after_flush.count().await, 0);
    }

    #[test]
    fn object_key_joins_class_and_id() {
        assert_eq!(FileStorage::object_key("Place", "abc"), "Place.abc");
    }
}
