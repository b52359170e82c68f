use anyhow::Error as AnyError;
use hbnb_config::{storage::StorageConfig, StorageType};
use hbnb_error::{Error, Result};
use hbnb_storage_db::db::DbStorage;
use hbnb_storage_file::storage::FileStorage;
use serde_json::Value as JsonValue;
use strum::IntoEnumIterator;

use crate::{
    base::{BaseModel, CLASS_KEY},
    kind::ModelKind,
};

const DEFAULT_FILE_PATH: &str = "file.json";

/// The backend selected at process start.
///
/// Models never reach for a global store: every lifecycle call is handed the
/// storage to act on.
pub enum Storage {
    File(FileStorage),
    Db(DbStorage),
}

impl Storage {
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let storage = match config.kind() {
            StorageType::File => {
                let path = match config.file() {
                    Some(file) => file.path(),
                    None => DEFAULT_FILE_PATH,
                };
                Self::File(FileStorage::new(path))
            }
            StorageType::Db => match config.db() {
                Some(db) => {
                    let tables = ModelKind::iter()
                        .map(|kind| kind.table_name())
                        .collect::<Vec<_>>();
                    Self::Db(DbStorage::new(db.path(), db.max_connections(), &tables).await?)
                }
                None => {
                    return Err(AnyError::msg("No db storage configuration is specified").into())
                }
            },
        };
        storage.reload().await?;

        Ok(storage)
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::File(_) => StorageType::File,
            Self::Db(_) => StorageType::Db,
        }
    }

    /// Records the model's current state as pending persistence.
    pub async fn register(&self, model: &BaseModel) -> Result<()> {
        match self {
            Self::File(storage) => {
                let key = FileStorage::object_key(model.class_name(), model.required_id()?);
                storage.insert_object(&key, model.to_dict()).await;
                Ok(())
            }
            Self::Db(storage) => Ok(storage
                .register(model.kind().table_name(), model.to_db_model()?)
                .await?),
        }
    }

    /// Flushes everything registered or deleted since the last save.
    pub async fn save(&self) -> Result<()> {
        match self {
            Self::File(storage) => Ok(storage.flush().await?),
            Self::Db(storage) => Ok(storage.flush().await?),
        }
    }

    /// Removes the model from the store. Durable after the next [`Storage::save`].
    pub async fn delete(&self, model: &BaseModel) -> Result<()> {
        let id = model.required_id()?;
        match self {
            Self::File(storage) => {
                let key = FileStorage::object_key(model.class_name(), id);
                if !storage.remove_object(&key).await {
                    hbnb_log::debug(None, format!("[Storage] {key} was not stored"));
                }
                Ok(())
            }
            Self::Db(storage) => Ok(storage.unregister(model.kind().table_name(), id).await?),
        }
    }

    /// Every stored model, or only those of `kind`.
    pub async fn all(&self, kind: Option<ModelKind>) -> Result<Vec<BaseModel>> {
        match self {
            Self::File(storage) => {
                let mut models = Vec::new();
                for (key, record) in storage.select_objects().await {
                    let class = match record.get(CLASS_KEY) {
                        Some(JsonValue::String(class)) => ModelKind::from_str(class)?,
                        _ => return Err(Error::UnknownClass(key)),
                    };
                    if kind.is_some_and(|kind| kind != class) {
                        continue;
                    }
                    models.push(BaseModel::from_map(class, &record, &StorageType::File)?);
                }
                Ok(models)
            }
            Self::Db(storage) => {
                let kinds = match kind {
                    Some(kind) => vec![kind],
                    None => ModelKind::iter().collect(),
                };
                let mut models = Vec::new();
                for kind in kinds {
                    for row in storage.select_objects(kind.table_name()).await? {
                        models.push(BaseModel::from_db_model(kind, &row)?);
                    }
                }
                Ok(models)
            }
        }
    }

    pub async fn reload(&self) -> Result<()> {
        match self {
            Self::File(storage) => Ok(storage.reload().await?),
            Self::Db(storage) => Ok(storage.reload().await?),
        }
    }

    pub async fn close(&self) -> Result<()> {
        match self {
            Self::File(storage) => Ok(storage.reload().await?),
            Self::Db(storage) => {
                storage.close().await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use hbnb_config::storage::{db::DbStorageConfig, file::FileStorageConfig};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::value::Value;

    fn file_config(dir: &TempDir) -> StorageConfig {
        let path = dir.path().join("file.json");
        StorageConfig::new(
            StorageType::File,
            Some(FileStorageConfig::new(path.to_str().unwrap())),
            None,
        )
    }

    fn db_config(dir: &TempDir) -> StorageConfig {
        let path = dir.path().join("hbnb.sqlite");
        StorageConfig::new(
            StorageType::Db,
            None,
            Some(DbStorageConfig::new(path.to_str().unwrap(), &1)),
        )
    }

    async fn open_both(dir: &TempDir) -> [Storage; 2] {
        [
            Storage::open(&file_config(dir)).await.unwrap(),
            Storage::open(&db_config(dir)).await.unwrap(),
        ]
    }

    #[tokio::test]
    async fn open_follows_configured_kind() {
        let dir = tempfile::tempdir().unwrap();
        let [file, db] = open_both(&dir).await;

        assert_eq!(file.storage_type(), StorageType::File);
        assert_eq!(db.storage_type(), StorageType::Db);
    }

    #[tokio::test]
    async fn open_db_without_section_fails() {
        let config = StorageConfig::new(StorageType::Db, None, None);
        assert!(matches!(
            Storage::open(&config).await,
            Err(Error::Storage(_))
        ));
    }

    #[tokio::test]
    async fn save_persists_and_bumps_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        for storage in open_both(&dir).await {
            let mut model = BaseModel::new(ModelKind::User);
            model.set("email", Value::from("betty@holberton.io"));
            let mut previous = *model.updated_at().unwrap();

            for _ in 0..3 {
                model.save(&storage).await.unwrap();
                let current = *model.updated_at().unwrap();
                assert!(current >= previous);
                assert!(model.created_at().unwrap() <= &current);
                previous = current;
            }

            let stored = storage.all(Some(ModelKind::User)).await.unwrap();
            assert_eq!(stored, vec![model]);
        }
    }

    #[tokio::test]
    async fn save_never_moves_updated_at_backwards() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&file_config(&dir)).await.unwrap();
        let mut model = BaseModel::new(ModelKind::State);
        let ahead = Utc::now() + Duration::hours(1);
        assert!(model.set("updated_at", Value::Timestamp(ahead)));

        model.save(&storage).await.unwrap();

        assert_eq!(model.updated_at(), Some(&ahead));
    }

    #[tokio::test]
    async fn delete_takes_effect_on_next_save() {
        let dir = tempfile::tempdir().unwrap();
        for storage in open_both(&dir).await {
            let mut kept = BaseModel::new(ModelKind::City);
            let mut gone = BaseModel::new(ModelKind::City);
            kept.save(&storage).await.unwrap();
            gone.save(&storage).await.unwrap();

            gone.delete(&storage).await.unwrap();
            storage.save().await.unwrap();

            assert_eq!(storage.all(Some(ModelKind::City)).await.unwrap(), vec![kept]);
        }
    }

    #[tokio::test]
    async fn all_filters_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        for storage in open_both(&dir).await {
            let mut state = BaseModel::new(ModelKind::State);
            let mut amenity = BaseModel::new(ModelKind::Amenity);
            state.save(&storage).await.unwrap();
            amenity.save(&storage).await.unwrap();

            assert_eq!(storage.all(None).await.unwrap().len(), 2);
            assert_eq!(
                storage.all(Some(ModelKind::Amenity)).await.unwrap(),
                vec![amenity]
            );
            assert!(storage.all(Some(ModelKind::Review)).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn saved_models_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut place = BaseModel::new(ModelKind::Place);
        place.set("name", Value::from("Loft"));
        place.set("number_rooms", Value::Integer(2));

        let mut saved = Vec::new();
        for storage in open_both(&dir).await {
            let mut copy = place.clone();
            copy.save(&storage).await.unwrap();
            storage.close().await.unwrap();
            saved.push(copy);
        }

        for (storage, expected) in open_both(&dir).await.into_iter().zip(saved) {
            assert_eq!(storage.all(None).await.unwrap(), vec![expected]);
        }
    }

    #[tokio::test]
    async fn file_storage_rejects_models_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&file_config(&dir)).await.unwrap();
        let record = match json!({ "name": "Wifi" }) {
            JsonValue::Object(record) => record,
            _ => unreachable!(),
        };
        let mut model =
            BaseModel::from_map(ModelKind::Amenity, &record, &StorageType::File).unwrap();

        let err = model.save(&storage).await.unwrap_err();

        assert!(matches!(err, Error::MissingField { ref field, .. } if field == "id"));
        assert!(model.delete(&storage).await.is_err());
    }

    #[tokio::test]
    async fn unknown_stored_class_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);
        let path = config.file().as_ref().unwrap().path().to_owned();
        std::fs::write(
            &path,
            r#"{"Booking.1": {"id": "1", "__class__": "Booking"}}"#,
        )
        .unwrap();

        let storage = Storage::open(&config).await.unwrap();

        assert!(matches!(
            storage.all(None).await,
            Err(Error::UnknownClass(name)) if name == "Booking"
        ));
    }

    #[tokio::test]
    async fn storage_failure_propagates_from_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(
            StorageType::File,
            Some(FileStorageConfig::new(
                dir.path().join("missing").join("file.json").to_str().unwrap(),
            )),
            None,
        );
        let storage = Storage::open(&config).await.unwrap();
        let mut model = BaseModel::new(ModelKind::Review);

        assert!(matches!(
            model.save(&storage).await,
            Err(Error::Storage(_))
        ));
    }
}
