use std::fmt::{self, Display};

use ahash::{HashMap, HashMapExt};
use chrono::{DateTime, Utc};
use hbnb_config::StorageType;
use hbnb_error::{Error, Result};
use hbnb_storage_db::model::object::ObjectModel;
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{kind::ModelKind, storage::Storage, util::conversion, value::Value};

pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";
pub const CLASS_KEY: &str = "__class__";

/// Identity, timestamps and open attributes shared by every model class.
///
/// A model built with [`BaseModel::new`] always has all three identity
/// fields. One rehydrated with [`BaseModel::from_map`] in file mode only has
/// the ones its input carried.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseModel {
    kind: ModelKind,
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    attributes: HashMap<String, Value>,
}

impl BaseModel {
    pub fn new(kind: ModelKind) -> Self {
        let now = Utc::now();
        Self {
            kind,
            id: Some(Self::generate_id()),
            created_at: Some(now),
            updated_at: Some(now),
            attributes: HashMap::new(),
        }
    }

    /// Rebuilds a model from a serialized mapping, such as one produced by
    /// [`BaseModel::to_dict`].
    ///
    /// An empty mapping builds a fresh model. `__class__` is skipped, the
    /// timestamp fields are parsed and anything else is kept verbatim. In
    /// [`StorageType::Db`] mode, identity fields absent from `map` are
    /// generated.
    pub fn from_map(
        kind: ModelKind,
        map: &Map<String, JsonValue>,
        storage_type: &StorageType,
    ) -> Result<Self> {
        if map.is_empty() {
            return Ok(Self::new(kind));
        }

        let mut model = Self {
            kind,
            id: None,
            created_at: None,
            updated_at: None,
            attributes: HashMap::with_capacity(map.len()),
        };

        for (key, value) in map {
            match key.as_str() {
                CLASS_KEY => {}
                CREATED_AT_KEY => model.created_at = Some(conversion::parse_timestamp(key, value)?),
                UPDATED_AT_KEY => model.updated_at = Some(conversion::parse_timestamp(key, value)?),
                ID_KEY => {
                    model.id = Some(match value {
                        JsonValue::String(id) => id.clone(),
                        other => other.to_string(),
                    })
                }
                _ => {
                    model.attributes.insert(key.clone(), Value::from_json(value));
                }
            }
        }

        if *storage_type == StorageType::Db {
            let now = Utc::now();
            if !map.contains_key(ID_KEY) {
                model.id = Some(Self::generate_id());
            }
            if !map.contains_key(UPDATED_AT_KEY) {
                model.updated_at = Some(match model.created_at {
                    Some(created_at) => created_at.max(now),
                    None => now,
                });
            }
            if !map.contains_key(CREATED_AT_KEY) {
                model.created_at = Some(match model.updated_at {
                    Some(updated_at) => updated_at.min(now),
                    None => now,
                });
            }
        }

        Ok(model)
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.to_str()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn created_at(&self) -> Option<&DateTime<Utc>> {
        self.created_at.as_ref()
    }

    pub fn updated_at(&self) -> Option<&DateTime<Utc>> {
        self.updated_at.as_ref()
    }

    /// Open attributes only; identity fields have their own accessors.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Assigns an attribute, returning whether it was accepted.
    ///
    /// `id` and `created_at` can only be filled in while unset, and neither
    /// timestamp may leave `created_at` after `updated_at`. `__class__` is
    /// never stored. Doubles JSON cannot carry (NaN, infinities) are refused.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match (key, value) {
            (CLASS_KEY, _) => false,
            (_, Value::Double(value)) if !value.is_finite() => false,
            (ID_KEY, Value::String(id)) if self.id.is_none() => {
                self.id = Some(id);
                true
            }
            (CREATED_AT_KEY, Value::Timestamp(timestamp))
                if self.created_at.is_none()
                    && self.updated_at.map_or(true, |updated_at| timestamp <= updated_at) =>
            {
                self.created_at = Some(timestamp);
                true
            }
            (UPDATED_AT_KEY, Value::Timestamp(timestamp))
                if self.created_at.map_or(true, |created_at| created_at <= timestamp) =>
            {
                self.updated_at = Some(timestamp);
                true
            }
            (ID_KEY | CREATED_AT_KEY | UPDATED_AT_KEY, _) => false,
            (key, value) => {
                self.attributes.insert(key.to_owned(), value);
                true
            }
        }
    }

    /// Serialized form: primitives only, timestamps as ISO-8601 text, plus
    /// the `__class__` marker.
    pub fn to_dict(&self) -> Map<String, JsonValue> {
        let mut dict = Map::new();
        if let Some(id) = &self.id {
            dict.insert(ID_KEY.to_owned(), JsonValue::String(id.clone()));
        }
        if let Some(created_at) = &self.created_at {
            dict.insert(
                CREATED_AT_KEY.to_owned(),
                JsonValue::String(conversion::timestamp_to_iso(created_at)),
            );
        }
        if let Some(updated_at) = &self.updated_at {
            dict.insert(
                UPDATED_AT_KEY.to_owned(),
                JsonValue::String(conversion::timestamp_to_iso(updated_at)),
            );
        }
        for (key, value) in &self.attributes {
            dict.insert(key.clone(), value.to_json());
        }
        dict.insert(
            CLASS_KEY.to_owned(),
            JsonValue::String(self.class_name().to_owned()),
        );
        dict
    }

    /// Bumps `updated_at`, registers the model and flushes the storage.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub async fn save(&mut self, storage: &Storage) -> Result<()> {
        let now = Utc::now();
        let floor = self.updated_at.into_iter().chain(self.created_at).max();
        self.updated_at = Some(match floor {
            Some(floor) => floor.max(now),
            None => now,
        });

        storage.register(self).await?;
        storage.save().await
    }

    pub async fn delete(&self, storage: &Storage) -> Result<()> {
        storage.delete(self).await
    }

    pub(crate) fn required_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| self.missing_field(ID_KEY))
    }

    pub(crate) fn to_db_model(&self) -> Result<ObjectModel> {
        let id = self.required_id()?;
        let created_at = self
            .created_at
            .as_ref()
            .ok_or_else(|| self.missing_field(CREATED_AT_KEY))?;
        let updated_at = self
            .updated_at
            .as_ref()
            .ok_or_else(|| self.missing_field(UPDATED_AT_KEY))?;

        let attributes = self
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<Map<_, _>>();
        let attributes = serde_json::to_string(&attributes).map_err(anyhow::Error::from)?;

        Ok(ObjectModel::new(id, created_at, updated_at, &attributes))
    }

    pub(crate) fn from_db_model(kind: ModelKind, model: &ObjectModel) -> Result<Self> {
        let attributes = serde_json::from_str::<Map<String, JsonValue>>(model.attributes())
            .map_err(anyhow::Error::from)?;

        Ok(Self {
            kind,
            id: Some(model.id().to_owned()),
            created_at: Some(*model.created_at()),
            updated_at: Some(*model.updated_at()),
            attributes: attributes
                .iter()
                .map(|(key, value)| (key.clone(), Value::from_json(value)))
                .collect(),
        })
    }

    fn missing_field(&self, field: &str) -> Error {
        Error::MissingField {
            class: self.class_name().to_owned(),
            field: field.to_owned(),
        }
    }

    fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

impl Display for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{",
            self.class_name(),
            self.id.as_deref().unwrap_or("None")
        )?;

        let mut fields = Vec::with_capacity(self.attributes.len() + 3);
        if let Some(id) = &self.id {
            fields.push((ID_KEY, Value::String(id.clone())));
        }
        if let Some(created_at) = self.created_at {
            fields.push((CREATED_AT_KEY, Value::Timestamp(created_at)));
        }
        if let Some(updated_at) = self.updated_at {
            fields.push((UPDATED_AT_KEY, Value::Timestamp(updated_at)));
        }
        let mut keys = self.attributes.keys().collect::<Vec<_>>();
        keys.sort();
        for key in keys {
            fields.push((key.as_str(), self.attributes[key].clone()));
        }

        for (idx, (key, value)) in fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key:?}: {value}")?;
        }
        write!(f, "}}")
    }
}
