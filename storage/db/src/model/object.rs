use sqlx::{
    types::chrono::{DateTime, Utc},
    FromRow,
};

/// A row of any entity table. Open-record attributes travel as JSON text.
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct ObjectModel {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attributes: String,
}

impl ObjectModel {
    pub fn new(
        id: &str,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        attributes: &str,
    ) -> Self {
        Self {
            id: id.to_owned(),
            created_at: *created_at,
            updated_at: *updated_at,
            attributes: attributes.to_owned(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn attributes(&self) -> &str {
        &self.attributes
    }
}
