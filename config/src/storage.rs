use anyhow::{Error, Result};
use serde::Deserialize;

use self::{db::DbStorageConfig, file::FileStorageConfig};

pub mod db;
pub mod file;

#[derive(Deserialize)]
pub struct StorageConfig {
    kind: StorageType,
    file: Option<FileStorageConfig>,
    db: Option<DbStorageConfig>,
}

impl StorageConfig {
    pub fn new(
        kind: StorageType,
        file: Option<FileStorageConfig>,
        db: Option<DbStorageConfig>,
    ) -> Self {
        Self { kind, file, db }
    }

    pub fn kind(&self) -> &StorageType {
        &self.kind
    }

    pub fn file(&self) -> &Option<FileStorageConfig> {
        &self.file
    }

    pub fn db(&self) -> &Option<DbStorageConfig> {
        &self.db
    }

    pub(crate) fn set_kind(&mut self, kind: StorageType) {
        self.kind = kind;
    }
}

/// Which storage backend is active for the process.
///
/// Model construction reads this to decide whether missing identity fields
/// are synthesized during rehydration.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    File,
    Db,
}

impl StorageType {
    pub fn to_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Db => "db",
        }
    }

    pub fn from_str(str: &str) -> Result<Self> {
        match str {
            "file" => Ok(Self::File),
            "db" => Ok(Self::Db),
            _ => Err(Error::msg(format!("Unknown storage type '{str}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_type_names() {
        for kind in [StorageType::File, StorageType::Db] {
            assert_eq!(StorageType::from_str(kind.to_str()).unwrap(), kind);
        }
        assert!(StorageType::from_str("memory").is_err());
    }
}
