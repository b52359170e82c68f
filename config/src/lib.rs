use std::fs::File;

use anyhow::{Context, Result};
use serde::Deserialize;

use self::{log::LogConfig, storage::StorageConfig};

pub mod log;
pub mod storage;

pub use storage::StorageType;

pub const STORAGE_TYPE_ENV: &str = "HBNB_TYPE_STORAGE";

#[derive(Deserialize)]
pub struct Config {
    log: LogConfig,
    storage: StorageConfig,
}

impl Config {
    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(kind) = std::env::var(STORAGE_TYPE_ENV) {
            self.storage.set_kind(StorageType::from_str(&kind)?);
        }
        Ok(self)
    }
}

pub fn from_path(path: &str) -> Result<Config> {
    let file = File::open(path).with_context(|| format!("Failed to open config file '{path}'"))?;
    serde_yaml::from_reader::<_, Config>(file)
        .with_context(|| format!("Failed to parse config file '{path}'"))?
        .apply_env()
}
