use serde::Deserialize;

#[derive(Deserialize)]
pub struct DbStorageConfig {
    path: String,
    max_connections: u32,
}

impl DbStorageConfig {
    pub fn new(path: &str, max_connections: &u32) -> Self {
        Self {
            path: path.to_owned(),
            max_connections: *max_connections,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn max_connections(&self) -> &u32 {
        &self.max_connections
    }
}
