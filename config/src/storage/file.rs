use serde::Deserialize;

#[derive(Deserialize)]
pub struct FileStorageConfig {
    path: String,
}

impl FileStorageConfig {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
