//! JSON-file collection store
//!
//! One pretty-printed `<name>.json` document per collection under a data
//! directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use super::CollectionStore;
use crate::error::StorageResult;

const EXTENSION: &str = "json";

/// Collection store backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub async fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        info!("File store using data directory {}", data_dir.display());
        Ok(Self { data_dir })
    }

    /// Directory holding the collection files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{EXTENSION}"))
    }
}

#[async_trait]
impl CollectionStore for FileStore {
    async fn read(&self, name: &str) -> StorageResult<Option<Value>> {
        match fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Collection {} not found, treating as empty", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, data: &Value) -> StorageResult<()> {
        let path = self.path_for(name);
        let tmp_path = self.data_dir.join(format!("{name}.{EXTENSION}.tmp"));

        // Replace via rename so a reader never sees a half-written document.
        let bytes = serde_json::to_vec_pretty(data)?;
        fs::write(&tmp_path, bytes).await?;
        fs::rename(&tmp_path, &path).await?;

        debug!("Wrote collection {}", name);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}
