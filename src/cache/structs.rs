use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based archive of parsed import batches.
///
/// Each import overwrites the batch for its kind, so the archive always
/// holds the most recent batch accepted for that kind.
pub struct Cache {
    parsed_dir: PathBuf,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let parsed_dir = cache_dir.as_ref().join("parsed");

        fs::create_dir_all(&parsed_dir).context("Failed to create parsed cache directory")?;

        Ok(Self { parsed_dir })
    }

    pub fn save_parsed<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_parsed_path(key);

        let json = serde_json::to_string_pretty(data).context("Failed to serialize batch")?;
        fs::write(&file_path, json).context("Failed to write cache file")?;

        info!("Saved parsed batch to cache: {}", file_path.display());
        Ok(())
    }

    pub fn load_parsed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_parsed_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path).context("Failed to read cache file")?;
        let data = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse JSON from {:?}", file_path))?;

        Ok(Some(data))
    }

    fn build_parsed_path(&self, key: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", key))
    }
}
