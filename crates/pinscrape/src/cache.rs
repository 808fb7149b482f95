//! Line-oriented file cache for pre-computed result sets.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes and reads URL lists as one-URL-per-line text files.
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The default cache directory, `~/.pinscrape/cache`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".pinscrape")
            .join("cache")
    }

    /// Write `urls` to `name`, one per line. Returns the file path.
    pub fn write(&self, name: &str, urls: &[String]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating cache dir {}", self.dir.display()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, urls.join("\n"))
            .with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {} URLs to {}", urls.len(), path.display());
        Ok(path)
    }

    /// Read the URL list from `name`, skipping blank lines.
    ///
    /// A missing file is not an error; it reads as an empty list.
    pub fn read(&self, name: &str) -> Result<Vec<String>> {
        let path = self.dir.join(name);
        if !path.exists() {
            warn!("cache file {} not found", path.display());
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
