//! Durable client-side shadow copy of the site document

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::site::SiteConfiguration;

/// Fixed key the document is cached under
pub const CACHE_KEY: &str = "siteState";

/// Last-known-good copy of the document on the client device.
///
/// Reads never fail: a missing or undecodable entry is `None`. Writes are
/// best-effort and swallow their errors.
pub trait LocalCache: Send {
    fn read(&self) -> Option<SiteConfiguration>;
    fn write(&self, config: &SiteConfiguration);
}

/// JSON file cache: one file named after [`CACHE_KEY`]
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file inside a directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{CACHE_KEY}.json")))
    }

    /// Cache in the platform data directory, falling back to the working
    /// directory when none can be determined
    pub fn default_location() -> Self {
        match ProjectDirs::from("com", "sitedash", "Sitedash") {
            Some(dirs) => Self::in_dir(dirs.data_dir()),
            None => Self::in_dir(Path::new(".")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_write(&self, config: &SiteConfiguration) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn read(&self) -> Option<SiteConfiguration> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn write(&self, config: &SiteConfiguration) {
        if let Err(e) = self.try_write(config) {
            tracing::warn!("Failed to write cache {}: {}", self.path.display(), e);
        }
    }
}
