//! Application configuration management

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Image upload settings
    pub upload: UploadConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Credentials for the third-party image host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Sidebar width
    pub sidebar_width: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 15,
            upload: UploadConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            sidebar_width: 240.0,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "sitedash", "Sitedash")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SITEDASH_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(name) = var("SITEDASH_CLOUDINARY_CLOUD_NAME") {
            self.upload.cloud_name = Some(name);
        }
        if let Some(preset) = var("SITEDASH_CLOUDINARY_UPLOAD_PRESET") {
            self.upload.upload_preset = Some(preset);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Server root: the API base without its `/api` suffix
    pub fn site_root(&self) -> &str {
        let base = self.api_base_url.trim_end_matches('/');
        base.strip_suffix("/api").unwrap_or(base)
    }

    /// URL of the server-rendered public page
    pub fn public_page_url(&self) -> String {
        format!("{}/site", self.site_root())
    }
}

/// Deployment mode of the API server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// SQLite database file
    pub database: PathBuf,
    /// The single origin allowed to call the API from a browser
    pub allowed_origin: String,
    pub environment: Environment,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 5000;
    pub const DEFAULT_ALLOWED_ORIGIN: &'static str = "http://localhost:5173";

    /// Database file in the platform data directory
    pub fn default_database() -> PathBuf {
        ProjectDirs::from("com", "sitedash", "Sitedash")
            .map(|dirs| dirs.data_dir().join("sitedash.db"))
            .unwrap_or_else(|| PathBuf::from("sitedash.db"))
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Whether error details may be returned to callers
    pub fn expose_errors(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert!(config.upload.cloud_name.is_none());

        let server = ServerConfig {
            port: ServerConfig::DEFAULT_PORT,
            database: ServerConfig::default_database(),
            allowed_origin: ServerConfig::DEFAULT_ALLOWED_ORIGIN.to_string(),
            environment: Environment::default(),
        };
        assert_eq!(server.listen_addr().port(), 5000);
        assert!(server.database.ends_with("sitedash.db"));
        assert!(!server.expose_errors());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SITEDASH_API_BASE_URL", "https://cms.example.org/api"),
            ("SITEDASH_CLOUDINARY_CLOUD_NAME", "demo"),
            ("SITEDASH_CLOUDINARY_UPLOAD_PRESET", "unsigned"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, "https://cms.example.org/api");
        assert_eq!(config.upload.cloud_name.as_deref(), Some("demo"));
        assert_eq!(config.upload.upload_preset.as_deref(), Some("unsigned"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api_base_url":"http://10.0.0.2:5000/api"}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.ui.theme, "light");
    }

    #[test]
    fn test_public_page_url() {
        let mut config = AppConfig::default();
        assert_eq!(config.public_page_url(), "http://localhost:5000/site");

        config.api_base_url = "https://cms.example.org/api/".to_string();
        assert_eq!(config.site_root(), "https://cms.example.org");
        assert_eq!(config.public_page_url(), "https://cms.example.org/site");
    }
}
