use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::game::ValidityPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_wiki_api_url")]
    pub wiki_api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Pause between page fetches within one category crawl.
    #[serde(default = "default_fetch_delay")]
    pub fetch_delay_ms: u64,

    #[serde(default = "default_max_concurrent_categories")]
    pub max_concurrent_categories: usize,

    /// Keep player characters (Vault Dweller, Courier, ...) out of the
    /// daily draw.
    #[serde(default)]
    pub exclude_protagonists: bool,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("falloutdle");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("characters.db").to_string_lossy().to_string()
}

fn default_wiki_api_url() -> String {
    "https://fallout.fandom.com/api.php".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_fetch_delay() -> u64 {
    100
}

fn default_max_concurrent_categories() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            wiki_api_url: default_wiki_api_url(),
            request_timeout_secs: default_request_timeout(),
            fetch_delay_ms: default_fetch_delay(),
            max_concurrent_categories: default_max_concurrent_categories(),
            exclude_protagonists: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("falloutdle")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.wiki_api_url)
            .map_err(|e| AppError::Config(format!("wiki_api_url {:?}: {}", self.wiki_api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "wiki_api_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn validity_policy(&self) -> ValidityPolicy {
        ValidityPolicy::new(self.exclude_protagonists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.wiki_api_url, "https://fallout.fandom.com/api.php");
        assert_eq!(config.fetch_delay(), Duration::from_millis(100));
        assert!(!config.exclude_protagonists);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "db_path = \"/tmp/x.db\"\nexclude_protagonists = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.max_concurrent_categories, 4);
        assert!(config.validity_policy().exclude_protagonists);
    }

    #[test]
    fn test_rejects_bad_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "wiki_api_url = \"fallout.fandom.com\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fetch_delay_ms = \"soon\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Toml(_))));
    }
}
