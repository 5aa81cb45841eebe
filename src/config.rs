use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, OptionExt, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = r#"# Credentials of your application, from https://developer.spotify.com/dashboard
client_id = ""
client_secret = ""

# Where the access and refresh tokens are stored. Run the authorization flow of
# your choice once and save the resulting credential here.
credential_file = "~/.config/spotify-web-api/credential.json"

# log_filter = "spotify_web_api=debug"
# otlp_endpoint = "http://localhost:4317"
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    credential_file: String,
    /// Overrides the Web API base url.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Overrides the accounts service token url.
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("spotify-web-api").join("config.toml"))
    }

    /// Load config from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        Self::from_file(&config_path)
    }

    /// Write a template config to the default path, unless one exists.
    /// Returns the path of the config file.
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        Self::create_default_at(&config_path)?;
        Ok(config_path)
    }

    pub fn create_default_at(path: &Path) -> Result<()> {
        if path.exists() {
            tracing::info!("Config file already exists at {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get expanded credential file path
    pub fn credential_path(&self) -> PathBuf {
        Self::expand_path(&self.credential_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
client_id = "id"
client_secret = "secret"
credential_file = "/tmp/credential.json"
api_base_url = "http://localhost:8080/v1"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.credential_path(), PathBuf::from("/tmp/credential.json"));
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.token_url, None);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(error.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_default_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default_at(&path).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(config.client_id.is_empty());
        assert!(config.credential_path().ends_with("spotify-web-api/credential.json"));
    }

    #[test]
    fn test_create_default_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        Config::create_default_at(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_expand_path() {
        let expanded = Config::expand_path("~/credential.json");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("credential.json"));
        }
        assert_eq!(
            Config::expand_path("/absolute/path.json"),
            PathBuf::from("/absolute/path.json")
        );
    }
}
