use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_selector_cache_ttl_secs")]
    pub selector_cache_ttl_secs: u64,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialClientConfig {
    api_base_url: Option<String>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
    selector_cache_ttl_secs: Option<u64>,
    log_dir: Option<String>,
}

impl PartialClientConfig {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Fields in `self` win over fields in `lower`.
    fn over(self, lower: PartialClientConfig) -> PartialClientConfig {
        PartialClientConfig {
            api_base_url: self.api_base_url.or(lower.api_base_url),
            api_token: self.api_token.or(lower.api_token),
            request_timeout_secs: self.request_timeout_secs.or(lower.request_timeout_secs),
            selector_cache_ttl_secs: self.selector_cache_ttl_secs.or(lower.selector_cache_ttl_secs),
            log_dir: self.log_dir.or(lower.log_dir),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_selector_cache_ttl_secs() -> u64 {
    30
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ClientConfig {
    /// Loads the config file (optional), then lets environment variables
    /// (`API_BASE_URL`, `API_TOKEN`, ...) override it.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let env_config: PartialClientConfig = envy::from_env()?;
        Self::layered(config_path.map(Path::new), env_config)
    }

    fn layered(config_path: Option<&Path>, env_config: PartialClientConfig) -> Result<Self, ConfigError> {
        let file_config = match config_path {
            Some(path) => PartialClientConfig::from_file(path)?,
            None => PartialClientConfig::default(),
        };

        let merged = env_config.over(file_config);

        Ok(ClientConfig {
            api_base_url: merged
                .api_base_url
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::Missing("API_BASE_URL"))?,
            api_token: merged.api_token.filter(|t| !t.is_empty()),
            request_timeout_secs: merged
                .request_timeout_secs
                .unwrap_or_else(default_request_timeout_secs),
            selector_cache_ttl_secs: merged
                .selector_cache_ttl_secs
                .unwrap_or_else(default_selector_cache_ttl_secs),
            log_dir: merged.log_dir.unwrap_or_else(default_log_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_and_defaults() {
        let file = write_config("api_base_url = \"https://api.example.com\"\nrequest_timeout_secs = 5\n");
        let config = ClientConfig::layered(Some(file.path()), PartialClientConfig::default()).unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.selector_cache_ttl_secs, 30);
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("api_base_url = \"https://file.example.com\"\napi_token = \"file-token\"\n");
        let env = PartialClientConfig {
            api_token: Some("env-token".to_string()),
            selector_cache_ttl_secs: Some(5),
            ..Default::default()
        };
        let config = ClientConfig::layered(Some(file.path()), env).unwrap();

        assert_eq!(config.api_base_url, "https://file.example.com");
        assert_eq!(config.api_token.as_deref(), Some("env-token"));
        assert_eq!(config.selector_cache_ttl_secs, 5);
    }

    #[test]
    fn test_missing_base_url_and_bad_toml() {
        let missing = ClientConfig::layered(None, PartialClientConfig::default());
        assert!(matches!(missing, Err(ConfigError::Missing("API_BASE_URL"))));

        let file = write_config("api_base_url = ");
        let parsed = ClientConfig::layered(Some(file.path()), PartialClientConfig::default());
        assert!(matches!(parsed, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let env = PartialClientConfig {
            api_base_url: Some("http://localhost:3000/api".to_string()),
            ..Default::default()
        };
        let config = ClientConfig::layered(Some(Path::new("/nonexistent/monitorctl.toml")), env).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
    }
}
