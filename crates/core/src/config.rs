use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub integration: IntegrationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { port: 8000 } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    /// Personal access token; requests are anonymous when unset.
    pub token: Option<String>,
    pub user_agent: String,
    /// Applies to every outbound request, including notification delivery.
    pub timeout_secs: u64,
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: concat!("reqwatch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Values advertised by the descriptor endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub base_url: Option<String>,
    pub target_url: Option<String>,
}

impl Config {
    /// Read `path` if it exists, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let file = BufReader::new(
                File::open(path)
                    .with_context(|| format!("Failed to open config file {}", path.display()))?,
            );
            serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        if let Some(base_url) = non_empty("BASE_URL") {
            self.integration.base_url = Some(base_url);
        }
        if let Some(target_url) = non_empty("TARGET_URL") {
            self.integration.target_url = Some(target_url);
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout(), Duration::from_secs(10));
        assert!(config.integration.base_url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.integration.target_url = Some("https://old.example".to_string());
        config.apply_env(|key| match key {
            "BASE_URL" => Some("https://reqwatch.example".to_string()),
            "TARGET_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.integration.base_url.as_deref(), Some("https://reqwatch.example"));
        // Empty values don't clobber the file
        assert_eq!(config.integration.target_url.as_deref(), Some("https://old.example"));
        assert!(config.github.token.is_none());
    }
}
