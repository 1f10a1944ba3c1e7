// src/core/config_manager.rs
//! Configuration: optional config.yaml plus environment overrides

use super::service_client::DEFAULT_TIMEOUT_SECS;
use crate::skill_analysis::{AnalysisSettings, SkillNormalizer};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigManager {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub content: ContentConfig,
    pub analysis: AnalysisSettings,
    /// Applies to every search and CMS request.
    pub request_timeout_seconds: u64,
    pub synonyms_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub index_name: String,
    /// Algolia filter expression limiting the corpus to active postings.
    pub filters: Option<String>,
    /// Overrides the `{app_id}-dsn.algolia.net` host.
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub api_key: Option<String>,
    pub delivery_token: Option<String>,
    pub environment: String,
    pub host: String,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            content: ContentConfig::default(),
            analysis: AnalysisSettings::default(),
            request_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            synonyms_path: None,
            log_file: None,
            source: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            api_key: None,
            index_name: "jobs".to_string(),
            filters: None,
            host: None,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            delivery_token: None,
            environment: "production".to_string(),
            host: "https://cdn.contentstack.io".to_string(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SearchConfig {
    /// `(app_id, api_key)` when both are set and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((present(&self.app_id)?, present(&self.api_key)?))
    }
}

impl ContentConfig {
    /// `(api_key, delivery_token)` when both are set and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((present(&self.api_key)?, present(&self.delivery_token)?))
    }
}

impl ConfigManager {
    /// Load `config.yaml` (or `$JOBSCOUT_CONFIG`) when present, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("JOBSCOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Report where the settings came from. Called once logging is up.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No configuration file found, using defaults"),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, usually the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key) {
                *target = Some(value);
            }
        };
        set(&mut self.search.app_id, "ALGOLIA_APP_ID");
        set(&mut self.search.api_key, "ALGOLIA_SEARCH_API_KEY");
        set(&mut self.search.filters, "ALGOLIA_FILTERS");
        set(&mut self.search.host, "ALGOLIA_HOST");
        set(&mut self.content.api_key, "CONTENTSTACK_API_KEY");
        set(&mut self.content.delivery_token, "CONTENTSTACK_DELIVERY_TOKEN");

        if let Some(index) = lookup("ALGOLIA_INDEX_NAME") {
            self.search.index_name = index;
        }
        if let Some(environment) = lookup("CONTENTSTACK_ENVIRONMENT") {
            self.content.environment = environment;
        }
        if let Some(host) = lookup("CONTENTSTACK_HOST") {
            self.content.host = host;
        }
        if let Some(port) = lookup("ROCKET_PORT") {
            self.server.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Some(timeout) = lookup("JOBSCOUT_REQUEST_TIMEOUT") {
            self.request_timeout_seconds = timeout
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("JOBSCOUT_REQUEST_TIMEOUT must be a number of seconds"))?;
        }
        if let Some(path) = lookup("JOBSCOUT_SYNONYMS") {
            self.synonyms_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("JOBSCOUT_LOG_FILE") {
            self.log_file = Some(PathBuf::from(path));
        }

        Ok(self)
    }

    /// Skill normalizer from the configured synonym file, or the built-in table.
    pub fn normalizer(&self) -> Result<SkillNormalizer> {
        match &self.synonyms_path {
            Some(path) => SkillNormalizer::from_toml_file(path),
            None => Ok(SkillNormalizer::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConfigManager::default();
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.search.index_name, "jobs");
        assert_eq!(config.analysis.corpus_limit, 1000);
        assert!(config.search.credentials().is_none());
        assert!(config.content.credentials().is_none());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ConfigManager::from_yaml(
            r#"
server:
  port: 9100
search:
  app_id: APP
  api_key: KEY
  filters: "status:active"
analysis:
  reported_skills: 5
  thresholds:
    high: 40
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.search.credentials(), Some(("APP", "KEY")));
        assert_eq!(config.search.index_name, "jobs");
        assert_eq!(config.analysis.reported_skills, 5);
        assert_eq!(config.analysis.scanned_skills, 50);
        assert_eq!(config.analysis.thresholds.high, 40);
        assert_eq!(config.analysis.thresholds.medium, 15);
    }

    #[test]
    fn test_from_file_records_source() {
        let path = std::env::temp_dir().join(format!("jobscout-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "server:\n  port: 9200\n").unwrap();

        let config = ConfigManager::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert!(ConfigManager::default().source.is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ConfigManager::from_yaml("  \n").unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ALGOLIA_APP_ID", "APP"),
            ("ALGOLIA_SEARCH_API_KEY", "KEY"),
            ("ALGOLIA_INDEX_NAME", "jobs_prod"),
            ("CONTENTSTACK_API_KEY", "blt"),
            ("CONTENTSTACK_DELIVERY_TOKEN", "cs"),
            ("ROCKET_PORT", "8123"),
            ("JOBSCOUT_REQUEST_TIMEOUT", "3"),
        ]
        .into_iter()
        .collect();

        let config = ConfigManager::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.search.credentials(), Some(("APP", "KEY")));
        assert_eq!(config.search.index_name, "jobs_prod");
        assert_eq!(config.content.credentials(), Some(("blt", "cs")));
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.request_timeout_seconds, 3);
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let config = ConfigManager::default()
            .with_env_overrides(|key| match key {
                "ALGOLIA_APP_ID" => Some("APP".to_string()),
                "ALGOLIA_SEARCH_API_KEY" => Some("   ".to_string()),
                _ => None,
            })
            .unwrap();
        assert!(config.search.credentials().is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = ConfigManager::default().with_env_overrides(|key| {
            (key == "ROCKET_PORT").then(|| "eighty".to_string())
        });
        assert!(result.is_err());
    }
}
