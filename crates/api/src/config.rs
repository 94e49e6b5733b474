use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub entrez: EntrezConfig,
    pub tagger: TaggerConfig,
    pub vocabulary: VocabularyConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrezConfig {
    pub base_url: String,
    pub database: String,
    pub retmax: u32,
    /// Bounds the esearch + efetch exchange. 0 disables the deadline.
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            entrez: EntrezConfig::default(),
            tagger: TaggerConfig::default(),
            vocabulary: VocabularyConfig::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl Default for EntrezConfig {
    fn default() -> Self {
        Self {
            base_url: ingest::entrez::DEFAULT_BASE_URL.to_string(),
            database: ingest::entrez::DEFAULT_DATABASE.to_string(),
            retmax: ingest::entrez::DEFAULT_RETMAX,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Trait_dictionary.txt"),
        }
    }
}

/// Where the base configuration came from, reported once logging is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File => f.write_str("file"),
            ConfigSource::Defaults => f.write_str("defaults (config file not found)"),
        }
    }
}

impl AppConfig {
    /// Reads TOML from `path` if it exists, otherwise starts from defaults.
    /// Environment overrides are applied on top and the result validated.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {:?}", path))?;
            let config = Self::from_toml(&raw)
                .with_context(|| format!("Failed to parse config file {:?}", path))?;
            (config, ConfigSource::File)
        } else {
            (Self::default(), ConfigSource::Defaults)
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, source))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("TRAIT_NER_BIND") {
            self.server.bind = bind;
        }
        if let Some(path) = var("TRAIT_NER_VOCABULARY") {
            self.vocabulary.path = PathBuf::from(path);
        }
        if let Some(url) = var("TRAIT_NER_TAGGER_URL") {
            self.tagger.base_url = url;
        }
        if let Some(key) = var("NCBI_API_KEY") {
            self.entrez.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must be non-empty");
        }
        if self.entrez.base_url.trim().is_empty() {
            anyhow::bail!("entrez.base_url must be non-empty");
        }
        if self.entrez.retmax == 0 {
            anyhow::bail!("entrez.retmax must be greater than zero");
        }
        if self.tagger.enabled && self.tagger.base_url.trim().is_empty() {
            anyhow::bail!("tagger.base_url must be non-empty when the tagger is enabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_format = "json"

            [entrez]
            retmax = 1

            [tagger]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.entrez.retmax, 1);
        assert_eq!(config.entrez.database, "pubmed");
        assert!(!config.tagger.enabled);
        assert_eq!(config.server.bind, "0.0.0.0:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "TRAIT_NER_BIND" => Some("127.0.0.1:9000".to_string()),
            "TRAIT_NER_VOCABULARY" => Some("/data/traits.txt".to_string()),
            _ => None,
        });

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.vocabulary.path, PathBuf::from("/data/traits.txt"));
        assert_eq!(config.tagger.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.entrez.retmax = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.tagger.enabled);
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[test]
    fn test_existing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[entrez]\nretmax = 5\n").unwrap();

        let (config, source) = AppConfig::load(&path).unwrap();
        assert_eq!(config.entrez.retmax, 5);
        assert_eq!(source, ConfigSource::File);
    }
}
