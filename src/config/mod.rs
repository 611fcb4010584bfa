use crate::core::error::{ConfigError, GaussError};
use crate::document::LoaderSettings;
use crate::providers::{ProviderRegistry, ProviderSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

fn default_caption_languages() -> Vec<String> {
    vec!["en".to_string()]
}

#[derive(Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub active_provider: Option<String>,
    pub active_model: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_caption_languages")]
    pub caption_languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_provider: None,
            active_model: None,
            providers: HashMap::new(),
            caption_languages: default_caption_languages(),
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gauss")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn input_history_path() -> PathBuf {
        Self::config_dir().join("input_history.txt")
    }

    /// Loads `~/.gauss/config.yaml`, writing a default one on first run.
    pub fn load() -> Result<Config, GaussError> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Config::default();
        if let Err(e) = config.save_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Could not write default config");
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config, GaussError> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str::<Config>(&contents).map_err(|e| {
            ConfigError::Invalid(format!("Parse {}: {}", path.display(), e)).into()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GaussError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(provider))
            .map(|(_, config)| config)
    }

    /// Configured key for the provider, falling back to its environment variable.
    pub fn credential_for(&self, spec: &ProviderSpec) -> Option<String> {
        self.provider_config(&spec.name)
            .and_then(|c| c.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                spec.env_key
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|key| !key.trim().is_empty())
            })
    }

    /// Applies per-provider endpoint overrides to the registry.
    pub fn apply_base_urls(&self, mut registry: ProviderRegistry) -> ProviderRegistry {
        for (name, provider) in &self.providers {
            if let Some(base_url) = &provider.base_url {
                registry = registry.with_base_url(name, base_url);
            }
        }
        registry
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            caption_languages: self.caption_languages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_yaml_with_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "active_provider: groq\nproviders:\n  Groq:\n    api_key: gsk-test\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.active_provider.as_deref(), Some("groq"));
        assert_eq!(config.caption_languages, ["en"]);
        let groq = ProviderRegistry::builtin();
        let spec = groq.spec("groq").unwrap();
        assert_eq!(config.credential_for(spec).as_deref(), Some("gsk-test"));
    }

    #[test]
    fn save_then_load_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            active_model: Some("gpt-4o".to_string()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();

        assert_eq!(
            Config::load_from(&path).unwrap().active_model.as_deref(),
            Some("gpt-4o")
        );
    }

    #[test]
    fn debug_output_hides_api_keys() {
        let provider = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            base_url: None,
        };
        assert!(!format!("{:?}", provider).contains("sk-secret"));
    }
}
