use super::LLMProvider;
use super::openai_compatible::OpenAICompatibleProvider;
use crate::core::error::{ConfigError, GaussError};
use std::collections::HashMap;
use std::fmt;

const GROQ_MODELS: &[&str] = &["gemma2-9b-it", "llama-3.1-70b-versatile", "mixtral-8x7b-32768"];
const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "o1-preview", "o1-mini"];

/// Everything a constructor needs to build a chat client
#[derive(Clone)]
pub struct ClientConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

type ProviderCreator =
    Box<dyn Fn(&ClientConfig) -> Result<Box<dyn LLMProvider>, GaussError> + Send + Sync>;

pub struct ProviderSpec {
    pub name: String,
    pub models: Vec<String>,
    pub default_base_url: String,
    /// Environment variable consulted when no key is configured
    pub env_key: Option<String>,
    creator: ProviderCreator,
}

impl ProviderSpec {
    pub fn new<F>(name: &str, models: &[&str], default_base_url: &str, creator: F) -> Self
    where
        F: Fn(&ClientConfig) -> Result<Box<dyn LLMProvider>, GaussError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
            default_base_url: default_base_url.to_string(),
            env_key: None,
            creator: Box::new(creator),
        }
    }

    pub fn openai_compatible(name: &str, models: &[&str], default_base_url: &str) -> Self {
        Self::new(name, models, default_base_url, |config: &ClientConfig| {
            let provider = OpenAICompatibleProvider::new(
                config.base_url.clone(),
                &config.api_key,
                config.model.clone(),
            )?;
            Ok(Box::new(provider) as Box<dyn LLMProvider>)
        })
    }

    pub fn with_env_key(mut self, env_key: &str) -> Self {
        self.env_key = Some(env_key.to_string());
        self
    }

    pub fn supports(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("models", &self.models)
            .field("default_base_url", &self.default_base_url)
            .finish_non_exhaustive()
    }
}

/// Static catalog of providers, their models and client constructors.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    specs: Vec<ProviderSpec>,
    base_urls: HashMap<String, String>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::empty()
            .register(
                ProviderSpec::openai_compatible(
                    "Groq",
                    GROQ_MODELS,
                    "https://api.groq.com/openai/v1",
                )
                .with_env_key("GROQ_API_KEY"),
            )
            .register(
                ProviderSpec::openai_compatible("OpenAI", OPENAI_MODELS, "https://api.openai.com/v1")
                    .with_env_key("OPENAI_API_KEY"),
            )
    }

    /// Adds a provider, replacing any existing one with the same name.
    pub fn register(mut self, spec: ProviderSpec) -> Self {
        self.specs.retain(|s| !s.name.eq_ignore_ascii_case(&spec.name));
        self.specs.push(spec);
        self
    }

    /// Points a provider at a different endpoint than its default.
    pub fn with_base_url(mut self, provider: &str, base_url: &str) -> Self {
        self.base_urls
            .insert(provider.to_lowercase(), base_url.to_string());
        self
    }

    pub fn providers(&self) -> &[ProviderSpec] {
        &self.specs
    }

    pub fn spec(&self, provider: &str) -> Result<&ProviderSpec, ConfigError> {
        self.specs
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(provider.trim()))
            .ok_or_else(|| ConfigError::UnknownProvider(provider.to_string()))
    }

    /// Checks that the pair is in the table without building anything.
    pub fn validate(&self, provider: &str, model: &str) -> Result<&ProviderSpec, ConfigError> {
        let spec = self.spec(provider)?;
        if !spec.supports(model) {
            return Err(ConfigError::UnknownModel {
                provider: spec.name.clone(),
                model: model.to_string(),
            });
        }
        Ok(spec)
    }

    pub fn resolve(
        &self,
        provider: &str,
        model: &str,
        credential: &str,
    ) -> Result<Box<dyn LLMProvider>, GaussError> {
        let spec = self.validate(provider, model)?;
        if credential.trim().is_empty() {
            return Err(ConfigError::MissingCredential(spec.name.clone()).into());
        }

        let base_url = self
            .base_urls
            .get(&spec.name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| spec.default_base_url.clone());
        let config = ClientConfig {
            model: model.to_string(),
            api_key: credential.trim().to_string(),
            base_url,
        };

        tracing::debug!(provider = %spec.name, ?config, "Resolving chat client");
        (spec.creator)(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_providers_in_registration_order() {
        let registry = ProviderRegistry::builtin();
        let names: Vec<_> = registry.providers().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Groq", "OpenAI"]);
        assert_eq!(registry.spec("openai").unwrap().default_model(), Some("gpt-4o-mini"));
    }

    #[test]
    fn client_config_debug_hides_the_key() {
        let config = ClientConfig {
            model: "gpt-4o".to_string(),
            api_key: "sk-secret".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        };
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
