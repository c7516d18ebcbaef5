//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Anthropic Messages API
    Anthropic,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAI => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "dolphin-llama3:8b",
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-sonnet-latest",
        }
    }

    /// Whether requests must carry an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

/// Configuration for LLM client.
///
/// Deserialized through [`LlmConfigFile`] so that a missing endpoint or
/// model falls back to the chosen provider's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LlmConfigFile")]
pub struct LlmConfig {
    /// Whether AI summarization and tagging are enabled
    pub enabled: bool,
    /// LLM provider (ollama, openai or anthropic)
    pub provider: LlmProvider,
    /// API endpoint
    pub endpoint: String,
    /// API key for hosted providers
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model to use for summarization and tagging
    pub model: String,
    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
    /// HTTP timeout for a single request, in seconds
    pub timeout_secs: u64,
}

/// `[llm]` section as written in a config file.
#[derive(Deserialize)]
struct LlmConfigFile {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    provider: LlmProvider,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl From<LlmConfigFile> for LlmConfig {
    fn from(file: LlmConfigFile) -> Self {
        let provider = file.provider;
        Self {
            enabled: file.enabled,
            provider,
            endpoint: file
                .endpoint
                .unwrap_or_else(|| provider.default_endpoint().to_string()),
            api_key: file.api_key,
            model: file
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            temperature: file.temperature,
            timeout_secs: file.timeout_secs,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    300
}

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai";

/// Hosted API keys probed when no provider is named, in priority order.
static PROVIDER_KEYS: [(&str, LlmProvider, &str); 3] = [
    ("ANTHROPIC_API_KEY", LlmProvider::Anthropic, "anthropic"),
    ("GROQ_API_KEY", LlmProvider::OpenAI, "groq"),
    ("OPENAI_API_KEY", LlmProvider::OpenAI, "openai"),
];

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides.
    fn base_default() -> Self {
        Self::for_provider(LlmProvider::default())
    }

    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::base_default()
    }

    /// Configuration for a specific provider with its default endpoint and model.
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self {
            enabled: default_enabled(),
            provider,
            endpoint: provider.default_endpoint().to_string(),
            api_key: None,
            model: provider.default_model().to_string(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true" or "false"
    /// - `LLM_PROVIDER`: "ollama" (default), "openai", "groq", "together" or "anthropic"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for hosted providers
    /// - `LLM_MODEL`: Model name
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_TIMEOUT_SECS`: Per-request HTTP timeout
    ///
    /// Without `LLM_PROVIDER` and without a key, the provider is
    /// auto-detected from `ANTHROPIC_API_KEY`, `GROQ_API_KEY` and
    /// `OPENAI_API_KEY`, preferring a key for the configured provider.
    pub fn with_env_overrides(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(val) = var("LLM_API_KEY") {
            self.api_key = Some(val);
        }

        if let Some(name) = var("LLM_PROVIDER") {
            if let Some(provider) = LlmProvider::from_str(&name) {
                self.switch_provider(provider, provider_endpoint(&name, provider));
                if self.api_key.is_none() {
                    self.api_key = provider_key_var(&name).and_then(&var);
                }
            } else {
                tracing::warn!("Ignoring unknown LLM_PROVIDER '{}'", name);
            }
        } else if self.api_key.is_none() {
            // Keys for the configured service come first
            let current = PROVIDER_KEYS.iter().filter(|(_, provider, name)| {
                *provider == self.provider && provider_endpoint(name, *provider) == self.endpoint
            });
            let same_api = PROVIDER_KEYS
                .iter()
                .filter(|(_, provider, _)| *provider == self.provider);
            let found = current
                .chain(same_api)
                .chain(PROVIDER_KEYS.iter())
                .find_map(|(key_var, provider, name)| {
                    var(*key_var).map(|key| (key, *provider, *name))
                });
            if let Some((key, provider, name)) = found {
                self.switch_provider(provider, provider_endpoint(name, provider));
                self.api_key = Some(key);
            }
        }

        if let Some(endpoint) = var("LLM_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.model = model;
        }
        if let Some(t) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        if let Some(n) = var("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        self
    }

    /// Move to `provider`, keeping configured endpoint and model when the
    /// provider is unchanged.
    fn switch_provider(&mut self, provider: LlmProvider, endpoint: &str) {
        if self.provider != provider {
            self.provider = provider;
            self.endpoint = endpoint.to_string();
            self.model = provider.default_model().to_string();
        } else if self.endpoint != endpoint && is_stock_endpoint(&self.endpoint) {
            // Same API, different hosted service (OpenAI and Groq)
            self.endpoint = endpoint.to_string();
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Human-readable reason the configured provider cannot be used.
    pub fn availability_hint(&self) -> String {
        if !self.enabled {
            return "AI features are disabled (LLM_ENABLED=false)".to_string();
        }
        match self.provider {
            LlmProvider::Ollama => format!(
                "Ollama not available at {}. Make sure Ollama is running: ollama serve",
                self.endpoint
            ),
            LlmProvider::OpenAI if self.api_key.is_none() => {
                "OpenAI API key not set. Set OPENAI_API_KEY or LLM_API_KEY".to_string()
            }
            LlmProvider::Anthropic if self.api_key.is_none() => {
                "Anthropic API key not set. Set ANTHROPIC_API_KEY or LLM_API_KEY".to_string()
            }
            _ => format!(
                "{} API not available at {}",
                self.provider.as_str(),
                self.endpoint
            ),
        }
    }
}

/// Endpoint for a provider name; Groq shares the OpenAI API at its own host.
fn provider_endpoint(name: &str, provider: LlmProvider) -> &'static str {
    if name.eq_ignore_ascii_case("groq") {
        GROQ_ENDPOINT
    } else {
        provider.default_endpoint()
    }
}

fn is_stock_endpoint(endpoint: &str) -> bool {
    endpoint == GROQ_ENDPOINT
        || [LlmProvider::Ollama, LlmProvider::OpenAI, LlmProvider::Anthropic]
            .iter()
            .any(|p| p.default_endpoint() == endpoint)
}

/// Environment variable holding the API key for a provider name.
fn provider_key_var(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        "groq" => Some("GROQ_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_base_default() {
        let config = LlmConfig::base_default();
        assert!(config.enabled);
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert!(config.is_default());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(LlmProvider::from_str("Groq"), Some(LlmProvider::OpenAI));
        assert_eq!(
            LlmProvider::from_str("anthropic"),
            Some(LlmProvider::Anthropic)
        );
        assert_eq!(LlmProvider::from_str("bard"), None);
        assert!(LlmProvider::Anthropic.requires_api_key());
        assert!(!LlmProvider::Ollama.requires_api_key());
    }

    #[test]
    fn test_for_provider_defaults() {
        let config = LlmConfig::for_provider(LlmProvider::Anthropic);
        assert_eq!(config.endpoint, "https://api.anthropic.com");
        assert!(config.model.starts_with("claude"));
        assert!(config.api_key.is_none());
        assert!(config.availability_hint().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LlmConfig =
            toml::from_str("provider = \"openai\"\nmodel = \"gpt-4o\"").unwrap();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.endpoint, "https://api.openai.com");
    }

    #[test]
    fn test_deserialize_uses_provider_endpoint() {
        let config: LlmConfig = toml::from_str("provider = \"anthropic\"").unwrap();
        assert_eq!(config.endpoint, "https://api.anthropic.com");
        assert!(config.model.starts_with("claude"));

        let config: LlmConfig =
            toml::from_str("provider = \"anthropic\"\nendpoint = \"http://proxy:8080\"")
                .unwrap();
        assert_eq!(config.endpoint, "http://proxy:8080");

        let config: LlmConfig = toml::from_str("").unwrap();
        assert!(config.is_default());
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_provider_key_keeps_configured_model() {
        let file: LlmConfig =
            toml::from_str("provider = \"anthropic\"\nmodel = \"claude-opus-4-1\"").unwrap();
        let config = file.apply_env(env(&[("ANTHROPIC_API_KEY", "sk-ant-test")]));
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert_eq!(config.model, "claude-opus-4-1");
        assert_eq!(config.endpoint, "https://api.anthropic.com");
        assert_eq!(config.api_key.as_deref(), Some("sk-ant-test"));
    }

    #[test]
    fn test_explicit_key_skips_detection() {
        let file: LlmConfig = toml::from_str("provider = \"openai\"\nmodel = \"gpt-4o\"").unwrap();
        let config = file.apply_env(env(&[
            ("LLM_API_KEY", "sk-own"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key.as_deref(), Some("sk-own"));
    }

    #[test]
    fn test_configured_provider_key_preferred() {
        let file = LlmConfig::for_provider(LlmProvider::OpenAI);
        let config = file.apply_env(env(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
    }

    #[test]
    fn test_detection_switches_from_ollama() {
        let config = LlmConfig::base_default().apply_env(env(&[("GROQ_API_KEY", "gsk")]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.endpoint, GROQ_ENDPOINT);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key.as_deref(), Some("gsk"));
    }

    #[test]
    fn test_explicit_provider_and_overrides() {
        let config = LlmConfig::base_default().apply_env(env(&[
            ("LLM_PROVIDER", "groq"),
            ("GROQ_API_KEY", "gsk"),
            ("LLM_MODEL", "llama-3.1-8b-instant"),
            ("LLM_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.endpoint, GROQ_ENDPOINT);
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.api_key.as_deref(), Some("gsk"));
    }

    #[test]
    fn test_overrides_are_idempotent() {
        let vars = [("ANTHROPIC_API_KEY", "sk-ant-test")];
        let once = LlmConfig::base_default().apply_env(env(&vars));
        let twice = once.clone().apply_env(env(&vars));
        assert_eq!(once, twice);
    }
}
