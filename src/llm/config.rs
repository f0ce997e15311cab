//! LLM client configuration.

use std::fmt;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini generateContent API (default)
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Ollama API (local)
    Ollama,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Hosted providers need an API key; a local Ollama does not.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::Ollama => "llama3.1:8b",
        }
    }
}

/// Configuration for LLM client.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// LLM provider
    pub provider: LlmProvider,
    /// API endpoint (provider-specific defaults apply)
    pub endpoint: String,
    /// API key for hosted providers
    pub api_key: Option<String>,
    /// Model used for analysis and email drafting
    pub model: String,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
}

const DEFAULT_MAX_TOKENS: u32 = 8192;
const DEFAULT_TEMPERATURE: f32 = 0.3;

impl Default for LlmConfig {
    fn default() -> Self {
        Self::for_provider(LlmProvider::default())
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmConfig {
    /// Defaults for a given provider, without any environment input.
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self {
            provider,
            endpoint: provider.default_endpoint().to_string(),
            api_key: None,
            model: provider.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Supported variables:
    /// - `LLM_PROVIDER`: "gemini" (default), "openai", "groq", "together" or "ollama"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key, wins over provider-specific keys
    /// - `GEMINI_API_KEY` / `OPENAI_API_KEY` / `GROQ_API_KEY`: provider-specific keys
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    ///
    /// An explicit `LLM_PROVIDER` is authoritative. Without it the provider is
    /// Gemini, unless only an `OPENAI_API_KEY` is present.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_provider = lookup("LLM_PROVIDER");
        let provider_name = explicit_provider.as_deref().map(str::to_lowercase);

        let provider = match provider_name.as_deref().and_then(LlmProvider::parse) {
            Some(provider) => provider,
            None if lookup("GEMINI_API_KEY").is_none() && lookup("OPENAI_API_KEY").is_some() => {
                LlmProvider::OpenAI
            }
            None => LlmProvider::default(),
        };

        let mut config = Self::for_provider(provider);

        match provider_name.as_deref() {
            Some("groq") => config.endpoint = "https://api.groq.com/openai".to_string(),
            Some("together") => config.endpoint = "https://api.together.xyz".to_string(),
            _ => {}
        }
        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }

        config.api_key = lookup("LLM_API_KEY").or_else(|| match provider {
            LlmProvider::Gemini => lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")),
            LlmProvider::OpenAI if provider_name.as_deref() == Some("groq") => {
                lookup("GROQ_API_KEY")
            }
            LlmProvider::OpenAI => lookup("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
        });

        if let Some(model) = lookup("LLM_MODEL") {
            config.model = model;
        }
        if let Some(n) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            config.max_tokens = n;
        }
        if let Some(t) = lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            config.temperature = t;
        }

        config
    }

    /// Whether a usable API key is present for the configured provider.
    pub fn has_credentials(&self) -> bool {
        !self.provider.requires_api_key()
            || self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
