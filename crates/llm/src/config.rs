use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// `SWITCHBOARD_PROVIDER`, defaulting to Gemini when unset or unknown.
    pub fn from_env() -> Self {
        env::var("SWITCHBOARD_PROVIDER")
            .ok()
            .and_then(|value| Self::parse(&value))
            .unwrap_or(Self::Gemini)
    }

    fn key_env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            temperature: 0.0,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Reads the configuration once from the process environment. Library
    /// code never consults the environment after this.
    pub fn from_env() -> Self {
        Self::from_env_for(Provider::from_env())
    }

    /// Like [`LlmConfig::from_env`] with the provider already chosen, so the
    /// API key falls back to that provider's own variable.
    pub fn from_env_for(provider: Provider) -> Self {
        Self::from_lookup(provider, |key| env::var(key).ok())
    }

    fn from_lookup<F>(provider: Provider, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(provider);
        config.api_key = var("SWITCHBOARD_API_KEY").or_else(|| var(provider.key_env_var()));

        if let Some(model) = var("SWITCHBOARD_MODEL") {
            config = config.with_model(model);
        }
        if let Some(base_url) = var("SWITCHBOARD_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        config.temperature = var("SWITCHBOARD_TEMPERATURE")
            .and_then(|value| value.trim().parse::<f32>().ok())
            .map(|value| value.clamp(0.0, 2.0))
            .unwrap_or(0.0);

        config
    }
}
