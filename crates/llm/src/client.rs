use reqwest::Client;

use crate::config::{LlmConfig, Provider};
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;
use crate::types::{ChatModel, ChatRequest, LlmError, ModelTurn, ToolSpec};

/// Provider-selected client. Built once from an explicit [`LlmConfig`].
#[derive(Debug, Clone)]
pub enum LlmClient {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: &LlmConfig) -> Result<Self, LlmError> {
        match config.provider {
            Provider::OpenAi => OpenAiClient::new(http, config).map(Self::OpenAi),
            Provider::Gemini => GeminiClient::new(http, config).map(Self::Gemini),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::OpenAi(_) => Provider::OpenAi,
            Self::Gemini(_) => Provider::Gemini,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(client) => client.model(),
            Self::Gemini(client) => client.model(),
        }
    }
}

impl ChatModel for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        match self {
            Self::OpenAi(client) => client.complete(request).await,
            Self::Gemini(client) => client.complete(request).await,
        }
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, LlmError> {
        match self {
            Self::OpenAi(client) => client.complete_with_tools(request, tools).await,
            Self::Gemini(client) => client.complete_with_tools(request, tools).await,
        }
    }
}
