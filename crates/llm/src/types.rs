use serde::{Deserialize, Serialize};
use serde_json::Value;
use switchboard_core::ChatMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured for {0}")]
    MissingCredential(&'static str),
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned non-success status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model response could not be decoded: {0}")]
    Decode(String),
    #[error("model output text missing")]
    MissingOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub name: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationItem {
    Message(ChatMessage),
    ToolCall(ToolCall),
    ToolOutput(ToolOutput),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub items: Vec<ConversationItem>,
    /// Overrides the client's configured temperature when set.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            items: messages.into_iter().map(ConversationItem::Message).collect(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn push(&mut self, item: ConversationItem) {
        self.items.push(item);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, LlmError>;
}
