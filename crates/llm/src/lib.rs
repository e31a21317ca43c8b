//! Model clients used by the orchestration patterns.
//!
//! [`ChatModel`] is the only seam the patterns depend on. [`LlmClient`]
//! picks the OpenAI Responses API or Gemini `generateContent` backend from an
//! explicit [`LlmConfig`].

mod client;
mod config;
mod gemini;
mod openai;
mod types;

pub use client::LlmClient;
pub use config::{LlmConfig, Provider};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use types::{
    ChatModel, ChatRequest, ConversationItem, LlmError, ModelTurn, ToolCall, ToolOutput, ToolSpec,
};
