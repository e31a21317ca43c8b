use reqwest::Client;
use serde_json::{json, Value};
use switchboard_core::Role;
use tracing::debug;

use crate::config::LlmConfig;
use crate::types::{
    ChatModel, ChatRequest, ConversationItem, LlmError, ModelTurn, ToolCall, ToolSpec,
};

/// Client for the OpenAI Responses API (`POST {base_url}/responses`).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(http: Client, config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(LlmError::MissingCredential("openai"))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, payload: &Value) -> Result<Value, LlmError> {
        debug!(model = %self.model, "sending openai responses request");
        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| LlmError::Decode(err.to_string()))
    }
}

impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let payload = build_payload(
            &self.model,
            request.temperature.unwrap_or(self.temperature),
            request,
            &[],
        );
        let body = self.send(&payload).await?;
        extract_output_text(&body)
            .filter(|value| !value.trim().is_empty())
            .ok_or(LlmError::MissingOutput)
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, LlmError> {
        let payload = build_payload(
            &self.model,
            request.temperature.unwrap_or(self.temperature),
            request,
            tools,
        );
        let body = self.send(&payload).await?;
        parse_turn(&body)
    }
}

pub(crate) fn build_payload(
    model: &str,
    temperature: f32,
    request: &ChatRequest,
    tools: &[ToolSpec],
) -> Value {
    let input = request
        .items
        .iter()
        .map(|item| match item {
            ConversationItem::Message(message) => {
                let content_type = match message.role {
                    Role::Assistant => "output_text",
                    Role::System | Role::User => "input_text",
                };
                json!({
                    "role": message.role.as_str(),
                    "content": [
                        { "type": content_type, "text": message.content }
                    ]
                })
            }
            ConversationItem::ToolCall(call) => json!({
                "type": "function_call",
                "call_id": call.id,
                "name": call.name,
                "arguments": call.arguments.to_string(),
            }),
            ConversationItem::ToolOutput(output) => json!({
                "type": "function_call_output",
                "call_id": output.call_id,
                "output": output.output,
            }),
        })
        .collect::<Vec<_>>();

    let mut payload = json!({
        "model": model,
        "temperature": temperature,
        "input": input,
    });

    if !tools.is_empty() {
        payload["tools"] = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    payload
}

pub(crate) fn parse_turn(body: &Value) -> Result<ModelTurn, LlmError> {
    let mut calls = Vec::new();
    if let Some(output) = body.get("output").and_then(|value| value.as_array()) {
        for item in output {
            if item.get("type").and_then(|value| value.as_str()) != Some("function_call") {
                continue;
            }
            let name = item
                .get("name")
                .and_then(|value| value.as_str())
                .ok_or_else(|| LlmError::Decode("function_call without name".to_string()))?;
            let id = item
                .get("call_id")
                .or_else(|| item.get("id"))
                .and_then(|value| value.as_str())
                .unwrap_or(name);
            let arguments = match item.get("arguments") {
                Some(Value::String(raw)) => serde_json::from_str(raw)
                    .map_err(|err| LlmError::Decode(format!("tool arguments: {err}")))?,
                Some(other) => other.clone(),
                None => Value::Object(Default::default()),
            };
            calls.push(ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            });
        }
    }

    if !calls.is_empty() {
        return Ok(ModelTurn::ToolCalls(calls));
    }

    extract_output_text(body)
        .filter(|value| !value.trim().is_empty())
        .map(ModelTurn::Text)
        .ok_or(LlmError::MissingOutput)
}

pub(crate) fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(value) = payload.get("output_text").and_then(|value| value.as_str()) {
        return Some(value.to_string());
    }
    let output = payload.get("output")?.as_array()?;
    let mut chunks = Vec::new();
    for item in output {
        if let Some(content) = item.get("content").and_then(|value| value.as_array()) {
            for content_item in content {
                if content_item
                    .get("type")
                    .and_then(|value| value.as_str())
                    .map(|value| value == "output_text")
                    .unwrap_or(false)
                {
                    if let Some(text) = content_item.get("text").and_then(|value| value.as_str()) {
                        chunks.push(text.to_string());
                    }
                }
            }
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n\n"))
    }
}
