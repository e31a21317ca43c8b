use reqwest::Client;
use serde_json::{json, Value};
use switchboard_core::Role;
use tracing::debug;
use uuid::Uuid;

use crate::config::LlmConfig;
use crate::types::{
    ChatModel, ChatRequest, ConversationItem, LlmError, ModelTurn, ToolCall, ToolSpec,
};

/// Client for Gemini `models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(http: Client, config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(LlmError::MissingCredential("gemini"))?;

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
        debug!(model = %self.model, "sending gemini generateContent request");
        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", self.api_key.as_str())
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

impl ChatModel for GeminiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let payload = build_payload(request.temperature.unwrap_or(self.temperature), request, &[]);
        let body = self.send(&payload).await?;
        match parse_turn(&body)? {
            ModelTurn::Text(text) => Ok(text),
            ModelTurn::ToolCalls(_) => Err(LlmError::Decode(
                "unexpected function call in plain completion".to_string(),
            )),
        }
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, LlmError> {
        let payload = build_payload(request.temperature.unwrap_or(self.temperature), request, tools);
        let body = self.send(&payload).await?;
        parse_turn(&body)
    }
}

pub(crate) fn build_payload(temperature: f32, request: &ChatRequest, tools: &[ToolSpec]) -> Value {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for item in &request.items {
        match item {
            ConversationItem::Message(message) => match message.role {
                Role::System => system_parts.push(json!({ "text": message.content })),
                Role::User => contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": message.content }]
                })),
                Role::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": [{ "text": message.content }]
                })),
            },
            ConversationItem::ToolCall(call) => contents.push(json!({
                "role": "model",
                "parts": [{ "functionCall": { "name": call.name, "args": call.arguments } }]
            })),
            ConversationItem::ToolOutput(output) => contents.push(json!({
                "role": "user",
                "parts": [{
                    "functionResponse": {
                        "name": output.name,
                        "response": { "result": output.output }
                    }
                }]
            })),
        }
    }

    let mut payload = json!({
        "contents": contents,
        "generationConfig": { "temperature": temperature },
    });

    if !system_parts.is_empty() {
        payload["systemInstruction"] = json!({ "parts": system_parts });
    }

    if !tools.is_empty() {
        let declarations = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                })
            })
            .collect::<Vec<_>>();
        payload["tools"] = json!([{ "functionDeclarations": declarations }]);
    }

    payload
}

pub(crate) fn parse_turn(body: &Value) -> Result<ModelTurn, LlmError> {
    let parts = body
        .get("candidates")
        .and_then(|value| value.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.pointer("/content/parts"))
        .and_then(|value| value.as_array())
        .ok_or(LlmError::MissingOutput)?;

    let mut calls = Vec::new();
    let mut chunks = Vec::new();
    for part in parts {
        if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(|value| value.as_str())
                .ok_or_else(|| LlmError::Decode("functionCall without name".to_string()))?;
            let id = call
                .get("id")
                .and_then(|value| value.as_str())
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
            calls.push(ToolCall {
                id,
                name: name.to_string(),
                arguments: call
                    .get("args")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
            });
        } else if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
            chunks.push(text);
        }
    }

    if !calls.is_empty() {
        return Ok(ModelTurn::ToolCalls(calls));
    }

    let text = chunks.concat();
    if text.trim().is_empty() {
        Err(LlmError::MissingOutput)
    } else {
        Ok(ModelTurn::Text(text))
    }
}
