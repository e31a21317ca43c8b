//! Mock LLM HTTP server shared by the integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub type Reply = (StatusCode, Value);

type Responder = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Serves `POST /v1/responses` (OpenAI) and
/// `POST /v1beta/models/{model}:generateContent` (Gemini) on an ephemeral port.
pub struct MockLlmServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Reply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/responses", post(handle))
            .route("/v1beta/models/:call", post(handle))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock server should bind");
        let addr = listener.local_addr().expect("mock server address");
        let (shutdown, signal) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await;
        });

        Self {
            addr,
            requests,
            shutdown: Some(shutdown),
        }
    }

    pub fn openai_base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn gemini_base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn handle(State(state): State<MockState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.requests.lock().push(body.clone());
    let (status, reply) = (state.responder)(&body);
    (status, Json(reply))
}

pub fn openai_text(text: &str) -> Reply {
    (
        StatusCode::OK,
        json!({
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "output_text", "text": text }]
            }]
        }),
    )
}

pub fn openai_function_call(call_id: &str, name: &str, arguments: Value) -> Reply {
    (
        StatusCode::OK,
        json!({
            "output": [{
                "type": "function_call",
                "call_id": call_id,
                "name": name,
                "arguments": arguments.to_string()
            }]
        }),
    )
}

pub fn gemini_text(text: &str) -> Reply {
    (
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        }),
    )
}

pub fn gemini_function_call(name: &str, args: Value) -> Reply {
    (
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "functionCall": { "name": name, "args": args } }]
                }
            }]
        }),
    )
}

pub fn server_error() -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "backend exploded" } }),
    )
}

/// Text of every OpenAI input message with the given role.
pub fn openai_message_text(body: &Value, role: &str) -> String {
    body.get("input")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .filter(|item| item.get("role").and_then(|value| value.as_str()) == Some(role))
        .flat_map(|item| {
            item.get("content")
                .and_then(|value| value.as_array())
                .cloned()
                .unwrap_or_default()
        })
        .filter_map(|content| content.get("text").and_then(|value| value.as_str()).map(str::to_string))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn openai_tool_outputs(body: &Value) -> Vec<String> {
    body.get("input")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").and_then(|value| value.as_str()) == Some("function_call_output"))
        .filter_map(|item| item.get("output").and_then(|value| value.as_str()).map(str::to_string))
        .collect()
}

pub fn gemini_system_text(body: &Value) -> String {
    body.pointer("/systemInstruction/parts")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .filter_map(|part| part.get("text").and_then(|value| value.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn gemini_user_text(body: &Value) -> String {
    body.get("contents")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .filter(|content| content.get("role").and_then(|value| value.as_str()) == Some("user"))
        .flat_map(|content| {
            content
                .get("parts")
                .and_then(|value| value.as_array())
                .cloned()
                .unwrap_or_default()
        })
        .filter_map(|part| part.get("text").and_then(|value| value.as_str()).map(str::to_string))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn gemini_tool_outputs(body: &Value) -> Vec<String> {
    body.get("contents")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .flat_map(|content| {
            content
                .get("parts")
                .and_then(|value| value.as_array())
                .cloned()
                .unwrap_or_default()
        })
        .filter_map(|part| {
            part.pointer("/functionResponse/response/result")
                .and_then(|value| value.as_str())
                .map(str::to_string)
        })
        .collect()
}
