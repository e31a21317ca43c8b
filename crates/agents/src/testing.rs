use std::collections::VecDeque;

use parking_lot::Mutex;
use switchboard_core::{ChatMessage, Role};
use switchboard_llm::{
    ChatModel, ChatRequest, ConversationItem, LlmError, ModelTurn, ToolSpec,
};

type Responder = Box<dyn Fn(&ChatRequest) -> Result<ModelTurn, LlmError> + Send + Sync>;

/// In-memory model that answers through a closure and records every request.
pub struct FakeModel {
    responder: Responder,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<ModelTurn, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(ModelTurn::Text(text.clone())))
    }

    pub fn failing() -> Self {
        Self::new(|_| {
            Err(LlmError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        })
    }

    /// Replays the given turns in order, then reports missing output.
    pub fn scripted(turns: Vec<ModelTurn>) -> Self {
        let queue = Mutex::new(VecDeque::from(turns));
        Self::new(move |_| queue.lock().pop_front().ok_or(LlmError::MissingOutput))
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

impl ChatModel for FakeModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().push(request.clone());
        match (self.responder)(request)? {
            ModelTurn::Text(text) => Ok(text),
            ModelTurn::ToolCalls(_) => Err(LlmError::Decode("tool call in completion".into())),
        }
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        _tools: &[ToolSpec],
    ) -> Result<ModelTurn, LlmError> {
        self.requests.lock().push(request.clone());
        (self.responder)(request)
    }
}

pub fn message_text(request: &ChatRequest, role: Role) -> String {
    request
        .items
        .iter()
        .filter_map(|item| match item {
            ConversationItem::Message(ChatMessage { role: r, content }) if *r == role => {
                Some(content.as_str())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
