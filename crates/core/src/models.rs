use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Booking,
    Info,
    Unclear,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Booking, Label::Info, Label::Unclear];

    /// Exact match against the wire name. No case folding.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "booking" => Some(Self::Booking),
            "info" => Some(Self::Info),
            "unclear" => Some(Self::Unclear),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Info => "info",
            Self::Unclear => "unclear",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one request. `raw` keeps the untrimmed model
/// text so malformed output can still be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub label: Label,
    pub raw: String,
}

impl Decision {
    pub fn new(label: Label, raw: impl Into<String>) -> Self {
        Self {
            label,
            raw: raw.into(),
        }
    }

    /// True when the trimmed model output named a label literally.
    pub fn is_recognized(&self) -> bool {
        Label::parse(self.raw.trim()).is_some()
    }
}

pub type HandlerResult = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub request: String,
    pub decision: Decision,
    pub output: HandlerResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub topic: String,
    pub summary: String,
    pub questions: String,
    pub key_terms: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: Value,
    pub observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub input: String,
    pub output: String,
    pub steps: Vec<ToolInvocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainOutput {
    pub specifications: String,
    pub json: String,
}
