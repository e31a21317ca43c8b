use switchboard_core::TemplateError;
use switchboard_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("input text is empty")]
    EmptyInput,
    #[error(transparent)]
    Model(#[from] LlmError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),
    #[error("tool '{tool}' failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: ToolError,
    },
    #[error("agent stopped after {0} iterations without a final answer")]
    IterationLimit(usize),
}
