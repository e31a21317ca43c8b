use thiserror::Error;

use crate::models::Label;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("request text is empty")]
    EmptyRequest,
    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(String),
    #[error("handler for '{label}' failed: {source}")]
    HandlerFailure {
        label: Label,
        #[source]
        source: HandlerError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template variable '{0}' was not provided")]
    MissingVariable(String),
}
