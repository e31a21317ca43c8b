pub mod error;
pub mod intent;
pub mod models;
pub mod prompts;

pub use error::{HandlerError, RouterError, TemplateError};
pub use intent::{is_blank_request, parse_decision};
pub use models::*;
pub use prompts::{ChatPrompt, PromptTemplate};
