//! Orchestration patterns built on a [`switchboard_llm::ChatModel`]:
//! intent routing, parallel fan-out with synthesis, a tool-calling agent
//! loop and a sequential prompt chain.

mod agent;
mod chain;
mod error;
mod handlers;
mod parallel;
mod router;
mod tools;

#[cfg(test)]
mod testing;

pub use agent::{ToolAgent, DEFAULT_MAX_ITERATIONS};
pub use chain::PromptChain;
pub use error::{PatternError, ToolError};
pub use handlers::{booking_handler, info_handler, simulated_dispatcher, unclear_handler};
pub use parallel::ParallelSynthesizer;
pub use router::{Classifier, Dispatcher, Handler, IntentRouter, LlmClassifier};
pub use tools::{SearchInformationTool, Tool};
