use std::sync::Arc;
use std::time::Instant;

use switchboard_core::prompts::{EXTRACT_SPECIFICATIONS, SPECIFICATIONS_TO_JSON};
use switchboard_core::{is_blank_request, ChainOutput, ChatMessage, PromptTemplate};
use switchboard_llm::{ChatModel, ChatRequest};
use switchboard_observability::PatternMetrics;
use tracing::{info, instrument};

use crate::error::PatternError;

/// Two sequential prompts: extract specifications from free text, then turn
/// them into a JSON object.
pub struct PromptChain<M> {
    model: Arc<M>,
    extract: PromptTemplate,
    transform: PromptTemplate,
    metrics: Arc<PatternMetrics>,
}

impl<M> PromptChain<M>
where
    M: ChatModel,
{
    pub fn new(model: Arc<M>, metrics: Arc<PatternMetrics>) -> Self {
        Self {
            model,
            extract: PromptTemplate::new(EXTRACT_SPECIFICATIONS),
            transform: PromptTemplate::new(SPECIFICATIONS_TO_JSON),
            metrics,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn run(&self, text: &str) -> Result<ChainOutput, PatternError> {
        if is_blank_request(text) {
            return Err(PatternError::EmptyInput);
        }
        let started = Instant::now();
        self.metrics.inc_request();

        let specifications = self
            .step(self.extract.render(&[("text_input", text)])?)
            .await?;
        info!(len = specifications.len(), "specifications extracted");

        let json = self
            .step(
                self.transform
                    .render(&[("specifications", specifications.as_str())])?,
            )
            .await?;
        self.metrics.observe_latency(started.elapsed());

        Ok(ChainOutput {
            specifications,
            json,
        })
    }

    async fn step(&self, prompt: String) -> Result<String, PatternError> {
        self.metrics.inc_model_call();
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_temperature(0.0);
        Ok(self.model.complete(&request).await?)
    }
}
