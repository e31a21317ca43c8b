use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{is_blank_request, ChatPrompt, SynthesisReport};
use switchboard_llm::{ChatModel, ChatRequest};
use switchboard_observability::PatternMetrics;
use tracing::{info, instrument};

use crate::error::PatternError;

/// Runs the summary, question and key-term prompts concurrently, then feeds
/// their outputs into one synthesis prompt.
pub struct ParallelSynthesizer<M> {
    model: Arc<M>,
    temperature: f32,
    metrics: Arc<PatternMetrics>,
}

impl<M> ParallelSynthesizer<M>
where
    M: ChatModel,
{
    pub fn new(model: Arc<M>, metrics: Arc<PatternMetrics>) -> Self {
        Self {
            model,
            temperature: 0.7,
            metrics,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[instrument(skip(self))]
    pub async fn run(&self, topic: &str) -> Result<SynthesisReport, PatternError> {
        if is_blank_request(topic) {
            return Err(PatternError::EmptyInput);
        }
        let started = Instant::now();
        self.metrics.inc_request();

        let vars = [("topic", topic)];
        let (summary, questions, key_terms) = futures::try_join!(
            self.ask(ChatPrompt::summary(), &vars),
            self.ask(ChatPrompt::questions(), &vars),
            self.ask(ChatPrompt::key_terms(), &vars),
        )?;
        info!(
            summary_len = summary.len(),
            questions_len = questions.len(),
            key_terms_len = key_terms.len(),
            "parallel branches finished"
        );

        let answer = self
            .ask(
                ChatPrompt::synthesis(),
                &[
                    ("summary", summary.as_str()),
                    ("questions", questions.as_str()),
                    ("key_terms", key_terms.as_str()),
                    ("topic", topic),
                ],
            )
            .await?;
        self.metrics.observe_latency(started.elapsed());

        Ok(SynthesisReport {
            topic: topic.to_string(),
            summary,
            questions,
            key_terms,
            answer,
        })
    }

    async fn ask(&self, prompt: ChatPrompt, vars: &[(&str, &str)]) -> Result<String, PatternError> {
        let messages = prompt.render(vars)?;
        self.metrics.inc_model_call();
        let text = self
            .model
            .complete(&ChatRequest::new(messages).with_temperature(self.temperature))
            .await?;
        Ok(text)
    }
}
