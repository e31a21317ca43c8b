use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{is_blank_request, AgentRun, ChatPrompt, ToolInvocation};
use switchboard_llm::{ChatModel, ChatRequest, ConversationItem, ModelTurn, ToolOutput};
use switchboard_observability::PatternMetrics;
use tracing::{debug, info, instrument};

use crate::error::PatternError;
use crate::tools::Tool;

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Single-input agent loop: ask the model, run any requested tools, feed the
/// observations back, stop at the first plain-text answer.
///
/// Failures end the run instead of being turned into model input. A call to an
/// unregistered tool returns [`PatternError::UnknownTool`] rather than an
/// "is not a valid tool" observation, and running out of iterations returns
/// [`PatternError::IterationLimit`] rather than a canned "stopped" answer.
pub struct ToolAgent<M> {
    model: Arc<M>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
    temperature: f32,
    metrics: Arc<PatternMetrics>,
}

impl<M> ToolAgent<M>
where
    M: ChatModel,
{
    pub fn new(model: Arc<M>, metrics: Arc<PatternMetrics>) -> Self {
        Self {
            model,
            tools: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: 0.0,
            metrics,
        }
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    #[instrument(skip(self))]
    pub async fn run(&self, input: &str) -> Result<AgentRun, PatternError> {
        if is_blank_request(input) {
            return Err(PatternError::EmptyInput);
        }
        let started = Instant::now();
        self.metrics.inc_request();

        let specs = self.tools.iter().map(|tool| tool.spec()).collect::<Vec<_>>();
        let messages = ChatPrompt::agent().render(&[("input", input)])?;
        let mut request = ChatRequest::new(messages).with_temperature(self.temperature);
        let mut steps = Vec::new();

        for iteration in 0..self.max_iterations {
            self.metrics.inc_model_call();
            match self.model.complete_with_tools(&request, &specs).await? {
                ModelTurn::Text(output) => {
                    self.metrics.observe_latency(started.elapsed());
                    info!(iteration, tool_calls = steps.len(), "agent finished");
                    return Ok(AgentRun {
                        input: input.to_string(),
                        output,
                        steps,
                    });
                }
                ModelTurn::ToolCalls(calls) => {
                    for call in calls {
                        let tool = self
                            .find_tool(&call.name)
                            .ok_or_else(|| PatternError::UnknownTool(call.name.clone()))?;
                        let observation = tool.call(&call.arguments).map_err(|source| {
                            PatternError::ToolFailed {
                                tool: call.name.clone(),
                                source,
                            }
                        })?;
                        self.metrics.inc_tool_call(&call.name);
                        debug!(iteration, tool = %call.name, "tool observation recorded");

                        request.push(ConversationItem::ToolCall(call.clone()));
                        request.push(ConversationItem::ToolOutput(ToolOutput {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            output: observation.clone(),
                        }));

                        steps.push(ToolInvocation {
                            tool: call.name,
                            arguments: call.arguments,
                            observation,
                        });
                    }
                }
            }
        }

        Err(PatternError::IterationLimit(self.max_iterations))
    }
}
