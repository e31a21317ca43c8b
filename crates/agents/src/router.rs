use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{
    is_blank_request, parse_decision, ChatPrompt, Decision, HandlerError, HandlerResult, Label,
    RouteOutcome, RouterError,
};
use switchboard_llm::{ChatModel, ChatRequest};
use switchboard_observability::PatternMetrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub type Handler = Arc<dyn Fn(&str) -> Result<HandlerResult, HandlerError> + Send + Sync>;

pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &str) -> Result<Decision, RouterError>;
}

/// Classifies with a single temperature-0 model call. Any model failure is
/// reported as `ClassificationUnavailable`.
#[derive(Clone)]
pub struct LlmClassifier<M> {
    model: Arc<M>,
    prompt: ChatPrompt,
    metrics: Option<Arc<PatternMetrics>>,
}

impl<M> LlmClassifier<M>
where
    M: ChatModel,
{
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            prompt: ChatPrompt::router(),
            metrics: None,
        }
    }

    pub fn with_prompt(mut self, prompt: ChatPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PatternMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<M> Classifier for LlmClassifier<M>
where
    M: ChatModel,
{
    async fn classify(&self, request: &str) -> Result<Decision, RouterError> {
        let messages = self
            .prompt
            .render(&[("request", request)])
            .map_err(|err| RouterError::ClassificationUnavailable(err.to_string()))?;

        if let Some(metrics) = &self.metrics {
            metrics.inc_model_call();
        }
        let raw = self
            .model
            .complete(&ChatRequest::new(messages).with_temperature(0.0))
            .await
            .map_err(|err| RouterError::ClassificationUnavailable(err.to_string()))?;

        let decision = parse_decision(&raw);
        if decision.label == Label::Unclear && !decision.is_recognized() {
            warn!(raw = %raw.trim(), "classifier output is not a known label; using unclear");
        }
        Ok(decision)
    }
}

/// Total mapping from label to handler. The `unclear` handler is supplied at
/// construction and serves every label without its own binding.
#[derive(Clone)]
pub struct Dispatcher {
    fallback: Handler,
    bound: HashMap<Label, Handler>,
}

impl Dispatcher {
    pub fn new<F>(unclear: F) -> Self
    where
        F: Fn(&str) -> Result<HandlerResult, HandlerError> + Send + Sync + 'static,
    {
        Self {
            fallback: Arc::new(unclear),
            bound: HashMap::new(),
        }
    }

    /// Binding `Label::Unclear` replaces the fallback.
    pub fn bind<F>(mut self, label: Label, handler: F) -> Self
    where
        F: Fn(&str) -> Result<HandlerResult, HandlerError> + Send + Sync + 'static,
    {
        if label == Label::Unclear {
            self.fallback = Arc::new(handler);
        } else {
            self.bound.insert(label, Arc::new(handler));
        }
        self
    }

    /// Label whose handler actually runs for `label`.
    pub fn resolve(&self, label: Label) -> Label {
        if self.bound.contains_key(&label) {
            label
        } else {
            Label::Unclear
        }
    }

    pub fn dispatch(&self, decision: &Decision, request: &str) -> Result<HandlerResult, RouterError> {
        let label = self.resolve(decision.label);
        let handler = self.bound.get(&label).unwrap_or(&self.fallback);
        handler(request).map_err(|source| RouterError::HandlerFailure { label, source })
    }
}

#[derive(Clone)]
pub struct IntentRouter<C> {
    classifier: C,
    dispatcher: Dispatcher,
    metrics: Arc<PatternMetrics>,
}

impl<M> IntentRouter<LlmClassifier<M>>
where
    M: ChatModel,
{
    /// Model-backed classifier with the simulated booking/info/unclear handlers.
    pub fn simulated(model: Arc<M>, metrics: Arc<PatternMetrics>) -> Self {
        let classifier = LlmClassifier::new(model).with_metrics(metrics.clone());
        Self::new(classifier, crate::handlers::simulated_dispatcher(), metrics)
    }
}

impl<C> IntentRouter<C>
where
    C: Classifier,
{
    pub fn new(classifier: C, dispatcher: Dispatcher, metrics: Arc<PatternMetrics>) -> Self {
        Self {
            classifier,
            dispatcher,
            metrics,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn route(&self, request: &str) -> Result<HandlerResult, RouterError> {
        self.route_detailed(request)
            .await
            .map(|outcome| outcome.output)
    }

    /// Classify, then dispatch. A failed classification never reaches a handler.
    #[instrument(skip(self, request), fields(request_id = %Uuid::new_v4()))]
    pub async fn route_detailed(&self, request: &str) -> Result<RouteOutcome, RouterError> {
        if is_blank_request(request) {
            return Err(RouterError::EmptyRequest);
        }
        let started = Instant::now();
        self.metrics.inc_request();

        let decision = match self.classifier.classify(request).await {
            Ok(decision) => decision,
            Err(err) => {
                self.metrics.inc_classification_failure();
                warn!(error = %err, "classification failed; request not dispatched");
                return Err(err);
            }
        };

        let label = self.dispatcher.resolve(decision.label);
        let output = self.dispatcher.dispatch(&decision, request)?;
        self.metrics.inc_dispatch(label.as_str());
        self.metrics.observe_latency(started.elapsed());

        info!(
            decision = %decision.label,
            handler = %label,
            "request routed"
        );

        Ok(RouteOutcome {
            request: request.to_string(),
            decision,
            output,
        })
    }
}
