use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// In-process counters. Every increment is also forwarded to the `metrics`
/// facade so an installed recorder sees the same numbers.
#[derive(Debug, Default)]
pub struct PatternMetrics {
    requests_total: AtomicU64,
    classification_failures_total: AtomicU64,
    model_calls_total: AtomicU64,
    tool_calls_total: AtomicU64,
    total_latency_millis: AtomicU64,
    latency_samples: AtomicU64,
    dispatches: Mutex<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub classification_failures_total: u64,
    pub model_calls_total: u64,
    pub tool_calls_total: u64,
    pub dispatches: BTreeMap<String, u64>,
    pub avg_latency_millis: f64,
}

impl PatternMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("switchboard_requests_total").increment(1);
    }

    pub fn inc_classification_failure(&self) {
        self.classification_failures_total
            .fetch_add(1, Ordering::Relaxed);
        metrics::counter!("switchboard_classification_failures_total").increment(1);
    }

    pub fn inc_model_call(&self) {
        self.model_calls_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("switchboard_model_calls_total").increment(1);
    }

    pub fn inc_tool_call(&self, tool: &str) {
        self.tool_calls_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("switchboard_tool_calls_total", "tool" => tool.to_string()).increment(1);
    }

    pub fn inc_dispatch(&self, label: &str) {
        *self.dispatches.lock().entry(label.to_string()).or_insert(0) += 1;
        metrics::counter!("switchboard_dispatch_total", "label" => label.to_string()).increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
        metrics::histogram!("switchboard_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = self.total_latency_millis.load(Ordering::Relaxed);
        let samples = self.latency_samples.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            classification_failures_total: self
                .classification_failures_total
                .load(Ordering::Relaxed),
            model_calls_total: self.model_calls_total.load(Ordering::Relaxed),
            tool_calls_total: self.tool_calls_total.load(Ordering::Relaxed),
            dispatches: self.dispatches.lock().clone(),
            avg_latency_millis: if samples == 0 {
                0.0
            } else {
                latency as f64 / samples as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,switchboard_agents=info,switchboard_llm=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
