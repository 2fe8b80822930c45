//! Routing metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for routed requests.
///
/// Cheap to clone; clones share the same counters. Every update is also
/// forwarded to the global `metrics` recorder when one is installed.
#[derive(Clone)]
pub struct RouterMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    total_requests: AtomicU64,
    escalations: AtomicU64,
    answered: AtomicU64,
    knowledge_base_empty: AtomicU64,
    total_latency_us: AtomicU64,
}

impl RouterMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record a routed request
    pub fn record_request(&self, latency_us: u64) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        metrics::counter!("deskroute_requests_total").increment(1);
        metrics::histogram!("deskroute_route_latency_us").record(latency_us as f64);
    }

    /// Record a request handed to an operator
    pub fn record_escalation(&self, category: &str) {
        self.inner.escalations.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("deskroute_decisions_total", "action" => "escalate", "category" => category.to_string())
            .increment(1);
    }

    /// Record a request answered from the knowledge base
    pub fn record_answered(&self, category: &str) {
        self.inner.answered.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("deskroute_decisions_total", "action" => "answer", "category" => category.to_string())
            .increment(1);
    }

    /// Record a retrieval against an empty knowledge base
    pub fn record_knowledge_base_empty(&self) {
        self.inner
            .knowledge_base_empty
            .fetch_add(1, Ordering::Relaxed);
        metrics::counter!("deskroute_knowledge_base_empty_total").increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            escalations: self.inner.escalations.load(Ordering::Relaxed),
            answered: self.inner.answered.load(Ordering::Relaxed),
            knowledge_base_empty: self.inner.knowledge_base_empty.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.snapshot().fmt(f)
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub escalations: u64,
    pub answered: u64,
    pub knowledge_base_empty: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Share of requests handed to an operator
    pub fn escalation_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.escalations as f64 / self.total_requests as f64
        }
    }
}
