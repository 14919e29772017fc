//! # Request and Sweep Counters
//!
//! In-process atomic counters, exposed as JSON at `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    request_count: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
    sweep_count: Arc<AtomicU64>,
    sweep_failures: Arc<AtomicU64>,
    reminders_processed: Arc<AtomicU64>,
}

/// Point-in-time copy of [`ApiMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub sweeps: u64,
    pub sweep_failures: u64,
    pub reminders_processed: u64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep and how many rows it claimed.
    pub fn record_sweep(&self, processed: usize) {
        self.sweep_count.fetch_add(1, Ordering::Relaxed);
        self.reminders_processed
            .fetch_add(processed as u64, Ordering::Relaxed);
    }

    /// Record a sweep that failed at selection.
    pub fn record_sweep_failure(&self) {
        self.sweep_count.fetch_add(1, Ordering::Relaxed);
        self.sweep_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.request_count.load(Ordering::Relaxed),
            errors: self.error_count.load(Ordering::Relaxed),
            sweeps: self.sweep_count.load(Ordering::Relaxed),
            sweep_failures: self.sweep_failures.load(Ordering::Relaxed),
            reminders_processed: self.reminders_processed.load(Ordering::Relaxed),
        }
    }
}

/// Counts every request, and every 4xx/5xx response as an error.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        if response.status().is_client_error() || response.status().is_server_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_counters_accumulate() {
        let m = ApiMetrics::new();
        m.record_sweep(3);
        m.record_sweep(0);
        m.record_sweep_failure();
        let snap = m.snapshot();
        assert_eq!(snap.sweeps, 3);
        assert_eq!(snap.sweep_failures, 1);
        assert_eq!(snap.reminders_processed, 3);
        assert_eq!(snap.requests, 0);
    }

    #[test]
    fn clones_share_counters() {
        let m = ApiMetrics::new();
        m.clone().record_sweep(2);
        assert_eq!(m.snapshot().reminders_processed, 2);
    }
}
