use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_annotate_time_us: AtomicU64,
    total_tag_time_us: AtomicU64,
    annotate_calls: AtomicUsize,
    tag_calls: AtomicUsize,

    // Counts
    total_dictionary_spans: AtomicUsize,
    total_model_spans: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_annotate_time_us: AtomicU64::new(0),
            total_tag_time_us: AtomicU64::new(0),
            annotate_calls: AtomicUsize::new(0),
            tag_calls: AtomicUsize::new(0),
            total_dictionary_spans: AtomicUsize::new(0),
            total_model_spans: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Fetch + parse + dictionary match.
    pub fn record_annotate(&self, duration: Duration, spans: usize) {
        self.total_annotate_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.annotate_calls.fetch_add(1, Ordering::Relaxed);
        self.total_dictionary_spans.fetch_add(spans, Ordering::Relaxed);
    }

    /// One tagger call for one field.
    pub fn record_tag(&self, duration: Duration, spans: usize) {
        self.total_tag_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.tag_calls.fetch_add(1, Ordering::Relaxed);
        self.total_model_spans.fetch_add(spans, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_annotate_time_ms: avg_time_ms(&self.total_annotate_time_us, &self.annotate_calls),
            avg_tag_time_ms: avg_time_ms(&self.total_tag_time_us, &self.tag_calls),
            total_dictionary_spans: self.total_dictionary_spans.load(Ordering::Relaxed),
            total_model_spans: self.total_model_spans.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_annotate_time_ms: f64,
    pub avg_tag_time_ms: f64,
    pub total_dictionary_spans: usize,
    pub total_model_spans: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_averages() {
        let metrics = Metrics::new();
        metrics.record_request(true);
        metrics.record_request(false);
        metrics.record_annotate(Duration::from_millis(10), 3);
        metrics.record_annotate(Duration::from_millis(30), 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.failed_requests, 1);
        assert_eq!(snap.total_dictionary_spans, 4);
        assert!((snap.avg_annotate_time_ms - 20.0).abs() < 1e-9);
        assert_eq!(snap.avg_tag_time_ms, 0.0);
    }
}
