use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    cache_hits: AtomicUsize,

    // Timing (in microseconds)
    total_analysis_time_us: AtomicU64,
    total_sentiment_time_us: AtomicU64,

    // Counts
    analyses: AtomicUsize,
    sentiment_analyses: AtomicUsize,
    total_spans_consumed: AtomicUsize,
    total_entities_emitted: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            total_analysis_time_us: AtomicU64::new(0),
            total_sentiment_time_us: AtomicU64::new(0),
            analyses: AtomicUsize::new(0),
            sentiment_analyses: AtomicUsize::new(0),
            total_spans_consumed: AtomicUsize::new(0),
            total_entities_emitted: AtomicUsize::new(0),
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

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis(&self, duration: Duration, spans: usize, entities: usize) {
        self.total_analysis_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.analyses.fetch_add(1, Ordering::Relaxed);
        self.total_spans_consumed.fetch_add(spans, Ordering::Relaxed);
        self.total_entities_emitted.fetch_add(entities, Ordering::Relaxed);
    }

    pub fn record_sentiment(&self, duration: Duration) {
        self.total_sentiment_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.sentiment_analyses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            analyses: self.analyses.load(Ordering::Relaxed),
            sentiment_analyses: self.sentiment_analyses.load(Ordering::Relaxed),
            avg_analysis_time_ms: avg_time_ms(&self.total_analysis_time_us, &self.analyses),
            avg_sentiment_time_ms: avg_time_ms(
                &self.total_sentiment_time_us,
                &self.sentiment_analyses,
            ),
            total_spans_consumed: self.total_spans_consumed.load(Ordering::Relaxed),
            total_entities_emitted: self.total_entities_emitted.load(Ordering::Relaxed),
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

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub cache_hits: usize,
    pub analyses: usize,
    pub sentiment_analyses: usize,
    pub avg_analysis_time_ms: f64,
    pub avg_sentiment_time_ms: f64,
    pub total_spans_consumed: usize,
    pub total_entities_emitted: usize,
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
