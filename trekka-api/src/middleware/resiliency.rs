use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use trekka_core::TripCandidate;
use trekka_ingest::{ExtractionError, TripExtractor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,
    /// Failing fast until `reset_timeout` has passed.
    Open,
    /// A single trial call is in flight and decides between Closed and Open.
    HalfOpen,
}

pub struct CircuitBreaker {
    pub name: String,
    state: RwLock<CircuitState>,
    failure_count: AtomicUsize,
    failure_threshold: usize,
    reset_timeout: Duration,
    last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Whether a call may go through right now. Once `reset_timeout` has
    /// passed, a single caller is admitted as the trial; a trial that never
    /// reports back is replaced after another `reset_timeout`.
    pub async fn check(&self) -> bool {
        if *self.state.read().await == CircuitState::Closed {
            return true;
        }

        let mut state = self.state.write().await;
        if *state == CircuitState::Closed {
            return true;
        }
        let mut last_failure = self.last_failure.write().await;
        let cooled_down = last_failure.is_some_and(|instant| instant.elapsed() >= self.reset_timeout);
        if cooled_down {
            if *state == CircuitState::Open {
                tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
            }
            *state = CircuitState::HalfOpen;
            *last_failure = Some(Instant::now());
        }
        cooled_down
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
    }
}

/// Puts a circuit breaker in front of an extractor.
///
/// Only transport and provider errors count as failures; a reachable model
/// that returns unusable content does not trip the circuit.
pub struct GuardedExtractor {
    inner: Arc<dyn TripExtractor>,
    breaker: CircuitBreaker,
}

impl GuardedExtractor {
    pub fn new(inner: Arc<dyn TripExtractor>, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }
}

#[async_trait]
impl TripExtractor for GuardedExtractor {
    async fn extract(&self, subject: &str, body: &str) -> Result<TripCandidate, ExtractionError> {
        if !self.breaker.check().await {
            return Err(ExtractionError::Unavailable);
        }

        let result = self.inner.extract(subject, body).await;
        match &result {
            Err(ExtractionError::Request(_)) | Err(ExtractionError::Provider { .. }) => {
                self.breaker.record_failure().await
            }
            _ => self.breaker.record_success().await,
        }
        result
    }
}
