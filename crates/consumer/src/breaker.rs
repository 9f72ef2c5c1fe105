//! Circuit breaker guarding broker operations.
//!
//! Keeps a string of consecutive failures from hammering a failing broker:
//! after `failure_threshold` failures the circuit opens and `execute`
//! rejects without touching the broker until the cooldown lapses, then lets
//! exactly one probe through (half-open) to decide the next state.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use contracts::PipelineError;

/// Breaker state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Operations pass through
    Closed,
    /// Operations rejected until the cooldown lapses
    Open,
    /// Exactly one probe allowed through
    HalfOpen,
}

/// Breaker tuning
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// How long an open circuit rejects before probing
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_millis(5_000),
        }
    }
}

/// Circuit breaker over an arbitrary fallible async operation.
///
/// State is process-lifetime only and owned by the single consumer task.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: CircuitState,
    consecutive_failures: u32,
    next_attempt: Instant,
}

impl CircuitBreaker {
    /// Create a closed breaker
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: CircuitState::Closed,
            consecutive_failures: 0,
            next_attempt: Instant::now(),
        }
    }

    /// Current state machine position
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Read-only probe: true while the circuit is definitely open, i.e. the
    /// cooldown has not lapsed yet. Once it lapses this reports false so the
    /// caller proceeds to `execute`, which performs the half-open transition.
    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open && Instant::now() < self.next_attempt
    }

    /// Run `operation` under the breaker.
    ///
    /// While open and inside the cooldown the operation future is dropped
    /// unpolled and a `CircuitOpen` error is returned. At or past the
    /// cooldown the breaker goes half-open and the call proceeds as a probe.
    pub async fn execute<T, F>(&mut self, operation: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        if self.state == CircuitState::Open {
            let now = Instant::now();
            if now < self.next_attempt {
                return Err(PipelineError::CircuitOpen {
                    retry_in_ms: (self.next_attempt - now).as_millis() as u64,
                });
            }
            self.state = CircuitState::HalfOpen;
            warn!("circuit half-open, probing broker connectivity");
        }

        match operation.await {
            Ok(value) => {
                self.reset();
                Ok(value)
            }
            Err(e) => {
                self.register_failure(&e);
                Err(e)
            }
        }
    }

    fn register_failure(&mut self, error: &PipelineError) {
        self.consecutive_failures += 1;

        let reopen = self.state == CircuitState::HalfOpen;
        if reopen || self.consecutive_failures >= self.config.failure_threshold {
            self.state = CircuitState::Open;
            self.next_attempt = Instant::now() + self.config.cooldown;
            observability::record_circuit_opened();
            error!(
                failures = self.consecutive_failures,
                cooldown_ms = self.config.cooldown.as_millis() as u64,
                error = %error,
                "circuit opened"
            );
        }
    }

    fn reset(&mut self) {
        if self.consecutive_failures > 0 || self.state != CircuitState::Closed {
            info!("circuit reset after successful operation");
        }
        self.consecutive_failures = 0;
        self.state = CircuitState::Closed;
    }
}
