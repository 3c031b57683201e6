use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // Letting one trial request through
}

pub struct CircuitBreaker {
    pub name: String,
    pub state: RwLock<CircuitState>,
    pub failure_count: AtomicUsize,
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
    pub last_failure: RwLock<Option<Instant>>,
    /// Set while the half-open trial request is outstanding
    pub trial_in_flight: AtomicBool,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold,
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
            trial_in_flight: AtomicBool::new(false),
        }
    }

    pub async fn current(&self) -> CircuitState {
        *self.state.read().await
    }

    pub async fn check(&self) -> bool {
        let mut state = self.state.write().await;
        match *state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.try_acquire_trial(),
            CircuitState::Open => {
                let last_fail = *self.last_failure.read().await;
                match last_fail {
                    Some(instant) if instant.elapsed() > self.reset_timeout => {
                        *state = CircuitState::HalfOpen;
                        tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                        self.try_acquire_trial()
                    }
                    _ => false,
                }
            }
        }
    }

    /// Only one request may test a recovering collaborator at a time.
    fn try_acquire_trial(&self) -> bool {
        self.trial_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
        self.trial_in_flight.store(false, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
        self.trial_in_flight.store(false, Ordering::SeqCst);
    }
}

/// Breakers guarding calls to external collaborators
pub struct Resiliency {
    pub payment_cb: CircuitBreaker,
}

impl Default for Resiliency {
    fn default() -> Self {
        Self {
            payment_cb: CircuitBreaker::new("payment", 5, Duration::from_secs(30)),
        }
    }
}

/// Fail fast on checkout creation while the payment provider keeps failing.
pub async fn circuit_breaker_middleware(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> impl IntoResponse {
    let path = req.uri().path();
    let cb = if path.starts_with("/v1/orders/") && path.ends_with("/checkout") {
        Some(&state.resiliency.payment_cb)
    } else {
        None
    };

    let Some(cb) = cb else {
        return next.run(req).await.into_response();
    };

    if !cb.check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Circuit Breaker [{}] is OPEN", cb.name),
        )
            .into_response();
    }

    let response = next.run(req).await;

    if response.status().is_server_error() {
        cb.record_failure().await;
    } else {
        cb.record_success().await;
    }

    response.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trips_after_threshold() {
        let cb = CircuitBreaker::new("test", 2, Duration::from_secs(60));
        assert!(cb.check().await);

        cb.record_failure().await;
        assert_eq!(cb.current().await, CircuitState::Closed);
        cb.record_failure().await;
        assert_eq!(cb.current().await, CircuitState::Open);
        assert!(!cb.check().await);
    }

    #[tokio::test]
    async fn test_half_open_trial_recovers() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(0));
        cb.record_failure().await;
        assert_eq!(cb.current().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cb.check().await);
        assert_eq!(cb.current().await, CircuitState::HalfOpen);

        cb.record_success().await;
        assert_eq!(cb.current().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_admits_single_request() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(0));
        cb.record_failure().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cb.check().await);
        assert!(!cb.check().await);
        assert!(!cb.check().await);
        assert_eq!(cb.current().await, CircuitState::HalfOpen);

        cb.record_success().await;
        assert!(cb.check().await);
        assert!(cb.check().await);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let cb = CircuitBreaker::new("test", 3, Duration::from_millis(0));
        for _ in 0..3 {
            cb.record_failure().await;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cb.check().await);

        cb.record_failure().await;
        assert_eq!(cb.current().await, CircuitState::Open);
    }
}
