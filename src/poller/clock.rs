use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Time source used by the poller for waiting and for timeouts
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since the clock was created
    fn elapsed(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by `tokio::time`
#[derive(Debug, Clone)]
pub struct TokioClock {
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` returns at once and advances the elapsed time.
///
/// Every requested sleep is recorded so tests can assert on the waits.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) += duration;
    }

    /// The sleeps requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
