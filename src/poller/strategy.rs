use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

/// How a [`JobPoller`](super::JobPoller) waits between status queries.
///
/// The interval is fixed. An optional jitter adds a uniformly random extra
/// delay in `[0, jitter]` to every wait. Without a timeout the poller waits
/// until the job is terminal or the token is cancelled.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use aipoll::poller::PollStrategy;
///
/// let strategy = PollStrategy::new(Duration::from_secs(5))
///     .with_timeout(Duration::from_secs(120));
/// assert_eq!(strategy.next_delay(), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct PollStrategy {
    /// Wait between two consecutive status queries
    pub interval: Duration,

    /// Upper bound of the random delay added to each wait
    pub jitter: Option<Duration>,

    /// Total time allowed before giving up with a timeout
    pub timeout: Option<Duration>,

    /// Token checked before each query and raced against each query and wait
    pub cancel: CancellationToken,
}

impl PollStrategy {
    const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: None,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn get_default_interval() -> Duration {
        Self::DEFAULT_INTERVAL
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Creates a strategy from environment variables
    ///
    /// Expected environment variables:
    /// - POLL_INTERVAL_SECS (optional, default: `default_interval`; zero is ignored)
    /// - POLL_TIMEOUT_SECS (optional, waits indefinitely when unset)
    pub fn from_env(default_interval: Duration) -> Self {
        Self::from_lookup(default_interval, |key| std::env::var(key).ok())
    }

    /// Creates a strategy from an arbitrary variable lookup
    pub fn from_lookup<F>(default_interval: Duration, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        // A zero interval would turn the wait into a busy loop.
        let interval = secs("POLL_INTERVAL_SECS")
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(default_interval);

        let strategy = Self::new(interval);
        match secs("POLL_TIMEOUT_SECS") {
            Some(timeout) => strategy.with_timeout(Duration::from_secs(timeout)),
            None => strategy,
        }
    }

    /// Delay to wait before the next status query
    pub fn next_delay(&self) -> Duration {
        match self.jitter {
            Some(jitter) if !jitter.is_zero() => {
                let bound = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
                let extra = rand::thread_rng().gen_range(0..=bound);
                self.interval.saturating_add(Duration::from_millis(extra))
            }
            _ => self.interval,
        }
    }
}

impl Default for PollStrategy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
