//! Minimum spacing between outbound requests

use std::time::{Duration, Instant};

/// Enforces a minimum delay between consecutive network operations
///
/// The limiter belongs to a single fetcher. Every request it sends calls
/// [`RateLimiter::wait`] before going out and [`RateLimiter::finish`] once
/// the response has been read, so the delay is measured from the end of
/// one request to the start of the next.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter; the first `wait` never blocks
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleeps until at least `delay` has passed since the previous call ended
    pub async fn wait(&mut self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.delay {
                let remaining = self.delay - elapsed;
                tracing::trace!("Rate limiting: sleeping {:?}", remaining);
                tokio::time::sleep(remaining).await;
            }
        }
        self.last_call = Some(Instant::now());
    }

    /// Marks the end of the current call
    pub fn finish(&mut self) {
        self.last_call = Some(Instant::now());
    }
}
