use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;
use wordcount_core::CoreError;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub time_window: Duration,
    /// Tokens available at once; also the cap on requests in flight.
    pub burst_allowance: u32,
}

impl RateLimitConfig {
    pub fn reddit_oauth() -> Self {
        Self {
            max_requests: 100, // Reddit allows 100 requests per minute for OAuth2
            time_window: Duration::from_secs(60),
            burst_allowance: 10,
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    pub fn new(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_allowance as f64;
        let refill_rate = config.max_requests as f64 / config.time_window.as_secs_f64();

        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate,
        }
    }

    /// Takes `tokens_needed` tokens, or returns how long to wait for them.
    pub async fn acquire(&self, tokens_needed: f64) -> Result<(), Duration> {
        let mut state = self.state.lock().await;
        self.refill(&mut state);

        if state.tokens >= tokens_needed {
            state.tokens -= tokens_needed;
            Ok(())
        } else {
            let missing = tokens_needed - state.tokens;
            Err(Duration::from_secs_f64(missing / self.refill_rate))
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        state.tokens = (state.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        state.last_refill = now;
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    token_bucket: TokenBucket,
    semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            token_bucket: TokenBucket::new(&config),
            semaphore: Arc::new(Semaphore::new(config.burst_allowance as usize)),
        }
    }

    /// Waits for a free request slot and a token. The slot is held until the
    /// permit is dropped.
    pub async fn acquire_permit(&self) -> Result<RateLimitPermit, CoreError> {
        let start_time = Instant::now();
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CoreError::Internal {
                message: "rate limiter closed".to_string(),
            })?;

        loop {
            match self.token_bucket.acquire(1.0).await {
                Ok(()) => break,
                Err(wait_time) => {
                    tracing::debug!("Rate limit reached, waiting {:?}", wait_time);
                    sleep(wait_time).await;
                }
            }
        }

        Ok(RateLimitPermit {
            _permit: permit,
            queue_wait_time: start_time.elapsed(),
        })
    }
}

#[derive(Debug)]
pub struct RateLimitPermit {
    _permit: OwnedSemaphorePermit,
    pub queue_wait_time: Duration,
}
