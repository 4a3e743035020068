use async_trait::async_trait;
use chrono::{ DateTime, Duration, Utc };
use log::debug;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Gate consulted once per request. Kept behind a trait so a multi-instance
/// deployment can back it with a shared store without touching call sites.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn allow(&self, key: &str) -> bool;
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Fixed-window counter per client key, held in process memory.
///
/// State does not survive a restart. That is the deployment tradeoff for a
/// single ephemeral process, not something this type tries to hide.
pub struct FixedWindowLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    cap: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(cap: u32, window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            cap,
            window,
        }
    }

    /// Same decision as [`RateLimiter::allow`] but with the clock supplied,
    /// so window expiry is testable without waiting.
    pub async fn check_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock().await;

        match entries.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.cap {
                    debug!("rate limit hit for {} ({}/{})", key, entry.count, self.cap);
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                entries.insert(key.to_string(), RateLimitEntry {
                    count: 1,
                    reset_at: now + self.window,
                });
                true
            }
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn allow(&self, key: &str) -> bool {
        self.check_at(key, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn denies_the_request_past_the_cap() {
        let limiter = FixedWindowLimiter::new(30, Duration::hours(1));
        let now = Utc::now();
        for _ in 0..30 {
            assert!(limiter.check_at("1.2.3.4", now).await);
        }
        assert!(!limiter.check_at("1.2.3.4", now).await);
    }

    #[tokio::test]
    async fn denial_does_not_mutate_state() {
        let limiter = FixedWindowLimiter::new(2, Duration::hours(1));
        let now = Utc::now();
        assert!(limiter.check_at("k", now).await);
        assert!(limiter.check_at("k", now).await);
        // repeated denials stay denials, and the window is unchanged
        assert!(!limiter.check_at("k", now).await);
        assert!(!limiter.check_at("k", now).await);
        assert!(limiter.check_at("k", now + Duration::hours(1) + Duration::seconds(1)).await);
    }

    #[tokio::test]
    async fn window_expiry_resets_the_counter_to_one() {
        let limiter = FixedWindowLimiter::new(2, Duration::hours(1));
        let now = Utc::now();
        assert!(limiter.check_at("k", now).await);
        assert!(limiter.check_at("k", now).await);
        assert!(!limiter.check_at("k", now).await);

        let later = now + Duration::hours(1) + Duration::seconds(1);
        assert!(limiter.check_at("k", later).await);
        // the reset counter starts at 1, so one more fits before the cap
        assert!(limiter.check_at("k", later).await);
        assert!(!limiter.check_at("k", later).await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = FixedWindowLimiter::new(1, Duration::hours(1));
        let now = Utc::now();
        assert!(limiter.check_at("a", now).await);
        assert!(!limiter.check_at("a", now).await);
        assert!(limiter.check_at("b", now).await);
    }
}
