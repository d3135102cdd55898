use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// In-process sliding-window limiter keyed by client address.
///
/// State is per server instance and lost on restart.
pub struct IpRateLimiter {
    limit: u32,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl IpRateLimiter {
    /// `limit == 0` disables the limiter.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: DashMap::new(),
        }
    }

    /// Record a hit for `key`. Returns `Err(retry_after_secs)` when the key is
    /// already at the limit; rejected hits are not recorded.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        if self.limit == 0 {
            return Ok(());
        }

        let mut entry = self.hits.entry(key.to_string()).or_default();
        let hits = entry.value_mut();
        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() >= self.limit as usize {
            let retry_after = hits
                .front()
                .map(|oldest| {
                    let elapsed = now.saturating_duration_since(*oldest);
                    self.window.saturating_sub(elapsed).as_secs().max(1)
                })
                .unwrap_or(1);
            return Err(retry_after);
        }

        hits.push_back(now);
        Ok(())
    }

    /// Drop keys with no hits inside the window.
    pub fn prune(&self) {
        let now = Instant::now();
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
    }
}
