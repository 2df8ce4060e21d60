use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use crate::application::ports::Clock;
use crate::domain::RateLimitWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: u32,
    pub window: TimeDelta,
}

impl RateLimitRule {
    pub fn new(limit: u32, window: TimeDelta) -> Self {
        Self { limit, window }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limited: bool,
    /// End of the current window, only reported while limited.
    pub reset_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
    pub limit: u32,
}

/// Fixed-window admission control keyed by resource name.
///
/// Every operation runs inside one critical section, so check-and-increment
/// cannot interleave between concurrent callers.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    default_rule: RateLimitRule,
    overrides: HashMap<String, RateLimitRule>,
    max_keys: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(default_rule: RateLimitRule, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            default_rule,
            overrides: HashMap::new(),
            max_keys: None,
            clock,
        }
    }

    pub fn with_rule(mut self, key: impl Into<String>, rule: RateLimitRule) -> Self {
        self.overrides.insert(key.into(), rule);
        self
    }

    /// Caps the number of tracked keys; the least recently touched window is dropped first.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys.max(1));
        self
    }

    /// Reports whether `key` is limited without consuming a slot.
    pub fn check_limit(&self, key: &str) -> Result<RateLimitStatus, RateLimitError> {
        self.peek(key, |window| {
            if window.is_exhausted() {
                RateLimitStatus {
                    limited: true,
                    reset_time: Some(window.window_end()),
                }
            } else {
                RateLimitStatus {
                    limited: false,
                    reset_time: None,
                }
            }
        })
    }

    pub fn track_request(&self, key: &str) -> Result<bool, RateLimitError> {
        let admitted = self.with_window(key, |window, now| window.try_admit(now))?;
        if !admitted {
            tracing::debug!(key, "Rate limit reached");
        }
        Ok(admitted)
    }

    pub fn get_rate_limit_info(&self, key: &str) -> Result<RateLimitInfo, RateLimitError> {
        self.peek(key, |window| RateLimitInfo {
            remaining: window.remaining(),
            reset_time: window.window_end(),
            limit: window.limit,
        })
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn rule_for(&self, key: &str) -> RateLimitRule {
        self.overrides
            .get(key)
            .copied()
            .unwrap_or(self.default_rule)
    }

    /// Reads the window for `key` as it stands at `now`. Unknown or expired
    /// keys are reported as a fresh window; nothing is inserted or evicted.
    fn peek<T>(
        &self,
        key: &str,
        f: impl FnOnce(&RateLimitWindow) -> T,
    ) -> Result<T, RateLimitError> {
        if key.trim().is_empty() {
            return Err(RateLimitError::InvalidKey);
        }

        let now = self.clock.now();
        let windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match windows.get(key) {
            Some(window) if !window.is_expired(now) => Ok(f(window)),
            _ => {
                let rule = self.rule_for(key);
                Ok(f(&RateLimitWindow::new(key, rule.limit, rule.window, now)))
            }
        }
    }

    /// Only admission creates windows, so only admission can evict one.
    fn with_window<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut RateLimitWindow, DateTime<Utc>) -> T,
    ) -> Result<T, RateLimitError> {
        if key.trim().is_empty() {
            return Err(RateLimitError::InvalidKey);
        }

        let now = self.clock.now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !windows.contains_key(key) {
            if let Some(max_keys) = self.max_keys {
                while windows.len() >= max_keys {
                    let Some(oldest) = windows
                        .values()
                        .min_by_key(|w| w.last_access)
                        .map(|w| w.key.clone())
                    else {
                        break;
                    };
                    windows.remove(&oldest);
                    tracing::debug!(key = %oldest, "Evicted idle rate limit window");
                }
            }
        }

        let window = windows.entry(key.to_string()).or_insert_with(|| {
            let rule = self.rule_for(key);
            RateLimitWindow::new(key, rule.limit, rule.window, now)
        });
        window.refresh(now);
        Ok(f(window, now))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit key must not be empty")]
    InvalidKey,
}
