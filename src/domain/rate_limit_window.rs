use chrono::{DateTime, TimeDelta, Utc};

/// Fixed window of admitted requests for one resource key.
///
/// Expiry is evaluated lazily: whoever touches the window first after
/// `window_start + window_duration` resets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub key: String,
    pub count: u32,
    pub limit: u32,
    pub window_start: DateTime<Utc>,
    pub window_duration: TimeDelta,
    pub last_access: DateTime<Utc>,
}

impl RateLimitWindow {
    pub fn new(
        key: impl Into<String>,
        limit: u32,
        window_duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            count: 0,
            limit,
            window_start: now,
            window_duration,
            last_access: now,
        }
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_start + self.window_duration
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_end()
    }

    /// Resets the window if it expired and records the access.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        if self.is_expired(now) {
            self.count = 0;
            self.window_start = now;
        }
        self.last_access = now;
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    /// Check-and-increment. Must be called with exclusive access.
    pub fn try_admit(&mut self, now: DateTime<Utc>) -> bool {
        self.refresh(now);
        if self.is_exhausted() {
            return false;
        }
        self.count += 1;
        true
    }
}
