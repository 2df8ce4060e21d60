use chrono::{DateTime, Utc};

/// Wall-clock source, injected so window and job timestamps can be driven in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
