use chrono::{TimeDelta, TimeZone, Utc};

use research_relay::domain::RateLimitWindow;

#[test]
fn given_open_window_when_admitting_past_limit_then_rejects() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut window = RateLimitWindow::new("perplexity", 2, TimeDelta::seconds(60), start);

    assert!(window.try_admit(start));
    assert!(window.try_admit(start + TimeDelta::seconds(1)));
    assert!(!window.try_admit(start + TimeDelta::seconds(2)));
    assert_eq!(window.count, 2);
    assert_eq!(window.remaining(), 0);
}

#[test]
fn given_exhausted_window_when_duration_elapses_then_resets_lazily() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut window = RateLimitWindow::new("perplexity", 1, TimeDelta::seconds(60), start);
    assert!(window.try_admit(start));

    let boundary = start + TimeDelta::seconds(60);
    assert!(window.is_expired(boundary));
    assert!(window.try_admit(boundary));
    assert_eq!(window.window_start, boundary);
    assert_eq!(window.count, 1);
}

#[test]
fn given_window_when_reading_end_then_adds_duration_to_start() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let window = RateLimitWindow::new("k", 1, TimeDelta::milliseconds(1500), start);

    assert_eq!(window.window_end(), start + TimeDelta::milliseconds(1500));
    assert!(!window.is_expired(start + TimeDelta::milliseconds(1499)));
}
