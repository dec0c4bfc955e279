//! Relative "last activity" text

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp as reported by Azure and describe it
/// relative to `now`. Unparseable input yields an empty string.
pub fn relative_text(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    timestamp
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| ago(t.with_timezone(&Utc), now))
        .unwrap_or_default()
}

/// Elapsed time is rounded to the nearest second, then floored into its
/// bucket.
pub fn ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (now - then).num_milliseconds();
    if millis < 0 {
        return "just now".to_string();
    }
    let secs = (millis + 500) / 1_000;
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        86_400..=2_591_999 => format!("{}d ago", secs / 86_400),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}
