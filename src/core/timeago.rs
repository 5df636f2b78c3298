//! Coarse relative-age labels ("just now", "5m ago", "2d ago").
//!
//! Pure function of two timestamps so tests can pin `now`. Units floor at
//! each threshold: 60s, 60m, 24h, 7d, 30d, 365d.

use chrono::{DateTime, Utc};

/// Formats how long ago `ts` was relative to `now`.
///
/// Timestamps in the future (clock skew between client and backend) render
/// as "just now" rather than a negative age.
pub fn relative_age(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - ts).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }
    if days < 30 {
        return format!("{}w ago", days / 7);
    }
    if days < 365 {
        return format!("{}mo ago", days / 30);
    }
    format!("{}y ago", days / 365)
}
