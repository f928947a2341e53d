use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Length of the chat/call window opened by a payment.
pub const ACCESS_WINDOW_HOURS: i64 = 24;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessWindow {
    pub active: bool,
    pub hours_remaining: f64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessWindow {
    pub fn closed() -> Self {
        Self {
            active: false,
            hours_remaining: 0.0,
            expires_at: None,
        }
    }
}

/// Decides whether a consultation currently grants chat/call access.
///
/// The window is anchored at `paid_at`. Entries paid without a confirm step
/// (older dummy-path rows) may lack it, in which case `added_at` is the
/// anchor. Elapsed time of exactly 24 hours is still inside the window. An
/// anchor later than `now` counts as zero elapsed.
pub fn evaluate(
    paid: bool,
    paid_at: Option<DateTime<Utc>>,
    added_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AccessWindow {
    if !paid {
        return AccessWindow::closed();
    }

    let anchor = paid_at.unwrap_or(added_at);
    let expires_at = anchor + Duration::hours(ACCESS_WINDOW_HOURS);

    let elapsed_ms = (now - anchor).num_milliseconds().max(0);
    let elapsed_hours = elapsed_ms as f64 / MILLIS_PER_HOUR;
    let window_hours = ACCESS_WINDOW_HOURS as f64;

    let active = elapsed_hours <= window_hours;
    let hours_remaining = round_to_tenth((window_hours - elapsed_hours).max(0.0));

    AccessWindow {
        active,
        hours_remaining,
        expires_at: Some(expires_at),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
