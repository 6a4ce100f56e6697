use chrono::{DateTime, NaiveDate, Utc};

use crate::model::ticket::NormalizedTicket;

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Oldest first. Equal timestamps keep fetch order; tickets whose creation time
/// doesn't parse go last, also in fetch order.
pub fn sort_by_created(tickets: &mut [NormalizedTicket]) {
    tickets.sort_by_cached_key(|t| match parse_timestamp(&t.created_at) {
        Some(ts) => (false, Some(ts)),
        None => (true, None),
    });
}
