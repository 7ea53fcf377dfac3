//! Podcast date formatting.

use chrono::NaiveDate;

/// Every item is published at the same wall-clock time; only the date varies.
pub const PUBLISH_TIME: &str = "18:00:00 -0800";

/// Format a date the way feed readers expect `pubDate`,
/// e.g. `Wed, 15 Mar 2023 18:00:00 -0800`.
pub fn podcast_date(date: NaiveDate) -> String {
    format!("{} {}", date.format("%a, %-d %b %Y"), PUBLISH_TIME)
}
