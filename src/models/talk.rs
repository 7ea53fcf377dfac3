//! Talk record data structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One audio talk from the listing page, later one feed item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TalkRecord {
    /// Link text with any numeric prefix removed
    pub title: String,

    /// Fully qualified URL of the audio file
    pub enclosure_url: String,

    /// Air date inferred from the link path
    pub air_date: NaiveDate,

    /// `air_date` in the feed's fixed publish-time format
    pub pub_date: String,
}

/// Talks extracted from one listing page, in page order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub talks: Vec<TalkRecord>,

    /// Audio links dropped because their path did not carry a usable date
    pub skipped: usize,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.talks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.talks.is_empty()
    }
}
