//! Service layer for the feed builder.
//!
//! This module contains the stage logic for:
//! - Page fetching (`HttpFetcher`, behind `PageSource`)
//! - Talk extraction (`TalkExtractor`)
//! - Feed rendering (`FeedTemplate`, `render`)

mod extractor;
mod fetcher;
mod renderer;

pub use extractor::{TalkExtractor, clean_title, parse_air_date};
pub use fetcher::{HttpFetcher, PageSource};
pub use renderer::{FeedTemplate, render};
