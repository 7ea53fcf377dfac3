//! Render-time feed aggregate.

use url::Url;

use super::TalkRecord;

/// Options that change the shape of the output, not its content.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub pretty: bool,
}

/// Everything the renderer needs for one run.
///
/// Built once per run and handed to the renderer by value.
#[derive(Debug, Clone)]
pub struct FeedContext {
    pub feed_url: Url,
    pub talks: Vec<TalkRecord>,
    pub options: RenderOptions,
}

impl FeedContext {
    pub fn new(feed_url: Url, talks: Vec<TalkRecord>, options: RenderOptions) -> Self {
        Self {
            feed_url,
            talks,
            options,
        }
    }
}
