// src/services/renderer.rs

//! Feed rendering.
//!
//! The template is an RSS 2.0 channel skeleton: everything that describes the
//! podcast (title, description, artwork, iTunes fields) lives in the template,
//! while the renderer fills in the self link and one item per talk.

use std::path::Path;

use rss::extension::atom::{AtomExtension, Link};
use rss::{Channel, Enclosure, Guid, Item};

use crate::error::{AppError, Result};
use crate::models::{FeedContext, TalkRecord};

const AUDIO_MIME: &str = "audio/mpeg";
const RSS_MIME: &str = "application/rss+xml";

/// Parsed channel skeleton.
#[derive(Debug, Clone)]
pub struct FeedTemplate {
    channel: Channel,
}

impl FeedTemplate {
    /// Read and parse a template file.
    pub async fn load(path: &Path) -> Result<Self> {
        let xml = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::render(format!("cannot read template {}: {}", path.display(), e))
        })?;
        Self::parse(&xml)
    }

    /// Parse template XML and check the channel fields RSS 2.0 requires.
    pub fn parse(xml: &str) -> Result<Self> {
        let channel = Channel::read_from(xml.as_bytes())
            .map_err(|e| AppError::render(format!("invalid template: {e}")))?;

        let required = [
            ("title", channel.title()),
            ("link", channel.link()),
            ("description", channel.description()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::render(format!(
                "template is missing required channel field <{field}>"
            )));
        }

        Ok(Self { channel })
    }

    pub fn title(&self) -> &str {
        self.channel.title()
    }
}

/// Render the feed document.
pub fn render(context: FeedContext, template: &FeedTemplate) -> Result<Vec<u8>> {
    let mut channel = template.channel.clone();

    channel.set_last_build_date(
        context
            .talks
            .iter()
            .max_by_key(|talk| talk.air_date)
            .map(|talk| talk.pub_date.clone()),
    );
    channel.set_atom_ext(AtomExtension {
        links: vec![Link {
            href: context.feed_url.to_string(),
            rel: "self".to_string(),
            mime_type: Some(RSS_MIME.to_string()),
            ..Default::default()
        }],
    });
    channel.set_items(context.talks.into_iter().map(item).collect::<Vec<_>>());

    let output = if context.options.pretty {
        channel.pretty_write_to(Vec::new(), b' ', 2)
    } else {
        channel.write_to(Vec::new())
    };
    output.map_err(|e| AppError::render(format!("failed to write feed: {e}")))
}

fn item(talk: TalkRecord) -> Item {
    let enclosure = Enclosure {
        url: talk.enclosure_url.clone(),
        length: "0".to_string(),
        mime_type: AUDIO_MIME.to_string(),
    };

    Item {
        title: Some(talk.title),
        link: Some(talk.enclosure_url.clone()),
        pub_date: Some(talk.pub_date),
        guid: Some(Guid {
            value: talk.enclosure_url,
            permalink: true,
        }),
        enclosure: Some(enclosure),
        ..Default::default()
    }
}
