// src/services/extractor.rs

//! Talk extraction from the listing page.
//!
//! The archive encodes each talk's air date in its URL path:
//!
//! ```text
//! /talks/y2023/m0315/Some_Talk.mp3
//!        │     │└┴┴┴─ month 03, day 15
//!        │     └───── prefix: letters, or the two-digit year (230315_...)
//!        └─────────── 'y' + four-digit year
//! ```
//!
//! The day is optional and defaults to the 1st of the month.

use std::sync::LazyLock;

use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Extraction, SourceConfig, TalkRecord};
use crate::utils::date::podcast_date;
use crate::utils::{path_segments, resolve_url};

/// Ordinal or date prefix some titles carry, e.g. `3.2 `, `14 `, `3. `.
static TITLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d*\.)?\d+\.?\s+").expect("valid title prefix regex"));

/// Turns listing markup into talk records.
#[derive(Debug, Clone)]
pub struct TalkExtractor {
    selector: Selector,
    base_url: Url,
    audio_extension: String,
}

impl TalkExtractor {
    /// Create an extractor for the configured host, selector and extension.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            selector: Self::parse_selector(&config.list_selector)?,
            base_url: config.base_url()?,
            audio_extension: config.audio_extension.clone(),
        })
    }

    /// Extract talks in page order.
    ///
    /// Links that are not audio files are dropped silently. Audio links whose
    /// path does not carry a usable date are logged and counted as skipped.
    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();

        for link in document.select(&self.selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !href.ends_with(&self.audio_extension) {
                continue;
            }

            match self.parse_talk(&link, href) {
                Ok(talk) => extraction.talks.push(talk),
                Err(e) => {
                    log::warn!("Skipping talk link: {}", e);
                    extraction.skipped += 1;
                }
            }
        }

        log::info!(
            "Talks processed: {} ({} skipped)",
            extraction.talks.len(),
            extraction.skipped
        );
        extraction
    }

    fn parse_talk(&self, link: &ElementRef, href: &str) -> Result<TalkRecord> {
        let enclosure =
            resolve_url(&self.base_url, href).map_err(|e| AppError::extraction(href, e))?;
        let air_date =
            parse_air_date(&path_segments(&enclosure)).map_err(|e| AppError::extraction(href, e))?;

        let text: String = link.text().collect();
        let title = match clean_title(&text) {
            title if title.is_empty() => title_from_path(&enclosure),
            title => title,
        };

        Ok(TalkRecord {
            title,
            enclosure_url: enclosure.to_string(),
            air_date,
            pub_date: podcast_date(air_date),
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Infer the air date from path segments (leading separator already removed).
pub fn parse_air_date(segments: &[&str]) -> std::result::Result<NaiveDate, String> {
    if segments.len() < 3 {
        return Err(format!(
            "expected at least 3 path segments, found {}",
            segments.len()
        ));
    }

    let year = parse_year(segments[1])?;
    let (month, day) = parse_month_day(segments[2])?;

    NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1))
        .ok_or_else(|| format!("no such date {year}-{month:02}-{:02}", day.unwrap_or(1)))
}

/// One-letter prefix followed by a four-digit year, e.g. `y2023`.
fn parse_year(segment: &str) -> std::result::Result<i32, String> {
    segment
        .get(1..5)
        .filter(|digits| is_digits(digits))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| format!("no year in segment '{segment}'"))
}

/// Prefix, two-digit month, optional two-digit day.
fn parse_month_day(segment: &str) -> std::result::Result<(u32, Option<u32>), String> {
    let rest = match segment.find(|c: char| !c.is_ascii_alphabetic()) {
        // Two-digit year-of-century prefix, e.g. `230315_Title.mp3`
        Some(0) => segment.get(2..).unwrap_or(""),
        Some(start) => &segment[start..],
        None => "",
    };

    let month = rest
        .get(0..2)
        .filter(|digits| is_digits(digits))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| format!("no month in segment '{segment}'"))?;
    let day = rest
        .get(2..4)
        .filter(|digits| is_digits(digits))
        .and_then(|digits| digits.parse().ok());

    Ok((month, day))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Trim link text and drop a leading numeric prefix.
pub fn clean_title(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match TITLE_PREFIX.find(&normalized) {
        Some(prefix) => normalized[prefix.end()..].trim().to_string(),
        None => normalized,
    }
}

/// Fallback title for links without text: the decoded file stem with
/// underscores as spaces.
fn title_from_path(url: &Url) -> String {
    let file = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    percent_decode_str(stem)
        .decode_utf8_lossy()
        .replace('_', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TalkExtractor {
        let config = SourceConfig {
            base_url: "http://talks.example.org".into(),
            list_selector: "ul.talks a".into(),
            ..SourceConfig::default()
        };
        TalkExtractor::new(&config).unwrap()
    }

    fn page(links: &str) -> String {
        format!("<html><body><ul class=\"talks\">{links}</ul><a href=\"/outside/y2020/m0101/x.mp3\">outside</a></body></html>")
    }

    #[test]
    fn test_extracts_dated_talk() {
        let html = page(r#"<li><a href="/talks/y2023/m0315/Some_Talk.mp3">3. Some Title</a></li>"#);
        let extraction = extractor().extract(&html);

        assert_eq!(extraction.len(), 1);
        let talk = &extraction.talks[0];
        assert_eq!(talk.title, "Some Title");
        assert_eq!(
            talk.enclosure_url,
            "http://talks.example.org/talks/y2023/m0315/Some_Talk.mp3"
        );
        assert_eq!(talk.air_date, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        assert_eq!(talk.pub_date, "Wed, 15 Mar 2023 18:00:00 -0800");
    }

    #[test]
    fn test_missing_day_defaults_to_first() {
        let html = page(r#"<li><a href="/talks/y2023/m03/Talk.mp3">Talk</a></li>"#);
        let extraction = extractor().extract(&html);

        assert_eq!(
            extraction.talks[0].air_date,
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
        assert_eq!(extraction.talks[0].pub_date, "Wed, 1 Mar 2023 18:00:00 -0800");
    }

    #[test]
    fn test_year_of_century_prefix() {
        let html = page(r#"<li><a href="/Archive/y2019/190412_Right_Effort.mp3">Right Effort</a></li>"#);
        let extraction = extractor().extract(&html);

        assert_eq!(
            extraction.talks[0].air_date,
            NaiveDate::from_ymd_opt(2019, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_non_audio_links_dropped() {
        let html = page(
            r#"<li><a href="/talks/y2023/m0315/Notes.pdf">Notes</a></li>
               <li><a href="/talks/y2023/m0315/Loud.MP3">Loud</a></li>
               <li><a>No link</a></li>"#,
        );
        let extraction = extractor().extract(&html);

        assert!(extraction.is_empty());
        assert_eq!(extraction.skipped, 0);
    }

    #[test]
    fn test_malformed_links_skipped() {
        let html = page(
            r#"<li><a href="/short.mp3">Too short</a></li>
               <li><a href="/talks/yABCD/m0315/a.mp3">Bad year</a></li>
               <li><a href="/talks/y2023/mXX/a.mp3">Bad month</a></li>
               <li><a href="/talks/y2023/m1301/a.mp3">Month 13</a></li>
               <li><a href="/talks/y2023/m0230/a.mp3">Feb 30</a></li>
               <li><a href="/talks/y2023/m0401/Good.mp3">Good</a></li>"#,
        );
        let extraction = extractor().extract(&html);

        assert_eq!(extraction.skipped, 5);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.talks[0].title, "Good");
    }

    #[test]
    fn test_preserves_page_order() {
        let html = page(
            r#"<li><a href="/talks/y2021/m0101/a.mp3">First</a></li>
               <li><a href="/talks/y2023/m0101/b.mp3">Second</a></li>
               <li><a href="/talks/y2022/m0101/c.mp3">Third</a></li>"#,
        );
        let titles: Vec<_> = extractor()
            .extract(&html)
            .talks
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_relative_href_and_escaping() {
        let html = page(r#"<li><a href="talks/y2023/m0315/Some Talk.mp3">Some Talk</a></li>"#);
        let extraction = extractor().extract(&html);

        assert_eq!(
            extraction.talks[0].enclosure_url,
            "http://talks.example.org/talks/y2023/m0315/Some%20Talk.mp3"
        );
    }

    #[test]
    fn test_empty_text_falls_back_to_file_name() {
        let html = page(r#"<li><a href="/talks/y2023/m0315/Some_Talk.mp3">  </a></li>"#);
        let extraction = extractor().extract(&html);

        assert_eq!(extraction.talks[0].title, "Some Talk");
    }

    #[test]
    fn test_fallback_title_is_decoded() {
        let html = page(
            r#"<li><a href="/talks/y2023/m0315/Ajahn%27s_Caf%C3%A9 Talk.mp3"></a></li>"#,
        );
        let extraction = extractor().extract(&html);

        assert_eq!(extraction.talks[0].title, "Ajahn's Café Talk");
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  3. Some Title "), "Some Title");
        assert_eq!(clean_title("3.2 Right Speech"), "Right Speech");
        assert_eq!(clean_title("14 Metta"), "Metta");
        assert_eq!(clean_title("3D Printing"), "3D Printing");
        assert_eq!(clean_title("Plain\n   Title"), "Plain Title");
        assert_eq!(clean_title("2019"), "2019");
    }

    #[test]
    fn test_parse_air_date_segments() {
        assert_eq!(
            parse_air_date(&["talks", "y2010", "ab1231"]).unwrap(),
            NaiveDate::from_ymd_opt(2010, 12, 31).unwrap()
        );
        assert!(parse_air_date(&["talks", "y2010"]).is_err());
        assert!(parse_air_date(&["talks", "2010", "m0101"]).is_err());
        assert!(parse_air_date(&["talks", "y2010", "letters"]).is_err());
    }

    #[test]
    fn test_invalid_selector() {
        let config = SourceConfig {
            list_selector: "[[invalid".into(),
            ..SourceConfig::default()
        };
        assert!(matches!(
            TalkExtractor::new(&config),
            Err(AppError::Selector { .. })
        ));
    }
}
