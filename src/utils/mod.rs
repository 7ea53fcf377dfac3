//! Utility functions and helpers.

pub mod date;
pub mod http;
pub mod progress;

use url::Url;

use crate::error::Result;

/// Resolve a potentially relative URL against a base URL.
///
/// The result is percent-escaped by the `url` crate.
pub fn resolve_url(base: &Url, href: &str) -> Result<Url> {
    Ok(base.join(href)?)
}

/// Path segments of a URL with the single leading separator removed.
pub fn path_segments(url: &Url) -> Vec<&str> {
    let path = url.path();
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("http://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.mp3").unwrap().as_str(),
            "http://example.com/path/page.mp3"
        );
        assert_eq!(
            resolve_url(&base, "/root.mp3").unwrap().as_str(),
            "http://example.com/root.mp3"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x").unwrap().as_str(),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_resolve_url_escapes() {
        let base = Url::parse("http://example.com").unwrap();
        assert_eq!(
            resolve_url(&base, "/talks/y2023/Some Talk.mp3").unwrap().as_str(),
            "http://example.com/talks/y2023/Some%20Talk.mp3"
        );
    }

    #[test]
    fn test_path_segments() {
        let url = Url::parse("http://example.com/talks/y2023/m0315/a.mp3").unwrap();
        assert_eq!(path_segments(&url), vec!["talks", "y2023", "m0315", "a.mp3"]);
    }
}
