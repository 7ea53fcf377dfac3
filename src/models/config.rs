//! Application configuration structures.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// One snapshot is taken per process and shared read-only between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Deployment environment; gates the remote upload
    #[serde(default)]
    pub environment: Environment,

    /// Listing page and link conventions
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Change detection settings
    #[serde(default)]
    pub checksum: ChecksumConfig,

    /// Template, output and public URL settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Remote object store settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Interval trigger settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = self.source.base_url()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "source.base_url must be http(s), got {}",
                base.scheme()
            )));
        }
        if self.source.talks_path.trim().is_empty() {
            return Err(AppError::validation("source.talks_path is empty"));
        }
        Selector::parse(&self.source.list_selector)
            .map_err(|e| AppError::selector(&self.source.list_selector, format!("{e:?}")))?;
        if self.source.audio_extension.is_empty() {
            return Err(AppError::validation("source.audio_extension is empty"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::validation("schedule.interval_secs must be > 0"));
        }
        self.feed.feed_url()?;
        if self.remote.enabled && self.remote.bucket.trim().is_empty() {
            return Err(AppError::validation(
                "remote.bucket is required when remote.enabled = true",
            ));
        }
        Ok(())
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Only production uploads to the remote sink.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::config(format!("Unknown environment '{other}'"))),
        }
    }
}

/// Source listing page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Scheme and host of the talk archive; enclosure URLs are joined onto it
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the listing page on that host
    #[serde(default = "defaults::talks_path")]
    pub talks_path: String,

    /// CSS selector for the talk links
    #[serde(default = "defaults::list_selector")]
    pub list_selector: String,

    /// Case-sensitive suffix a link must end with to count as a talk
    #[serde(default = "defaults::audio_extension")]
    pub audio_extension: String,
}

impl SourceConfig {
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Fully qualified URL of the listing page.
    pub fn listing_url(&self) -> Result<Url> {
        Ok(self.base_url()?.join(&self.talks_path)?)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            talks_path: defaults::talks_path(),
            list_selector: defaults::list_selector(),
            audio_extension: defaults::audio_extension(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// When false, a redirect surfaces as a non-200 status
    #[serde(default = "defaults::follow_redirects")]
    pub follow_redirects: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            follow_redirects: defaults::follow_redirects(),
        }
    }
}

/// When a changed checksum is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Persist as soon as a change is observed, before extraction.
    OnChange,
    /// Persist only once the feed file has been written.
    #[default]
    AfterPublish,
}

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumConfig {
    /// File holding the checksum of the last processed page
    #[serde(default = "defaults::checksum_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub commit: CommitPolicy,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            path: defaults::checksum_path(),
            commit: CommitPolicy::default(),
        }
    }
}

/// Feed rendering and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS channel skeleton the items are rendered into
    #[serde(default = "defaults::template_path")]
    pub template_path: PathBuf,

    /// Where the rendered feed is written
    #[serde(default = "defaults::output_path")]
    pub output_path: PathBuf,

    /// Public host the feed is served from
    #[serde(default = "defaults::public_base_url")]
    pub public_base_url: String,

    /// Public directory of the feed file on that host
    #[serde(default = "defaults::public_path")]
    pub public_path: String,

    /// Indent the XML output
    #[serde(default = "defaults::pretty")]
    pub pretty: bool,
}

impl FeedConfig {
    /// File name of the rendered feed, shared by the public URL and the remote key.
    pub fn file_name(&self) -> Result<String> {
        self.output_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::config(format!(
                    "feed.output_path has no file name: {}",
                    self.output_path.display()
                ))
            })
    }

    /// Public URL subscribers use for the feed.
    pub fn feed_url(&self) -> Result<Url> {
        let base = Url::parse(&self.public_base_url)?;
        let dir = self.public_path.trim_matches('/');
        let path = if dir.is_empty() {
            format!("/{}", self.file_name()?)
        } else {
            format!("/{}/{}", dir, self.file_name()?)
        };
        Ok(base.join(&path)?)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            template_path: defaults::template_path(),
            output_path: defaults::output_path(),
            public_base_url: defaults::public_base_url(),
            public_path: defaults::public_path(),
            pretty: defaults::pretty(),
        }
    }
}

/// Remote object store settings. Credentials come from the AWS provider chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub bucket: String,

    /// Key prefix; the object key is `{prefix}/{file name}`
    #[serde(default = "defaults::remote_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub region: Option<String>,
}

impl RemoteConfig {
    /// Object key for a file under the configured prefix.
    pub fn object_key(&self, file_name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket: String::new(),
            prefix: defaults::remote_prefix(),
            region: None,
        }
    }
}

/// Interval trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between runs
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Fire once at startup instead of waiting a full interval
    #[serde(default = "defaults::run_immediately")]
    pub run_immediately: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            run_immediately: defaults::run_immediately(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "http://www.dhammatalks.org".into()
    }
    pub fn talks_path() -> String {
        "/mp3_index.html".into()
    }
    pub fn list_selector() -> String {
        "a[href]".into()
    }
    pub fn audio_extension() -> String {
        "mp3".into()
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; talkfeed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn follow_redirects() -> bool {
        true
    }

    // Storage defaults
    pub fn checksum_path() -> PathBuf {
        PathBuf::from("data/checksum.txt")
    }
    pub fn template_path() -> PathBuf {
        PathBuf::from("assets/feed.xml")
    }
    pub fn output_path() -> PathBuf {
        PathBuf::from("data/output/evening_talks.xml")
    }

    // Feed defaults
    pub fn public_base_url() -> String {
        "http://localhost:8080".into()
    }
    pub fn public_path() -> String {
        "/podcasts".into()
    }
    pub fn pretty() -> bool {
        true
    }
    pub fn remote_prefix() -> String {
        "podcasts".into()
    }

    // Schedule defaults
    pub fn interval() -> u64 {
        6 * 60 * 60
    }
    pub fn run_immediately() -> bool {
        true
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
