// src/config.rs

//! Configuration loading utilities.
//!
//! A config file holds an `[all]` table shared by every environment plus one
//! table per environment:
//!
//! ```toml
//! [all.source]
//! base_url = "http://www.dhammatalks.org"
//!
//! [production.remote]
//! enabled = true
//! bucket = "feeds"
//! ```
//!
//! The effective configuration is `[all]` with the selected environment's
//! table merged on top. A file without either table is read as a flat config.

use std::path::Path;

use toml::Value;

use crate::error::{AppError, Result};
use crate::models::{Config, Environment};

/// Environment variable consulted when no environment is passed explicitly.
pub const ENV_VAR: &str = "TALKFEED_ENV";

/// Pick the environment from an explicit value, then `TALKFEED_ENV`, then development.
pub fn resolve_environment(explicit: Option<&str>) -> Result<Environment> {
    match explicit {
        Some(name) => name.parse(),
        None => match std::env::var(ENV_VAR) {
            Ok(name) if !name.trim().is_empty() => name.parse(),
            _ => Ok(Environment::Development),
        },
    }
}

/// Recursively merge `overlay` onto `base`, returning a new value.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            let mut merged = base_table.clone();
            for (key, overlay_value) in overlay_table {
                let value = match base_table.get(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Table(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Compute the effective config document for an environment.
pub fn effective_document(root: &Value, environment: Environment) -> Value {
    let shared = root.get("all");
    let specific = root.get(environment.as_str());

    match (shared, specific) {
        (None, None) => root.clone(),
        (Some(shared), None) => shared.clone(),
        (None, Some(specific)) => specific.clone(),
        (Some(shared), Some(specific)) => merge_values(shared, specific),
    }
}

/// Parse config text for an environment.
pub fn parse_config(content: &str, environment: Environment) -> Result<Config> {
    let root: Value = toml::from_str(content)?;
    if !root.is_table() {
        return Err(AppError::config("config root must be a table"));
    }

    let mut config: Config = effective_document(&root, environment).try_into()?;
    config.environment = environment;
    Ok(config)
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path, environment: Environment) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, environment)
}

/// Load configuration, falling back to defaults if loading fails.
pub fn load_or_default(path: &Path, environment: Environment) -> Config {
    load_config(path, environment).unwrap_or_else(|e| {
        log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
        Config {
            environment,
            ..Config::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommitPolicy;

    const LAYERED: &str = r#"
[all]
environment = "development"

[all.source]
base_url = "http://talks.example.org"
talks_path = "/evening.html"

[all.feed]
pretty = true
output_path = "out/evening.xml"

[development.feed]
pretty = false

[production.remote]
enabled = true
bucket = "feeds"

[production.checksum]
commit = "on_change"
"#;

    #[test]
    fn test_merge_overlay_scalar_wins() {
        let base: Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: Value = toml::from_str("b = 3").unwrap();

        let merged = merge_values(&base, &overlay);
        assert_eq!(merged.get("a").and_then(Value::as_integer), Some(1));
        assert_eq!(merged.get("b").and_then(Value::as_integer), Some(3));
    }

    #[test]
    fn test_merge_nested_tables() {
        let base: Value = toml::from_str("[t]\nx = 1\ny = 2").unwrap();
        let overlay: Value = toml::from_str("[t]\ny = 20\nz = 30").unwrap();

        let merged = merge_values(&base, &overlay);
        let table = merged.get("t").unwrap();
        assert_eq!(table.get("x").and_then(Value::as_integer), Some(1));
        assert_eq!(table.get("y").and_then(Value::as_integer), Some(20));
        assert_eq!(table.get("z").and_then(Value::as_integer), Some(30));
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let base: Value = toml::from_str("[t]\nx = 1").unwrap();
        let overlay: Value = toml::from_str("[t]\nx = 2").unwrap();
        let base_before = base.clone();
        let overlay_before = overlay.clone();

        let _ = merge_values(&base, &overlay);
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_merge_array_is_replaced() {
        let base: Value = toml::from_str("list = [1, 2, 3]").unwrap();
        let overlay: Value = toml::from_str("list = [9]").unwrap();

        let merged = merge_values(&base, &overlay);
        assert_eq!(merged.get("list").and_then(Value::as_array).map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_development_layer() {
        let config = parse_config(LAYERED, Environment::Development).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.source.base_url, "http://talks.example.org");
        assert!(!config.feed.pretty);
        assert!(!config.remote.enabled);
        assert_eq!(config.checksum.commit, CommitPolicy::AfterPublish);
    }

    #[test]
    fn test_parse_production_layer() {
        let config = parse_config(LAYERED, Environment::Production).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.feed.pretty);
        assert!(config.remote.enabled);
        assert_eq!(config.remote.bucket, "feeds");
        assert_eq!(config.checksum.commit, CommitPolicy::OnChange);
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let content = include_str!("../data/config.toml");
        for environment in [Environment::Development, Environment::Production] {
            let config = parse_config(content, environment).unwrap();
            config.validate().unwrap();
        }
        let production = parse_config(content, Environment::Production).unwrap();
        assert!(production.remote.enabled);
        assert!(!production.feed.pretty);
    }

    #[test]
    fn test_parse_flat_config() {
        let flat = "[source]\nlist_selector = \"ul.talks a\"";
        let config = parse_config(flat, Environment::Test).unwrap();
        assert_eq!(config.source.list_selector, "ul.talks a");
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = load_or_default(Path::new("/nonexistent/talkfeed.toml"), Environment::Test);
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.source.audio_extension, "mp3");
    }

    #[test]
    fn test_resolve_explicit_environment() {
        assert_eq!(
            resolve_environment(Some("production")).unwrap(),
            Environment::Production
        );
        assert!(resolve_environment(Some("nope")).is_err());
    }
}
