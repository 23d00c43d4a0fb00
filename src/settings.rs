use std::time::Duration;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, Map};
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_SCRAPE_DELAY_MS: u64 = 1500;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Plain env vars consulted when `RADAR_API_KEY` is unset, in order.
const FALLBACK_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub scrape_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Settings {
    /// Defaults, overridden by `RADAR_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::vars().collect())
    }

    fn load_from(env: Map<String, String>) -> Result<Self> {
        let source = Environment::with_prefix("RADAR")
            .try_parsing(true)
            .source(Some(env.clone()));
        let mut settings = Self::build(Config::builder().add_source(source))?;
        settings.api_key = resolve_api_key(settings.api_key, |var| env.get(var).cloned());
        Ok(settings)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .set_default("model", DEFAULT_MODEL)?
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("scrape_delay_ms", DEFAULT_SCRAPE_DELAY_MS)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn scrape_delay(&self) -> Duration {
        Duration::from_millis(self.scrape_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// First non-blank key among the configured one and the fallback vars.
fn resolve_api_key(
    configured: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    normalize_key(configured)
        .or_else(|| FALLBACK_KEY_VARS.iter().find_map(|var| normalize_key(lookup(var))))
}

/// Blank keys are treated as missing.
fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_json(json: &str) -> Settings {
        Settings::build(Config::builder().add_source(File::from_str(json, FileFormat::Json)))
            .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let s = from_json("{}");
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(s.scrape_delay(), Duration::from_millis(1500));
        assert_eq!(s.timeout(), Duration::from_secs(60));
        assert!(s.api_key.is_none());
    }

    #[test]
    fn sources_override_defaults() {
        let s = from_json(r#"{"model": "gemini-pro", "scrape_delay_ms": 0, "api_key": "k"}"#);
        assert_eq!(s.model, "gemini-pro");
        assert_eq!(s.scrape_delay_ms, 0);
        assert_eq!(s.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn blank_key_is_missing() {
        assert_eq!(normalize_key(Some("   ".into())), None);
        assert_eq!(normalize_key(Some("".into())), None);
        assert_eq!(normalize_key(Some(" abc ".into())).as_deref(), Some("abc"));
        assert_eq!(normalize_key(None), None);
    }

    fn env(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn blank_radar_key_falls_through_to_gemini_key() {
        let s = Settings::load_from(env(&[
            ("RADAR_API_KEY", "   "),
            ("GEMINI_API_KEY", "real-key"),
        ]))
        .unwrap();
        assert_eq!(s.api_key.as_deref(), Some("real-key"));
    }

    #[test]
    fn blank_gemini_key_falls_through_to_api_key() {
        let s = Settings::load_from(env(&[("GEMINI_API_KEY", ""), ("API_KEY", "second")])).unwrap();
        assert_eq!(s.api_key.as_deref(), Some("second"));
    }

    #[test]
    fn radar_key_wins_over_fallbacks() {
        let s = Settings::load_from(env(&[
            ("RADAR_API_KEY", " primary "),
            ("GEMINI_API_KEY", "other"),
            ("API_KEY", "third"),
        ]))
        .unwrap();
        assert_eq!(s.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn all_blank_keys_mean_no_key() {
        let s = Settings::load_from(env(&[
            ("RADAR_API_KEY", " "),
            ("GEMINI_API_KEY", ""),
            ("API_KEY", "\t"),
        ]))
        .unwrap();
        assert!(s.api_key.is_none());
    }

    #[test]
    fn radar_env_overrides_defaults() {
        let s = Settings::load_from(env(&[
            ("RADAR_MODEL", "gemini-pro"),
            ("RADAR_SCRAPE_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(s.model, "gemini-pro");
        assert_eq!(s.scrape_delay_ms, 0);
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn resolve_prefers_first_non_blank() {
        let lookup = |var: &str| match var {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "API_KEY" => Some("k".to_string()),
            _ => None,
        };
        assert_eq!(resolve_api_key(None, lookup).as_deref(), Some("k"));
        assert_eq!(resolve_api_key(Some("".into()), lookup).as_deref(), Some("k"));
        assert_eq!(resolve_api_key(Some("x".into()), lookup).as_deref(), Some("x"));
        assert_eq!(resolve_api_key(None, |_| None), None);
    }
}
