//! Configuration file: a `[DEFAULT]` table plus one table per vote target.
//!
//! Loaded once by the entry point from `~/.config/voter/config.toml` (or an
//! explicit path) and resolved into an immutable `VoteConfig` for one target.

mod resolve;

pub use resolve::{resolve, ConfigError, VoteConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Section whose values every target inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Header names a section may set. Any other extra key is rejected.
pub const HEADER_ALLOW_LIST: [&str; 9] = [
    "Content-Type",
    "Referer",
    "X-Requested-With",
    "Host",
    "Origin",
    "DNT",
    "User-Agent",
    "Accept",
    "Cookie",
];

/// One table of the config file. Every key is optional so that a target can
/// inherit from `[DEFAULT]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Vote endpoint with a `{number}` placeholder for the identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Page showing the vote counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_url: Option<String>,
    /// Page carrying the one-time identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_regex: Option<String>,
    /// Seconds between votes in watch mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_method: Option<String>,
    /// Semicolon-separated extension names, applied in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_data: Option<String>,
    #[serde(
        rename = "Encoding",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encoding: Option<String>,
    /// Seconds to wait when the identifier is gone from the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_voted_backoff: Option<f64>,
    /// Attempts per page fetch before giving up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_tries: Option<u32>,
    /// Remaining string keys; validated against `HEADER_ALLOW_LIST`.
    #[serde(flatten)]
    pub headers: BTreeMap<String, String>,
}

impl SectionConfig {
    /// `self` layered over `base`: keys set here win, the rest come from `base`.
    pub fn overlay(&self, base: &SectionConfig) -> SectionConfig {
        fn pick<T: Clone>(top: &Option<T>, bottom: &Option<T>) -> Option<T> {
            top.clone().or_else(|| bottom.clone())
        }
        // Header names compare case-insensitively, so `user-agent` here
        // replaces `User-Agent` from `base`.
        let mut headers: BTreeMap<String, String> = base
            .headers
            .iter()
            .filter(|(name, _)| !self.headers.keys().any(|k| k.eq_ignore_ascii_case(name)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.extend(self.headers.clone());
        SectionConfig {
            base_url: pick(&self.base_url, &base.base_url),
            count_url: pick(&self.count_url, &base.count_url),
            id_url: pick(&self.id_url, &base.id_url),
            vote_count_regex: pick(&self.vote_count_regex, &base.vote_count_regex),
            id_regex: pick(&self.id_regex, &base.id_regex),
            vote_interval: pick(&self.vote_interval, &base.vote_interval),
            request_method: pick(&self.request_method, &base.request_method),
            extensions: pick(&self.extensions, &base.extensions),
            request_data: pick(&self.request_data, &base.request_data),
            encoding: pick(&self.encoding, &base.encoding),
            already_voted_backoff: pick(&self.already_voted_backoff, &base.already_voted_backoff),
            fetch_tries: pick(&self.fetch_tries, &base.fetch_tries),
            headers,
        }
    }
}

/// The whole file: section name to section.
pub type ConfigFile = BTreeMap<String, SectionConfig>;

/// File written on first run: only a `[DEFAULT]` table with the pacing defaults.
pub fn default_file() -> ConfigFile {
    let mut file = ConfigFile::new();
    file.insert(
        DEFAULT_SECTION.to_string(),
        SectionConfig {
            vote_interval: Some(3660.0),
            request_method: Some("GET".to_string()),
            extensions: Some(String::new()),
            encoding: Some("utf-8".to_string()),
            already_voted_backoff: Some(600.0),
            fetch_tries: Some(3),
            ..SectionConfig::default()
        },
    );
    file
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("voter")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn parse(text: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(text)?)
}

/// Load configuration from `path` (or the XDG default), creating a default
/// file if none exists.
pub fn load_or_init(path: Option<&Path>) -> Result<ConfigFile> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        let default_cfg = default_file();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)
            .with_context(|| format!("write default config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config: {}", path.display()))?;
    parse(&data).with_context(|| format!("parse config: {}", path.display()))
}
