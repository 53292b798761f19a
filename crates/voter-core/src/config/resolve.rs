//! Resolve one target section (layered over `[DEFAULT]`) into a validated `VoteConfig`.

use super::{ConfigFile, SectionConfig, DEFAULT_SECTION, HEADER_ALLOW_LIST};
use crate::encoding::{Encoding, EncodingError};
use crate::extension::Headers;
use crate::pattern::{Pattern, PatternError};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no section `{0}` in config")]
    MissingSection(String),
    #[error("[{section}] is missing `{key}`")]
    MissingKey { section: String, key: &'static str },
    #[error("[{section}] has unknown key `{key}` (not a config key or allowed header)")]
    UnknownKey { section: String, key: String },
    #[error("[{section}] `{key}`: {source}")]
    Pattern {
        section: String,
        key: &'static str,
        #[source]
        source: PatternError,
    },
    #[error("[{section}] `{key}` is not a valid URL: {source}")]
    Url {
        section: String,
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("[{section}] `base_url` has no `{{number}}` placeholder")]
    MissingPlaceholder { section: String },
    #[error("[{section}] `{key}` must be a non-negative number of seconds, got {value}")]
    InvalidSeconds {
        section: String,
        key: &'static str,
        value: f64,
    },
    #[error("[{section}] `fetch_tries` must be at least 1")]
    InvalidTries { section: String },
    #[error("[{section}] {source}")]
    Encoding {
        section: String,
        #[source]
        source: EncodingError,
    },
}

/// Everything needed to vote against one target. Read-only once built.
#[derive(Debug, Clone)]
pub struct VoteConfig {
    /// Section the values came from.
    pub target: String,
    /// Vote endpoint containing `{number}`.
    pub base_url_template: String,
    pub count_url: String,
    pub id_url: String,
    /// Counter pattern, compiled so `.` crosses newlines.
    pub vote_count_pattern: Pattern,
    pub id_pattern: Pattern,
    pub request_method: String,
    pub encoding: Encoding,
    pub vote_interval: Duration,
    /// Wait after the identifier disappears from the page.
    pub already_voted_backoff: Duration,
    pub fetch_tries: u32,
    pub extension_names: Vec<String>,
    /// Allow-listed headers, canonical spelling.
    pub headers: Headers,
    pub request_data: Option<String>,
}

/// Builds the `VoteConfig` for `target`, or for `[DEFAULT]` alone when `None`.
pub fn resolve(file: &ConfigFile, target: Option<&str>) -> Result<VoteConfig, ConfigError> {
    let defaults = file.get(DEFAULT_SECTION).cloned().unwrap_or_default();
    let (section_name, merged) = match target {
        None | Some(DEFAULT_SECTION) => (DEFAULT_SECTION.to_string(), defaults),
        Some(name) => {
            let section = file
                .get(name)
                .ok_or_else(|| ConfigError::MissingSection(name.to_string()))?;
            (name.to_string(), section.overlay(&defaults))
        }
    };
    resolve_section(&section_name, &merged)
}

fn resolve_section(section: &str, raw: &SectionConfig) -> Result<VoteConfig, ConfigError> {
    let required = |value: &Option<String>, key: &'static str| {
        value.clone().ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key,
        })
    };
    let pattern_err = |key: &'static str| {
        move |source| ConfigError::Pattern {
            section: section.to_string(),
            key,
            source,
        }
    };

    let base_url_template = required(&raw.base_url, "base_url")?;
    if !base_url_template.contains("{number}") {
        return Err(ConfigError::MissingPlaceholder {
            section: section.to_string(),
        });
    }
    let count_url = required(&raw.count_url, "count_url")?;
    let id_url = required(&raw.id_url, "id_url")?;
    for (key, value) in [
        ("base_url", base_url_template.replace("{number}", "0")),
        ("count_url", count_url.clone()),
        ("id_url", id_url.clone()),
    ] {
        url::Url::parse(&value).map_err(|source| ConfigError::Url {
            section: section.to_string(),
            key,
            source,
        })?;
    }

    let vote_count_pattern = Pattern::dot_all(&required(&raw.vote_count_regex, "vote_count_regex")?)
        .map_err(pattern_err("vote_count_regex"))?;
    let id_pattern =
        Pattern::new(&required(&raw.id_regex, "id_regex")?).map_err(pattern_err("id_regex"))?;

    let encoding = raw
        .encoding
        .as_deref()
        .unwrap_or("utf-8")
        .parse::<Encoding>()
        .map_err(|source| ConfigError::Encoding {
            section: section.to_string(),
            source,
        })?;

    let vote_interval = seconds(section, "vote_interval", raw.vote_interval)?;
    let already_voted_backoff = match raw.already_voted_backoff {
        Some(_) => seconds(section, "already_voted_backoff", raw.already_voted_backoff)?,
        None => Duration::from_secs(600),
    };
    let fetch_tries = raw.fetch_tries.unwrap_or(3);
    if fetch_tries == 0 {
        return Err(ConfigError::InvalidTries {
            section: section.to_string(),
        });
    }

    Ok(VoteConfig {
        target: section.to_string(),
        base_url_template,
        count_url,
        id_url,
        vote_count_pattern,
        id_pattern,
        request_method: raw
            .request_method
            .as_deref()
            .unwrap_or("GET")
            .trim()
            .to_ascii_uppercase(),
        encoding,
        vote_interval,
        already_voted_backoff,
        fetch_tries,
        extension_names: split_extensions(raw.extensions.as_deref().unwrap_or("")),
        headers: allowed_headers(section, &raw.headers)?,
        request_data: raw.request_data.clone(),
    })
}

fn seconds(section: &str, key: &'static str, value: Option<f64>) -> Result<Duration, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::MissingKey {
        section: section.to_string(),
        key,
    })?;
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds {
        section: section.to_string(),
        key,
        value,
    })
}

/// `"a; b;;c "` -> `["a", "b", "c"]`.
fn split_extensions(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Maps extra keys onto the allow-list (case-insensitive) with canonical names.
fn allowed_headers(
    section: &str,
    raw: &std::collections::BTreeMap<String, String>,
) -> Result<Headers, ConfigError> {
    raw.iter()
        .map(|(key, value)| {
            HEADER_ALLOW_LIST
                .iter()
                .find(|allowed| allowed.eq_ignore_ascii_case(key))
                .map(|allowed| (allowed.to_string(), value.clone()))
                .ok_or_else(|| ConfigError::UnknownKey {
                    section: section.to_string(),
                    key: key.clone(),
                })
        })
        .collect()
}
