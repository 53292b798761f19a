//! Compiled text patterns for pulling a counter or identifier out of a page.

use regex::{Regex, RegexBuilder};

/// Capture group that holds the value of interest.
const VALUE_GROUP: usize = 1;

/// Counter markup used to sanity-check a counter pattern without network access.
pub const COUNTER_SAMPLE: &str = "
<div class=\"number-of-votes\">Votes:
    <div class=\"number\"> 3343</div>
</div>
";

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("pattern `{0}` has no capture group")]
    NoCaptureGroup(String),
    #[error("pattern `{0}` did not match")]
    NotFound(String),
}

/// A compiled pattern plus the capture group to read.
///
/// Compiled once and reused across documents.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    group: usize,
}

impl Pattern {
    /// Default single-line mode: `.` does not cross newlines.
    pub fn new(source: &str) -> Result<Self, PatternError> {
        Self::build(source, false)
    }

    /// `.` also matches newlines, so a label and its value may be separated
    /// by intervening markup spread over several lines.
    pub fn dot_all(source: &str) -> Result<Self, PatternError> {
        Self::build(source, true)
    }

    fn build(source: &str, dot_all: bool) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(source)
            .dot_matches_new_line(dot_all)
            .build()
            .map_err(|source_err| PatternError::Invalid {
                pattern: source.to_string(),
                source: source_err,
            })?;
        // captures_len counts the implicit whole-match group.
        if regex.captures_len() <= VALUE_GROUP {
            return Err(PatternError::NoCaptureGroup(source.to_string()));
        }
        Ok(Self {
            regex,
            group: VALUE_GROUP,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Searches `document` once and returns the text of the value group.
    pub fn extract<'d>(&self, document: &'d str) -> Result<&'d str, PatternError> {
        self.regex
            .captures(document)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
            .ok_or_else(|| PatternError::NotFound(self.as_str().to_string()))
    }

    /// Groups of this pattern applied to [`COUNTER_SAMPLE`].
    pub fn self_check(&self) -> Option<Vec<Option<&'static str>>> {
        self.groups(COUNTER_SAMPLE)
    }

    /// All capture groups of the first match (group 0 excluded), for diagnostics.
    pub fn groups<'d>(&self, document: &'d str) -> Option<Vec<Option<&'d str>>> {
        let caps = self.regex.captures(document)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str()))
                .collect(),
        )
    }
}
