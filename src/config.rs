//! Tunables for matching, post resolution and action execution

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommandConfig {
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub posts: PostsConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Fuzzy user search thresholds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Candidates scoring below this are dropped.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,
    #[serde(default = "default_medium_confidence")]
    pub medium_confidence: f64,
}

fn default_threshold() -> f64 {
    crate::matcher::MATCH_THRESHOLD
}
fn default_max_results() -> usize {
    crate::matcher::MAX_RESULTS
}
fn default_high_confidence() -> f64 {
    crate::matcher::HIGH_CONFIDENCE
}
fn default_medium_confidence() -> f64 {
    crate::matcher::MEDIUM_CONFIDENCE
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_results: default_max_results(),
            high_confidence: default_high_confidence(),
            medium_confidence: default_medium_confidence(),
        }
    }
}

impl MatcherConfig {
    /// `high_confidence` as a whole percentage, comparable to [`MatchCandidate::percent`].
    ///
    /// [`MatchCandidate::percent`]: crate::types::MatchCandidate::percent
    pub fn high_percent(&self) -> u32 {
        (self.high_confidence * 100.0).round() as u32
    }

    pub fn medium_percent(&self) -> u32 {
        (self.medium_confidence * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PostsConfig {
    /// How many recent posts the resolver scores.
    #[serde(default = "default_candidate_window")]
    pub candidate_window: usize,
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
    /// Posts shorter than this (in characters) get `short_post_suffix` appended.
    #[serde(default = "default_short_post_chars")]
    pub short_post_chars: usize,
    #[serde(default = "default_short_post_suffix")]
    pub short_post_suffix: String,
}

fn default_candidate_window() -> usize {
    crate::resolver::CANDIDATE_WINDOW
}
fn default_feed_limit() -> usize {
    5
}
fn default_short_post_chars() -> usize {
    20
}
fn default_short_post_suffix() -> String {
    " 🤖 #AIGenerated #Threads".to_string()
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            candidate_window: default_candidate_window(),
            feed_limit: default_feed_limit(),
            short_post_chars: default_short_post_chars(),
            short_post_suffix: default_short_post_suffix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// App name used in the backend prompt.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_app_name() -> String {
    "Threads".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
        }
    }
}

impl CommandConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CommandConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let matcher = &self.matcher;
        if !(matcher.threshold > 0.0 && matcher.threshold <= 1.0) {
            return Err(ConfigError::Invalid(
                "matcher.threshold must be in (0, 1]".to_string(),
            ));
        }
        if matcher.medium_confidence > matcher.high_confidence {
            return Err(ConfigError::Invalid(
                "matcher.medium_confidence must not exceed matcher.high_confidence".to_string(),
            ));
        }
        if matcher.max_results == 0 {
            return Err(ConfigError::Invalid(
                "matcher.max_results must be > 0".to_string(),
            ));
        }
        if self.posts.candidate_window == 0 {
            return Err(ConfigError::Invalid(
                "posts.candidate_window must be > 0".to_string(),
            ));
        }
        if self.posts.feed_limit == 0 {
            return Err(ConfigError::Invalid(
                "posts.feed_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = CommandConfig::from_toml_str("").unwrap();
        assert_eq!(config, CommandConfig::default());
        assert_eq!(config.matcher.threshold, 0.55);
        assert_eq!(config.matcher.max_results, 8);
        assert_eq!(config.posts.candidate_window, 20);
        assert_eq!(config.posts.feed_limit, 5);
    }

    #[test]
    fn test_partial_override() {
        let config = CommandConfig::from_toml_str(
            r#"
            [matcher]
            threshold = 0.6

            [assistant]
            app_name = "Loop"
            "#,
        )
        .unwrap();
        assert_eq!(config.matcher.threshold, 0.6);
        assert_eq!(config.matcher.max_results, 8);
        assert_eq!(config.assistant.app_name, "Loop");
    }

    #[test]
    fn test_rejects_inverted_confidence_bands() {
        let err = CommandConfig::from_toml_str(
            r#"
            [matcher]
            high_confidence = 0.6
            medium_confidence = 0.7
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = CommandConfig::from_toml_str("[posts]\ncandidate_window = 0\n").unwrap_err();
        assert!(err.to_string().contains("candidate_window"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[posts]\nfeed_limit = 3").unwrap();
        let config = CommandConfig::load(file.path()).unwrap();
        assert_eq!(config.posts.feed_limit, 3);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = CommandConfig::from_toml_str("[matcher\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
