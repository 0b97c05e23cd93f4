//! Runtime configuration, read from the environment by the binary.

use std::time::Duration;

use crate::profile::Language;

/// Settings for one coach process.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Model name passed to the generation service.
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Per-request generation timeout.
    pub generation_timeout: Duration,
    /// Language for users whose transport gives no hint.
    pub default_language: Language,
    /// Delay before the post-onboarding motivational message.
    pub motivation_delay: Duration,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            generation_timeout: Duration::from_secs(30),
            default_language: Language::English,
            motivation_delay: Duration::from_secs(60 * 60),
        }
    }
}

impl CoachConfig {
    /// Overlay environment variables onto the defaults. Only the API key is
    /// required, and that is read separately so it never sits in this struct.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("FITCOACH_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("FITCOACH_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(secs) = std::env::var("FITCOACH_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.generation_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(lang) = std::env::var("FITCOACH_DEFAULT_LANGUAGE") {
            config.default_language = Language::from_hint(&lang);
        }
        if let Ok(secs) = std::env::var("FITCOACH_MOTIVATION_DELAY_SECS") {
            if let Ok(secs) = secs.parse() {
                config.motivation_delay = Duration::from_secs(secs);
            }
        }
        config
    }
}
