use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::dedup::DEFAULT_DUPLICATE_THRESHOLD;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base address of the search backend, e.g. `http://localhost:9200/`
    pub url: String,
    pub index: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub page_size: usize,
    pub severities: Vec<String>,
    /// Records whose message or stack trace contains one of these are skipped.
    pub stop_words: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            index: "logs-*".to_string(),
            timeout: Duration::from_secs(10),
            page_size: 100,
            severities: vec!["error".to_string()],
            stop_words: vec![
                "AuthenticationException".to_string(),
                "SocketException".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub channel: String,
    /// Path of the incoming webhook below `webhook_base_url`.
    pub webhook: String,
    pub bot_token: String,
    pub webhook_base_url: String,
    pub api_base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Application name to Slack handle(s) mentioned on each upload.
    pub recipients: HashMap<String, String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            webhook: String::new(),
            bot_token: String::new(),
            webhook_base_url: "https://hooks.slack.com/services/".to_string(),
            api_base_url: "https://slack.com/api/".to_string(),
            timeout: Duration::from_secs(10),
            recipients: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub duplicate_threshold: usize,
    /// Upper bound on pages drained per cycle, 0 for no limit.
    pub max_pages: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            max_pages: 100,
        }
    }
}

/// Values given on the command line, applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub search_url: Option<String>,
    pub slack_channel: Option<String>,
    pub slack_webhook: Option<String>,
    pub slack_bot_token: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.search_url {
            config.search.url = url.clone();
        }
        if let Some(channel) = &self.slack_channel {
            config.slack.channel = channel.clone();
        }
        if let Some(webhook) = &self.slack_webhook {
            config.slack.webhook = webhook.clone();
        }
        if let Some(token) = &self.slack_bot_token {
            config.slack.bot_token = token.clone();
        }
    }
}
