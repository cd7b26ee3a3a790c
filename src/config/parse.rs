use super::types::*;
use crate::config::{expand_env_vars, ENV_VAR_PATTERN};
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Load the config file (if any), apply command line overrides and validate.
///
/// With no file, defaults plus overrides must supply every required setting.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Parse a config file without validating it.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("'{}': {}", path.display(), e),
        ))
    })?;

    parse_config_str(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse YAML text, expanding `$env{VAR}` references first.
pub fn parse_config_str(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    // An empty document is a valid "all defaults" config.
    if yaml_string.trim().is_empty() {
        return Ok(Config::default());
    }

    Ok(serde_yaml::from_str(&yaml_string)?)
}

/// Checks for unexpanded environment variables and returns a helpful error.
///
/// Comment lines are skipped, so commented-out keys may still mention variables.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(ENV_VAR_PATTERN).expect("env var pattern is valid");
    let mut unexpanded_vars: Vec<String> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| re.captures_iter(line).collect::<Vec<_>>())
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with the actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables (e.g., export SLACK_BOT_TOKEN=...)\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let required = [
        (&config.search.url, "search.url (--elastic-search-domain)"),
        (&config.slack.channel, "slack.channel (--slack-channel)"),
        (&config.slack.webhook, "slack.webhook (--slack-channel-web-hook-url)"),
        (&config.slack.bot_token, "slack.bot_token (--slack-bot-token)"),
    ];
    for (value, name) in required {
        if value.trim().is_empty() {
            errors.push(format!("missing required setting: {}", name));
        }
    }

    if config.search.page_size == 0 {
        errors.push("search.page_size must be greater than zero".to_string());
    }

    if config.search.severities.is_empty() {
        errors.push("search.severities must list at least one severity".to_string());
    }

    if config.search.stop_words.iter().any(|w| w.trim().is_empty()) {
        errors.push("search.stop_words must not contain empty entries".to_string());
    }

    if config.poll.interval.is_zero() {
        errors.push("poll.interval must be greater than zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn complete_overrides() -> Overrides {
        Overrides {
            search_url: Some("http://localhost:9200/".to_string()),
            slack_channel: Some("alerts".to_string()),
            slack_webhook: Some("T000/B000/XXXX".to_string()),
            slack_bot_token: Some("xoxb-test".to_string()),
        }
    }

    #[test]
    fn test_defaults_with_overrides_are_valid() {
        let config = load_config(None, &complete_overrides()).unwrap();

        assert_eq!(config.search.url, "http://localhost:9200/");
        assert_eq!(config.search.page_size, 100);
        assert_eq!(config.poll.interval, Duration::from_secs(600));
        assert_eq!(config.poll.duplicate_threshold, 10);
    }

    #[test]
    fn test_missing_required_settings_are_all_reported() {
        let err = load_config(None, &Overrides::default()).unwrap_err();

        match err {
            ConfigError::ValidationList(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors[0].contains("search.url"));
                assert!(errors[3].contains("slack.bot_token"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_partial_yaml_keeps_defaults() {
        let config = parse_config_str(
            r#"
search:
  url: http://es:9200
  stop_words: []
poll:
  interval: 30s
"#,
        )
        .unwrap();

        assert_eq!(config.search.url, "http://es:9200");
        assert_eq!(config.search.index, "logs-*");
        assert!(config.search.stop_words.is_empty());
        assert_eq!(config.poll.interval, Duration::from_secs(30));
        assert_eq!(config.poll.max_pages, 100);
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let config = parse_config_str("").unwrap();

        assert_eq!(config.search.severities, vec!["error".to_string()]);
    }

    #[test]
    fn test_unexpanded_env_var_is_rejected() {
        let err = parse_config_str("slack:\n  bot_token: $env{ERRWATCH_SURELY_UNSET_VAR}\n")
            .unwrap_err();

        assert!(err.to_string().contains("ERRWATCH_SURELY_UNSET_VAR"));
    }

    #[test]
    fn test_commented_env_var_is_ignored() {
        let config = parse_config_str(
            "slack:\n  channel: alerts\n  # bot_token: $env{ERRWATCH_SURELY_UNSET_VAR}\n",
        )
        .unwrap();

        assert_eq!(config.slack.channel, "alerts");
        assert_eq!(config.slack.bot_token, "");
    }

    #[test]
    fn test_env_var_is_expanded() {
        std::env::set_var("ERRWATCH_PARSE_TEST_TOKEN", "xoxb-from-env");
        let config =
            parse_config_str("slack:\n  bot_token: $env{ERRWATCH_PARSE_TEST_TOKEN}\n").unwrap();
        std::env::remove_var("ERRWATCH_PARSE_TEST_TOKEN");

        assert_eq!(config.slack.bot_token, "xoxb-from-env");
    }

    #[test]
    fn test_override_wins_over_file_value() {
        let mut config = parse_config_str("slack:\n  channel: from-file\n").unwrap();
        Overrides {
            slack_channel: Some("from-cli".to_string()),
            ..Overrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.slack.channel, "from-cli");
    }

    #[test]
    fn test_zero_page_size_is_invalid() {
        let mut config = load_config(None, &complete_overrides()).unwrap();
        config.search.page_size = 0;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationList(_))
        ));
    }
}
