pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# ERRWATCH CONFIGURATION
# =============================================================================
# errwatch polls a search backend for new error logs, drops near-duplicates
# and posts what is left to a Slack channel.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/errwatch/config.yml
#   3. /etc/errwatch/config.yml
#
# Values of the form $env{VAR_NAME} are replaced with environment variables.
# The required settings may also be given on the command line:
#   --elastic-search-domain, --slack-channel,
#   --slack-channel-web-hook-url, --slack-bot-token

# =============================================================================
# SEARCH BACKEND
# =============================================================================

search:
  # Base address of the Elasticsearch cluster (required)
  url: http://localhost:9200/
  # Index pattern to search
  index: logs-*
  # Timeout for each search request
  timeout: 10s
  # Records requested per page
  page_size: 100
  # Only records with one of these severities are reported
  severities:
    - error
  # Records whose message or stack trace contains any of these words
  # (case-insensitive) are ignored
  stop_words:
    - AuthenticationException
    - SocketException

# =============================================================================
# SLACK
# =============================================================================

slack:
  # Channel that receives one uploaded snippet per error (required)
  channel: alerts
  # Incoming webhook path, the part after https://hooks.slack.com/services/
  # (required). Pass --slack-channel-web-hook-url or uncomment:
  # webhook: $env{ERRWATCH_SLACK_WEBHOOK}
  # Bot token used for file uploads (required). Pass --slack-bot-token or
  # uncomment:
  # bot_token: $env{ERRWATCH_SLACK_BOT_TOKEN}
  # Timeout for each Slack request
  timeout: 10s
  # People to mention per application (matched case-insensitively).
  # Applications not listed here are attributed to "anonymous".
  recipients:
    billing-service: "@billing-oncall"

# =============================================================================
# POLLING
# =============================================================================

poll:
  # Pause between poll cycles
  interval: 10m
  # Messages sharing this many aligned characters count as the same error
  duplicate_threshold: 10
  # Maximum pages drained in one cycle (0 = no limit); the rest waits for the
  # next cycle
  max_pages: 100
"#
    .to_string()
}
