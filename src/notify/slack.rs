use crate::config::types::SlackConfig;
use crate::notify::{notifications, Notification, Notifier, NotifyError, Recipients};
use crate::poll::Batch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, NotifyError>;

/// Slack client: webhook for status messages, `files.upload` for log entries.
#[derive(Debug)]
pub struct SlackNotifier {
    channel: String,
    bot_token: String,
    webhook_url: String,
    upload_url: String,
    recipients: Recipients,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            channel: config.channel.clone(),
            bot_token: config.bot_token.clone(),
            webhook_url: join_url(&config.webhook_base_url, &config.webhook),
            upload_url: join_url(&config.api_base_url, "files.upload"),
            recipients: Recipients::new(&config.recipients),
            client,
        })
    }

    async fn post_message(&self, attachment: Attachment<'_>) -> Result<()> {
        let body = WebhookMessage {
            attachments: vec![attachment],
        };

        let response = self.client.post(&self.webhook_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn upload(&self, notification: &Notification) -> Result<()> {
        let filename = format!("{}.log", notification.application);
        let comment = notification.comment();
        let form = [
            ("channels", self.channel.as_str()),
            ("token", self.bot_token.as_str()),
            ("filetype", "java"),
            ("title", notification.title.as_str()),
            ("filename", filename.as_str()),
            ("content", notification.body.as_str()),
            ("initial_comment", comment.as_str()),
        ];

        let response = self.client.post(&self.upload_url).form(&form[..]).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let reply: ApiReply = response.json().await?;
        if !reply.ok {
            return Err(NotifyError::Rejected(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(application = %notification.application, title = %notification.title, "Uploaded log entry");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send_startup(&self, text: &str) -> Result<()> {
        self.post_message(Attachment {
            title: "Hi",
            color: "good",
            pretext: ":rocket:",
            text,
        })
        .await
    }

    async fn send_error(&self, text: &str) -> Result<()> {
        self.post_message(Attachment {
            title: "Error:",
            color: "danger",
            pretext: "There is something wrong with me :warning:",
            text,
        })
        .await
    }

    async fn send_batch(&self, batch: &Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        for notification in notifications(batch, &self.recipients) {
            self.upload(&notification).await?;
        }

        tracing::info!(
            records = batch.len(),
            applications = batch.applications(),
            "Sent log notifications"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    title: &'a str,
    color: &'a str,
    pretext: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://hooks.slack.com/services/", "T000/B000/XXXX"),
            "https://hooks.slack.com/services/T000/B000/XXXX"
        );
        assert_eq!(
            join_url("https://slack.com/api", "/files.upload"),
            "https://slack.com/api/files.upload"
        );
    }

    #[test]
    fn test_notifier_constructs_correct_urls() {
        let config = SlackConfig {
            channel: "alerts".to_string(),
            webhook: "T000/B000/XXXX".to_string(),
            bot_token: "xoxb-test".to_string(),
            ..SlackConfig::default()
        };

        let notifier = SlackNotifier::new(&config).unwrap();
        assert_eq!(
            notifier.webhook_url,
            "https://hooks.slack.com/services/T000/B000/XXXX"
        );
        assert_eq!(notifier.upload_url, "https://slack.com/api/files.upload");
    }

    #[test]
    fn test_attachment_payload_shape() {
        let body = WebhookMessage {
            attachments: vec![Attachment {
                title: "Hi",
                color: "good",
                pretext: ":rocket:",
                text: "started",
            }],
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "attachments": [
                    { "title": "Hi", "color": "good", "pretext": ":rocket:", "text": "started" }
                ]
            })
        );
    }
}
