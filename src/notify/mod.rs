pub mod recipients;
pub mod slack;

use crate::poll::Batch;
use crate::source::LogRecord;
use async_trait::async_trait;
use thiserror::Error;

pub use recipients::Recipients;
pub use slack::SlackNotifier;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat service returned error status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("chat service rejected the request: {0}")]
    Rejected(String),
}

/// Where findings are reported.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Informational "daemon is up" message.
    async fn send_startup(&self, text: &str) -> Result<(), NotifyError>;

    async fn send_error(&self, text: &str) -> Result<(), NotifyError>;

    /// One notification per record. An empty batch sends nothing.
    async fn send_batch(&self, batch: &Batch) -> Result<(), NotifyError>;
}

/// Everything needed to report a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub application: String,
    pub title: String,
    pub body: String,
    pub recipients: String,
    pub date: String,
}

impl Notification {
    pub fn new(record: &LogRecord, recipients: &Recipients) -> Self {
        Self {
            application: record.application().to_string(),
            title: record.title(),
            body: record.body(),
            recipients: recipients.lookup(record.application()).to_string(),
            date: record.timestamp().format(DATE_FORMAT).to_string(),
        }
    }

    pub fn comment(&self) -> String {
        format!(
            "application: {} \nmembers: {}\ndate: {}",
            self.application, self.recipients, self.date
        )
    }
}

/// Flatten a batch into notifications, application by application.
pub fn notifications(batch: &Batch, recipients: &Recipients) -> Vec<Notification> {
    batch
        .iter()
        .flat_map(|(_, records)| records.iter())
        .map(|record| Notification::new(record, recipients))
        .collect()
}
