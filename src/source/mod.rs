pub mod elastic;
pub mod query;
pub mod record;
pub mod timestamp;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use elastic::ElasticSearchSource;
pub use record::LogRecord;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search backend returned error status {status}: {message}")]
    Backend { status: u16, message: String },
}

/// Where error records come from.
///
/// `fetch` returns at most `page_size` records with a timestamp strictly after
/// `since`, oldest first. An empty page means there is nothing newer.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch(
        &self,
        since: DateTime<Utc>,
        page_size: usize,
    ) -> Result<Vec<LogRecord>, SourceError>;
}
