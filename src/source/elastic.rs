use crate::config::types::SearchConfig;
use crate::source::query::{QueryFilter, SearchResponse};
use crate::source::record::LogRecord;
use crate::source::{LogSource, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, SourceError>;

/// HTTP client for the Elasticsearch `_search` endpoint
#[derive(Debug)]
pub struct ElasticSearchSource {
    search_url: String,
    filter: QueryFilter,
    client: reqwest::Client,
}

impl ElasticSearchSource {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            search_url: search_url(&config.url, &config.index),
            filter: QueryFilter {
                severities: config.severities.clone(),
                stop_words: config.stop_words.clone(),
            },
            client,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl LogSource for ElasticSearchSource {
    async fn fetch(&self, since: DateTime<Utc>, page_size: usize) -> Result<Vec<LogRecord>> {
        let body = self.filter.build(since, page_size);
        tracing::debug!(url = %self.search_url, cursor = %since, page_size, "Querying search backend");

        let response = self.client.post(&self.search_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Backend {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        let records = parsed.into_records();

        tracing::trace!(records = records.len(), "Received search page");
        Ok(records)
    }
}

fn search_url(base: &str, index: &str) -> String {
    format!("{}/{}/_search", base.trim_end_matches('/'), index)
}
