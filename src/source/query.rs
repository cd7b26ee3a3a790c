use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::source::record::LogRecord;

/// Fields returned for each hit.
pub const SOURCE_FIELDS: [&str; 5] = ["severity", "application", "message", "stacktrace", "@timestamp"];

/// Fields checked against the stop words.
pub const STOP_WORD_FIELDS: [&str; 2] = ["message", "stacktrace"];

const CURSOR_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const CURSOR_ES_FORMAT: &str = "yyyy-MM-dd HH:mm:ss.SSSSSS";

/// Filters applied by the search backend on every page.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub severities: Vec<String>,
    pub stop_words: Vec<String>,
}

impl QueryFilter {
    /// Build the search body for one page of records newer than `since`.
    pub fn build(&self, since: DateTime<Utc>, page_size: usize) -> Value {
        let mut bool_query = json!({
            "filter": [
                { "terms": { "severity": self.severities } },
                {
                    "range": {
                        "@timestamp": {
                            "gt": since.format(CURSOR_FORMAT).to_string(),
                            "format": CURSOR_ES_FORMAT,
                        }
                    }
                }
            ]
        });

        let exclusions = self.stop_word_clauses();
        if !exclusions.is_empty() {
            bool_query["must_not"] = Value::Array(exclusions);
        }

        json!({
            "query": { "bool": bool_query },
            "sort": [ { "@timestamp": { "order": "asc" } } ],
            "from": 0,
            "size": page_size,
            "_source": SOURCE_FIELDS,
        })
    }

    fn stop_word_clauses(&self) -> Vec<Value> {
        self.stop_words
            .iter()
            .flat_map(|word| {
                STOP_WORD_FIELDS.iter().map(move |field| {
                    let mut pattern = Map::new();
                    pattern.insert(
                        field.to_string(),
                        json!({ "value": format!("*{}*", word), "case_insensitive": true }),
                    );
                    json!({ "wildcard": pattern })
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: HitSource,
}

/// Fields of one hit. Missing or mistyped fields degrade to defaults so a
/// single malformed document cannot fail the whole page.
#[derive(Debug, Deserialize)]
pub struct HitSource {
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stacktrace: Option<String>,
    #[serde(rename = "@timestamp", default)]
    pub timestamp: Value,
}

impl From<HitSource> for LogRecord {
    fn from(hit: HitSource) -> Self {
        // Non-string timestamps fall through to the current-time fallback.
        let timestamp = match hit.timestamp {
            Value::String(s) => s,
            other => other.to_string(),
        };
        LogRecord::new(
            hit.application,
            hit.severity,
            hit.message,
            hit.stacktrace,
            &timestamp,
        )
    }
}

impl SearchResponse {
    /// Decode every hit, skipping the ones that cannot be read at all.
    pub fn into_records(self) -> Vec<LogRecord> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Hit>(raw) {
                Ok(hit) => Some(LogRecord::from(hit.source)),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable search hit");
                    None
                }
            })
            .collect()
    }
}
