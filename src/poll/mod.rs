use crate::config::PollConfig;
use crate::dedup::{remove_near_duplicates, DEFAULT_DUPLICATE_THRESHOLD};
use crate::source::{LogRecord, LogSource, SourceError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("search backend error after {pages} page(s): {source}")]
    Source {
        pages: usize,
        #[source]
        source: SourceError,
    },
}

/// Exclusive lower bound for the next query. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(start)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn get(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn advance(&mut self, seen: DateTime<Utc>) {
        if seen > self.0 {
            self.0 = seen;
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

/// Records of one poll cycle grouped by application, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    groups: BTreeMap<String, Vec<LogRecord>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LogRecord) {
        self.groups
            .entry(record.application().to_string())
            .or_default()
            .push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of applications with at least one record.
    pub fn applications(&self) -> usize {
        self.groups.len()
    }

    /// Total records over all applications.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn get(&self, application: &str) -> Option<&[LogRecord]> {
        self.groups.get(application).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LogRecord])> {
        self.groups
            .iter()
            .map(|(app, records)| (app.as_str(), records.as_slice()))
    }

    pub fn dedup(&mut self, threshold: usize) {
        for records in self.groups.values_mut() {
            let taken = std::mem::take(records);
            *records = remove_near_duplicates(taken, threshold);
        }
    }
}

impl FromIterator<LogRecord> for Batch {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for record in iter {
            batch.push(record);
        }
        batch
    }
}

#[derive(Debug)]
pub struct CycleOutcome {
    pub batch: Batch,
    pub cursor: Cursor,
    pub pages: usize,
}

/// Drains every new page from a source, then deduplicates per application.
#[derive(Debug, Clone)]
pub struct PollCycle {
    page_size: usize,
    duplicate_threshold: usize,
    max_pages: Option<usize>,
}

impl Default for PollCycle {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            max_pages: None,
        }
    }
}

impl PollCycle {
    pub fn new(page_size: usize, duplicate_threshold: usize, max_pages: Option<usize>) -> Self {
        Self {
            page_size,
            duplicate_threshold,
            max_pages,
        }
    }

    pub fn from_config(page_size: usize, config: &PollConfig) -> Self {
        let max_pages = (config.max_pages > 0).then_some(config.max_pages);
        Self::new(page_size, config.duplicate_threshold, max_pages)
    }

    /// Run one cycle starting after `cursor`.
    ///
    /// On error nothing is returned: the caller keeps its old cursor and the
    /// whole range is requested again next cycle.
    pub async fn run<S>(&self, source: &S, cursor: Cursor) -> Result<CycleOutcome, PollError>
    where
        S: LogSource + ?Sized,
    {
        debug!(cursor = %cursor, "Starting poll cycle");

        let mut batch = Batch::new();
        let mut working = cursor;
        let mut pages = 0;

        loop {
            if self.max_pages.is_some_and(|max| pages >= max) {
                warn!(
                    pages,
                    cursor = %working,
                    "Page limit reached, remaining records are left for the next cycle"
                );
                break;
            }

            let page = source
                .fetch(working.get(), self.page_size)
                .await
                .map_err(|source| PollError::Source { pages, source })?;

            if page.is_empty() {
                break;
            }
            pages += 1;

            for record in page {
                working.advance(record.timestamp());
                batch.push(record);
            }

            debug!(pages, cursor = %working, "Consumed page");
        }

        let received = batch.len();
        batch.dedup(self.duplicate_threshold);

        if received > 0 {
            info!(
                pages,
                received,
                kept = batch.len(),
                applications = batch.applications(),
                cursor = %working,
                "Poll cycle complete"
            );
        }

        Ok(CycleOutcome {
            batch,
            cursor: working,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, second).unwrap()
    }

    fn rec(app: &str, message: &str, second: u32) -> LogRecord {
        LogRecord::with_timestamp(app, "error", Some(message.to_string()), None, at(second))
    }

    #[test]
    fn test_cursor_never_moves_back() {
        let mut cursor = Cursor::new(at(10));

        for second in [5, 12, 3, 12, 11, 20, 0] {
            let before = cursor;
            cursor.advance(at(second));
            assert!(cursor >= before);
        }

        assert_eq!(cursor.get(), at(20));
    }

    #[test]
    fn test_cursor_display_has_microseconds() {
        let cursor = Cursor::new(at(5));

        assert_eq!(cursor.to_string(), "2023-01-02 03:04:05.000000");
    }

    #[test]
    fn test_batch_groups_in_arrival_order() {
        let batch: Batch = vec![
            rec("orders", "first", 1),
            rec("billing", "second", 2),
            rec("orders", "third", 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(batch.applications(), 2);
        assert_eq!(batch.len(), 3);

        let orders: Vec<_> = batch
            .get("orders")
            .unwrap()
            .iter()
            .map(|r| r.message().unwrap())
            .collect();
        assert_eq!(orders, vec!["first", "third"]);
    }

    #[test]
    fn test_batch_iterates_applications_sorted() {
        let batch: Batch = vec![rec("zeta", "a", 1), rec("alpha", "b", 2)]
            .into_iter()
            .collect();

        let apps: Vec<_> = batch.iter().map(|(app, _)| app).collect();
        assert_eq!(apps, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_batch_dedup_is_per_application() {
        let mut batch: Batch = vec![
            rec("orders", "connection refused to db-1", 1),
            rec("billing", "connection refused to db-1", 2),
            rec("orders", "connection refused to db-2", 3),
        ]
        .into_iter()
        .collect();

        batch.dedup(10);

        assert_eq!(batch.get("orders").unwrap().len(), 1);
        assert_eq!(batch.get("billing").unwrap().len(), 1);
    }

    #[test]
    fn test_from_config_zero_means_unbounded() {
        let config = PollConfig {
            max_pages: 0,
            ..PollConfig::default()
        };

        let cycle = PollCycle::from_config(50, &config);
        assert_eq!(cycle.max_pages, None);
        assert_eq!(cycle.page_size, 50);
    }
}
