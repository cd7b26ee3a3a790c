#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use errwatch::notify::{notifications, Notification, Notifier, NotifyError, Recipients};
use errwatch::poll::Batch;
use errwatch::source::{LogRecord, LogSource, SourceError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn at(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, second).unwrap()
}

pub fn rec(app: &str, message: &str, second: u32) -> LogRecord {
    LogRecord::with_timestamp(app, "error", Some(message.to_string()), None, at(second))
}

pub fn backend_error() -> SourceError {
    SourceError::Backend {
        status: 503,
        message: "search unavailable".to_string(),
    }
}

/// Replays a fixed list of pages, then returns empty pages forever.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<Vec<LogRecord>, SourceError>>>,
    requests: Mutex<Vec<DateTime<Utc>>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Result<Vec<LogRecord>, SourceError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, page: Result<Vec<LogRecord>, SourceError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    /// Cursor value of every fetch, in call order.
    pub fn requests(&self) -> Vec<DateTime<Utc>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn fetch(
        &self,
        since: DateTime<Utc>,
        _page_size: usize,
    ) -> Result<Vec<LogRecord>, SourceError> {
        self.requests.lock().unwrap().push(since);
        self.pages.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

/// Records every call; can be told to fail batch delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub startups: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub delivered: Mutex<Vec<Notification>>,
    pub batch_calls: Mutex<usize>,
    pub fail_batches: bool,
    pub fail_alerts: bool,
}

impl RecordingNotifier {
    pub fn failing_batches() -> Self {
        Self {
            fail_batches: true,
            ..Self::default()
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> usize {
        *self.batch_calls.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_startup(&self, text: &str) -> Result<(), NotifyError> {
        self.startups.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_error(&self, text: &str) -> Result<(), NotifyError> {
        self.errors.lock().unwrap().push(text.to_string());
        if self.fail_alerts {
            return Err(NotifyError::Rejected("channel_not_found".to_string()));
        }
        Ok(())
    }

    async fn send_batch(&self, batch: &Batch) -> Result<(), NotifyError> {
        *self.batch_calls.lock().unwrap() += 1;
        if self.fail_batches {
            return Err(NotifyError::Status {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .extend(notifications(batch, &Recipients::default()));
        Ok(())
    }
}
