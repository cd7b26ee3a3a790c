use crate::source::timestamp::parse_timestamp_or_now;
use chrono::{DateTime, Utc};

/// One error entry read from the search backend.
///
/// Equality and hashing cover all five fields, so two hits with the same
/// application, severity and timestamp but different messages stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    application: String,
    severity: String,
    message: Option<String>,
    stack_trace: String,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Build a record from the raw fields of a search hit.
    ///
    /// `timestamp` is parsed leniently: an unreadable value becomes "now".
    pub fn new(
        application: impl Into<String>,
        severity: impl Into<String>,
        message: Option<String>,
        stack_trace: Option<String>,
        timestamp: &str,
    ) -> Self {
        Self::with_timestamp(
            application,
            severity,
            message,
            stack_trace,
            parse_timestamp_or_now(timestamp),
        )
    }

    pub fn with_timestamp(
        application: impl Into<String>,
        severity: impl Into<String>,
        message: Option<String>,
        stack_trace: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            application: application.into(),
            severity: severity.into(),
            message,
            stack_trace: stack_trace.unwrap_or_default(),
            timestamp,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Notification title, `application-severity`.
    pub fn title(&self) -> String {
        format!("{}-{}", self.application, self.severity)
    }

    /// Message followed by the stack trace on the next line.
    pub fn body(&self) -> String {
        format!("{}\n{}", self.message.as_deref().unwrap_or_default(), self.stack_trace)
    }
}
