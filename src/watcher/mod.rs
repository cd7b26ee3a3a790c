use crate::notify::{Notifier, NotifyError};
use crate::poll::{Batch, Cursor, PollCycle, PollError};
use crate::source::LogSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// What happened in one iteration of the watch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    pub records: usize,
    pub poll_failed: bool,
    pub notify_failed: bool,
}

/// Polls the source and reports to the notifier on a fixed interval.
pub struct Watcher {
    source: Arc<dyn LogSource>,
    notifier: Arc<dyn Notifier>,
    cycle: PollCycle,
    interval: Duration,
    cursor: Cursor,
}

impl Watcher {
    pub fn new(
        source: Arc<dyn LogSource>,
        notifier: Arc<dyn Notifier>,
        cycle: PollCycle,
        interval: Duration,
        cursor: Cursor,
    ) -> Self {
        Self {
            source,
            notifier,
            cycle,
            interval,
            cursor,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Announce startup, then loop until `shutdown_rx` flips to true.
    pub async fn run(mut self, startup_text: &str, mut shutdown_rx: watch::Receiver<bool>) {
        if let Err(e) = self.notifier.send_startup(startup_text).await {
            warn!(error = %e, "Failed to send startup message");
        }
        info!(cursor = %self.cursor, interval = ?self.interval, "Watching for new error logs");

        loop {
            self.run_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Watcher stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One poll cycle followed by notification.
    ///
    /// Failures on either side are logged and reported through the notifier;
    /// they never escape.
    pub async fn run_once(&mut self) -> IterationReport {
        let mut report = IterationReport::default();

        let batch = match self.cycle.run(self.source.as_ref(), self.cursor).await {
            Ok(outcome) => {
                self.cursor = outcome.cursor;
                outcome.batch
            }
            Err(e) => {
                report.poll_failed = true;
                self.report_poll_failure(&e).await;
                Batch::new()
            }
        };

        report.records = batch.len();
        if batch.is_empty() {
            return report;
        }

        if let Err(e) = self.notifier.send_batch(&batch).await {
            report.notify_failed = true;
            self.report_notify_failure(&e).await;
        }

        report
    }

    async fn report_poll_failure(&self, e: &PollError) {
        match e {
            PollError::Source { pages, source } => {
                error!(pages, cursor = %self.cursor, error = %source, "Failed to load logs from search backend");
            }
        }

        self.alert(&format!(
            "error happened while loading logs from elastic search: {}",
            e
        ))
        .await;
    }

    async fn report_notify_failure(&self, e: &NotifyError) {
        match e {
            NotifyError::Rejected(reason) => {
                error!(reason = %reason, "Chat service rejected a notification");
            }
            NotifyError::Status { status, .. } => {
                error!(status, error = %e, "Chat service returned an error status");
            }
            NotifyError::Http(_) => {
                error!(error = %e, "Failed to reach chat service");
            }
        }

        self.alert(&format!(
            "error happened while sending notifies about errors: {}",
            e
        ))
        .await;
    }

    async fn alert(&self, text: &str) {
        if let Err(e) = self.notifier.send_error(text).await {
            warn!(error = %e, "Failed to send error alert");
        }
    }
}
