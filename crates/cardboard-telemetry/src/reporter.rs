//! Error reporting: normalizes failures into `ErrorReport` envelopes and
//! keeps the single "active error" the modal displays.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::error;

use cardboard_common::{CardboardError, ErrorReport};

/// Maximum reports kept in memory.
const MAX_ERROR_HISTORY: usize = 100;

#[derive(Default)]
struct ReporterInner {
    /// The report the error modal currently shows. A new report always
    /// replaces it; there is no queue.
    active: Option<ErrorReport>,
    history: VecDeque<ErrorReport>,
    total: u64,
}

#[derive(Default)]
pub struct ErrorReporter {
    inner: Mutex<ReporterInner>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report: it becomes the active error and joins the bounded
    /// history.
    pub fn report(&self, report: ErrorReport) {
        error!(
            code = report.code.as_str(),
            "error reported: {}",
            report.message
        );
        let mut inner = self.inner.lock().unwrap();
        inner.total += 1;
        inner.history.push_back(report.clone());
        while inner.history.len() > MAX_ERROR_HISTORY {
            inner.history.pop_front();
        }
        inner.active = Some(report);
    }

    /// Normalize and record a crate error.
    pub fn report_error(&self, err: &CardboardError) {
        self.report(err.to_report());
    }

    /// The report the modal should currently display, if any.
    pub fn active(&self) -> Option<ErrorReport> {
        self.inner.lock().unwrap().active.clone()
    }

    /// Dismiss the active error. Returns `false` if none was showing.
    pub fn dismiss(&self) -> bool {
        self.inner.lock().unwrap().active.take().is_some()
    }

    /// Recent reports, oldest first.
    pub fn history(&self) -> Vec<ErrorReport> {
        self.inner.lock().unwrap().history.iter().cloned().collect()
    }

    pub fn total_reported(&self) -> u64 {
        self.inner.lock().unwrap().total
    }
}

/// Route panics into the reporter before the default hook runs. Uncaught
/// panics become `Unknown` reports so the modal can show them.
pub fn install_panic_hook(reporter: Arc<ErrorReporter>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        reporter.report(ErrorReport::unknown(message).with_details(location));
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardboard_common::{BridgeError, ErrorCode};

    #[test]
    fn report_sets_active_error() {
        let reporter = ErrorReporter::new();
        assert!(reporter.active().is_none());

        reporter.report(ErrorReport::validation("email", "bad"));
        let active = reporter.active().unwrap();
        assert_eq!(active.code, ErrorCode::ValidationFailed);
        assert_eq!(active.to_user_message(), "email: bad");
    }

    #[test]
    fn new_report_replaces_active() {
        let reporter = ErrorReporter::new();
        reporter.report(ErrorReport::not_found("first"));
        reporter.report(ErrorReport::internal("second"));

        let active = reporter.active().unwrap();
        assert_eq!(active.code, ErrorCode::Internal);
        // Both remain in history.
        assert_eq!(reporter.history().len(), 2);
    }

    #[test]
    fn dismiss_clears_active_once() {
        let reporter = ErrorReporter::new();
        reporter.report(ErrorReport::not_found("gone"));

        assert!(reporter.dismiss());
        assert!(reporter.active().is_none());
        assert!(!reporter.dismiss());
    }

    #[test]
    fn history_is_bounded_fifo() {
        let reporter = ErrorReporter::new();
        for i in 0..150 {
            reporter.report(ErrorReport::internal(format!("error {i}")));
        }

        let history = reporter.history();
        assert_eq!(history.len(), 100);
        assert_eq!(history[0].message, "error 50");
        assert_eq!(history[99].message, "error 149");
        assert_eq!(reporter.total_reported(), 150);
    }

    #[test]
    fn report_error_normalizes_crate_errors() {
        let reporter = ErrorReporter::new();
        let err = CardboardError::from(BridgeError::Transport("socket closed".into()));
        reporter.report_error(&err);

        let active = reporter.active().unwrap();
        assert_eq!(active.code, ErrorCode::Internal);
        assert!(active.cause.unwrap().contains("socket closed"));
    }
}
