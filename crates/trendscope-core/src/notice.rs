//! User-facing notifications emitted while a fetch runs.
//!
//! The fetcher and presenter push [`Notice`]s through a [`Notifier`]; the web
//! page collects them in a [`NoticeLog`] and the CLI prints them to stderr.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message surfaced to the person who triggered the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(NoticeLevel, &str) + Send + Sync,
{
    fn notify(&self, level: NoticeLevel, message: &str) {
        self(level, message);
    }
}

/// Forwards notices to `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(notice = message),
            NoticeLevel::Warning => tracing::warn!(notice = message),
            NoticeLevel::Error => tracing::error!(notice = message),
        }
    }
}

/// Collects notices in order for a single request.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    #[must_use]
    pub fn into_notices(self) -> Vec<Notice> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice::new(level, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_log_keeps_order() {
        let log = NoticeLog::new();
        log.notify(NoticeLevel::Warning, "first");
        log.notify(NoticeLevel::Error, "second");
        let notices = log.into_notices();
        assert_eq!(
            notices,
            vec![
                Notice::new(NoticeLevel::Warning, "first"),
                Notice::new(NoticeLevel::Error, "second"),
            ]
        );
    }

    #[test]
    fn count_filters_by_level() {
        let log = NoticeLog::new();
        log.notify(NoticeLevel::Warning, "a");
        log.notify(NoticeLevel::Warning, "b");
        log.notify(NoticeLevel::Success, "c");
        assert_eq!(log.count(NoticeLevel::Warning), 2);
        assert_eq!(log.count(NoticeLevel::Success), 1);
        assert_eq!(log.count(NoticeLevel::Error), 0);
    }

    #[test]
    fn closures_are_notifiers() {
        let seen = Mutex::new(Vec::new());
        let notifier = |level: NoticeLevel, message: &str| {
            seen.lock().unwrap().push(format!("{}:{message}", level.as_str()));
        };
        notifier.notify(NoticeLevel::Info, "hello");
        assert_eq!(seen.into_inner().unwrap(), vec!["info:hello".to_string()]);
    }

    #[test]
    fn level_serializes_snake_case() {
        let json = serde_json::to_string(&Notice::new(NoticeLevel::Success, "ok")).unwrap();
        assert_eq!(json, r#"{"level":"success","message":"ok"}"#);
    }
}
