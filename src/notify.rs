//! Notification relay.
//!
//! Screens never render dialogs themselves; they hand a [`Notice`] to
//! whatever the shell registered. The relay is a pure sink — the one flow
//! that needs to act after dismissal (post-login navigation) returns a
//! route from its controller instead of smuggling a callback through here.

use std::cell::RefCell;

/// Severity of a user-facing notice, mapping onto the shell's dialog kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, title: title.into(), message: message.into() }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: title.into(), message: message.into() }
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, title: title.into(), message: message.into() }
    }

    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, title: title.into(), message: message.into() }
    }
}

/// Sink for user-facing notifications, implemented by the UI shell.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Fallback notifier that only traces. Useful for headless runs.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error | NoticeKind::Warning => {
                tracing::warn!(title = %notice.title, message = %notice.message, "notice")
            }
            _ => tracing::info!(title = %notice.title, message = %notice.message, "notice"),
        }
    }
}

/// Test notifier that records everything it is handed.
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self { notices: RefCell::new(Vec::new()) }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
