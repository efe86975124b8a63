//! User-facing notices ("toasts") and where they go

use console::style;
use std::cell::RefCell;
use std::fmt;

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Destructive,
}

/// A short notice with a title and a one-line description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_severity(Severity::Success, title, description)
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_severity(Severity::Destructive, title, description)
    }

    fn with_severity(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Sink for notices. Delivery is fire-and-forget and never fails the caller.
pub trait Notifier {
    fn notify(&self, toast: &Toast);
}

/// Writes notices to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: &Toast) {
        let marker = match toast.severity {
            Severity::Info => style("●").cyan(),
            Severity::Success => style("✓").green(),
            Severity::Destructive => style("✗").red(),
        };
        eprintln!("{} {}", marker, style(&toast.title).bold());
        if !toast.description.is_empty() {
            eprintln!("  {}", style(&toast.description).dim());
        }
    }
}

/// Keeps every notice in memory, for tests and headless callers
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: RefCell<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.toasts.borrow().iter().map(|t| t.title.clone()).collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: &Toast) {
        self.toasts.borrow_mut().push(toast.clone());
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, toast: &Toast) {
        (**self).notify(toast);
    }
}
