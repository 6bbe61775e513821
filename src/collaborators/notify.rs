//! User-facing notices.

use std::sync::Mutex;

use serde::Serialize;

use crate::email::EmailError;
use crate::service::types::SubmissionError;

/// What kind of message the user is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeCategory {
    Info,
    ValidationError,
    UnknownError,
    Timeout,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub category: NoticeCategory,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(category: NoticeCategory, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn email_sent() -> Self {
        Self::new(
            NoticeCategory::Info,
            "Email sent!",
            "Check your inbox and confirm the email.",
        )
    }

    pub fn timed_out() -> Self {
        Self::new(
            NoticeCategory::Timeout,
            "Timed out",
            "Email confirmation was not completed in time. Please try again.",
        )
    }

    pub fn invalid_email(error: EmailError) -> Self {
        let title = match error {
            EmailError::Empty => "Required field",
            EmailError::Malformed => "Invalid email",
        };
        Self::new(
            NoticeCategory::ValidationError,
            title,
            "Please enter a valid email address.",
        )
    }

    pub fn submission_failed(error: &SubmissionError) -> Self {
        match error {
            SubmissionError::Network(message) => {
                Self::new(NoticeCategory::UnknownError, "Error", message.clone())
            }
            SubmissionError::Validation(message) => {
                Self::new(NoticeCategory::ValidationError, "Validation error", message.clone())
            }
            SubmissionError::Unknown(..) => {
                Self::new(NoticeCategory::UnknownError, "Unknown error", error.to_string())
            }
        }
    }
}

/// Shows notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps every notice, for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn categories(&self) -> Vec<NoticeCategory> {
        self.notices().into_iter().map(|n| n.category).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_notices() {
        let notice = Notice::submission_failed(&SubmissionError::Validation("bad email".into()));
        assert_eq!(notice.category, NoticeCategory::ValidationError);
        assert_eq!(notice.message, "bad email");

        let notice = Notice::submission_failed(&SubmissionError::Unknown(500, "boom".into()));
        assert_eq!(notice.category, NoticeCategory::UnknownError);
        assert_eq!(notice.message, "Status: 500 - boom");

        let notice = Notice::submission_failed(&SubmissionError::Network("refused".into()));
        assert_eq!(notice.category, NoticeCategory::UnknownError);
    }

    #[test]
    fn test_invalid_email_titles() {
        assert_eq!(Notice::invalid_email(EmailError::Empty).title, "Required field");
        assert_eq!(Notice::invalid_email(EmailError::Malformed).title, "Invalid email");
    }
}
