//! Transient status messages ("Copied 2 node(s)") shown after an operation.
//!
//! A board holds at most one notice. Posting replaces whatever is showing,
//! and a notice expires [`NOTICE_TTL`] after it was posted. Every method
//! that depends on time has an `_at` variant taking an explicit `Instant`
//! so expiry is testable without sleeping.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(2);

/// Visual tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub posted_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn is_live_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.posted_at) < NOTICE_TTL
    }
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, message: impl Into<String>, level: NoticeLevel) {
        self.post_at(message, level, Instant::now());
    }

    pub fn post_at(&mut self, message: impl Into<String>, level: NoticeLevel, now: Instant) {
        self.current = Some(Notice { message: message.into(), level, posted_at: now });
    }

    /// The visible notice, if one was posted less than [`NOTICE_TTL`] ago.
    #[must_use]
    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    #[must_use]
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| n.is_live_at(now))
    }

    /// Drop an expired notice. Returns true if one was removed.
    pub fn prune_at(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| !n.is_live_at(now)) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;
