//! The deduplication window.
//!
//! This module holds the pure decision rule behind the dedup store: given the
//! last accepted notification for a location (if any), a label and the
//! current time, decide whether a new notification goes out.
//!
//! The window slides from the *last accepted send*. Suppressed calls never
//! move it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window used when none is configured.
pub const DEFAULT_WINDOW_MS: u64 = 500;

/// Last notification accepted for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupEntry {
    /// Label the notification was sent for
    pub label: String,
    /// Caller-supplied timestamp of the send, in milliseconds
    pub last_sent_at_ms: i64,
}

impl DedupEntry {
    /// Create an entry for a send that happened at `now_ms`.
    pub fn new(label: impl Into<String>, now_ms: i64) -> Self {
        Self {
            label: label.into(),
            last_sent_at_ms: now_ms,
        }
    }
}

/// How to treat a timestamp that is earlier than the recorded send.
///
/// Callers are expected to pass a monotonic clock, but hosts reload worlds
/// and rewind time. Plain elapsed-time arithmetic would yield a negative
/// interval that is "inside" the window forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockRegression {
    /// Treat the event as new: send, and record the earlier timestamp.
    #[default]
    Resend,
    /// Treat the negative interval as inside the window.
    Suppress,
}

/// Why a notification was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendReason {
    /// Nothing recorded for the location
    FirstSeen,
    /// A different label was recorded for the location
    LabelChanged,
    /// The window since the last send has fully elapsed
    WindowElapsed,
    /// The timestamp went backwards relative to the last send
    ClockRegressed,
}

/// Outcome of a window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// Send the notification and record it
    Send(SendReason),
    /// Duplicate within the window; leave the record untouched
    Suppress,
}

impl WindowDecision {
    /// Check if this decision is Send.
    pub fn is_send(&self) -> bool {
        matches!(self, WindowDecision::Send(_))
    }

    /// Check if this decision is Suppress.
    pub fn is_suppress(&self) -> bool {
        matches!(self, WindowDecision::Suppress)
    }
}

/// Time-window deduplication rule.
///
/// # Example
/// ```
/// use quern_notify::{DedupEntry, DedupWindow};
///
/// let window = DedupWindow::from_millis(500);
/// let last = DedupEntry::new("Flint", 1000);
///
/// assert!(window.decide(None, "Flint", 1000).is_send());
/// assert!(window.decide(Some(&last), "Flint", 1200).is_suppress());
/// assert!(window.decide(Some(&last), "Flint", 1500).is_send());
/// assert!(window.decide(Some(&last), "Bone", 1200).is_send());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupWindow {
    window_ms: i64,
    on_regression: ClockRegression,
}

impl DedupWindow {
    /// Create a window of `window_ms` milliseconds.
    ///
    /// Values beyond `i64::MAX` are clamped.
    pub fn from_millis(window_ms: u64) -> Self {
        Self {
            window_ms: i64::try_from(window_ms).unwrap_or(i64::MAX),
            on_regression: ClockRegression::default(),
        }
    }

    /// Create a window from a duration, truncated to whole milliseconds.
    pub fn from_duration(window: Duration) -> Self {
        Self::from_millis(u64::try_from(window.as_millis()).unwrap_or(u64::MAX))
    }

    /// Set the clock regression behavior.
    pub fn with_clock_regression(mut self, on_regression: ClockRegression) -> Self {
        self.on_regression = on_regression;
        self
    }

    /// Window length in milliseconds.
    pub fn millis(&self) -> i64 {
        self.window_ms
    }

    /// Window length as a duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.window_ms.unsigned_abs())
    }

    /// Configured clock regression behavior.
    pub fn clock_regression(&self) -> ClockRegression {
        self.on_regression
    }

    /// Decide whether a notification for `label` at `now_ms` should be sent.
    pub fn decide(&self, previous: Option<&DedupEntry>, label: &str, now_ms: i64) -> WindowDecision {
        let Some(previous) = previous else {
            return WindowDecision::Send(SendReason::FirstSeen);
        };

        if previous.label != label {
            return WindowDecision::Send(SendReason::LabelChanged);
        }

        if now_ms < previous.last_sent_at_ms {
            return match self.on_regression {
                ClockRegression::Resend => WindowDecision::Send(SendReason::ClockRegressed),
                ClockRegression::Suppress => WindowDecision::Suppress,
            };
        }

        // now >= last, so the only overflow is a difference above i64::MAX.
        match now_ms.checked_sub(previous.last_sent_at_ms) {
            Some(elapsed) if elapsed < self.window_ms => WindowDecision::Suppress,
            _ => WindowDecision::Send(SendReason::WindowElapsed),
        }
    }

    /// Whether `entry` can no longer suppress anything at or after `now_ms`.
    ///
    /// An expired entry behaves exactly like a missing one for every
    /// timestamp `>= now_ms`, so it is safe to drop.
    pub fn is_expired(&self, entry: &DedupEntry, now_ms: i64) -> bool {
        if now_ms < entry.last_sent_at_ms {
            return false;
        }
        match now_ms.checked_sub(entry.last_sent_at_ms) {
            Some(elapsed) => elapsed >= self.window_ms,
            None => true,
        }
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::from_millis(DEFAULT_WINDOW_MS)
    }
}
