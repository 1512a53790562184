use crate::config::ReconnectSettings;
use std::time::Duration;

/// Fixed-interval retry policy. No backoff: every retry waits `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectSettings::default())
    }
}

impl From<&ReconnectSettings> for ReconnectPolicy {
    fn from(settings: &ReconnectSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.interval_ms),
            settings.max_attempts,
        )
    }
}

/// Retries scheduled since the last successful open
#[derive(Debug, Default)]
pub struct ReconnectState {
    attempts: u32,
}

impl ReconnectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Called on a successful open and on a manual reopen
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Delay before the next attempt after an involuntary close, or `None`
    /// when the widget is closed or the budget is spent.
    pub fn next_delay(&mut self, policy: &ReconnectPolicy, widget_open: bool) -> Option<Duration> {
        if !widget_open || self.attempts >= policy.max_attempts() {
            return None;
        }
        self.attempts += 1;
        Some(policy.interval())
    }
}
