//! Transient user-facing notifications produced by view flows.

use std::time::Duration;

/// How long a notice stays up before it times out.
pub const SHORT: Duration = Duration::from_secs(2);
pub const MEDIUM: Duration = Duration::from_secs(3);
pub const LONG: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A dismissible message, analogous to a snackbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>, duration: Duration) -> Self {
        Self { level: Level::Info, message: message.into(), duration }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self { level: Level::Error, message: message.into(), duration }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
