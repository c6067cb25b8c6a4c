use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TaskRepositoryError;

/// Step status, declared in ascending order.
///
/// The derived `Ord` is the order [`BatchStatus::upgrade_to`] relies on:
/// `COMPLETED < STARTING < STARTED < STOPPING < STOPPED < FAILED < ABANDONED < UNKNOWN`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Completed,
    #[default]
    Starting,
    Started,
    Stopping,
    Stopped,
    Failed,
    Abandoned,
    Unknown,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 8] = [
        Self::Completed,
        Self::Starting,
        Self::Started,
        Self::Stopping,
        Self::Stopped,
        Self::Failed,
        Self::Abandoned,
        Self::Unknown,
    ];

    /// Combine a status recorded out of order with the current one.
    ///
    /// Once either side is past `STARTED` the more severe wins, so `FAILED`
    /// is never replaced by a late `COMPLETED`. While both are still at or
    /// below `STARTED`, `COMPLETED` wins over the start states.
    pub fn upgrade_to(self, other: BatchStatus) -> BatchStatus {
        if self > Self::Started || other > Self::Started {
            return self.max(other);
        }
        if self == Self::Completed || other == Self::Completed {
            return Self::Completed;
        }
        self.max(other)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Starting | Self::Started | Self::Stopping)
    }

    /// `FAILED` or worse
    pub fn is_unsuccessful(self) -> bool {
        self >= Self::Failed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Starting => "STARTING",
            Self::Started => "STARTED",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Failed => "FAILED",
            Self::Abandoned => "ABANDONED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = TaskRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskRepositoryError::invalid_argument(format!("unknown batch status: {s}")))
    }
}

/// Exit code plus free-form description of a step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitStatus {
    pub exit_code: String,
    #[serde(default)]
    pub exit_description: String,
}

impl ExitStatus {
    pub const UNKNOWN: &'static str = "UNKNOWN";
    pub const EXECUTING: &'static str = "EXECUTING";
    pub const COMPLETED: &'static str = "COMPLETED";
    pub const NOOP: &'static str = "NOOP";
    pub const FAILED: &'static str = "FAILED";
    pub const STOPPED: &'static str = "STOPPED";

    pub fn new(exit_code: impl Into<String>, exit_description: impl Into<String>) -> Self {
        Self {
            exit_code: exit_code.into(),
            exit_description: exit_description.into(),
        }
    }

    pub fn with_code(exit_code: impl Into<String>) -> Self {
        Self::new(exit_code, "")
    }

    pub fn unknown() -> Self {
        Self::with_code(Self::UNKNOWN)
    }

    pub fn executing() -> Self {
        Self::with_code(Self::EXECUTING)
    }

    pub fn completed() -> Self {
        Self::with_code(Self::COMPLETED)
    }

    pub fn noop() -> Self {
        Self::with_code(Self::NOOP)
    }

    pub fn failed() -> Self {
        Self::with_code(Self::FAILED)
    }

    pub fn stopped() -> Self {
        Self::with_code(Self::STOPPED)
    }

    /// Custom codes rank above every well-known one
    fn severity(&self) -> u8 {
        match self.exit_code.as_str() {
            Self::EXECUTING => 1,
            Self::COMPLETED => 2,
            Self::NOOP => 3,
            Self::STOPPED => 4,
            Self::FAILED => 5,
            Self::UNKNOWN => 6,
            _ => 7,
        }
    }

    /// Keep the more severe code and join both descriptions
    pub fn and(&self, other: &ExitStatus) -> ExitStatus {
        let mut combined = if other.severity() > self.severity() {
            ExitStatus::with_code(other.exit_code.clone())
        } else {
            ExitStatus::with_code(self.exit_code.clone())
        };
        combined.exit_description = self.exit_description.clone();
        combined.add_exit_description(&other.exit_description)
    }

    /// Append to the description, separated by `"; "`
    pub fn add_exit_description(mut self, description: &str) -> ExitStatus {
        if description.is_empty() || self.exit_description == description {
            return self;
        }
        if !self.exit_description.is_empty() {
            self.exit_description.push_str("; ");
        }
        self.exit_description.push_str(description);
        self
    }

    pub fn is_running(&self) -> bool {
        matches!(self.exit_code.as_str(), Self::EXECUTING | Self::UNKNOWN)
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::executing()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exitCode={};exitDescription={}",
            self.exit_code, self.exit_description
        )
    }
}
