/// Task status definitions for the crawl task lifecycle
///
/// A task moves `pending -> in_progress -> completed | failed | stopped`.
/// A pending task may also be stopped before it ever runs.
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    // ===== Active States =====
    /// Task has been accepted but no worker has picked it up yet
    Pending,

    /// Task is being crawled
    InProgress,

    // ===== Terminal States =====
    /// Frontier was exhausted
    Completed,

    /// An unrecoverable error ended the task
    Failed,

    /// A stop request ended the task
    Stopped,
}

impl TaskStatus {
    /// Returns true if this is a terminal state (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::InProgress | Self::Stopped),
            Self::InProgress => next.is_terminal(),
            Self::Completed | Self::Failed | Self::Stopped => false,
        }
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Returns all possible task statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::InProgress,
            Self::Completed,
            Self::Failed,
            Self::Stopped,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
