/// Crawl lifecycle definitions
///
/// A crawl moves `Idle -> Running` once and then ends in exactly one of the
/// terminal states.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Configured but not started
    Idle,

    /// Frontier loop is active
    Running,

    /// Stopped normally (budget, frontier or deadline)
    Completed,

    /// Stopped on a resource-level failure
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Moves to `to`, rejecting edges outside the lifecycle
    pub fn transition(self, to: CrawlState) -> Result<CrawlState, HarvestError> {
        match (self, to) {
            (Self::Idle, Self::Running)
            | (Self::Running, Self::Completed)
            | (Self::Running, Self::Aborted) => Ok(to),
            (from, to) => Err(HarvestError::InvalidTransition { from, to }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a crawl stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `max-pages` records were written
    BudgetReached,

    /// No candidate URLs remained
    FrontierExhausted,

    /// `max-runtime-secs` elapsed
    DeadlineReached,

    /// Output could not be written; carries the cause
    Aborted(String),
}

impl StopReason {
    /// The lifecycle state this reason terminates in
    pub fn terminal_state(&self) -> CrawlState {
        match self {
            Self::Aborted(_) => CrawlState::Aborted,
            _ => CrawlState::Completed,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetReached => write!(f, "budget reached"),
            Self::FrontierExhausted => write!(f, "frontier exhausted"),
            Self::DeadlineReached => write!(f, "deadline reached"),
            Self::Aborted(cause) => write!(f, "aborted: {}", cause),
        }
    }
}
