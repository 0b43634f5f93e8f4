use super::{EventHandle, OwnerId};

/// Misuse of a handle or owner. Recoverable: callers usually log and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{0} already fired or was cancelled")]
    AlreadyRemoved(EventHandle),
    #[error("{0} is not registered")]
    UnknownOwner(OwnerId),
    #[error("{0} has no matching event")]
    NotFound(OwnerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TickError {
    #[error("pulse {now} requested from inside a callback")]
    Reentrant { now: u64 },
    #[error("expected pulse {expected}, got {now}")]
    OutOfOrder { expected: u64, now: u64 },
    #[error("pulse {now} fired {limit} events without draining; an event keeps rescheduling itself")]
    Runaway { now: u64, limit: usize },
}
