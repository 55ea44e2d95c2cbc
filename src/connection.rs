//! Connection state derived from snapshot poll outcomes.

use serde::Serialize;

/// Whether the most recent snapshot poll reached the detection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConnectionState {
    #[default]
    Connected,
    Degraded,
}

impl ConnectionState {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ConnectionState::Degraded)
    }
}

/// Result of a single poll, stripped of any payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Success,
    Failure,
}

impl<T, E> From<&Result<T, E>> for PollOutcome {
    fn from(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            PollOutcome::Success
        } else {
            PollOutcome::Failure
        }
    }
}

/// Next connection state after a poll.
///
/// The previous state is ignored: the state flips on every result so that
/// staleness shows up within one poll interval.
pub fn update_connection(_previous: ConnectionState, outcome: PollOutcome) -> ConnectionState {
    match outcome {
        PollOutcome::Success => ConnectionState::Connected,
        PollOutcome::Failure => ConnectionState::Degraded,
    }
}
