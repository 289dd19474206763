//! Maps polled launch events to visual transitions.

use shared::{
    domain::{LaunchEvent, LaunchStatus},
    error::RecordError,
    protocol::LaunchEventRecord,
};
use thiserror::Error;
use tracing::{debug, info};

/// What a poll result implies for the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Status unchanged or no data.
    NoOp,
    ResetToReady,
    PlayLaunchSequence,
    /// Unrecognized status: no visual change.
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub last_observed_status: Option<LaunchStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("invalid event data at index {index}: {source}")]
    InvalidEventData {
        index: usize,
        #[source]
        source: RecordError,
    },
}

#[derive(Debug, Default)]
pub struct LaunchStatusController {
    state: ControllerState,
}

impl LaunchStatusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ControllerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn last_observed_status(&self) -> Option<&LaunchStatus> {
        self.state.last_observed_status.as_ref()
    }

    /// Validates every record before touching state, so a malformed payload
    /// leaves the last observed status as it was.
    pub fn ingest_events(
        &mut self,
        records: &[LaunchEventRecord],
    ) -> Result<Decision, ControllerError> {
        let events = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .to_event()
                    .map_err(|source| ControllerError::InvalidEventData { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.ingest_launch_events(&events))
    }

    pub fn ingest_launch_events(&mut self, events: &[LaunchEvent]) -> Decision {
        let Some(latest) = latest_event(events) else {
            return Decision::NoOp;
        };

        if self.state.last_observed_status.as_ref() == Some(&latest.status) {
            debug!(status = %latest.status, "launch status unchanged");
            return Decision::NoOp;
        }

        let decision = match &latest.status {
            LaunchStatus::Pending => Decision::ResetToReady,
            LaunchStatus::Success => Decision::PlayLaunchSequence,
            LaunchStatus::Other(_) => Decision::Ignore,
        };
        info!(
            previous = ?self.state.last_observed_status.as_ref().map(LaunchStatus::as_str),
            status = %latest.status,
            status_at = %latest.status_at,
            ?decision,
            "launch status changed"
        );
        self.state.last_observed_status = Some(latest.status.clone());
        decision
    }
}

/// The event with the greatest `status_at`; on ties the later one in input order wins.
pub fn latest_event(events: &[LaunchEvent]) -> Option<&LaunchEvent> {
    events.iter().max_by_key(|event| event.status_at)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
