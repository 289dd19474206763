//! Event loop tying the poller, controller, presenter and stage together.

use std::{future::Future, sync::Arc, time::Duration};

use shared::{domain::Stats, protocol::LaunchEventRecord};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    controller::{Decision, LaunchStatusController},
    poller::StatusSource,
    presenter::{LaunchPresenter, SequenceTiming, Stage},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const FRAMES_PER_SECOND: f32 = 60.0;
const POLL_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    pub timing: SequenceTiming,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            timing: SequenceTiming::default(),
        }
    }
}

/// One successful fetch forwarded from the poll task.
#[derive(Debug, Clone)]
pub enum PollUpdate {
    Events(Vec<LaunchEventRecord>),
    Stats(Stats),
}

pub struct LaunchRuntime<S: Stage> {
    controller: LaunchStatusController,
    presenter: LaunchPresenter,
    stage: S,
    config: RuntimeConfig,
}

impl<S: Stage> LaunchRuntime<S> {
    pub fn new(stage: S, config: RuntimeConfig) -> Self {
        Self {
            controller: LaunchStatusController::new(),
            presenter: LaunchPresenter::new(config.timing),
            stage,
            config,
        }
    }

    pub fn controller(&self) -> &LaunchStatusController {
        &self.controller
    }

    pub fn presenter(&self) -> &LaunchPresenter {
        &self.presenter
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Applies one poll result. Stats are always forwarded; events only
    /// reach the presenter when they validate.
    pub fn handle_update(&mut self, update: PollUpdate, now: Instant) -> Option<Decision> {
        match update {
            PollUpdate::Stats(stats) => {
                self.stage.show_stats(stats);
                None
            }
            PollUpdate::Events(records) => match self.controller.ingest_events(&records) {
                Ok(decision) => {
                    self.presenter.apply(decision, now, &mut self.stage);
                    Some(decision)
                }
                Err(error) => {
                    warn!(%error, records = records.len(), "skipping poll tick");
                    None
                }
            },
        }
    }

    /// Fires launch phases that have come due.
    pub fn advance(&mut self, now: Instant) -> usize {
        self.presenter.advance(now, &mut self.stage)
    }

    /// Runs until `shutdown` resolves or the poll task goes away, then hands
    /// the stage back.
    pub async fn run<F>(mut self, source: Arc<dyn StatusSource>, shutdown: F) -> S
    where
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel(POLL_CHANNEL_CAPACITY);
        let poll_task = spawn_poll_task(source, self.config.poll_interval, tx);

        let mut frames = time::interval(self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "launch runtime started"
        );

        tokio::pin!(shutdown);
        loop {
            let deadline = self.presenter.next_deadline();
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                update = rx.recv() => {
                    let Some(update) = update else {
                        warn!("poll task stopped");
                        break;
                    };
                    self.handle_update(update, Instant::now());
                }
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.advance(Instant::now());
                }
                tick = frames.tick() => {
                    let dt = tick.saturating_duration_since(last_frame).as_secs_f32() * FRAMES_PER_SECOND;
                    last_frame = tick;
                    self.stage.advance_frame(dt);
                }
            }
        }

        poll_task.abort();
        self.stage
    }
}

fn spawn_poll_task(
    source: Arc<dyn StatusSource>,
    poll_interval: Duration,
    tx: mpsc::Sender<PollUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("poll tick");

            match source.fetch_events().await {
                Ok(records) => {
                    if tx.send(PollUpdate::Events(records)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "status poll failed; tick skipped"),
            }

            match source.fetch_stats().await {
                Ok(Some(stats)) => {
                    if tx.send(PollUpdate::Stats(stats)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(error) => warn!(%error, "stats poll failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
