//! Visual state machine driven by controller decisions.
//!
//! The presenter never blocks: the later phases of a launch are kept as
//! deadlines and fired by whoever owns the clock via [`LaunchPresenter::advance`].

use std::{collections::VecDeque, time::Duration};

use shared::domain::Stats;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::controller::Decision;

pub const DEFAULT_FIRING_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_LIFTOFF_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Ready,
    Firing,
    Launching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketSprite {
    Off,
    OnGround,
    OnAir,
}

impl RocketSprite {
    pub fn texture_name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::OnGround => "on_ground",
            Self::OnAir => "on_air",
        }
    }
}

pub trait AnimationEngine {
    fn play_ready(&mut self);
    fn play_firing(&mut self);
    fn play_launch(&mut self);
}

pub trait Renderer {
    fn set_rocket_sprite(&mut self, sprite: RocketSprite);
}

pub trait StatsDisplay {
    fn show_stats(&mut self, stats: Stats);
}

/// Everything the runtime drives: timelines, sprites, counters and frames.
pub trait Stage: AnimationEngine + Renderer + StatsDisplay {
    /// `dt` is elapsed time in 60 Hz frame units.
    fn advance_frame(&mut self, _dt: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTiming {
    pub firing_delay: Duration,
    pub liftoff_delay: Duration,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            firing_delay: DEFAULT_FIRING_DELAY,
            liftoff_delay: DEFAULT_LIFTOFF_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ignition,
    Liftoff,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledPhase {
    due: Instant,
    phase: Phase,
}

#[derive(Debug)]
pub struct LaunchPresenter {
    state: VisualState,
    timing: SequenceTiming,
    scheduled: VecDeque<ScheduledPhase>,
}

impl LaunchPresenter {
    pub fn new(timing: SequenceTiming) -> Self {
        Self {
            state: VisualState::Ready,
            timing,
            scheduled: VecDeque::new(),
        }
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn timing(&self) -> SequenceTiming {
        self.timing
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.front().map(|scheduled| scheduled.due)
    }

    pub fn pending_phases(&self) -> usize {
        self.scheduled.len()
    }

    pub fn apply<S>(&mut self, decision: Decision, now: Instant, stage: &mut S)
    where
        S: AnimationEngine + Renderer + ?Sized,
    {
        match decision {
            Decision::NoOp => {}
            Decision::Ignore => {
                debug!(state = ?self.state, "unrecognized launch status; presentation unchanged");
            }
            Decision::ResetToReady => {
                self.cancel_scheduled();
                self.enter_ready(stage);
            }
            Decision::PlayLaunchSequence => {
                self.cancel_scheduled();
                self.enter_ready(stage);
                let ignition_at = now + self.timing.firing_delay;
                let liftoff_at = ignition_at + self.timing.liftoff_delay;
                self.scheduled.push_back(ScheduledPhase {
                    due: ignition_at,
                    phase: Phase::Ignition,
                });
                self.scheduled.push_back(ScheduledPhase {
                    due: liftoff_at,
                    phase: Phase::Liftoff,
                });
                info!(
                    firing_delay_ms = self.timing.firing_delay.as_millis() as u64,
                    liftoff_delay_ms = self.timing.liftoff_delay.as_millis() as u64,
                    "launch sequence scheduled"
                );
            }
        }
    }

    /// Fires every phase due at or before `now`, in schedule order.
    pub fn advance<S>(&mut self, now: Instant, stage: &mut S) -> usize
    where
        S: AnimationEngine + Renderer + ?Sized,
    {
        let mut fired = 0;
        while let Some(next) = self.scheduled.front().copied() {
            if next.due > now {
                break;
            }
            self.scheduled.pop_front();
            match next.phase {
                Phase::Ignition => {
                    self.state = VisualState::Firing;
                    stage.play_firing();
                    stage.set_rocket_sprite(RocketSprite::OnGround);
                }
                Phase::Liftoff => {
                    self.state = VisualState::Launching;
                    stage.play_launch();
                    stage.set_rocket_sprite(RocketSprite::OnAir);
                }
            }
            info!(state = ?self.state, "launch phase entered");
            fired += 1;
        }
        fired
    }

    fn enter_ready<S>(&mut self, stage: &mut S)
    where
        S: AnimationEngine + Renderer + ?Sized,
    {
        self.state = VisualState::Ready;
        stage.play_ready();
        stage.set_rocket_sprite(RocketSprite::Off);
    }

    fn cancel_scheduled(&mut self) {
        if !self.scheduled.is_empty() {
            debug!(
                cancelled = self.scheduled.len(),
                "cancelling in-flight launch phases"
            );
            self.scheduled.clear();
        }
    }
}

impl Default for LaunchPresenter {
    fn default() -> Self {
        Self::new(SequenceTiming::default())
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
