pub mod controller;
pub mod poller;
pub mod presenter;
pub mod runtime;

pub use controller::{ControllerError, ControllerState, Decision, LaunchStatusController};
pub use poller::{HttpStatusPoller, PollError, PollerConfig, StatusSource};
pub use presenter::{
    AnimationEngine, LaunchPresenter, Renderer, RocketSprite, SequenceTiming, Stage, StatsDisplay,
    VisualState,
};
pub use runtime::{LaunchRuntime, PollUpdate, RuntimeConfig};

#[cfg(test)]
pub(crate) mod test_support {
    use shared::domain::Stats;

    use crate::presenter::{AnimationEngine, Renderer, RocketSprite, Stage, StatsDisplay};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum StageCall {
        PlayReady,
        PlayFiring,
        PlayLaunch,
        Sprite(RocketSprite),
        Stats(Stats),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingStage {
        pub(crate) calls: Vec<StageCall>,
        pub(crate) frames: usize,
    }

    impl AnimationEngine for RecordingStage {
        fn play_ready(&mut self) {
            self.calls.push(StageCall::PlayReady);
        }

        fn play_firing(&mut self) {
            self.calls.push(StageCall::PlayFiring);
        }

        fn play_launch(&mut self) {
            self.calls.push(StageCall::PlayLaunch);
        }
    }

    impl Renderer for RecordingStage {
        fn set_rocket_sprite(&mut self, sprite: RocketSprite) {
            self.calls.push(StageCall::Sprite(sprite));
        }
    }

    impl StatsDisplay for RecordingStage {
        fn show_stats(&mut self, stats: Stats) {
            self.calls.push(StageCall::Stats(stats));
        }
    }

    impl Stage for RecordingStage {
        fn advance_frame(&mut self, _dt: f32) {
            self.frames += 1;
        }
    }
}
