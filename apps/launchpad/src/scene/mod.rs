//! Headless scene model: night sky, skyline, rocket and the stats box.
//!
//! The scene is the stage the launch runtime drives. Nothing is drawn; state
//! changes are reported through `tracing` so a frontend (or a log reader) can
//! follow along.

pub mod rocket;
pub mod stars;

use launch_core::{AnimationEngine, Renderer, RocketSprite, Stage, StatsDisplay};
use shared::domain::Stats;
use tracing::{debug, info};

use rocket::Rocket;
use stars::StarField;

pub const WIDTH: f32 = 1024.0;
pub const HEIGHT: f32 = 1024.0;
/// Top of the launch pad in the skyline artwork.
pub const GROUND_Y: f32 = HEIGHT - 48.0;
pub const HEADLINE: &str = "MOIA rockets launched";
pub const LAUNCH_QUAKE: f32 = 1.0;
const SHAKE_DECAY: f32 = 0.9;
const SHAKE_EPSILON: f32 = 0.01;
const REPORT_EVERY_FRAMES: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkylineTexture {
    NoFire,
    FireMedium,
    FireMax,
}

impl SkylineTexture {
    pub fn asset_key(self) -> &'static str {
        match self {
            Self::NoFire => "bg_no_fire",
            Self::FireMedium => "bg_fire_medium",
            Self::FireMax => "bg_fire_max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    Ready,
    Firing,
    Launch,
}

impl Timeline {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Firing => "firing",
            Self::Launch => "launch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsText {
    pub headline: String,
    pub success: String,
    pub failure: String,
}

impl StatsText {
    pub fn for_stats(stats: Stats) -> Self {
        Self {
            headline: HEADLINE.to_string(),
            success: format!("Success: {}", stats.success),
            failure: format!("Failure: {}", stats.failure),
        }
    }
}

#[derive(Debug)]
pub struct Scene {
    stars: StarField,
    skyline: SkylineTexture,
    rocket: Rocket,
    timeline: Timeline,
    stats: Stats,
    stats_text: StatsText,
    screen_shake: f32,
    frames: u64,
    rocket_gone: bool,
}

impl Scene {
    pub fn new(star_count: usize, seed: u64) -> Self {
        let stats = Stats::default();
        Self {
            stars: StarField::new(star_count, seed),
            skyline: SkylineTexture::NoFire,
            rocket: Rocket::on_pad(),
            timeline: Timeline::Ready,
            stats,
            stats_text: StatsText::for_stats(stats),
            screen_shake: 0.0,
            frames: 0,
            rocket_gone: false,
        }
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn skyline(&self) -> SkylineTexture {
        self.skyline
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn stats_text(&self) -> &StatsText {
        &self.stats_text
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Easter egg: shake the whole scene. Stronger quakes win over weaker ones.
    pub fn quake(&mut self, strength: f32) {
        self.screen_shake = self.screen_shake.max(strength);
    }

    fn play(&mut self, timeline: Timeline, skyline: SkylineTexture) {
        self.timeline = timeline;
        self.skyline = skyline;
        info!(
            timeline = timeline.name(),
            skyline = skyline.asset_key(),
            "timeline started"
        );
    }
}

impl AnimationEngine for Scene {
    fn play_ready(&mut self) {
        self.rocket.reset();
        self.rocket_gone = false;
        self.play(Timeline::Ready, SkylineTexture::NoFire);
    }

    fn play_firing(&mut self) {
        self.play(Timeline::Firing, SkylineTexture::FireMedium);
    }

    fn play_launch(&mut self) {
        self.rocket.lift_off();
        self.quake(LAUNCH_QUAKE);
        self.play(Timeline::Launch, SkylineTexture::FireMax);
    }
}

impl Renderer for Scene {
    fn set_rocket_sprite(&mut self, sprite: RocketSprite) {
        self.rocket.sprite = sprite;
        debug!(texture = sprite.texture_name(), "rocket sprite swapped");
    }
}

impl StatsDisplay for Scene {
    fn show_stats(&mut self, stats: Stats) {
        if stats != self.stats {
            info!(
                success = stats.success,
                failure = stats.failure,
                "launch stats updated"
            );
        }
        self.stats = stats;
        self.stats_text = StatsText::for_stats(stats);
    }
}

impl Stage for Scene {
    fn advance_frame(&mut self, dt: f32) {
        self.stars.step(dt);
        self.rocket.step(dt);
        self.screen_shake *= SHAKE_DECAY;
        if self.screen_shake < SHAKE_EPSILON {
            self.screen_shake = 0.0;
        }
        self.frames += 1;

        if !self.rocket_gone && self.rocket.out_of_view() {
            self.rocket_gone = true;
            info!(frame = self.frames, "rocket left the sky");
        }
        if self.frames % REPORT_EVERY_FRAMES == 0 {
            debug!(
                frame = self.frames,
                sky_alpha = self.stars.alpha(),
                rocket_x = self.rocket.x,
                rocket_y = self.rocket.y,
                shake = self.screen_shake,
                "scene"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_is_idle() {
        let scene = Scene::new(10, 1);
        assert_eq!(scene.timeline(), Timeline::Ready);
        assert_eq!(scene.skyline(), SkylineTexture::NoFire);
        assert_eq!(scene.rocket(), &Rocket::on_pad());
        assert_eq!(scene.stats_text().success, "Success: 0");
    }

    #[test]
    fn launch_timeline_sets_skyline_on_fire_and_flies() {
        let mut scene = Scene::new(0, 1);
        scene.play_firing();
        scene.set_rocket_sprite(RocketSprite::OnGround);
        assert_eq!(scene.skyline(), SkylineTexture::FireMedium);
        scene.advance_frame(5.0);
        assert_eq!(scene.rocket().y, Rocket::on_pad().y);

        scene.play_launch();
        scene.set_rocket_sprite(RocketSprite::OnAir);
        scene.advance_frame(5.0);
        assert_eq!(scene.timeline().name(), "launch");
        assert_eq!(scene.skyline().asset_key(), "bg_fire_max");
        assert_eq!(scene.rocket().sprite, RocketSprite::OnAir);
        assert!(scene.rocket().y < Rocket::on_pad().y);

        scene.play_ready();
        assert_eq!(scene.rocket(), &Rocket::on_pad());
        assert_eq!(scene.skyline(), SkylineTexture::NoFire);
    }

    #[test]
    fn stats_text_tracks_latest_counters() {
        let mut scene = Scene::new(0, 1);
        scene.show_stats(Stats {
            success: 7,
            failure: 2,
        });
        let text = scene.stats_text();
        assert_eq!(text.headline, HEADLINE);
        assert_eq!(text.success, "Success: 7");
        assert_eq!(text.failure, "Failure: 2");
    }

    #[test]
    fn quake_decays_to_rest() {
        let mut scene = Scene::new(0, 1);
        scene.quake(LAUNCH_QUAKE);
        scene.advance_frame(1.0);
        assert!((scene.screen_shake - 0.9).abs() < 1e-6);

        for _ in 0..100 {
            scene.advance_frame(1.0);
        }
        assert_eq!(scene.screen_shake, 0.0);
        assert_eq!(scene.frame_count(), 101);
    }

    #[test]
    fn launch_timeline_sets_off_a_quake() {
        let mut scene = Scene::new(0, 1);
        assert_eq!(scene.screen_shake, 0.0);

        scene.play_launch();
        assert_eq!(scene.screen_shake, LAUNCH_QUAKE);

        scene.advance_frame(1.0);
        assert!(scene.screen_shake > 0.0 && scene.screen_shake < LAUNCH_QUAKE);

        scene.play_ready();
        scene.play_firing();
        assert!(scene.screen_shake < LAUNCH_QUAKE);
    }
}
