//! Twinkling star particles.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{HEIGHT, WIDTH};

pub const DEFAULT_STAR_COUNT: usize = 1000;
pub const STAR_MAX_SCALE: f32 = 0.02;
/// Container alpha gained per frame while fading in.
pub const FADE_IN_RATE: f32 = 0.003;
/// Per-frame alpha loss of a single star.
pub const TWINKLE_DECAY: f32 = 0.0002;
/// Added to the random alpha a burnt-out star is re-lit with.
pub const RELIGHT_FLOOR: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub alpha: f32,
}

#[derive(Debug)]
pub struct StarField {
    stars: Vec<Star>,
    alpha: f32,
    rng: Pcg32,
}

impl StarField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| Star {
                x: rng.random::<f32>() * WIDTH,
                y: rng.random::<f32>() * HEIGHT,
                scale: rng.random::<f32>() * STAR_MAX_SCALE,
                alpha: rng.random::<f32>(),
            })
            .collect();
        Self {
            stars,
            alpha: 0.0,
            rng,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn step(&mut self, dt: f32) {
        self.fade_in(dt);
        self.twinkle();
    }

    fn fade_in(&mut self, dt: f32) {
        if self.alpha < 1.0 {
            self.alpha = (self.alpha + FADE_IN_RATE * dt).min(1.0);
        }
    }

    // Decay is per frame, not per dt.
    fn twinkle(&mut self) {
        for star in &mut self.stars {
            star.alpha = if star.alpha > 0.0 {
                star.alpha - TWINKLE_DECAY
            } else {
                self.rng.random::<f32>() + RELIGHT_FLOOR
            };
        }
    }
}
