use launch_core::RocketSprite;

use super::{GROUND_Y, WIDTH};

pub const ROCKET_WIDTH: f32 = 64.0;
pub const ROCKET_HEIGHT: f32 = 128.0;
/// Pixels climbed per frame while launching.
pub const ROCKET_SPEED: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    pub sprite: RocketSprite,
    pub flying: bool,
}

impl Rocket {
    pub fn on_pad() -> Self {
        Self {
            x: WIDTH / 2.0 - ROCKET_WIDTH / 2.0,
            y: GROUND_Y - ROCKET_HEIGHT,
            sprite: RocketSprite::Off,
            flying: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::on_pad();
    }

    pub fn lift_off(&mut self) {
        self.flying = true;
    }

    pub fn step(&mut self, dt: f32) {
        if self.flying {
            self.y -= ROCKET_SPEED * dt;
        }
    }

    /// True once the whole sprite has left the top of the canvas.
    pub fn out_of_view(&self) -> bool {
        self.y + ROCKET_HEIGHT < 0.0
    }
}
