//! Player ship control: directional movement and rate-limited fire

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Millis;
use super::pool::{EntityPool, Handle};
use super::state::Entity;
use super::tick::TickInput;
use crate::settings::PlayerSettings;

/// Set the ship's velocity from held directions.
///
/// Only the highest-priority direction is applied (left, right, up, down)
/// and only its axis is written. The other axis keeps whatever it had, so a
/// diagonal built over two frames carries on until every key is released,
/// which zeroes both.
pub fn apply_movement(player: &mut Entity, input: &TickInput, speed: f32) {
    if input.left {
        player.vel.x = -speed;
    } else if input.right {
        player.vel.x = speed;
    } else if input.up {
        player.vel.y = -speed;
    } else if input.down {
        player.vel.y = speed;
    } else {
        player.vel = Vec2::ZERO;
    }
}

/// Fire-rate state for the player's gun
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerController {
    /// Earliest time the next shot may go out (exclusive)
    pub last_fired_time: Millis,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire one bullet on a fresh trigger press once the cooldown has passed.
    ///
    /// An exhausted bullet pool leaves the cooldown untouched.
    pub fn try_fire(
        &mut self,
        now: Millis,
        fire_pressed: bool,
        player: &Entity,
        bullets: &mut EntityPool,
        settings: &PlayerSettings,
    ) -> Option<Handle> {
        if !fire_pressed || now <= self.last_fired_time {
            return None;
        }

        let muzzle = player.pos - Vec2::new(0.0, settings.muzzle_offset);
        let bullet = bullets.acquire(muzzle)?;
        if let Some(b) = bullets.get_mut(bullet) {
            b.vel = Vec2::new(0.0, -settings.bullet_speed);
        }
        self.last_fired_time = now.saturating_add(settings.fire_cooldown_ms);
        log::debug!("Shot fired at {} from ({:.0}, {:.0})", now, muzzle.x, muzzle.y);
        Some(bullet)
    }
}
