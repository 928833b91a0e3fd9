//! Enemy spawning and the pause / fire / retreat routine
//!
//! Each enemy's behavior is two timer events carrying that enemy's handle.
//! If the enemy is shot down first, its handle goes stale and the events do
//! nothing when they come due.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::{Millis, Timers};
use super::pool::{EntityPool, Handle};
use super::state::{EnemyPhase, TimerEvent};
use crate::settings::EnemySettings;

/// Randomized-interval enemy spawner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// First spawn happens on the first tick
    pub next_spawn_time: Millis,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an enemy if one is due.
    ///
    /// The next interval is drawn even when the enemy pool is full, so a
    /// saturated arena does not turn into a spawn on every tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        enemies: &mut EntityPool,
        timers: &mut Timers<TimerEvent>,
        settings: &EnemySettings,
        arena_width: f32,
    ) -> Option<Handle> {
        let now = timers.now();
        if now < self.next_spawn_time {
            return None;
        }

        let x = rng.random_range(settings.spawn_margin..=arena_width - settings.spawn_margin);
        let interval = settings.spawn_interval.sample(rng);
        self.next_spawn_time = now.saturating_add(interval);

        let enemy = enemies.acquire(Vec2::new(x, settings.spawn_y))?;
        if let Some(e) = enemies.get_mut(enemy) {
            e.vel = Vec2::new(0.0, settings.descent_speed);
        }

        let pause_after = settings.pause_delay.sample(rng);
        timers.schedule(pause_after, TimerEvent::EnemyPause(enemy));
        log::debug!(
            "Enemy {:?} spawned at x={:.0}, pauses in {}ms, next spawn at {}",
            enemy,
            x,
            pause_after,
            self.next_spawn_time
        );
        Some(enemy)
    }
}

/// Stop a descending enemy and fire one bullet straight down.
///
/// Returns the bullet, or `None` if the enemy is gone or the enemy-bullet
/// pool is full. The retreat is queued either way while the enemy lives.
pub fn on_enemy_pause(
    enemy: Handle,
    enemies: &mut EntityPool,
    enemy_bullets: &mut EntityPool,
    timers: &mut Timers<TimerEvent>,
    settings: &EnemySettings,
) -> Option<Handle> {
    let e = enemies.get_mut(enemy)?;
    e.vel.y = 0.0;
    e.set_enemy_phase(EnemyPhase::Firing);
    let muzzle = e.pos;

    timers.schedule(settings.turn_delay_ms, TimerEvent::EnemyRetreat(enemy));

    let bullet = enemy_bullets.acquire(muzzle)?;
    if let Some(b) = enemy_bullets.get_mut(bullet) {
        b.vel = Vec2::new(0.0, settings.bullet_speed);
    }
    Some(bullet)
}

/// Send the enemy back up. `false` if it no longer exists.
pub fn on_enemy_retreat(enemy: Handle, enemies: &mut EntityPool, settings: &EnemySettings) -> bool {
    let Some(e) = enemies.get_mut(enemy) else {
        return false;
    };
    e.vel.y = -settings.retreat_speed;
    e.set_enemy_phase(EnemyPhase::Retreating);
    true
}
