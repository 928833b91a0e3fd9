//! Sky Raid - a vertical arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pools, timers, movement, collisions)
//! - `settings`: Validated, data-driven game tuning
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed timestep used by the headless driver (~60 Hz)
    pub const SIM_DT_MS: u64 = 16;

    /// Arena dimensions (y grows downward, top edge is y = 0)
    pub const ARENA_WIDTH: f32 = 600.0;
    pub const ARENA_HEIGHT: f32 = 800.0;

    /// Player defaults
    pub const PLAYER_LIVES: u32 = 5;
    pub const PLAYER_SPEED: f32 = 160.0;
    /// Player starts this far above the bottom edge
    pub const PLAYER_START_OFFSET: f32 = 50.0;
    pub const PLAYER_HALF_SIZE: f32 = 24.0;

    /// Player bullets
    pub const BULLET_SPEED: f32 = 900.0;
    /// Bullets appear this far above the ship's center
    pub const BULLET_MUZZLE_OFFSET: f32 = 50.0;
    pub const BULLET_HALF_WIDTH: f32 = 3.0;
    pub const BULLET_HALF_HEIGHT: f32 = 12.0;
    /// Minimum time between two shots (ms)
    pub const FIRE_COOLDOWN_MS: u64 = 100;

    /// Enemies
    pub const ENEMY_HALF_SIZE: f32 = 24.0;
    pub const ENEMY_SPAWN_Y: f32 = -50.0;
    pub const ENEMY_SPAWN_MARGIN: f32 = 50.0;
    pub const ENEMY_DESCENT_SPEED: f32 = 600.0;
    pub const ENEMY_RETREAT_SPEED: f32 = 1200.0;
    /// Retreating enemies above -margin are returned to the pool
    pub const ENEMY_DESPAWN_MARGIN: f32 = 50.0;
    pub const SPAWN_INTERVAL_MS: (u64, u64) = (600, 1200);
    pub const PAUSE_DELAY_MS: (u64, u64) = (400, 800);
    pub const TURN_DELAY_MS: u64 = 400;

    /// Enemy bullets
    pub const ENEMY_BULLET_SPEED: f32 = 600.0;

    /// Explosion effect lifetime (ms)
    pub const EFFECT_LIFETIME_MS: u64 = 300;
    pub const EFFECT_HALF_SIZE: f32 = 32.0;

    /// Pool capacities
    pub const BULLET_POOL_SIZE: usize = 100;
    pub const ENEMY_BULLET_POOL_SIZE: usize = 100;
    pub const ENEMY_POOL_SIZE: usize = 32;
    pub const EFFECT_POOL_SIZE: usize = 16;
}
