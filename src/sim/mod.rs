//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied time only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod movement;
pub mod player;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{Millis, Timers};
pub use collision::{Aabb, Collidable, detect_and_resolve};
pub use player::PlayerController;
pub use pool::{EntityPool, Handle};
pub use spawn::SpawnScheduler;
pub use state::{
    EnemyPhase, Entity, EntityKind, GameEvent, GamePhase, GameState, Role, Sprite, TimerEvent,
};
pub use tick::{TickInput, tick};
