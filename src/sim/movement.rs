//! Kinematic integration
//!
//! Velocity is written directly by controllers and enemy behavior; nothing
//! here accumulates forces.

use super::pool::EntityPool;
use super::state::Entity;

/// Advance one active entity by `dt` seconds
#[inline]
pub fn integrate(entity: &mut Entity, dt: f32) {
    if entity.active {
        entity.pos += entity.vel * dt;
    }
}

/// Advance every active member of a pool
pub fn integrate_pool(pool: &mut EntityPool, dt: f32) {
    for entity in pool.iter_active_mut() {
        integrate(entity, dt);
    }
}
