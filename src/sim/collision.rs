//! Collision detection and resolution between entity groups
//!
//! Bodies are axis-aligned boxes. A pass walks every pair of live members from
//! two groups and hands each overlapping pair to a resolver, which is free to
//! recycle either side. Both members are re-checked before every dispatch, so
//! something recycled earlier in the pass is never matched again.

use glam::Vec2;

use super::clock::{Millis, Timers};
use super::pool::{EntityPool, Handle};
use super::state::{Entity, Role, TimerEvent};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_size: Vec2) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Strict overlap; boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

impl Entity {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_size)
    }
}

/// A group that can take part in a collision pass
pub trait Collidable {
    /// Snapshot of members taking part at the start of the pass
    fn active_handles(&self) -> Vec<Handle>;

    /// Current box of a member, `None` once it is recycled or has no body
    fn bounds(&self, handle: Handle) -> Option<Aabb>;
}

impl Collidable for EntityPool {
    fn active_handles(&self) -> Vec<Handle> {
        self.iter_active()
            .filter(|(_, e)| e.body_enabled)
            .map(|(h, _)| h)
            .collect()
    }

    fn bounds(&self, handle: Handle) -> Option<Aabb> {
        self.get(handle)
            .filter(|e| e.body_enabled)
            .map(Entity::aabb)
    }
}

/// A lone entity behaves as a group of one, answering to `Handle::SOLO`
impl Collidable for Entity {
    fn active_handles(&self) -> Vec<Handle> {
        if self.active && self.body_enabled {
            vec![Handle::SOLO]
        } else {
            Vec::new()
        }
    }

    fn bounds(&self, handle: Handle) -> Option<Aabb> {
        (handle == Handle::SOLO && self.active && self.body_enabled).then(|| self.aabb())
    }
}

/// Resolve every overlapping pair between `a` and `b`.
///
/// All qualifying pairs are handled in the same call; there is no one-hit
/// cap. Returns the number of contacts dispatched.
pub fn detect_and_resolve<A, B, F>(a: &mut A, b: &mut B, mut resolve: F) -> usize
where
    A: Collidable,
    B: Collidable,
    F: FnMut(&mut A, &mut B, Handle, Handle),
{
    let a_handles = a.active_handles();
    let b_handles = b.active_handles();
    let mut contacts = 0;

    for &ha in &a_handles {
        for &hb in &b_handles {
            let Some(box_a) = a.bounds(ha) else {
                break;
            };
            let Some(box_b) = b.bounds(hb) else {
                continue;
            };
            if box_a.overlaps(&box_b) {
                resolve(a, b, ha, hb);
                contacts += 1;
            }
        }
    }

    contacts
}

/// Player bullet meets enemy: both leave play.
///
/// Returns `true` if the enemy was destroyed by this contact.
pub fn resolve_bullet_enemy(
    bullets: &mut EntityPool,
    enemies: &mut EntityPool,
    bullet: Handle,
    enemy: Handle,
) -> bool {
    bullets.recycle(bullet);
    enemies.recycle(enemy)
}

/// Enemy bullet meets player: bullet leaves play, one life is lost, and an
/// explosion is shown at `at` until its timer expires.
///
/// Lives floor at 0. Returns `true` if the bullet was consumed.
pub fn resolve_player_hit(
    enemy_bullets: &mut EntityPool,
    bullet: Handle,
    lives: &mut u32,
    at: Vec2,
    effects: &mut EntityPool,
    timers: &mut Timers<TimerEvent>,
    effect_lifetime: Millis,
) -> bool {
    if !enemy_bullets.recycle(bullet) {
        return false;
    }
    *lives = lives.saturating_sub(1);

    // A full effect pool only costs the visual
    if let Some(effect) = effects.acquire(at) {
        if let Some(e) = effects.get_mut(effect) {
            e.role = Role::Effect {
                expires_at: timers.now().saturating_add(effect_lifetime),
            };
        }
        timers.schedule(effect_lifetime, TimerEvent::ExpireEffect(effect));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EnemyPhase;

    fn enemy_role() -> Role {
        Role::Enemy {
            phase: EnemyPhase::Descending,
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(15.0, 0.0), Vec2::splat(10.0));
        let touching = Aabb::from_center(Vec2::new(20.0, 0.0), Vec2::splat(10.0));
        let far = Aabb::from_center(Vec2::new(0.0, 50.0), Vec2::splat(10.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn test_every_overlapping_pair_resolves() {
        let mut bullets = EntityPool::new("b", Role::PlayerBullet, Vec2::splat(4.0), 4);
        let mut enemies = EntityPool::new("e", enemy_role(), Vec2::splat(20.0), 4);
        bullets.acquire(Vec2::new(0.0, 0.0));
        bullets.acquire(Vec2::new(200.0, 0.0));
        enemies.acquire(Vec2::new(5.0, 5.0));
        enemies.acquire(Vec2::new(195.0, -5.0));
        enemies.acquire(Vec2::new(500.0, 500.0));

        let mut destroyed = 0;
        let contacts = detect_and_resolve(&mut bullets, &mut enemies, |b, e, hb, he| {
            if resolve_bullet_enemy(b, e, hb, he) {
                destroyed += 1;
            }
        });

        assert_eq!(contacts, 2);
        assert_eq!(destroyed, 2);
        assert_eq!(bullets.active_count(), 0);
        assert_eq!(enemies.active_count(), 1);
    }

    #[test]
    fn test_recycled_member_is_not_matched_again() {
        // Two bullets inside one enemy: only the first may claim it
        let mut bullets = EntityPool::new("b", Role::PlayerBullet, Vec2::splat(4.0), 4);
        let mut enemies = EntityPool::new("e", enemy_role(), Vec2::splat(20.0), 4);
        let first = bullets.acquire(Vec2::new(0.0, 0.0)).unwrap();
        let second = bullets.acquire(Vec2::new(2.0, 2.0)).unwrap();
        enemies.acquire(Vec2::ZERO);

        let contacts = detect_and_resolve(&mut bullets, &mut enemies, |b, e, hb, he| {
            resolve_bullet_enemy(b, e, hb, he);
        });

        assert_eq!(contacts, 1);
        assert!(!bullets.is_live(first));
        assert!(bullets.is_live(second));
        assert_eq!(enemies.active_count(), 0);
    }

    #[test]
    fn test_bodyless_members_are_ignored() {
        let mut player = Entity::new(Role::Player, Vec2::ZERO, Vec2::splat(10.0));
        let mut shots = EntityPool::new("s", Role::EnemyBullet, Vec2::splat(4.0), 2);
        shots.acquire(Vec2::ZERO);

        player.body_enabled = false;
        assert_eq!(detect_and_resolve(&mut player, &mut shots, |_, _, _, _| {}), 0);

        player.body_enabled = true;
        assert_eq!(detect_and_resolve(&mut player, &mut shots, |_, _, _, _| {}), 1);
    }

    #[test]
    fn test_player_hit_costs_a_life_and_spawns_effect() {
        let mut shots = EntityPool::new("s", Role::EnemyBullet, Vec2::splat(4.0), 2);
        let mut effects = EntityPool::new("fx", Role::Effect { expires_at: 0 }, Vec2::ONE, 1);
        let mut timers = Timers::new();
        timers.advance_to(1000);
        let shot = shots.acquire(Vec2::ZERO).unwrap();
        let mut lives = 3;

        let at = Vec2::new(300.0, 750.0);
        assert!(resolve_player_hit(
            &mut shots, shot, &mut lives, at, &mut effects, &mut timers, 300
        ));
        assert_eq!(lives, 2);
        assert_eq!(shots.active_count(), 0);

        let (fx, effect) = effects.iter_active().next().unwrap();
        assert_eq!(effect.pos, at);
        assert_eq!(effect.role, Role::Effect { expires_at: 1300 });
        assert_eq!(timers.next_due(), Some(1300));

        // Second resolution of the same bullet is a no-op
        assert!(!resolve_player_hit(
            &mut shots, shot, &mut lives, at, &mut effects, &mut timers, 300
        ));
        assert_eq!(lives, 2);

        timers.advance_to(1300);
        assert_eq!(timers.take_due(), vec![TimerEvent::ExpireEffect(fx)]);
    }

    #[test]
    fn test_lives_floor_at_zero_and_full_effect_pool() {
        let mut shots = EntityPool::new("s", Role::EnemyBullet, Vec2::splat(4.0), 3);
        let mut effects = EntityPool::new("fx", Role::Effect { expires_at: 0 }, Vec2::ONE, 1);
        let mut timers = Timers::new();
        let mut lives = 1;

        for _ in 0..3 {
            let shot = shots.acquire(Vec2::ZERO).unwrap();
            assert!(resolve_player_hit(
                &mut shots, shot, &mut lives, Vec2::ZERO, &mut effects, &mut timers, 300
            ));
        }

        assert_eq!(lives, 0);
        assert_eq!(effects.active_count(), 1);
        assert_eq!(timers.pending(), 1);
    }
}
