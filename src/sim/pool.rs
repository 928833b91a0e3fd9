//! Fixed-capacity entity pools
//!
//! All slots are allocated when the pool is built. Acquiring takes a slot off
//! the free list, recycling puts it back and bumps the slot's generation so
//! any `Handle` still pointing at the old occupant stops resolving.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Entity, Role};

/// Stable reference to a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// The handle a lone entity answers to when it acts as a group of one
    pub const SOLO: Handle = Handle {
        index: 0,
        generation: 0,
    };

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entity: Entity,
}

/// Reusable slots for one kind of transient entity
#[derive(Debug, Clone)]
pub struct EntityPool {
    name: &'static str,
    /// Inactive blank each acquired slot starts from
    template: Entity,
    slots: Vec<Slot>,
    /// Free slot indices, lowest index on top
    free: Vec<u32>,
    active: usize,
}

impl EntityPool {
    pub fn new(name: &'static str, role: Role, half_size: Vec2, capacity: usize) -> Self {
        let template = Entity {
            active: false,
            body_enabled: false,
            ..Entity::new(role, Vec2::ZERO, half_size)
        };
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                entity: template,
            })
            .collect();
        let free = (0..capacity as u32).rev().collect();

        Self {
            name,
            template,
            slots,
            free,
            active: 0,
        }
    }

    /// Fixed number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Take a free slot and place a fresh entity at `pos`.
    ///
    /// The slot is reset from the template, so nothing of the previous
    /// occupant (velocity, role payload) survives. Returns `None` when every
    /// slot is in use.
    pub fn acquire(&mut self, pos: Vec2) -> Option<Handle> {
        let Some(index) = self.free.pop() else {
            log::trace!("{} pool exhausted ({} active)", self.name, self.active);
            return None;
        };

        let slot = &mut self.slots[index as usize];
        slot.entity = Entity {
            pos,
            active: true,
            body_enabled: true,
            ..self.template
        };
        self.active += 1;

        Some(Handle {
            index,
            generation: slot.generation,
        })
    }

    /// Return a slot to the pool. `false` if the handle is stale.
    pub fn recycle(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }

        let slot = &mut self.slots[handle.index()];
        slot.entity.active = false;
        slot.entity.body_enabled = false;
        slot.entity.vel = Vec2::ZERO;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.active -= 1;
        true
    }

    /// Whether the handle still names an active occupant
    pub fn is_live(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.generation == handle.generation && s.entity.active)
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation && s.entity.active)
            .map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation && s.entity.active)
            .map(|s| &mut s.entity)
    }

    /// Active members in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &Entity)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entity.active.then_some((
                Handle {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.entity,
            ))
        })
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.slots
            .iter_mut()
            .map(|s| &mut s.entity)
            .filter(|e| e.active)
    }

    pub fn active_handles(&self) -> Vec<Handle> {
        self.iter_active().map(|(h, _)| h).collect()
    }

    /// Recycle every active member matching `pred`, returning how many went
    pub fn recycle_where(&mut self, pred: impl Fn(&Entity) -> bool) -> usize {
        let doomed: Vec<Handle> = self
            .iter_active()
            .filter(|&(_, e)| pred(e))
            .map(|(h, _)| h)
            .collect();
        for &handle in &doomed {
            self.recycle(handle);
        }
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityKind;
    use proptest::prelude::*;

    fn bullet_pool(capacity: usize) -> EntityPool {
        EntityPool::new("test", Role::PlayerBullet, Vec2::new(3.0, 12.0), capacity)
    }

    #[test]
    fn test_acquire_places_and_activates() {
        let mut pool = bullet_pool(4);
        let h = pool.acquire(Vec2::new(5.0, 6.0)).unwrap();
        let e = pool.get(h).unwrap();
        assert!(e.active);
        assert!(e.body_enabled);
        assert_eq!(e.pos, Vec2::new(5.0, 6.0));
        assert_eq!(e.vel, Vec2::ZERO);
        assert_eq!(e.kind(), EntityKind::PlayerBullet);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_capacity_plus_one_is_none() {
        let mut pool = bullet_pool(100);
        for i in 0..100 {
            assert!(pool.acquire(Vec2::new(i as f32, 0.0)).is_some());
        }
        assert_eq!(pool.active_count(), 100);
        assert!(pool.acquire(Vec2::ZERO).is_none());
        assert_eq!(pool.active_count(), 100);
    }

    #[test]
    fn test_round_trip_does_not_leak_velocity() {
        let mut pool = bullet_pool(1);
        let first = pool.acquire(Vec2::new(1.0, 1.0)).unwrap();
        pool.get_mut(first).unwrap().vel = Vec2::new(0.0, -900.0);

        assert!(pool.recycle(first));
        let second = pool.acquire(Vec2::new(9.0, 9.0)).unwrap();
        assert_eq!(second.index(), first.index());

        let e = pool.get(second).unwrap();
        assert!(e.active);
        assert_eq!(e.pos, Vec2::new(9.0, 9.0));
        assert_eq!(e.vel, Vec2::ZERO);
    }

    #[test]
    fn test_recycle_resets_and_disables() {
        let mut pool = bullet_pool(2);
        let h = pool.acquire(Vec2::ZERO).unwrap();
        pool.get_mut(h).unwrap().vel = Vec2::new(3.0, 4.0);
        pool.recycle(h);

        assert!(pool.get(h).is_none());
        let slot = &pool.slots[h.index()].entity;
        assert!(!slot.active);
        assert!(!slot.body_enabled);
        assert_eq!(slot.vel, Vec2::ZERO);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut pool = bullet_pool(1);
        let old = pool.acquire(Vec2::ZERO).unwrap();
        pool.recycle(old);
        let new = pool.acquire(Vec2::ONE).unwrap();

        assert_ne!(old, new);
        assert!(!pool.is_live(old));
        assert!(pool.get_mut(old).is_none());
        assert!(!pool.recycle(old));
        // The new occupant is untouched
        assert!(pool.is_live(new));
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_iteration_skips_inactive() {
        let mut pool = bullet_pool(5);
        let handles: Vec<_> = (0..5)
            .map(|i| pool.acquire(Vec2::splat(i as f32)).unwrap())
            .collect();
        pool.recycle(handles[1]);
        pool.recycle(handles[3]);

        let live: Vec<_> = pool.active_handles();
        assert_eq!(live, vec![handles[0], handles[2], handles[4]]);
        assert_eq!(pool.iter_active_mut().count(), 3);
    }

    #[test]
    fn test_recycle_where() {
        let mut pool = bullet_pool(4);
        pool.acquire(Vec2::new(0.0, -5.0));
        pool.acquire(Vec2::new(0.0, 5.0));
        pool.acquire(Vec2::new(0.0, -1.0));

        assert_eq!(pool.recycle_where(|e| e.pos.y < 0.0), 2);
        assert_eq!(pool.active_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_active_never_exceeds_capacity(
            capacity in 1usize..16,
            ops in proptest::collection::vec(any::<(bool, u8)>(), 0..200),
        ) {
            let mut pool = bullet_pool(capacity);
            let mut live: Vec<Handle> = Vec::new();

            for (acquire, pick) in ops {
                if acquire {
                    match pool.acquire(Vec2::ZERO) {
                        Some(h) => live.push(h),
                        None => prop_assert_eq!(live.len(), capacity),
                    }
                } else if !live.is_empty() {
                    let h = live.swap_remove(pick as usize % live.len());
                    prop_assert!(pool.recycle(h));
                }
                prop_assert!(pool.active_count() <= capacity);
                prop_assert_eq!(pool.active_count(), live.len());
                prop_assert_eq!(pool.capacity(), capacity);
            }
        }
    }
}
