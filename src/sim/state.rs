//! Game state and core simulation types
//!
//! Everything the loop mutates lives in `GameState`. Components never reach
//! for globals; `tick` hands each one the pieces it needs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Millis, Timers};
use super::player::PlayerController;
use super::pool::{EntityPool, Handle};
use super::spawn::SpawnScheduler;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Lives ran out; ticks are ignored
    GameOver,
}

/// Enemy behavior stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyPhase {
    /// Moving down into the arena
    #[default]
    Descending,
    /// Stopped and has fired its shot
    Firing,
    /// Climbing back out at high speed
    Retreating,
}

/// Payload-free entity tag, used for drawing and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    PlayerBullet,
    Enemy,
    EnemyBullet,
    Effect,
}

/// What an entity is, plus any per-kind state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Player,
    PlayerBullet,
    Enemy { phase: EnemyPhase },
    EnemyBullet,
    /// Explosion sprite, removed by a timer at `expires_at`
    Effect { expires_at: Millis },
}

impl Role {
    pub fn kind(&self) -> EntityKind {
        match self {
            Role::Player => EntityKind::Player,
            Role::PlayerBullet => EntityKind::PlayerBullet,
            Role::Enemy { .. } => EntityKind::Enemy,
            Role::EnemyBullet => EntityKind::EnemyBullet,
            Role::Effect { .. } => EntityKind::Effect,
        }
    }
}

/// A simulated body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub role: Role,
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
    /// Simulated and drawn
    pub active: bool,
    /// Takes part in collision passes
    pub body_enabled: bool,
    /// AABB half extents
    pub half_size: Vec2,
}

impl Entity {
    /// A live entity at rest
    pub fn new(role: Role, pos: Vec2, half_size: Vec2) -> Self {
        Self {
            role,
            pos,
            vel: Vec2::ZERO,
            active: true,
            body_enabled: true,
            half_size,
        }
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.role.kind()
    }

    /// Behavior stage if this is an enemy
    pub fn enemy_phase(&self) -> Option<EnemyPhase> {
        match self.role {
            Role::Enemy { phase } => Some(phase),
            _ => None,
        }
    }

    pub fn set_enemy_phase(&mut self, phase: EnemyPhase) {
        if let Role::Enemy { phase: current } = &mut self.role {
            *current = phase;
        }
    }
}

/// Delayed work queued on the clock. Each event names the exact slot it was
/// scheduled for; handlers drop it if that slot has since been recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Stop the enemy and fire one shot
    EnemyPause(Handle),
    /// Send the enemy back up
    EnemyRetreat(Handle),
    /// Remove an explosion
    ExpireEffect(Handle),
}

/// Gameplay events for audio/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { bullet: Handle },
    EnemySpawned { enemy: Handle, x: f32 },
    EnemyFired { enemy: Handle, bullet: Handle },
    EnemyDestroyed { enemy: Handle },
    PlayerHit { lives: u32 },
    GameOver,
}

/// What the renderer needs to draw one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub active: bool,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Validated tuning
    pub settings: Settings,
    pub phase: GamePhase,
    /// Remaining lives, floors at 0
    pub lives: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// The one player ship, never pooled
    pub player: Entity,
    pub controller: PlayerController,
    pub spawner: SpawnScheduler,
    pub bullets: EntityPool,
    pub enemies: EntityPool,
    pub enemy_bullets: EntityPool,
    pub effects: EntityPool,
    pub timers: Timers<TimerEvent>,
    pub rng: Pcg32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a session. Fails if `settings` would break the loop later.
    pub fn new(seed: u64, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let arena = &settings.arena;
        let player = Entity::new(
            Role::Player,
            Vec2::new(arena.width / 2.0, arena.height - settings.player.start_offset),
            settings.player.half_size,
        );

        let bullets = EntityPool::new(
            "bullets",
            Role::PlayerBullet,
            settings.player.bullet_half_size,
            settings.pools.bullets,
        );
        let enemies = EntityPool::new(
            "enemies",
            Role::Enemy {
                phase: EnemyPhase::Descending,
            },
            settings.enemy.half_size,
            settings.pools.enemies,
        );
        let enemy_bullets = EntityPool::new(
            "enemy_bullets",
            Role::EnemyBullet,
            settings.enemy.bullet_half_size,
            settings.pools.enemy_bullets,
        );
        let effects = EntityPool::new(
            "effects",
            Role::Effect { expires_at: 0 },
            settings.effect.half_size,
            settings.pools.effects,
        );

        log::debug!(
            "New session seed={} arena={}x{} difficulty={}",
            seed,
            arena.width,
            arena.height,
            settings.difficulty.as_str()
        );

        Ok(Self {
            seed,
            phase: GamePhase::Playing,
            lives: settings.player.lives,
            time_ticks: 0,
            player,
            controller: PlayerController::new(),
            spawner: SpawnScheduler::new(),
            bullets,
            enemies,
            enemy_bullets,
            effects,
            timers: Timers::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            settings,
        })
    }

    /// Current simulation time
    #[inline]
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every active entity, player first, in stable pool order
    pub fn draw_list(&self) -> Vec<Sprite> {
        let pools = [&self.bullets, &self.enemies, &self.enemy_bullets, &self.effects];
        std::iter::once(&self.player)
            .chain(pools.into_iter().flat_map(|pool| pool.iter_active().map(|(_, e)| e)))
            .filter(|e| e.active)
            .map(|e| Sprite {
                kind: e.kind(),
                pos: e.pos,
                active: e.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_layout() {
        let state = GameState::new(1, Settings::default()).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 5);
        assert_eq!(state.player.pos, Vec2::new(300.0, 750.0));
        assert_eq!(state.player.kind(), EntityKind::Player);
        assert_eq!(state.bullets.capacity(), 100);
        assert_eq!(state.enemy_bullets.capacity(), 100);
        assert_eq!(state.bullets.active_count(), 0);
        assert_eq!(state.now(), 0);
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let mut settings = Settings::default();
        settings.enemy.spawn_interval = crate::settings::MsRange::new(5, 1);
        assert!(GameState::new(1, settings).is_err());
    }

    #[test]
    fn test_draw_list_skips_inactive() {
        let mut state = GameState::new(1, Settings::default()).unwrap();
        let shot = state.bullets.acquire(Vec2::new(10.0, 20.0)).unwrap();
        state.enemies.acquire(Vec2::new(30.0, 40.0)).unwrap();

        let sprites = state.draw_list();
        assert_eq!(sprites.len(), 3);
        assert_eq!(sprites[0].kind, EntityKind::Player);
        assert_eq!(sprites[1].kind, EntityKind::PlayerBullet);
        assert_eq!(sprites[2].kind, EntityKind::Enemy);

        state.bullets.recycle(shot);
        assert_eq!(state.draw_list().len(), 2);
    }

    #[test]
    fn test_enemy_phase_accessors() {
        let mut enemy = Entity::new(
            Role::Enemy {
                phase: EnemyPhase::Descending,
            },
            Vec2::ZERO,
            Vec2::ONE,
        );
        enemy.set_enemy_phase(EnemyPhase::Retreating);
        assert_eq!(enemy.enemy_phase(), Some(EnemyPhase::Retreating));

        let mut bullet = Entity::new(Role::PlayerBullet, Vec2::ZERO, Vec2::ONE);
        bullet.set_enemy_phase(EnemyPhase::Firing);
        assert_eq!(bullet.enemy_phase(), None);
    }

    #[test]
    fn test_sprite_serializes() {
        let sprite = Sprite {
            kind: EntityKind::Effect,
            pos: Vec2::new(1.0, 2.0),
            active: true,
        };
        let json = serde_json::to_string(&sprite).unwrap();
        assert!(json.contains("\"Effect\""));
    }
}
