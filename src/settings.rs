//! Game tuning
//!
//! Every gameplay constant can be overridden from a JSON file. Missing fields
//! fall back to the values in `crate::consts`. Settings are validated once,
//! before a `GameState` is built, so a bad range never surfaces mid-game.

use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Spawn interval multiplier in percent (100 = default pacing)
    pub fn spawn_interval_percent(&self) -> u64 {
        match self {
            Difficulty::Easy => 150,
            Difficulty::Normal => 100,
            Difficulty::Hard => 60,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "norm" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Inclusive millisecond range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsRange {
    pub min: u64,
    pub max: u64,
}

impl MsRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always yields `ms`
    pub const fn fixed(ms: u64) -> Self {
        Self { min: ms, max: ms }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random_range(self.min..=self.max)
    }

    fn scaled(&self, percent: u64) -> Self {
        Self {
            min: self.min.saturating_mul(percent) / 100,
            max: self.max.saturating_mul(percent) / 100,
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub lives: u32,
    pub speed: f32,
    /// Distance from the bottom edge at spawn
    pub start_offset: f32,
    pub half_size: Vec2,
    pub bullet_speed: f32,
    pub muzzle_offset: f32,
    pub bullet_half_size: Vec2,
    pub fire_cooldown_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            lives: PLAYER_LIVES,
            speed: PLAYER_SPEED,
            start_offset: PLAYER_START_OFFSET,
            half_size: Vec2::splat(PLAYER_HALF_SIZE),
            bullet_speed: BULLET_SPEED,
            muzzle_offset: BULLET_MUZZLE_OFFSET,
            bullet_half_size: Vec2::new(BULLET_HALF_WIDTH, BULLET_HALF_HEIGHT),
            fire_cooldown_ms: FIRE_COOLDOWN_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub half_size: Vec2,
    pub spawn_y: f32,
    /// Horizontal spawn positions stay this far from either wall
    pub spawn_margin: f32,
    pub descent_speed: f32,
    pub retreat_speed: f32,
    pub despawn_margin: f32,
    pub spawn_interval: MsRange,
    pub pause_delay: MsRange,
    pub turn_delay_ms: u64,
    pub bullet_speed: f32,
    pub bullet_half_size: Vec2,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            half_size: Vec2::splat(ENEMY_HALF_SIZE),
            spawn_y: ENEMY_SPAWN_Y,
            spawn_margin: ENEMY_SPAWN_MARGIN,
            descent_speed: ENEMY_DESCENT_SPEED,
            retreat_speed: ENEMY_RETREAT_SPEED,
            despawn_margin: ENEMY_DESPAWN_MARGIN,
            spawn_interval: MsRange::new(SPAWN_INTERVAL_MS.0, SPAWN_INTERVAL_MS.1),
            pause_delay: MsRange::new(PAUSE_DELAY_MS.0, PAUSE_DELAY_MS.1),
            turn_delay_ms: TURN_DELAY_MS,
            bullet_speed: ENEMY_BULLET_SPEED,
            bullet_half_size: Vec2::new(BULLET_HALF_WIDTH, BULLET_HALF_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub bullets: usize,
    pub enemy_bullets: usize,
    pub enemies: usize,
    pub effects: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            bullets: BULLET_POOL_SIZE,
            enemy_bullets: ENEMY_BULLET_POOL_SIZE,
            enemies: ENEMY_POOL_SIZE,
            effects: EFFECT_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub lifetime_ms: u64,
    pub half_size: Vec2,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            lifetime_ms: EFFECT_LIFETIME_MS,
            half_size: Vec2::splat(EFFECT_HALF_SIZE),
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub arena: ArenaSettings,
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub pools: PoolSettings,
    pub effect: EffectSettings,
}

impl Settings {
    /// Default tuning with a difficulty preset applied
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Rescale the spawn interval from the default range
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.enemy.spawn_interval = EnemySettings::default()
            .spawn_interval
            .scaled(difficulty.spawn_interval_percent());
    }

    /// Parse and validate settings from a JSON document.
    ///
    /// The `difficulty` preset sets the spawn pacing unless the document
    /// also gives `enemy.spawn_interval`, which wins.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: serde_json::Value = serde_json::from_str(json)?;
        let explicit_interval = doc.pointer("/enemy/spawn_interval").is_some();
        let mut settings: Self = serde_json::from_value(doc)?;
        if !explicit_interval {
            settings.apply_difficulty(settings.difficulty);
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject tuning that would break the loop at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;
        positive("player.speed", self.player.speed)?;
        positive("player.bullet_speed", self.player.bullet_speed)?;
        positive("enemy.descent_speed", self.enemy.descent_speed)?;
        positive("enemy.retreat_speed", self.enemy.retreat_speed)?;
        positive("enemy.bullet_speed", self.enemy.bullet_speed)?;

        finite("player.start_offset", self.player.start_offset)?;
        finite("player.muzzle_offset", self.player.muzzle_offset)?;
        finite("enemy.spawn_y", self.enemy.spawn_y)?;
        finite("enemy.despawn_margin", self.enemy.despawn_margin)?;

        half_size("player.half_size", self.player.half_size)?;
        half_size("player.bullet_half_size", self.player.bullet_half_size)?;
        half_size("enemy.half_size", self.enemy.half_size)?;
        half_size("enemy.bullet_half_size", self.enemy.bullet_half_size)?;
        half_size("effect.half_size", self.effect.half_size)?;

        self.enemy.spawn_interval.validate("enemy.spawn_interval")?;
        self.enemy.pause_delay.validate("enemy.pause_delay")?;

        // Also rejects NaN
        if !(0.0..=self.arena.width / 2.0).contains(&self.enemy.spawn_margin) {
            return Err(ConfigError::SpawnMarginTooWide {
                margin: self.enemy.spawn_margin,
                width: self.arena.width,
            });
        }

        capacity("bullets", self.pools.bullets)?;
        capacity("enemy_bullets", self.pools.enemy_bullets)?;
        capacity("enemies", self.pools.enemies)?;
        capacity("effects", self.pools.effects)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

/// Collision extents must be real and non-negative on both axes
fn half_size(name: &'static str, extent: Vec2) -> Result<(), ConfigError> {
    if extent.is_finite() && extent.cmpge(Vec2::ZERO).all() {
        Ok(())
    } else {
        Err(ConfigError::InvalidHalfSize {
            name,
            x: extent.x,
            y: extent.y,
        })
    }
}

fn capacity(name: &'static str, size: usize) -> Result<(), ConfigError> {
    if size == 0 {
        Err(ConfigError::ZeroCapacity { name })
    } else {
        Ok(())
    }
}
