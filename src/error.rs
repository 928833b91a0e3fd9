//! Configuration errors
//!
//! Everything that can go wrong in this crate is caught before the first
//! tick. Once a `GameState` exists the loop has no failure surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}: min ({min}) must not exceed max ({max})")]
    InvalidRange { name: &'static str, min: u64, max: u64 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} must be finite and non-negative, got ({x}, {y})")]
    InvalidHalfSize { name: &'static str, x: f32, y: f32 },

    #[error("unknown difficulty {0:?} (expected easy, normal or hard)")]
    UnknownDifficulty(String),

    #[error("{name} pool capacity must be at least 1")]
    ZeroCapacity { name: &'static str },

    #[error("spawn margin {margin} leaves no room in an arena {width} wide")]
    SpawnMarginTooWide { margin: f32, width: f32 },

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
