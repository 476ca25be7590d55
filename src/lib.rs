//! Block Jumper - a side-scrolling block platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, enemies, progression)
//! - `tuning`: Data-driven game balance
//! - `error`: Construction-time failures (invalid tuning, empty levels)

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use tuning::{LevelParams, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate every per-tick constant is tuned for)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 400.0;

    /// X coordinate the player must pass to finish a level
    pub const LEVEL_END: f32 = 12000.0;

    /// Player spawn point at the start of every level
    pub const SPAWN_X: f32 = 50.0;
    pub const SPAWN_Y: f32 = 300.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Every platform is this tall
    pub const PLATFORM_HEIGHT: f32 = 50.0;
}

/// Camera x for a player at `player_x`: player one third into the viewport, never negative
#[inline]
pub fn camera_for(player_x: f32) -> f32 {
    (player_x - consts::VIEWPORT_WIDTH / 3.0).max(0.0)
}
