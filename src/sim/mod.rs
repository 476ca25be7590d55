//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one stream per level, derived from the run seed)
//! - Stable iteration order (list order of platforms, enemies and coins)
//! - No rendering or platform dependencies

pub mod enemy;
pub mod geom;
pub mod level;
pub mod platform;
pub mod player;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyClass, EnemyContact, EnemyKind, update_enemies};
pub use geom::{Overlaps, Rect};
pub use level::{LevelLayout, generate_level, level_rng};
pub use platform::{Platform, PlatformMotion, update_platforms};
pub use player::{JumpState, Player};
pub use snapshot::Snapshot;
pub use state::{
    CHARACTERS, Character, Coin, DamageCause, GameEvent, GamePhase, Progress, World,
};
pub use tick::{TickInput, collect_coins, tick};
