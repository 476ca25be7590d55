//! World state and core simulation types
//!
//! Everything a run needs to continue deterministically lives in [`World`].

use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyClass};
use super::geom::Rect;
use super::level::{LevelLayout, generate_level, level_rng};
use super::platform::Platform;
use super::player::Player;
use crate::consts::*;
use crate::error::SimError;
use crate::tuning::Tuning;

/// A selectable player look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Character {
    pub name: &'static str,
    /// Body colour (0xRRGGBB)
    pub body: u32,
    /// Hat colour (0xRRGGBB)
    pub hat: u32,
}

pub const CHARACTERS: [Character; 3] = [
    Character {
        name: "Blox",
        body: 0xFF0000,
        hat: 0x8B0000,
    },
    Character {
        name: "Verd",
        body: 0x32CD32,
        hat: 0x006400,
    },
    Character {
        name: "Amber",
        body: 0xFFD700,
        hat: 0xB8860B,
    },
];

pub const BIG_COIN_SIZE: f32 = 32.0;
pub const BIG_COIN_POINTS: u32 = 125;
pub const SMALL_COIN_SIZE: f32 = 20.0;
pub const SMALL_COIN_POINTS: u32 = 50;

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
    pub points: u32,
}

impl Coin {
    pub fn big(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, BIG_COIN_SIZE, BIG_COIN_SIZE),
            collected: false,
            points: BIG_COIN_POINTS,
        }
    }

    pub fn small(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, SMALL_COIN_SIZE, SMALL_COIN_SIZE),
            collected: false,
            points: SMALL_COIN_POINTS,
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Lives ran out; `tick` is a no-op until restart
    GameOver,
    /// The next level could not be built or the player had nowhere to stand.
    /// Terminal like `GameOver`, but the run did not end through play.
    Aborted,
}

/// Score, lives and level bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u64,
    pub lives: u32,
    /// 1-based level number
    pub level: u32,
    /// Seconds left on the level timer
    pub level_time: f32,
    /// `score / life_bonus_step` at the last life bonus
    pub last_bonus_threshold: u64,
}

impl Progress {
    fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.start_lives,
            level: 1,
            level_time: tuning.level_time_secs,
            last_bonus_threshold: 0,
        }
    }
}

/// Why the player lost a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCause {
    Enemy(EnemyClass),
    Fall,
    Timeout,
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { points: u32 },
    EnemyStomped {
        class: EnemyClass,
        points: u32,
        defeated: bool,
    },
    PlayerHurt { cause: DamageCause, lives_left: u32 },
    Respawned,
    LifeBonus { lives_gained: u32 },
    LevelComplete { level: u32 },
    GameOver { score: u64 },
    /// The run stopped in [`GamePhase::Aborted`]
    Aborted { level: u32 },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Run seed; each level's layout derives from it
    pub seed: u64,
    /// Always valid; replaced only through [`World::set_tuning`]
    pub(crate) tuning: Tuning,
    /// Index into [`CHARACTERS`]
    pub character: usize,
    pub phase: GamePhase,
    pub progress: Progress,
    pub player: Player,
    pub camera_x: f32,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl World {
    /// Start a run at level 1
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, SimError> {
        tuning.validate()?;
        let layout = generate_level(1, &mut level_rng(seed, 1), &tuning)?;
        Self::with_layout(seed, tuning, layout)
    }

    /// Start a run at level 1 on a caller-supplied layout
    pub fn with_layout(seed: u64, tuning: Tuning, layout: LevelLayout) -> Result<Self, SimError> {
        tuning.validate()?;
        layout.validate(1)?;
        log::info!("New run with seed {}", seed);

        Ok(Self {
            seed,
            progress: Progress::new(&tuning),
            tuning,
            character: 0,
            phase: GamePhase::Playing,
            player: Player::new(&CHARACTERS[0]),
            camera_x: 0.0,
            platforms: layout.platforms,
            coins: layout.coins,
            enemies: layout.enemies,
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Swap in new balance values; takes effect from the next tick and level
    pub fn set_tuning(&mut self, tuning: Tuning) -> Result<(), SimError> {
        tuning.validate()?;
        self.tuning = tuning;
        Ok(())
    }

    /// Back to level 1 with full lives, keeping seed and character
    pub fn restart(&mut self) -> Result<(), SimError> {
        let character = CHARACTERS
            .get(self.character)
            .ok_or(SimError::InvalidCharacter {
                index: self.character,
            })?;
        self.tuning.validate()?;
        let layout = generate_level(1, &mut level_rng(self.seed, 1), &self.tuning)?;
        self.progress = Progress::new(&self.tuning);
        self.phase = GamePhase::Playing;
        self.player = Player::new(character);
        self.camera_x = 0.0;
        self.platforms = layout.platforms;
        self.coins = layout.coins;
        self.enemies = layout.enemies;
        self.time_ticks = 0;
        self.events.clear();
        log::info!("Run restarted");
        Ok(())
    }

    /// Switch the player's look
    pub fn select_character(&mut self, index: usize) -> Result<(), SimError> {
        let character = CHARACTERS
            .get(index)
            .ok_or(SimError::InvalidCharacter { index })?;
        self.character = index;
        self.player.body_color = character.body;
        self.player.hat_color = character.hat;
        log::debug!("Character selected: {}", character.name);
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// No further ticks will change the world until a restart
    pub fn is_finished(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Even levels from 2 on are played at night
    pub fn is_night(&self) -> bool {
        self.progress.level >= 2 && self.progress.level % 2 == 0
    }

    /// Percent of the level covered, 0 to 100
    pub fn level_progress(&self) -> f32 {
        (self.player.rect.left() / LEVEL_END * 100.0).clamp(0.0, 100.0)
    }

    /// Level timer as shown to the player (whole seconds, rounded up)
    pub fn time_display(&self) -> u32 {
        self.progress.level_time.max(0.0).ceil() as u32
    }
}
