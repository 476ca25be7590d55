//! Data-driven game balance
//!
//! Every physics, progression and level-generation constant lives here so a
//! run can be re-tuned from JSON without touching the simulation. Per-tick
//! values (speeds, accelerations) assume the fixed `SIM_DT` step.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Physics and progression constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player gravity (added to vertical speed every tick)
    pub gravity: f32,
    /// Gravity for jumpers and falling enemies
    pub enemy_gravity: f32,
    /// Launch velocity for ground and mid-air jumps (negative = up)
    pub jump_velocity: f32,
    /// Horizontal acceleration per tick while a direction is held
    pub accel: f32,
    /// Horizontal speed cap
    pub max_speed: f32,
    /// Multiplicative horizontal decay when no direction is held
    pub friction: f32,
    /// Upward speed multiplier when jump is released early
    pub jump_cut: f32,
    /// Vertical speed after stomping an enemy
    pub stomp_bounce: f32,
    /// Hop impulse for jumper enemies
    pub jumper_hop: f32,
    /// Ticks between jumper hops
    pub jumper_hop_ticks: u32,
    /// Mid-air jump cooldown (seconds)
    pub mid_air_cooldown_secs: f32,
    /// Countdown per level (seconds)
    pub level_time_secs: f32,
    /// Invulnerability after taking damage (ticks)
    pub invulnerable_ticks: u32,
    /// Knockback applied on damage
    pub knockback_x: f32,
    pub knockback_y: f32,
    /// Lives at the start of a run
    pub start_lives: u32,
    /// Points per extra life
    pub life_bonus_step: u32,
    /// Distance below the viewport at which the player dies
    pub fall_margin: f32,
    /// Enemies below this y are removed (levels 2+)
    pub enemy_death_y: f32,
    /// Respawn only considers platforms at most this far ahead of the player
    pub respawn_lookahead: f32,
    /// Procedural level generation
    pub level: LevelParams,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            enemy_gravity: 0.6,
            jump_velocity: -15.0,
            accel: 0.5,
            max_speed: 5.0,
            friction: 0.8,
            jump_cut: 0.4,
            stomp_bounce: -8.0,
            jumper_hop: -8.0,
            jumper_hop_ticks: 120,
            mid_air_cooldown_secs: 12.5,
            level_time_secs: 100.0,
            invulnerable_ticks: 120,
            knockback_x: 3.0,
            knockback_y: -5.0,
            start_lives: 3,
            life_bonus_step: 1000,
            fall_margin: 100.0,
            enemy_death_y: 500.0,
            respawn_lookahead: 200.0,
            level: LevelParams::default(),
        }
    }
}

/// Ranges and probabilities for procedural levels (level 2+)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Platform width range [min, max)
    pub width: (f32, f32),
    /// Gap to the next platform [min, max)
    pub gap: (f32, f32),
    /// Height of the first platform's random walk origin
    pub start_y: f32,
    /// Platform y is clamped to this band
    pub min_y: f32,
    pub max_y: f32,
    /// Largest y change between neighbouring platforms
    pub max_vertical_step: f32,
    /// Horizontal oscillation chance, speed magnitude and travel range
    pub oscillate_x_chance: f64,
    pub oscillate_x_speed: (f32, f32),
    pub oscillate_x_range: (f32, f32),
    /// Vertical oscillation chance (rolled only when not horizontal)
    pub oscillate_y_chance: f64,
    pub oscillate_y_speed: (f32, f32),
    pub oscillate_y_range: (f32, f32),
    /// Final platform reaches this far past the level end
    pub end_margin: f32,
    pub big_coins: usize,
    /// Small coin count range [min, max)
    pub small_coins: (usize, usize),
    /// Chance of a second enemy on even-index platforms
    pub even_extra_enemy_chance: f64,
    /// Chance of an enemy on odd-index platforms
    pub odd_enemy_chance: f64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            width: (140.0, 280.0),
            gap: (50.0, 130.0),
            start_y: 320.0,
            min_y: 160.0,
            max_y: 350.0,
            max_vertical_step: 90.0,
            oscillate_x_chance: 0.18,
            oscillate_x_speed: (0.7, 1.4),
            oscillate_x_range: (60.0, 160.0),
            oscillate_y_chance: 0.14,
            oscillate_y_speed: (0.5, 1.0),
            oscillate_y_range: (50.0, 110.0),
            end_margin: 100.0,
            big_coins: 7,
            small_coins: (25, 40),
            even_extra_enemy_chance: 0.4,
            odd_enemy_chance: 0.35,
        }
    }
}

/// Narrowest platform that still fits a small coin inside its margins
const MIN_PLATFORM_WIDTH: f32 = 80.0;

fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
    SimError::InvalidTuning {
        field,
        reason: reason.into(),
    }
}

fn check_range(field: &'static str, (min, max): (f32, f32)) -> Result<(), SimError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(invalid(field, format!("empty range [{min}, {max})")))
    }
}

fn check_chance(field: &'static str, p: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(invalid(field, format!("probability {p} outside [0, 1]")))
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Highest rise of a ground jump held to the apex.
    ///
    /// Gravity is applied before each move, so the player rises on the `n`
    /// ticks where `jump_velocity + k * gravity` is still negative.
    pub fn jump_reach(&self) -> f32 {
        let (v, g) = (self.jump_velocity, self.gravity);
        if !(v < 0.0 && g > 0.0) {
            return 0.0;
        }
        let n = ((-v / g).ceil() - 1.0).max(0.0);
        -n * v - g * n * (n + 1.0) / 2.0
    }

    /// Reject constants that would break simulation invariants
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.gravity > 0.0 && self.gravity.is_finite()) {
            return Err(invalid("gravity", "must be positive"));
        }
        if !self.jump_velocity.is_finite() {
            return Err(invalid("jump_velocity", "must be finite"));
        }
        // A step below f32 precision at launch speed would never slow the jump
        if self.jump_velocity + self.gravity == self.jump_velocity {
            return Err(invalid("gravity", "too small to slow a jump"));
        }
        if !(self.enemy_gravity > 0.0) {
            return Err(invalid("enemy_gravity", "must be positive"));
        }
        if !(self.jump_velocity < 0.0) {
            return Err(invalid("jump_velocity", "must point upward (negative)"));
        }
        if !(self.max_speed > 0.0) || !(self.accel > 0.0) {
            return Err(invalid("max_speed", "speed and acceleration must be positive"));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(invalid("friction", "must be in [0, 1)"));
        }
        if !(self.jump_cut > 0.0 && self.jump_cut <= 1.0) {
            return Err(invalid("jump_cut", "must be in (0, 1]"));
        }
        if !(self.mid_air_cooldown_secs >= 0.0) {
            return Err(invalid("mid_air_cooldown_secs", "must not be negative"));
        }
        if !(self.level_time_secs > 0.0) {
            return Err(invalid("level_time_secs", "must be positive"));
        }
        if self.start_lives == 0 {
            return Err(invalid("start_lives", "a run needs at least one life"));
        }
        if self.life_bonus_step == 0 {
            return Err(invalid("life_bonus_step", "must be positive"));
        }
        if self.jumper_hop_ticks == 0 {
            return Err(invalid("jumper_hop_ticks", "must be positive"));
        }
        self.level.validate()?;

        let reach = self.jump_reach();
        if self.level.max_vertical_step > reach {
            return Err(invalid(
                "level.max_vertical_step",
                format!(
                    "{} exceeds jump reach {reach:.1}",
                    self.level.max_vertical_step
                ),
            ));
        }
        Ok(())
    }
}

impl LevelParams {
    pub fn validate(&self) -> Result<(), SimError> {
        check_range("level.width", self.width)?;
        check_range("level.gap", self.gap)?;
        check_range("level.oscillate_x_speed", self.oscillate_x_speed)?;
        check_range("level.oscillate_x_range", self.oscillate_x_range)?;
        check_range("level.oscillate_y_speed", self.oscillate_y_speed)?;
        check_range("level.oscillate_y_range", self.oscillate_y_range)?;
        check_range("level.y", (self.min_y, self.max_y))?;
        check_chance("level.oscillate_x_chance", self.oscillate_x_chance)?;
        check_chance("level.oscillate_y_chance", self.oscillate_y_chance)?;
        check_chance("level.even_extra_enemy_chance", self.even_extra_enemy_chance)?;
        check_chance("level.odd_enemy_chance", self.odd_enemy_chance)?;

        if self.width.0 < MIN_PLATFORM_WIDTH {
            return Err(invalid(
                "level.width",
                format!("platforms narrower than {MIN_PLATFORM_WIDTH} cannot hold coins"),
            ));
        }
        if self.gap.0 < 0.0 {
            return Err(invalid("level.gap", "gaps cannot be negative"));
        }
        if !(self.min_y..=self.max_y).contains(&self.start_y) {
            return Err(invalid("level.start_y", "outside the platform band"));
        }
        if !(self.max_vertical_step > 0.0) {
            return Err(invalid("level.max_vertical_step", "must be positive"));
        }
        if self.small_coins.0 >= self.small_coins.1 {
            return Err(invalid("level.small_coins", "empty count range"));
        }
        Ok(())
    }
}
