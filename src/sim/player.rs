//! Player controller
//!
//! Turns input intents into velocity, integrates, and resolves collisions
//! against platforms. Ground and mid-air jumps share one launch velocity; the
//! mid-air jump is limited to once per airborne period and gated by a long
//! cooldown measured in seconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Overlaps, Rect};
use super::platform::Platform;
use super::state::Character;
use super::tick::TickInput;
use crate::consts::*;
use crate::tuning::Tuning;

/// Jump bookkeeping carried between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpState {
    /// Ground jump allowed (cleared by a jump until the button is released)
    pub can_jump: bool,
    /// Main jump button was held on the previous tick
    pub button_held: bool,
    /// The one mid-air jump for this airborne period is spent
    pub mid_air_used: bool,
    /// A ground jump fired this tick, so the mid-air jump waits a tick
    pub skip_mid_air: bool,
    /// Seconds until the mid-air jump is available again
    pub mid_air_cooldown: f32,
}

impl Default for JumpState {
    fn default() -> Self {
        Self {
            can_jump: true,
            button_held: false,
            mid_air_used: false,
            skip_mid_air: false,
            mid_air_cooldown: 0.0,
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub vel: Vec2,
    pub on_ground: bool,
    pub facing_right: bool,
    pub body_color: u32,
    pub hat_color: u32,
    pub invulnerable: bool,
    pub invulnerable_ticks: u32,
    pub jump: JumpState,
}

impl Player {
    pub fn new(character: &Character) -> Self {
        Self {
            rect: Rect::new(SPAWN_X, SPAWN_Y, PLAYER_WIDTH, PLAYER_HEIGHT),
            vel: Vec2::ZERO,
            on_ground: false,
            facing_right: true,
            body_color: character.body,
            hat_color: character.hat,
            invulnerable: false,
            invulnerable_ticks: 0,
            jump: JumpState::default(),
        }
    }

    /// Input, gravity and integration for one tick (no collision)
    pub fn control(&mut self, input: &TickInput, tuning: &Tuning, dt: f32) {
        if input.move_left {
            self.vel.x = (self.vel.x - tuning.accel).max(-tuning.max_speed);
            self.facing_right = false;
        } else if input.move_right {
            self.vel.x = (self.vel.x + tuning.accel).min(tuning.max_speed);
            self.facing_right = true;
        } else {
            self.vel.x *= tuning.friction;
        }

        self.try_ground_jump(input.jump, tuning);

        self.jump.mid_air_cooldown = (self.jump.mid_air_cooldown - dt).max(0.0);
        self.try_mid_air_jump(input.mid_air_jump, tuning);

        // Short hop: releasing jump while still rising cuts the ascent
        if self.jump.button_held && !input.jump && self.vel.y < 0.0 {
            self.vel.y *= tuning.jump_cut;
        }

        if input.jump {
            self.jump.button_held = true;
        } else {
            self.jump.button_held = false;
            self.jump.can_jump = true;
        }

        self.vel.y += tuning.gravity;
        self.rect.pos += self.vel;
    }

    /// Launch from the ground. Returns true if the jump fired.
    pub fn try_ground_jump(&mut self, pressed: bool, tuning: &Tuning) -> bool {
        if !(pressed && self.on_ground && self.jump.can_jump) {
            return false;
        }
        self.vel.y = tuning.jump_velocity;
        self.on_ground = false;
        self.jump.can_jump = false;
        self.jump.button_held = true;
        self.jump.mid_air_used = false;
        self.jump.skip_mid_air = true;
        true
    }

    /// Second jump while airborne. Returns true if the jump fired.
    ///
    /// Marks the main button as held, so the cut applies unless the main
    /// jump input is also down.
    pub fn try_mid_air_jump(&mut self, pressed: bool, tuning: &Tuning) -> bool {
        let ready = !self.on_ground
            && !self.jump.mid_air_used
            && !self.jump.skip_mid_air
            && self.jump.mid_air_cooldown <= 0.0;
        if !(pressed && ready) {
            return false;
        }
        self.vel.y = tuning.jump_velocity;
        self.jump.mid_air_used = true;
        self.jump.button_held = true;
        self.jump.mid_air_cooldown = tuning.mid_air_cooldown_secs;
        true
    }

    /// Push the player out of every overlapping platform, in list order.
    ///
    /// Each platform resolves on its own axis of least penetration, so a later
    /// platform can undo an earlier correction within the same tick.
    pub fn resolve_platforms(&mut self, platforms: &[Platform]) {
        self.on_ground = false;
        for platform in platforms {
            let solid = &platform.rect;
            if !self.rect.overlaps(solid) {
                continue;
            }
            let o = Overlaps::between(&self.rect, solid);
            let min = o.min();

            if min == o.top && self.vel.y >= 0.0 {
                self.rect.pos.y = solid.top() - self.rect.height();
                self.vel.y = 0.0;
                self.on_ground = true;
                self.jump.button_held = false;
                self.jump.mid_air_used = false;
            } else if min == o.bottom && self.vel.y < 0.0 {
                self.rect.pos.y = solid.bottom();
                self.vel.y = 0.0;
            } else if min == o.left && self.vel.x > 0.0 {
                self.rect.pos.x = solid.left() - self.rect.width();
                self.vel.x = 0.0;
            } else if min == o.right && self.vel.x < 0.0 {
                self.rect.pos.x = solid.right();
                self.vel.x = 0.0;
            }
        }
    }

    /// Dropped far enough below the viewport to count as a fall death
    pub fn fell_out(&self, tuning: &Tuning) -> bool {
        self.rect.top() > VIEWPORT_HEIGHT + tuning.fall_margin
    }

    /// Count down invulnerability and clear per-tick flags
    pub fn finish_tick(&mut self) {
        if self.invulnerable {
            self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
            if self.invulnerable_ticks == 0 {
                self.invulnerable = false;
            }
        }
        self.jump.skip_mid_air = false;
    }

    /// Start the invulnerability window and knock the player away from its facing
    pub fn hurt(&mut self, tuning: &Tuning) {
        self.invulnerable = true;
        self.invulnerable_ticks = tuning.invulnerable_ticks;
        self.vel.x = if self.facing_right {
            -tuning.knockback_x
        } else {
            tuning.knockback_x
        };
        self.vel.y = tuning.knockback_y;
    }

    /// Stand still on the centre of `platform`
    pub fn respawn_on(&mut self, platform: &Platform) {
        self.rect.pos.x = platform.rect.center_x() - self.rect.width() / 2.0;
        self.rect.pos.y = platform.rect.top() - self.rect.height();
        self.vel = Vec2::ZERO;
        self.on_ground = true;
        self.jump.button_held = false;
        self.jump.mid_air_used = false;
    }

    /// Back to the level start point for a new level
    pub fn reset_to_spawn(&mut self) {
        self.rect.pos = Vec2::new(SPAWN_X, SPAWN_Y);
        self.vel = Vec2::ZERO;
        self.invulnerable = false;
        self.invulnerable_ticks = 0;
    }

    /// Remaining mid-air cooldown as a fraction of the full duration
    pub fn mid_air_cooldown_ratio(&self, tuning: &Tuning) -> f32 {
        if tuning.mid_air_cooldown_secs > 0.0 {
            (self.jump.mid_air_cooldown / tuning.mid_air_cooldown_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CHARACTERS;

    fn grounded_player(platform: &Platform) -> Player {
        let mut player = Player::new(&CHARACTERS[0]);
        player.respawn_on(platform);
        player
    }

    fn step(player: &mut Player, input: &TickInput, platforms: &[Platform], tuning: &Tuning) {
        player.control(input, tuning, SIM_DT);
        player.resolve_platforms(platforms);
        player.finish_tick();
    }

    fn hold_jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_ground_jump_launches() {
        let tuning = Tuning::default();
        let platform = Platform::fixed(0.0, 350.0, 200.0, 50.0);
        let mut player = grounded_player(&platform);
        assert_eq!(player.rect.top(), 310.0);

        assert!(player.try_ground_jump(true, &tuning));
        assert_eq!(player.vel.y, -15.0);
        assert!(!player.on_ground);
        assert!(!player.jump.can_jump);
        assert!(player.jump.skip_mid_air);
    }

    #[test]
    fn test_full_jump_arc_lands_on_platform() {
        let tuning = Tuning::default();
        let platforms = [Platform::fixed(0.0, 350.0, 200.0, 50.0)];
        let mut player = grounded_player(&platforms[0]);

        step(&mut player, &hold_jump(), &platforms, &tuning);
        assert!(!player.on_ground);

        // Launch plus 18 more ticks of gravity brings vertical speed back to >= 0
        for _ in 0..18 {
            step(&mut player, &hold_jump(), &platforms, &tuning);
        }
        assert!(player.vel.y >= 0.0);

        let mut ticks = 0;
        while !player.on_ground {
            step(&mut player, &TickInput::default(), &platforms, &tuning);
            ticks += 1;
            assert!(ticks < 60, "never landed");
        }
        assert_eq!(player.rect.top(), 310.0);
        assert_eq!(player.vel.y, 0.0);
    }

    fn apex_with_hold(hold_ticks: usize) -> f32 {
        let tuning = Tuning::default();
        let platforms = [Platform::fixed(0.0, 350.0, 200.0, 50.0)];
        let mut player = grounded_player(&platforms[0]);
        let mut apex = player.rect.top();
        for tick in 0..80 {
            let input = if tick < hold_ticks {
                hold_jump()
            } else {
                TickInput::default()
            };
            step(&mut player, &input, &platforms, &tuning);
            apex = apex.min(player.rect.top());
        }
        apex
    }

    #[test]
    fn test_short_hop_is_lower_than_full_hop() {
        let full = apex_with_hold(80);
        for hold in 1..18 {
            assert!(apex_with_hold(hold) > full, "hold {hold} reached full height");
        }
    }

    #[test]
    fn test_held_jump_does_not_rejump_on_landing() {
        let tuning = Tuning::default();
        let platforms = [Platform::fixed(0.0, 350.0, 200.0, 50.0)];
        let mut player = grounded_player(&platforms[0]);
        let mut launches = 0;
        for _ in 0..120 {
            let was_grounded = player.on_ground;
            step(&mut player, &hold_jump(), &platforms, &tuning);
            if was_grounded && !player.on_ground {
                launches += 1;
            }
        }
        assert_eq!(launches, 1);
    }

    #[test]
    fn test_speed_cap_and_friction() {
        let tuning = Tuning::default();
        let platforms = [Platform::fixed(-1000.0, 350.0, 5000.0, 50.0)];
        let mut player = grounded_player(&platforms[0]);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            step(&mut player, &right, &platforms, &tuning);
            assert!(player.vel.x.abs() <= tuning.max_speed);
        }
        assert_eq!(player.vel.x, 5.0);
        assert!(player.facing_right);

        step(&mut player, &TickInput::default(), &platforms, &tuning);
        assert!((player.vel.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_mid_air_jump_once_per_airtime_and_cooldown() {
        let tuning = Tuning::default();
        let platforms = [Platform::fixed(-1000.0, 350.0, 5000.0, 50.0)];
        let mut player = grounded_player(&platforms[0]);

        // Same tick as the ground jump: mid-air jump is suppressed
        let both = TickInput {
            jump: true,
            mid_air_jump: true,
            ..Default::default()
        };
        step(&mut player, &both, &platforms, &tuning);
        assert!(!player.jump.mid_air_used);

        // Next tick it fires
        step(&mut player, &both, &platforms, &tuning);
        assert!(player.jump.mid_air_used);
        assert_eq!(player.jump.mid_air_cooldown, tuning.mid_air_cooldown_secs);
        assert!((player.vel.y - (tuning.jump_velocity + tuning.gravity)).abs() < 1e-5);

        // No second one this airborne period
        let vy = player.vel.y;
        step(&mut player, &both, &platforms, &tuning);
        assert!((player.vel.y - (vy + tuning.gravity)).abs() < 1e-5);

        // Land, jump again: still cooling down
        let mut ticks = 0;
        while !player.on_ground {
            step(&mut player, &TickInput::default(), &platforms, &tuning);
            ticks += 1;
        }
        assert!(!player.jump.mid_air_used);
        step(&mut player, &hold_jump(), &platforms, &tuning);
        step(&mut player, &both, &platforms, &tuning);
        assert!(!player.jump.mid_air_used);

        // Wait out the cooldown on the ground
        while player.jump.mid_air_cooldown > 0.0 {
            step(&mut player, &TickInput::default(), &platforms, &tuning);
            ticks += 1;
        }
        assert!(ticks as f32 * SIM_DT >= 12.0);
        step(&mut player, &hold_jump(), &platforms, &tuning);
        step(&mut player, &both, &platforms, &tuning);
        assert!(player.jump.mid_air_used);
    }

    #[test]
    fn test_mid_air_jump_requires_airborne() {
        let tuning = Tuning::default();
        let platform = Platform::fixed(0.0, 350.0, 200.0, 50.0);
        let mut player = grounded_player(&platform);
        assert!(!player.try_mid_air_jump(true, &tuning));
    }

    #[test]
    fn test_ceiling_and_wall_hits() {
        let tuning = Tuning::default();
        let ceiling = [Platform::fixed(0.0, 200.0, 200.0, 50.0)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.rect.pos = Vec2::new(50.0, 252.0);
        player.vel = Vec2::new(0.0, -10.0);
        step(&mut player, &TickInput::default(), &ceiling, &tuning);
        assert_eq!(player.rect.top(), 250.0);
        assert_eq!(player.vel.y, 0.0);

        let wall = [Platform::fixed(100.0, 0.0, 50.0, 400.0)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.rect.pos = Vec2::new(68.0, 100.0);
        player.vel = Vec2::new(4.0, 0.0);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        step(&mut player, &right, &wall, &tuning);
        assert_eq!(player.rect.right(), 100.0);
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_right_face_wall_hit() {
        let wall = [Platform::fixed(0.0, 0.0, 100.0, 400.0)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.rect.pos = Vec2::new(98.0, 100.0);
        player.vel = Vec2::new(-4.0, 0.0);
        player.resolve_platforms(&wall);
        assert_eq!(player.rect.left(), 100.0);
        assert_eq!(player.vel.x, 0.0);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_overlapping_platforms_resolve_in_list_order() {
        // A floor and a raised step that overlap the player at the same time
        let floor = Platform::fixed(0.0, 350.0, 200.0, 50.0);
        let step_up = Platform::fixed(150.0, 340.0, 100.0, 60.0);
        let start = |player: &mut Player| {
            player.rect.pos = Vec2::new(131.0, 312.0);
            player.vel = Vec2::new(1.0, 2.0);
        };

        // Landing on the floor lifts the player into the step's top face
        let mut player = Player::new(&CHARACTERS[0]);
        start(&mut player);
        player.resolve_platforms(&[floor.clone(), step_up.clone()]);
        assert_eq!(player.rect.pos, Vec2::new(131.0, 300.0));
        assert_eq!(player.vel, Vec2::new(1.0, 0.0));
        assert!(player.on_ground);

        // The step first pushes the player out sideways, then the floor catches it
        let mut player = Player::new(&CHARACTERS[0]);
        start(&mut player);
        player.resolve_platforms(&[step_up, floor]);
        assert_eq!(player.rect.pos, Vec2::new(120.0, 310.0));
        assert_eq!(player.vel, Vec2::ZERO);
        assert!(player.on_ground);
    }

    #[test]
    fn test_invulnerability_expires() {
        let tuning = Tuning::default();
        let mut player = Player::new(&CHARACTERS[0]);
        player.hurt(&tuning);
        assert_eq!(player.vel, Vec2::new(-3.0, -5.0));
        for _ in 0..tuning.invulnerable_ticks - 1 {
            player.finish_tick();
            assert!(player.invulnerable);
        }
        player.finish_tick();
        assert!(!player.invulnerable);
    }
}
