//! Enemy behaviour: patrol, hop, fall, and stomp/contact resolution

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::platform::Platform;
use super::player::Player;
use crate::consts::VIEWPORT_HEIGHT;
use crate::tuning::Tuning;

/// Distance from a platform end at which patrollers turn around
const EDGE_MARGIN: f32 = 5.0;
/// Vertical snap band for walkers and tanks
const LAND_TOLERANCE: f32 = 5.0;
/// Jumpers travel further per tick, so they snap from further away
const JUMPER_LAND_TOLERANCE: f32 = 14.0;
/// Level 1 only: how far below its feet an off-platform enemy looks for footing
const RESNAP_WINDOW: f32 = 20.0;
/// Level 1 only: floor line for enemies with nothing underneath
const FLOOR_OFFSET: f32 = 50.0;
/// Tanks only hurt when the player reaches this far inside their box
const TANK_INNER_INSET: f32 = 4.0;

pub const WALKER_SIZE: f32 = 30.0;
pub const TANK_SIZE: f32 = 34.0;
pub const WALKER_SPEED: f32 = 2.0;
pub const TANK_SPEED: f32 = 1.5;
pub const TANK_HP: u8 = 2;

pub const WALKER_COLOR: u32 = 0x8B0000;
pub const JUMPER_COLOR: u32 = 0x0066FF;
pub const TANK_COLOR: u32 = 0x5A3A1E;

/// Enemy type without per-type state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyClass {
    Walker,
    Jumper,
    Tank,
}

/// Per-type enemy state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker,
    /// Hops every `hop_timer` ticks while standing on a platform
    Jumper { hop_timer: u32, on_platform: bool },
    /// Takes `hp` stomps to defeat
    Tank { hp: u8 },
}

impl EnemyKind {
    pub fn class(&self) -> EnemyClass {
        match self {
            EnemyKind::Walker => EnemyClass::Walker,
            EnemyKind::Jumper { .. } => EnemyClass::Jumper,
            EnemyKind::Tank { .. } => EnemyClass::Tank,
        }
    }
}

/// An enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    pub vel: Vec2,
    pub color: u32,
    pub kind: EnemyKind,
}

/// Outcome of an enemy touching the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyContact {
    Stomped {
        class: EnemyClass,
        points: u32,
        defeated: bool,
    },
    HitPlayer {
        class: EnemyClass,
    },
}

impl Enemy {
    /// A fresh enemy of `class` with its top-left corner at (x, y)
    pub fn spawn(class: EnemyClass, x: f32, y: f32, speed_x: f32, hop_ticks: u32) -> Self {
        let (size, color, kind) = match class {
            EnemyClass::Walker => (WALKER_SIZE, WALKER_COLOR, EnemyKind::Walker),
            EnemyClass::Jumper => (
                WALKER_SIZE,
                JUMPER_COLOR,
                EnemyKind::Jumper {
                    hop_timer: hop_ticks,
                    on_platform: false,
                },
            ),
            EnemyClass::Tank => (TANK_SIZE, TANK_COLOR, EnemyKind::Tank { hp: TANK_HP }),
        };
        Self {
            rect: Rect::new(x, y, size, size),
            vel: Vec2::new(speed_x, 0.0),
            color,
            kind,
        }
    }

    pub fn class(&self) -> EnemyClass {
        self.kind.class()
    }

    fn is_jumper(&self) -> bool {
        matches!(self.kind, EnemyKind::Jumper { .. })
    }

    /// Hop timer, gravity for jumpers, horizontal motion, then platform adherence.
    ///
    /// `falls_off` selects levels 2+ behaviour: enemies without footing drop
    /// under gravity instead of turning back.
    pub fn advance(&mut self, platforms: &[Platform], falls_off: bool, tuning: &Tuning) {
        if let EnemyKind::Jumper {
            hop_timer,
            on_platform,
        } = &mut self.kind
        {
            *hop_timer = hop_timer.saturating_sub(1);
            if *hop_timer == 0 && *on_platform {
                self.vel.y = tuning.jumper_hop;
                *hop_timer = tuning.jumper_hop_ticks;
            }
            self.vel.y += tuning.enemy_gravity;
            self.rect.pos.y += self.vel.y;
        }

        self.rect.pos.x += self.vel.x;

        let tolerance = if self.is_jumper() {
            JUMPER_LAND_TOLERANCE
        } else {
            LAND_TOLERANCE
        };
        let footing = platforms.iter().find(|p| {
            self.rect.spans_x(&p.rect) && (self.rect.bottom() - p.rect.top()).abs() < tolerance
        });

        if let EnemyKind::Jumper { on_platform, .. } = &mut self.kind {
            *on_platform = footing.is_some();
        }

        match footing {
            Some(platform) => self.patrol(&platform.rect),
            None if falls_off => {
                if !self.is_jumper() {
                    self.vel.y += tuning.enemy_gravity;
                    self.rect.pos.y += self.vel.y;
                }
            }
            None => {
                if !self.is_jumper() {
                    self.turn_back_and_resnap(platforms);
                }
            }
        }
    }

    /// Stand on `solid` and turn around at its ends
    fn patrol(&mut self, solid: &Rect) {
        let rising_jumper = self.is_jumper() && self.vel.y < 0.0;
        if !rising_jumper {
            self.rect.pos.y = solid.top() - self.rect.height();
            self.vel.y = 0.0;
        }

        if self.rect.left() <= solid.left() + EDGE_MARGIN {
            self.vel.x = self.vel.x.abs();
            self.rect.pos.x = solid.left() + EDGE_MARGIN;
        } else if self.rect.right() >= solid.right() - EDGE_MARGIN {
            self.vel.x = -self.vel.x.abs();
            self.rect.pos.x = solid.right() - self.rect.width() - EDGE_MARGIN;
        }
    }

    /// Level 1: reverse, then drop onto a platform just below or onto the floor line
    fn turn_back_and_resnap(&mut self, platforms: &[Platform]) {
        self.vel.x = -self.vel.x;
        let below = platforms.iter().find(|p| {
            self.rect.spans_x(&p.rect)
                && self.rect.top() < p.rect.top()
                && self.rect.bottom() < p.rect.top() + RESNAP_WINDOW
        });
        let floor = VIEWPORT_HEIGHT - FLOOR_OFFSET;
        if let Some(platform) = below {
            self.rect.pos.y = platform.rect.top() - self.rect.height();
        } else if self.rect.bottom() < floor {
            self.rect.pos.y = floor - self.rect.height();
        }
    }

    /// Player is falling and its feet are in the upper part of this enemy
    pub fn is_stomped_by(&self, player: &Player) -> bool {
        let zone = match self.kind {
            EnemyKind::Tank { .. } => self.rect.height() * 0.65,
            _ => self.rect.height() * 0.5,
        };
        player.vel.y > 0.0 && player.rect.bottom() < self.rect.top() + zone
    }

    /// Non-stomp contact that hurts; tanks need the player inside their inner box
    pub fn hurts(&self, player: &Player) -> bool {
        match self.kind {
            EnemyKind::Tank { .. } => player.rect.overlaps(&self.rect.inset(TANK_INNER_INSET)),
            _ => true,
        }
    }

    /// Apply one stomp. Returns (points, defeated).
    pub fn take_stomp(&mut self) -> (u32, bool) {
        match &mut self.kind {
            EnemyKind::Walker => (100, true),
            EnemyKind::Jumper { .. } => (120, true),
            EnemyKind::Tank { hp } => {
                *hp = hp.saturating_sub(1);
                if *hp == 0 { (150, true) } else { (50, false) }
            }
        }
    }
}

/// Advance every enemy and resolve contacts with the player.
///
/// Iterates from the back so defeated enemies can be removed in place. Stops
/// at the first enemy that hurts the player.
pub fn update_enemies(
    enemies: &mut Vec<Enemy>,
    platforms: &[Platform],
    player: &mut Player,
    level: u32,
    tuning: &Tuning,
) -> Vec<EnemyContact> {
    let falls_off = level >= 2;
    let mut contacts = Vec::new();

    for i in (0..enemies.len()).rev() {
        if falls_off && enemies[i].rect.top() > tuning.enemy_death_y {
            log::debug!("{:?} fell out of the level", enemies[i].class());
            enemies.remove(i);
            continue;
        }

        let enemy = &mut enemies[i];
        enemy.advance(platforms, falls_off, tuning);

        if player.invulnerable || !player.rect.overlaps(&enemy.rect) {
            continue;
        }

        let class = enemy.class();
        if enemy.is_stomped_by(player) {
            player.vel.y = tuning.stomp_bounce;
            let (points, defeated) = enemy.take_stomp();
            log::debug!("{:?} stomped for {} points", class, points);
            contacts.push(EnemyContact::Stomped {
                class,
                points,
                defeated,
            });
            if defeated {
                enemies.remove(i);
            }
        } else if enemy.hurts(player) {
            contacts.push(EnemyContact::HitPlayer { class });
            break;
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CHARACTERS;

    fn far_player() -> Player {
        let mut player = Player::new(&CHARACTERS[0]);
        player.rect.pos = Vec2::new(-5000.0, 0.0);
        player
    }

    fn walker_on(platform: &Platform, x: f32, speed: f32) -> Enemy {
        Enemy::spawn(
            EnemyClass::Walker,
            x,
            platform.rect.top() - WALKER_SIZE,
            speed,
            120,
        )
    }

    #[test]
    fn test_walker_patrols_within_platform() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(100.0, 300.0, 150.0, 50.0)];
        let mut enemies = vec![walker_on(&platforms[0], 150.0, -2.0)];
        let mut player = far_player();
        let mut turned = false;
        for _ in 0..300 {
            update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
            let e = &enemies[0];
            assert!(e.rect.left() >= 105.0);
            assert!(e.rect.right() <= 245.0);
            assert_eq!(e.rect.bottom(), 300.0);
            turned |= e.vel.x > 0.0;
        }
        assert!(turned);
    }

    #[test]
    fn test_tank_rests_into_platform_top() {
        // Level 1 tanks are placed 4 units into the platform and snap up
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(1800.0, 300.0, 200.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Tank, 1850.0, 270.0, -1.5, 120)];
        let mut player = far_player();
        update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(enemies[0].rect.top(), 266.0);
    }

    #[test]
    fn test_jumper_hops_periodically() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 2000.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Jumper, 1000.0, 270.0, 0.0, 120)];
        let mut player = far_player();
        let mut hops = 0;
        let mut was_rising = false;
        for _ in 0..600 {
            update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
            let rising = enemies[0].vel.y < 0.0;
            if rising && !was_rising {
                hops += 1;
            }
            was_rising = rising;
            assert!(enemies[0].rect.bottom() <= 300.0 + 1e-3);
        }
        assert!((4..=5).contains(&hops), "hops = {hops}");
    }

    #[test]
    fn test_level_two_walker_falls_and_is_removed() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 100.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Walker, 500.0, 200.0, 2.0, 120)];
        let mut player = far_player();
        for _ in 0..200 {
            update_enemies(&mut enemies, &platforms, &mut player, 2, &tuning);
        }
        assert!(enemies.is_empty());
    }

    #[test]
    fn test_level_one_walker_without_footing_rests_on_floor() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 100.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Walker, 500.0, 200.0, 2.0, 120)];
        let mut player = far_player();
        update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        let e = &enemies[0];
        assert_eq!(e.rect.bottom(), VIEWPORT_HEIGHT - 50.0);
        assert_eq!(e.vel.x, -2.0);
    }

    #[test]
    fn test_level_one_walker_resnaps_onto_platform_just_below() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(450.0, 300.0, 200.0, 50.0)];
        let mut player = far_player();

        // Feet 10 above the platform: outside the landing band, inside the window
        let mut enemies = vec![Enemy::spawn(EnemyClass::Walker, 500.0, 260.0, 2.0, 120)];
        update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(enemies[0].rect.bottom(), 300.0);
        assert_eq!(enemies[0].vel.x, -2.0);

        // Feet 25 below the platform top: past the window, so down to the floor line
        let mut enemies = vec![Enemy::spawn(EnemyClass::Walker, 500.0, 295.0, 2.0, 120)];
        update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(enemies[0].rect.bottom(), VIEWPORT_HEIGHT - 50.0);
        assert_eq!(enemies[0].vel.x, -2.0);
    }

    #[test]
    fn test_tank_stomp_zone_is_deeper_than_walker() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 1000.0, 50.0)];
        // Feet 20 below the enemy top for both: inside 65% of a tank, past 50% of a walker
        let falling_onto = |enemy_top: f32| {
            let mut player = Player::new(&CHARACTERS[0]);
            player.rect.pos = Vec2::new(405.0, enemy_top + 20.0 - 40.0);
            player.vel.y = 2.0;
            player
        };

        let mut tanks = vec![Enemy::spawn(EnemyClass::Tank, 400.0, 266.0, 0.0, 120)];
        let mut player = falling_onto(266.0);
        let contacts = update_enemies(&mut tanks, &platforms, &mut player, 1, &tuning);
        assert_eq!(
            contacts,
            vec![EnemyContact::Stomped {
                class: EnemyClass::Tank,
                points: 50,
                defeated: false
            }]
        );
        assert_eq!(tanks[0].kind, EnemyKind::Tank { hp: 1 });

        let mut walkers = vec![walker_on(&platforms[0], 400.0, 0.0)];
        let mut player = falling_onto(270.0);
        let contacts = update_enemies(&mut walkers, &platforms, &mut player, 1, &tuning);
        assert_eq!(
            contacts,
            vec![EnemyContact::HitPlayer {
                class: EnemyClass::Walker
            }]
        );
    }

    #[test]
    fn test_walker_contact_hurts_and_stops_processing() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 1000.0, 50.0)];
        let mut enemies = vec![
            walker_on(&platforms[0], 400.0, 0.0),
            walker_on(&platforms[0], 200.0, 0.0),
        ];
        let mut player = Player::new(&CHARACTERS[0]);
        player.respawn_on(&platforms[0]);
        player.rect.pos.x = 405.0;

        let contacts = update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(
            contacts,
            vec![EnemyContact::HitPlayer {
                class: EnemyClass::Walker
            }]
        );
        assert_eq!(enemies.len(), 2);
    }

    #[test]
    fn test_invulnerable_player_is_ignored() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 1000.0, 50.0)];
        let mut enemies = vec![walker_on(&platforms[0], 400.0, 0.0)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.respawn_on(&platforms[0]);
        player.rect.pos.x = 405.0;
        player.hurt(&tuning);
        player.vel = Vec2::ZERO;

        assert!(update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning).is_empty());
    }

    #[test]
    fn test_jumper_stomp_awards_and_bounces() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 1000.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Jumper, 400.0, 270.0, 0.0, 120)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.rect.pos = Vec2::new(405.0, 240.0);
        player.vel.y = 3.0;

        let contacts = update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(
            contacts,
            vec![EnemyContact::Stomped {
                class: EnemyClass::Jumper,
                points: 120,
                defeated: true
            }]
        );
        assert!(enemies.is_empty());
        assert_eq!(player.vel.y, -8.0);
    }

    #[test]
    fn test_tank_outer_edge_brush_is_harmless() {
        let tuning = Tuning::default();
        let platforms = vec![Platform::fixed(0.0, 300.0, 1000.0, 50.0)];
        let mut enemies = vec![Enemy::spawn(EnemyClass::Tank, 400.0, 266.0, 0.0, 120)];
        let mut player = Player::new(&CHARACTERS[0]);
        player.respawn_on(&platforms[0]);
        // Player's right edge 2 units into the tank, outside the 4-unit inset
        player.rect.pos.x = 400.0 - 30.0 + 2.0;

        assert!(update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning).is_empty());

        player.rect.pos.x = 400.0 - 30.0 + 6.0;
        let contacts = update_enemies(&mut enemies, &platforms, &mut player, 1, &tuning);
        assert_eq!(
            contacts,
            vec![EnemyContact::HitPlayer {
                class: EnemyClass::Tank
            }]
        );
    }
}
