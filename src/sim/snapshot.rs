//! Read-only view of the world for a presentation layer

use serde::Serialize;

use super::enemy::{EnemyClass, EnemyKind};
use super::geom::Rect;
use super::state::{GamePhase, World};

/// Invulnerable players blink: visible for 5 ticks, hidden for 5
const FLASH_PERIOD_TICKS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub rect: Rect,
    pub facing_right: bool,
    pub body_color: u32,
    pub hat_color: u32,
    pub invulnerable: bool,
    /// Draw the player this frame (false during the off phase of the blink)
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformView {
    pub rect: Rect,
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub rect: Rect,
    pub color: u32,
    pub class: EnemyClass,
    /// Remaining stomps for tanks
    pub hp: Option<u8>,
    pub facing_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinView {
    pub rect: Rect,
    pub points: u32,
    /// Collected coins stay in the list and are drawn as taken
    pub collected: bool,
}

/// Everything needed to draw one frame and its HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub camera_x: f32,
    pub night: bool,
    pub player: PlayerView,
    pub platforms: Vec<PlatformView>,
    pub enemies: Vec<EnemyView>,
    /// Every coin of the level, in layout order
    pub coins: Vec<CoinView>,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    /// Whole seconds left, rounded up
    pub time_remaining: u32,
    /// Percent of the level covered
    pub level_progress: f32,
    /// Fraction of the mid-air jump cooldown still to run (0 = ready)
    pub mid_air_cooldown: f32,
    pub game_over: bool,
    /// The run stopped because a level could not be built
    pub aborted: bool,
}

impl World {
    pub fn snapshot(&self) -> Snapshot {
        let player = &self.player;
        let visible =
            !player.invulnerable || (player.invulnerable_ticks / FLASH_PERIOD_TICKS) % 2 == 0;

        Snapshot {
            tick: self.time_ticks,
            camera_x: self.camera_x,
            night: self.is_night(),
            player: PlayerView {
                rect: player.rect,
                facing_right: player.facing_right,
                body_color: player.body_color,
                hat_color: player.hat_color,
                invulnerable: player.invulnerable,
                visible,
            },
            platforms: self
                .platforms
                .iter()
                .map(|p| PlatformView {
                    rect: p.rect,
                    moving: p.is_moving(),
                })
                .collect(),
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    rect: e.rect,
                    color: e.color,
                    class: e.class(),
                    hp: match e.kind {
                        EnemyKind::Tank { hp } => Some(hp),
                        _ => None,
                    },
                    facing_right: e.vel.x > 0.0,
                })
                .collect(),
            coins: self
                .coins
                .iter()
                .map(|c| CoinView {
                    rect: c.rect,
                    points: c.points,
                    collected: c.collected,
                })
                .collect(),
            score: self.progress.score,
            lives: self.progress.lives,
            level: self.progress.level,
            time_remaining: self.time_display(),
            level_progress: self.level_progress(),
            mid_air_cooldown: player.mid_air_cooldown_ratio(&self.tuning),
            game_over: self.is_game_over(),
            aborted: self.phase == GamePhase::Aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::state::{GamePhase, World};
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_of_fresh_world() {
        let world = World::new(3, Tuning::default()).unwrap();
        let snap = world.snapshot();
        assert_eq!(snap.platforms.len(), 40);
        assert_eq!(snap.enemies.len(), 37);
        assert_eq!(snap.coins.len(), 37);
        assert_eq!(snap.enemies.iter().filter(|e| e.hp == Some(2)).count(), 9);
        assert_eq!(snap.time_remaining, 100);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.mid_air_cooldown, 0.0);
        assert!(snap.player.visible);
        assert!(!snap.night && !snap.game_over && !snap.aborted);
        assert!(snap.coins.iter().all(|c| !c.collected));
    }

    #[test]
    fn test_collected_coins_are_flagged() {
        let mut world = World::new(3, Tuning::default()).unwrap();
        world.coins[0].collected = true;
        let coins = world.snapshot().coins;
        assert_eq!(coins.len(), 37);
        assert!(coins[0].collected);
        assert_eq!(coins.iter().filter(|c| c.collected).count(), 1);
        assert_eq!(coins[0].rect, world.coins[0].rect);
    }

    #[test]
    fn test_aborted_run_is_reported() {
        let mut world = World::new(3, Tuning::default()).unwrap();
        world.phase = GamePhase::Aborted;
        let snap = world.snapshot();
        assert!(snap.aborted);
        assert!(!snap.game_over);
    }

    #[test]
    fn test_invulnerable_player_blinks() {
        let mut world = World::new(3, Tuning::default()).unwrap();
        let tuning = world.tuning().clone();
        world.player.hurt(&tuning);

        let mut pattern = Vec::new();
        for _ in 0..20 {
            pattern.push(world.snapshot().player.visible);
            world.player.finish_tick();
        }
        let expected: Vec<bool> = (101..=120).rev().map(|t: u32| (t / 5) % 2 == 0).collect();
        assert_eq!(pattern, expected);
        assert!(pattern.contains(&false));
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::new(3, Tuning::default()).unwrap();
        let json = serde_json::to_value(world.snapshot()).unwrap();
        assert_eq!(json["score"], 0);
        assert_eq!(json["level"], 1);
        assert_eq!(json["player"]["body_color"], 0xFF0000);
    }
}
