//! Main simulation tick
//!
//! One call advances the world by one fixed step. Stage order matters:
//! level timer, platforms, player, enemies, coins, then the level-end check.

use serde::{Deserialize, Serialize};

use super::enemy::{EnemyContact, update_enemies};
use super::geom::Rect;
use super::level::{generate_level, level_rng};
use super::platform::update_platforms;
use super::state::{Coin, DamageCause, GameEvent, GamePhase, World};
use crate::camera_for;
use crate::consts::*;

/// Player intents for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Main jump button (ground jump, held for full height)
    pub jump: bool,
    /// Separate mid-air jump button
    pub mid_air_jump: bool,
}

/// Advance the world by one tick.
///
/// Per-tick physics constants assume `SIM_DT`; `dt` only drives the
/// seconds-based timers (level countdown, mid-air cooldown).
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.events.clear();
    if world.is_finished() {
        return;
    }
    world.time_ticks += 1;

    update_level_timer(world, dt);
    if world.is_finished() {
        return;
    }

    update_platforms(&mut world.platforms);
    update_player(world, input, dt);
    if world.is_finished() {
        return;
    }

    let contacts = update_enemies(
        &mut world.enemies,
        &world.platforms,
        &mut world.player,
        world.progress.level,
        &world.tuning,
    );
    for contact in contacts {
        match contact {
            EnemyContact::Stomped {
                class,
                points,
                defeated,
            } => {
                world.events.push(GameEvent::EnemyStomped {
                    class,
                    points,
                    defeated,
                });
                award_points(world, points);
            }
            EnemyContact::HitPlayer { class } => take_damage(world, DamageCause::Enemy(class)),
        }
    }
    if world.is_finished() {
        return;
    }

    for points in collect_coins(&mut world.coins, &world.player.rect) {
        log::debug!("Coin collected for {} points", points);
        world.events.push(GameEvent::CoinCollected { points });
        award_points(world, points);
    }

    if world.player.rect.left() > LEVEL_END {
        complete_level(world);
    }
}

fn update_level_timer(world: &mut World, dt: f32) {
    let progress = &mut world.progress;
    progress.level_time = (progress.level_time - dt).max(0.0);

    // The timer stays at zero while invulnerable and fires once it wears off
    if progress.level_time <= 0.0 && !world.player.invulnerable {
        take_damage(world, DamageCause::Timeout);
        respawn(world);
        world.progress.level_time = world.tuning.level_time_secs;
    }
}

fn update_player(world: &mut World, input: &TickInput, dt: f32) {
    let player = &mut world.player;
    player.control(input, &world.tuning, dt);
    player.resolve_platforms(&world.platforms);

    if player.fell_out(&world.tuning) && !player.invulnerable {
        take_damage(world, DamageCause::Fall);
        respawn(world);
    }

    world.camera_x = camera_for(world.player.rect.left());
    world.player.finish_tick();
}

/// Mark every touched coin collected and return the points of each newly collected one
pub fn collect_coins(coins: &mut [Coin], player: &Rect) -> Vec<u32> {
    coins
        .iter_mut()
        .filter(|coin| !coin.collected && coin.rect.overlaps(player))
        .map(|coin| {
            coin.collected = true;
            coin.points
        })
        .collect()
}

/// Lose a life unless invulnerable; ends the run at zero lives
fn take_damage(world: &mut World, cause: DamageCause) {
    if world.player.invulnerable {
        return;
    }
    let progress = &mut world.progress;
    progress.lives = progress.lives.saturating_sub(1);
    world.player.hurt(&world.tuning);
    world.events.push(GameEvent::PlayerHurt {
        cause,
        lives_left: progress.lives,
    });
    log::debug!("Player hurt by {:?}, {} lives left", cause, progress.lives);

    if progress.lives == 0 {
        world.phase = GamePhase::GameOver;
        world.events.push(GameEvent::GameOver {
            score: progress.score,
        });
        log::info!(
            "Game over on level {} with score {}",
            progress.level,
            progress.score
        );
    }
}

/// Put the player on the nearest platform that is not too far ahead
fn respawn(world: &mut World) {
    if world.is_finished() || world.progress.lives == 0 {
        return;
    }

    let player_center = world.player.rect.center_x();
    let lookahead = world.tuning.respawn_lookahead;
    let nearest = world
        .platforms
        .iter()
        .map(|p| (p, player_center - p.rect.center_x()))
        .filter(|(_, dx)| *dx >= -lookahead)
        .min_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
        .map(|(p, _)| p);

    let target = match nearest {
        Some(platform) => platform,
        None => {
            log::warn!("No platform within respawn range, using the first one");
            match world.platforms.first() {
                Some(platform) => platform,
                None => {
                    log::error!("Cannot respawn: level has no platforms");
                    abort_run(world);
                    return;
                }
            }
        }
    };

    world.player.respawn_on(target);
    world.camera_x = camera_for(world.player.rect.left());
    log::debug!("Respawned at x {:.0}", world.player.rect.left());
    world.events.push(GameEvent::Respawned);
}

/// Add to the score and grant a life for every new bonus threshold crossed
fn award_points(world: &mut World, points: u32) {
    let progress = &mut world.progress;
    progress.score += u64::from(points);

    let threshold = progress.score / u64::from(world.tuning.life_bonus_step);
    if threshold > progress.last_bonus_threshold {
        let gained = (threshold - progress.last_bonus_threshold) as u32;
        progress.lives += gained;
        progress.last_bonus_threshold = threshold;
        world.events.push(GameEvent::LifeBonus {
            lives_gained: gained,
        });
        log::info!("Life bonus at {} points, {} lives", progress.score, progress.lives);
    }
}

fn complete_level(world: &mut World) {
    let finished = world.progress.level;
    world.progress.level += 1;
    let level = world.progress.level;

    world.player.reset_to_spawn();
    world.camera_x = 0.0;
    world.progress.level_time = world.tuning.level_time_secs;

    world.events.push(GameEvent::LevelComplete { level: finished });
    log::info!("Level {} complete, score {}", finished, world.progress.score);

    match generate_level(level, &mut level_rng(world.seed, level), &world.tuning) {
        Ok(layout) => {
            world.platforms = layout.platforms;
            world.coins = layout.coins;
            world.enemies = layout.enemies;
        }
        Err(err) => {
            log::error!("Failed to generate level {}: {}", level, err);
            abort_run(world);
        }
    }
}

/// Stop the run for good; the world cannot continue without a valid layout
fn abort_run(world: &mut World) {
    world.phase = GamePhase::Aborted;
    world.events.push(GameEvent::Aborted {
        level: world.progress.level,
    });
}
