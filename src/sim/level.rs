//! Level layouts: the hand-built first level and procedural levels 2+
//!
//! Procedural levels walk left to right placing platforms until the level end.
//! Platform height follows a bounded random walk so every platform stays
//! within jump reach of the previous one.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyClass, TANK_SIZE, TANK_SPEED, WALKER_SIZE, WALKER_SPEED};
use super::geom::Rect;
use super::platform::{Platform, PlatformMotion};
use super::state::Coin;
use crate::consts::*;
use crate::error::SimError;
use crate::tuning::{LevelParams, Tuning};

/// Everything that lives for exactly one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
}

impl LevelLayout {
    /// A level must have at least one platform, and every platform needs area
    pub fn validate(&self, level: u32) -> Result<(), SimError> {
        if self.platforms.is_empty() {
            return Err(SimError::EmptyLevel { level });
        }
        if let Some(index) = self
            .platforms
            .iter()
            .position(|p| !(p.rect.width() > 0.0 && p.rect.height() > 0.0))
        {
            return Err(SimError::DegeneratePlatform { level, index });
        }
        Ok(())
    }
}

/// Deterministic per-level RNG derived from the run seed
pub fn level_rng(seed: u64, level: u32) -> Pcg32 {
    let level_seed = (level as u64).wrapping_mul(2654435761).wrapping_add(seed);
    Pcg32::seed_from_u64(level_seed)
}

/// Build the layout for `level` (1-based). Level 1 ignores `rng`.
pub fn generate_level<R: Rng + ?Sized>(
    level: u32,
    rng: &mut R,
    tuning: &Tuning,
) -> Result<LevelLayout, SimError> {
    let layout = if level <= 1 {
        first_level(tuning)
    } else {
        tuning.level.validate()?;
        let platforms = generate_platforms(rng, &tuning.level);
        let coins = generate_coins(rng, &platforms, &tuning.level);
        let enemies = generate_enemies(rng, &platforms, &tuning.level, tuning.jumper_hop_ticks);
        LevelLayout {
            platforms,
            coins,
            enemies,
        }
    };
    layout.validate(level)?;

    log::info!(
        "Level {}: {} platforms, {} coins, {} enemies",
        level,
        layout.platforms.len(),
        layout.coins.len(),
        layout.enemies.len()
    );
    Ok(layout)
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

fn generate_platforms<R: Rng + ?Sized>(rng: &mut R, params: &LevelParams) -> Vec<Platform> {
    let mut platforms = Vec::new();
    let mut x = 0.0;
    let mut y = params.start_y;

    while x < LEVEL_END {
        let width = rng.random_range(params.width.0..params.width.1).floor();
        let gap = rng.random_range(params.gap.0..params.gap.1);
        let step = rng.random_range(-params.max_vertical_step..=params.max_vertical_step);
        y = (y + step).clamp(params.min_y, params.max_y);

        let motion = if rng.random_bool(params.oscillate_x_chance) {
            let range = rng.random_range(params.oscillate_x_range.0..params.oscillate_x_range.1);
            let speed = random_sign(rng)
                * rng.random_range(params.oscillate_x_speed.0..params.oscillate_x_speed.1);
            // Bounds cover the whole platform plus its travel
            PlatformMotion::OscillateX {
                speed,
                min: x,
                max: x + width + range,
            }
        } else if rng.random_bool(params.oscillate_y_chance) {
            let range = rng.random_range(params.oscillate_y_range.0..params.oscillate_y_range.1);
            let speed = random_sign(rng)
                * rng.random_range(params.oscillate_y_speed.0..params.oscillate_y_speed.1);
            PlatformMotion::OscillateY {
                speed,
                min: (y - range / 2.0).max(params.min_y),
                max: (y + range / 2.0).min(params.max_y),
            }
        } else {
            PlatformMotion::Static
        };

        platforms.push(Platform {
            rect: Rect::new(x, y, width, PLATFORM_HEIGHT),
            motion,
        });
        x += width + gap;
    }

    // The finish platform holds still and runs past the level end
    if let Some(last) = platforms.last_mut() {
        last.motion = PlatformMotion::Static;
        let end = LEVEL_END + params.end_margin;
        if last.rect.right() < end {
            last.rect.size.x = end - last.rect.left();
        }
    }

    platforms
}

fn generate_coins<R: Rng + ?Sized>(
    rng: &mut R,
    platforms: &[Platform],
    params: &LevelParams,
) -> Vec<Coin> {
    let mut coins = Vec::new();

    let wide: Vec<&Platform> = platforms.iter().filter(|p| p.rect.width() >= 100.0).collect();
    if !wide.is_empty() {
        for _ in 0..params.big_coins {
            let p = &wide[rng.random_range(0..wide.len())].rect;
            let x = p.left() + 20.0 + rng.random::<f32>() * (p.width() - 52.0);
            let y = p.top() - 80.0 - rng.random::<f32>() * 60.0;
            coins.push(Coin::big(x, y));
        }
    }

    let small = rng.random_range(params.small_coins.0..params.small_coins.1);
    for _ in 0..small {
        let p = &platforms[rng.random_range(0..platforms.len())].rect;
        let margin = 30.0;
        let x = p.left() + margin + rng.random::<f32>() * (p.width() - margin * 2.0 - 20.0);
        let y = p.top() - 40.0 - rng.random::<f32>() * 80.0;
        coins.push(Coin::small(x, y));
    }

    coins
}

/// Walkers are twice as common as jumpers or tanks
const ENEMY_DRAW: [EnemyClass; 4] = [
    EnemyClass::Walker,
    EnemyClass::Walker,
    EnemyClass::Jumper,
    EnemyClass::Tank,
];

fn generate_enemies<R: Rng + ?Sized>(
    rng: &mut R,
    platforms: &[Platform],
    params: &LevelParams,
    hop_ticks: u32,
) -> Vec<Enemy> {
    let mut enemies = Vec::new();

    for (i, platform) in platforms.iter().enumerate() {
        let count = if i % 2 == 0 {
            1 + usize::from(rng.random_bool(params.even_extra_enemy_chance))
        } else {
            usize::from(rng.random_bool(params.odd_enemy_chance))
        };

        let p = &platform.rect;
        for _ in 0..count {
            let class = ENEMY_DRAW[rng.random_range(0..ENEMY_DRAW.len())];
            let (size, speed) = match class {
                EnemyClass::Tank => (TANK_SIZE, TANK_SPEED),
                _ => (WALKER_SIZE, WALKER_SPEED),
            };
            let space = (p.width() - size - 20.0).max(0.0);
            let offset = if space > 0.0 {
                rng.random::<f32>() * space
            } else {
                0.0
            };
            let x = p.left() + 10.0 + offset;
            let speed = random_sign(rng) * speed;
            enemies.push(Enemy::spawn(class, x, p.top() - size, speed, hop_ticks));
        }
    }

    enemies
}

fn first_level(tuning: &Tuning) -> LevelLayout {
    let enemies = LEVEL_ONE_ENEMIES
        .iter()
        .map(|&(class, x, platform_top)| {
            let speed = match class {
                EnemyClass::Tank => TANK_SPEED,
                _ => WALKER_SPEED,
            };
            // Every roster entry sits 30 above its platform; tanks settle on the first tick
            Enemy::spawn(class, x, platform_top - 30.0, -speed, tuning.jumper_hop_ticks)
        })
        .collect();

    let coins = LEVEL_ONE_BIG_COINS
        .iter()
        .map(|&(x, y)| Coin::big(x, y))
        .chain(LEVEL_ONE_SMALL_COINS.iter().map(|&(x, y)| Coin::small(x, y)))
        .collect();

    LevelLayout {
        platforms: LEVEL_ONE_PLATFORMS.to_vec(),
        coins,
        enemies,
    }
}

const H: f32 = PLATFORM_HEIGHT;

const LEVEL_ONE_PLATFORMS: [Platform; 40] = [
    Platform::fixed(0.0, 350.0, 200.0, H),
    Platform::fixed(250.0, 320.0, 150.0, H),
    Platform::fixed(450.0, 280.0, 150.0, H),
    Platform::fixed(650.0, 240.0, 150.0, H),
    Platform::fixed(850.0, 200.0, 150.0, H),
    Platform::fixed(1050.0, 280.0, 150.0, H),
    Platform::fixed(1250.0, 320.0, 150.0, H),
    Platform::fixed(1450.0, 350.0, 300.0, H),
    Platform::sliding(1800.0, 300.0, 200.0, H, 1.2, 1750.0, 2050.0),
    Platform::sliding(2100.0, 250.0, 200.0, H, -1.0, 2000.0, 2350.0),
    Platform::fixed(2400.0, 350.0, 200.0, H),
    Platform::sliding(2700.0, 300.0, 150.0, H, 1.5, 2650.0, 2950.0),
    Platform::fixed(2950.0, 250.0, 150.0, H),
    Platform::fixed(3200.0, 200.0, 150.0, H),
    Platform::sliding(3450.0, 280.0, 150.0, H, -1.3, 3350.0, 3600.0),
    Platform::fixed(3700.0, 320.0, 200.0, H),
    Platform::fixed(4000.0, 350.0, 300.0, H),
    Platform::fixed(4400.0, 300.0, 200.0, H),
    Platform::sliding(4700.0, 250.0, 200.0, H, 1.0, 4650.0, 4950.0),
    Platform::fixed(5000.0, 200.0, 150.0, H),
    Platform::fixed(5250.0, 280.0, 150.0, H),
    Platform::sliding(5500.0, 320.0, 200.0, H, -1.2, 5450.0, 5750.0),
    Platform::fixed(5800.0, 350.0, 400.0, H),
    Platform::fixed(6300.0, 300.0, 200.0, H),
    Platform::fixed(6600.0, 250.0, 200.0, H),
    Platform::fixed(6900.0, 200.0, 150.0, H),
    Platform::sliding(7150.0, 280.0, 150.0, H, 1.4, 7100.0, 7400.0),
    Platform::fixed(7400.0, 320.0, 200.0, H),
    Platform::fixed(7700.0, 350.0, 500.0, H),
    Platform::fixed(8300.0, 300.0, 200.0, H),
    Platform::lifting(8600.0, 250.0, 150.0, H, 0.8, 200.0, 300.0),
    Platform::fixed(8900.0, 280.0, 200.0, H),
    Platform::sliding(9200.0, 320.0, 150.0, H, 1.2, 9150.0, 9450.0),
    Platform::lifting(9500.0, 200.0, 200.0, H, -0.7, 150.0, 250.0),
    Platform::fixed(9800.0, 350.0, 300.0, H),
    Platform::fixed(10200.0, 280.0, 200.0, H),
    Platform::lifting(10500.0, 240.0, 150.0, H, 0.9, 200.0, 320.0),
    Platform::fixed(10800.0, 300.0, 200.0, H),
    Platform::sliding(11100.0, 250.0, 200.0, H, -1.3, 10900.0, 11400.0),
    Platform::fixed(11400.0, 350.0, 400.0, H),
];

use EnemyClass::{Jumper, Tank, Walker};

/// (class, x, top of the platform it patrols)
const LEVEL_ONE_ENEMIES: [(EnemyClass, f32, f32); 37] = [
    (Walker, 300.0, 320.0),
    (Walker, 500.0, 280.0),
    (Walker, 700.0, 240.0),
    (Walker, 900.0, 200.0),
    (Jumper, 1100.0, 280.0),
    (Jumper, 1300.0, 320.0),
    (Tank, 1850.0, 300.0),
    (Tank, 2150.0, 250.0),
    (Walker, 2450.0, 350.0),
    (Jumper, 2750.0, 300.0),
    (Tank, 3000.0, 250.0),
    (Walker, 3250.0, 200.0),
    (Jumper, 3500.0, 280.0),
    (Walker, 3750.0, 320.0),
    (Tank, 4050.0, 350.0),
    (Jumper, 4450.0, 300.0),
    (Walker, 4750.0, 250.0),
    (Jumper, 5050.0, 200.0),
    (Tank, 5300.0, 280.0),
    (Walker, 5550.0, 320.0),
    (Jumper, 5850.0, 350.0),
    (Tank, 6350.0, 300.0),
    (Walker, 6650.0, 250.0),
    (Jumper, 6950.0, 200.0),
    (Tank, 7200.0, 280.0),
    (Walker, 7450.0, 320.0),
    (Jumper, 7750.0, 350.0),
    (Walker, 8400.0, 300.0),
    (Jumper, 8700.0, 250.0),
    (Walker, 9000.0, 280.0),
    (Tank, 9600.0, 200.0),
    (Jumper, 9900.0, 350.0),
    (Walker, 10250.0, 280.0),
    (Jumper, 10550.0, 240.0),
    (Tank, 10850.0, 300.0),
    (Walker, 11150.0, 250.0),
    (Jumper, 11500.0, 350.0),
];

const LEVEL_ONE_BIG_COINS: [(f32, f32); 7] = [
    (380.0, 240.0),
    (2200.0, 210.0),
    (4200.0, 260.0),
    (6200.0, 260.0),
    (8200.0, 260.0),
    (9600.0, 160.0),
    (11280.0, 310.0),
];

const LEVEL_ONE_SMALL_COINS: [(f32, f32); 30] = [
    (280.0, 280.0),
    (680.0, 200.0),
    (1080.0, 240.0),
    (1550.0, 310.0),
    (2450.0, 310.0),
    (3000.0, 210.0),
    (3500.0, 240.0),
    (4050.0, 310.0),
    (4750.0, 210.0),
    (5300.0, 240.0),
    (5850.0, 310.0),
    (6350.0, 260.0),
    (6650.0, 210.0),
    (7200.0, 240.0),
    (7750.0, 310.0),
    (8400.0, 260.0),
    (8700.0, 210.0),
    (9000.0, 240.0),
    (9900.0, 310.0),
    (10250.0, 240.0),
    (10550.0, 200.0),
    (10850.0, 260.0),
    (11150.0, 210.0),
    (11500.0, 310.0),
    (1280.0, 280.0),
    (3750.0, 280.0),
    (4450.0, 260.0),
    (5550.0, 280.0),
    (6950.0, 160.0),
    (7450.0, 280.0),
];
