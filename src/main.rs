//! Block Jumper entry point
//!
//! Headless native driver: runs the simulation with a scripted autopilot at a
//! fixed step and logs snapshots.
//!
//! Usage: `block-jumper [tuning.json] [seed]`

use anyhow::{Context, Result, bail};

use block_jumper::Tuning;
use block_jumper::consts::*;
use block_jumper::sim::{GameEvent, GamePhase, TickInput, World, tick};

/// Hard stop for runs that never end
const MAX_TICKS: u64 = 60 * 60 * 15;
/// Log a snapshot every this many ticks
const SNAPSHOT_EVERY: u64 = 600;
/// Frame times the driver cycles through, to exercise the accumulator
const FRAME_TIMES: [f32; 4] = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 1.0 / 60.0];

/// Game instance holding the world and the fixed-step accumulator
struct Game {
    world: World,
    accumulator: f32,
    input: TickInput,
    jump_hold: u32,
}

impl Game {
    fn new(world: World) -> Self {
        Self {
            world,
            accumulator: 0.0,
            input: TickInput::default(),
            jump_hold: 0,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.input = self.autopilot();
            tick(&mut self.world, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in &self.world.events {
                match event {
                    GameEvent::LevelComplete { level } => {
                        log::info!("Autopilot cleared level {}", level)
                    }
                    GameEvent::PlayerHurt { cause, lives_left } => {
                        log::info!("Hurt by {:?}, {} lives left", cause, lives_left)
                    }
                    _ => {}
                }
            }
            if self.world.time_ticks % SNAPSHOT_EVERY == 0 {
                self.log_snapshot();
            }
        }
    }

    /// Run right, jump at gaps and enemies, and spend the mid-air jump when falling short
    fn autopilot(&mut self) -> TickInput {
        let world = &self.world;
        let player = &world.player;
        let front = player.rect.right() + 20.0;

        let ground_ahead = world.platforms.iter().any(|p| {
            p.rect.left() <= front
                && front <= p.rect.right()
                && p.rect.top() >= player.rect.bottom() - 1.0
        });
        let enemy_ahead = world.enemies.iter().any(|e| {
            let dx = e.rect.left() - player.rect.right();
            (0.0..60.0).contains(&dx) && (e.rect.top() - player.rect.top()).abs() < 60.0
        });

        if player.on_ground && (!ground_ahead || enemy_ahead) && self.jump_hold == 0 {
            self.jump_hold = 20;
        }
        let jump = self.jump_hold > 0;
        self.jump_hold = self.jump_hold.saturating_sub(1);

        let falling_short = !player.on_ground
            && player.vel.y > 0.0
            && player.rect.bottom() > VIEWPORT_HEIGHT - 20.0;

        TickInput {
            move_right: true,
            jump: jump || falling_short,
            mid_air_jump: falling_short,
            ..Default::default()
        }
    }

    fn log_snapshot(&self) {
        match serde_json::to_string(&self.world.snapshot()) {
            Ok(json) => log::debug!("{}", json),
            Err(err) => log::warn!("Snapshot serialization failed: {}", err),
        }
        let progress = &self.world.progress;
        log::info!(
            "tick {}: level {} at {:.0}%, score {}, lives {}, {}s left",
            self.world.time_ticks,
            progress.level,
            self.world.level_progress(),
            progress.score,
            progress.lives,
            self.world.time_display()
        );
    }
}

fn load_tuning(path: Option<&str>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {path}"))?;
    let tuning =
        Tuning::from_json(&json).with_context(|| format!("invalid tuning file {path}"))?;
    log::info!("Loaded tuning from {}", path);
    Ok(tuning)
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Block Jumper (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let tuning = load_tuning(args.get(1).map(String::as_str))?;
    let seed = match args.get(2) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("seed must be an unsigned integer, got {raw}"))?,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock before epoch")?
            .as_millis() as u64,
    };

    let world = World::new(seed, tuning).context("failed to start run")?;
    log::info!("Game initialized with seed: {}", seed);

    let mut game = Game::new(world);
    let mut frame = 0;
    while !game.world.is_finished() && game.world.time_ticks < MAX_TICKS {
        game.update(FRAME_TIMES[frame % FRAME_TIMES.len()]);
        frame += 1;
    }

    let progress = &game.world.progress;
    if game.world.phase == GamePhase::Aborted {
        bail!(
            "seed {}: run aborted on level {} after {} ticks",
            seed,
            progress.level,
            game.world.time_ticks
        );
    }
    println!(
        "seed {}: reached level {} with score {} after {} ticks{}",
        seed,
        progress.level,
        progress.score,
        game.world.time_ticks,
        if game.world.is_game_over() { " (game over)" } else { "" }
    );
    Ok(())
}
