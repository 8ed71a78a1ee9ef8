use tracing_subscriber::EnvFilter;

use glitch_core::game_trait::{SimEvent, Simulation};
use glitch_core::input::{InputEvent, Key};
use glitch_runner::GlitchRunner;
use glitch_runner::config::RunnerConfig;
use glitch_runner::render::{BannerPainter, Frame, PostProcessor};

/// Ticks between scripted jumps.
const JUMP_PERIOD: u64 = 90;
/// Ticks the jump key stays held.
const JUMP_HOLD: u64 = 12;
/// Render one frame per simulated second.
const RENDER_PERIOD: u64 = 60;

struct Args {
    level: usize,
    ticks: u64,
    seed: Option<u64>,
    snapshot: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        level: 0,
        ticks: 3600,
        seed: None,
        snapshot: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--level=") {
            args.level = v.parse().unwrap_or(args.level);
        } else if let Some(v) = arg.strip_prefix("--ticks=") {
            args.ticks = v.parse().unwrap_or(args.ticks);
        } else if let Some(v) = arg.strip_prefix("--seed=") {
            args.seed = v.parse().ok();
        } else if arg == "--snapshot" {
            args.snapshot = true;
        } else {
            tracing::warn!(arg = %arg, "Ignoring unknown argument");
        }
    }
    args
}

/// Hold right the whole run and tap jump on a fixed period.
fn scripted_inputs(tick: u64) -> Vec<InputEvent> {
    let mut inputs = Vec::new();
    if tick == 0 {
        inputs.push(InputEvent::press(Key::Right));
    }
    match tick % JUMP_PERIOD {
        0 => inputs.push(InputEvent::press(Key::Jump)),
        JUMP_HOLD => inputs.push(InputEvent::release(Key::Jump)),
        _ => {},
    }
    inputs
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = parse_args();
    let mut config = RunnerConfig::load();
    if let Some(seed) = args.seed {
        config.glitch.seed = seed;
    }

    let mut game = GlitchRunner::new(config);
    if !game.load_level(args.level) {
        tracing::error!(
            level = args.level,
            available = game.metadata().level_count,
            "No such level"
        );
        std::process::exit(1);
    }
    let mut lives = game.level().lives;
    let dt = 1.0 / game.tick_rate();

    let width = game.config().screen_width as u32;
    let height = game.config().screen_height as u32;
    let mut frame = Frame::new(width, height);
    let mut post = PostProcessor::new(width, height);
    let mut painter = BannerPainter;

    tracing::info!(
        level = %game.level().name,
        ticks = args.ticks,
        seed = game.config().glitch.seed,
        "Starting run"
    );

    for tick in 0..args.ticks {
        let mut done = false;
        for event in game.update(dt, &scripted_inputs(tick)) {
            match event {
                SimEvent::GlitchStarted { label } => {
                    tracing::info!(tick, label = %label, "Glitch started");
                },
                SimEvent::GlitchEnded { label } => {
                    tracing::info!(tick, label = %label, "Glitch ended");
                },
                SimEvent::HazardHit => {
                    lives = lives.saturating_sub(1);
                    tracing::info!(tick, lives, "Player hit");
                    if lives == 0 {
                        tracing::info!(tick, "Game over");
                        done = true;
                    } else {
                        game.respawn();
                    }
                },
                SimEvent::ExitReached => {
                    tracing::info!(
                        tick,
                        score = game.level_score(),
                        elapsed_secs = game.level_elapsed().as_secs_f32(),
                        "Level complete"
                    );
                    done = true;
                },
                SimEvent::DebugToggled { enabled } => {
                    tracing::debug!(enabled, "Debug overlay toggled");
                },
            }
        }

        if tick % RENDER_PERIOD == 0 {
            game.render(&mut frame, &mut post, &mut painter);
            tracing::debug!(
                tick,
                pixel_size = game.scheduler().visuals().pixel_size,
                "Rendered frame"
            );
        }

        if done {
            break;
        }
    }

    game.teardown();

    if args.snapshot {
        match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("Failed to serialize snapshot: {e}");
                std::process::exit(1);
            },
        }
    }
}
