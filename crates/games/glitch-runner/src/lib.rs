pub mod config;
pub mod enemy;
pub mod glitch;
pub mod level;
pub mod physics;
pub mod player;
pub mod render;
pub mod scoring;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use glitch_core::game_trait::{SimContext, SimEvent, SimMetadata, Simulation};
use glitch_core::geometry::Rect;
use glitch_core::input::{InputEvent, Key};
use glitch_core::notification::Notification;
use glitch_core::simulation_boilerplate;
use glitch_core::time::SimClock;

use config::RunnerConfig;
use glitch::{GlitchChange, GlitchEffect, GlitchScheduler, GlitchTargets, GlitchVisuals};
use level::{Level, LevelData};
use player::{MovementMode, Player, tick_player};
use render::{Frame, NotificationPainter, PostProcessor, Scene, draw_scene};

/// One platform as seen from outside the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformView {
    pub rect: Rect,
    pub solid: bool,
    pub opacity: u8,
}

/// Serializable view of the simulation for tooling and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub level: String,
    pub tick: u64,
    pub elapsed_secs: f32,
    pub player: Rect,
    pub player_velocity: (f32, f32),
    pub mode: MovementMode,
    pub jump_count: u8,
    pub invincible: bool,
    pub platforms: Vec<PlatformView>,
    pub enemies: Vec<Rect>,
    pub projectiles: Vec<Rect>,
    pub exit: Rect,
    pub visuals: GlitchVisuals,
    pub active_glitches: Vec<String>,
    pub notification: Option<String>,
}

/// The Glitch Runner simulation.
pub struct GlitchRunner {
    config: RunnerConfig,
    levels: Vec<LevelData>,
    level_index: usize,
    level: Level,
    player: Player,
    scheduler: GlitchScheduler,
    clock: SimClock,
    ctx: SimContext,
    paused: bool,
    level_started_at: Duration,
    hazard_hit: bool,
    exit_reached: bool,
}

impl GlitchRunner {
    /// A runner over the built-in campaign, starting on the first level.
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_levels(config, LevelData::all())
    }

    /// A runner over `levels`, starting on the first one. An empty list
    /// falls back to the built-in campaign.
    pub fn with_levels(config: RunnerConfig, levels: Vec<LevelData>) -> Self {
        let levels = if levels.is_empty() {
            tracing::warn!("No levels supplied, using the built-in campaign");
            LevelData::all()
        } else {
            levels
        };
        let level = Level::load(&levels[0], &config.enemy);
        let player = Player::new(&config.physics);
        let scheduler = GlitchScheduler::new(&config);
        let mut runner = Self {
            config,
            levels,
            level_index: 0,
            level,
            player,
            scheduler,
            clock: SimClock::new(),
            ctx: SimContext::default(),
            paused: false,
            level_started_at: Duration::ZERO,
            hazard_hit: false,
            exit_reached: false,
        };
        runner.load_level(0);
        runner
    }

    /// Tear down the current level and start level `index`. Returns false,
    /// leaving the current level running, if there is no such level.
    pub fn load_level(&mut self, index: usize) -> bool {
        let Some(data) = self.levels.get(index) else {
            tracing::warn!(index, available = self.levels.len(), "No such level");
            return false;
        };
        let level = Level::load(data, &self.config.enemy);

        self.teardown();
        self.level = level;
        self.level_index = index;

        let now = self.clock.now();
        let (x, y) = self.level.player_start;
        self.player.spawn(x, y, now, self.config.invincibility());
        self.scheduler.start_level(now, self.level.baseline_shake);
        self.level_started_at = now;
        self.hazard_hit = false;
        self.exit_reached = false;

        tracing::info!(
            index,
            name = %self.level.name,
            advanced = self.level.advanced_glitches,
            "Level loaded"
        );
        true
    }

    /// Revert every active glitch and make every platform solid again.
    pub fn teardown(&mut self) {
        tracing::info!(
            name = %self.level.name,
            active = self.scheduler.active().len(),
            "Level teardown"
        );
        self.scheduler.revert_all(&mut GlitchTargets {
            player: &mut self.player,
            platforms: &mut self.level.platforms,
        });
        self.level.reset_platforms();
    }

    /// Put the player back at the level start with temporary invincibility.
    pub fn respawn(&mut self) {
        let (x, y) = self.level.player_start;
        let invincibility = self.config.invincibility();
        self.player.spawn(x, y, self.clock.now(), invincibility);
        self.hazard_hit = false;
    }

    /// Apply `effect` now, outside the trigger schedule.
    pub fn force_glitch(&mut self, effect: GlitchEffect) {
        let now = self.clock.now();
        self.scheduler.apply(
            effect,
            now,
            &mut GlitchTargets {
                player: &mut self.player,
                platforms: &mut self.level.platforms,
            },
        );
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn scheduler(&self) -> &GlitchScheduler {
        &self.scheduler
    }

    pub fn context(&self) -> SimContext {
        self.ctx
    }

    /// Player touched a hazard on the last tick.
    pub fn hazard_hit(&self) -> bool {
        self.hazard_hit
    }

    /// Player overlapped the exit on the last tick.
    pub fn exit_reached(&self) -> bool {
        self.exit_reached
    }

    /// Time spent on the current level.
    pub fn level_elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.level_started_at)
    }

    pub fn level_score(&self) -> u32 {
        scoring::level_score(self.level_elapsed())
    }

    pub fn active_labels(&self) -> Vec<&'static str> {
        self.scheduler.active_labels()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.scheduler.notification(self.clock.now())
    }

    /// Draw the current tick into `frame` and post-process it.
    pub fn render(
        &self,
        frame: &mut Frame,
        post: &mut PostProcessor,
        painter: &mut dyn NotificationPainter,
    ) {
        let visuals = self.scheduler.visuals();
        draw_scene(
            frame,
            &Scene {
                level: &self.level,
                player: &self.player,
                visuals,
                debug: self.ctx.debug,
                now: self.clock.now(),
            },
        );
        let banner = self.notification().map(|n| n.text.as_str());
        post.apply(frame, visuals, banner, painter);
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        let now = self.clock.now();
        RunnerSnapshot {
            level: self.level.name.clone(),
            tick: self.clock.tick(),
            elapsed_secs: self.clock.elapsed_secs(),
            player: self.player.body.rect,
            player_velocity: (self.player.body.vx, self.player.body.vy),
            mode: self.player.mode(),
            jump_count: self.player.jump_count,
            invincible: self.player.is_invincible(now),
            platforms: self
                .level
                .platforms
                .iter()
                .map(|p| PlatformView {
                    rect: p.rect,
                    solid: p.solid,
                    opacity: p.opacity,
                })
                .collect(),
            enemies: self.level.enemies.iter().map(|e| e.body.rect).collect(),
            projectiles: self
                .level
                .enemies
                .iter()
                .flat_map(|e| e.projectiles.iter().map(|p| p.rect))
                .collect(),
            exit: self.level.exit,
            visuals: *self.scheduler.visuals(),
            active_glitches: self
                .active_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            notification: self.notification().map(|n| n.text.clone()),
        }
    }
}

impl Default for GlitchRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl Simulation for GlitchRunner {
    fn metadata(&self) -> SimMetadata {
        SimMetadata {
            name: "Glitch Runner".to_string(),
            description: "Reach the exit while reality glitches around you.".to_string(),
            level_count: self.levels.len(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn update(&mut self, dt: f32, inputs: &[InputEvent]) -> Vec<SimEvent> {
        if self.paused {
            return Vec::new();
        }

        self.clock.advance(dt);
        let now = self.clock.now();
        let mut events = Vec::new();

        let changes = self.scheduler.update(
            now,
            &mut GlitchTargets {
                player: &mut self.player,
                platforms: &mut self.level.platforms,
            },
        );
        for change in changes {
            events.push(match change {
                GlitchChange::Started(kind) => SimEvent::GlitchStarted {
                    label: kind.label().to_string(),
                },
                GlitchChange::Ended(kind) => SimEvent::GlitchEnded {
                    label: kind.label().to_string(),
                },
            });
        }

        // Debug toggling is a host concern and bypasses input lag.
        let mut delivered = Vec::with_capacity(inputs.len());
        for &event in inputs {
            if event.key == Key::DebugToggle {
                if event.is_press(Key::DebugToggle) {
                    self.ctx.debug = !self.ctx.debug;
                    events.push(SimEvent::DebugToggled {
                        enabled: self.ctx.debug,
                    });
                }
                continue;
            }
            if let Some(event) = self.scheduler.filter_input(event, now) {
                delivered.push(event);
            }
        }
        delivered.extend(self.scheduler.release_lagged(now));

        let bounds = self.config.bounds();
        tick_player(
            &mut self.player,
            &delivered,
            &self.level.platforms,
            &bounds,
            &self.config.physics,
            now,
        );
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.level.update_enemies(
            &self.player.body.rect,
            &bounds,
            &self.config.physics,
            &self.config.enemy,
            dt,
        );

        self.hazard_hit = self.level.check_hazard(&self.player, now);
        if self.hazard_hit {
            events.push(SimEvent::HazardHit);
        }
        self.exit_reached = self.level.exit_reached(&self.player.body.rect);
        if self.exit_reached {
            events.push(SimEvent::ExitReached);
        }

        if self.ctx.debug {
            tracing::debug!(
                tick = self.clock.tick(),
                x = self.player.body.rect.x,
                y = self.player.body.rect.y,
                vx = self.player.body.vx,
                vy = self.player.body.vy,
                mode = ?self.player.mode(),
                "Player state"
            );
        }

        events
    }

    simulation_boilerplate!();
}
