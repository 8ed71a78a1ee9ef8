//! Timed, reversible glitch effects.
//!
//! The scheduler fires a random glitch every interval. Each activation
//! records exactly what it changed so the matching revert restores the
//! baseline when its lifetime ends, while other glitches stay in effect.

mod effects;
mod input_lag;

pub use effects::{ActiveGlitch, GlitchEffect, GlitchKind, PIXEL_SIZES, TimedGlitch};
pub use input_lag::InputLagBuffer;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;
use glitch_core::input::InputEvent;
use glitch_core::notification::{Notification, NotificationSlot};

use crate::config::{GlitchConfig, RunnerConfig};
use crate::level::Platform;
use crate::player::Player;

/// World state a glitch may change.
pub struct GlitchTargets<'a> {
    pub player: &'a mut Player,
    pub platforms: &'a mut [Platform],
}

/// Render-side glitch state read by the post-processor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlitchVisuals {
    /// False during the "off" half of a flicker cycle.
    pub visible: bool,
    pub color_shift: [i16; 3],
    pub shake_magnitude: i32,
    pub shake_offset: (i32, i32),
    /// 1 means no pixelation.
    pub pixel_size: u32,
}

impl Default for GlitchVisuals {
    fn default() -> Self {
        Self {
            visible: true,
            color_shift: [0; 3],
            shake_magnitude: 0,
            shake_offset: (0, 0),
            pixel_size: 1,
        }
    }
}

/// Glitch lifecycle transitions from one scheduler update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchChange {
    Started(GlitchKind),
    Ended(GlitchKind),
}

pub struct GlitchScheduler {
    config: GlitchConfig,
    bounds: Rect,
    base_gravity: f32,
    base_speed: f32,
    rng: StdRng,
    last_trigger: Duration,
    active: Vec<ActiveGlitch>,
    visuals: GlitchVisuals,
    baseline_shake: i32,
    flicker_ticks: u32,
    speed_multiplier: f32,
    input_lag: InputLagBuffer,
    notification: NotificationSlot,
}

impl GlitchScheduler {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            config: config.glitch.clone(),
            bounds: config.bounds(),
            base_gravity: config.physics.gravity,
            base_speed: config.physics.player_speed,
            rng: StdRng::seed_from_u64(config.glitch.seed),
            last_trigger: Duration::ZERO,
            active: Vec::new(),
            visuals: GlitchVisuals::default(),
            baseline_shake: 0,
            flicker_ticks: 0,
            speed_multiplier: 1.0,
            input_lag: InputLagBuffer::new(config.tick_rate_hz),
            notification: NotificationSlot::new(),
        }
    }

    /// Restart the trigger timer for a freshly loaded level.
    pub fn start_level(&mut self, now: Duration, baseline_shake: i32) {
        self.last_trigger = now;
        self.baseline_shake = baseline_shake.max(0);
        self.visuals = GlitchVisuals {
            shake_magnitude: self.baseline_shake,
            ..GlitchVisuals::default()
        };
        self.refresh_shake();
    }

    /// Advance one tick: maybe trigger a new glitch, then expire or
    /// progress every active one.
    pub fn update(
        &mut self,
        now: Duration,
        targets: &mut GlitchTargets<'_>,
    ) -> Vec<GlitchChange> {
        let mut changes = Vec::new();

        if now.saturating_sub(self.last_trigger) > self.config.interval() {
            let kind = GlitchKind::random(&mut self.rng);
            self.activate(kind, now, targets);
            self.last_trigger = now;
            changes.push(GlitchChange::Started(kind));
        }

        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|g| g.is_expired(now));
        self.active = live;

        for glitch in expired {
            let kind = glitch.kind.effect.kind();
            self.revert(&glitch.kind.effect, targets);
            changes.push(GlitchChange::Ended(kind));
        }

        for glitch in &self.active {
            match &glitch.kind.effect {
                GlitchEffect::Flicker => {
                    self.flicker_ticks += 1;
                    if self.flicker_ticks >= self.config.flicker_period {
                        self.visuals.visible = !self.visuals.visible;
                        self.flicker_ticks = 0;
                    }
                },
                GlitchEffect::PlatformVanish { platforms } => {
                    for &i in platforms {
                        if let Some(p) = targets.platforms.get_mut(i) {
                            p.fade(self.config.vanish_fade_step);
                        }
                    }
                },
                _ => {},
            }
        }

        self.refresh_shake();
        changes
    }

    /// Roll parameters for `kind` and apply it.
    pub fn activate(
        &mut self,
        kind: GlitchKind,
        now: Duration,
        targets: &mut GlitchTargets<'_>,
    ) {
        let effect = GlitchEffect::roll(
            kind,
            &mut self.rng,
            targets.platforms,
            &self.bounds,
            self.config.vanish_floor_band,
        );
        self.apply(effect, now, targets);
    }

    /// Apply a fully specified glitch starting at `now`.
    pub fn apply(
        &mut self,
        effect: GlitchEffect,
        now: Duration,
        targets: &mut GlitchTargets<'_>,
    ) {
        match &effect {
            GlitchEffect::ReverseGravity => {
                let player = &mut *targets.player;
                player.body.vy = -player.body.vy;
                player.gravity = -self.base_gravity;
                player.ceiling_enabled = true;
            },
            GlitchEffect::Flicker => {
                self.flicker_ticks = 0;
                self.visuals.visible = true;
            },
            GlitchEffect::InputLag { delay_ticks } => self.input_lag.activate(*delay_ticks),
            GlitchEffect::ColorShift { offset } => self.visuals.color_shift = *offset,
            GlitchEffect::ScreenShake { magnitude } => {
                self.visuals.shake_magnitude = (*magnitude).max(0);
            },
            GlitchEffect::PlatformVanish { platforms } => {
                if platforms.is_empty() {
                    tracing::warn!("No platform eligible to vanish");
                }
                for &i in platforms {
                    if let Some(p) = targets.platforms.get_mut(i) {
                        p.begin_vanish();
                    }
                }
            },
            GlitchEffect::SpeedChange { multiplier } => {
                self.speed_multiplier = *multiplier;
                targets.player.speed = self.base_speed * multiplier;
            },
            GlitchEffect::Pixelate { block_size } => {
                self.visuals.pixel_size = (*block_size).max(1);
            },
        }

        let label = effect.kind().label();
        tracing::info!(glitch = label, ?effect, "Glitch activated");
        self.notification.show(Notification::new(
            format!("GLITCH: {label}"),
            now,
            self.config.notification(),
        ));
        self.active.push(ActiveGlitch::new(
            TimedGlitch {
                effect,
                lifetime: self.config.duration(),
            },
            now,
        ));
    }

    fn revert(&mut self, effect: &GlitchEffect, targets: &mut GlitchTargets<'_>) {
        match effect {
            GlitchEffect::ReverseGravity => {
                let player = &mut *targets.player;
                player.body.vy = -player.body.vy;
                player.gravity = self.base_gravity;
                player.ceiling_enabled = false;
            },
            GlitchEffect::Flicker => self.visuals.visible = true,
            GlitchEffect::InputLag { .. } => self.input_lag.clear(),
            GlitchEffect::ColorShift { .. } => self.visuals.color_shift = [0; 3],
            GlitchEffect::ScreenShake { .. } => {
                self.visuals.shake_magnitude = self.baseline_shake;
                self.visuals.shake_offset = (0, 0);
            },
            GlitchEffect::PlatformVanish { platforms } => {
                for &i in platforms {
                    if let Some(p) = targets.platforms.get_mut(i) {
                        p.restore();
                    }
                }
            },
            GlitchEffect::SpeedChange { .. } => {
                self.speed_multiplier = 1.0;
                targets.player.speed = self.base_speed;
            },
            GlitchEffect::Pixelate { .. } => self.visuals.pixel_size = 1,
        }
        tracing::info!(glitch = effect.kind().label(), "Glitch reverted");
    }

    /// Revert every active glitch (level teardown).
    pub fn revert_all(&mut self, targets: &mut GlitchTargets<'_>) {
        for glitch in std::mem::take(&mut self.active) {
            self.revert(&glitch.kind.effect, targets);
        }
        self.input_lag.clear();
        self.flicker_ticks = 0;
        self.notification.clear();
        self.visuals = GlitchVisuals {
            shake_magnitude: self.baseline_shake,
            ..GlitchVisuals::default()
        };
    }

    fn refresh_shake(&mut self) {
        let m = self.visuals.shake_magnitude;
        self.visuals.shake_offset = if m > 0 {
            (self.rng.random_range(-m..=m), self.rng.random_range(-m..=m))
        } else {
            (0, 0)
        };
    }

    /// Route a captured key event. Returns it for immediate delivery, or
    /// `None` if input lag is holding it back.
    pub fn filter_input(&mut self, event: InputEvent, now: Duration) -> Option<InputEvent> {
        if self.input_lag.is_active() {
            self.input_lag.push(event, now);
            None
        } else {
            Some(event.at(now))
        }
    }

    /// Lagged events whose delay has elapsed by `now`.
    pub fn release_lagged(&mut self, now: Duration) -> Vec<InputEvent> {
        self.input_lag.release(now)
    }

    pub fn visuals(&self) -> &GlitchVisuals {
        &self.visuals
    }

    pub fn active(&self) -> &[ActiveGlitch] {
        &self.active
    }

    pub fn is_active(&self, kind: GlitchKind) -> bool {
        self.active.iter().any(|g| g.kind.effect.kind() == kind)
    }

    /// HUD labels of active glitches, oldest first.
    pub fn active_labels(&self) -> Vec<&'static str> {
        self.active
            .iter()
            .map(|g| g.kind.effect.kind().label())
            .collect()
    }

    pub fn notification(&self, now: Duration) -> Option<&Notification> {
        self.notification.visible(now)
    }

    pub fn input_lag(&self) -> &InputLagBuffer {
        &self.input_lag
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn interval(&self) -> Duration {
        self.config.interval()
    }
}
