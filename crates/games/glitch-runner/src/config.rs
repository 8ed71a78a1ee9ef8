use std::time::Duration;

use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.8;
/// Horizontal walk speed (pixels per tick).
pub const PLAYER_SPEED: f32 = 5.0;
/// Initial upward speed of a jump.
pub const JUMP_POWER: f32 = 15.0;
/// Downward speed cap.
pub const MAX_FALL_SPEED: f32 = 15.0;
pub const PLAYER_WIDTH: f32 = 32.0;
pub const PLAYER_HEIGHT: f32 = 32.0;
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
pub const TICK_RATE_HZ: f32 = 60.0;

/// Player movement tuning. Velocities are in pixels per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub player_speed: f32,
    pub jump_power: f32,
    pub max_fall_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub max_jumps: u8,
    /// Frames during which holding jump keeps adding lift.
    pub max_jump_time: u32,
    /// Extra upward speed added per held frame.
    pub jump_hold_lift: f32,
    pub wall_slide_speed: f32,
    pub wall_jump_power: f32,
    /// Previous-edge tolerance the resolver uses to pick an axis.
    pub collision_tolerance: f32,
    /// Extra width on each side of the player used to detect a wall.
    pub wall_probe: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            player_speed: PLAYER_SPEED,
            jump_power: JUMP_POWER,
            max_fall_speed: MAX_FALL_SPEED,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            max_jumps: 2,
            max_jump_time: 15,
            jump_hold_lift: 0.5,
            wall_slide_speed: 1.0,
            wall_jump_power: 10.0,
            collision_tolerance: 10.0,
            wall_probe: 2.0,
        }
    }
}

/// Enemy and projectile tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Seconds a jumper waits on the ground between jumps.
    pub jump_interval_secs: f32,
    /// Jumper jump power as a fraction of the player's.
    pub jump_scale: f32,
    /// Seconds between shooter volleys.
    pub shoot_interval_secs: f32,
    /// Maximum vertical distance to the player for a shooter to fire.
    pub shoot_range: f32,
    pub projectile_speed: f32,
    pub projectile_width: f32,
    pub projectile_height: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            speed: 2.0,
            jump_interval_secs: 2.0,
            jump_scale: 0.7,
            shoot_interval_secs: 3.0,
            shoot_range: 100.0,
            projectile_speed: 7.0,
            projectile_width: 10.0,
            projectile_height: 6.0,
        }
    }
}

/// Glitch scheduler tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub interval_secs: f32,
    pub duration_secs: f32,
    pub notification_secs: f32,
    /// Ticks between flicker visibility toggles.
    pub flicker_period: u32,
    /// Opacity removed from a vanishing platform per tick.
    pub vanish_fade_step: u8,
    /// Platforms whose top lies within this band above the level bottom never vanish.
    pub vanish_floor_band: f32,
    pub seed: u64,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10.0,
            duration_secs: 5.0,
            notification_secs: 2.0,
            flicker_period: 5,
            vanish_fade_step: 5,
            vanish_floor_band: 100.0,
            seed: 42,
        }
    }
}

impl GlitchConfig {
    pub fn interval(&self) -> Duration {
        secs_to_duration(self.interval_secs)
    }

    pub fn duration(&self) -> Duration {
        secs_to_duration(self.duration_secs)
    }

    pub fn notification(&self) -> Duration {
        secs_to_duration(self.notification_secs)
    }
}

/// Top-level Glitch Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub physics: PhysicsConfig,
    pub enemy: EnemyConfig,
    pub glitch: GlitchConfig,
    pub tick_rate_hz: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub invincibility_secs: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            enemy: EnemyConfig::default(),
            glitch: GlitchConfig::default(),
            tick_rate_hz: TICK_RATE_HZ,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            invincibility_secs: 2.0,
        }
    }
}

impl RunnerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("GLITCH_RUNNER_CONFIG")
            .unwrap_or_else(|_| "config/glitch_runner.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => RunnerConfig::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Level bounds in screen pixels.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.screen_width, self.screen_height)
    }

    pub fn invincibility(&self) -> Duration {
        secs_to_duration(self.invincibility_secs)
    }
}

fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f32(secs)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tuning() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.physics.gravity, 0.8);
        assert_eq!(cfg.physics.jump_power, 15.0);
        assert_eq!(cfg.physics.max_jumps, 2);
        assert_eq!(cfg.glitch.interval(), Duration::from_secs(10));
        assert_eq!(cfg.glitch.duration(), Duration::from_secs(5));
        assert_eq!(cfg.invincibility(), Duration::from_secs(2));
        assert_eq!(cfg.bounds(), Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = RunnerConfig::from_toml(
            r#"
            tick_rate_hz = 30.0

            [physics]
            gravity = 1.2

            [glitch]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tick_rate_hz, 30.0);
        assert_eq!(cfg.physics.gravity, 1.2);
        assert_eq!(cfg.physics.jump_power, JUMP_POWER);
        assert_eq!(cfg.glitch.seed, 7);
        assert_eq!(cfg.glitch.duration_secs, 5.0);
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let sample = include_str!("../../../../config/glitch_runner.toml");
        let cfg = RunnerConfig::from_toml(sample).unwrap();
        let defaults = RunnerConfig::default();
        assert_eq!(cfg.glitch.seed, defaults.glitch.seed);
        assert_eq!(cfg.physics.wall_probe, defaults.physics.wall_probe);
        assert_eq!(cfg.enemy.projectile_height, defaults.enemy.projectile_height);
        assert_eq!(cfg.glitch.vanish_fade_step, defaults.glitch.vanish_fade_step);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(RunnerConfig::from_toml("physics = 3").is_err());
    }

    #[test]
    fn non_positive_durations_clamp_to_zero() {
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f32::NAN), Duration::ZERO);
    }
}
