use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use glitch_core::effect::{self, EffectKind};
use glitch_core::geometry::Rect;

use crate::level::Platform;

/// Pixelation block sizes a glitch can pick from.
pub const PIXEL_SIZES: [u32; 5] = [2, 3, 4, 6, 8];

/// The eight glitch families. Each trigger picks one uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlitchKind {
    ReverseGravity,
    Flicker,
    InputLag,
    ColorShift,
    ScreenShake,
    PlatformVanish,
    SpeedChange,
    Pixelate,
}

impl GlitchKind {
    pub const ALL: [GlitchKind; 8] = [
        GlitchKind::ReverseGravity,
        GlitchKind::Flicker,
        GlitchKind::InputLag,
        GlitchKind::ColorShift,
        GlitchKind::ScreenShake,
        GlitchKind::PlatformVanish,
        GlitchKind::SpeedChange,
        GlitchKind::Pixelate,
    ];

    /// HUD label for the glitch.
    pub fn label(self) -> &'static str {
        match self {
            GlitchKind::ReverseGravity => "REVERSED GRAVITY",
            GlitchKind::Flicker => "FLICKERING SPRITES",
            GlitchKind::InputLag => "INPUT LAG",
            GlitchKind::ColorShift => "COLOR DISTORTION",
            GlitchKind::ScreenShake => "SCREEN SHAKE",
            GlitchKind::PlatformVanish => "PLATFORM DISAPPEAR",
            GlitchKind::SpeedChange => "SPEED CHANGE",
            GlitchKind::Pixelate => "PIXELATION",
        }
    }

    pub fn random(rng: &mut impl Rng) -> GlitchKind {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A glitch with its parameters rolled at activation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlitchEffect {
    ReverseGravity,
    Flicker,
    InputLag { delay_ticks: u32 },
    ColorShift { offset: [i16; 3] },
    ScreenShake { magnitude: i32 },
    /// Indices into the level's platform list, in fade order.
    PlatformVanish { platforms: Vec<usize> },
    SpeedChange { multiplier: f32 },
    Pixelate { block_size: u32 },
}

impl GlitchEffect {
    pub fn kind(&self) -> GlitchKind {
        match self {
            GlitchEffect::ReverseGravity => GlitchKind::ReverseGravity,
            GlitchEffect::Flicker => GlitchKind::Flicker,
            GlitchEffect::InputLag { .. } => GlitchKind::InputLag,
            GlitchEffect::ColorShift { .. } => GlitchKind::ColorShift,
            GlitchEffect::ScreenShake { .. } => GlitchKind::ScreenShake,
            GlitchEffect::PlatformVanish { .. } => GlitchKind::PlatformVanish,
            GlitchEffect::SpeedChange { .. } => GlitchKind::SpeedChange,
            GlitchEffect::Pixelate { .. } => GlitchKind::Pixelate,
        }
    }

    /// Roll parameters for `kind`.
    ///
    /// Vanish candidates are platforms whose top lies above the floor band
    /// (`floor_band` pixels above the bottom of `bounds`); up to three are
    /// picked. With no candidates the vanish list is empty.
    pub fn roll(
        kind: GlitchKind,
        rng: &mut impl Rng,
        platforms: &[Platform],
        bounds: &Rect,
        floor_band: f32,
    ) -> GlitchEffect {
        match kind {
            GlitchKind::ReverseGravity => GlitchEffect::ReverseGravity,
            GlitchKind::Flicker => GlitchEffect::Flicker,
            GlitchKind::InputLag => GlitchEffect::InputLag {
                delay_ticks: rng.random_range(5..=15),
            },
            GlitchKind::ColorShift => GlitchEffect::ColorShift {
                offset: [
                    rng.random_range(-100..=100),
                    rng.random_range(-100..=100),
                    rng.random_range(-100..=100),
                ],
            },
            GlitchKind::ScreenShake => GlitchEffect::ScreenShake {
                magnitude: rng.random_range(5..=15),
            },
            GlitchKind::PlatformVanish => {
                let cutoff = bounds.bottom() - floor_band;
                let mut eligible: Vec<usize> = platforms
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.rect.y < cutoff)
                    .map(|(i, _)| i)
                    .collect();
                let count = rng.random_range(1..=3usize).min(eligible.len());
                eligible.shuffle(rng);
                eligible.truncate(count);
                GlitchEffect::PlatformVanish {
                    platforms: eligible,
                }
            },
            GlitchKind::SpeedChange => GlitchEffect::SpeedChange {
                multiplier: rng.random_range(0.5..=2.0),
            },
            GlitchKind::Pixelate => GlitchEffect::Pixelate {
                block_size: PIXEL_SIZES[rng.random_range(0..PIXEL_SIZES.len())],
            },
        }
    }
}

/// A glitch paired with how long it stays active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedGlitch {
    pub effect: GlitchEffect,
    pub lifetime: Duration,
}

impl EffectKind for TimedGlitch {
    fn duration(&self) -> Duration {
        self.lifetime
    }
}

/// A glitch currently in effect.
pub type ActiveGlitch = effect::ActiveEffect<TimedGlitch>;
