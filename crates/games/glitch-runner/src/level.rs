use std::time::Duration;

use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;

use crate::config::{EnemyConfig, PhysicsConfig, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::enemy::{Enemy, EnemyKind};
use crate::player::Player;

/// Size of the exit portal.
pub const EXIT_WIDTH: f32 = 50.0;
pub const EXIT_HEIGHT: f32 = 80.0;

/// A static rectangle of level geometry. Only the glitch scheduler changes
/// `solid`, `opacity`, and `disappearing`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub solid: bool,
    pub opacity: u8,
    pub disappearing: bool,
}

impl Platform {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            solid: true,
            opacity: u8::MAX,
            disappearing: false,
        }
    }

    /// Start fading from full opacity.
    pub fn begin_vanish(&mut self) {
        self.opacity = u8::MAX;
        self.solid = true;
        self.disappearing = true;
    }

    /// Set opacity; a platform is solid exactly while it has any opacity.
    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
        self.solid = opacity > 0;
    }

    /// One fade step. No-op unless the platform is vanishing.
    pub fn fade(&mut self, step: u8) {
        if self.disappearing {
            self.set_opacity(self.opacity.saturating_sub(step));
        }
    }

    /// Back to fully opaque and solid.
    pub fn restore(&mut self) {
        self.opacity = u8::MAX;
        self.solid = true;
        self.disappearing = false;
    }
}

/// One enemy placement in a level file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub patrol_radius: f32,
    pub kind: EnemyKind,
}

/// Static description of a level, as loaded from a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub background_color: [u8; 3],
    pub player_start: (f32, f32),
    pub exit_pos: (f32, f32),
    pub lives: u32,
    /// Platform rects as `[x, y, width, height]`, in draw and collision order.
    pub platforms: Vec<[f32; 4]>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Constant screen-shake magnitude for the whole level.
    #[serde(default)]
    pub shake_intensity: Option<i32>,
    #[serde(default)]
    pub advanced_glitches: bool,
}

impl LevelData {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The built-in campaign, in play order.
    pub fn all() -> Vec<LevelData> {
        vec![level_1(), level_2(), level_3(), level_4(), level_5()]
    }

    pub fn builtin(index: usize) -> Option<LevelData> {
        Self::all().into_iter().nth(index)
    }
}

fn spawn(x: f32, y: f32, patrol_radius: f32, kind: EnemyKind) -> EnemySpawn {
    EnemySpawn {
        x,
        y,
        patrol_radius,
        kind,
    }
}

const W: f32 = SCREEN_WIDTH;
const H: f32 = SCREEN_HEIGHT;

fn level_1() -> LevelData {
    use EnemyKind::Basic;
    LevelData {
        name: "First Glitches".to_string(),
        background_color: [30, 30, 50],
        player_start: (100.0, H - 150.0),
        exit_pos: (W - 100.0, H - 150.0),
        lives: 2,
        platforms: vec![
            [0.0, H - 50.0, W, 50.0],
            [200.0, H - 200.0, 200.0, 20.0],
            [500.0, H - 300.0, 200.0, 20.0],
            [100.0, H - 400.0, 200.0, 20.0],
            // wall-jump wall
            [400.0, H - 250.0, 20.0, 150.0],
        ],
        enemies: vec![
            spawn(300.0, H - 90.0, 150.0, Basic),
            spawn(550.0, H - 340.0, 100.0, Basic),
        ],
        shake_intensity: None,
        advanced_glitches: false,
    }
}

fn level_2() -> LevelData {
    use EnemyKind::{Basic, Jumper, Shooter};
    LevelData {
        name: "Glitch Intensifies".to_string(),
        background_color: [40, 20, 60],
        player_start: (50.0, H - 150.0),
        exit_pos: (W - 50.0, 100.0),
        lives: 3,
        platforms: vec![
            [0.0, H - 50.0, W, 50.0],
            [0.0, H - 200.0, 150.0, 20.0],
            [200.0, H - 300.0, 150.0, 20.0],
            [0.0, H - 400.0, 150.0, 20.0],
            [300.0, H - 250.0, 200.0, 20.0],
            [350.0, H - 400.0, 100.0, 20.0],
            [600.0, H - 200.0, 200.0, 20.0],
            [550.0, H - 350.0, 150.0, 20.0],
            [650.0, H - 500.0, 150.0, 20.0],
            [300.0, H - 350.0, 20.0, 100.0],
            [530.0, H - 500.0, 20.0, 150.0],
        ],
        enemies: vec![
            spawn(200.0, H - 90.0, 200.0, Basic),
            spawn(500.0, H - 90.0, 200.0, Basic),
            spawn(650.0, H - 240.0, 150.0, Jumper),
            spawn(400.0, H - 440.0, 50.0, Shooter),
        ],
        shake_intensity: None,
        advanced_glitches: false,
    }
}

fn level_3() -> LevelData {
    use EnemyKind::{Basic, Jumper, Shooter};
    LevelData {
        name: "Glitch Nightmare".to_string(),
        background_color: [60, 10, 30],
        player_start: (50.0, H - 150.0),
        exit_pos: (W - 50.0, 50.0),
        lives: 5,
        platforms: vec![
            [0.0, H - 50.0, W, 50.0],
            [0.0, H - 200.0, 100.0, 20.0],
            [150.0, H - 300.0, 100.0, 20.0],
            [0.0, H - 400.0, 100.0, 20.0],
            [200.0, H - 150.0, 50.0, 20.0],
            [300.0, H - 250.0, 50.0, 20.0],
            [400.0, H - 350.0, 50.0, 20.0],
            [300.0, H - 450.0, 50.0, 20.0],
            [200.0, H - 550.0, 50.0, 20.0],
            [500.0, H - 200.0, 100.0, 20.0],
            [650.0, H - 300.0, 100.0, 20.0],
            [500.0, H - 400.0, 100.0, 20.0],
            [650.0, H - 500.0, 150.0, 20.0],
            [450.0, H - 300.0, 20.0, 250.0],
            [600.0, H - 500.0, 20.0, 200.0],
        ],
        enemies: vec![
            spawn(300.0, H - 90.0, 150.0, Basic),
            spawn(600.0, H - 90.0, 150.0, Jumper),
            spawn(150.0, H - 340.0, 50.0, Shooter),
            spawn(500.0, H - 240.0, 100.0, Basic),
            spawn(650.0, H - 340.0, 100.0, Jumper),
            spawn(500.0, H - 440.0, 100.0, Shooter),
            spawn(700.0, H - 540.0, 100.0, Basic),
        ],
        shake_intensity: None,
        advanced_glitches: false,
    }
}

fn level_4() -> LevelData {
    use EnemyKind::{Basic, Jumper, Shooter};
    LevelData {
        name: "Reality Breakdown".to_string(),
        background_color: [45, 15, 45],
        player_start: (50.0, H - 150.0),
        exit_pos: (W - 50.0, 50.0),
        lives: 6,
        platforms: vec![
            // broken ground
            [0.0, H - 50.0, 150.0, 50.0],
            [200.0, H - 50.0, 150.0, 50.0],
            [400.0, H - 50.0, 150.0, 50.0],
            [600.0, H - 50.0, 200.0, 50.0],
            [100.0, H - 180.0, 80.0, 20.0],
            [250.0, H - 250.0, 80.0, 20.0],
            [150.0, H - 320.0, 80.0, 20.0],
            [300.0, H - 390.0, 80.0, 20.0],
            [400.0, H - 200.0, 70.0, 20.0],
            [500.0, H - 280.0, 70.0, 20.0],
            [400.0, H - 360.0, 70.0, 20.0],
            [500.0, H - 440.0, 70.0, 20.0],
            [600.0, H - 300.0, 100.0, 20.0],
            [650.0, H - 400.0, 100.0, 20.0],
            [600.0, H - 500.0, 200.0, 20.0],
            [350.0, H - 300.0, 20.0, 200.0],
            [550.0, H - 500.0, 20.0, 150.0],
            [250.0, H - 400.0, 20.0, 100.0],
        ],
        enemies: vec![
            spawn(250.0, H - 90.0, 100.0, Basic),
            spawn(500.0, H - 90.0, 150.0, Jumper),
            spawn(100.0, H - 220.0, 80.0, Shooter),
            spawn(250.0, H - 290.0, 80.0, Basic),
            spawn(300.0, H - 430.0, 80.0, Jumper),
            spawn(400.0, H - 240.0, 70.0, Shooter),
            spawn(500.0, H - 320.0, 70.0, Basic),
            spawn(400.0, H - 400.0, 70.0, Jumper),
            spawn(600.0, H - 340.0, 100.0, Shooter),
            spawn(650.0, H - 440.0, 100.0, Jumper),
            spawn(700.0, H - 540.0, 100.0, Shooter),
        ],
        shake_intensity: Some(5),
        advanced_glitches: false,
    }
}

fn level_5() -> LevelData {
    use EnemyKind::{Basic, Jumper, Shooter};
    LevelData {
        name: "System Collapse".to_string(),
        background_color: [50, 10, 20],
        player_start: (50.0, H - 150.0),
        exit_pos: (W - 50.0, 50.0),
        lives: 8,
        platforms: vec![
            [0.0, H - 50.0, 100.0, 50.0],
            [150.0, H - 50.0, 100.0, 50.0],
            [300.0, H - 50.0, 100.0, 50.0],
            [450.0, H - 50.0, 100.0, 50.0],
            [600.0, H - 50.0, 100.0, 50.0],
            [750.0, H - 50.0, 50.0, 50.0],
            [50.0, H - 150.0, 60.0, 20.0],
            [150.0, H - 220.0, 60.0, 20.0],
            [50.0, H - 290.0, 60.0, 20.0],
            [150.0, H - 360.0, 60.0, 20.0],
            [50.0, H - 430.0, 60.0, 20.0],
            [250.0, H - 180.0, 50.0, 20.0],
            [350.0, H - 240.0, 50.0, 20.0],
            [450.0, H - 300.0, 50.0, 20.0],
            [350.0, H - 360.0, 50.0, 20.0],
            [250.0, H - 420.0, 50.0, 20.0],
            [350.0, H - 480.0, 50.0, 20.0],
            [550.0, H - 200.0, 70.0, 20.0],
            [650.0, H - 270.0, 70.0, 20.0],
            [550.0, H - 340.0, 70.0, 20.0],
            [650.0, H - 410.0, 70.0, 20.0],
            [550.0, H - 480.0, 70.0, 20.0],
            [650.0, H - 550.0, 150.0, 20.0],
            [200.0, H - 250.0, 20.0, 150.0],
            [500.0, H - 350.0, 20.0, 200.0],
            [300.0, H - 450.0, 20.0, 150.0],
            [600.0, H - 500.0, 20.0, 250.0],
        ],
        enemies: vec![
            spawn(100.0, H - 90.0, 100.0, Basic),
            spawn(250.0, H - 90.0, 100.0, Jumper),
            spawn(400.0, H - 90.0, 100.0, Shooter),
            spawn(550.0, H - 90.0, 100.0, Basic),
            spawn(700.0, H - 90.0, 100.0, Jumper),
            spawn(50.0, H - 190.0, 60.0, Shooter),
            spawn(150.0, H - 260.0, 60.0, Basic),
            spawn(50.0, H - 330.0, 60.0, Jumper),
            spawn(150.0, H - 400.0, 60.0, Shooter),
            spawn(250.0, H - 220.0, 50.0, Basic),
            spawn(350.0, H - 280.0, 50.0, Jumper),
            spawn(450.0, H - 340.0, 50.0, Shooter),
            spawn(350.0, H - 400.0, 50.0, Basic),
            spawn(250.0, H - 460.0, 50.0, Jumper),
            spawn(550.0, H - 240.0, 70.0, Shooter),
            spawn(650.0, H - 310.0, 70.0, Basic),
            spawn(550.0, H - 380.0, 70.0, Jumper),
            spawn(650.0, H - 450.0, 70.0, Shooter),
            spawn(550.0, H - 520.0, 70.0, Basic),
            spawn(700.0, H - 590.0, 100.0, Jumper),
        ],
        shake_intensity: Some(8),
        advanced_glitches: true,
    }
}

/// A loaded level: the mutable runtime state built from `LevelData`.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub background_color: [u8; 3],
    pub player_start: (f32, f32),
    pub lives: u32,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub exit: Rect,
    pub baseline_shake: i32,
    pub advanced_glitches: bool,
}

impl Level {
    pub fn load(data: &LevelData, enemy_cfg: &EnemyConfig) -> Self {
        let platforms = data
            .platforms
            .iter()
            .map(|&[x, y, w, h]| Platform::new(Rect::new(x, y, w, h)))
            .collect();
        let enemies = data
            .enemies
            .iter()
            .map(|s| Enemy::new(s, enemy_cfg))
            .collect();
        Self {
            name: data.name.clone(),
            background_color: data.background_color,
            player_start: data.player_start,
            lives: data.lives,
            platforms,
            enemies,
            exit: Rect::new(data.exit_pos.0, data.exit_pos.1, EXIT_WIDTH, EXIT_HEIGHT),
            baseline_shake: data.shake_intensity.unwrap_or(0).max(0),
            advanced_glitches: data.advanced_glitches,
        }
    }

    /// Advance every enemy and its projectiles one tick.
    pub fn update_enemies(
        &mut self,
        player: &Rect,
        bounds: &Rect,
        physics: &PhysicsConfig,
        enemy_cfg: &EnemyConfig,
        dt: f32,
    ) {
        for enemy in &mut self.enemies {
            enemy.update(&self.platforms, Some(player), bounds, physics, enemy_cfg, dt);
        }
    }

    pub fn exit_reached(&self, player: &Rect) -> bool {
        player.overlaps(&self.exit)
    }

    /// True if the player touches an enemy or projectile this tick.
    ///
    /// Always false while the player is invincible. A projectile that hits is
    /// removed.
    pub fn check_hazard(&mut self, player: &Player, now: Duration) -> bool {
        if player.is_invincible(now) {
            return false;
        }
        let rect = player.body.rect;
        for enemy in &mut self.enemies {
            if rect.overlaps(&enemy.body.rect) {
                return true;
            }
            if let Some(i) = enemy
                .projectiles
                .iter()
                .position(|p| rect.overlaps(&p.rect))
            {
                enemy.projectiles.remove(i);
                return true;
            }
        }
        false
    }

    /// Make every platform solid and opaque again.
    pub fn reset_platforms(&mut self) {
        for platform in &mut self.platforms {
            platform.restore();
        }
    }

    pub fn projectile_count(&self) -> usize {
        self.enemies.iter().map(|e| e.projectiles.len()).sum()
    }
}
