use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;

use crate::config::{EnemyConfig, PhysicsConfig};
use crate::level::{EnemySpawn, Platform};
use crate::physics::{self, Body};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Walks back and forth inside its patrol range.
    Basic,
    /// Patrols and hops at a fixed interval while on the ground.
    Jumper,
    /// Patrols and fires at the player when roughly level with them.
    Shooter,
}

/// A horizontal shot fired by a shooter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub rect: Rect,
    pub speed: f32,
    /// +1.0 moves right, -1.0 moves left.
    pub direction: f32,
}

impl Projectile {
    /// A projectile centred on (`cx`, `cy`).
    pub fn new(cx: f32, cy: f32, direction: f32, cfg: &EnemyConfig) -> Self {
        let w = cfg.projectile_width;
        let h = cfg.projectile_height;
        Self {
            rect: Rect::new(cx - w / 2.0, cy - h / 2.0, w, h),
            speed: cfg.projectile_speed,
            direction,
        }
    }

    pub fn advance(&mut self) {
        self.rect.x += self.speed * self.direction;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub direction: f32,
    pub patrol_origin: f32,
    pub patrol_radius: f32,
    pub jump_timer: f32,
    pub shoot_timer: f32,
    pub projectiles: Vec<Projectile>,
}

impl Enemy {
    pub fn new(spawn: &EnemySpawn, cfg: &EnemyConfig) -> Self {
        let mut body = Body::new(Rect::new(spawn.x, spawn.y, cfg.width, cfg.height));
        body.vx = cfg.speed;
        Self {
            body,
            kind: spawn.kind,
            direction: 1.0,
            patrol_origin: spawn.x,
            patrol_radius: spawn.patrol_radius,
            jump_timer: 0.0,
            shoot_timer: 0.0,
            projectiles: Vec::new(),
        }
    }

    /// Advance one tick.
    ///
    /// Enemies always fall with the baseline gravity in `physics`; glitches
    /// that alter the player's gravity do not reach them.
    pub fn update(
        &mut self,
        platforms: &[Platform],
        player: Option<&Rect>,
        bounds: &Rect,
        physics: &PhysicsConfig,
        cfg: &EnemyConfig,
        dt: f32,
    ) {
        self.body.vy = (self.body.vy + physics.gravity).min(physics.max_fall_speed);
        self.body.vx = cfg.speed * self.direction;
        self.body.integrate();

        let res = physics::resolve(&mut self.body, platforms, physics.collision_tolerance);
        if res.side_hit.is_some() {
            self.direction = -self.direction;
        }
        let contact = physics::clamp_to_bounds(&mut self.body, bounds, false);
        if contact.left {
            self.direction = 1.0;
        } else if contact.right {
            self.direction = -1.0;
        }

        self.patrol();

        match self.kind {
            EnemyKind::Basic => {},
            EnemyKind::Jumper => self.update_jump(physics, cfg, dt),
            EnemyKind::Shooter => {
                if let Some(player) = player {
                    self.update_shooting(player, cfg, dt);
                }
            },
        }

        for p in &mut self.projectiles {
            p.advance();
        }
        self.projectiles.retain(|p| !p.rect.is_outside(bounds));
    }

    fn patrol(&mut self) {
        let x = self.body.rect.x;
        if x > self.patrol_origin + self.patrol_radius {
            self.direction = -1.0;
        } else if x < self.patrol_origin - self.patrol_radius {
            self.direction = 1.0;
        }
    }

    fn update_jump(&mut self, physics: &PhysicsConfig, cfg: &EnemyConfig, dt: f32) {
        if !self.body.grounded {
            return;
        }
        self.jump_timer += dt;
        if self.jump_timer >= cfg.jump_interval_secs {
            self.body.vy = -physics.jump_power * cfg.jump_scale;
            self.body.grounded = false;
            self.jump_timer = 0.0;
        }
    }

    fn update_shooting(&mut self, player: &Rect, cfg: &EnemyConfig, dt: f32) {
        self.shoot_timer += dt;
        if self.shoot_timer < cfg.shoot_interval_secs {
            return;
        }
        if (player.y - self.body.rect.y).abs() < cfg.shoot_range {
            let (cx, cy) = self.body.rect.center();
            let direction = if player.x > self.body.rect.x { 1.0 } else { -1.0 };
            self.projectiles.push(Projectile::new(cx, cy, direction, cfg));
            self.shoot_timer = 0.0;
            tracing::debug!(x = cx, y = cy, direction, "Shooter fired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn floor() -> Vec<Platform> {
        vec![Platform::new(Rect::new(0.0, 550.0, 800.0, 50.0))]
    }

    fn enemy(kind: EnemyKind, x: f32, radius: f32) -> Enemy {
        let spawn = EnemySpawn {
            x,
            y: 510.0,
            patrol_radius: radius,
            kind,
        };
        Enemy::new(&spawn, &EnemyConfig::default())
    }

    fn step(e: &mut Enemy, platforms: &[Platform], player: Option<&Rect>) {
        e.update(
            platforms,
            player,
            &bounds(),
            &PhysicsConfig::default(),
            &EnemyConfig::default(),
            DT,
        );
    }

    #[test]
    fn patrol_stays_near_range() {
        let plats = floor();
        let mut e = enemy(EnemyKind::Basic, 300.0, 150.0);
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for _ in 0..600 {
            step(&mut e, &plats, None);
            min_x = min_x.min(e.body.rect.x);
            max_x = max_x.max(e.body.rect.x);
        }
        assert!(max_x > 440.0 && max_x <= 452.0 + 2.0, "max_x = {max_x}");
        assert!(min_x < 160.0 && min_x >= 148.0 - 2.0, "min_x = {min_x}");
    }

    #[test]
    fn enemy_rests_on_floor() {
        let plats = floor();
        let mut e = enemy(EnemyKind::Basic, 300.0, 150.0);
        for _ in 0..10 {
            step(&mut e, &plats, None);
        }
        assert!(e.body.grounded);
        assert_eq!(e.body.rect.bottom(), 550.0);
    }

    #[test]
    fn wall_reverses_direction() {
        let mut plats = floor();
        plats.push(Platform::new(Rect::new(350.0, 400.0, 20.0, 150.0)));
        let mut e = enemy(EnemyKind::Basic, 300.0, 500.0);
        for _ in 0..30 {
            step(&mut e, &plats, None);
        }
        assert_eq!(e.direction, -1.0);
        assert!(e.body.rect.right() <= 350.0);
    }

    #[test]
    fn jumper_hops_after_interval_on_ground() {
        let plats = floor();
        let mut e = enemy(EnemyKind::Jumper, 300.0, 150.0);
        let mut first_jump = None;
        for tick in 0..200 {
            step(&mut e, &plats, None);
            if e.body.vy < 0.0 {
                first_jump = Some(tick);
                break;
            }
        }
        // Jump velocity is 0.7 of the player's jump power.
        assert!((e.body.vy + 10.5).abs() < 1e-4);
        let tick = first_jump.unwrap();
        assert!((115..=125).contains(&tick), "jumped at tick {tick}");
    }

    #[test]
    fn shooter_fires_toward_player_in_range() {
        let plats = floor();
        let mut e = enemy(EnemyKind::Shooter, 300.0, 0.0);
        let player = Rect::new(100.0, 500.0, 32.0, 32.0);
        for _ in 0..181 {
            step(&mut e, &plats, Some(&player));
        }
        assert_eq!(e.projectiles.len(), 1);
        assert_eq!(e.projectiles[0].direction, -1.0);
        assert!(e.shoot_timer < 0.05);
    }

    #[test]
    fn shooter_holds_fire_when_player_out_of_range() {
        let plats = floor();
        let mut e = enemy(EnemyKind::Shooter, 300.0, 0.0);
        let player = Rect::new(100.0, 100.0, 32.0, 32.0);
        for _ in 0..400 {
            step(&mut e, &plats, Some(&player));
        }
        assert!(e.projectiles.is_empty());
        assert!(e.shoot_timer >= 3.0);
    }

    #[test]
    fn projectiles_retire_off_screen() {
        let plats = floor();
        let cfg = EnemyConfig::default();
        let mut e = enemy(EnemyKind::Basic, 300.0, 150.0);
        e.projectiles.push(Projectile::new(790.0, 300.0, 1.0, &cfg));
        e.projectiles.push(Projectile::new(400.0, 300.0, -1.0, &cfg));
        for _ in 0..3 {
            step(&mut e, &plats, None);
        }
        assert_eq!(e.projectiles.len(), 1);
        assert_eq!(e.projectiles[0].direction, -1.0);
    }
}
