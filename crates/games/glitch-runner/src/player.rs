use std::time::Duration;

use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;
use glitch_core::input::{HeldKeys, InputEvent, InputKind, Key};

use crate::config::PhysicsConfig;
use crate::level::Platform;
use crate::physics::{self, Body, Side};

/// Coarse movement state, derived from the player's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    Grounded,
    Airborne,
    WallSliding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub facing_right: bool,
    /// Jumps spent since last touching the ground.
    pub jump_count: u8,
    pub max_jumps: u8,
    /// Jump is held from the press that started the current jump.
    pub jump_held: bool,
    /// Ticks of held-jump lift applied to the current jump.
    pub jump_time: u32,
    pub wall_sliding: bool,
    /// Which side of the player the slid-on wall is.
    pub wall_side: Option<Side>,
    pub invincible: bool,
    pub invincible_until: Duration,
    /// Current gravity. Glitches may flip or restore it.
    pub gravity: f32,
    /// Current walk speed. Glitches may scale or restore it.
    pub speed: f32,
    pub jump_power: f32,
    /// Level top acts as a ceiling (set while gravity is reversed).
    pub ceiling_enabled: bool,
    pub keys: HeldKeys,
}

impl Player {
    pub fn new(cfg: &PhysicsConfig) -> Self {
        Self {
            body: Body::new(Rect::new(0.0, 0.0, cfg.player_width, cfg.player_height)),
            facing_right: true,
            jump_count: 0,
            max_jumps: cfg.max_jumps,
            jump_held: false,
            jump_time: 0,
            wall_sliding: false,
            wall_side: None,
            invincible: false,
            invincible_until: Duration::ZERO,
            gravity: cfg.gravity,
            speed: cfg.player_speed,
            jump_power: cfg.jump_power,
            ceiling_enabled: false,
            keys: HeldKeys::default(),
        }
    }

    /// Place the player at (`x`, `y`) at rest, invincible for `invincibility`.
    ///
    /// Held keys survive a respawn, everything else about the current jump
    /// does not.
    pub fn spawn(&mut self, x: f32, y: f32, now: Duration, invincibility: Duration) {
        self.body.rect.x = x;
        self.body.rect.y = y;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.body.grounded = false;
        self.jump_count = 0;
        self.jump_held = false;
        self.jump_time = 0;
        self.wall_sliding = false;
        self.wall_side = None;
        self.invincible = true;
        self.invincible_until = now + invincibility;
        tracing::debug!(x, y, "Player spawned");
    }

    pub fn mode(&self) -> MovementMode {
        if self.body.grounded {
            MovementMode::Grounded
        } else if self.wall_sliding {
            MovementMode::WallSliding
        } else {
            MovementMode::Airborne
        }
    }

    pub fn is_invincible(&self, now: Duration) -> bool {
        self.invincible && now < self.invincible_until
    }

    fn update_invincibility(&mut self, now: Duration) {
        if self.invincible && now >= self.invincible_until {
            self.invincible = false;
        }
    }

    /// Apply one delivered key event. Returns true if it started a wall jump.
    fn handle_event(&mut self, event: &InputEvent, cfg: &PhysicsConfig) -> bool {
        self.keys.apply(event);
        match (event.kind, event.key) {
            (InputKind::Press, Key::Left) => self.facing_right = false,
            (InputKind::Press, Key::Right) => self.facing_right = true,
            (InputKind::Press, Key::Jump) => return self.press_jump(cfg),
            (InputKind::Release, Key::Jump) => self.jump_held = false,
            _ => {},
        }
        false
    }

    fn press_jump(&mut self, cfg: &PhysicsConfig) -> bool {
        if self.body.grounded {
            self.jump();
            self.jump_count = 1;
        } else if self.wall_sliding {
            self.wall_jump(cfg);
            return true;
        } else if self.jump_count < self.max_jumps {
            self.jump();
            self.jump_count += 1;
        }
        false
    }

    fn jump(&mut self) {
        self.body.vy = -self.jump_power;
        self.body.grounded = false;
        self.wall_sliding = false;
        self.wall_side = None;
        self.jump_held = true;
        self.jump_time = 0;
    }

    /// Kick off the wall, away from it. The jump budget is left untouched.
    fn wall_jump(&mut self, cfg: &PhysicsConfig) {
        let away = match self.wall_side {
            Some(Side::Left) => 1.0,
            Some(Side::Right) => -1.0,
            None if self.facing_right => 1.0,
            None => -1.0,
        };
        self.body.vy = -self.jump_power;
        self.body.vx = cfg.wall_jump_power * away;
        self.facing_right = away > 0.0;
        self.wall_sliding = false;
        self.wall_side = None;
        self.jump_held = true;
        self.jump_time = 0;
    }

    fn detect_wall(&mut self, platforms: &[Platform], cfg: &PhysicsConfig) {
        let probe = self.body.rect.inflate(cfg.wall_probe * 2.0, 0.0);
        for platform in platforms.iter().filter(|p| p.solid) {
            let p = &platform.rect;
            if probe.bottom() <= p.top() || probe.top() >= p.bottom() {
                continue;
            }
            let side = if self.body.vx < 0.0
                && probe.left() <= p.right()
                && probe.right() > p.right()
            {
                Side::Left
            } else if self.body.vx > 0.0
                && probe.right() >= p.left()
                && probe.left() < p.left()
            {
                Side::Right
            } else {
                continue;
            };
            self.start_wall_slide(side);
            return;
        }
        self.wall_sliding = false;
        self.wall_side = None;
    }

    fn start_wall_slide(&mut self, side: Side) {
        self.wall_sliding = true;
        self.wall_side = Some(side);
        // Face away from the wall, ready to kick off.
        self.facing_right = side == Side::Left;
    }
}

/// Advance the player one tick.
///
/// `events` are the key events delivered this tick, after any input-lag
/// buffering. Steps run in a fixed order: key events, walk velocity,
/// held-jump lift, gravity, wall detection, integration, platform
/// resolution, then the level bounds.
pub fn tick_player(
    player: &mut Player,
    events: &[InputEvent],
    platforms: &[Platform],
    bounds: &Rect,
    cfg: &PhysicsConfig,
    now: Duration,
) {
    player.update_invincibility(now);

    let mut wall_jumped = false;
    for event in events {
        wall_jumped |= player.handle_event(event, cfg);
    }

    // A wall jump owns horizontal velocity for the tick it fires.
    if !wall_jumped {
        if player.keys.left {
            player.body.vx = -player.speed;
            player.facing_right = false;
        } else if player.keys.right {
            player.body.vx = player.speed;
            player.facing_right = true;
        } else {
            player.body.vx = 0.0;
        }
    }

    if player.keys.jump
        && player.jump_held
        && player.jump_time < cfg.max_jump_time
        && player.body.vy < 0.0
    {
        player.body.vy -= cfg.jump_hold_lift;
        player.jump_time += 1;
    }

    if player.wall_sliding {
        player.body.vy += player.gravity * 0.5;
        if player.body.vy > cfg.wall_slide_speed {
            player.body.vy = cfg.wall_slide_speed;
        }
    } else {
        player.body.vy += player.gravity;
        if player.body.vy > cfg.max_fall_speed {
            player.body.vy = cfg.max_fall_speed;
        }
    }

    if !player.body.grounded && player.body.vy > 0.0 {
        player.detect_wall(platforms, cfg);
    }

    player.body.integrate();

    let was_grounded = player.body.grounded;
    physics::resolve(&mut player.body, platforms, cfg.collision_tolerance);

    let contact = physics::clamp_to_bounds(&mut player.body, bounds, player.ceiling_enabled);
    if let Some(side) = contact.wall() {
        if player.body.vy > 0.0 && !player.body.grounded {
            player.start_wall_slide(side);
        }
    }

    if player.body.grounded {
        player.wall_sliding = false;
        player.wall_side = None;
        if !was_grounded {
            player.jump_count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn platform(x: f32, y: f32, w: f32, h: f32) -> Platform {
        Platform::new(Rect::new(x, y, w, h))
    }

    /// A player standing on a 200-wide platform whose top is at y=400.
    fn standing() -> (Player, Vec<Platform>) {
        let plats = vec![platform(0.0, 400.0, 200.0, 20.0)];
        let mut p = Player::new(&cfg());
        p.body.rect = Rect::new(50.0, 368.0, 32.0, 32.0);
        tick(&mut p, &plats, &[]);
        assert!(p.body.grounded);
        (p, plats)
    }

    fn tick(p: &mut Player, plats: &[Platform], events: &[InputEvent]) {
        tick_player(p, events, plats, &bounds(), &cfg(), Duration::ZERO);
    }

    #[test]
    fn standing_player_stays_grounded() {
        let (mut p, plats) = standing();
        for _ in 0..30 {
            tick(&mut p, &plats, &[]);
            assert!(p.body.grounded);
            assert_eq!(p.body.rect.bottom(), 400.0);
            assert_eq!(p.mode(), MovementMode::Grounded);
        }
    }

    #[test]
    fn tapped_jump_follows_parabola_back_to_platform() {
        let (mut p, plats) = standing();
        let tap = [
            InputEvent::press(Key::Jump),
            InputEvent::release(Key::Jump),
        ];
        tick(&mut p, &plats, &tap);

        assert!(!p.body.grounded);
        assert_eq!(p.jump_count, 1);
        assert!((p.body.vy - (-15.0 + 0.8)).abs() < 1e-4);

        let mut landed_at = None;
        for n in 2..60 {
            let prev_vy = p.body.vy;
            tick(&mut p, &plats, &[]);
            if p.body.grounded {
                landed_at = Some(n);
                break;
            }
            assert!((p.body.vy - (prev_vy + 0.8)).abs() < 1e-4);
        }

        let n = landed_at.unwrap();
        assert!((36..=38).contains(&n), "landed on tick {n}");
        assert_eq!(p.body.rect.bottom(), 400.0);
        assert_eq!(p.jump_count, 0);
    }

    #[test]
    fn holding_jump_goes_higher_than_tapping() {
        let apex = |hold: bool| {
            let (mut p, plats) = standing();
            let mut events = vec![InputEvent::press(Key::Jump)];
            if !hold {
                events.push(InputEvent::release(Key::Jump));
            }
            tick(&mut p, &plats, &events);
            let mut top = p.body.rect.top();
            for _ in 0..60 {
                tick(&mut p, &plats, &[]);
                top = top.min(p.body.rect.top());
            }
            top
        };
        assert!(apex(true) < apex(false));
    }

    #[test]
    fn held_lift_stops_after_max_jump_time() {
        let (mut p, plats) = standing();
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);
        for _ in 0..30 {
            tick(&mut p, &plats, &[]);
        }
        assert_eq!(p.jump_time, cfg().max_jump_time);
    }

    #[test]
    fn double_jump_then_budget_exhausted() {
        let (mut p, plats) = standing();
        let press = [InputEvent::press(Key::Jump)];
        let release = [InputEvent::release(Key::Jump)];

        tick(&mut p, &plats, &press);
        tick(&mut p, &plats, &release);
        assert_eq!(p.jump_count, 1);

        tick(&mut p, &plats, &press);
        assert_eq!(p.jump_count, 2);
        let vy_after_second = p.body.vy;
        tick(&mut p, &plats, &release);

        tick(&mut p, &plats, &press);
        assert_eq!(p.jump_count, 2);
        // Third press does nothing: only gravity acted.
        assert!(p.body.vy > vy_after_second);
    }

    #[test]
    fn walking_sets_velocity_and_facing() {
        let (mut p, plats) = standing();
        tick(&mut p, &plats, &[InputEvent::press(Key::Left)]);
        assert_eq!(p.body.vx, -5.0);
        assert!(!p.facing_right);

        tick(&mut p, &plats, &[InputEvent::release(Key::Left)]);
        assert_eq!(p.body.vx, 0.0);
    }

    #[test]
    fn speed_field_scales_walk() {
        let (mut p, plats) = standing();
        p.speed = 10.0;
        tick(&mut p, &plats, &[InputEvent::press(Key::Right)]);
        assert_eq!(p.body.vx, 10.0);
    }

    /// Airborne player pressed against a wall on its right.
    fn sliding_on_right_wall() -> (Player, Vec<Platform>) {
        let plats = vec![
            platform(0.0, 550.0, 800.0, 50.0),
            platform(400.0, 100.0, 20.0, 400.0),
        ];
        let mut p = Player::new(&cfg());
        p.body.rect = Rect::new(368.0, 200.0, 32.0, 32.0);
        p.body.vy = 2.0;
        p.jump_count = 1;
        tick(&mut p, &plats, &[InputEvent::press(Key::Right)]);
        (p, plats)
    }

    #[test]
    fn falling_against_wall_slides() {
        let (mut p, plats) = sliding_on_right_wall();
        assert!(p.wall_sliding);
        assert_eq!(p.wall_side, Some(Side::Right));
        assert_eq!(p.mode(), MovementMode::WallSliding);
        for _ in 0..10 {
            tick(&mut p, &plats, &[]);
            assert!(p.body.vy <= cfg().wall_slide_speed);
        }
    }

    #[test]
    fn wall_jump_kicks_away_from_wall() {
        let (mut p, plats) = sliding_on_right_wall();
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);

        assert!(!p.wall_sliding);
        assert_eq!(p.wall_side, None);
        assert!(p.body.vy < 0.0);
        assert_eq!(p.body.vx, -cfg().wall_jump_power);
        assert!(!p.facing_right);
        assert_eq!(p.jump_count, 1);
    }

    #[test]
    fn wall_jump_does_not_refund_spent_jumps() {
        let (mut p, plats) = sliding_on_right_wall();
        p.jump_count = 2;
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);
        assert!(p.body.vy < 0.0);
        assert_eq!(p.jump_count, 2);

        tick(
            &mut p,
            &plats,
            &[InputEvent::release(Key::Jump), InputEvent::release(Key::Right)],
        );
        let vy = p.body.vy;
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);
        assert_eq!(p.jump_count, 2);
        assert!((p.body.vy - (vy + cfg().gravity)).abs() < 1e-4);
    }

    #[test]
    fn wall_jump_keeps_air_jumps_after_walking_off() {
        let (mut p, plats) = sliding_on_right_wall();
        p.jump_count = 0;
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);
        assert_eq!(p.jump_count, 0);

        tick(&mut p, &plats, &[InputEvent::release(Key::Jump)]);
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);
        assert_eq!(p.jump_count, 1);
        let expected = -cfg().jump_power - cfg().jump_hold_lift + cfg().gravity;
        assert!((p.body.vy - expected).abs() < 1e-4);
    }

    #[test]
    fn landing_clears_wall_slide() {
        let (mut p, plats) = sliding_on_right_wall();
        for _ in 0..400 {
            tick(&mut p, &plats, &[]);
            if p.body.grounded {
                break;
            }
        }
        assert!(p.body.grounded);
        assert!(!p.wall_sliding);
        assert_eq!(p.jump_count, 0);
    }

    #[test]
    fn side_boundary_counts_as_wall() {
        let plats = vec![platform(0.0, 550.0, 800.0, 50.0)];
        let mut p = Player::new(&cfg());
        p.body.rect = Rect::new(2.0, 100.0, 32.0, 32.0);
        p.body.vy = 3.0;
        tick(&mut p, &plats, &[InputEvent::press(Key::Left)]);
        assert_eq!(p.body.rect.left(), 0.0);
        assert!(p.wall_sliding);
        assert_eq!(p.wall_side, Some(Side::Left));
        assert!(p.facing_right);
    }

    #[test]
    fn reversed_gravity_pins_player_to_ceiling() {
        let mut p = Player::new(&cfg());
        p.body.rect = Rect::new(100.0, 100.0, 32.0, 32.0);
        p.gravity = -cfg().gravity;
        p.ceiling_enabled = true;
        for _ in 0..60 {
            tick(&mut p, &[], &[]);
        }
        assert_eq!(p.body.rect.top(), 0.0);
    }

    #[test]
    fn invincibility_window() {
        let mut p = Player::new(&cfg());
        p.spawn(10.0, 10.0, Duration::from_secs(1), Duration::from_secs(2));
        assert!(p.is_invincible(Duration::from_secs(1)));
        assert!(p.is_invincible(Duration::from_millis(2_999)));
        assert!(!p.is_invincible(Duration::from_secs(3)));

        tick_player(&mut p, &[], &[], &bounds(), &cfg(), Duration::from_secs(3));
        assert!(!p.invincible);
    }

    #[test]
    fn spawn_resets_motion_but_keeps_held_keys() {
        let (mut p, plats) = standing();
        tick(&mut p, &plats, &[InputEvent::press(Key::Right)]);
        tick(&mut p, &plats, &[InputEvent::press(Key::Jump)]);

        p.spawn(100.0, 200.0, Duration::ZERO, Duration::from_secs(2));

        assert_eq!(p.body.vx, 0.0);
        assert_eq!(p.body.vy, 0.0);
        assert_eq!(p.jump_count, 0);
        assert!(!p.jump_held);
        assert!(p.keys.right);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Action {
            Idle,
            Press,
            Release,
            Tap,
        }

        fn action() -> impl Strategy<Value = Action> {
            prop_oneof![
                Just(Action::Idle),
                Just(Action::Press),
                Just(Action::Release),
                Just(Action::Tap),
            ]
        }

        proptest! {
            #[test]
            fn jump_budget_is_never_exceeded(actions in prop::collection::vec(action(), 1..200)) {
                let plats = vec![platform(0.0, 550.0, 800.0, 50.0)];
                let mut p = Player::new(&cfg());
                p.body.rect = Rect::new(100.0, 518.0, 32.0, 32.0);

                for a in actions {
                    let events: Vec<InputEvent> = match a {
                        Action::Idle => vec![],
                        Action::Press => vec![InputEvent::press(Key::Jump)],
                        Action::Release => vec![InputEvent::release(Key::Jump)],
                        Action::Tap => vec![
                            InputEvent::press(Key::Jump),
                            InputEvent::release(Key::Jump),
                        ],
                    };
                    tick(&mut p, &plats, &events);
                    prop_assert!(p.jump_count <= p.max_jumps);
                    if p.body.grounded {
                        prop_assert_eq!(p.jump_count, 0);
                    }
                }
            }

            #[test]
            fn player_stays_inside_side_bounds(
                xs in prop::collection::vec(-1i8..=1, 1..120),
            ) {
                let plats = vec![platform(0.0, 550.0, 800.0, 50.0)];
                let mut p = Player::new(&cfg());
                p.body.rect = Rect::new(10.0, 518.0, 32.0, 32.0);
                for dir in xs {
                    let events = match dir {
                        -1 => vec![InputEvent::release(Key::Right), InputEvent::press(Key::Left)],
                        1 => vec![InputEvent::release(Key::Left), InputEvent::press(Key::Right)],
                        _ => vec![InputEvent::release(Key::Left), InputEvent::release(Key::Right)],
                    };
                    tick(&mut p, &plats, &events);
                    prop_assert!(p.body.rect.left() >= 0.0);
                    prop_assert!(p.body.rect.right() <= 800.0);
                    prop_assert!(p.body.rect.bottom() <= 600.0);
                }
            }
        }
    }
}
