use serde::{Deserialize, Serialize};

use glitch_core::geometry::Rect;

use crate::level::Platform;

/// Position, velocity, and ground contact of a moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
        }
    }

    /// Advance position by one tick of velocity.
    pub fn integrate(&mut self) {
        self.rect.x += self.vx;
        self.rect.y += self.vy;
    }
}

/// Horizontal side of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// What the resolver did to a body this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub grounded: bool,
    pub hit_ceiling: bool,
    /// Side of the body that ran into a platform, if any.
    pub side_hit: Option<Side>,
}

/// Resolve a body that has already moved this tick against solid platforms.
///
/// Each overlapping platform is handled in iteration order. The body's
/// previous edge (current edge minus velocity) picks the axis: landing first,
/// then ceiling, then the sides. `tolerance` lets a body that was slightly
/// inside an edge last tick still resolve on that edge. Later platforms
/// overwrite earlier snaps on the same axis.
pub fn resolve<'a, I>(body: &mut Body, platforms: I, tolerance: f32) -> Resolution
where
    I: IntoIterator<Item = &'a Platform>,
{
    let mut res = Resolution::default();
    body.grounded = false;

    for platform in platforms {
        if !platform.solid || !body.rect.overlaps(&platform.rect) {
            continue;
        }
        let p = &platform.rect;

        if body.vy > 0.0 && body.rect.bottom() - body.vy <= p.top() + tolerance {
            body.rect.set_bottom(p.top());
            body.vy = 0.0;
            body.grounded = true;
            res.grounded = true;
        } else if body.vy < 0.0 && body.rect.top() - body.vy >= p.bottom() - tolerance {
            body.rect.set_top(p.bottom());
            body.vy = 0.0;
            res.hit_ceiling = true;
        } else if body.vx > 0.0 && body.rect.right() - body.vx <= p.left() + tolerance {
            body.rect.set_right(p.left());
            body.vx = 0.0;
            res.side_hit = Some(Side::Right);
        } else if body.vx < 0.0 && body.rect.left() - body.vx >= p.right() - tolerance {
            body.rect.set_left(p.right());
            body.vx = 0.0;
            res.side_hit = Some(Side::Left);
        }
    }

    res
}

/// Which level edges a body was clamped against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsContact {
    pub left: bool,
    pub right: bool,
    pub floor: bool,
    pub ceiling: bool,
}

impl BoundsContact {
    /// Side boundary the body is pressed against, if any.
    pub fn wall(&self) -> Option<Side> {
        if self.left {
            Some(Side::Left)
        } else if self.right {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Clamp a body to the level bounds.
///
/// The bottom edge acts as a floor. The top edge is only enforced when
/// `ceiling_enabled` is set.
pub fn clamp_to_bounds(body: &mut Body, bounds: &Rect, ceiling_enabled: bool) -> BoundsContact {
    let mut contact = BoundsContact::default();

    if body.rect.left() < bounds.left() {
        body.rect.set_left(bounds.left());
        contact.left = true;
    }
    if body.rect.right() > bounds.right() {
        body.rect.set_right(bounds.right());
        contact.right = true;
    }
    if body.rect.bottom() > bounds.bottom() {
        body.rect.set_bottom(bounds.bottom());
        body.vy = 0.0;
        body.grounded = true;
        contact.floor = true;
    }
    if ceiling_enabled && body.rect.top() < bounds.top() {
        body.rect.set_top(bounds.top());
        body.vy = 0.0;
        contact.ceiling = true;
    }

    contact
}
