//! Software frame buffer, scene rasteriser and glitch post-processing.
//!
//! Post-processing runs in a fixed order on the finished scene: color
//! overlay, screen shake, pixelation, then the notification banner, which
//! is never distorted.

use std::time::Duration;

use glitch_core::geometry::Rect;

use crate::enemy::EnemyKind;
use crate::glitch::GlitchVisuals;
use crate::level::Level;
use crate::player::Player;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const PLATFORM_COLOR: Rgb = [120, 120, 140];
pub const EXIT_COLOR: Rgb = [0, 220, 90];
pub const PLAYER_COLOR: Rgb = [60, 140, 255];
pub const PROJECTILE_COLOR: Rgb = [255, 230, 0];
pub const DEBUG_COLOR: Rgb = [255, 0, 0];
pub const BANNER_COLOR: Rgb = [255, 0, 255];

/// Alpha of the color-distortion overlay.
pub const OVERLAY_ALPHA: u8 = 50;

fn enemy_color(kind: EnemyKind) -> Rgb {
    match kind {
        EnemyKind::Basic => [220, 40, 40],
        EnemyKind::Jumper => [255, 140, 0],
        EnemyKind::Shooter => [170, 60, 220],
    }
}

/// Blend `src` over `dst` with `alpha` in 0..=255.
#[inline]
pub fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

#[inline]
fn blend(src: Rgb, dst: Rgb, alpha: u8) -> Rgb {
    [
        blend_channel(src[0], dst[0], alpha),
        blend_channel(src[1], dst[1], alpha),
        blend_channel(src[2], dst[2], alpha),
    ]
}

/// RGB frame, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Pixel span covered by `rect`, clipped to the frame.
    fn span(&self, rect: &Rect) -> (u32, u32, u32, u32) {
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        (
            clip(rect.left(), self.width),
            clip(rect.top(), self.height),
            clip(rect.right(), self.width),
            clip(rect.bottom(), self.height),
        )
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Rgb) {
        let (x0, y0, x1, y1) = self.span(rect);
        if x1 <= x0 {
            return;
        }
        for y in y0..y1 {
            let row = self.index(0, y);
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    pub fn blend_rect(&mut self, rect: &Rect, color: Rgb, alpha: u8) {
        let (x0, y0, x1, y1) = self.span(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.index(x, y);
                self.pixels[i] = blend(color, self.pixels[i], alpha);
            }
        }
    }

    /// One-pixel outline.
    pub fn stroke_rect(&mut self, rect: &Rect, color: Rgb) {
        let (x0, y0, x1, y1) = self.span(rect);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        for x in x0..x1 {
            self.set(x, y0, color);
            self.set(x, y1 - 1, color);
        }
        for y in y0..y1 {
            self.set(x0, y, color);
            self.set(x1 - 1, y, color);
        }
    }

    /// Copy `src` onto this frame shifted by (`dx`, `dy`). Pixels shifted in
    /// from outside keep their current value.
    pub fn blit(&mut self, src: &Frame, dx: i32, dy: i32) {
        for y in 0..src.height {
            let ty = y as i64 + dy as i64;
            if ty < 0 || ty >= self.height as i64 {
                continue;
            }
            for x in 0..src.width {
                let tx = x as i64 + dx as i64;
                if tx < 0 || tx >= self.width as i64 {
                    continue;
                }
                let i = self.index(tx as u32, ty as u32);
                self.pixels[i] = src.pixels[src.index(x, y)];
            }
        }
    }
}

/// Everything `draw_scene` reads for one frame.
pub struct Scene<'a> {
    pub level: &'a Level,
    pub player: &'a Player,
    pub visuals: &'a GlitchVisuals,
    pub debug: bool,
    pub now: Duration,
}

/// Rasterise the level and player as flat-colored rects.
///
/// While flicker hides sprites the frame is left black.
pub fn draw_scene(frame: &mut Frame, scene: &Scene<'_>) {
    frame.fill(BLACK);
    if !scene.visuals.visible {
        return;
    }
    let level = scene.level;
    frame.fill(level.background_color);

    for platform in &level.platforms {
        if platform.opacity > 0 {
            frame.blend_rect(&platform.rect, PLATFORM_COLOR, platform.opacity);
        }
    }
    frame.fill_rect(&level.exit, EXIT_COLOR);

    for enemy in &level.enemies {
        frame.fill_rect(&enemy.body.rect, enemy_color(enemy.kind));
        for projectile in &enemy.projectiles {
            frame.fill_rect(&projectile.rect, PROJECTILE_COLOR);
        }
    }

    let player = scene.player;
    let blink_off = player.is_invincible(scene.now) && (scene.now.as_millis() / 100) % 2 == 0;
    if !blink_off {
        frame.fill_rect(&player.body.rect, PLAYER_COLOR);
    }

    if scene.debug {
        frame.stroke_rect(&player.body.rect, DEBUG_COLOR);
        for enemy in &level.enemies {
            frame.stroke_rect(&enemy.body.rect, DEBUG_COLOR);
        }
        for platform in level.platforms.iter().filter(|p| p.solid) {
            frame.stroke_rect(&platform.rect, DEBUG_COLOR);
        }
    }
}

/// Draws the glitch banner onto the final frame.
pub trait NotificationPainter {
    fn paint(&mut self, frame: &mut Frame, text: &str);
}

/// Flat banner bar centred near the top, sized to the text.
#[derive(Debug, Default)]
pub struct BannerPainter;

impl NotificationPainter for BannerPainter {
    fn paint(&mut self, frame: &mut Frame, text: &str) {
        let w = (text.chars().count() as f32 * 10.0 + 20.0).min(frame.width() as f32);
        let x = (frame.width() as f32 - w) / 2.0;
        let bar = Rect::new(x, 40.0, w, 30.0);
        frame.blend_rect(&bar, BLACK, 180);
        frame.stroke_rect(&bar, BANNER_COLOR);
    }
}

/// Applies glitch visuals to a finished scene.
#[derive(Debug)]
pub struct PostProcessor {
    scratch: Frame,
}

impl PostProcessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scratch: Frame::new(width, height),
        }
    }

    pub fn apply(
        &mut self,
        frame: &mut Frame,
        visuals: &GlitchVisuals,
        notification: Option<&str>,
        painter: &mut dyn NotificationPainter,
    ) {
        if visuals.color_shift != [0; 3] {
            color_overlay(frame, visuals.color_shift);
        }
        if visuals.shake_magnitude > 0 {
            self.shake(frame, visuals.shake_offset);
        }
        if visuals.pixel_size > 1 {
            self.pixelate(frame, visuals.pixel_size);
        }
        if let Some(text) = notification {
            painter.paint(frame, text);
        }
    }

    fn shake(&mut self, frame: &mut Frame, (dx, dy): (i32, i32)) {
        self.scratch.clone_from(frame);
        frame.fill(BLACK);
        frame.blit(&self.scratch, dx, dy);
    }

    /// Nearest-neighbour downsample by `block`, then upsample back.
    fn pixelate(&mut self, frame: &mut Frame, block: u32) {
        let (w, h) = (frame.width, frame.height);
        if w == 0 || h == 0 {
            return;
        }
        let sw = (w / block).max(1);
        let sh = (h / block).max(1);

        let small = &mut self.scratch;
        small.width = sw;
        small.height = sh;
        small.pixels.clear();
        for sy in 0..sh {
            for sx in 0..sw {
                small.pixels.push(frame.pixels[frame.index(sx * w / sw, sy * h / sh)]);
            }
        }

        for y in 0..h {
            for x in 0..w {
                let i = frame.index(x, y);
                frame.pixels[i] = small.pixels[small.index(x * sw / w, y * sh / h)];
            }
        }
    }
}

/// Blend a flat overlay of `128 + shift` (clamped per channel) over the frame.
fn color_overlay(frame: &mut Frame, shift: [i16; 3]) {
    let overlay = shift.map(|s| (128 + s).clamp(0, 255) as u8);
    for px in &mut frame.pixels {
        *px = blend(overlay, *px, OVERLAY_ALPHA);
    }
}
