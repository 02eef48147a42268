//! Software-rendered visualizer using `minifb`.
//!
//! Stands in for a GPU renderer: it reads the engine's buffers once per
//! frame, projects them through a simple perspective camera and splats each
//! particle additively so dense regions glow.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                      *                       │
//! │                     ***        ·  fireworks  │
//! │          snow  ·   *****                     │
//! │                   *******                    │
//! │                  *********                   │
//! │ status bar                                   │
//! │ key legend                                   │
//! └──────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use glam::{Mat3, Vec2, Vec3};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use sculpt_core::{Engine, HandPose};
use tracing::warn;

use crate::perception::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 720;
const STATUS_H:      usize = 44;
const STATUS_Y:      usize = WIN_H - STATUS_H;
const BG_COLOR:      u32   = 0xFF070A14;
const STATUS_BG:     u32   = 0xFF0F1830;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const LEGEND_COLOR:  u32   = 0xFF8890A0;
const FONT_SCALE:    usize = 2;

// Camera
const CAMERA_DIST:   f32 = 80.0;
const NEAR:          f32 = 5.0;
const FOCAL:         f32 = WIN_H as f32 * 0.9;
const SPLAT_SCALE:   f32 = 0.12;
const SNOW_COLOR:    Vec3 = Vec3::new(0.8, 0.85, 0.9);

/// Held keys → simulated hand pose, first match wins.
const POSE_KEYS: [(Key, HandPose); 6] = [
    (Key::F,    HandPose::Fist),
    (Key::G,    HandPose::Grip),
    (Key::Key1, HandPose::OneFinger),
    (Key::Key2, HandPose::TwoFingers),
    (Key::Key3, HandPose::ThreeFingers),
    (Key::O,    HandPose::Open),
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    buf:       Vec<u32>,
    sim_tx:    Sender<SimInput>,
    last_pose: Option<HandPose>,
    last_palm: Vec2,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Gesture Tree — fist to assemble, 1/2/3 fingers for effects",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            last_pose: None,
            last_palm: Vec2::splat(-1.0),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse and forward changes as `SimInput`.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }

        let pose = POSE_KEYS.iter()
            .find(|(k, _)| self.window.is_key_down(*k))
            .map(|(_, p)| *p);
        if pose != self.last_pose {
            self.last_pose = pose;
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let palm = Vec2::new(mx / WIN_W as f32, my / WIN_H as f32);
            if palm.distance_squared(self.last_palm) > 1e-6 {
                self.last_palm = palm;
                let _ = self.sim_tx.send(SimInput::Palm(palm));
            }
        }

        true
    }

    /// Render one frame from the engine's current buffers.
    pub fn render(&mut self, engine: &mut Engine, status: &str) {
        engine.take_dirty();

        self.buf.fill(BG_COLOR);

        let r = engine.rotation();
        let view = Mat3::from_rotation_x(r.x) * Mat3::from_rotation_y(r.y);

        // ── Sculpture ─────────────────────────────────────────────────────
        for (i, (p, c)) in engine.positions().chunks_exact(3)
            .zip(engine.colors().chunks_exact(3))
            .enumerate()
        {
            let alpha = engine.alphas()[i];
            let size  = engine.sizes()[i];
            self.splat(view * Vec3::from_slice(p), Vec3::from_slice(c) * alpha, size);
        }

        // ── Fireworks ─────────────────────────────────────────────────────
        for burst in engine.bursts().iter() {
            let opacity = burst.opacity();
            let size = burst.size();
            for (p, c) in burst.positions.chunks_exact(3).zip(burst.colors.chunks_exact(3)) {
                self.splat(view * Vec3::from_slice(p), Vec3::from_slice(c) * opacity, size);
            }
        }

        // ── Snow (world-fixed, unrotated) ─────────────────────────────────
        for p in engine.snow().positions().chunks_exact(3) {
            self.splat(Vec3::from_slice(p), SNOW_COLOR, 0.5);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, STATUS_BG);
        self.draw_text(status, 10, STATUS_Y + 8, TEXT_COLOR);
        self.draw_text(
            "F=fist  G=grip  1/2/3=fingers  O=open  mouse=palm  Q=quit",
            10, STATUS_Y + 26, LEGEND_COLOR,
        );

        if let Err(e) = self.window.update_with_buffer(&self.buf, WIN_W, WIN_H) {
            warn!(error = %e, "frame not presented");
        }
    }

    // ── Projection & splatting ────────────────────────────────────────────

    /// Additively draw one particle at view-space `p`.
    fn splat(&mut self, p: Vec3, rgb: Vec3, size: f32) {
        let depth = CAMERA_DIST - p.z;
        if depth < NEAR { return; }
        let Some((sx, sy, scale)) = project(p, depth) else { return; };

        let radius = (size * scale * SPLAT_SCALE).clamp(0.5, 6.0);
        // Fainter when larger so total brightness stays roughly per-particle.
        let falloff = rgb / (radius * radius).max(1.0);
        let ri = radius.ceil() as isize;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 > radius * radius + 0.5 { continue; }
                self.add_pixel(sx + dx, sy + dy, falloff);
            }
        }
    }

    fn add_pixel(&mut self, x: isize, y: isize, rgb: Vec3) {
        if x < 0 || y < 0 || x as usize >= WIN_W || y as usize >= STATUS_Y { return; }
        let idx = y as usize * WIN_W + x as usize;
        self.buf[idx] = pack_argb(unpack_rgb(self.buf[idx]) + rgb);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            let start = row * WIN_W;
            self.buf[start + x.min(WIN_W)..start + (x + w).min(WIN_W)].fill(color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Tiny bitmap font, 3×5 cells scaled by `FONT_SCALE`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * FONT_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > WIN_W { break; }
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) == 0 { continue; }
                    for s in 0..FONT_SCALE * FONT_SCALE {
                        self.set_pixel(
                            cx + col * FONT_SCALE + s % FONT_SCALE,
                            y + row * FONT_SCALE + s / FONT_SCALE,
                            color,
                        );
                    }
                }
            }
            cx += advance;
        }
    }
}

/// Perspective-project a view-space point.  Returns pixel coords and the
/// world→pixel scale at that depth.
fn project(p: Vec3, depth: f32) -> Option<(isize, isize, f32)> {
    let scale = FOCAL / depth;
    let sx = WIN_W as f32 * 0.5 + p.x * scale;
    let sy = STATUS_Y as f32 * 0.5 - p.y * scale;
    if !sx.is_finite() || !sy.is_finite() { return None; }
    Some((sx as isize, sy as isize, scale))
}

fn unpack_rgb(c: u32) -> Vec3 {
    Vec3::new(
        ((c >> 16) & 0xFF) as f32,
        ((c >>  8) & 0xFF) as f32,
        ( c        & 0xFF) as f32,
    ) / 255.0
}

fn pack_argb(rgb: Vec3) -> u32 {
    let c = (rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    0xFF000000 | ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font (upper-case, digits, a little punctuation)
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' | '—' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' | '…' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        ' ' => [0b000; 5],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
