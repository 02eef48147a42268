//! The engine — everything that happens on one animation tick.
//!
//! `Engine` owns the particle field, both targets, the per-particle render
//! attributes, the firework arena, snowfall, scheduler and clock.  The
//! perception side only ever calls [`Engine::post`]; the render loop calls
//! [`Engine::tick`] and then reads the buffers.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, info};

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::dispatch::Gesture;
use crate::error::ConfigError;
use crate::firework::{BurstArena, FireworkBurst, LAYERS};
use crate::mailbox::GestureMailbox;
use crate::physics::{Forces, ParticleField, PINCH_THRESHOLD};
use crate::schedule::Scheduler;
use crate::shape::Targets;
use crate::snow::Snowfall;
use crate::theme::ColorTheme;

const SIZE_MIN:  f32 = 0.4;
const SIZE_MAX:  f32 = 1.0;
const ALPHA_MIN: f32 = 0.6;
const ALPHA_MAX: f32 = 1.0;

/// How far the palm can tilt the tree about the x axis, in radians.
const PALM_TILT: f32 = 0.6;

// ════════════════════════════════════════════════════════════════════════════
// GestureState
// ════════════════════════════════════════════════════════════════════════════

/// The continuous gesture state the physics reads each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureState {
    /// Always in `[0, 1]`.
    pub pinch_strength: f32,
    pub is_pinching:    bool,
    pub palm:           Vec2,
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState { pinch_strength: 0.0, is_pinching: false, palm: Vec2::splat(0.5) }
    }
}

impl GestureState {
    /// Fold one continuous gesture in.  `None` relaxes the pinch by `decay`.
    pub fn apply(&mut self, gesture: Gesture, decay: f32) {
        match gesture {
            Gesture::Pinch { strength, palm } => {
                self.pinch_strength = strength.clamp(0.0, 1.0);
                self.is_pinching    = true;
                self.palm           = palm;
            }
            Gesture::None => {
                self.pinch_strength = (self.pinch_strength - decay).max(0.0);
                self.is_pinching    = false;
            }
            _ => {}
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scheduled actions
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    SpawnBurstLayer { origin: Vec3, layer: usize, base_hue: f32 },
    StopSnow { generation: u64 },
}

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    config:  EngineConfig,
    targets: Targets,
    field:   ParticleField,

    colors:       Vec<f32>,
    sizes:        Vec<f32>,
    alphas:       Vec<f32>,
    colors_dirty: bool,
    theme:        ColorTheme,

    gesture:   GestureState,
    mailbox:   GestureMailbox,
    bursts:    BurstArena,
    snow:      Snowfall,
    scheduler: Scheduler<Action>,
    clock:     SimClock,
    rotation:  Vec2,

    rng:     Box<dyn RngCore + Send>,
    running: bool,
}

impl Engine {
    /// Build an engine seeded from OS entropy.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build an engine with a fixed seed.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Build an engine drawing all randomness from `rng`.
    pub fn with_rng<R: RngCore + Send + 'static>(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng: Box<dyn RngCore + Send> = Box::new(rng);
        let n = config.particle_count;

        let targets = Targets::generate(&config, &mut *rng);
        let field = ParticleField::new(targets.exploded());

        let theme = ColorTheme::default();
        let mut colors = vec![0.0; 3 * n];
        theme.fill(&mut colors, &mut *rng);
        let sizes:  Vec<f32> = (0..n).map(|_| rng.gen_range(SIZE_MIN..SIZE_MAX)).collect();
        let alphas: Vec<f32> = (0..n).map(|_| rng.gen_range(ALPHA_MIN..ALPHA_MAX)).collect();

        info!(particles = n, "engine ready");

        Ok(Engine {
            config,
            targets,
            field,
            colors,
            sizes,
            alphas,
            colors_dirty: true,
            theme,
            gesture:   GestureState::default(),
            mailbox:   GestureMailbox::new(),
            bursts:    BurstArena::new(),
            snow:      Snowfall::new(),
            scheduler: Scheduler::new(),
            clock:     SimClock::default(),
            rotation:  Vec2::ZERO,
            rng,
            running:   true,
        })
    }

    // ── perception side ──────────────────────────────────────────────────

    /// Hand a gesture to the next tick.
    pub fn post(&mut self, gesture: Gesture) {
        if self.running {
            self.mailbox.post(gesture);
        }
    }

    pub fn post_all<I: IntoIterator<Item = Gesture>>(&mut self, gestures: I) {
        for g in gestures { self.post(g); }
    }

    // ── tick ─────────────────────────────────────────────────────────────

    /// Advance the whole simulation by one fixed step.
    ///
    /// Returns false (and does nothing) once the engine has been shut down.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let inbox = self.mailbox.take();
        if let Some(g) = inbox.continuous {
            self.gesture.apply(g, self.config.pinch_decay);
        }
        for trigger in inbox.triggers {
            self.handle_trigger(trigger);
        }

        let now = self.clock.elapsed();
        for action in self.scheduler.drain_due(now) {
            self.run_action(action);
        }

        let forces = Forces {
            gravity_strength:   self.config.gravity_strength,
            explosion_strength: self.config.explosion_strength,
            damping:            self.config.damping,
            brown_motion:       self.config.brown_motion,
        };
        self.field.step(&self.targets, &forces, self.gesture.pinch_strength, &mut *self.rng);

        self.bursts.step(
            self.config.firework_gravity,
            self.config.firework_air_resistance,
            self.clock.dt(),
        );
        self.snow.step(now as f32);
        self.step_rotation();

        self.clock.advance();
        true
    }

    fn handle_trigger(&mut self, trigger: Gesture) {
        match trigger {
            Gesture::OneFinger => self.cycle_theme(),
            Gesture::TwoFingers => {
                let generation = self.snow.start(self.config.snow_count, &mut *self.rng);
                self.scheduler.schedule_in(
                    self.clock.elapsed(),
                    self.config.snow_duration,
                    Action::StopSnow { generation },
                );
                info!(generation, "snow started");
            }
            Gesture::ThreeFingers => self.launch_fireworks(),
            Gesture::Pinch { .. } | Gesture::None => {}
        }
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::SpawnBurstLayer { origin, layer, base_hue } => {
                let burst = FireworkBurst::spawn(origin, layer, base_hue, &mut *self.rng);
                debug!(layer, sparks = burst.len(), "burst layer spawned");
                self.bursts.insert(burst);
            }
            Action::StopSnow { generation } => {
                if self.snow.stop_if_current(generation) {
                    info!(generation, "snow stopped");
                }
            }
        }
    }

    /// Recolor every particle from the next theme.  Positions are untouched.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.theme.fill(&mut self.colors, &mut *self.rng);
        self.colors_dirty = true;
        info!(theme = self.theme.name(), "theme changed");
    }

    /// Schedule the three staggered burst layers around a random origin
    /// above the tree.
    pub fn launch_fireworks(&mut self) {
        let half_h = self.config.tree_height * 0.5;
        let origin = Vec3::new(
            self.rng.gen_range(-15.0..15.0),
            self.rng.gen_range(half_h * 0.6..half_h * 1.4),
            self.rng.gen_range(-10.0..10.0),
        );
        let base_hue: f32 = self.rng.gen();
        let now = self.clock.elapsed();
        for (layer, burst_layer) in LAYERS.iter().enumerate() {
            self.scheduler.schedule_in(now, burst_layer.delay, Action::SpawnBurstLayer { origin, layer, base_hue });
        }
        info!(?origin, base_hue, "fireworks launched");
    }

    fn step_rotation(&mut self) {
        self.rotation.y += self.config.rotation_speed_y;
        let tilt = if self.gesture.is_pinching {
            (self.gesture.palm.y - 0.5) * PALM_TILT
        } else {
            0.0
        };
        self.rotation.x += (tilt - self.rotation.x) * self.config.rotation_speed_x;
    }

    // ── teardown ─────────────────────────────────────────────────────────

    /// Release every buffer and stop ticking.  Safe to call more than once.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.field.release();
        self.colors = Vec::new();
        self.sizes  = Vec::new();
        self.alphas = Vec::new();
        self.colors_dirty = false;
        self.bursts.clear();
        self.snow.release();
        self.scheduler.clear();
        self.mailbox.take();
        info!(frames = self.clock.frame(), "engine shut down");
    }

    // ── render-side accessors ────────────────────────────────────────────

    pub fn is_running(&self)  -> bool { self.running }
    pub fn positions(&self)   -> &[f32] { self.field.positions() }
    pub fn velocities(&self)  -> &[f32] { self.field.velocities() }
    pub fn colors(&self)      -> &[f32] { &self.colors }
    pub fn sizes(&self)       -> &[f32] { &self.sizes }
    pub fn alphas(&self)      -> &[f32] { &self.alphas }
    pub fn targets(&self)     -> &Targets { &self.targets }
    pub fn bursts(&self)      -> &BurstArena { &self.bursts }
    pub fn snow(&self)        -> &Snowfall { &self.snow }
    pub fn rotation(&self)    -> Vec2 { self.rotation }
    pub fn theme(&self)       -> ColorTheme { self.theme }
    pub fn gesture_state(&self) -> &GestureState { &self.gesture }
    pub fn clock(&self)       -> &SimClock { &self.clock }
    pub fn config(&self)      -> &EngineConfig { &self.config }
    pub fn pending_actions(&self) -> usize { self.scheduler.len() }

    /// Whether the tree is the active target.
    pub fn is_assembling(&self) -> bool { self.gesture.pinch_strength > PINCH_THRESHOLD }

    /// `(positions_dirty, colors_dirty)`, clearing both.
    pub fn take_dirty(&mut self) -> (bool, bool) {
        (self.field.take_dirty(), std::mem::replace(&mut self.colors_dirty, false))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIXED_DT;

    fn engine(n: usize) -> Engine {
        let cfg = EngineConfig {
            particle_count: n,
            snow_count: 100,
            ..EngineConfig::default()
        };
        Engine::with_seed(cfg, 7).unwrap()
    }

    fn pinch(strength: f32) -> Gesture {
        Gesture::Pinch { strength, palm: Vec2::new(0.5, 0.5) }
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = EngineConfig { particle_count: 0, ..EngineConfig::default() };
        assert!(matches!(Engine::with_seed(cfg, 0), Err(ConfigError::NoParticles)));
    }

    #[test]
    fn rejects_nan_tree_height() {
        // Would otherwise reach an empty sampling range on the first firework.
        let cfg = EngineConfig { tree_height: f32::NAN, ..EngineConfig::default() };
        assert!(matches!(Engine::with_seed(cfg, 0), Err(ConfigError::TreeShape { .. })));
    }

    #[test]
    fn render_buffers_are_sized() {
        let e = engine(500);
        assert_eq!(e.positions().len(), 1500);
        assert_eq!(e.colors().len(), 1500);
        assert_eq!(e.sizes().len(), 500);
        assert_eq!(e.alphas().len(), 500);
        assert!(e.sizes().iter().all(|s| (SIZE_MIN..SIZE_MAX).contains(s)));
        assert!(e.alphas().iter().all(|a| (ALPHA_MIN..ALPHA_MAX).contains(a)));
    }

    #[test]
    fn starts_on_exploded_target() {
        let e = engine(50);
        assert_eq!(e.positions(), e.targets().exploded());
    }

    #[test]
    fn pinch_assembles_and_release_relaxes() {
        let mut e = engine(50);
        e.post(pinch(1.0));
        e.tick();
        assert!(e.is_assembling());
        assert_eq!(e.gesture_state().pinch_strength, 1.0);

        // Continuous state persists between perception frames.
        for _ in 0..10 { e.tick(); }
        assert_eq!(e.gesture_state().pinch_strength, 1.0);

        // Each "no gesture" observation relaxes the pinch a step.
        let decay = e.config().pinch_decay;
        e.post(Gesture::None);
        e.tick();
        assert!((e.gesture_state().pinch_strength - (1.0 - decay)).abs() < 1e-6);
        assert!(!e.gesture_state().is_pinching);
        for _ in 0..40 {
            e.post(Gesture::None);
            e.tick();
        }
        assert_eq!(e.gesture_state().pinch_strength, 0.0);
        assert!(!e.is_assembling());
    }

    #[test]
    fn pinch_strength_is_clamped() {
        let mut s = GestureState::default();
        s.apply(pinch(1.7), 0.05);
        assert_eq!(s.pinch_strength, 1.0);
        s.apply(Gesture::None, 5.0);
        assert_eq!(s.pinch_strength, 0.0);
    }

    #[test]
    fn one_finger_recolors_without_moving() {
        let mut e = engine(200);
        let before_pos = e.positions().to_vec();
        let before_col = e.colors().to_vec();
        // Inspect the trigger in isolation from the physics step.
        e.handle_trigger(Gesture::OneFinger);
        assert_eq!(e.theme(), ColorTheme::Frost);
        assert_ne!(e.colors(), &before_col[..]);
        assert_eq!(e.positions(), &before_pos[..]);
        e.post(Gesture::OneFinger);
        e.tick();
        assert_eq!(e.theme(), ColorTheme::Ember);
    }

    #[test]
    fn three_fingers_staggers_layers() {
        let mut e = engine(20);
        e.post(Gesture::ThreeFingers);
        e.tick();
        assert_eq!(e.bursts().len(), 1);
        let mut seen = vec![1];
        for _ in 0..20 {
            e.tick();
            seen.push(e.bursts().len());
        }
        assert_eq!(*seen.last().unwrap(), 3);
        // Layer 1 arrives ~0.1 s after layer 0, layer 2 another 0.1 s later.
        let first_two   = seen.iter().position(|&n| n == 2).unwrap();
        let first_three = seen.iter().position(|&n| n == 3).unwrap();
        assert!((5..=7).contains(&first_two), "{:?}", seen);
        assert!((11..=13).contains(&first_three), "{:?}", seen);
        let layers: Vec<usize> = e.bursts().iter().map(|b| b.layer_index).collect();
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn bursts_expire_after_lifetime() {
        let mut e = engine(20);
        e.post(Gesture::ThreeFingers);
        let ticks = ((3.2 + 0.2) / FIXED_DT) as usize;
        for _ in 0..ticks { e.tick(); }
        assert!(e.bursts().is_empty());
        assert_eq!(e.pending_actions(), 0);
    }

    #[test]
    fn snow_stops_on_schedule_and_extends() {
        let mut e = engine(20);
        e.post(Gesture::TwoFingers);
        e.tick();
        assert!(e.snow().is_active());
        assert_eq!(e.snow().len(), 100);

        // Re-trigger halfway: the first stop is stale.
        let half = (e.config().snow_duration / 2.0 / FIXED_DT) as usize;
        for _ in 0..half { e.tick(); }
        e.post(Gesture::TwoFingers);
        for _ in 0..half + 5 { e.tick(); }
        assert!(e.snow().is_active());

        for _ in 0..half { e.tick(); }
        assert!(!e.snow().is_active());
    }

    #[test]
    fn rotation_spins_and_tilts_with_palm() {
        let mut e = engine(20);
        e.post(Gesture::Pinch { strength: 1.0, palm: Vec2::new(0.5, 1.0) });
        for _ in 0..200 { e.tick(); }
        let r = e.rotation();
        assert!(r.y > 0.0);
        assert!((r.x - 0.5 * PALM_TILT).abs() < 0.01);
    }

    #[test]
    fn seeded_engines_agree() {
        let mut a = engine(100);
        let mut b = engine(100);
        for _ in 0..50 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn dirty_flags_clear_on_take() {
        let mut e = engine(10);
        assert_eq!(e.take_dirty(), (true, true));
        assert_eq!(e.take_dirty(), (false, false));
        e.tick();
        assert_eq!(e.take_dirty(), (true, false));
        e.cycle_theme();
        assert_eq!(e.take_dirty(), (false, true));
    }

    #[test]
    fn shutdown_is_idempotent_and_final() {
        let mut e = engine(100);
        e.post(Gesture::ThreeFingers);
        e.tick();
        e.shutdown();
        e.shutdown();
        assert!(!e.is_running());
        assert!(e.positions().is_empty());
        assert!(e.colors().is_empty());
        assert!(e.bursts().is_empty());
        let frame = e.clock().frame();
        e.post(pinch(1.0));
        assert!(!e.tick());
        assert_eq!(e.clock().frame(), frame);
        assert_eq!(e.gesture_state().pinch_strength, 0.0);
    }
}
