//! Prime Drop game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::DropTuning;
use crate::{clamp_player_x, format_time};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPhase {
    /// Title screen, nothing moves
    Home,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Target reached; result screen is up
    Cleared,
}

/// Where a dropped prime came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimeSource {
    /// One of the small base primes
    Base,
    /// A factor of the value at spawn time
    Factor,
    /// Any prime below the value at spawn time
    Random,
}

/// Whether a catch divided or added (drives colours and sounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Divide,
    Add,
}

/// A falling numbered ball
#[derive(Debug, Clone)]
pub struct PrimeBall {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in px per tick
    pub vel: Vec2,
    pub radius: f32,
    pub prime: u64,
    pub source: PrimeSource,
    /// Phase offset of the sideways swing
    pub swing_phase: f32,
}

impl PrimeBall {
    /// Advance one step: drag, gravity, swing, then move
    pub fn integrate(&mut self, tuning: &DropTuning, swing: f32, ratio: f32) {
        let drag = (1.0 - tuning.air_friction).powf(ratio);
        self.vel *= drag;
        self.vel += Vec2::new(swing, tuning.gravity) * ratio;
        self.pos += self.vel * ratio;
    }

    /// Sideways swing acceleration at the given sim time
    pub fn swing_accel(&self, tuning: &DropTuning, clock_secs: f32) -> f32 {
        (clock_secs * tuning.swing_frequency + self.swing_phase).sin() * tuning.swing_amplitude()
    }
}

/// The player's ball
#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    /// Horizontal velocity in px per tick
    pub vel_x: f32,
    /// Visual and collision scale (pulses above 1.0 after a catch)
    pub scale: f32,
    pulse_elapsed_ms: f32,
    pulse_duration_ms: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: GAME_WIDTH / 2.0,
            vel_x: 0.0,
            scale: 1.0,
            pulse_elapsed_ms: 0.0,
            pulse_duration_ms: 0.0,
        }
    }
}

impl Player {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, PLAYER_Y)
    }

    pub fn radius(&self) -> f32 {
        PLAYER_RADIUS * self.scale
    }

    /// Ease velocity toward `target_vel`, then move and clamp to the band
    pub fn steer(&mut self, target_vel: f32, tuning: &DropTuning, ratio: f32) {
        let accel = tuning.player_max_speed * tuning.player_accel;
        let decel = tuning.player_max_speed * tuning.player_decel;

        if target_vel != 0.0 {
            let diff = target_vel - self.vel_x;
            let step = diff.signum() * accel * ratio;
            self.vel_x = if step.abs() > diff.abs() {
                target_vel
            } else {
                self.vel_x + step
            };
        } else {
            let step = self.vel_x.signum() * decel * ratio;
            self.vel_x = if step.abs() > self.vel_x.abs() {
                0.0
            } else {
                self.vel_x - step
            };
        }

        self.x = clamp_player_x(self.x + self.vel_x * ratio);
    }

    /// Start a squash pulse
    pub fn trigger_pulse(&mut self) {
        self.pulse_elapsed_ms = 0.0;
        self.pulse_duration_ms = PULSE_MS;
    }

    /// Advance the pulse: grow to `1 + PULSE_SCALE` at the midpoint and back
    pub fn update_pulse(&mut self, dt_ms: f32) {
        if self.pulse_duration_ms <= 0.0 {
            return;
        }
        self.pulse_elapsed_ms += dt_ms;
        let t = (self.pulse_elapsed_ms / self.pulse_duration_ms).min(1.0);
        let eased = if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 };
        self.scale = 1.0 + eased * PULSE_SCALE;
        if t >= 1.0 {
            self.scale = 1.0;
            self.pulse_duration_ms = 0.0;
        }
    }
}

/// Floating "÷p" / "+p" label above the player
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub kind: HitKind,
    pub life_ms: f32,
    pub total_ms: f32,
    pub alpha: f32,
}

/// A sparkle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: HitKind,
    pub life_ms: f32,
    pub total_ms: f32,
    pub alpha: f32,
    pub size: f32,
}

/// Things that happened during a tick, drained by the view layer
#[derive(Debug, Clone, PartialEq)]
pub enum DropEvent {
    Started,
    Paused,
    Resumed,
    Spawned { prime: u64, source: PrimeSource },
    Divided { prime: u64, value: u64 },
    Added { prime: u64, value: u64 },
    Cleared { elapsed_ms: f64 },
    WentHome,
}

/// Complete Prime Drop state
#[derive(Debug, Clone)]
pub struct DropState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: DropTuning,
    pub phase: DropPhase,
    /// The running value the player transforms
    pub value: u64,
    /// Play time, paused time excluded
    pub elapsed_ms: f64,
    /// Sim clock driving the swing, never reset
    pub clock_secs: f32,
    pub spawn_timer_ms: f32,
    pub player: Player,
    /// Falling primes (sorted by id)
    pub primes: Vec<PrimeBall>,
    pub effects: Vec<FloatingText>,
    pub particles: Vec<Particle>,
    /// Remaining shake time (ms)
    pub shake_ms: f32,
    pub events: Vec<DropEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl DropState {
    /// Create a state on the home screen
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, DropTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: DropTuning) -> Self {
        Self {
            seed,
            tuning,
            phase: DropPhase::Home,
            value: 1,
            elapsed_ms: 0.0,
            clock_secs: 0.0,
            spawn_timer_ms: 0.0,
            player: Player::default(),
            primes: Vec::new(),
            effects: Vec::new(),
            particles: Vec::new(),
            shake_ms: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin a fresh run (also used for "try again")
    pub fn start(&mut self) {
        self.phase = DropPhase::Playing;
        self.value = 1;
        self.spawn_timer_ms = 0.0;
        self.elapsed_ms = 0.0;
        self.primes.clear();
        self.effects.clear();
        self.particles.clear();
        self.shake_ms = 0.0;
        self.player.vel_x = 0.0;
        self.events.push(DropEvent::Started);
    }

    /// Pause; only meaningful while playing
    pub fn pause(&mut self) -> bool {
        if self.phase != DropPhase::Playing {
            return false;
        }
        self.phase = DropPhase::Paused;
        self.events.push(DropEvent::Paused);
        true
    }

    /// Resume from pause
    pub fn resume(&mut self) -> bool {
        if self.phase != DropPhase::Paused {
            return false;
        }
        self.phase = DropPhase::Playing;
        self.events.push(DropEvent::Resumed);
        true
    }

    /// Back to the title screen, dropping the run
    pub fn reset_to_home(&mut self) {
        self.phase = DropPhase::Home;
        self.elapsed_ms = 0.0;
        self.primes.clear();
        self.events.push(DropEvent::WentHome);
    }

    pub fn is_running(&self) -> bool {
        self.phase == DropPhase::Playing
    }

    /// Timer text for the HUD
    pub fn timer_text(&self) -> String {
        format_time(self.elapsed_ms)
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<DropEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue a floating label
    pub fn add_effect(&mut self, text: String, pos: Vec2, kind: HitKind) {
        self.effects.push(FloatingText {
            text,
            pos,
            kind,
            life_ms: EFFECT_LIFE_MS,
            total_ms: EFFECT_LIFE_MS,
            alpha: 1.0,
        });
    }

    /// Burst of sparkles at `pos`
    pub fn add_particles(&mut self, pos: Vec2, kind: HitKind) {
        for _ in 0..PARTICLES_PER_HIT {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(0.6..1.6);
            let size = self.rng.random_range(2.0..4.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 0.8),
                kind,
                life_ms: PARTICLE_LIFE_MS,
                total_ms: PARTICLE_LIFE_MS,
                alpha: 1.0,
                size,
            });
        }
    }
}
