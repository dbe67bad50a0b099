//! Data-driven game balance for Prime Drop
//!
//! Speeds and accelerations are in px per 60 Hz tick. `sim` converts with
//! `dt * TICK_RATE`.

use serde::{Deserialize, Serialize};

/// Balance numbers for one Prime Drop run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTuning {
    /// Value that ends the run as a clear
    pub target_value: u64,
    /// Milliseconds between spawns
    pub spawn_interval_ms: f32,
    /// Primes dropped most of the time
    pub base_primes: Vec<u64>,
    /// Chance of a base prime
    pub base_chance: f32,
    /// Chance (cumulative with `base_chance`) of a factor of the current value
    pub factor_chance: f32,

    /// Downward acceleration on falling primes (px/tick²)
    pub gravity: f32,
    /// Velocity fraction lost to air drag each tick
    pub air_friction: f32,
    /// Multiplier on the initial fall speed and the swing force
    pub drop_speed_scale: f32,
    /// Peak sideways swing acceleration before `drop_speed_scale` (px/tick²)
    pub swing_accel: f32,
    /// Swing angular frequency (rad/s)
    pub swing_frequency: f32,
    /// Max random sideways launch speed (px/tick)
    pub spawn_spread_vx: f32,

    /// Player top speed (px/tick)
    pub player_max_speed: f32,
    /// Fraction of max speed gained per tick
    pub player_accel: f32,
    /// Fraction of max speed shed per tick when no input is held
    pub player_decel: f32,
    /// Pointer steering gain (velocity per px of distance)
    pub pointer_gain: f32,
}

impl Default for DropTuning {
    fn default() -> Self {
        Self {
            target_value: 1000,
            spawn_interval_ms: 1600.0,
            base_primes: vec![2, 3, 5, 7],
            base_chance: 0.8,
            factor_chance: 0.9,

            gravity: 0.1 * 0.001 * 16.67 * 16.67,
            air_friction: 0.01,
            drop_speed_scale: 0.1,
            swing_accel: 0.105,
            swing_frequency: 2.4,
            spawn_spread_vx: 0.4,

            player_max_speed: 3.0,
            player_accel: 0.35,
            player_decel: 0.45,
            pointer_gain: 0.08,
        }
    }
}

impl DropTuning {
    /// Initial downward speed of a freshly spawned prime (px/tick)
    pub fn spawn_fall_speed(&self) -> f32 {
        1.2 * self.drop_speed_scale
    }

    /// Swing amplitude after scaling (px/tick²)
    pub fn swing_amplitude(&self) -> f32 {
        self.swing_accel * self.drop_speed_scale
    }
}
