//! Classroom Arcade - two small browser games for the classroom
//!
//! Core modules:
//! - `sim`: Prime Drop deterministic simulation (bodies, spawning, game state)
//! - `primes`: Trial-division prime arithmetic behind Prime Drop
//! - `coin`: Rigged-coin detective game (sessions, codes, remote store)
//! - `renderer`: Scene building and Canvas 2D drawing
//! - `tuning`: Data-driven Prime Drop balance
//! - `settings` / `highscores`: Player prefs and clear times in LocalStorage
//! - `audio`: Web Audio sound effects (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod coin;
pub mod error;
pub mod highscores;
pub mod primes;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CoinError, StoreError};
pub use highscores::ClearTimes;
pub use settings::Settings;
pub use tuning::DropTuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the drop physics is tuned for)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per second; speeds in `tuning` are per tick
    pub const TICK_RATE: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical playfield size (canvas is scaled to fit)
    pub const GAME_WIDTH: f32 = 560.0;
    pub const GAME_HEIGHT: f32 = 900.0;

    /// Ground slab (centre y and height); primes touching it are discarded
    pub const GROUND_Y: f32 = GAME_HEIGHT - 30.0;
    pub const GROUND_HEIGHT: f32 = 60.0;
    pub const GROUND_TOP: f32 = GROUND_Y - GROUND_HEIGHT / 2.0;

    /// Player ball
    pub const PLAYER_RADIUS: f32 = 34.0;
    pub const PLAYER_Y: f32 = GAME_HEIGHT - 110.0;
    /// Closest the player centre gets to either side wall
    pub const PLAYER_MARGIN: f32 = 40.0;

    /// Falling prime balls
    pub const PRIME_RADIUS: f32 = 26.0;
    pub const PRIME_SPAWN_Y: f32 = -40.0;
    /// Primes below this line are removed
    pub const OFFSCREEN_Y: f32 = GAME_HEIGHT + 120.0;

    /// Floating "÷p" / "+p" text
    pub const EFFECT_LIFE_MS: f32 = 800.0;
    pub const EFFECT_RISE: f32 = 0.6;
    /// Hit sparkles
    pub const PARTICLE_LIFE_MS: f32 = 700.0;
    pub const PARTICLES_PER_HIT: usize = 8;
    pub const PARTICLE_GRAVITY: f32 = 0.06;
    /// Player squash-and-stretch on every catch
    pub const PULSE_MS: f32 = 180.0;
    pub const PULSE_SCALE: f32 = 0.12;
    /// Playfield shake after a division
    pub const SHAKE_MS: f32 = 180.0;
}

/// Clamp a player x coordinate to the playable band
#[inline]
pub fn clamp_player_x(x: f32) -> f32 {
    x.clamp(consts::PLAYER_MARGIN, consts::GAME_WIDTH - consts::PLAYER_MARGIN)
}

/// Format elapsed play time as `MM:SS.t`
pub fn format_time(ms: f64) -> String {
    let ms = ms.max(0.0);
    let total_secs = ms / 1000.0;
    let minutes = (total_secs / 60.0).floor() as u64;
    let seconds = (total_secs % 60.0).floor() as u64;
    let tenths = ((ms % 1000.0) / 100.0).floor() as u64;
    format!("{:02}:{:02}.{}", minutes, seconds, tenths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(1_234.0), "00:01.2");
        assert_eq!(format_time(61_999.0), "01:01.9");
        assert_eq!(format_time(600_000.0), "10:00.0");
    }

    #[test]
    fn test_clamp_player_x() {
        assert_eq!(clamp_player_x(0.0), consts::PLAYER_MARGIN);
        assert_eq!(clamp_player_x(280.0), 280.0);
        assert_eq!(
            clamp_player_x(9999.0),
            consts::GAME_WIDTH - consts::PLAYER_MARGIN
        );
    }
}
