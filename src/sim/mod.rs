//! Prime Drop simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Contact, circles_overlap, classify};
pub use spawn::{PrimePick, pick_prime_for_drop};
pub use state::{
    DropEvent, DropPhase, DropState, FloatingText, HitKind, Particle, Player, PrimeBall,
    PrimeSource,
};
pub use tick::{TickInput, autopilot_target, catch_prime, tick};
