//! Contact tests for the drop playfield
//!
//! Every body is a circle and the ground is a full-width slab, so contact
//! is a distance check. Bodies are removed on first contact, which stands in
//! for a "collision start" callback.

use glam::Vec2;

use crate::consts::{GROUND_TOP, OFFSCREEN_Y};

/// Result of testing one falling prime against the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Still falling freely
    None,
    /// Overlaps the player sensor
    Player,
    /// Reached the ground slab
    Ground,
    /// Fell past the bottom of the world
    Offscreen,
}

/// Check whether two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

/// Check if a circle rests on or below the ground top
#[inline]
pub fn touches_ground(pos: Vec2, radius: f32) -> bool {
    pos.y + radius >= GROUND_TOP
}

/// Classify a prime's contact
///
/// Bodies already past the bottom of the world are culled first; otherwise
/// the player wins over the ground.
pub fn classify(prime_pos: Vec2, prime_radius: f32, player_pos: Vec2, player_radius: f32) -> Contact {
    if prime_pos.y > OFFSCREEN_Y {
        Contact::Offscreen
    } else if circles_overlap(prime_pos, prime_radius, player_pos, player_radius) {
        Contact::Player
    } else if touches_ground(prime_pos, prime_radius) {
        Contact::Ground
    } else {
        Contact::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_circles_overlap() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, 10.0, Vec2::new(15.0, 0.0), 10.0));
        assert!(!circles_overlap(a, 10.0, Vec2::new(20.0, 0.0), 10.0));
        assert!(!circles_overlap(a, 10.0, Vec2::new(30.0, 5.0), 10.0));
    }

    #[test]
    fn test_classify_player_before_ground() {
        let player = Vec2::new(280.0, PLAYER_Y);
        // Directly above the player, already overlapping
        let prime = Vec2::new(280.0, PLAYER_Y - 50.0);
        assert_eq!(classify(prime, PRIME_RADIUS, player, PLAYER_RADIUS), Contact::Player);

        // Far to the side, sitting on the ground
        let prime = Vec2::new(60.0, GROUND_TOP - PRIME_RADIUS + 1.0);
        assert_eq!(classify(prime, PRIME_RADIUS, player, PLAYER_RADIUS), Contact::Ground);

        let prime = Vec2::new(60.0, 100.0);
        assert_eq!(classify(prime, PRIME_RADIUS, player, PLAYER_RADIUS), Contact::None);
    }

    #[test]
    fn test_classify_culls_offscreen_first() {
        let player = Vec2::new(280.0, PLAYER_Y);
        let below = Vec2::new(60.0, OFFSCREEN_Y + 1.0);
        assert_eq!(classify(below, PRIME_RADIUS, player, PLAYER_RADIUS), Contact::Offscreen);

        // Just above the cull line it is still a ground contact
        let resting = Vec2::new(60.0, OFFSCREEN_Y - 1.0);
        assert_eq!(classify(resting, PRIME_RADIUS, player, PLAYER_RADIUS), Contact::Ground);
    }
}
