//! Flatten a `DropState` into draw items
//!
//! Pure and platform independent so it can be tested natively; the canvas
//! backend only walks the list.

use glam::Vec2;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{DropState, HitKind};

/// Fill colours for a candy-style ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub base: &'static str,
    /// Highlight at the gradient centre
    pub light: &'static str,
    pub outline: &'static str,
}

pub const PLAYER_PALETTE: Palette = Palette {
    base: "#ff9aa2",
    light: "#ffe2e6",
    outline: "#ff6f83",
};

pub const PRIME_PALETTE: Palette = Palette {
    base: "#9de7ff",
    light: "#e8f9ff",
    outline: "#5fbfe0",
};

pub const GROUND_COLOR: &str = "#ffe6d8";
pub const LABEL_COLOR: &str = "#2f2a36";
pub const LABEL_STROKE: &str = "#ffffff";
pub const EFFECT_FONT_SIZE: f32 = 18.0;

/// Colour of "÷p" / "+p" labels
pub fn effect_color(kind: HitKind) -> &'static str {
    match kind {
        HitKind::Divide => "#5aa6ff",
        HitKind::Add => "#ff6f61",
    }
}

/// Colour of catch sparkles
pub fn particle_color(kind: HitKind) -> &'static str {
    match kind {
        HitKind::Divide => "#ff5b5b",
        HitKind::Add => "#5ccf7a",
    }
}

/// Number label size for a ball of the given radius
pub fn label_font_size(radius: f32) -> f32 {
    (radius * 0.7).clamp(14.0, 20.0)
}

/// One thing to paint, in paint order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Ground {
        top: f32,
        height: f32,
    },
    Ball {
        center: Vec2,
        radius: f32,
        palette: Palette,
        label: String,
        font_size: f32,
    },
    Text {
        text: String,
        pos: Vec2,
        color: &'static str,
        alpha: f32,
    },
    Dot {
        pos: Vec2,
        size: f32,
        color: &'static str,
        alpha: f32,
    },
}

/// A frame's worth of draw items plus the camera offset
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Shake offset applied to everything
    pub offset: Vec2,
    pub items: Vec<DrawItem>,
}

/// CSS scale that fits the playfield inside a `width` x `height` box
pub fn fit_scale(width: f64, height: f64) -> f64 {
    let scale = (width / GAME_WIDTH as f64).min(height / GAME_HEIGHT as f64);
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// Horizontal wobble that fades out over the shake window
pub fn shake_offset(shake_ms: f32) -> Vec2 {
    if shake_ms <= 0.0 {
        return Vec2::ZERO;
    }
    let strength = (shake_ms / SHAKE_MS).min(1.0);
    Vec2::new((shake_ms * 0.35).sin() * 4.0 * strength, 0.0)
}

/// Build the scene for the current state
pub fn build_scene(state: &DropState, settings: &Settings) -> Scene {
    let mut scene = Scene {
        offset: if settings.effective_screen_shake() {
            shake_offset(state.shake_ms)
        } else {
            Vec2::ZERO
        },
        items: Vec::with_capacity(state.primes.len() + state.particles.len() + 4),
    };

    scene.items.push(DrawItem::Ground {
        top: GROUND_TOP,
        height: GROUND_HEIGHT,
    });

    // Balls first, labels sit on top of them inside the same item
    let player_radius = if settings.effective_pulse() {
        state.player.radius()
    } else {
        PLAYER_RADIUS
    };
    scene.items.push(DrawItem::Ball {
        center: state.player.pos(),
        radius: player_radius,
        palette: PLAYER_PALETTE,
        label: state.value.to_string(),
        font_size: label_font_size(player_radius),
    });

    for ball in &state.primes {
        scene.items.push(DrawItem::Ball {
            center: ball.pos,
            radius: ball.radius,
            palette: PRIME_PALETTE,
            label: ball.prime.to_string(),
            font_size: label_font_size(ball.radius),
        });
    }

    if settings.effect_texts {
        for effect in &state.effects {
            scene.items.push(DrawItem::Text {
                text: effect.text.clone(),
                pos: effect.pos,
                color: effect_color(effect.kind),
                alpha: effect.alpha,
            });
        }
    }

    if settings.particles {
        for particle in &state.particles {
            scene.items.push(DrawItem::Dot {
                pos: particle.pos,
                size: particle.size,
                color: particle_color(particle.kind),
                alpha: particle.alpha,
            });
        }
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{PrimeBall, PrimeSource};

    fn playing_state() -> DropState {
        let mut state = DropState::new(3);
        state.start();
        state.value = 84;
        let id = state.next_entity_id();
        state.primes.push(PrimeBall {
            id,
            pos: Vec2::new(200.0, 100.0),
            vel: Vec2::ZERO,
            radius: PRIME_RADIUS,
            prime: 7,
            source: PrimeSource::Base,
            swing_phase: 0.0,
        });
        state
    }

    #[test]
    fn test_label_font_size_is_clamped() {
        assert_eq!(label_font_size(10.0), 14.0);
        assert!((label_font_size(26.0) - 18.2).abs() < 1e-4);
        assert_eq!(label_font_size(40.0), 20.0);
    }

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        assert_eq!(fit_scale(560.0, 900.0), 1.0);
        assert_eq!(fit_scale(280.0, 2000.0), 0.5);
        assert_eq!(fit_scale(2000.0, 450.0), 0.5);
        assert_eq!(fit_scale(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_scene_order_and_labels() {
        let state = playing_state();
        let scene = build_scene(&state, &Settings::default());

        assert!(matches!(scene.items[0], DrawItem::Ground { .. }));
        match &scene.items[1] {
            DrawItem::Ball { label, palette, .. } => {
                assert_eq!(label, "84");
                assert_eq!(*palette, PLAYER_PALETTE);
            }
            other => panic!("expected player ball, got {other:?}"),
        }
        match &scene.items[2] {
            DrawItem::Ball { label, palette, .. } => {
                assert_eq!(label, "7");
                assert_eq!(*palette, PRIME_PALETTE);
            }
            other => panic!("expected prime ball, got {other:?}"),
        }
    }

    #[test]
    fn test_effects_follow_settings() {
        let mut state = playing_state();
        let pos = state.player.pos();
        state.add_effect("÷7".into(), pos, HitKind::Divide);
        state.add_particles(pos, HitKind::Divide);

        let full = build_scene(&state, &Settings::default());
        let texts = full
            .items
            .iter()
            .filter(|i| matches!(i, DrawItem::Text { color: "#5aa6ff", .. }))
            .count();
        let dots = full
            .items
            .iter()
            .filter(|i| matches!(i, DrawItem::Dot { .. }))
            .count();
        assert_eq!(texts, 1);
        assert_eq!(dots, PARTICLES_PER_HIT);

        let quiet = Settings {
            particles: false,
            effect_texts: false,
            ..Settings::default()
        };
        let bare = build_scene(&state, &quiet);
        assert_eq!(bare.items.len(), 3);
    }

    #[test]
    fn test_shake_respects_reduced_motion() {
        let mut state = playing_state();
        state.shake_ms = SHAKE_MS / 2.0;
        assert_ne!(build_scene(&state, &Settings::default()).offset, Vec2::ZERO);

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(build_scene(&state, &calm).offset, Vec2::ZERO);
        assert_eq!(shake_offset(0.0), Vec2::ZERO);
    }
}
