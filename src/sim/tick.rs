//! Fixed timestep simulation tick
//!
//! Core Prime Drop loop that advances the simulation deterministically.

use glam::Vec2;
use rand::Rng;

use super::collision::{Contact, classify};
use super::spawn::pick_prime_for_drop;
use super::state::{DropEvent, DropPhase, DropState, HitKind, PrimeBall};
use crate::consts::*;
use crate::primes::apply_prime;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move left held (arrow key or left touch zone)
    pub left: bool,
    /// Move right held (arrow key or right touch zone)
    pub right: bool,
    /// Pointer steering target in logical x (mouse/pen held down)
    pub pointer_x: Option<f32>,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the autopilot steers
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut DropState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            DropPhase::Playing => {
                state.pause();
                return;
            }
            DropPhase::Paused => {
                state.resume();
            }
            _ => {}
        }
    }

    if state.phase != DropPhase::Playing {
        return;
    }

    let ratio = dt * TICK_RATE;
    let dt_ms = dt * 1000.0;

    let mut input = input.clone();
    if input.autopilot {
        input.left = false;
        input.right = false;
        input.pointer_x = autopilot_target(state);
    }

    update_player(state, &input, ratio);
    handle_spawns(state, dt_ms);

    state.elapsed_ms += dt_ms as f64;
    state.clock_secs += dt;

    for ball in &mut state.primes {
        let swing = ball.swing_accel(&state.tuning, state.clock_secs);
        ball.integrate(&state.tuning, swing, ratio);
    }

    handle_collisions(state);
    update_effects(state, dt_ms, ratio);
    update_particles(state, dt_ms, ratio);
    state.player.update_pulse(dt_ms);
    state.shake_ms = (state.shake_ms - dt_ms).max(0.0);
}

fn update_player(state: &mut DropState, input: &TickInput, ratio: f32) {
    let max_speed = state.tuning.player_max_speed;
    let mut target_vel = 0.0;

    if let Some(target_x) = input.pointer_x {
        let diff = target_x - state.player.x;
        target_vel = (diff * state.tuning.pointer_gain).clamp(-max_speed, max_speed);
    }

    // Held directions win over the pointer
    if input.left || input.right {
        let direction = (input.right as i32 - input.left as i32) as f32;
        target_vel = direction * max_speed;
    }

    state.player.steer(target_vel, &state.tuning, ratio);
}

fn handle_spawns(state: &mut DropState, dt_ms: f32) {
    state.spawn_timer_ms += dt_ms;
    if state.spawn_timer_ms < state.tuning.spawn_interval_ms {
        return;
    }
    state.spawn_timer_ms = 0.0;

    let pick = pick_prime_for_drop(state.value, &state.tuning, &mut state.rng);
    let x = PLAYER_MARGIN + state.rng.random::<f32>() * (GAME_WIDTH - 2.0 * PLAYER_MARGIN);
    let spread = state.tuning.spawn_spread_vx;
    let vx = state.rng.random_range(-spread..spread);
    let swing_phase = state.rng.random_range(0.0..std::f32::consts::TAU);

    let id = state.next_entity_id();
    state.primes.push(PrimeBall {
        id,
        pos: Vec2::new(x, PRIME_SPAWN_Y),
        vel: Vec2::new(vx, state.tuning.spawn_fall_speed()),
        radius: PRIME_RADIUS,
        prime: pick.value,
        source: pick.source,
        swing_phase,
    });
    state.events.push(DropEvent::Spawned {
        prime: pick.value,
        source: pick.source,
    });
}

fn handle_collisions(state: &mut DropState) {
    let player_pos = state.player.pos();
    let player_radius = state.player.radius();

    let mut caught = Vec::new();
    state.primes.retain(|ball| {
        match classify(ball.pos, ball.radius, player_pos, player_radius) {
            Contact::None => true,
            Contact::Player => {
                caught.push(ball.prime);
                false
            }
            Contact::Ground | Contact::Offscreen => false,
        }
    });

    // Every catch in the step applies, even past the clearing one
    for prime in caught {
        catch_prime(state, prime);
    }
}

/// Apply a caught prime to the running value
pub fn catch_prime(state: &mut DropState, prime: u64) {
    let transform = apply_prime(state.value, prime);
    state.value = transform.value;

    let (kind, text) = if transform.divided {
        (HitKind::Divide, format!("÷{}", prime))
    } else {
        (HitKind::Add, format!("+{}", prime))
    };
    let player_pos = state.player.pos();
    state.add_effect(text, player_pos - Vec2::new(0.0, 50.0), kind);
    state.add_particles(player_pos - Vec2::new(0.0, 20.0), kind);
    state.player.trigger_pulse();

    if transform.divided {
        state.shake_ms = SHAKE_MS;
        state.events.push(DropEvent::Divided {
            prime,
            value: state.value,
        });
    } else {
        state.events.push(DropEvent::Added {
            prime,
            value: state.value,
        });
    }

    if state.phase == DropPhase::Playing && state.value >= state.tuning.target_value {
        state.phase = DropPhase::Cleared;
        state.events.push(DropEvent::Cleared {
            elapsed_ms: state.elapsed_ms,
        });
        log::info!(
            "Prime Drop cleared at {} (value {})",
            state.timer_text(),
            state.value
        );
    }
}

fn update_effects(state: &mut DropState, dt_ms: f32, ratio: f32) {
    for effect in &mut state.effects {
        effect.life_ms -= dt_ms;
        effect.pos.y -= EFFECT_RISE * ratio;
        effect.alpha = (effect.life_ms / effect.total_ms).max(0.0);
    }
    state.effects.retain(|e| e.life_ms > 0.0);
}

fn update_particles(state: &mut DropState, dt_ms: f32, ratio: f32) {
    for particle in &mut state.particles {
        particle.life_ms -= dt_ms;
        particle.pos += particle.vel * ratio;
        particle.vel.y += PARTICLE_GRAVITY * ratio;
        particle.alpha = (particle.life_ms / particle.total_ms).max(0.0);
    }
    state.particles.retain(|p| p.life_ms > 0.0);
}

/// Where the autopilot wants the player (logical x)
///
/// Chases the lowest ball that would add; with none around, steps clear of
/// the nearest ball that would divide.
pub fn autopilot_target(state: &DropState) -> Option<f32> {
    let value = state.value;
    let player_x = state.player.x;
    let reach = PLAYER_RADIUS + PRIME_RADIUS;

    let catchable = state
        .primes
        .iter()
        .filter(|b| value % b.prime != 0 && b.pos.y < PLAYER_Y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    if let Some(ball) = catchable {
        return Some(ball.pos.x);
    }

    let threat = state
        .primes
        .iter()
        .filter(|b| value % b.prime == 0 && (b.pos.x - player_x).abs() < reach * 1.5)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;

    let dodge = if threat.pos.x <= player_x {
        threat.pos.x + reach * 2.0
    } else {
        threat.pos.x - reach * 2.0
    };
    // Pinned at a wall: go around the other side
    let dodge = if dodge < PLAYER_MARGIN || dodge > GAME_WIDTH - PLAYER_MARGIN {
        if threat.pos.x <= player_x {
            threat.pos.x - reach * 2.0
        } else {
            threat.pos.x + reach * 2.0
        }
    } else {
        dodge
    };
    Some(crate::clamp_player_x(dodge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PrimeSource;

    fn ball_at(state: &mut DropState, x: f32, y: f32, prime: u64) {
        let id = state.next_entity_id();
        state.primes.push(PrimeBall {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            radius: PRIME_RADIUS,
            prime,
            source: PrimeSource::Base,
            swing_phase: 0.0,
        });
    }

    #[test]
    fn test_tick_does_nothing_on_home() {
        let mut state = DropState::new(12345);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, DropPhase::Home);
        assert_eq!(state.elapsed_ms, 0.0);
        assert!(state.primes.is_empty());
    }

    #[test]
    fn test_spawn_after_interval() {
        let mut state = DropState::new(12345);
        state.start();
        // 1600 ms at 60 Hz is 96 ticks
        for _ in 0..95 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.primes.is_empty());
        tick(&mut state, &TickInput::default(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.primes.len(), 1);
        let ball = &state.primes[0];
        assert!(ball.pos.x >= PLAYER_MARGIN - 2.0 && ball.pos.x <= GAME_WIDTH - PLAYER_MARGIN + 2.0);
        assert!(ball.pos.y < 0.0);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, DropEvent::Spawned { .. }))
        );
    }

    #[test]
    fn test_catch_divides_or_adds() {
        let mut state = DropState::new(1);
        state.start();
        state.value = 12;
        let x = state.player.x;

        ball_at(&mut state, x, PLAYER_Y - 40.0, 3);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.value, 4);
        assert!(state.primes.is_empty());
        assert!(state.shake_ms > 0.0);
        assert_eq!(state.effects[0].text, "÷3");

        ball_at(&mut state, x, PLAYER_Y - 40.0, 5);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.value, 9);
        assert_eq!(state.effects.last().unwrap().text, "+5");
        assert_eq!(state.particles.len(), 2 * PARTICLES_PER_HIT);
    }

    #[test]
    fn test_effects_and_particles_fade_out() {
        let mut state = DropState::new(1);
        state.start();
        state.value = 10;
        let x = state.player.x;
        ball_at(&mut state, x, PLAYER_Y - 40.0, 3);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.effects.len(), 1);
        assert_eq!(state.particles.len(), PARTICLES_PER_HIT);

        // Rises a fixed amount every tick
        let y = state.effects[0].pos.y;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!((y - state.effects[0].pos.y - EFFECT_RISE).abs() < 1e-3);
        assert!(state.effects[0].alpha < 1.0);

        // 43 ticks of ~16.7 ms: past the 700 ms particle life, inside 800 ms
        for _ in 0..41 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.particles.is_empty());
        assert_eq!(state.effects.len(), 1);
        let effect = &state.effects[0];
        assert!(effect.alpha > 0.0 && effect.alpha < 0.15, "alpha = {}", effect.alpha);
        assert!((effect.alpha - effect.life_ms / EFFECT_LIFE_MS).abs() < 1e-5);

        for _ in 0..6 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_ground_discards_without_effect() {
        let mut state = DropState::new(1);
        state.start();
        state.player.x = GAME_WIDTH - PLAYER_MARGIN;
        ball_at(&mut state, PLAYER_MARGIN, GROUND_TOP - PRIME_RADIUS + 2.0, 7);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.primes.is_empty());
        assert_eq!(state.value, 1);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_reaching_target_clears_and_stops() {
        let mut state = DropState::new(1);
        state.start();
        state.value = 997;
        let x = state.player.x;

        // Two balls on the player in the same step: both apply, one clear
        ball_at(&mut state, x, PLAYER_Y - 30.0, 3);
        ball_at(&mut state, x, PLAYER_Y - 20.0, 7);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.value, 1007);
        assert_eq!(state.phase, DropPhase::Cleared);
        assert!(state.primes.is_empty());
        let texts: Vec<&str> = state.effects.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["+3", "+7"]);
        let events = state.drain_events();
        let clears = events
            .iter()
            .filter(|e| matches!(e, DropEvent::Cleared { .. }))
            .count();
        assert_eq!(clears, 1);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, DropEvent::Added { prime: 7, value: 1007 }))
        );

        // Frozen afterwards
        let elapsed = state.elapsed_ms;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.elapsed_ms, elapsed);
    }

    #[test]
    fn test_pause_toggle_freezes_timer() {
        let mut state = DropState::new(5);
        state.start();
        tick(&mut state, &TickInput::default(), SIM_DT);
        let elapsed = state.elapsed_ms;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, DropPhase::Paused);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.elapsed_ms, elapsed);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, DropPhase::Playing);
        assert!(state.elapsed_ms > elapsed);
    }

    #[test]
    fn test_keys_override_pointer() {
        let mut state = DropState::new(5);
        state.start();
        let start_x = state.player.x;
        let input = TickInput {
            left: true,
            pointer_x: Some(GAME_WIDTH),
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.player.x < start_x);
    }

    #[test]
    fn test_pointer_steers_toward_target() {
        let mut state = DropState::new(5);
        state.start();
        let input = TickInput {
            pointer_x: Some(100.0),
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!((state.player.x - 100.0).abs() < 2.0, "x = {}", state.player.x);
    }

    #[test]
    fn test_autopilot_prefers_adding_ball() {
        let mut state = DropState::new(5);
        state.start();
        state.value = 6;
        ball_at(&mut state, 100.0, 300.0, 5);
        ball_at(&mut state, 400.0, 500.0, 3);
        ball_at(&mut state, 200.0, 200.0, 7);
        // 3 divides 6, so the lowest adding ball is the 5
        assert_eq!(autopilot_target(&state), Some(100.0));
    }

    #[test]
    fn test_autopilot_dodges_divisor() {
        let mut state = DropState::new(5);
        state.start();
        state.value = 6;
        state.player.x = 280.0;
        ball_at(&mut state, 290.0, 600.0, 2);
        let target = autopilot_target(&state).unwrap();
        assert!((target - 290.0).abs() >= PLAYER_RADIUS + PRIME_RADIUS);

        state.primes.clear();
        assert_eq!(autopilot_target(&state), None);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = DropState::new(99999);
        let mut state2 = DropState::new(99999);
        state1.start();
        state2.start();

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.value, state2.value);
        assert_eq!(state1.primes.len(), state2.primes.len());
        assert!((state1.player.x - state2.player.x).abs() < 0.0001);
    }
}
