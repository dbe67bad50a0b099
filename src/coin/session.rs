//! One detective's round against a rigged coin
//!
//! Holds the hidden probability, the flip statistics, the guess budget and
//! the auto-flip loop state. Timing (600 ms ticks, 400 ms animation) is the
//! view layer's job; everything here is synchronous and seeded.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::code::GameCode;
use crate::error::CoinError;

/// Flip totals at which auto flip stops by itself
pub const MILESTONES: [u64; 3] = [100, 1_000, 10_000];

/// Milliseconds between auto-flip ticks
pub const AUTO_FLIP_INTERVAL_MS: u32 = 600;

/// Milliseconds a flip animation plays before the result shows
pub const FLIP_ANIMATION_MS: u32 = 400;

/// Guess budget when a stored game has none
pub const DEFAULT_MAX_GUESSES: u32 = 5;

/// Which side the coin landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Face {
    /// The portrait side
    #[default]
    Heads,
    /// The "100" side
    Tails,
}

/// Cumulative flip statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlipStats {
    pub total: u64,
    pub heads: u64,
    pub tails: u64,
}

impl FlipStats {
    /// Observed heads share in percent (None before the first flip)
    pub fn heads_percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.heads as f64 * 100.0 / self.total as f64)
    }
}

/// Result banner after a guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Correct,
    Wrong,
    GameOver,
}

/// Outcome of one batch of flips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub count: u32,
    pub heads: u32,
    /// Face of the last flip in the batch (what the coin shows)
    pub last_face: Face,
}

/// Auto-flip loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoFlip {
    pub running: bool,
    /// Batch size fixed when the loop started
    pub batch: u32,
    /// Milestone that last stopped the loop
    last_stop_total: u64,
}

/// Batch size unlocked by the flips done so far
pub fn batch_size(total: u64) -> u32 {
    match total {
        t if t >= 10_000 => 1_000,
        t if t >= 1_000 => 100,
        t if t >= 100 => 10,
        _ => 1,
    }
}

/// The flip count at which the next batch upgrade unlocks
pub fn next_milestone(total: u64) -> Option<u64> {
    MILESTONES.iter().copied().find(|m| *m > total)
}

/// Flip `count` coins that land heads with `probability` percent
pub fn flip_coins<R: Rng>(probability: u8, count: u32, rng: &mut R) -> BatchOutcome {
    let mut heads = 0;
    let mut last_face = Face::Heads;
    for _ in 0..count {
        let is_heads = rng.random::<f64>() * 100.0 < probability as f64;
        if is_heads {
            heads += 1;
        }
        last_face = if is_heads { Face::Heads } else { Face::Tails };
    }
    BatchOutcome {
        count,
        heads,
        last_face,
    }
}

/// A joined game in progress
#[derive(Debug, Clone)]
pub struct Session {
    pub code: GameCode,
    target_probability: u8,
    pub max_guesses: u32,
    pub guesses_used: u32,
    pub stats: FlipStats,
    pub face: Face,
    pub feedback: Option<Feedback>,
    pub auto: AutoFlip,
    /// True while a flip animation is playing
    pub flipping: bool,
    /// Rolled batch waiting for its animation to finish
    pending: Option<BatchOutcome>,
}

impl Session {
    /// Fresh session; a zero guess budget falls back to the default
    pub fn new(code: GameCode, target_probability: u8, max_guesses: u32) -> Self {
        Self {
            code,
            target_probability: target_probability.min(100),
            max_guesses: if max_guesses == 0 {
                DEFAULT_MAX_GUESSES
            } else {
                max_guesses
            },
            guesses_used: 0,
            stats: FlipStats::default(),
            face: Face::Heads,
            feedback: None,
            auto: AutoFlip::default(),
            flipping: false,
            pending: None,
        }
    }

    /// The hidden answer; only shown once the round is over
    pub fn revealed_probability(&self) -> Option<u8> {
        self.is_finished().then_some(self.target_probability)
    }

    pub fn remaining_guesses(&self) -> u32 {
        self.max_guesses.saturating_sub(self.guesses_used)
    }

    /// Down to the last guess (the badge turns red)
    pub fn on_last_guess(&self) -> bool {
        self.guesses_used + 1 >= self.max_guesses
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.feedback, Some(Feedback::Correct | Feedback::GameOver))
    }

    pub fn is_game_over(&self) -> bool {
        self.feedback == Some(Feedback::GameOver)
    }

    /// Batch size the auto-flip button offers right now
    pub fn current_batch_size(&self) -> u32 {
        batch_size(self.stats.total)
    }

    /// Flip a batch and fold it into the statistics right away
    pub fn flip_batch<R: Rng>(&mut self, count: u32, rng: &mut R) -> BatchOutcome {
        let outcome = flip_coins(self.target_probability, count, rng);
        self.apply(outcome);
        outcome
    }

    /// Roll a batch and start its animation
    ///
    /// Stats and face stay unchanged until `finish_flip`. Returns `None`
    /// while another flip is still animating.
    pub fn begin_flip<R: Rng>(&mut self, count: u32, rng: &mut R) -> Option<BatchOutcome> {
        if self.flipping {
            return None;
        }
        let outcome = flip_coins(self.target_probability, count, rng);
        self.flipping = true;
        self.pending = Some(outcome);
        Some(outcome)
    }

    /// End the flip animation and reveal the rolled batch
    ///
    /// A running auto flip pauses when the new total lands on a milestone.
    pub fn finish_flip(&mut self) -> Option<BatchOutcome> {
        self.flipping = false;
        let outcome = self.pending.take()?;
        self.apply(outcome);

        let total = self.stats.total;
        if self.auto.running && MILESTONES.contains(&total) && self.auto.last_stop_total != total {
            self.auto.running = false;
            self.auto.last_stop_total = total;
            log::info!("Auto flip paused at milestone {}", total);
        }
        Some(outcome)
    }

    fn apply(&mut self, outcome: BatchOutcome) {
        self.stats.total += outcome.count as u64;
        self.stats.heads += outcome.heads as u64;
        self.stats.tails += (outcome.count - outcome.heads) as u64;
        self.face = outcome.last_face;
    }

    /// Start or stop the auto-flip loop; returns whether it is now running
    pub fn toggle_auto_flip(&mut self) -> bool {
        if self.auto.running {
            self.stop_auto_flip();
        } else {
            self.start_auto_flip();
        }
        self.auto.running
    }

    /// Start auto flip with the batch size unlocked so far
    pub fn start_auto_flip(&mut self) -> bool {
        if self.is_game_over() || self.auto.running {
            return false;
        }
        self.auto.running = true;
        self.auto.batch = self.current_batch_size();
        log::info!(
            "Auto flip started for {} (batch {})",
            self.code,
            self.auto.batch
        );
        true
    }

    pub fn stop_auto_flip(&mut self) {
        self.auto.running = false;
    }

    /// One auto-flip interval; skipped while a flip animation is playing
    pub fn auto_flip_tick<R: Rng>(&mut self, rng: &mut R) -> Option<BatchOutcome> {
        if !self.auto.running {
            return None;
        }
        self.begin_flip(self.auto.batch, rng)
    }

    /// The player edited the guess box; a "wrong" banner goes away
    pub fn edit_guess(&mut self) {
        if self.feedback == Some(Feedback::Wrong) {
            self.feedback = None;
        }
    }

    /// Submit a guess typed by the player
    ///
    /// Input that is not a whole number from 0 to 100 is rejected without
    /// spending a guess.
    pub fn submit_guess(&mut self, input: &str) -> Result<Feedback, CoinError> {
        if self.is_finished() {
            return Err(CoinError::RoundOver);
        }
        let guess: u8 = input
            .trim()
            .parse()
            .ok()
            .filter(|g| *g <= 100)
            .ok_or(CoinError::InvalidGuess)?;

        self.guesses_used += 1;
        let feedback = if guess == self.target_probability {
            Feedback::Correct
        } else if self.guesses_used >= self.max_guesses {
            Feedback::GameOver
        } else {
            Feedback::Wrong
        };

        if feedback != Feedback::Wrong {
            self.stop_auto_flip();
        }
        self.feedback = Some(feedback);
        log::info!(
            "Guess {} for {}: {:?} ({}/{})",
            guess,
            self.code,
            feedback,
            self.guesses_used,
            self.max_guesses
        );
        Ok(feedback)
    }
}
