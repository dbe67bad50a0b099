//! Choosing which prime drops next

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::PrimeSource;
use crate::primes::{prime_factors, primes_below};
use crate::tuning::DropTuning;

/// A chosen prime and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimePick {
    pub value: u64,
    pub source: PrimeSource,
}

fn base_pick<R: Rng>(tuning: &DropTuning, rng: &mut R) -> PrimePick {
    PrimePick {
        value: tuning.base_primes.choose(rng).copied().unwrap_or(2),
        source: PrimeSource::Base,
    }
}

/// Pick the next prime to drop for the current value
///
/// Mostly a base prime; sometimes a factor of `value` (so the player can
/// divide), otherwise any prime below `value + 2`.
pub fn pick_prime_for_drop<R: Rng>(value: u64, tuning: &DropTuning, rng: &mut R) -> PrimePick {
    let roll: f32 = rng.random();
    if roll < tuning.base_chance {
        return base_pick(tuning, rng);
    }

    if roll < tuning.factor_chance {
        if let Some(&factor) = prime_factors(value).choose(rng) {
            return PrimePick {
                value: factor,
                source: PrimeSource::Factor,
            };
        }
    }

    match primes_below(value.saturating_add(2)).choose(rng) {
        Some(&prime) => PrimePick {
            value: prime,
            source: PrimeSource::Random,
        },
        None => base_pick(tuning, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::is_prime;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_picks_are_prime_and_sourced_correctly() {
        let tuning = DropTuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        for value in [1u64, 2, 12, 97, 360, 999] {
            for _ in 0..200 {
                let pick = pick_prime_for_drop(value, &tuning, &mut rng);
                assert!(is_prime(pick.value));
                match pick.source {
                    PrimeSource::Base => assert!(tuning.base_primes.contains(&pick.value)),
                    PrimeSource::Factor => assert_eq!(value % pick.value, 0),
                    PrimeSource::Random => assert!(pick.value < value + 2),
                }
            }
        }
    }

    #[test]
    fn test_base_primes_dominate() {
        let tuning = DropTuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let base = (0..2000)
            .filter(|_| pick_prime_for_drop(500, &tuning, &mut rng).source == PrimeSource::Base)
            .count();
        // 80% expected
        assert!(base > 1400 && base < 1800, "base picks: {}", base);
    }

    #[test]
    fn test_value_one_never_picks_factor() {
        // 1 has no prime factors; the factor roll falls through to primes below 3
        let tuning = DropTuning {
            base_chance: 0.0,
            factor_chance: 1.0,
            ..DropTuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let pick = pick_prime_for_drop(1, &tuning, &mut rng);
        assert_eq!(
            pick,
            PrimePick {
                value: 2,
                source: PrimeSource::Random
            }
        );
    }

    #[test]
    fn test_empty_base_list_falls_back_to_two() {
        let tuning = DropTuning {
            base_primes: Vec::new(),
            ..DropTuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let pick = pick_prime_for_drop(0, &DropTuning { base_chance: 1.0, ..tuning }, &mut rng);
        assert_eq!(pick.value, 2);
    }
}
