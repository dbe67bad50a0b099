//! Prime arithmetic for Prime Drop
//!
//! Everything here is plain trial division. The values in play stay small
//! (the game ends at 1000), so nothing smarter is needed.

/// Result of applying a caught prime to the running value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Value after the prime was applied
    pub value: u64,
    /// True when the prime divided the old value
    pub divided: bool,
}

/// Trial-division primality test
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Distinct prime factors of `n` in ascending order (empty below 2)
pub fn prime_factors(n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }

    let mut n = n;
    if n % 2 == 0 {
        factors.push(2);
        while n % 2 == 0 {
            n /= 2;
        }
    }

    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            factors.push(i);
            while n % i == 0 {
                n /= i;
            }
        }
        i += 2;
    }

    if n > 1 {
        factors.push(n);
    }
    factors
}

/// All primes `p` with `2 <= p < limit`
pub fn primes_below(limit: u64) -> Vec<u64> {
    (2..limit).filter(|&n| is_prime(n)).collect()
}

/// Apply a caught prime: divide when it is a divisor, otherwise add it
pub fn apply_prime(value: u64, prime: u64) -> Transform {
    if prime != 0 && value % prime == 0 {
        Transform {
            value: value / prime,
            divided: true,
        }
    } else {
        Transform {
            value: value.saturating_add(prime),
            divided: false,
        }
    }
}
