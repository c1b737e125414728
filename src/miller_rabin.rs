use crate::random_source::{RandomSource, Stream};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Outcome of a Miller-Rabin run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Passed every round. Wrong for a composite with probability at most
    /// `4^-rounds`.
    ProbablePrime,
    /// A witness proved the number composite.
    Composite,
}

impl Verdict {
    pub fn is_probable_prime(self) -> bool {
        self == Verdict::ProbablePrime
    }
}

/// Split `m` into `2^s * d` with `d` odd. `m` must be non-zero.
pub fn decompose(m: &BigUint) -> (u64, BigUint) {
    let s = m.trailing_zeros().unwrap_or(0);
    (s, m >> s)
}

/// Miller-Rabin test of the odd integer `n > 4` with `rounds` random
/// witnesses drawn from the witness stream.
///
/// Each witness `a` is uniform in `[2, n - 2]`. With `n - 1 = 2^s * d`, a
/// round passes when `a^d` is 1 or `n - 1`, or when one of the next `s - 1`
/// squarings reaches `n - 1`. Reaching 1 first means a non-trivial square
/// root of unity was found, so `n` is composite.
pub fn test(n: &BigUint, rounds: u32, random: &RandomSource) -> Verdict {
    debug_assert!(n.bit(0) && *n > BigUint::from(4u32), "n must be odd and > 4");

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let (s, d) = decompose(&n_minus_one);

    // Witnesses are 2 + [0, n - 3).
    let witness_span = n - 3u32;

    'rounds: for _ in 0..rounds {
        let a = random.next_below(Stream::Witness, &witness_span) + &two;
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = &x * &x % n;
            if x == one {
                return Verdict::Composite;
            }
            if x == n_minus_one {
                continue 'rounds;
            }
        }

        return Verdict::Composite;
    }

    Verdict::ProbablePrime
}

/// Primality check for any non-negative integer.
///
/// Small and even values are answered directly; odd values above 4 go
/// through [`test`].
pub fn is_probable_prime(n: &BigUint, rounds: u32, random: &RandomSource) -> bool {
    if let Some(small) = n.to_u32() {
        match small {
            0 | 1 | 4 => return false,
            2 | 3 => return true,
            _ => {}
        }
    }
    if (n % 2u32).is_zero() {
        return false;
    }
    test(n, rounds, random).is_probable_prime()
}
