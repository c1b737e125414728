use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::{Mutex, PoisonError};

/// Which of the two generators a draw comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Search start points.
    Start,
    /// Miller-Rabin witnesses.
    Witness,
}

/// Two independently locked random streams derived from one seed.
///
/// Both generators are seeded with the same value. Keeping start points and
/// witnesses apart means the start-point sequence never depends on how many
/// witnesses other workers have drawn in the meantime.
#[derive(Debug)]
pub struct RandomSource {
    seed: u64,
    start: Mutex<ChaCha20Rng>,
    witness: Mutex<ChaCha20Rng>,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        RandomSource {
            seed,
            start: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
            witness: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, bound)` from the given stream.
    ///
    /// The stream's lock is held only for the draw itself.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    pub fn next_below(&self, stream: Stream, bound: &BigUint) -> BigUint {
        let lock = match stream {
            Stream::Start => &self.start,
            Stream::Witness => &self.witness,
        };
        let mut rng = lock.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_biguint_below(bound)
    }

    /// Random odd integer with exactly `num_digits` decimal digits.
    ///
    /// Draws `k` uniformly in `[0, 45 * 10^(num_digits - 2))`, then returns
    /// `2k + 10^(num_digits - 1) + 1`. The smallest result is
    /// `10^(num_digits - 1) + 1` and the largest is `10^num_digits - 1`, so
    /// every odd `num_digits`-digit integer is reachable.
    ///
    /// Requires `num_digits >= 2`.
    pub fn gen_start(&self, num_digits: u32) -> BigUint {
        debug_assert!(num_digits >= 2, "gen_start needs at least two digits");

        let ten = BigUint::from(10u32);
        let lower = ten.pow(num_digits - 1);
        let span = BigUint::from(45u32) * ten.pow(num_digits - 2);

        let k = self.next_below(Stream::Start, &span);
        (k << 1u32) + lower + BigUint::one()
    }
}
