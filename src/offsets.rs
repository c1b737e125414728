use crate::low_primes::LowPrimeTable;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Offset of an odd `n` against the odd prime `p`.
///
/// With `r = n mod p`, the offset is `(r + (r mod 2) * p) / 2`, which is
/// `n / 2 mod p`. Stepping `n` by 2 therefore steps the offset by 1, and the
/// offset is zero exactly when `p` divides `n`.
pub fn offset_for(n: &BigUint, p: u32) -> u32 {
    let r = (n % p).to_u32().unwrap_or(0);
    ((u64::from(r) + u64::from(r % 2) * u64::from(p)) / 2) as u32
}

/// Compute the full offset vector of `n` against every table prime.
///
/// One big-integer modulus per prime; used once per search.
pub fn init_offsets(n: &BigUint, table: &LowPrimeTable) -> Vec<u32> {
    table.primes().iter().map(|&p| offset_for(n, p)).collect()
}

/// True if any table prime divides the number the offsets describe.
pub fn is_rejectable(offsets: &[u32]) -> bool {
    offsets.iter().any(|&o| o == 0)
}

/// An odd integer under test, together with its offsets against the table.
///
/// Owned by a single worker. The offsets are kept in step with the value so
/// divisibility by a table prime is a zero check rather than a modulus.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    value: BigUint,
    offsets: Vec<u32>,
    table: &'a LowPrimeTable,
}

impl<'a> Candidate<'a> {
    /// Wrap an odd starting value.
    pub fn new(value: BigUint, table: &'a LowPrimeTable) -> Self {
        debug_assert!(value.bit(0), "candidates must be odd");
        let offsets = init_offsets(&value, table);
        Candidate {
            value,
            offsets,
            table,
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn into_value(self) -> BigUint {
        self.value
    }

    /// Move to the next odd integer.
    pub fn advance(&mut self) {
        self.value += 2u32;
        for (offset, &p) in self.offsets.iter_mut().zip(self.table.primes()) {
            *offset += 1;
            if *offset == p {
                *offset = 0;
            }
        }
    }

    pub fn is_rejectable(&self) -> bool {
        is_rejectable(&self.offsets)
    }

    /// Advance until no table prime divides the value.
    ///
    /// Returns the number of steps taken; zero if the current value already
    /// survives the sieve.
    pub fn skip_to_candidate(&mut self) -> u64 {
        let mut steps = 0u64;
        while self.is_rejectable() {
            self.advance();
            steps += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use num_bigint::RandBigInt;

    fn random_odd(rng: &mut ChaCha20Rng, bits: u64) -> BigUint {
        let n = rng.gen_biguint(bits);
        n | BigUint::from(1u32)
    }

    #[test]
    fn test_offset_zero_iff_divisible() {
        let table = LowPrimeTable::generate(20).unwrap();
        for n in (1u32..5000).step_by(2) {
            let value = BigUint::from(n);
            let offsets = init_offsets(&value, &table);
            for (&o, &p) in offsets.iter().zip(table.primes()) {
                assert_eq!(o == 0, n % p == 0, "n={} p={}", n, p);
                assert!(o < p);
            }
        }
    }

    #[test]
    fn test_offset_formula_small_values() {
        // 9 mod 7 = 2 (even): offset 1. 11 mod 7 = 4: offset 2. 13 mod 7 = 6: offset 3.
        // 15 mod 7 = 1 (odd): offset (1 + 7) / 2 = 4.
        assert_eq!(offset_for(&BigUint::from(9u32), 7), 1);
        assert_eq!(offset_for(&BigUint::from(11u32), 7), 2);
        assert_eq!(offset_for(&BigUint::from(13u32), 7), 3);
        assert_eq!(offset_for(&BigUint::from(15u32), 7), 4);
        assert_eq!(offset_for(&BigUint::from(21u32), 7), 0);
    }

    #[test]
    fn test_advance_matches_recomputation() {
        let table = LowPrimeTable::generate(300).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2024);

        for _ in 0..1000 {
            let start = random_odd(&mut rng, 128);
            let steps = rng.gen_range(0..2000u32);

            let mut candidate = Candidate::new(start.clone(), &table);
            for _ in 0..steps {
                candidate.advance();
            }

            let expected_value = &start + BigUint::from(2u32) * steps;
            assert_eq!(candidate.value(), &expected_value);
            assert_eq!(candidate.offsets(), init_offsets(&expected_value, &table).as_slice());
        }
    }

    #[test]
    fn test_skip_to_candidate_never_divisible() {
        let table = LowPrimeTable::generate(1000).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(77);

        for _ in 0..1000 {
            let start = random_odd(&mut rng, 96);
            let mut candidate = Candidate::new(start.clone(), &table);
            let steps = candidate.skip_to_candidate();

            assert!(!candidate.is_rejectable());
            assert_eq!(candidate.value(), &(&start + BigUint::from(2u32) * steps));
            for &p in table.primes() {
                assert!(!(candidate.value() % p).is_zero(), "{} divisible by {}", candidate.value(), p);
            }
            // Bounded by the longest run of odd integers sharing a factor with the table.
            assert!(steps < 1000, "sieve skipped {} candidates", steps);
        }
    }

    #[test]
    fn test_skip_stops_on_first_survivor() {
        let table = LowPrimeTable::generate(3).unwrap(); // 3, 5, 7
        // 105 = 3*5*7; 107 is the next odd integer coprime to 105.
        let mut candidate = Candidate::new(BigUint::from(105u32), &table);
        assert!(candidate.is_rejectable());
        assert_eq!(candidate.skip_to_candidate(), 1);
        assert_eq!(candidate.value(), &BigUint::from(107u32));

        // Already coprime: no movement.
        assert_eq!(candidate.skip_to_candidate(), 0);
    }

    #[test]
    fn test_is_rejectable_predicate() {
        assert!(!is_rejectable(&[]));
        assert!(!is_rejectable(&[1, 2, 3]));
        assert!(is_rejectable(&[1, 0, 3]));
        assert!(is_rejectable(&[0]));
    }
}
