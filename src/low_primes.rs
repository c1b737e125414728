use crate::error::{Result, SearchError};

/// Default number of odd primes used to pre-filter candidates.
pub const DEFAULT_LOW_PRIMES: usize = 10_000;

/// The first K odd primes, in increasing order.
///
/// Built once before any worker starts and then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowPrimeTable {
    primes: Vec<u32>,
}

impl LowPrimeTable {
    /// Build the first `count` odd primes by trial division.
    ///
    /// Each successive odd integer starting at 3 is divided by the primes
    /// already in the table; division stops once `p * p` exceeds the
    /// integer, since no larger factor can be the smallest one.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidConfig` when `count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use mr_primes::LowPrimeTable;
    ///
    /// let table = LowPrimeTable::generate(5).unwrap();
    /// assert_eq!(table.primes(), &[3, 5, 7, 11, 13]);
    /// ```
    pub fn generate(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(SearchError::InvalidConfig(
                "number of offset primes must be a valid integer greater than 0".to_string(),
            ));
        }

        let mut primes: Vec<u32> = Vec::with_capacity(count);
        let mut n: u32 = 3;

        while primes.len() < count {
            let is_prime = primes
                .iter()
                .take_while(|&&p| u64::from(p) * u64::from(p) <= u64::from(n))
                .all(|&p| n % p != 0);

            if is_prime {
                primes.push(n);
            }
            n += 2;
        }

        Ok(LowPrimeTable { primes })
    }

    pub fn primes(&self) -> &[u32] {
        &self.primes
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Largest prime in the table. Candidates must exceed it, otherwise a
    /// table prime would be sieved out as its own divisor.
    pub fn largest(&self) -> u32 {
        self.primes.last().copied().unwrap_or(0)
    }
}
