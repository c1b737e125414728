use crate::error::{Result, SearchError};
use crate::low_primes::DEFAULT_LOW_PRIMES;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_DIGITS: u32 = 10;
pub const MAX_ROUNDS: u32 = 199;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub output: String,
    pub prime_count: u64,
    pub digits: u32,
    pub rounds: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub append: bool,
    #[serde(default = "default_low_primes")]
    pub low_primes: usize,
    #[serde(default)]
    pub threads: usize, // 0 = one per prime, capped at available cores
}

fn default_low_primes() -> usize {
    DEFAULT_LOW_PRIMES
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            output: "primes.txt".to_string(),
            prime_count: 10,
            digits: 300,
            rounds: 8,
            seed: None,
            append: false,
            low_primes: DEFAULT_LOW_PRIMES,
            threads: 0,
        }
    }
}

impl SearchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        crate::io_utils::load_from_file(path)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        crate::io_utils::save_to_file(self, path)
    }

    /// Check every field against its documented range.
    ///
    /// The search engine assumes a validated config; callers run this before
    /// handing the config over.
    pub fn validate(&self) -> Result<()> {
        if self.output.trim().is_empty() {
            return Err(SearchError::InvalidConfig(
                "output file name must not be empty".to_string(),
            ));
        }
        if self.prime_count == 0 {
            return Err(SearchError::InvalidConfig(
                "number of primes must be a valid integer greater than 0".to_string(),
            ));
        }
        if self.digits < MIN_DIGITS {
            return Err(SearchError::InvalidConfig(format!(
                "number of digits must be a valid integer greater than or equal to {}",
                MIN_DIGITS
            )));
        }
        if self.rounds == 0 || self.rounds > MAX_ROUNDS {
            return Err(SearchError::InvalidConfig(
                "Miller-Rabin rounds must be a valid integer greater than 0 and less than 200"
                    .to_string(),
            ));
        }
        if self.low_primes == 0 {
            return Err(SearchError::InvalidConfig(
                "number of offset primes must be a valid integer greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured seed, or the current Unix time when none was given.
    pub fn resolved_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64)
    }

    /// Worker threads to run: the configured count, or one per prime capped
    /// at the available parallelism.
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let wanted = usize::try_from(self.prime_count).unwrap_or(usize::MAX);
        wanted.clamp(1, cores)
    }
}
