pub mod config;
pub mod error;
pub mod io_utils;
pub mod low_primes;
pub mod miller_rabin;
pub mod offsets;
pub mod random_source;
pub mod search;
pub mod sink;
pub mod verify;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use low_primes::LowPrimeTable;
pub use miller_rabin::{is_probable_prime, Verdict};
pub use offsets::Candidate;
pub use random_source::{RandomSource, Stream};
pub use search::{find_prime, run_search, SearchReport, SearchResults};
pub use sink::ResultSink;
pub use verify::{verify_file, VerifyConfig, VerifyResult};
