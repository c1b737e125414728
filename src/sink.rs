use crate::error::{Result, SearchError};
use num_bigint::BigUint;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Shared destination for found primes.
///
/// The discovery counter and the file append happen under one lock, so the
/// n-th line of the file is always discovery number n. The file is opened
/// and closed for every prime: anything already written survives if the
/// process is killed mid-search.
#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
    found: Mutex<u64>,
}

impl ResultSink {
    /// Prepare the output file.
    ///
    /// Without `append` the file is truncated (or created). With `append` it
    /// is created only if missing and existing lines are kept.
    pub fn create(path: impl AsRef<Path>, append: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let opened = if append {
            OpenOptions::new().create(true).append(true).open(&path)
        } else {
            File::create(&path)
        };
        opened.map_err(|source| SearchError::Output {
            path: path.clone(),
            source,
        })?;

        Ok(ResultSink {
            path,
            found: Mutex::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of primes recorded so far.
    pub fn found(&self) -> u64 {
        *self.found.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `prime` as one decimal line and return its discovery index,
    /// starting at 1.
    pub fn record(&self, prime: &BigUint) -> Result<u64> {
        let mut found = self.found.lock().unwrap_or_else(PoisonError::into_inner);

        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
            writeln!(file, "{}", prime)?;
            file.flush()
        };
        write().map_err(|source| SearchError::Output {
            path: self.path.clone(),
            source,
        })?;

        *found += 1;
        Ok(*found)
    }
}
