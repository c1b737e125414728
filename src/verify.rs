use crate::error::{Result, SearchError};
use crate::miller_rabin::is_probable_prime;
use crate::random_source::RandomSource;
use num_bigint::BigUint;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct VerifyConfig {
    pub rounds: u32,
    pub seed: u64,
    /// When set, every line must have exactly this many digits.
    pub digits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineProblem {
    Malformed(String),
    WrongDigits { expected: u32, actual: usize },
    Composite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line_number: usize,
    pub problem: LineProblem,
}

#[derive(Debug, Default)]
pub struct VerifyResult {
    pub lines_checked: usize,
    pub failures: Vec<LineFailure>,
}

impl VerifyResult {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse one output line: ASCII digits only, no sign, no leading zero.
pub fn parse_line(line: &str) -> Result<BigUint> {
    let text = line.trim_end_matches('\r');
    let well_formed = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if !well_formed {
        return Err(SearchError::InvalidNumber(text.to_string()));
    }
    text.parse()
        .map_err(|_| SearchError::InvalidNumber(text.to_string()))
}

fn check_line(line: &str, config: &VerifyConfig, random: &RandomSource) -> Option<LineProblem> {
    let n = match parse_line(line) {
        Ok(n) => n,
        Err(_) => return Some(LineProblem::Malformed(line.to_string())),
    };

    if let Some(expected) = config.digits {
        let actual = line.trim_end_matches('\r').len();
        if actual != expected as usize {
            return Some(LineProblem::WrongDigits { expected, actual });
        }
    }

    if !is_probable_prime(&n, config.rounds, random) {
        return Some(LineProblem::Composite);
    }
    None
}

/// Re-test every line of a prime output file
///
/// Each line is parsed as a decimal integer and run through Miller-Rabin with
/// a fresh witness stream seeded from `config.seed`. Lines that do not parse,
/// have the wrong digit count, or are proven composite are collected as
/// failures; the check does not stop at the first one.
pub fn verify_file<F>(path: &Path, config: &VerifyConfig, mut progress_callback: F) -> Result<VerifyResult>
where
    F: FnMut(usize, Option<&LineProblem>),
{
    let reader = BufReader::new(File::open(path)?);
    let random = RandomSource::new(config.seed);
    let mut result = VerifyResult::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        result.lines_checked += 1;

        let problem = check_line(&line, config, &random);
        progress_callback(line_number, problem.as_ref());
        if let Some(problem) = problem {
            result.failures.push(LineFailure {
                line_number,
                problem,
            });
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config() -> VerifyConfig {
        VerifyConfig {
            rounds: 20,
            seed: 1,
            digits: None,
        }
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("1000000007").unwrap(), BigUint::from(1_000_000_007u64));
        assert_eq!(parse_line("17\r").unwrap(), BigUint::from(17u32));
        assert!(parse_line("").is_err());
        assert!(parse_line("-7").is_err());
        assert!(parse_line("+7").is_err());
        assert!(parse_line("007").is_err());
        assert!(parse_line("12a").is_err());
        assert!(parse_line(" 13").is_err());
    }

    #[test]
    fn test_clean_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        fs::write(&path, "1000000007\n1000000009\n9999999967\n").unwrap();

        let result = verify_file(&path, &VerifyConfig { digits: Some(10), ..config() }, |_, _| {}).unwrap();
        assert_eq!(result.lines_checked, 3);
        assert!(result.is_clean());
    }

    #[test]
    fn test_reports_each_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        // 1000000011 is divisible by 3; 10007 is prime but five digits.
        fs::write(&path, "1000000007\n1000000011\nabc\n10007\n").unwrap();

        let mut reported = Vec::new();
        let result = verify_file(&path, &VerifyConfig { digits: Some(10), ..config() }, |line, problem| {
            if problem.is_some() {
                reported.push(line);
            }
        })
        .unwrap();

        assert_eq!(result.lines_checked, 4);
        assert_eq!(reported, vec![2, 3, 4]);
        assert_eq!(
            result.failures,
            vec![
                LineFailure { line_number: 2, problem: LineProblem::Composite },
                LineFailure { line_number: 3, problem: LineProblem::Malformed("abc".to_string()) },
                LineFailure {
                    line_number: 4,
                    problem: LineProblem::WrongDigits { expected: 10, actual: 5 },
                },
            ]
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_file(&dir.path().join("nope.txt"), &config(), |_, _| {}).unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }
}
