use super::config::Config;
use crate::Probability;
use std::collections::BTreeMap;

/// per-run tallies behind sometimes and check_odds. owned by one
/// repeat_test call and written only by the single active rep.
#[derive(Debug, Default)]
pub struct Coverage {
    sometimes: BTreeMap<String, Tally>,
    odds: BTreeMap<String, Odds>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Tally {
    yes: usize,
    no: usize,
}

#[derive(Debug, Clone, Copy)]
struct Odds {
    expected: Probability,
    tally: Tally,
}

impl Tally {
    fn observe(&mut self, outcome: bool) {
        match outcome {
            true => self.yes += 1,
            false => self.no += 1,
        }
    }
    pub fn yes(&self) -> usize {
        self.yes
    }
    pub fn no(&self) -> usize {
        self.no
    }
    pub fn total(&self) -> usize {
        self.yes + self.no
    }
    pub fn rate(&self) -> Probability {
        self.yes as Probability / self.total() as Probability
    }
}

/// one complaint from the end-of-run analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoverageError {
    #[error("sometimes({key:?}) was never true over {reps} reps")]
    NeverTrue { key: String, reps: usize },
    #[error("sometimes({key:?}) was never false over {reps} reps")]
    NeverFalse { key: String, reps: usize },
    #[error("sometimes({key:?}) was rarely true: p = {rate:.4} over {reps} reps")]
    RarelyTrue {
        key: String,
        rate: Probability,
        reps: usize,
    },
    #[error("sometimes({key:?}) was rarely false: p = {rate:.4} over {reps} reps")]
    RarelyFalse {
        key: String,
        rate: Probability,
        reps: usize,
    },
    #[error(
        "check_odds({key:?}) expected p = {expected}, observed {observed:.4} over {reps} reps (z = {z:.2})"
    )]
    OddsRejected {
        key: String,
        expected: Probability,
        observed: Probability,
        reps: usize,
        z: f64,
    },
    #[error("check_odds({key:?}) had insufficient samples: {reps} reps at expected p = {expected}")]
    InsufficientSamples {
        key: String,
        expected: Probability,
        reps: usize,
    },
}

/// every offending key from one analysis, reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport(pub Vec<CoverageError>);

impl std::fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "coverage analysis failed:")?;
        for problem in &self.0 {
            write!(f, "\n  {}", problem)?;
        }
        Ok(())
    }
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sometimes(&mut self, key: &str, outcome: bool) {
        self.sometimes
            .entry(key.to_string())
            .or_default()
            .observe(outcome);
    }

    pub fn odds(&mut self, key: &str, expected: Probability, outcome: bool) {
        let entry = self.odds.entry(key.to_string()).or_insert(Odds {
            expected,
            tally: Tally::default(),
        });
        debug_assert!(entry.expected == expected, "expected odds changed mid-run");
        entry.tally.observe(outcome);
    }

    pub fn tally(&self, key: &str) -> Option<Tally> {
        self.sometimes.get(key).copied()
    }

    /// end-of-run analysis. validity wants every sometimes key seen
    /// both ways; threshold analysis (amplified runs only) flags keys
    /// that are almost always one-sided; check_odds keys get a
    /// two-sided z-test against their expected probability once the
    /// normal approximation is defensible.
    pub fn check(&self, config: &Config) -> Result<(), CoverageReport> {
        let mut problems = Vec::new();
        for (key, tally) in &self.sometimes {
            let key = key.clone();
            let reps = tally.total();
            if config.validates_sometimes() {
                if tally.yes() == 0 {
                    problems.push(CoverageError::NeverTrue { key: key.clone(), reps });
                } else if tally.no() == 0 {
                    problems.push(CoverageError::NeverFalse { key: key.clone(), reps });
                }
            }
            if config.analyzes_thresholds() && reps >= crate::MIN_REPS_FOR_STATS {
                let rate = tally.rate();
                let threshold = crate::LOW_COVERAGE_THRESHOLD;
                if rate > 0.0 && rate < threshold {
                    problems.push(CoverageError::RarelyTrue { key, rate, reps });
                } else if (1.0 - rate) > 0.0 && (1.0 - rate) < threshold {
                    problems.push(CoverageError::RarelyFalse { key, rate, reps });
                }
            }
        }
        for (key, odds) in &self.odds {
            let n = odds.tally.total() as f64;
            let p = odds.expected;
            if n * p >= crate::NORMAL_APPROX_FLOOR && n * (1.0 - p) >= crate::NORMAL_APPROX_FLOOR {
                let observed = odds.tally.rate();
                let z = (observed - p) / (p * (1.0 - p) / n).sqrt();
                if z.abs() > crate::Z_CRITICAL {
                    problems.push(CoverageError::OddsRejected {
                        key: key.clone(),
                        expected: p,
                        observed,
                        reps: odds.tally.total(),
                        z,
                    });
                }
            } else if config.analyzes_thresholds() {
                problems.push(CoverageError::InsufficientSamples {
                    key: key.clone(),
                    expected: p,
                    reps: odds.tally.total(),
                });
            } else {
                log::warn!(
                    "check_odds({:?}) skipped: {} reps are too few for expected p = {}",
                    key,
                    odds.tally.total(),
                    p
                );
            }
        }
        match problems.is_empty() {
            true => Ok(()),
            false => Err(CoverageReport(problems)),
        }
    }
}
