pub mod build;
pub mod picks;
pub mod run;
pub mod shrink;
pub mod sources;
pub mod tree;

/// dimensional analysis types
pub type Reply = i64;
pub type Seed = i32;
pub type Probability = f64;

// pick protocol parameters
const MAX_SAFE_PICK: i64 = (1 << 53) - 1;
const PICK_LOG_CAP: usize = 10_000;

// search tree parameters
const UNTRACKED_WIDTH: u64 = 0x1000;
const PICKER_RETRIES: usize = 3;

// generation parameters
const MAX_TRIES: usize = 1_000;
const BIAS_DIE: u64 = 20;
const BIAS_FLOOR: u64 = 10;

// runner parameters
const DEFAULT_REPS: usize = 1_000;

// coverage parameters
const MIN_REPS_FOR_STATS: usize = 100;
const LOW_COVERAGE_THRESHOLD: Probability = 0.05;
const NORMAL_APPROX_FLOOR: f64 = 5.0;
const Z_CRITICAL: f64 = 3.0;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}
