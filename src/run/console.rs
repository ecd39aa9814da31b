use super::coverage::Coverage;
use crate::Probability;

/// what a test body gets to talk to. log lines are buffered and only
/// surfaced when the rep fails; sometimes and check_odds feed the
/// run's coverage tallies and hand the condition back so tests can
/// branch on it.
pub struct TestConsole<'a> {
    coverage: &'a mut Coverage,
    lines: Vec<String>,
}

impl<'a> TestConsole<'a> {
    pub fn new(coverage: &'a mut Coverage) -> Self {
        Self {
            coverage,
            lines: Vec::new(),
        }
    }

    pub fn log(&mut self, message: impl std::fmt::Display) {
        self.lines.push(message.to_string());
    }

    /// record that the condition came out this way for this key, and
    /// pass it through. the run fails later if a key never saw both.
    pub fn sometimes(&mut self, key: &str, condition: bool) -> bool {
        self.coverage.sometimes(key, condition);
        condition
    }

    /// assert the long-run probability of the condition.
    pub fn check_odds(&mut self, key: &str, expected: Probability, condition: bool) -> bool {
        self.coverage.odds(key, expected, condition);
        condition
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
