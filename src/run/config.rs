/// process-scoped knobs, parsed once and passed into the runner by
/// value. no global state: tests that want a different multiplier
/// construct their own Config instead of mutating the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid REPS value {input:?}: expected \"N%\", \"Nx\", or \"0\"")]
pub struct ConfigError {
    input: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl Config {
    /// read the REPS environment variable. errors here are fatal at
    /// load time; an absent variable means the default multiplier.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("REPS") {
            Ok(reps) => Self::parse(&reps),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError {
                input: "<not unicode>".to_string(),
            }),
        }
    }

    /// accepted forms: "N%" scales by N/100, "Nx" scales by N, and
    /// "0" skips random reps outright. N must be non-negative and
    /// finite.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError {
            input: input.to_string(),
        };
        let multiplier = if input == "0" {
            0.0
        } else if let Some(percent) = input.strip_suffix('%') {
            percent.parse::<f64>().map_err(|_| bad())? / 100.0
        } else if let Some(factor) = input.strip_suffix('x') {
            factor.parse::<f64>().map_err(|_| bad())?
        } else {
            return Err(bad());
        };
        match multiplier.is_finite() && multiplier >= 0.0 {
            true => Ok(Self { multiplier }),
            false => Err(bad()),
        }
    }

    /// explicit override for tests, per the no-global-mutation rule.
    pub fn with_multiplier(multiplier: f64) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// the rep budget after scaling.
    pub fn budget(&self, base: usize) -> usize {
        (base as f64 * self.multiplier).floor() as usize
    }

    /// a reduced run skips the sometimes-validity check: too few reps
    /// to demand both outcomes of every key.
    pub fn validates_sometimes(&self) -> bool {
        self.multiplier >= 1.0
    }

    /// an amplified run has enough observations to judge how rare an
    /// outcome is, and to insist check_odds keys were actually fed.
    pub fn analyzes_thresholds(&self) -> bool {
        self.multiplier > 1.0
    }
}
