use crate::Arbitrary;
use crate::Seed;

/// identifies one generated input within one run: the run's seed and
/// the rep's position in the stream. canonical text form "seed:index"
/// is what failure reports print and the only option parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepKey {
    seed: Seed,
    index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rep key {input:?}: expected \"{{seed}}:{{index}}\"")]
pub struct KeyError {
    input: String,
}

impl RepKey {
    pub fn new(seed: Seed, index: u32) -> Self {
        Self { seed, index }
    }
    pub fn seed(&self) -> Seed {
        self.seed
    }
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for RepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.seed, self.index)
    }
}

impl std::str::FromStr for RepKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || KeyError {
            input: s.to_string(),
        };
        let (seed, index) = s.split_once(':').ok_or_else(bad)?;
        Ok(Self {
            seed: seed.parse().map_err(|_| bad())?,
            index: index.parse().map_err(|_| bad())?,
        })
    }
}

impl Arbitrary for RepKey {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        Self::new(rng.random(), rng.random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        for _ in 0..100 {
            let key = RepKey::random();
            let text = format!("{}", key);
            assert!(text.parse::<RepKey>().unwrap() == key);
        }
    }

    #[test]
    fn negative_seeds_parse() {
        let key = "-1866001691:239".parse::<RepKey>().unwrap();
        assert!(key.seed() == -1866001691);
        assert!(key.index() == 239);
    }

    #[test]
    fn malformed_keys_name_the_grammar() {
        for bad in ["", "12", "a:b", "1:2:3", "1:-2", "one:1"] {
            let err = bad.parse::<RepKey>().unwrap_err();
            assert!(format!("{}", err).contains("{seed}:{index}"));
        }
    }
}
