use super::config::ConfigError;
use super::coverage::CoverageReport;
use super::key::KeyError;
use super::key::RepKey;
use crate::build::Halt;

/// everything repeat_test can report. Pruned never appears here: it
/// is recovered inside the pick function; every other condition is
/// annotated with enough context to reproduce the run.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// a rep's test returned an error. carries the shrunk
    /// counterexample and the key that replays it.
    #[error("rep {key} failed: {cause}\n  counterexample: {shrunk}\n  rerun with only = \"{key}\"")]
    Rep {
        key: RepKey,
        shrunk: String,
        cause: anyhow::Error,
    },

    /// the generator broke its determinism contract: rebuilding the
    /// failing playout's replies produced something else.
    #[error("nondeterministic generator: rep {key} did not rebuild to the same value")]
    Nondeterministic { key: RepKey },

    /// the script or one of its filters starved the run.
    #[error(transparent)]
    Halted(#[from] Halt),

    /// the whole search ended without producing a single value.
    #[error("{script}: didn't generate any values in {tries} tries")]
    NoValues { script: String, tries: usize },

    /// only mode ran its one rep and the rep passed. failing anyway
    /// keeps a stray only from surviving into a committed test.
    #[error("only = \"{key}\" is set: rep {key} passed; remove the option to run the full suite")]
    OnlyRan { key: RepKey },

    /// only mode never reached the requested rep.
    #[error("only = \"{key}\" is set, but the rep stream ended at index {produced}")]
    OnlyMissed { key: RepKey, produced: u32 },

    #[error("{0}")]
    Coverage(CoverageReport),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Failure {
    /// the rep this failure is pinned to, when there is one.
    pub fn key(&self) -> Option<RepKey> {
        match self {
            Failure::Rep { key, .. } => Some(*key),
            Failure::Nondeterministic { key } => Some(*key),
            Failure::OnlyRan { key } => Some(*key),
            Failure::OnlyMissed { key, .. } => Some(*key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rep_failures_print_the_replay_key() {
        let failure = Failure::Rep {
            key: RepKey::new(1866001691, 239),
            shrunk: "42".to_string(),
            cause: anyhow::anyhow!("n is too big"),
        };
        let text = format!("{}", failure);
        assert!(text.contains("1866001691:239"));
        assert!(text.contains("42"));
        assert!(text.contains("n is too big"));
    }

    #[test]
    fn halted_failures_read_like_the_halt() {
        let failure = Failure::from(Halt::TooStrict {
            script: "odd".to_string(),
            tries: 1000,
        });
        assert!(format!("{}", failure).contains("didn't generate any values in 1000 tries"));
    }
}
