pub mod domain;
pub mod picks;
pub mod script;
pub mod value;

use self::picks::PickOpts;
use self::picks::Picks;
use self::script::Script;
use self::value::Gen;
use crate::tree::source::PlayoutSource;
use crate::tree::source::SourceHalt;
use std::sync::Arc;

/// why a build stopped short. Pruned is recoverable: the pick function
/// retries it at the same depth. the others propagate to the runner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Halt {
    #[error("pruned")]
    Pruned,
    #[error("{script}: didn't generate any values in {tries} tries")]
    TooStrict { script: String, tries: usize },
    #[error("pick log full: {cap} picks recorded")]
    LogFull { cap: usize },
}

pub type Picked<T> = Result<T, Halt>;

impl From<SourceHalt> for Halt {
    fn from(halt: SourceHalt) -> Self {
        match halt {
            SourceHalt::Pruned => Halt::Pruned,
            SourceHalt::LogFull { cap } => Halt::LogFull { cap },
        }
    }
}

/// run the script against the source until one playout survives to a
/// value, the search exhausts (None), or the build fails hard. pruned
/// playouts do not count against anything here: the tracker either
/// offers another playout or reports the search done.
pub fn generate<T: Clone + 'static>(
    script: &Arc<Script<T>>,
    source: &mut PlayoutSource,
    opts: &PickOpts,
) -> Result<Option<Gen<T>>, Halt> {
    loop {
        if !source.start_at(0) {
            return Ok(None);
        }
        let mut picks = Picks::new(source, opts);
        match picks.build(script) {
            Ok(val) => {
                if source.end_playout() {
                    let playout = source.playout().expect("spans balanced after build");
                    return Ok(Some(Gen::new(script.clone(), playout, val)));
                }
            }
            Err(Halt::Pruned) => continue,
            Err(halt) => return Err(halt),
        }
    }
}
