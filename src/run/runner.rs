use super::config::Config;
use super::console::TestConsole;
use super::coverage::Coverage;
use super::failure::Failure;
use super::key::RepKey;
use crate::build::generate;
use crate::build::picks::PickOpts;
use crate::build::script::Script;
use crate::build::value::Gen;
use crate::shrink::shrinker::shrink;
use crate::sources::random::RandomPicker;
use crate::tree::ordered::OrderedTracker;
use crate::tree::partial::PartialTracker;
use crate::tree::source::PlayoutSource;
use crate::Seed;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

/// options for one repeat_test call. the config is passed by value
/// here rather than read from a global, so tests can pin their own
/// multiplier.
#[derive(Debug, Clone)]
pub struct RepOptions {
    pub reps: usize,
    pub seed: Option<Seed>,
    pub only: Option<RepKey>,
    pub limit: Option<usize>,
    pub config: Config,
}

impl Default for RepOptions {
    fn default() -> Self {
        Self {
            reps: crate::DEFAULT_REPS,
            seed: None,
            only: None,
            limit: None,
            config: Config::default(),
        }
    }
}

/// what to test: explicit examples, a generator, or examples followed
/// by a generator. examples always run first and occupy the leading
/// rep indexes.
pub struct TestInput<T> {
    examples: Vec<T>,
    script: Option<Arc<Script<T>>>,
}

impl<T: 'static> TestInput<T> {
    pub fn examples(examples: Vec<T>) -> Self {
        Self {
            examples,
            script: None,
        }
    }

    pub fn then(self, script: Script<T>) -> Self {
        Self {
            script: Some(Arc::new(script)),
            ..self
        }
    }
}

impl<T: 'static> From<Script<T>> for TestInput<T> {
    fn from(script: Script<T>) -> Self {
        TestInput::examples(vec![]).then(script)
    }
}

impl<T: 'static> From<Arc<Script<T>>> for TestInput<T> {
    fn from(script: Arc<Script<T>>) -> Self {
        Self {
            examples: vec![],
            script: Some(script),
        }
    }
}

impl<T: 'static> From<Vec<T>> for TestInput<T> {
    fn from(examples: Vec<T>) -> Self {
        TestInput::examples(examples)
    }
}

/// run the property against many inputs and report the smallest
/// counterexample found. the rep stream is: explicit examples, then
/// the ordered pass over the generator until it exhausts the space or
/// spends half the budget, then seeded random reps with deduplication
/// up to the scaled rep budget. rep keys are "seed:index" in stream
/// order with no gaps, so any failure replays from its key alone.
pub fn repeat_test<T, F>(
    input: impl Into<TestInput<T>>,
    test: F,
    opts: &RepOptions,
) -> Result<(), Failure>
where
    T: Clone + PartialEq + std::fmt::Debug + 'static,
    F: Fn(&T, &mut TestConsole) -> anyhow::Result<()>,
{
    let input = input.into();
    let seed = opts
        .only
        .map(|key| key.seed())
        .or(opts.seed)
        .unwrap_or_else(entropy);
    let budget = opts.config.budget(opts.reps);
    log::debug!("repeat_test: seed {} budget {}", seed, budget);
    let mut coverage = Coverage::new();
    let mut index: u32 = 0;

    for example in &input.examples {
        let key = RepKey::new(seed, index);
        index += 1;
        if skipped(opts.only, key) {
            continue;
        }
        let mut console = TestConsole::new(&mut coverage);
        if let Err(cause) = test(example, &mut console) {
            return Err(Failure::Rep {
                key,
                shrunk: format!("{:?}", example),
                cause,
            });
        }
        if opts.only.is_some() {
            return Err(Failure::OnlyRan { key });
        }
    }

    if let Some(script) = input.script.clone() {
        let pick_opts = PickOpts {
            limit: opts.limit,
            max_tries: crate::MAX_TRIES,
        };
        let mut generated: u32 = 0;
        let mut exhausted = false;

        // the ordered pass gets half the budget: small spaces exhaust
        // well inside it and prove themselves completely, while large
        // spaces hand the rest of the budget to the random pass.
        let ordered_cap = budget.div_ceil(2);
        let mut source = PlayoutSource::new(Box::new(OrderedTracker::new()));
        while (index as usize) < ordered_cap {
            match generate(&script, &mut source, &pick_opts)? {
                None => {
                    log::debug!("ordered search exhausted after {} reps", generated);
                    exhausted = true;
                    break;
                }
                Some(sample) => {
                    let key = RepKey::new(seed, index);
                    index += 1;
                    generated += 1;
                    judge(key, sample, &test, &mut coverage, opts.only)?;
                }
            }
        }

        if !exhausted {
            let picker = RandomPicker::seeded(stream_seed(seed));
            let mut source = PlayoutSource::new(Box::new(PartialTracker::new(Box::new(picker))));
            while (index as usize) < budget {
                match generate(&script, &mut source, &pick_opts)? {
                    None => break,
                    Some(sample) => {
                        let key = RepKey::new(seed, index);
                        index += 1;
                        generated += 1;
                        judge(key, sample, &test, &mut coverage, opts.only)?;
                    }
                }
            }
        }

        if generated == 0 && budget > 0 {
            return Err(Failure::NoValues {
                script: script.name().to_string(),
                tries: crate::MAX_TRIES,
            });
        }
    }

    if let Some(key) = opts.only {
        return Err(Failure::OnlyMissed {
            key,
            produced: index,
        });
    }
    coverage.check(&opts.config).map_err(Failure::Coverage)
}

fn skipped(only: Option<RepKey>, key: RepKey) -> bool {
    only.is_some_and(|target| target.index() != key.index())
}

/// test one generated rep. in only mode everything but the target is
/// generated and skipped; the target runs once and then the call
/// fails either way, so the option cannot silently pass.
fn judge<T, F>(
    key: RepKey,
    sample: Gen<T>,
    test: &F,
    coverage: &mut Coverage,
    only: Option<RepKey>,
) -> Result<(), Failure>
where
    T: Clone + PartialEq + std::fmt::Debug + 'static,
    F: Fn(&T, &mut TestConsole) -> anyhow::Result<()>,
{
    if skipped(only, key) {
        return Ok(());
    }
    let mut console = TestConsole::new(coverage);
    match test(sample.val(), &mut console) {
        Ok(()) => match only {
            Some(_) => Err(Failure::OnlyRan { key }),
            None => Ok(()),
        },
        Err(cause) => Err(report(key, sample, cause, test)),
    }
}

/// a rep failed: verify the generator is deterministic, shrink the
/// counterexample, replay the shrunk rep's console output, and wrap
/// everything up with the key that reproduces it.
fn report<T, F>(key: RepKey, sample: Gen<T>, cause: anyhow::Error, test: &F) -> Failure
where
    T: Clone + PartialEq + std::fmt::Debug + 'static,
    F: Fn(&T, &mut TestConsole) -> anyhow::Result<()>,
{
    log::info!("rep {} failed: {}", key, cause);
    match sample.regenerate() {
        None => return Failure::Nondeterministic { key },
        Some(again) if again.val() != sample.val() => return Failure::Nondeterministic { key },
        Some(_) => {}
    }
    let interesting = |val: &T| {
        let mut scratch = Coverage::new();
        let mut console = TestConsole::new(&mut scratch);
        test(val, &mut console).is_err()
    };
    let shrunk = shrink(sample, &interesting);
    let mut scratch = Coverage::new();
    let mut console = TestConsole::new(&mut scratch);
    let cause = match test(shrunk.val(), &mut console) {
        Err(shrunk_cause) => shrunk_cause,
        Ok(()) => cause,
    };
    for line in console.lines() {
        log::info!("console: {}", line);
    }
    Failure::Rep {
        key,
        shrunk: format!("{:?}", shrunk.val()),
        cause,
    }
}

/// an unseeded run still gets a reproducible key: whatever seed the
/// clock and ambient randomness land on is printed with any failure.
fn entropy() -> Seed {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .subsec_nanos();
    nanos as Seed ^ rand::random::<Seed>()
}

/// hashing the seed decorrelates the picker stream from the raw seed
/// value while staying deterministic and reproducible.
fn stream_seed(seed: Seed) -> u64 {
    let ref mut hasher = DefaultHasher::new();
    seed.hash(hasher);
    hasher.finish()
}
