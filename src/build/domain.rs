use super::script::Script;
use crate::picks::request::PickRequest;
use crate::Reply;

// the built-in generator catalog, all expressed over Script. nothing
// here is privileged: a user generator built from the same pick
// function shrinks and replays identically.

/// uniform integer in [min, max], with the biased hint so random
/// search occasionally visits the edges and the default.
pub fn int(min: Reply, max: Reply) -> Script<Reply> {
    let request = PickRequest::new(min, max)
        .expect("int range is valid")
        .biased();
    Script::new(format!("int({}, {})", min, max), move |p| p.pick(&request))
}

pub fn boolean() -> Script<bool> {
    let request = PickRequest::new(0, 1).expect("coin range is valid");
    Script::new("boolean", move |p| Ok(p.pick(&request)? == 1))
}

/// a present-or-absent wrapper: one {0, 1} guard pick, then the inner
/// script. the guard-then-group shape is what the option-removal
/// shrinker looks for, so the inner call keeps its span even when
/// short.
pub fn option_of<T: Clone + 'static>(inner: Script<T>) -> Script<Option<T>> {
    let name = format!("option({})", inner.name());
    let inner = inner.split_calls();
    let guard = PickRequest::new(0, 1).expect("guard range is valid");
    Script::new(name, move |p| match p.pick(&guard)? {
        0 => Ok(None),
        _ => Ok(Some(p.build(&inner)?)),
    })
}

/// a union that cannot choose anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnionError {
    #[error("one_of needs at least one alternative")]
    Empty,
    #[error("one_of needs a positive total weight")]
    ZeroWeight,
    #[error("total weight {total} exceeds the safe pick band")]
    WeightOverflow { total: u64 },
}

/// choose one alternative, weighted by each script's weight. a single
/// pick selects the branch, then the branch builds inside its own
/// span so it can be edited independently. fails when no alternative
/// is selectable: an empty list, or weights summing to zero.
pub fn one_of<T: Clone + 'static>(scripts: Vec<Script<T>>) -> Result<Script<T>, UnionError> {
    if scripts.is_empty() {
        return Err(UnionError::Empty);
    }
    let total = scripts.iter().map(|s| u64::from(s.weight())).sum::<u64>();
    if total == 0 {
        return Err(UnionError::ZeroWeight);
    }
    let request = PickRequest::new(0, total as Reply - 1)
        .map_err(|_| UnionError::WeightOverflow { total })?;
    Ok(Script::new("one_of", move |p| {
        let mut roll = p.pick(&request)?;
        for script in &scripts {
            roll -= Reply::from(script.weight());
            if roll < 0 {
                return p.build(script);
            }
        }
        unreachable!("roll is bounded by the total weight")
    }))
}

/// up to max elements, each preceded by a {0, 1} continue pick. the
/// minimum playout is the empty vector, and every element sits in its
/// own span for the shrinker to cut.
pub fn vec_of<T: Clone + 'static>(elem: Script<T>, max: usize) -> Script<Vec<T>> {
    let name = format!("vec({})", elem.name());
    let elem = elem.split_calls();
    let guard = PickRequest::new(0, 1).expect("guard range is valid");
    Script::new(name, move |p| {
        let mut items = Vec::new();
        while items.len() < max {
            match p.pick(&guard)? {
                0 => break,
                _ => items.push(p.build(&elem)?),
            }
        }
        Ok(items)
    })
}

/// unicode scalar values, defaulting to 'a' so minimal strings stay
/// printable. the pick range leaves out the surrogate gap.
pub fn character() -> Script<char> {
    const GAP: Reply = 0x800;
    const TOP: Reply = 0x10FFFF;
    let request = PickRequest::with_default(0, TOP - GAP, 'a' as Reply)
        .expect("scalar range is valid")
        .biased();
    Script::new("character", move |p| {
        let raw = p.pick(&request)?;
        let scalar = match raw {
            n if n >= 0xD800 => n + GAP,
            n => n,
        };
        Ok(char::from_u32(scalar as u32).expect("surrogates are excluded"))
    })
}

pub fn string(max: usize) -> Script<String> {
    vec_of(character(), max).map(|chars| chars.into_iter().collect())
}

/// build two scripts in sequence. records are tuples of fields; each
/// field keeps its own span so shrinking can edit one independently.
pub fn zip<A: Clone + 'static, B: Clone + 'static>(
    left: Script<A>,
    right: Script<B>,
) -> Script<(A, B)> {
    let name = format!("({}, {})", left.name(), right.name());
    Script::new(name, move |p| Ok((p.build(&left)?, p.build(&right)?)))
}

pub fn constant<T: Clone + 'static>(name: impl Into<String>, value: T) -> Script<T> {
    Script::constant(name, value)
}
