use super::picks::Picks;
use super::Picked;
use std::sync::Arc;
use std::sync::OnceLock;

/// a generator: a named, deterministic function of a pick function.
/// the same requests answered with the same replies must build the
/// same value; everything else (replay, shrinking, rep keys) leans on
/// that contract.
///
/// flags: cachable values may be reused when an edit leaves the pick
/// stream untouched; split_calls records this script's call boundaries
/// as spans even when short; weight biases weighted unions.
pub struct Script<T> {
    name: String,
    weight: u32,
    cachable: bool,
    split_calls: bool,
    build: Arc<dyn Fn(&mut Picks) -> Picked<T>>,
    accept: Option<Arc<dyn Fn(&T) -> bool>>,
}

impl<T> Clone for Script<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            weight: self.weight,
            cachable: self.cachable,
            split_calls: self.split_calls,
            build: self.build.clone(),
            accept: self.accept.clone(),
        }
    }
}

impl<T: 'static> Script<T> {
    pub fn new(name: impl Into<String>, build: impl Fn(&mut Picks) -> Picked<T> + 'static) -> Self {
        Self {
            name: name.into(),
            weight: 1,
            cachable: false,
            split_calls: false,
            build: Arc::new(build),
            accept: None,
        }
    }

    /// a zero-pick script that always builds the same value.
    pub fn constant(name: impl Into<String>, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(name, move |_| Ok(value.clone()))
    }

    /// a script resolved on first use. breaks definition cycles for
    /// recursive generators: hold the inner script by handle, and let
    /// the pick depth limit bound the recursion.
    pub fn lazy(name: impl Into<String>, init: impl Fn() -> Script<T> + 'static) -> Self {
        let cell: Arc<OnceLock<Script<T>>> = Arc::new(OnceLock::new());
        Self::new(name, move |picks| {
            picks.build(cell.get_or_init(&init))
        })
    }

    /// pipe built values through f.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Script<U> {
        let name = format!("{}.map", self.name);
        Script::new(name, move |picks| picks.build(&self).map(&f))
    }

    /// keep only values the predicate accepts. rejection abandons the
    /// playout and retries; a predicate that rejects everything will
    /// eventually surface as too strict.
    pub fn filter(self, label: impl Into<String>, accept: impl Fn(&T) -> bool + 'static) -> Self {
        let mut wrapper = Self::new(label, move |picks| picks.build(&self));
        wrapper.accept = Some(Arc::new(accept));
        wrapper
    }

    pub fn weighted(self, weight: u32) -> Self {
        Self { weight, ..self }
    }

    pub fn cachable(self) -> Self {
        Self {
            cachable: true,
            ..self
        }
    }

    pub fn split_calls(self) -> Self {
        Self {
            split_calls: true,
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn weight(&self) -> u32 {
        self.weight
    }
    pub fn is_cachable(&self) -> bool {
        self.cachable
    }
    pub fn splits_calls(&self) -> bool {
        self.split_calls
    }

    pub fn run(&self, picks: &mut Picks) -> Picked<T> {
        (self.build)(picks)
    }

    pub fn accepts(&self, val: &T) -> bool {
        match &self.accept {
            Some(accept) => accept(val),
            None => true,
        }
    }
}

impl<T> std::fmt::Debug for Script<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Script({})", self.name)
    }
}

impl<T> std::fmt::Display for Script<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
