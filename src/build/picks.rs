use super::script::Script;
use super::Halt;
use super::Picked;
use crate::picks::request::PickRequest;
use crate::tree::source::PlayoutSource;
use crate::Reply;

/// options threaded through one build. the limit caps pick depth by
/// narrowing deeper requests to their minimum, which is what bounds
/// recursive generators; max_tries caps filter retries.
#[derive(Debug, Clone)]
pub struct PickOpts {
    pub limit: Option<usize>,
    pub max_tries: usize,
}

impl Default for PickOpts {
    fn default() -> Self {
        Self {
            limit: None,
            max_tries: crate::MAX_TRIES,
        }
    }
}

/// middleware may swap in a narrower request before the source sees
/// it. shrinking and biased search hook in here.
pub type Middleware<'a> = &'a dyn Fn(&PickRequest, usize) -> PickRequest;

/// the pick function: what a script's build sees. dispatches the two
/// kinds of target, a ranged request or a sub-script call, against
/// one playout source, recording call structure as spans.
pub struct Picks<'a> {
    source: &'a mut PlayoutSource,
    opts: &'a PickOpts,
    middleware: Option<Middleware<'a>>,
}

impl<'a> Picks<'a> {
    pub fn new(source: &'a mut PlayoutSource, opts: &'a PickOpts) -> Self {
        Self {
            source,
            opts,
            middleware: None,
        }
    }

    pub fn with_middleware(
        source: &'a mut PlayoutSource,
        opts: &'a PickOpts,
        middleware: Middleware<'a>,
    ) -> Self {
        Self {
            source,
            opts,
            middleware: Some(middleware),
        }
    }

    pub fn depth(&self) -> usize {
        self.source.depth()
    }

    /// answer one ranged request. past the depth limit the request
    /// narrows to its minimum; a pruned playout propagates by `?` out
    /// to the nearest enclosing build.
    pub fn pick(&mut self, request: &PickRequest) -> Picked<Reply> {
        let depth = self.source.depth();
        let request = match self.middleware {
            Some(middleware) => middleware(request, depth),
            None => *request,
        };
        let request = match self.opts.limit {
            Some(limit) if depth >= limit => PickRequest::exactly(request.min()),
            _ => request,
        };
        Ok(self.source.next_pick(&request)?)
    }

    /// run a sub-script, recording its picks as a span. a pruned
    /// playout inside retries from this call's depth; values the
    /// script's filter rejects are cancelled and retried the same way.
    /// exhausting the retry budget means the filter is too strict.
    pub fn build<T: 'static>(&mut self, script: &Script<T>) -> Picked<T> {
        let depth = self.source.depth();
        for tries in 1..=self.opts.max_tries {
            let level = self.source.start_span();
            match script.run(self) {
                Ok(val) if script.accepts(&val) => {
                    match script.splits_calls() {
                        true => self.source.end_span_exact(level),
                        false => self.source.end_span(level),
                    }
                    .expect("span levels are balanced");
                    return Ok(val);
                }
                Ok(_) => {
                    self.source
                        .cancel_span(level)
                        .expect("span levels are balanced");
                    log::trace!("{} rejected a value (try {})", script, tries);
                }
                Err(Halt::Pruned) => {
                    self.source
                        .cancel_span(level)
                        .expect("span levels are balanced");
                }
                Err(halt) => {
                    let _ = self.source.cancel_span(level);
                    return Err(halt);
                }
            }
            if !self.source.start_at(depth) {
                return Err(Halt::Pruned);
            }
        }
        Err(Halt::TooStrict {
            script: script.name().to_string(),
            tries: self.opts.max_tries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::random::RandomPicker;
    use crate::tree::partial::PartialTracker;

    fn source(seed: u64) -> PlayoutSource {
        PlayoutSource::new(Box::new(PartialTracker::new(Box::new(
            RandomPicker::seeded(seed),
        ))))
    }

    #[test]
    fn limit_narrows_deep_picks_to_their_minimum() {
        let mut source = source(1);
        assert!(source.start_at(0));
        let opts = PickOpts {
            limit: Some(2),
            ..PickOpts::default()
        };
        let mut picks = Picks::new(&mut source, &opts);
        let req = PickRequest::new(3, 9).unwrap();
        let _ = picks.pick(&req).unwrap();
        let _ = picks.pick(&req).unwrap();
        assert!(picks.pick(&req).unwrap() == 3);
        assert!(picks.pick(&req).unwrap() == 3);
    }

    #[test]
    fn middleware_substitutes_the_request() {
        let mut source = source(1);
        assert!(source.start_at(0));
        let opts = PickOpts::default();
        let narrow = |request: &PickRequest, _: usize| PickRequest::exactly(request.max());
        let mut picks = Picks::with_middleware(&mut source, &opts, &narrow);
        let req = PickRequest::new(0, 9).unwrap();
        assert!(picks.pick(&req).unwrap() == 9);
    }

    #[test]
    fn sub_scripts_record_spans() {
        let pair = Script::new("pair", |p| {
            let req = PickRequest::new(0, 9).unwrap();
            Ok((p.pick(&req)?, p.pick(&req)?))
        });
        let triple = Script::new("triple", move |p| {
            let req = PickRequest::new(0, 9).unwrap();
            let head = p.pick(&req)?;
            let tail = p.build(&pair)?;
            Ok((head, tail))
        });
        let mut source = source(1);
        assert!(source.start_at(0));
        let opts = PickOpts::default();
        let mut picks = Picks::new(&mut source, &opts);
        let _ = picks.build(&triple).unwrap();
        assert!(source.end_playout());
        let playout = source.playout().unwrap();
        assert!(playout.len() == 3);
        assert!(playout.spans().iter().any(|s| s.start() == 1 && s.end() == 3));
    }

    #[test]
    fn filter_retries_preserve_the_prefix() {
        let odd = Script::new("digit", |p| p.pick(&PickRequest::new(0, 9).unwrap()))
            .filter("odd", |n| n % 2 == 1);
        let script = Script::new("pair", move |p| {
            let head = p.pick(&PickRequest::new(0, 9).unwrap())?;
            let tail = p.build(&odd)?;
            Ok((head, tail))
        });
        let mut source = source(7);
        assert!(source.start_at(0));
        let opts = PickOpts::default();
        let mut picks = Picks::new(&mut source, &opts);
        let (_, tail) = picks.build(&script).unwrap();
        assert!(tail % 2 == 1);
        assert!(source.end_playout());
        assert!(source.playout().unwrap().len() == 2);
    }
}
