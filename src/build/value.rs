use super::generate;
use super::picks::PickOpts;
use super::script::Script;
use crate::picks::playout::Playout;
use crate::shrink::edit::apply;
use crate::shrink::edit::StreamEditor;
use crate::tree::replay::ReplayTracker;
use crate::tree::source::PlayoutSource;
use crate::Reply;
use std::sync::Arc;

/// a value together with the playout that produced it and the script
/// that can produce it again. immutable; editing a playout rebuilds a
/// fresh Gen rather than touching this one. equality is structural on
/// the value, identity is the playout.
#[derive(Clone)]
pub struct Gen<T> {
    script: Arc<Script<T>>,
    playout: Playout,
    val: T,
}

/// a strict replay that could not honor the recording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("ran out of picks: consumed {consumed} but only {recorded} were recorded")]
    RanOutOfPicks { consumed: usize, recorded: usize },
    #[error("the script rejected the replayed picks")]
    Rejected,
}

impl<T: Clone + 'static> Gen<T> {
    /// capture a freshly built value. the playout is normalized so
    /// that a minimum tail, which padding regenerates for free, never
    /// distinguishes two otherwise equal playouts.
    pub(crate) fn new(script: Arc<Script<T>>, playout: Playout, val: T) -> Self {
        Self {
            script,
            playout: playout.normalized(),
            val,
        }
    }

    pub fn val(&self) -> &T {
        &self.val
    }

    pub fn into_val(self) -> T {
        self.val
    }

    pub fn playout(&self) -> &Playout {
        &self.playout
    }

    pub fn script(&self) -> &Arc<Script<T>> {
        &self.script
    }

    /// rebuild the script from a fixed reply sequence, padding with
    /// minimums past the end. None when the script rejects the picks.
    pub fn replay(script: &Arc<Script<T>>, replies: &[Reply]) -> Option<Self> {
        let mut source = PlayoutSource::new(Box::new(ReplayTracker::new(replies.to_vec())));
        match generate(script, &mut source, &PickOpts::default()) {
            Ok(Some(sample)) => Some(sample),
            _ => None,
        }
    }

    /// like replay, but refuse to pad: the recording must cover every
    /// pick the script makes.
    pub fn replay_strict(script: &Arc<Script<T>>, replies: &[Reply]) -> Result<Self, ReplayError> {
        let tracker = ReplayTracker::new(replies.to_vec());
        let probe = tracker.probe();
        let mut source = PlayoutSource::new(Box::new(tracker));
        match generate(script, &mut source, &PickOpts::default()) {
            Ok(Some(sample)) if !probe.exhausted() => Ok(sample),
            Ok(Some(_)) => Err(ReplayError::RanOutOfPicks {
                consumed: probe.consumed(),
                recorded: replies.len(),
            }),
            _ => Err(ReplayError::Rejected),
        }
    }

    /// rebuild under an edit. the editor visits every recorded pick;
    /// the edited reply stream drives a playback source through the
    /// script again. None when the script can no longer consume the
    /// edited picks. an edit that leaves a cachable script's stream
    /// untouched reuses the value without re-running the build.
    pub fn mutate(&self, editor: &mut dyn StreamEditor) -> Option<Self> {
        let edited = apply(editor, &self.playout);
        if edited == self.playout.replies() && self.script.is_cachable() {
            return Some(self.clone());
        }
        Self::replay(&self.script, &edited)
    }

    /// re-run the script on this playout's own replies. anything but
    /// an equal value means the generator broke its determinism
    /// contract.
    pub fn regenerate(&self) -> Option<Self> {
        Self::replay(&self.script, self.playout.replies())
    }
}

impl<T: PartialEq> PartialEq for Gen<T> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Gen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Gen({:?} from {})", self.val, self.playout)
    }
}
