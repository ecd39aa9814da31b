use super::Tracker;
use crate::picks::request::PickRequest;
use crate::sources::playback::PlaybackPicker;
use crate::sources::Picker;
use crate::Reply;
use std::cell::Cell;
use std::rc::Rc;

/// drives exactly one playout off a recorded reply sequence, padding
/// with minimums past the end. rebuilding a value under an edit and
/// the runner's determinism check both run through this tracker.
pub struct ReplayTracker {
    picker: PlaybackPicker,
    played: bool,
    probe: Rc<ReplayProbe>,
}

/// observable outcome of a replay, shared with whoever started it.
#[derive(Debug, Default)]
pub struct ReplayProbe {
    exhausted: Cell<bool>,
    consumed: Cell<usize>,
}

impl ReplayProbe {
    /// whether the script consumed more picks than were recorded.
    pub fn exhausted(&self) -> bool {
        self.exhausted.get()
    }
    pub fn consumed(&self) -> usize {
        self.consumed.get()
    }
}

impl ReplayTracker {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            picker: PlaybackPicker::new(replies),
            played: false,
            probe: Rc::new(ReplayProbe::default()),
        }
    }

    pub fn probe(&self) -> Rc<ReplayProbe> {
        self.probe.clone()
    }
}

impl Tracker for ReplayTracker {
    fn depth(&self) -> usize {
        self.picker.offset()
    }

    fn done(&self) -> bool {
        self.played
    }

    /// one shot: a replayed script that rejects its own picks would
    /// reject them again, so there is nothing to retry.
    fn start_at(&mut self, depth: usize) -> bool {
        match (self.played, depth) {
            (false, 0) => {
                self.played = true;
                true
            }
            _ => false,
        }
    }

    fn next_pick(&mut self, request: &PickRequest) -> Option<Reply> {
        let reply = self.picker.pick(request);
        self.probe.exhausted.set(self.picker.exhausted());
        self.probe.consumed.set(self.picker.offset());
        Some(reply)
    }

    fn end_playout(&mut self) -> bool {
        true
    }
}
