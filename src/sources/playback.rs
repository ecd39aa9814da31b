use super::Picker;
use crate::picks::request::PickRequest;
use crate::Reply;

/// replays a fixed reply sequence, then pads with request minimums
/// while remembering that it ran dry. replay under edits leans on the
/// padding: a truncated stream still rebuilds a value, and the caller
/// can ask afterwards whether the recording actually covered it.
#[derive(Debug, Clone)]
pub struct PlaybackPicker {
    replies: Vec<Reply>,
    offset: usize,
    exhausted: bool,
}

impl PlaybackPicker {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            offset: 0,
            exhausted: false,
        }
    }

    /// whether any pick ran past the recorded replies.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// picks served so far, padding included.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Picker for PlaybackPicker {
    fn pick(&mut self, request: &PickRequest) -> Reply {
        let reply = match self.replies.get(self.offset) {
            Some(reply) => request.clamp(*reply),
            None => {
                self.exhausted = true;
                request.min()
            }
        };
        self.offset += 1;
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_recorded_replies_in_order() {
        let mut picker = PlaybackPicker::new(vec![3, 1, 4]);
        let req = PickRequest::new(0, 9).unwrap();
        assert!(picker.pick(&req) == 3);
        assert!(picker.pick(&req) == 1);
        assert!(picker.pick(&req) == 4);
        assert!(!picker.exhausted());
    }

    #[test]
    fn empty_playback_yields_minimum_and_marks_exhausted() {
        let mut picker = PlaybackPicker::new(vec![]);
        let req = PickRequest::new(5, 9).unwrap();
        assert!(picker.pick(&req) == 5);
        assert!(picker.exhausted());
    }

    #[test]
    fn out_of_range_recordings_clamp_to_minimum() {
        let mut picker = PlaybackPicker::new(vec![42]);
        let req = PickRequest::new(0, 9).unwrap();
        assert!(picker.pick(&req) == 0);
        assert!(!picker.exhausted());
    }

    #[test]
    fn padding_continues_past_the_recording() {
        let mut picker = PlaybackPicker::new(vec![7]);
        let req = PickRequest::new(2, 9).unwrap();
        assert!(picker.pick(&req) == 7);
        assert!(picker.pick(&req) == 2);
        assert!(picker.pick(&req) == 2);
        assert!(picker.exhausted());
    }
}
