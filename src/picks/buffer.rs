use super::playout::Playout;
use super::playout::Span;
use super::request::PickRequest;
use crate::Reply;

/// append-only recorder for the picks of one playout in flight.
/// spans open and close LIFO; closing a span that recorded nothing
/// interesting elides it, so the rendered playout looks the same
/// whether or not a single pick was wrapped in a span of its own.
#[derive(Debug, Default)]
pub struct PlayBuffer {
    requests: Vec<PickRequest>,
    replies: Vec<Reply>,
    spans: Vec<Span>,
    open: Vec<OpenSpan>,
}

#[derive(Debug)]
struct OpenSpan {
    start: usize,
    closed_below: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("pick log full: {cap} picks recorded")]
    PickLogFull { cap: usize },
    #[error("span level mismatch: asked to close level {asked} but {open} spans are open")]
    NoSpan { asked: usize, open: usize },
    #[error("{count} spans still open")]
    OpenSpans { count: usize },
}

impl PlayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
    pub fn requests(&self) -> &[PickRequest] {
        &self.requests
    }
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    /// record one answered request. O(1), bounded by the log cap.
    pub fn push(&mut self, request: PickRequest, reply: Reply) -> Result<(), BufferError> {
        if self.replies.len() >= crate::PICK_LOG_CAP {
            return Err(BufferError::PickLogFull {
                cap: crate::PICK_LOG_CAP,
            });
        }
        self.requests.push(request);
        self.replies.push(reply);
        Ok(())
    }

    /// open a span at the current position. returns the nesting level
    /// that the matching end_span or cancel_span must present.
    pub fn start_span(&mut self) -> usize {
        self.open.push(OpenSpan {
            start: self.replies.len(),
            closed_below: self.spans.len(),
        });
        self.open.len()
    }

    /// close the most recent open span, eliding it when trivial:
    /// shorter than 2 picks, or wrapping exactly one immediately
    /// nested span with identical bounds.
    pub fn end_span(&mut self, level: usize) -> Result<(), BufferError> {
        self.close(level, false)
    }

    /// close without elision. call boundaries of split-call scripts
    /// stay visible even when short.
    pub fn end_span_exact(&mut self, level: usize) -> Result<(), BufferError> {
        self.close(level, true)
    }

    fn close(&mut self, level: usize, keep: bool) -> Result<(), BufferError> {
        if level != self.open.len() || level == 0 {
            return Err(BufferError::NoSpan {
                asked: level,
                open: self.open.len(),
            });
        }
        let opened = self.open.pop().expect("level matches open stack");
        let span = Span::new(opened.start, self.replies.len());
        let trivial = span.len() < 2;
        let redundant = self.spans.len() > opened.closed_below
            && self.spans.last() == Some(&span);
        if keep || !(trivial || redundant) {
            self.spans.push(span);
        }
        Ok(())
    }

    /// abandon the most recent open span, discarding every pick and
    /// span recorded since it opened.
    pub fn cancel_span(&mut self, level: usize) -> Result<(), BufferError> {
        if level != self.open.len() || level == 0 {
            return Err(BufferError::NoSpan {
                asked: level,
                open: self.open.len(),
            });
        }
        let opened = self.open.pop().expect("level matches open stack");
        self.requests.truncate(opened.start);
        self.replies.truncate(opened.start);
        self.spans.truncate(opened.closed_below);
        Ok(())
    }

    /// increment the last reply within its request's range, wrapping
    /// from max back to min. returns the new reply, or None when the
    /// buffer is empty.
    pub fn rotate_last_pick(&mut self) -> Option<Reply> {
        let request = self.requests.last()?;
        let reply = self.replies.last_mut()?;
        *reply = match *reply {
            r if r >= request.max() => request.min(),
            r => r + 1,
        };
        Some(*reply)
    }

    /// drop everything past the first n picks. the committed prefix of
    /// a playout survives a retry; anything later belonged to spans the
    /// pick function already cancelled.
    pub fn truncate(&mut self, n: usize) {
        debug_assert!(self.open.iter().all(|s| s.start <= n));
        self.requests.truncate(n);
        self.replies.truncate(n);
        self.spans.retain(|s| s.end() <= n && s.start() < n);
        self.open.retain(|s| s.start <= n);
    }

    /// snapshot the finished playout. fails while spans remain open.
    pub fn playout(&self) -> Result<Playout, BufferError> {
        match self.open.len() {
            0 => Ok(Playout::new(
                self.requests.clone(),
                self.replies.clone(),
                self.spans.clone(),
            )),
            count => Err(BufferError::OpenSpans { count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picks::nested::Nest;

    fn req(min: Reply, max: Reply) -> PickRequest {
        PickRequest::new(min, max).unwrap()
    }

    #[test]
    fn records_parallel_sequences() {
        let mut buffer = PlayBuffer::new();
        buffer.push(req(0, 9), 3).unwrap();
        buffer.push(req(0, 9), 7).unwrap();
        assert!(buffer.replies() == &[3, 7]);
        assert!(buffer.playout().unwrap().len() == 2);
    }

    #[test]
    fn overflow_fails_with_log_full() {
        let mut buffer = PlayBuffer::new();
        for _ in 0..crate::PICK_LOG_CAP {
            buffer.push(req(0, 9), 0).unwrap();
        }
        assert!(matches!(
            buffer.push(req(0, 9), 0),
            Err(BufferError::PickLogFull { .. })
        ));
    }

    #[test]
    fn spans_close_lifo() {
        let mut buffer = PlayBuffer::new();
        let outer = buffer.start_span();
        buffer.push(req(0, 9), 1).unwrap();
        let inner = buffer.start_span();
        assert!(buffer.end_span(outer).is_err());
        assert!(buffer.end_span(inner).is_ok());
        assert!(buffer.end_span(outer).is_ok());
    }

    #[test]
    fn short_spans_are_elided() {
        let mut buffer = PlayBuffer::new();
        let level = buffer.start_span();
        buffer.push(req(0, 9), 1).unwrap();
        buffer.end_span(level).unwrap();
        assert!(buffer.playout().unwrap().spans().is_empty());
    }

    #[test]
    fn redundant_wrappers_are_elided() {
        let mut buffer = PlayBuffer::new();
        let outer = buffer.start_span();
        let inner = buffer.start_span();
        buffer.push(req(0, 9), 1).unwrap();
        buffer.push(req(0, 9), 2).unwrap();
        buffer.end_span(inner).unwrap();
        buffer.end_span(outer).unwrap();
        assert!(buffer.playout().unwrap().spans().len() == 1);
    }

    #[test]
    fn exact_spans_survive_elision() {
        let mut buffer = PlayBuffer::new();
        let level = buffer.start_span();
        buffer.push(req(0, 9), 1).unwrap();
        buffer.end_span_exact(level).unwrap();
        assert!(buffer.playout().unwrap().spans().len() == 1);
    }

    #[test]
    fn wrapping_a_single_pick_changes_nothing() {
        let mut wrapped = PlayBuffer::new();
        wrapped.push(req(0, 9), 4).unwrap();
        let level = wrapped.start_span();
        wrapped.push(req(0, 9), 7).unwrap();
        wrapped.end_span(level).unwrap();
        let mut bare = PlayBuffer::new();
        bare.push(req(0, 9), 4).unwrap();
        bare.push(req(0, 9), 7).unwrap();
        let wrapped = Nest::from(&wrapped.playout().unwrap());
        let bare = Nest::from(&bare.playout().unwrap());
        assert!(wrapped == bare);
    }

    #[test]
    fn cancel_discards_picks_and_spans() {
        let mut buffer = PlayBuffer::new();
        buffer.push(req(0, 9), 1).unwrap();
        let level = buffer.start_span();
        buffer.push(req(0, 9), 2).unwrap();
        let inner = buffer.start_span();
        buffer.push(req(0, 9), 3).unwrap();
        buffer.push(req(0, 9), 4).unwrap();
        buffer.end_span(inner).unwrap();
        buffer.cancel_span(level).unwrap();
        assert!(buffer.replies() == &[1]);
        assert!(buffer.playout().unwrap().spans().is_empty());
    }

    #[test]
    fn rotation_wraps_to_minimum() {
        let mut buffer = PlayBuffer::new();
        buffer.push(req(3, 5), 4).unwrap();
        assert!(buffer.rotate_last_pick() == Some(5));
        assert!(buffer.rotate_last_pick() == Some(3));
        assert!(buffer.rotate_last_pick() == Some(4));
    }

    #[test]
    fn open_spans_block_capture() {
        let mut buffer = PlayBuffer::new();
        let _ = buffer.start_span();
        assert!(matches!(
            buffer.playout(),
            Err(BufferError::OpenSpans { count: 1 })
        ));
    }
}
