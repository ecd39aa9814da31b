use super::Tracker;
use crate::picks::buffer::BufferError;
use crate::picks::buffer::PlayBuffer;
use crate::picks::playout::Playout;
use crate::picks::request::PickRequest;
use crate::Reply;

/// the state machine a pick function drives: a tracker choosing
/// replies, a buffer recording them, and three states. Ready sits
/// between playouts, Picking is inside one, and SearchDone means the
/// tracker has nothing left to visit.
pub struct PlayoutSource {
    tracker: Box<dyn Tracker>,
    buffer: PlayBuffer,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Picking,
    SearchDone,
}

/// why a pick could not be answered. Pruned is the cooperative
/// abandon-this-playout signal and is caught by the pick function;
/// a full pick log is a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceHalt {
    #[error("pruned")]
    Pruned,
    #[error("pick log full: {cap} picks recorded")]
    LogFull { cap: usize },
}

impl PlayoutSource {
    pub fn new(tracker: Box<dyn Tracker>) -> Self {
        Self {
            tracker,
            buffer: PlayBuffer::new(),
            state: State::Ready,
        }
    }

    pub fn depth(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_done(&self) -> bool {
        self.state == State::SearchDone
    }

    pub fn requests(&self) -> &[PickRequest] {
        self.buffer.requests()
    }

    pub fn replies(&self) -> &[Reply] {
        self.buffer.replies()
    }

    /// begin a playout sharing the first `depth` picks with the
    /// current one. starting over mid-playout first commits what the
    /// tracker has seen, so abandoned paths still count as visited.
    pub fn start_at(&mut self, depth: usize) -> bool {
        if self.state == State::SearchDone || depth > self.depth() {
            return false;
        }
        if self.state == State::Picking {
            let _ = self.tracker.end_playout();
        }
        match self.tracker.start_at(depth) {
            true => {
                self.buffer.truncate(depth);
                self.state = State::Picking;
                true
            }
            false => {
                // refusing one resume depth is not the end of the
                // search; only the tracker saying so is.
                self.state = match self.tracker.done() {
                    true => State::SearchDone,
                    false => State::Ready,
                };
                false
            }
        }
    }

    /// answer and record one pick. a pruned reply implicitly ends the
    /// playout and puts the source back between playouts.
    pub fn next_pick(&mut self, request: &PickRequest) -> Result<Reply, SourceHalt> {
        debug_assert!(self.state == State::Picking, "pick outside a playout");
        match self.tracker.next_pick(request) {
            None => {
                self.state = State::Ready;
                Err(SourceHalt::Pruned)
            }
            Some(reply) => match self.buffer.push(*request, reply) {
                Ok(()) => Ok(reply),
                Err(_) => {
                    self.state = State::Ready;
                    Err(SourceHalt::LogFull {
                        cap: crate::PICK_LOG_CAP,
                    })
                }
            },
        }
    }

    /// commit the playout. the tracker may still reject it, e.g. an
    /// ordered pass declining a playout an earlier pass already ran.
    pub fn end_playout(&mut self) -> bool {
        debug_assert!(self.state == State::Picking, "end outside a playout");
        self.state = State::Ready;
        self.tracker.end_playout()
    }

    pub fn start_span(&mut self) -> usize {
        self.buffer.start_span()
    }

    pub fn end_span(&mut self, level: usize) -> Result<(), BufferError> {
        self.buffer.end_span(level)
    }

    pub fn end_span_exact(&mut self, level: usize) -> Result<(), BufferError> {
        self.buffer.end_span_exact(level)
    }

    pub fn cancel_span(&mut self, level: usize) -> Result<(), BufferError> {
        self.buffer.cancel_span(level)
    }

    /// snapshot the recorded playout. fails while spans remain open.
    pub fn playout(&self) -> Result<Playout, BufferError> {
        self.buffer.playout()
    }
}
