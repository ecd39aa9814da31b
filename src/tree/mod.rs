pub mod ordered;
pub mod partial;
pub mod replay;
pub mod slot;
pub mod source;

use crate::picks::request::PickRequest;
use crate::Reply;

/// a strategy for walking the space of playouts. a tracker hands out
/// one reply per request, remembers enough about past playouts to
/// steer future ones, and decides when the whole search is finished.
///
/// within one playout picks are linearly ordered; across playouts the
/// ordering is the tracker's to choose.
pub trait Tracker {
    /// begin a playout that shares the first `depth` picks with the
    /// current one (0 means fresh). false when that is impossible,
    /// which includes the search being exhausted.
    fn start_at(&mut self, depth: usize) -> bool;

    /// answer the request at the current depth, or None to prune this
    /// playout (the path is exhausted or filtered out).
    fn next_pick(&mut self, request: &PickRequest) -> Option<Reply>;

    /// commit the playout. false when the tracker rejects it, e.g. an
    /// ordered pass declining a playout that earlier passes covered.
    fn end_playout(&mut self) -> bool;

    /// whether every playout has been visited.
    fn done(&self) -> bool;

    /// picks served in the current playout.
    fn depth(&self) -> usize;
}
