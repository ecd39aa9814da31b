pub mod constant;
pub mod playback;
pub mod random;

use crate::picks::request::PickRequest;
use crate::Reply;

/// something that can answer pick requests. every reply lands inside
/// the request's range; how it is chosen is the picker's business.
pub trait Picker {
    fn pick(&mut self, request: &PickRequest) -> Reply;

    /// choose among n alternatives. deterministic pickers take the
    /// first; random pickers spread uniformly. n must be nonzero.
    fn index(&mut self, n: usize) -> usize {
        let _ = n;
        0
    }
}
