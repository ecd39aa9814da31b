use crate::picks::request::PickRequest;
use crate::Reply;

/// node weight in the pick tree. a slot learns its request range the
/// first time a playout picks through it, counts how many of its
/// branches have been exhausted, and flips to pruned when none remain.
/// slots wider than the tracking threshold give up on bookkeeping:
/// their subtree is assumed effectively infinite.
#[derive(Debug, Clone)]
pub struct Slot {
    range: Option<(Reply, Reply)>,
    tracked: bool,
    pruned: bool,
    pruned_arms: u64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            range: None,
            tracked: true,
            pruned: false,
            pruned_arms: 0,
        }
    }
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// learn the request seen at this position. a range that disagrees
    /// with an earlier visit means the generator is not deterministic
    /// in its picks; the slot stops tracking rather than miscount.
    pub fn observe(&mut self, request: &PickRequest) {
        match self.range {
            None => {
                self.range = Some((request.min(), request.max()));
                self.tracked = request.size() <= crate::UNTRACKED_WIDTH;
            }
            Some((min, max)) if min == request.min() && max == request.max() => {}
            Some(_) => {
                log::warn!("pick range changed between visits; node untracked");
                self.tracked = false;
            }
        }
    }

    pub fn size(&self) -> u64 {
        match self.range {
            Some((min, max)) => (max - min) as u64 + 1,
            None => 0,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    pub fn prune(&mut self) {
        self.pruned = true;
    }

    /// record that one branch below this slot became pruned. returns
    /// true when that was the last one and this slot pruned with it.
    pub fn arm_pruned(&mut self) -> bool {
        self.pruned_arms += 1;
        if self.tracked && self.range.is_some() && self.pruned_arms >= self.size() {
            self.pruned = true;
        }
        self.pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observes_range_once() {
        let mut slot = Slot::new();
        slot.observe(&PickRequest::new(0, 4).unwrap());
        assert!(slot.size() == 5);
        assert!(slot.is_tracked());
    }

    #[test]
    fn wide_ranges_go_untracked() {
        let mut slot = Slot::new();
        slot.observe(&PickRequest::new(0, crate::UNTRACKED_WIDTH as i64).unwrap());
        assert!(!slot.is_tracked());
    }

    #[test]
    fn conflicting_ranges_go_untracked() {
        let mut slot = Slot::new();
        slot.observe(&PickRequest::new(0, 4).unwrap());
        slot.observe(&PickRequest::new(0, 5).unwrap());
        assert!(!slot.is_tracked());
    }

    #[test]
    fn prunes_when_every_arm_is_pruned() {
        let mut slot = Slot::new();
        slot.observe(&PickRequest::new(0, 1).unwrap());
        assert!(!slot.arm_pruned());
        assert!(slot.arm_pruned());
        assert!(slot.is_pruned());
    }
}
