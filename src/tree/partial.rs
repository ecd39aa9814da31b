use super::slot::Slot;
use super::Tracker;
use crate::picks::request::PickRequest;
use crate::sources::Picker;
use crate::Reply;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction::Outgoing;
use std::collections::BTreeSet;

/// random search with deduplication. wraps a picker and grows a pick
/// tree recording every path walked so far; a completed playout prunes
/// its terminal node, and fully-pruned subtrees propagate upward, so
/// the picker is steered away from playouts already seen. the search
/// is done when the root itself prunes.
///
/// nodes wider than the tracking threshold go untracked: below them
/// the picker answers freely and nothing is recorded or deduplicated.
pub struct PartialTracker {
    graph: DiGraph<Slot, Reply>,
    root: NodeIndex,
    path: Vec<NodeIndex>,
    loose: usize,
    picker: Box<dyn Picker>,
}

impl PartialTracker {
    pub fn new(picker: Box<dyn Picker>) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(Slot::new());
        Self {
            graph,
            root,
            path: vec![root],
            loose: 0,
            picker,
        }
    }

    fn current(&self) -> NodeIndex {
        *self.path.last().expect("path always holds the root")
    }

    fn child(&self, node: NodeIndex, reply: Reply) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Outgoing)
            .find(|edge| *edge.weight() == reply)
            .map(|edge| edge.target())
    }

    fn branch_pruned(&self, node: NodeIndex, reply: Reply) -> bool {
        self.child(node, reply)
            .is_some_and(|child| self.graph[child].is_pruned())
    }

    /// step down the branch labeled by this reply, materializing the
    /// child node on first visit.
    fn descend(&mut self, node: NodeIndex, reply: Reply) -> Reply {
        let child = match self.child(node, reply) {
            Some(child) => child,
            None => {
                let child = self.graph.add_node(Slot::new());
                self.graph.add_edge(node, child, reply);
                child
            }
        };
        self.path.push(child);
        reply
    }

    /// the k-th unpruned reply of the request, counting from min.
    fn unpruned(&self, node: NodeIndex, request: &PickRequest, mut k: usize) -> Option<Reply> {
        let pruned = self
            .graph
            .edges_directed(node, Outgoing)
            .filter(|edge| self.graph[edge.target()].is_pruned())
            .map(|edge| *edge.weight())
            .collect::<BTreeSet<_>>();
        for reply in request.min()..=request.max() {
            if pruned.contains(&reply) {
                continue;
            }
            match k {
                0 => return Some(reply),
                _ => k -= 1,
            }
        }
        None
    }

    /// walk from the freshly pruned leaf back toward the root, letting
    /// each parent count the lost branch and prune in turn.
    fn backpropagate(&mut self) {
        let mut at = self.path.len() - 1;
        while at > 0 {
            let parent = self.path[at - 1];
            match self.graph[parent].arm_pruned() {
                true => at -= 1,
                false => break,
            }
        }
    }
}

impl Tracker for PartialTracker {
    fn depth(&self) -> usize {
        self.path.len() - 1 + self.loose
    }

    fn done(&self) -> bool {
        self.graph[self.root].is_pruned()
    }

    fn start_at(&mut self, depth: usize) -> bool {
        if self.done() || depth > self.depth() {
            return false;
        }
        let tracked = self.path.len() - 1;
        if depth >= tracked {
            self.loose = depth - tracked;
        } else {
            self.path.truncate(depth + 1);
            self.loose = 0;
        }
        true
    }

    fn next_pick(&mut self, request: &PickRequest) -> Option<Reply> {
        if self.loose > 0 {
            self.loose += 1;
            return Some(self.picker.pick(request));
        }
        let node = self.current();
        self.graph[node].observe(request);
        if !self.graph[node].is_tracked() {
            self.loose = 1;
            return Some(self.picker.pick(request));
        }
        for _ in 0..crate::PICKER_RETRIES {
            let reply = self.picker.pick(request);
            if !self.branch_pruned(node, reply) {
                return Some(self.descend(node, reply));
            }
        }
        let open = request.size() as usize
            - self
                .graph
                .edges_directed(node, Outgoing)
                .filter(|edge| self.graph[edge.target()].is_pruned())
                .count();
        match open {
            0 => None,
            n => {
                let k = self.picker.index(n);
                let reply = self.unpruned(node, request, k)?;
                Some(self.descend(node, reply))
            }
        }
    }

    fn end_playout(&mut self) -> bool {
        if self.loose == 0 {
            let leaf = self.current();
            if !self.graph[leaf].is_pruned() {
                self.graph[leaf].prune();
                self.backpropagate();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::random::RandomPicker;

    fn coin() -> PickRequest {
        PickRequest::new(0, 1).unwrap()
    }

    fn tracker(seed: u64) -> PartialTracker {
        PartialTracker::new(Box::new(RandomPicker::seeded(seed)))
    }

    #[test]
    fn exhausts_a_small_space_without_duplicates() {
        let mut tracker = tracker(17);
        let mut seen = Vec::new();
        while tracker.start_at(0) {
            let a = tracker.next_pick(&coin()).unwrap();
            let b = tracker.next_pick(&coin()).unwrap();
            assert!(tracker.end_playout());
            assert!(!seen.contains(&(a, b)));
            seen.push((a, b));
        }
        assert!(seen.len() == 4);
        assert!(tracker.done());
    }

    #[test]
    fn zero_pick_playouts_exhaust_immediately() {
        let mut tracker = tracker(17);
        assert!(tracker.start_at(0));
        assert!(tracker.end_playout());
        assert!(tracker.done());
        assert!(!tracker.start_at(0));
    }

    #[test]
    fn retry_keeps_the_shared_prefix() {
        let mut tracker = tracker(3);
        assert!(tracker.start_at(0));
        let a = tracker.next_pick(&coin()).unwrap();
        let _ = tracker.next_pick(&coin()).unwrap();
        assert!(tracker.start_at(1));
        assert!(tracker.depth() == 1);
        let _ = tracker.next_pick(&coin()).unwrap();
        assert!(tracker.end_playout());
        let _ = a;
    }

    #[test]
    fn wide_requests_go_loose_and_never_exhaust() {
        let wide = PickRequest::new(0, crate::UNTRACKED_WIDTH as i64 + 1).unwrap();
        let mut tracker = tracker(11);
        for _ in 0..10 {
            assert!(tracker.start_at(0));
            let reply = tracker.next_pick(&wide).unwrap();
            assert!(wide.contains(reply));
            assert!(tracker.end_playout());
        }
        assert!(!tracker.done());
    }

    #[test]
    fn singleton_requests_never_branch() {
        let one = PickRequest::exactly(5);
        let mut tracker = tracker(9);
        assert!(tracker.start_at(0));
        assert!(tracker.next_pick(&one) == Some(5));
        assert!(tracker.end_playout());
        assert!(tracker.done());
    }
}
