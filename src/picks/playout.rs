use super::request::PickRequest;
use crate::Reply;

/// a half-open interval [start, end) over a pick sequence, marking
/// the picks consumed by one sub-generator call. spans nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span is ordered");
        Self { start, end }
    }
    pub fn start(&self) -> usize {
        self.start
    }
    pub fn end(&self) -> usize {
        self.end
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// the record of what one generator invocation consumed: parallel
/// request/reply sequences plus the nested spans delimiting
/// sub-generator calls. immutable once captured from a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playout {
    requests: Vec<PickRequest>,
    replies: Vec<Reply>,
    spans: Vec<Span>,
}

impl Playout {
    pub fn new(requests: Vec<PickRequest>, replies: Vec<Reply>, spans: Vec<Span>) -> Self {
        assert!(requests.len() == replies.len(), "parallel sequences");
        let mut spans = spans;
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        Self {
            requests,
            replies,
            spans,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![], vec![], vec![])
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
    /// spans in pre-order: by start ascending, outermost first.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// drop trailing picks whose reply is their request minimum.
    /// a playback source regenerates them by padding, so two playouts
    /// that differ only in a minimum tail describe the same value.
    pub fn normalized(self) -> Self {
        let keep = {
            let mut n = self.replies.len();
            while n > 0 && self.replies[n - 1] == self.requests[n - 1].min() {
                n -= 1;
            }
            n
        };
        let requests = self.requests.into_iter().take(keep).collect::<Vec<_>>();
        let replies = self.replies.into_iter().take(keep).collect::<Vec<_>>();
        let spans = self
            .spans
            .into_iter()
            .map(|s| Span::new(s.start.min(keep), s.end.min(keep)))
            .filter(|s| s.len() >= 2)
            .collect();
        Self::new(requests, replies, spans)
    }

    /// the shrink order: shorter playouts precede longer ones, and
    /// equal lengths compare replies lexicographically. every accepted
    /// shrink edit strictly decreases this order, so shrinking halts.
    pub fn precedes(&self, other: &Self) -> bool {
        match self.len().cmp(&other.len()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.replies < other.replies,
        }
    }
}

impl std::fmt::Display for Playout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, reply) in self.replies.iter().enumerate() {
            match i {
                0 => write!(f, "{}", reply)?,
                _ => write!(f, ", {}", reply)?,
            }
        }
        write!(f, "]")
    }
}
