use super::playout::Playout;
use super::playout::Span;
use crate::Reply;

/// a recursive rendering of a playout: each element is either a bare
/// reply or the nested picks of a sub-generator call. display and
/// test surface only; faithful for playouts without zero-length spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nest {
    Pick(Reply),
    Group(Vec<Nest>),
}

impl Nest {
    /// reconstruct the flat reply sequence and span set this rendering
    /// came from. inverse of From<&Playout> when no span is empty.
    pub fn flatten(&self) -> (Vec<Reply>, Vec<Span>) {
        let mut replies = Vec::new();
        let mut spans = Vec::new();
        match self {
            Nest::Pick(reply) => replies.push(*reply),
            Nest::Group(items) => Self::unroll(items, true, &mut replies, &mut spans),
        }
        spans.sort_by(|a: &Span, b: &Span| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));
        (replies, spans)
    }

    fn unroll(items: &[Nest], root: bool, replies: &mut Vec<Reply>, spans: &mut Vec<Span>) {
        let start = replies.len();
        for item in items {
            match item {
                Nest::Pick(reply) => replies.push(*reply),
                Nest::Group(inner) => Self::unroll(inner, false, replies, spans),
            }
        }
        if !root {
            spans.push(Span::new(start, replies.len()));
        }
    }
}

impl From<&Playout> for Nest {
    fn from(playout: &Playout) -> Self {
        let spans = playout.spans();
        let mut cursor = 0;
        let items = assemble(playout, spans, &mut cursor, 0, playout.len());
        Nest::Group(items)
    }
}

/// walk [start, end), descending into each span that opens at the
/// current offset. spans arrive pre-ordered, outermost first.
fn assemble(
    playout: &Playout,
    spans: &[Span],
    cursor: &mut usize,
    start: usize,
    end: usize,
) -> Vec<Nest> {
    let mut items = Vec::new();
    let mut offset = start;
    while offset < end || opens_at(spans, *cursor, offset, end) {
        if opens_at(spans, *cursor, offset, end) {
            let span = spans[*cursor];
            *cursor += 1;
            let inner = assemble(playout, spans, cursor, span.start(), span.end());
            items.push(Nest::Group(inner));
            offset = span.end();
        } else {
            items.push(Nest::Pick(playout.replies()[offset]));
            offset += 1;
        }
    }
    items
}

fn opens_at(spans: &[Span], cursor: usize, offset: usize, end: usize) -> bool {
    spans
        .get(cursor)
        .is_some_and(|s| s.start() == offset && s.end() <= end)
}

impl std::fmt::Display for Nest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Nest::Pick(reply) => write!(f, "{}", reply),
            Nest::Group(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    match i {
                        0 => write!(f, "{}", item)?,
                        _ => write!(f, ", {}", item)?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}
