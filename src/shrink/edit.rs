use crate::picks::playout::Playout;
use crate::picks::playout::Span;
use crate::picks::request::PickRequest;
use crate::Reply;

/// one editing decision for one recorded pick. explicit variants
/// rather than closures, so edits are inspectable and composable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Keep,
    Replace(Reply),
    Snip,
}

/// visits every recorded pick of a playout in order and decides its
/// fate. replacements that fall outside the request's range are
/// silently clamped to the minimum.
pub trait StreamEditor {
    fn edit(&mut self, index: usize, request: &PickRequest, reply: Reply) -> Edit;
}

impl<F: FnMut(usize, &PickRequest, Reply) -> Edit> StreamEditor for F {
    fn edit(&mut self, index: usize, request: &PickRequest, reply: Reply) -> Edit {
        self(index, request, reply)
    }
}

/// materialize the edited reply stream.
pub fn apply(editor: &mut dyn StreamEditor, playout: &Playout) -> Vec<Reply> {
    let mut replies = Vec::with_capacity(playout.len());
    for (index, (request, reply)) in playout
        .requests()
        .iter()
        .zip(playout.replies().iter())
        .enumerate()
    {
        match editor.edit(index, request, *reply) {
            Edit::Keep => replies.push(*reply),
            Edit::Replace(v) => replies.push(request.clamp(v)),
            Edit::Snip => {}
        }
    }
    replies
}

/// the identity edit.
pub struct KeepAll;

impl StreamEditor for KeepAll {
    fn edit(&mut self, _: usize, _: &PickRequest, _: Reply) -> Edit {
        Edit::Keep
    }
}

/// keep the first n picks, snip the rest.
pub struct TrimTo(pub usize);

impl StreamEditor for TrimTo {
    fn edit(&mut self, index: usize, _: &PickRequest, _: Reply) -> Edit {
        match index < self.0 {
            true => Edit::Keep,
            false => Edit::Snip,
        }
    }
}

/// replace the reply at one position.
pub struct ReplaceAt {
    pub index: usize,
    pub reply: Reply,
}

impl StreamEditor for ReplaceAt {
    fn edit(&mut self, index: usize, _: &PickRequest, _: Reply) -> Edit {
        match index == self.index {
            true => Edit::Replace(self.reply),
            false => Edit::Keep,
        }
    }
}

/// delete an optional group: snip its {0, 1} guard pick together with
/// the span it guarded, so whatever followed slides into the guard's
/// place. in a guard-chained sequence this removes one element; at the
/// end of a chain the padding minimum closes the sequence early.
pub struct RemoveGroup {
    pub guard: usize,
    pub span: Span,
}

impl StreamEditor for RemoveGroup {
    fn edit(&mut self, index: usize, _: &PickRequest, _: Reply) -> Edit {
        match index == self.guard || (index >= self.span.start() && index < self.span.end()) {
            true => Edit::Snip,
            false => Edit::Keep,
        }
    }
}
