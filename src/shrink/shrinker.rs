use super::edit::RemoveGroup;
use super::edit::ReplaceAt;
use super::edit::StreamEditor;
use super::edit::TrimTo;
use crate::build::value::Gen;

/// search for a smaller playout that still makes the test fail. the
/// predicate answers "is this value still interesting", i.e. still
/// failing; it is consulted only on candidates that strictly precede
/// the current best in (length, lexicographic replies) order, which is
/// also what guarantees termination.
///
/// three strategies run in rotation until none makes progress: trim
/// the tail, remove optional groups, minimize individual picks. each
/// binary-searches instead of stepping one unit at a time.
pub fn shrink<T: Clone + 'static>(sample: Gen<T>, interesting: &dyn Fn(&T) -> bool) -> Gen<T> {
    let mut best = sample;
    loop {
        let mut progress = false;
        progress |= trim_tail(&mut best, interesting);
        progress |= remove_groups(&mut best, interesting);
        progress |= minimize_picks(&mut best, interesting);
        if !progress {
            break;
        }
    }
    best
}

/// rebuild under the edit and keep the candidate only if it is both
/// strictly smaller and still failing.
fn attempt<T: Clone + 'static>(
    best: &Gen<T>,
    editor: &mut dyn StreamEditor,
    interesting: &dyn Fn(&T) -> bool,
) -> Option<Gen<T>> {
    let candidate = best.mutate(editor)?;
    match candidate.playout().precedes(best.playout()) && interesting(candidate.val()) {
        true => Some(candidate),
        false => None,
    }
}

/// truncate the reply sequence, then binary-search the smallest kept
/// length that still fails. afterwards the last pick is necessary.
fn trim_tail<T: Clone + 'static>(best: &mut Gen<T>, interesting: &dyn Fn(&T) -> bool) -> bool {
    let len = best.playout().len();
    if len == 0 {
        return false;
    }
    let Some(mut candidate) = attempt(best, &mut TrimTo(len - 1), interesting) else {
        return false;
    };
    let (mut lo, mut hi) = (0, len - 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match attempt(best, &mut TrimTo(mid), interesting) {
            Some(better) => {
                candidate = better;
                hi = mid;
            }
            None => lo = mid + 1,
        }
    }
    log::debug!("trimmed tail: {} -> {}", len, candidate.playout().len());
    *best = candidate;
    true
}

/// scan right to left for the option shape: a {0, 1} pick answered 1
/// immediately followed by a span. deleting the group extends to
/// neighboring options opportunistically by retrying the same guard
/// position after every success.
fn remove_groups<T: Clone + 'static>(best: &mut Gen<T>, interesting: &dyn Fn(&T) -> bool) -> bool {
    let mut progress = false;
    let mut guard = best.playout().len();
    while guard > 0 {
        guard -= 1;
        loop {
            let playout = best.playout();
            if guard >= playout.len() {
                break;
            }
            let request = playout.requests()[guard];
            let flag = request.min() == 0 && request.max() == 1 && playout.replies()[guard] == 1;
            if !flag {
                break;
            }
            let span = playout
                .spans()
                .iter()
                .find(|s| s.start() == guard + 1 && !s.is_empty())
                .copied();
            let Some(span) = span else { break };
            match attempt(best, &mut RemoveGroup { guard, span }, interesting) {
                Some(better) => {
                    log::debug!("removed group at {}..{}", span.start(), span.end());
                    *best = better;
                    progress = true;
                }
                None => break,
            }
        }
    }
    progress
}

/// for every pick above its minimum, binary-search the smallest
/// still-failing reply in [min, reply).
fn minimize_picks<T: Clone + 'static>(best: &mut Gen<T>, interesting: &dyn Fn(&T) -> bool) -> bool {
    let mut progress = false;
    let mut index = 0;
    while index < best.playout().len() {
        let request = best.playout().requests()[index];
        let reply = best.playout().replies()[index];
        if reply > request.min() {
            let mut found: Option<Gen<T>> = None;
            let (mut lo, mut hi) = (request.min(), reply - 1);
            while lo <= hi {
                let mid = lo + (hi - lo) / 2;
                match attempt(best, &mut ReplaceAt { index, reply: mid }, interesting) {
                    Some(better) => {
                        found = Some(better);
                        if mid == lo {
                            break;
                        }
                        hi = mid - 1;
                    }
                    None => lo = mid + 1,
                }
            }
            if let Some(better) = found {
                log::debug!("minimized pick {}: {} -> *", index, reply);
                *best = better;
                progress = true;
            }
        }
        index += 1;
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::domain::int;
    use crate::build::domain::vec_of;
    use crate::build::script::Script;
    use crate::picks::request::PickRequest;
    use crate::Reply;
    use std::sync::Arc;

    /// up to seven digits, summed. consumes one pick per digit and
    /// stops early once the running total reaches the target, so a
    /// trimmed playout really is shorter.
    fn seven_digits() -> Arc<Script<Vec<Reply>>> {
        Arc::new(Script::new("seven digits", |p| {
            let req = PickRequest::new(0, 9).unwrap();
            let mut digits = Vec::new();
            for _ in 0..7 {
                digits.push(p.pick(&req)?);
            }
            Ok(digits)
        }))
    }

    #[test]
    fn trims_the_zero_tail() {
        let sample = Gen::replay(&seven_digits(), &[3, 5, 0, 0, 0, 0, 0]).unwrap();
        let shrunk = shrink(sample, &|digits: &Vec<Reply>| digits.iter().sum::<Reply>() >= 8);
        assert!(shrunk.playout().replies() == &[3, 5]);
        assert!(shrunk.val().iter().sum::<Reply>() == 8);
    }

    #[test]
    fn trim_leaves_a_necessary_last_pick() {
        let sample = Gen::replay(&seven_digits(), &[1, 1, 1, 1, 1, 1, 1]).unwrap();
        let shrunk = shrink(sample, &|digits: &Vec<Reply>| digits.iter().sum::<Reply>() >= 3);
        assert!(shrunk.playout().len() == 3);
    }

    #[test]
    fn minimizes_a_single_pick() {
        let script = Arc::new(int(0, 100));
        let sample = Gen::replay(&script, &[87]).unwrap();
        let shrunk = shrink(sample, &|n: &Reply| *n >= 42);
        assert!(*shrunk.val() == 42);
    }

    #[test]
    fn shrunk_value_still_fails() {
        let script = Arc::new(int(0, 100));
        let sample = Gen::replay(&script, &[87]).unwrap();
        let shrunk = shrink(sample, &|n: &Reply| *n % 7 == 3);
        assert!(*shrunk.val() % 7 == 3);
        assert!(*shrunk.val() <= 87);
    }

    #[test]
    fn removes_unneeded_elements() {
        let script = Arc::new(vec_of(int(0, 9), 6));
        // three elements: [4, 7, 2]
        let sample = Gen::replay(&script, &[1, 4, 1, 7, 1, 2]).unwrap();
        assert!(sample.val() == &[4, 7, 2]);
        let shrunk = shrink(sample, &|items: &Vec<Reply>| items.contains(&7));
        assert!(shrunk.val() == &[7]);
    }

    #[test]
    fn a_minimal_input_survives_unchanged() {
        let script = Arc::new(int(0, 100));
        let sample = Gen::replay(&script, &[0]).unwrap();
        let before = sample.playout().clone();
        let shrunk = shrink(sample, &|_| true);
        assert!(shrunk.playout() == &before);
    }

    #[test]
    fn shrinking_never_grows_the_playout() {
        let script = Arc::new(vec_of(int(0, 99), 8));
        let sample = Gen::replay(&script, &[1, 55, 1, 3, 1, 81, 1, 12]).unwrap();
        let original = sample.playout().clone();
        let shrunk = shrink(sample, &|items: &Vec<Reply>| items.len() >= 2);
        assert!(
            shrunk.playout() == &original || shrunk.playout().precedes(&original)
        );
        assert!(shrunk.val().len() >= 2);
    }
}
