use super::Picker;
use crate::picks::request::PickRequest;
use crate::Reply;

/// always answers with the request minimum. drives the all-minimum
/// playout that seeds ordered search and depth-limited generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinPicker;

impl Picker for MinPicker {
    fn pick(&mut self, request: &PickRequest) -> Reply {
        request.min()
    }
}

/// always answers n, pulled into range when the request excludes it.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysPicker(pub Reply);

impl Picker for AlwaysPicker {
    fn pick(&mut self, request: &PickRequest) -> Reply {
        request.clamp(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_answers_minimum() {
        let mut picker = MinPicker;
        assert!(picker.pick(&PickRequest::new(3, 9).unwrap()) == 3);
        assert!(picker.pick(&PickRequest::new(-9, -3).unwrap()) == -9);
    }

    #[test]
    fn always_answers_n_when_in_range() {
        let mut picker = AlwaysPicker(5);
        for min in 0..=5 {
            let req = PickRequest::new(min, 10).unwrap();
            assert!(picker.pick(&req) == 5);
        }
    }

    #[test]
    fn always_clamps_when_out_of_range() {
        let mut picker = AlwaysPicker(99);
        assert!(picker.pick(&PickRequest::new(0, 10).unwrap()) == 0);
    }

    #[test]
    fn singleton_range_always_produces_min() {
        let req = PickRequest::exactly(7);
        assert!(MinPicker.pick(&req) == 7);
        assert!(AlwaysPicker(3).pick(&req) == 7);
    }
}
