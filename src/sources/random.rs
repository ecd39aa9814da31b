use super::Picker;
use crate::picks::request::PickRequest;
use crate::Reply;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro128PlusPlus;

/// seeded uniform picker. the same seed yields the same stream on
/// every run, which is what makes rep keys replayable. honors the
/// biased hint on wide requests by occasionally answering with the
/// default or an edge of the range.
pub struct RandomPicker {
    rng: Xoroshiro128PlusPlus,
}

impl RandomPicker {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Xoroshiro128PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Picker for RandomPicker {
    fn pick(&mut self, request: &PickRequest) -> Reply {
        if request.is_biased() && request.size() >= crate::BIAS_FLOOR {
            match self.rng.random_range(0..crate::BIAS_DIE) {
                0 => return request.min(),
                1 => return request.max(),
                2 => return request.default(),
                _ => {}
            }
        }
        self.rng.random_range(request.min()..=request.max())
    }

    fn index(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n)
    }
}
