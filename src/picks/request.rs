use crate::Arbitrary;
use crate::Reply;

/// a ranged request for one integer pick. immutable once built,
/// shared freely between generator definitions and recorded playouts.
/// the default is the reply a playout falls back to when nothing
/// more interesting is asked of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickRequest {
    min: Reply,
    max: Reply,
    default: Reply,
    biased: bool,
}

/// construction failures. both are programming errors in the
/// generator definition, not recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid range: [{min}, {max}] is empty or outside the safe integer band")]
    InvalidRange { min: Reply, max: Reply },
    #[error("invalid default: {default} lies outside [{min}, {max}]")]
    InvalidDefault {
        min: Reply,
        max: Reply,
        default: Reply,
    },
}

impl PickRequest {
    /// a request over [min, max] whose default is the in-range
    /// integer closest to zero, ties toward the positive side.
    pub fn new(min: Reply, max: Reply) -> Result<Self, RangeError> {
        if min > max || !Self::safe(min) || !Self::safe(max) {
            return Err(RangeError::InvalidRange { min, max });
        }
        Ok(Self {
            min,
            max,
            default: 0.clamp(min, max),
            biased: false,
        })
    }

    /// a request with an explicit default reply.
    pub fn with_default(min: Reply, max: Reply, default: Reply) -> Result<Self, RangeError> {
        let request = Self::new(min, max)?;
        if default < min || default > max {
            return Err(RangeError::InvalidDefault { min, max, default });
        }
        Ok(Self { default, ..request })
    }

    /// the degenerate single-reply request. always valid for safe n.
    pub fn exactly(n: Reply) -> Self {
        Self::new(n, n).expect("singleton range is valid")
    }

    /// hint that random pickers should weight the edges and default.
    pub fn biased(self) -> Self {
        Self {
            biased: true,
            ..self
        }
    }

    pub fn min(&self) -> Reply {
        self.min
    }
    pub fn max(&self) -> Reply {
        self.max
    }
    pub fn default(&self) -> Reply {
        self.default
    }
    pub fn is_biased(&self) -> bool {
        self.biased
    }

    /// number of distinct replies. never zero for a valid request.
    pub fn size(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }

    pub fn contains(&self, n: Reply) -> bool {
        self.min <= n && n <= self.max
    }

    /// pull an arbitrary reply back into range. out-of-range inputs
    /// land on the minimum, matching the stream-editor contract.
    pub fn clamp(&self, n: Reply) -> Reply {
        if self.contains(n) { n } else { self.min }
    }

    fn safe(n: Reply) -> bool {
        (-crate::MAX_SAFE_PICK..=crate::MAX_SAFE_PICK).contains(&n)
    }
}

impl std::fmt::Display for PickRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

impl Arbitrary for PickRequest {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let min = rng.random_range(-0x100..0x100);
        let max = rng.random_range(min..min + 0x100);
        Self::new(min, max).expect("range is ordered by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snaps_to_zero() {
        assert!(PickRequest::new(-5, 5).unwrap().default() == 0);
        assert!(PickRequest::new(3, 9).unwrap().default() == 3);
        assert!(PickRequest::new(-9, -3).unwrap().default() == -3);
    }

    #[test]
    fn explicit_default_is_validated() {
        assert!(PickRequest::with_default(0, 10, 7).is_ok());
        assert!(matches!(
            PickRequest::with_default(0, 10, 11),
            Err(RangeError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(matches!(
            PickRequest::new(1, 0),
            Err(RangeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn unsafe_range_is_rejected() {
        assert!(PickRequest::new(0, crate::MAX_SAFE_PICK).is_ok());
        assert!(PickRequest::new(0, crate::MAX_SAFE_PICK + 1).is_err());
        assert!(PickRequest::new(i64::MIN, 0).is_err());
    }

    #[test]
    fn size_counts_both_ends() {
        assert!(PickRequest::new(0, 0).unwrap().size() == 1);
        assert!(PickRequest::new(-1, 1).unwrap().size() == 3);
        assert!(PickRequest::exactly(42).size() == 1);
    }

    #[test]
    fn clamp_lands_on_minimum() {
        let req = PickRequest::new(3, 9).unwrap();
        assert!(req.clamp(5) == 5);
        assert!(req.clamp(99) == 3);
        assert!(req.clamp(-1) == 3);
    }

    #[test]
    fn random_requests_are_valid() {
        for _ in 0..100 {
            let req = PickRequest::random();
            assert!(req.contains(req.default()));
            assert!(req.size() >= 1);
        }
    }
}
