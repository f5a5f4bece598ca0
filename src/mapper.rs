/// Normalized scroll position in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ScrollProgress(f64);

impl ScrollProgress {
    pub const START: Self = Self(0.0);
    pub const END: Self = Self(1.0);

    /// Clamp into `[0, 1]`; NaN collapses to the start.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::START;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for ScrollProgress {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Map scroll progress onto a frame index in `[0, n - 1]`.
///
/// Linear interpolation followed by rounding, halves rounding up. Returns
/// `None` for an empty sequence so callers skip drawing instead of indexing.
pub fn map_index(progress: impl Into<ScrollProgress>, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let last = n - 1;
    let raw = progress.into().value() * last as f64;
    // progress is non-negative, so round() (half away from zero) is half-up here
    let index = raw.round() as usize;
    Some(index.min(last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_hit_first_and_last_frame() {
        for n in [1usize, 2, 3, 10, 192] {
            assert_eq!(map_index(0.0, n), Some(0));
            assert_eq!(map_index(1.0, n), Some(n - 1));
        }
    }

    #[test]
    fn single_frame_sequence_always_maps_to_zero() {
        for p in [0.0, 0.25, 0.5, 0.999, 1.0] {
            assert_eq!(map_index(p, 1), Some(0));
        }
    }

    #[test]
    fn half_rounds_up() {
        // 0.5 * 191 = 95.5
        assert_eq!(map_index(0.5, 192), Some(96));
        // 0.5 * 3 = 1.5
        assert_eq!(map_index(0.5, 4), Some(2));
    }

    #[test]
    fn monotonic_over_fine_steps() {
        let n = 192;
        let mut prev = 0;
        for step in 0..=10_000 {
            let idx = map_index(step as f64 / 10_000.0, n).unwrap();
            assert!(idx >= prev, "index went backwards at step {step}");
            assert!(idx < n);
            prev = idx;
        }
        assert_eq!(prev, n - 1);
    }

    #[test]
    fn empty_sequence_has_no_index() {
        assert_eq!(map_index(0.3, 0), None);
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        assert_eq!(map_index(-0.5, 10), Some(0));
        assert_eq!(map_index(7.0, 10), Some(9));
        assert_eq!(map_index(f64::NAN, 10), Some(0));
        assert_eq!(map_index(f64::INFINITY, 10), Some(9));
    }
}
