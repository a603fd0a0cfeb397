use rand::Rng;

/// Scale of the 24-bit mantissa used by [`RandomDecisions::fast_fraction`].
const FAST_FRACTION_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

/// Decisions the operators draw from their generator.
///
/// Implemented for every [`Rng`], so the operators stay generic over the
/// generator they are handed while the trajectory keeps ownership of it.
pub trait RandomDecisions: Rng {
    /// Uniform integer in `lo..=hi`; `lo` if the range is empty.
    fn random_int(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            lo
        } else {
            self.gen_range(lo..=hi)
        }
    }

    /// Uniform real in `[lo, hi)`; `lo` if the range is empty.
    fn random_fraction(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            lo
        } else {
            self.gen_range(lo..hi)
        }
    }

    /// Uniform real in `[0, 1)`.
    fn fraction(&mut self) -> f64 {
        self.random_fraction(0.0, 1.0)
    }

    /// Low-quality fraction in `[0, 1)` from a single 32-bit draw, meant for
    /// high-frequency score noise.
    fn fast_fraction(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * FAST_FRACTION_SCALE
    }

    /// Bernoulli trial; probabilities outside `[0, 1]` are clamped, NaN never
    /// fires.
    fn chance(&mut self, probability: f64) -> bool {
        if !(probability > 0.0) {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.gen_bool(probability)
        }
    }
}

impl<R: Rng + ?Sized> RandomDecisions for R {}

#[cfg(test)]
mod tests {
    use crate::utils::create_seeded_rng;

    use super::*;

    #[test]
    fn random_int_is_inclusive_and_within_bounds() {
        let mut rng = create_seeded_rng(7);
        let mut seen = [false; 4];
        for _ in 0..1000 {
            let v = rng.random_int(2, 5);
            assert!((2..=5).contains(&v));
            seen[v - 2] = true;
        }
        assert!(seen.iter().all(|it| *it));
    }

    #[test]
    fn empty_ranges_return_lower_bound() {
        let mut rng = create_seeded_rng(7);
        assert_eq!(3, rng.random_int(3, 3));
        assert_eq!(3, rng.random_int(3, 1));
        assert_eq!(0.5, rng.random_fraction(0.5, 0.5));
    }

    #[test]
    fn fractions_stay_in_unit_interval() {
        let mut rng = create_seeded_rng(11);
        for _ in 0..10_000 {
            let f = rng.fraction();
            assert!((0.0..1.0).contains(&f));
            let f = rng.fast_fraction();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn chance_clamps_probabilities() {
        let mut rng = create_seeded_rng(3);
        assert!(!rng.chance(-0.5));
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        assert!(rng.chance(1.5));
    }
}
