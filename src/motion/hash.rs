//! Stateless seeded hash RNG
//!
//! Every draw is `uniform(seed + offset)`; there is no generator state to
//! advance, so any value can be recomputed at any time from its seed alone.
//! The mix is the three-round avalanche hash of Schechter & Bridson and is
//! kept bit-exact so saved scenes replay identically.

/// Identifies one reproducible pseudo-random stream
pub type Seed = u32;

/// Largest f32 strictly below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Avalanche bit mix
#[inline]
pub fn hash(seed: Seed) -> u32 {
    let mut s = seed ^ 2_747_636_419;
    s = s.wrapping_mul(2_654_435_769);
    s ^= s >> 16;
    s = s.wrapping_mul(2_654_435_769);
    s ^= s >> 16;
    s.wrapping_mul(2_654_435_769)
}

/// Map hashed bits to [0, 1)
///
/// Divides by 2^32 - 1 in single precision; the few top values that round
/// to 1.0 are pulled back below it.
#[inline]
pub fn unit_from_bits(bits: u32) -> f32 {
    (bits as f32 / u32::MAX as f32).min(BELOW_ONE)
}

/// Uniform sample in [0, 1) for `seed`
#[inline]
pub fn uniform(seed: Seed) -> f32 {
    unit_from_bits(hash(seed))
}

/// Uniform sample in [lo, hi)
#[inline]
pub fn uniform_range(seed: Seed, lo: f32, hi: f32) -> f32 {
    crate::lerp(lo, hi, uniform(seed))
}

/// Uniform sample in [-extent/2, extent/2)
#[inline]
pub fn uniform_centered(seed: Seed, extent: f32) -> f32 {
    (uniform(seed) - 0.5) * extent
}

/// Fold a 64-bit seed into the 32-bit stream space
#[inline]
pub fn fold_seed(seed: u64) -> Seed {
    (seed as u32) ^ ((seed >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_hash_values() {
        assert_eq!(hash(0), 1_739_749_167);
        assert_eq!(hash(1), 150_776_505);
        assert_eq!(hash(12345), 3_826_328_255);
    }

    #[test]
    fn test_known_uniform_value() {
        assert!((uniform(12345) - 0.890_886_5).abs() < 1e-6);
        assert_eq!(uniform(12345).to_bits(), uniform(12345).to_bits());
    }

    #[test]
    fn test_top_bits_stay_below_one() {
        assert!(unit_from_bits(u32::MAX) < 1.0);
        assert!(unit_from_bits(u32::MAX - 64) < 1.0);
        assert_eq!(unit_from_bits(0), 0.0);
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        const BUCKETS: usize = 10;
        const SAMPLES: u32 = 100_000;
        let mut counts = [0u32; BUCKETS];
        for s in 0..SAMPLES {
            let bucket = (uniform(s) * BUCKETS as f32) as usize;
            counts[bucket.min(BUCKETS - 1)] += 1;
        }

        // Chi-square with 9 degrees of freedom; 27.9 is the p = 0.001 cutoff
        let expected = SAMPLES as f32 / BUCKETS as f32;
        let chi2: f32 = counts
            .iter()
            .map(|&c| {
                let d = c as f32 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi2 < 27.9, "chi-square too large: {chi2} ({counts:?})");
    }

    #[test]
    fn test_fold_seed() {
        assert_eq!(fold_seed(42), 42);
        assert_eq!(fold_seed(1 << 32), 1);
        assert_ne!(fold_seed(1 << 32), fold_seed(0));
    }

    #[test]
    fn test_centered_range() {
        for s in 0..1000 {
            let v = uniform_centered(s, 50.0);
            assert!((-25.0..25.0).contains(&v));
        }
    }

    proptest! {
        #[test]
        fn uniform_in_unit_interval(seed in any::<u32>()) {
            let v = uniform(seed);
            prop_assert!((0.0..1.0).contains(&v));
        }

        #[test]
        fn uniform_is_deterministic(seed in any::<u32>()) {
            prop_assert_eq!(uniform(seed).to_bits(), uniform(seed).to_bits());
        }

        #[test]
        fn uniform_range_respects_bounds(seed in any::<u32>(), lo in -100.0f32..100.0, span in 0.001f32..100.0) {
            let v = uniform_range(seed, lo, lo + span);
            prop_assert!(v >= lo && v <= lo + span);
        }
    }
}
