//! Coherent noise field
//!
//! 3D OpenSimplex noise from the `noise` crate. The gradient, which the curl
//! construction in the cord consumes, is taken by central differences.
//!
//! Unlike the hash RNG the field is not seeded per call: it is seeded once
//! and then varies smoothly in space.

use glam::{DVec3, Vec3};
use noise::{NoiseFn, OpenSimplex};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Central-difference step in noise space
const GRADIENT_EPS: f64 = 1e-3;

/// A smooth scalar field over R^3
///
/// Implementations must be deterministic: the same point always yields the
/// same bits.
pub trait NoiseField {
    /// Field value and its spatial gradient at `p`
    fn value_and_gradient(&self, p: Vec3) -> (f32, Vec3);

    /// Field value at `p`
    fn value(&self, p: Vec3) -> f32 {
        self.value_and_gradient(p).0
    }

    /// Spatial gradient at `p`
    fn gradient(&self, p: Vec3) -> Vec3 {
        self.value_and_gradient(p).1
    }
}

/// Seeded 3D simplex noise
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    seed: u64,
    noise: OpenSimplex,
}

impl Default for SimplexNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SimplexNoise {
    /// Seed the field. The 64-bit seed is mixed down to the generator's 32
    /// bits through PCG so that every seed bit matters.
    pub fn new(seed: u64) -> Self {
        let noise_seed = Pcg32::seed_from_u64(seed).next_u32();
        log::debug!("Simplex noise seeded with {} ({})", seed, noise_seed);
        Self {
            seed,
            noise: OpenSimplex::new(noise_seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn sample(&self, p: DVec3) -> f64 {
        self.noise.get(p.to_array())
    }
}

impl NoiseField for SimplexNoise {
    fn value_and_gradient(&self, p: Vec3) -> (f32, Vec3) {
        if !p.is_finite() {
            return (0.0, Vec3::ZERO);
        }

        let p = p.as_dvec3();
        let value = self.sample(p);
        let diff = |axis: DVec3| {
            (self.sample(p + axis * GRADIENT_EPS) - self.sample(p - axis * GRADIENT_EPS))
                / (2.0 * GRADIENT_EPS)
        };
        let gradient = DVec3::new(diff(DVec3::X), diff(DVec3::Y), diff(DVec3::Z));

        (value as f32, gradient.as_vec3())
    }
}
