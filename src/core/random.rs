//! Roll randomness.
//!
//! Physics itself is deterministic; every random choice (spawn jitter, throw
//! direction, spin, initial orientation, color seed) goes through one seeded
//! generator per engine so a fixed seed reproduces a whole roll.

use cgmath::{InnerSpace, Quaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct RollRng {
    inner: StdRng,
}

impl RollRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { inner: StdRng::seed_from_u64(seed) }
    }

    /// Seed from the host clock when the config does not pin one.
    pub fn from_entropy_source() -> Self {
        Self::from_seed(host_seed())
    }

    /// Uniform in `[lo, hi)`; returns `lo` when the range is empty.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..hi)
    }

    /// Uniform in `[-extent, extent)`.
    #[inline]
    pub fn symmetric(&mut self, extent: f32) -> f32 {
        self.range(-extent, extent)
    }

    pub fn byte(&mut self) -> u8 {
        self.inner.gen()
    }

    /// Unit vector in the XZ plane.
    pub fn horizontal_direction(&mut self) -> Vector3<f32> {
        let angle = self.range(0.0, std::f32::consts::TAU);
        Vector3::new(angle.cos(), 0.0, angle.sin())
    }

    /// Uniformly distributed rotation (Shoemake's method).
    pub fn orientation(&mut self) -> Quaternion<f32> {
        let u1 = self.range(0.0, 1.0);
        let u2 = self.range(0.0, std::f32::consts::TAU);
        let u3 = self.range(0.0, std::f32::consts::TAU);
        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();
        Quaternion::new(b * u3.cos(), a * u2.sin(), a * u2.cos(), b * u3.sin()).normalize()
    }
}

#[cfg(target_arch = "wasm32")]
fn host_seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = js_sys::Date::now() as u64;
    (hi << 32) ^ lo
}

#[cfg(not(target_arch = "wasm32"))]
fn host_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RollRng::from_seed(7);
        let mut b = RollRng::from_seed(7);
        for _ in 0..16 {
            assert_eq!(a.range(-3.0, 3.0), b.range(-3.0, 3.0));
        }
    }

    #[test]
    fn orientation_is_unit() {
        let mut rng = RollRng::from_seed(42);
        for _ in 0..32 {
            let q = rng.orientation();
            assert!((q.magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn empty_range_returns_lower_bound() {
        let mut rng = RollRng::from_seed(1);
        assert_eq!(rng.range(2.0, 2.0), 2.0);
    }
}
