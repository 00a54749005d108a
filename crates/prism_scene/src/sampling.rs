//! Spherical Fibonacci sample directions with a rotating read cursor.
//!
//! The set is generated once and never changes. Each frame the cursor moves
//! forward so the kernel reads a different window of the same directions.

use prism_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::record::SampleRecord;

/// Number of directions the kernel expects.
pub const SAMPLE_COUNT: usize = 4096;

/// How far the cursor moves each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CursorStep {
    /// Same increment every frame.
    Fixed { step: usize },
    /// `ceil(rate * dt)` samples per frame, so the cursor sweeps at a fixed
    /// rate regardless of frame time.
    TimeScaled { rate: f32 },
}

impl Default for CursorStep {
    fn default() -> Self {
        CursorStep::TimeScaled { rate: 1793.0 }
    }
}

impl CursorStep {
    pub fn step_for(&self, dt: f32) -> usize {
        match *self {
            CursorStep::Fixed { step } => step,
            CursorStep::TimeScaled { rate } => (rate * dt).ceil().max(0.0) as usize,
        }
    }
}

/// Golden-angle spherical Fibonacci directions.
///
/// The first half walks down the upper hemisphere (y from just below 1 to
/// just above 0). The second half mirrors it: index `n - 1 - i` is index `i`
/// with y negated. `n` must be even.
///
/// Accumulated in f64 with the single-precision pi widened to f64; the
/// resulting bits are part of the kernel contract.
pub fn spherical_fibonacci(n: usize) -> Vec<Vec3> {
    let mut output = vec![Vec3::ZERO; n];
    let half = n / 2;

    let pi = std::f32::consts::PI as f64;
    let dphi = pi * (3.0 - 5f64.sqrt());
    let dz = 1.0 / half as f64;
    let mut phi = 0.0f64;
    let mut z = 1.0 - dz / 2.0;

    for point in output.iter_mut().take(half) {
        let theta = z.acos();
        let phi_j = phi % (2.0 * pi);
        *point = Vec3::new(
            (phi_j.cos() * theta.sin()) as f32,
            z as f32,
            (theta.sin() * phi_j.sin()) as f32,
        );
        z -= dz;
        phi += dphi;
    }

    for i in 0..half {
        let mirrored = output[i] * Vec3::new(1.0, -1.0, 1.0);
        output[n - 1 - i] = mirrored;
    }
    output
}

#[derive(Debug, Clone)]
pub struct SampleSet {
    samples: Vec<SampleRecord>,
    cursor: usize,
}

impl Default for SampleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSet {
    /// The standard 4096-direction set.
    pub fn new() -> Self {
        Self::with_len(SAMPLE_COUNT)
    }

    /// A set of `n` directions. `n` is rounded down to an even count, minimum 2.
    pub fn with_len(n: usize) -> Self {
        let n = (n & !1).max(2);
        let samples = spherical_fibonacci(n)
            .into_iter()
            .map(|d| SampleRecord {
                direction: d.to_array(),
            })
            .collect();

        Self { samples, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Current read offset, always in `[0, len)`.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn direction(&self, index: usize) -> Vec3 {
        Vec3::from_array(self.samples[index % self.samples.len()].direction)
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Move the cursor by `step`, wrapping modulo the set size.
    pub fn advance_cursor(&mut self, step: usize) -> usize {
        let n = self.samples.len();
        self.cursor = (self.cursor + step % n) % n;
        self.cursor
    }

    /// Advance by the amount `policy` prescribes for a frame of `dt` seconds.
    pub fn advance_frame(&mut self, policy: &CursorStep, dt: f32) -> usize {
        let step = policy.step_for(dt);
        let offset = self.advance_cursor(step);
        log::debug!("Sample cursor +{} -> {}", step, offset);
        offset
    }

    /// `len` directions starting at the cursor, wrapping around the end.
    pub fn window(&self, len: usize) -> impl Iterator<Item = Vec3> + '_ {
        (0..len).map(move |i| self.direction(self.cursor + i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcd(a: usize, b: usize) -> usize {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }

    #[test]
    fn test_sample_set_size_and_stride() {
        let set = SampleSet::new();
        assert_eq!(set.len(), 4096);
        assert_eq!(set.as_bytes().len(), 4096 * 12);
    }

    #[test]
    fn test_samples_are_unit_length() {
        let set = SampleSet::new();
        for i in 0..set.len() {
            assert!((set.direction(i).length() - 1.0).abs() < 1e-5, "sample {}", i);
        }
    }

    #[test]
    fn test_mirror_invariant() {
        let set = SampleSet::new();
        for i in 0..2048 {
            let a = set.direction(i);
            let b = set.direction(4095 - i);
            assert_eq!(b, Vec3::new(a.x, -a.y, a.z));
        }
    }

    #[test]
    fn test_first_half_is_upper_hemisphere() {
        let set = SampleSet::new();
        for i in 0..2048 {
            assert!(set.direction(i).y > 0.0);
        }
        assert!((set.direction(0).y - (1.0 - 0.5 / 2048.0)).abs() < 1e-6);
        // phi starts at zero, so the first point lies in the XY plane.
        assert_eq!(set.direction(0).z, 0.0);
    }

    #[test]
    fn test_distribution_is_roughly_balanced() {
        let set = SampleSet::new();
        let mean = (0..set.len()).map(|i| set.direction(i)).sum::<Vec3>() / set.len() as f32;
        assert!(mean.length() < 0.01);
    }

    #[test]
    fn test_cursor_period() {
        for step in [1usize, 2, 3, 6, 64, 1000, 1793, 2048, 4095] {
            let mut set = SampleSet::new();
            let period = 4096 / gcd(step, 4096);
            for k in 1..=period {
                let offset = set.advance_cursor(step);
                assert!(offset < 4096);
                if k < period {
                    assert_ne!(offset, 0, "step {} returned early at {}", step, k);
                }
            }
            assert_eq!(set.offset(), 0);
        }
    }

    #[test]
    fn test_cursor_handles_large_steps() {
        let mut set = SampleSet::new();
        assert_eq!(set.advance_cursor(4096 * 3 + 5), 5);
        assert_eq!(set.advance_cursor(usize::MAX), (5 + usize::MAX % 4096) % 4096);
    }

    #[test]
    fn test_cursor_step_policies() {
        assert_eq!(CursorStep::Fixed { step: 7 }.step_for(0.5), 7);
        assert_eq!(CursorStep::default().step_for(1.0 / 60.0), 30);
        assert_eq!(CursorStep::TimeScaled { rate: 100.0 }.step_for(0.0), 0);

        let mut set = SampleSet::new();
        set.advance_frame(&CursorStep::Fixed { step: 4000 }, 0.016);
        assert_eq!(set.advance_frame(&CursorStep::Fixed { step: 100 }, 0.016), 4);
    }

    #[test]
    fn test_window_wraps() {
        let mut set = SampleSet::with_len(8);
        set.advance_cursor(6);
        let window: Vec<_> = set.window(4).collect();

        assert_eq!(window[0], set.direction(6));
        assert_eq!(window[2], set.direction(0));
        assert_eq!(window[3], set.direction(1));
    }

    #[test]
    fn test_with_len_rounds_to_even() {
        assert_eq!(SampleSet::with_len(9).len(), 8);
        assert_eq!(SampleSet::with_len(0).len(), 2);
    }

    /// Straight-line construction the kernel's consumers were built against.
    fn reference_directions() -> Vec<[f32; 3]> {
        let count = 4096;
        let n = (count / 2) as f64;
        let pi = std::f32::consts::PI as f64;
        let dphi = pi * (3.0 - 5f64.sqrt());
        let dz = 1.0 / n;
        let mut phi = 0.0f64;
        let mut z = 1.0 - dz / 2.0;

        let mut out = vec![[0.0f32; 3]; count];
        for j in 0..count / 2 {
            let zj = z;
            let thetaj = zj.acos();
            let phij = phi % (2.0 * pi);
            z -= dz;
            phi += dphi;
            let (x, y, zz) = (
                (phij.cos() * thetaj.sin()) as f32,
                zj as f32,
                (thetaj.sin() * phij.sin()) as f32,
            );
            out[j] = [x, y, zz];
            out[count - 1 - j] = [x, -y, zz];
        }
        out
    }

    #[test]
    fn test_matches_reference_bit_for_bit() {
        let set = SampleSet::new();
        let reference = reference_directions();

        let differing = set
            .samples()
            .iter()
            .zip(&reference)
            .filter(|(sample, expected)| {
                sample.direction.map(f32::to_bits) != expected.map(f32::to_bits)
            })
            .count();
        assert_eq!(differing, 0);
    }

    #[test]
    fn test_pinned_leading_samples() {
        let set = SampleSet::new();
        let z0 = 1.0 - 0.5 / 2048.0f64;
        let s0 = z0.acos().sin();
        assert_eq!(set.samples()[0].direction, [s0 as f32, z0 as f32, 0.0]);

        // The step angle uses pi at single precision.
        let dphi = std::f32::consts::PI as f64 * (3.0 - 5f64.sqrt());
        let z1 = z0 - 1.0 / 2048.0;
        let s1 = z1.acos().sin();
        assert_eq!(
            set.samples()[1].direction,
            [(dphi.cos() * s1) as f32, z1 as f32, (s1 * dphi.sin()) as f32]
        );
        assert_eq!(set.samples()[4094].direction, {
            let [x, y, z] = set.samples()[1].direction;
            [x, -y, z]
        });
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(spherical_fibonacci(64), spherical_fibonacci(64));
    }
}
