//! # Simplex Noise Implementation
//!
//! Pure, seeded 2D simplex noise with fractal octave composition.
//!
//! ## Determinism Guarantee
//!
//! A sample is a function of `(seed, x, y)` only. Lattice corners are
//! hashed with the seed directly instead of going through a shuffled
//! permutation table, so there is no per-instance state, no 256-cell
//! repetition, and the same value comes back on any thread in any order.
//!
//! ## Channels
//!
//! Every generator input (elevation, moisture, cluster detection, ...) reads
//! its own [`NoiseChannel`], whose seed is derived from the world seed plus a
//! fixed channel offset. Channels are uncorrelated but individually
//! reproducible.

use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Uses a hash mix so adjacent purposes give unrelated streams.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Returns the seed of one noise channel.
    #[inline]
    #[must_use]
    pub const fn channel(self, channel: NoiseChannel) -> Self {
        self.derive(channel.offset())
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(42)
    }
}

/// Independent noise streams read by the generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoiseChannel {
    /// Continent-scale base elevation.
    Continental,
    /// Plate-boundary uplift.
    Tectonic,
    /// Climate variation layered over latitude.
    Climate,
    /// Per-block elevation variation.
    RegionalElevation,
    /// Per-block moisture.
    RegionalMoisture,
    /// Per-block temperature variation.
    RegionalTemperature,
    /// Minor river placement inside river-bearing sectors.
    MinorRiver,
    /// Resource-rich area flag.
    ResourceArea,
    /// Settlement placement.
    Settlement,
    /// Per-tile terrain selection.
    LocalTerrain,
    /// Per-tile elevation relief.
    LocalElevation,
    /// Stream courses through river-bearing blocks.
    LocalRiver,
    /// Resource cluster center detection.
    ClusterDetect,
    /// Resource kind of a cluster.
    ClusterKind,
    /// Per-tile spawn jitter inside a cluster.
    ClusterDensity,
    /// Per-tile rarity jitter inside a cluster.
    ClusterRarity,
}

impl NoiseChannel {
    /// Offset mixed into the world seed for this channel.
    #[must_use]
    pub const fn offset(self) -> u64 {
        match self {
            Self::Continental => 0,
            Self::Tectonic => 1_000,
            Self::Climate => 2_000,
            Self::RegionalElevation => 3_000,
            Self::RegionalMoisture => 3_100,
            Self::RegionalTemperature => 3_200,
            Self::MinorRiver => 3_300,
            Self::ResourceArea => 3_400,
            Self::Settlement => 3_500,
            Self::LocalTerrain => 4_000,
            Self::LocalElevation => 4_100,
            Self::LocalRiver => 4_200,
            Self::ClusterDetect => 6_000,
            Self::ClusterKind => 6_100,
            Self::ClusterDensity => 7_000,
            Self::ClusterRarity => 8_000,
        }
    }
}

/// Frequency and octave shape of one sampled layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    /// Multiplier applied to absolute tile coordinates.
    pub frequency: f64,
    /// Number of octaves (at least 1).
    pub octaves: u32,
    /// Amplitude decay per octave.
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    /// Frequency growth per octave.
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f64,
}

const fn default_persistence() -> f64 {
    0.5
}

const fn default_lacunarity() -> f64 {
    2.0
}

impl NoiseLayer {
    /// Creates a layer with the usual 0.5 / 2.0 octave shape.
    #[must_use]
    pub const fn new(frequency: f64, octaves: u32) -> Self {
        Self {
            frequency,
            octaves,
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
        }
    }
}

/// 12 gradient directions for 2D simplex.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// 2D Simplex noise generator bound to one seed.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
/// The struct is a `Copy` seed wrapper; sampling reads nothing else.
///
/// # Example
///
/// ```rust,ignore
/// let noise = SimplexNoise::new(WorldSeed::new(42).channel(NoiseChannel::Continental));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimplexNoise {
    seed: u64,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a noise generator from a seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self { seed: seed.value() }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::similar_names)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        // Unskew to get first corner in simplex
        let unskew = (i + j) as f64 * Self::G2;
        let x0 = x - (i as f64 - unskew);
        let y0 = y - (j as f64 - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let n0 = Self::contribution(x0, y0, self.corner(i, j));
        let n1 = Self::contribution(x1, y1, self.corner(i + i1, j + j1));
        let n2 = Self::contribution(x2, y2, self.corner(i + 1, j + 1));

        // 70.0 normalizes the output; the clamp covers the diagonal gradients
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Samples noise mapped to [0, 1].
    #[inline]
    #[must_use]
    pub fn sample_unit(&self, x: f64, y: f64) -> f64 {
        (self.sample(x, y) + 1.0) * 0.5
    }

    /// Generates octaved (fractal) noise.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers; zero yields 0.0
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1], normalized by the total amplitude.
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            (total / max_amplitude).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Samples a configured layer at absolute tile coordinates.
    #[inline]
    #[must_use]
    pub fn layer(&self, layer: &NoiseLayer, x: f64, y: f64) -> f64 {
        self.octaved(
            x * layer.frequency,
            y * layer.frequency,
            layer.octaves,
            layer.persistence,
            layer.lacunarity,
        )
    }

    /// Samples noise and maps to integer range [0, max).
    ///
    /// Useful for selecting one of `max` discrete options.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample_discrete(&self, x: f64, y: f64, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let scaled = self.sample_unit(x, y) * f64::from(max);
        (scaled as u32).min(max - 1)
    }

    /// Gradient index for a lattice corner.
    #[inline]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn corner(&self, i: i64, j: i64) -> usize {
        let mut h = self.seed
            ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (j as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        (h % 12) as usize
    }

    /// Calculates the contribution from one corner of the simplex.
    #[inline]
    fn contribution(x: f64, y: f64, gradient_index: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRADIENTS[gradient_index];
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }
}

/// Single-sample noise for `seed` at `(x, y)`, in [-1, 1].
#[inline]
#[must_use]
pub fn scalar_noise(seed: WorldSeed, x: f64, y: f64) -> f64 {
    SimplexNoise::new(seed).sample(x, y)
}

/// Multi-octave noise for `seed` at `(x, y)`, normalized to [-1, 1].
#[inline]
#[must_use]
pub fn octave_noise(seed: WorldSeed, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    SimplexNoise::new(seed).octaved(x, y, octaves, persistence, lacunarity)
}

/// Floor to `i64` without going through `f64::floor`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 { xi - 1 } else { xi }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = SimplexNoise::new(seed);
        let noise2 = SimplexNoise::new(seed);

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(noise1.sample(x, y).to_bits(), noise2.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_order_independence() {
        let seed = WorldSeed::new(7);
        let forward: Vec<f64> = (0..50).map(|i| scalar_noise(seed, f64::from(i) * 0.3, 1.5)).collect();
        let backward: Vec<f64> = (0..50).rev().map(|i| scalar_noise(seed, f64::from(i) * 0.3, 1.5)).collect();
        let reversed: Vec<f64> = backward.into_iter().rev().collect();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_different_seeds_different_results() {
        let v1 = scalar_noise(WorldSeed::new(1), 100.3, 100.7);
        let v2 = scalar_noise(WorldSeed::new(2), 100.3, 100.7);
        assert!((v1 - v2).abs() > f64::EPSILON, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        let noise = SimplexNoise::new(WorldSeed::new(42));

        for i in 0..10_000 {
            let x = (f64::from(i) * 0.1) - 500.0;
            let y = (f64::from(i) * 0.13) - 650.0;
            let value = noise.sample(x, y);
            assert!((-1.0..=1.0).contains(&value), "Value {value} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn test_far_coordinates_stay_in_range() {
        let noise = SimplexNoise::new(WorldSeed::new(3));
        for k in 0..200 {
            let far = 1.0e9 + f64::from(k) * 0.37;
            let value = noise.sample(far, -far);
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_continuity() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        let delta = 0.001;

        let v1 = noise.sample(100.0, 100.0);
        let v2 = noise.sample(100.0 + delta, 100.0);
        let v3 = noise.sample(100.0, 100.0 + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_octaved_noise_normalized() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        for i in 0..2_000 {
            let x = f64::from(i) * 0.77;
            let value = noise.octaved(x, -x * 0.5, 6, 0.5, 2.0);
            assert!((-1.0..=1.0).contains(&value), "Octaved value {value} out of range");
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        assert!(octave_noise(WorldSeed::new(1), 3.0, 4.0, 0, 0.5, 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_octave_matches_scalar() {
        let seed = WorldSeed::new(99);
        let a = octave_noise(seed, 12.25, -3.5, 1, 0.5, 2.0);
        let b = scalar_noise(seed, 12.25, -3.5);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, base.derive(1), "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
    }

    #[test]
    fn test_channels_are_distinct() {
        let seed = WorldSeed::new(42);
        let channels = [
            NoiseChannel::Continental,
            NoiseChannel::Tectonic,
            NoiseChannel::Climate,
            NoiseChannel::RegionalElevation,
            NoiseChannel::RegionalMoisture,
            NoiseChannel::RegionalTemperature,
            NoiseChannel::MinorRiver,
            NoiseChannel::ResourceArea,
            NoiseChannel::Settlement,
            NoiseChannel::LocalTerrain,
            NoiseChannel::LocalElevation,
            NoiseChannel::LocalRiver,
            NoiseChannel::ClusterDetect,
            NoiseChannel::ClusterKind,
            NoiseChannel::ClusterDensity,
            NoiseChannel::ClusterRarity,
        ];
        for (i, a) in channels.iter().enumerate() {
            for b in &channels[i + 1..] {
                assert_ne!(seed.channel(*a), seed.channel(*b), "{a:?} collides with {b:?}");
            }
        }
    }

    #[test]
    fn test_discrete_sampling() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        for i in 0..1_000 {
            let x = f64::from(i) * 0.5;
            assert!(noise.sample_discrete(x, x * 1.4, 10) < 10);
        }
        assert_eq!(noise.sample_discrete(1.0, 2.0, 0), 0);
    }

    #[test]
    fn test_fast_floor_negative() {
        assert_eq!(fast_floor(-0.5), -1);
        assert_eq!(fast_floor(-1.0), -1);
        assert_eq!(fast_floor(2.999), 2);
    }
}
