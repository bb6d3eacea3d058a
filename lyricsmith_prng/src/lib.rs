// Injected random source for melody generation.
//
// Every random decision the engine makes (default tempo, root pitch, pitch
// contour jitter, song ids, vocal contour wobble) is drawn from a `SongRng`
// that the caller passes in. Nothing in the workspace reaches for a global
// or OS-seeded generator, so a song is fully reproducible from its input
// and seed.
//
// The generator is xoshiro256++ (Blackman & Vigna, 2019), seeded through
// SplitMix64. It is hand-rolled so the output stream is identical on every
// platform and compiler version.
//
// **Determinism constraint.** The core `next_u64` step uses only integer
// operations. Float helpers derive from it by bit-shifting, never from
// platform float state.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator owned by one generation call.
///
/// Concurrent callers must each hold their own `SongRng`; use
/// [`SongRng::fork`] to split an independent stream off an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRng {
    state: [u64; 4],
}

impl SongRng {
    /// Seed a generator from a single `u64`.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let state = [
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
        ];
        Self { state }
    }

    /// Split off an independent generator, advancing `self`.
    ///
    /// The child is seeded from this stream's next output, so two forks
    /// taken in the same order from the same parent are identical.
    pub fn fork(&mut self) -> Self {
        SongRng::new(self.next_u64())
    }

    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[0].wrapping_add(s[3]).rotate_left(23).wrapping_add(s[0]);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, bound)` without modulo bias.
    ///
    /// Panics if `bound == 0`.
    pub fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "below: bound must be positive");
        if bound.is_power_of_two() {
            return self.next_u64() & (bound - 1);
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Uniform integer in `[low, high]`, both ends inclusive.
    ///
    /// Panics if `low > high`.
    pub fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "range_inclusive: low must be <= high");
        let span = high.abs_diff(low);
        if span == u64::MAX {
            return self.next_u64() as i64;
        }
        low.wrapping_add(self.below(span + 1) as i64)
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// Index drawn in proportion to `weights`.
    ///
    /// Non-positive weights are never chosen. Returns `None` when no weight
    /// is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if target < w {
                return Some(i);
            }
            target -= w;
            last_positive = Some(i);
        }
        // Float rounding can leave `target` a hair above the final weight.
        last_positive
    }

    /// Normally distributed sample (Box-Muller, one value per call).
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + z * std_dev
    }

    /// 16 random bytes, used for song identifiers.
    pub fn next_128_bits(&mut self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.next_u64().to_le_bytes());
        out[8..].copy_from_slice(&self.next_u64().to_le_bytes());
        out
    }
}

/// SplitMix64 step, used only to expand a seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SongRng::new(7);
        let mut b = SongRng::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SongRng::new(7);
        let mut b = SongRng::new(8);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn fork_is_reproducible_and_independent() {
        let mut parent_a = SongRng::new(99);
        let mut parent_b = SongRng::new(99);
        let mut child_a = parent_a.fork();
        let mut child_b = parent_b.fork();
        assert_eq!(child_a.next_u64(), child_b.next_u64());
        // The parent moved on, so it no longer matches the child.
        assert_ne!(parent_a, child_a);
    }

    #[test]
    fn unit_float_range() {
        let mut rng = SongRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_inclusive_hits_both_ends() {
        let mut rng = SongRng::new(3);
        let mut seen = [false; 3];
        for _ in 0..1000 {
            let v = rng.range_inclusive(-1, 1);
            assert!((-1..=1).contains(&v));
            seen[(v + 1) as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn range_inclusive_single_value() {
        let mut rng = SongRng::new(3);
        assert_eq!(rng.range_inclusive(100, 100), 100);
    }

    #[test]
    fn choose_empty_and_nonempty() {
        let mut rng = SongRng::new(5);
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty), None);
        let keys = [57, 59, 61, 65];
        for _ in 0..100 {
            let k = rng.choose(&keys).copied().unwrap();
            assert!(keys.contains(&k));
        }
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SongRng::new(11);
        for _ in 0..1000 {
            let i = rng.weighted_index(&[0.0, 1.0, 0.0, 2.0]).unwrap();
            assert!(i == 1 || i == 3, "picked zero-weight index {i}");
        }
        assert_eq!(rng.weighted_index(&[0.0, -1.0]), None);
    }

    #[test]
    fn weighted_index_follows_weights() {
        let mut rng = SongRng::new(21);
        let mut counts = [0usize; 3];
        let n = 20_000;
        for _ in 0..n {
            counts[rng.weighted_index(&[0.2, 0.6, 0.2]).unwrap()] += 1;
        }
        let middle = counts[1] as f64 / n as f64;
        assert!((0.55..0.65).contains(&middle), "middle share {middle}");
    }

    #[test]
    fn gaussian_mean_is_close() {
        let mut rng = SongRng::new(42);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.gaussian(10.0, 2.0)).sum::<f64>() / n as f64;
        assert!((mean - 10.0).abs() < 0.1, "sample mean {mean}");
    }

    #[test]
    fn serde_roundtrip_continues_stream() {
        let mut rng = SongRng::new(42);
        for _ in 0..10 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SongRng = serde_json::from_str(&json).unwrap();
        for _ in 0..10 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
