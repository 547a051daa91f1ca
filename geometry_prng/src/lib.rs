// Deterministic, portable pseudo-random number generator for the artwork.
//
// xoshiro256++ (Blackman & Vigna, 2019) expanded from a single `u64` seed by
// SplitMix64. Every random decision in a performance (base hue, scene
// sampling, catalog permutation, blend-mode picks) draws from one `ArtRng`
// owned by the artwork, so a seed fully determines the catalog and the order
// in which scenes play.
//
// On top of the raw generator this crate provides the two sampling
// primitives the scene generator needs: `choose` (uniform pick from a slice)
// and `shuffle` (uniform Fisher-Yates permutation). Both are built on
// rejection-sampled integer ranges so that no index is favoured by modulo
// bias.
//
// **Critical constraint: determinism.** Identical prior state must yield
// identical output on every platform. No OS entropy, no stdlib hashing, and
// no floating point inside the core generator.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator. Cloneable and serializable so a performance can be
/// snapshotted mid-stream and resumed bit-for-bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtRng {
    s: [u64; 4],
}

impl ArtRng {
    /// Seed a generator. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low < high, "range_f64: low must be less than high");
        let v = low + self.next_f64() * (high - low);
        // Rounding in the multiply can land exactly on `high`.
        if v >= high { low } else { v }
    }

    /// Uniform integer in `[low, high)`, rejection sampled.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform index in `[low, high)`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick one element uniformly.
    ///
    /// Panics on an empty slice: there is nothing to choose and callers only
    /// ever sample from fixed, non-empty catalogs.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "choose: cannot pick from an empty slice");
        &items[self.range_usize(0, items.len())]
    }

    /// In-place uniform permutation (Fisher-Yates, walking down from the end).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_usize(0, i + 1);
            items.swap(i, j);
        }
    }
}

/// SplitMix64 step, used only to expand the seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
