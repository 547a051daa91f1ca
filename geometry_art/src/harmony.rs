// Six-hue colour harmony derived from one base hue.
//
// The set is the base hue, its two split-complements (+150 / +210), the
// complement (+180), and the complement's own split-complements. All values
// are degrees on the HSB wheel, wrapped into [0, 360).
//
// Order is significant: scene generation samples from `HarmonySet::hues()`
// by index, so changing the order changes every seeded catalog.

use geometry_prng::ArtRng;
use serde::{Deserialize, Serialize};

/// A hue in degrees, always in [0, 360) once it has passed through
/// `wrap_hue`.
pub type Hue = f64;

/// Wrap any angle into [0, 360).
pub fn wrap_hue(h: Hue) -> Hue {
    let w = h.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if w >= 360.0 { 0.0 } else { w }
}

pub fn complement(h: Hue) -> Hue {
    wrap_hue(h + 180.0)
}

/// `(h + 150, h + 210)`, wrapped.
pub fn split_complements(h: Hue) -> (Hue, Hue) {
    (wrap_hue(h + 150.0), wrap_hue(h + 210.0))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonySet {
    pub base: Hue,
    pub base_split_1: Hue,
    pub base_split_2: Hue,
    pub complement: Hue,
    pub comp_split_1: Hue,
    pub comp_split_2: Hue,
}

impl HarmonySet {
    /// Derive the full set from a base hue. Pure.
    pub fn from_base(base: Hue) -> Self {
        let base = wrap_hue(base);
        let comp = complement(base);
        let (base_split_1, base_split_2) = split_complements(base);
        let (comp_split_1, comp_split_2) = split_complements(comp);
        Self {
            base,
            base_split_1,
            base_split_2,
            complement: comp,
            comp_split_1,
            comp_split_2,
        }
    }

    /// Sample the base hue uniformly from [0, 360) and derive the set.
    pub fn sample(rng: &mut ArtRng) -> Self {
        Self::from_base(rng.range_f64(0.0, 360.0))
    }

    /// All six hues, in sampling order.
    pub fn hues(&self) -> [Hue; 6] {
        [
            self.base,
            self.base_split_1,
            self.base_split_2,
            self.complement,
            self.comp_split_1,
            self.comp_split_2,
        ]
    }

    /// `[base, base_split_1, base_split_2]`.
    pub fn base_triad(&self) -> [Hue; 3] {
        [self.base, self.base_split_1, self.base_split_2]
    }

    /// `[complement, comp_split_1, comp_split_2]`.
    pub fn complementary_triad(&self) -> [Hue; 3] {
        [self.complement, self.comp_split_1, self.comp_split_2]
    }
}
