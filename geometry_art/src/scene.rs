// Scene data model and seeded catalog generation.
//
// A performance is split into acts; each act owns an ordered list of scenes
// of its own kind:
//
// - `Act::Pairs`: one hue and its complement, and two pattern slots. The
//   second slot sits on a flat black or white backdrop.
// - `Act::Triads`: six cells coloured from one triad of the harmony set.
//   Even scenes use the base triad, odd scenes the complementary triad, and
//   the six (background, foreground) index pairs are a fixed table.
// - `Act::Layers`: one hue and its complement, with four distinct patterns
//   and four distinct shapes taken from a fresh permutation of the full
//   catalogs.
//
// `generate_catalog` builds all three lists and then permutes each one, so
// playback order is random while the generated multiset is preserved. After
// that the catalog is read-only until an explicit regeneration.
//
// **Critical constraint: determinism.** The PRNG draw order is: Pairs
// (generation, then shuffle), Triads, Layers. Reordering any sampling call
// here changes every seeded performance.

use crate::catalog::{Background, Pattern, Shape};
use crate::harmony::{HarmonySet, Hue, complement};
use geometry_prng::ArtRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Act identifiers, named after what their scenes contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Act {
    Pairs,
    Triads,
    Layers,
}

impl Act {
    pub const ALL: [Act; 3] = [Act::Pairs, Act::Triads, Act::Layers];
}

impl fmt::Display for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Act::Pairs => "pairs",
            Act::Triads => "triads",
            Act::Layers => "layers",
        };
        f.write_str(name)
    }
}

/// Number of cells in a Triads scene.
pub const TRIAD_CELLS: usize = 6;

/// Number of pattern/shape layers in a Layers scene.
pub const LAYER_COUNT: usize = 4;

/// (background index, foreground index) into the active triad, one per
/// Triads cell.
pub const TRIAD_COMBINATIONS: [(usize, usize); TRIAD_CELLS] =
    [(0, 1), (1, 0), (2, 1), (1, 2), (2, 0), (0, 2)];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternSlot {
    pub pattern: Pattern,
    pub shape: Shape,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackedSlot {
    pub pattern: Pattern,
    pub shape: Shape,
    pub background: Background,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairsScene {
    pub base_hue: Hue,
    pub complementary_hue: Hue,
    pub primary: PatternSlot,
    pub secondary: BackedSlot,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriadCell {
    pub background_hue: Hue,
    pub foreground_hue: Hue,
    pub pattern: Pattern,
    pub shape: Shape,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriadsScene {
    pub cells: [TriadCell; TRIAD_CELLS],
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayersScene {
    pub base_hue: Hue,
    pub complementary_hue: Hue,
    pub patterns: [Pattern; LAYER_COUNT],
    pub shapes: [Shape; LAYER_COUNT],
}

/// One fully specified snapshot to render for a cue interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scene {
    Pairs(PairsScene),
    Triads(TriadsScene),
    Layers(LayersScene),
}

impl Scene {
    pub fn act(&self) -> Act {
        match self {
            Scene::Pairs(_) => Act::Pairs,
            Scene::Triads(_) => Act::Triads,
            Scene::Layers(_) => Act::Layers,
        }
    }
}

/// Scenes of every act, keyed by act. Owned by the artwork; replaced only on
/// regeneration or reseed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActCatalog {
    acts: BTreeMap<Act, Vec<Scene>>,
}

impl ActCatalog {
    pub fn scenes(&self, act: Act) -> &[Scene] {
        self.acts.get(&act).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scene_count(&self, act: Act) -> usize {
        self.scenes(act).len()
    }

    pub fn get(&self, act: Act, index: usize) -> Option<&Scene> {
        self.scenes(act).get(index)
    }

    /// The scene the clock points at.
    ///
    /// Panics if the act is missing or the index is past its end; the clock
    /// wraps indices on overflow, so this only fires if the catalog was never
    /// populated.
    pub fn scene(&self, act: Act, index: usize) -> &Scene {
        let scenes = self.scenes(act);
        assert!(
            index < scenes.len(),
            "scene {index} of act {act} requested but the act has {} scenes; \
             was the catalog generated?",
            scenes.len()
        );
        &scenes[index]
    }

    pub fn is_empty(&self) -> bool {
        self.acts.values().all(Vec::is_empty)
    }

    pub fn total_scenes(&self) -> usize {
        self.acts.values().map(Vec::len).sum()
    }
}

/// Generate all three acts from the harmony set. Each act holds
/// `scenes_per_act` scenes and is shuffled right after it is generated.
pub fn generate_catalog(
    harmony: &HarmonySet,
    scenes_per_act: usize,
    rng: &mut ArtRng,
) -> ActCatalog {
    let mut acts = BTreeMap::new();
    for act in Act::ALL {
        let mut scenes = generate_act(act, harmony, scenes_per_act, rng);
        rng.shuffle(&mut scenes);
        acts.insert(act, scenes);
    }
    tracing::info!(
        scenes_per_act,
        base_hue = harmony.base,
        "generated scene catalog"
    );
    ActCatalog { acts }
}

/// Generate one act's scenes in generation order (unshuffled).
pub fn generate_act(
    act: Act,
    harmony: &HarmonySet,
    count: usize,
    rng: &mut ArtRng,
) -> Vec<Scene> {
    (0..count)
        .map(|i| match act {
            Act::Pairs => Scene::Pairs(pairs_scene(harmony, rng)),
            Act::Triads => Scene::Triads(triads_scene(harmony, i, rng)),
            Act::Layers => Scene::Layers(layers_scene(harmony, rng)),
        })
        .collect()
}

fn pattern_slot(rng: &mut ArtRng) -> PatternSlot {
    PatternSlot {
        pattern: *rng.choose(&Pattern::ALL),
        shape: *rng.choose(&Shape::ALL),
    }
}

fn pairs_scene(harmony: &HarmonySet, rng: &mut ArtRng) -> PairsScene {
    let base_hue = *rng.choose(&harmony.hues());
    let primary = pattern_slot(rng);
    let slot = pattern_slot(rng);
    let background = *rng.choose(&Background::ALL);
    PairsScene {
        base_hue,
        complementary_hue: complement(base_hue),
        primary,
        secondary: BackedSlot {
            pattern: slot.pattern,
            shape: slot.shape,
            background,
        },
    }
}

fn triads_scene(harmony: &HarmonySet, index: usize, rng: &mut ArtRng) -> TriadsScene {
    let triad = if index % 2 == 0 {
        harmony.base_triad()
    } else {
        harmony.complementary_triad()
    };
    let cells = TRIAD_COMBINATIONS.map(|(bg, fg)| {
        let slot = pattern_slot(rng);
        TriadCell {
            background_hue: triad[bg],
            foreground_hue: triad[fg],
            pattern: slot.pattern,
            shape: slot.shape,
        }
    });
    TriadsScene { cells }
}

fn layers_scene(harmony: &HarmonySet, rng: &mut ArtRng) -> LayersScene {
    let base_hue = *rng.choose(&harmony.hues());
    let mut patterns = Pattern::ALL;
    rng.shuffle(&mut patterns);
    let mut shapes = Shape::ALL;
    rng.shuffle(&mut shapes);
    LayersScene {
        base_hue,
        complementary_hue: complement(base_hue),
        patterns: [patterns[0], patterns[1], patterns[2], patterns[3]],
        shapes: [shapes[0], shapes[1], shapes[2], shapes[3]],
    }
}
