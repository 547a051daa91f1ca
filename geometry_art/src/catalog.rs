// Fixed catalogs sampled by scene generation.
//
// Patterns are the sacred-geometry motifs, shapes are the polar primitives a
// motif is built from. Both are closed enums with an `ALL` table in a fixed
// order; the order is part of the determinism contract because generation
// samples by index.
//
// See also: `render.rs` for the pattern dispatch table, `scene.rs` for the
// generator that samples these catalogs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sacred-geometry pattern drawn inside a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pattern {
    VesicaPiscis,
    SeedOfLife,
    EggOfLife,
    FlowerOfLife,
    FruitOfLife,
    MetatronsCube,
    TreeOfLife,
}

impl Pattern {
    pub const ALL: [Pattern; 7] = [
        Pattern::VesicaPiscis,
        Pattern::SeedOfLife,
        Pattern::EggOfLife,
        Pattern::FlowerOfLife,
        Pattern::FruitOfLife,
        Pattern::MetatronsCube,
        Pattern::TreeOfLife,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::VesicaPiscis => "vesica piscis",
            Pattern::SeedOfLife => "seed of life",
            Pattern::EggOfLife => "egg of life",
            Pattern::FlowerOfLife => "flower of life",
            Pattern::FruitOfLife => "fruit of life",
            Pattern::MetatronsCube => "metatron's cube",
            Pattern::TreeOfLife => "tree of life",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Polar primitive a pattern is composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    Ellipse,
    Triangle,
    Square,
    Pentagon,
    Hexagon,
    Heptagon,
    Octagon,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::Ellipse,
        Shape::Triangle,
        Shape::Square,
        Shape::Pentagon,
        Shape::Hexagon,
        Shape::Heptagon,
        Shape::Octagon,
    ];

    /// Number of polygon sides, `None` for the ellipse.
    pub fn sides(self) -> Option<u32> {
        match self {
            Shape::Ellipse => None,
            Shape::Triangle => Some(3),
            Shape::Square => Some(4),
            Shape::Pentagon => Some(5),
            Shape::Hexagon => Some(6),
            Shape::Heptagon => Some(7),
            Shape::Octagon => Some(8),
        }
    }
}

/// Flat backdrop of the second slot in a Pairs scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Background {
    Black,
    White,
}

impl Background {
    pub const ALL: [Background; 2] = [Background::Black, Background::White];

    /// HSB brightness of the backdrop (saturation is always 0).
    pub fn brightness(self) -> f64 {
        match self {
            Background::Black => 0.0,
            Background::White => 100.0,
        }
    }
}

/// Compositing mode the renderer applies for the duration of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    Blend,
    Exclusion,
    Screen,
    Difference,
    HardLight,
}

impl BlendMode {
    pub const ALL: [BlendMode; 5] = [
        BlendMode::Blend,
        BlendMode::Exclusion,
        BlendMode::Screen,
        BlendMode::Difference,
        BlendMode::HardLight,
    ];
}
