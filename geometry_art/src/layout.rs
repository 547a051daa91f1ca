// Frame planning: turn (scene, progress, viewport) into positioned cells.
//
// Nothing here draws. A `FramePlan` is an ordered list of `CellDraw`s,
// each a filled background rectangle plus one or more pattern layers
// centered in it. The renderer paints cells in order; `render::paint_plan`
// does exactly that against any `Painter`.
//
// Layouts per act:
//
// - Pairs and Layers: a 2x2 grid, or a 1x4 row when the grid cells would be
//   wider than 1.5:1 on a short (< 500 px) viewport.
// - Triads: 3x2 in landscape, 2x3 in portrait. The portrait grid is filled
//   column-major (`cell = col * 3 + row`) so its first column shows the same
//   cells as the landscape top row.
//
// Pattern size is `min(cell w, cell h) * 0.35 * growth`. Growth depends on
// the act: Pairs slot-A cells reach full size at 80% of the transition and
// slot-B cells start after a 0.4 delay; everything else grows linearly.
//
// All colours are HSB with saturation and brightness in 0..=100.

use crate::catalog::{Background, Pattern, Shape};
use crate::harmony::Hue;
use crate::scene::{LayersScene, PairsScene, Scene, TRIAD_CELLS, TriadsScene};
use serde::{Deserialize, Serialize};

/// Fraction of the smaller cell side a fully grown pattern occupies.
pub const PATTERN_SCALE: f64 = 0.35;

/// Stroke weight as a fraction of the smaller viewport side.
pub const STROKE_SCALE: f64 = 0.01;

/// Grid cells wider than this (w/h) switch Pairs and Layers to a single row.
pub const SINGLE_ROW_ASPECT: f64 = 1.5;

/// ...but only when the viewport is shorter than this many pixels.
pub const SINGLE_ROW_MAX_HEIGHT: f64 = 500.0;

/// Progress at which a Pairs slot-A cell is fully grown.
pub const PRIMARY_GROWTH_END: f64 = 0.8;

/// Progress delay before a Pairs slot-B cell starts growing.
pub const SECONDARY_DELAY: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    pub fn stroke_weight(&self) -> f64 {
        self.width.min(self.height) * STROKE_SCALE
    }

    /// Whether the four-cell acts should lay out as one row.
    pub fn prefers_single_row(&self) -> bool {
        let aspect = (self.width / 2.0) / (self.height / 2.0);
        aspect > SINGLE_ROW_ASPECT && self.height < SINGLE_ROW_MAX_HEIGHT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsb {
    pub hue: Hue,
    pub saturation: f64,
    pub brightness: f64,
}

impl Hsb {
    pub const fn new(hue: Hue, saturation: f64, brightness: f64) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Fully saturated, full brightness.
    pub const fn vivid(hue: Hue) -> Self {
        Self::new(hue, 100.0, 100.0)
    }

    pub fn backdrop(background: Background) -> Self {
        Self::new(0.0, 0.0, background.brightness())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// One pattern drawn at the center of its cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternLayer {
    pub pattern: Pattern,
    pub shape: Shape,
    pub size: f64,
    pub stroke: Hsb,
    /// `None` draws the outline only.
    pub fill: Option<Hsb>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellDraw {
    pub rect: Rect,
    pub background: Hsb,
    /// Painted in order, first layer at the bottom.
    pub layers: Vec<PatternLayer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FramePlan {
    pub stroke_weight: f64,
    pub cells: Vec<CellDraw>,
}

/// Plan a whole frame for `scene` at transition `progress`.
pub fn plan_scene(scene: &Scene, progress: f64, viewport: Viewport) -> FramePlan {
    let progress = progress.clamp(0.0, 1.0);
    let cells = match scene {
        Scene::Pairs(s) => plan_pairs(s, progress, viewport),
        Scene::Triads(s) => plan_triads(s, progress, viewport),
        Scene::Layers(s) => plan_layers(s, progress, viewport),
    };
    FramePlan {
        stroke_weight: viewport.stroke_weight(),
        cells,
    }
}

/// Growth of a Pairs slot-A cell.
pub fn primary_growth(progress: f64) -> f64 {
    (progress / PRIMARY_GROWTH_END).min(1.0)
}

/// Growth of a Pairs slot-B cell.
pub fn secondary_growth(progress: f64) -> f64 {
    (progress - SECONDARY_DELAY).max(0.0)
}

fn pattern_size(rect: &Rect, growth: f64) -> f64 {
    rect.min_side() * PATTERN_SCALE * growth
}

/// Cells of a `cols` x `rows` grid in row-major order.
fn grid(viewport: Viewport, cols: usize, rows: usize) -> Vec<Rect> {
    let width = viewport.width / cols as f64;
    let height = viewport.height / rows as f64;
    (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| Rect {
                x: col as f64 * width,
                y: row as f64 * height,
                width,
                height,
            })
        })
        .collect()
}

fn four_cells(viewport: Viewport) -> Vec<Rect> {
    if viewport.prefers_single_row() {
        grid(viewport, 4, 1)
    } else {
        grid(viewport, 2, 2)
    }
}

fn outline_cell(
    rect: Rect,
    background: Hsb,
    stroke: Hsb,
    pattern: Pattern,
    shape: Shape,
    growth: f64,
) -> CellDraw {
    CellDraw {
        rect,
        background,
        layers: vec![PatternLayer {
            pattern,
            shape,
            size: pattern_size(&rect, growth),
            stroke,
            fill: None,
        }],
    }
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum PairsCell {
    /// Slot A on a `background` hue, outlined in `stroke` hue.
    Primary { background: Hue, stroke: Hue },
    /// Slot B on the scene backdrop, outlined in `stroke` hue.
    Secondary { stroke: Hue },
}

fn plan_pairs(scene: &PairsScene, progress: f64, viewport: Viewport) -> Vec<CellDraw> {
    let base = scene.base_hue;
    let comp = scene.complementary_hue;
    let order = if viewport.prefers_single_row() {
        [
            PairsCell::Primary { background: comp, stroke: base },
            PairsCell::Secondary { stroke: comp },
            PairsCell::Primary { background: base, stroke: comp },
            PairsCell::Secondary { stroke: base },
        ]
    } else {
        // Slot A on the diagonal, slot B on the anti-diagonal.
        [
            PairsCell::Primary { background: comp, stroke: base },
            PairsCell::Secondary { stroke: comp },
            PairsCell::Secondary { stroke: base },
            PairsCell::Primary { background: base, stroke: comp },
        ]
    };

    four_cells(viewport)
        .into_iter()
        .zip(order)
        .map(|(rect, cell)| match cell {
            PairsCell::Primary { background, stroke } => outline_cell(
                rect,
                Hsb::vivid(background),
                Hsb::vivid(stroke),
                scene.primary.pattern,
                scene.primary.shape,
                primary_growth(progress),
            ),
            PairsCell::Secondary { stroke } => outline_cell(
                rect,
                Hsb::backdrop(scene.secondary.background),
                Hsb::vivid(stroke),
                scene.secondary.pattern,
                scene.secondary.shape,
                secondary_growth(progress),
            ),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Triads
// ---------------------------------------------------------------------------

fn plan_triads(scene: &TriadsScene, progress: f64, viewport: Viewport) -> Vec<CellDraw> {
    let portrait = viewport.is_portrait();
    let rects = if portrait {
        grid(viewport, 2, 3)
    } else {
        grid(viewport, 3, 2)
    };

    rects
        .into_iter()
        .enumerate()
        .take(TRIAD_CELLS)
        .map(|(i, rect)| {
            let index = if portrait { (i % 2) * 3 + i / 2 } else { i };
            let cell = &scene.cells[index];
            outline_cell(
                rect,
                Hsb::vivid(cell.background_hue),
                Hsb::vivid(cell.foreground_hue),
                cell.pattern,
                cell.shape,
                progress,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// A pale (low saturation) or dark (low brightness) variant of a hue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shade {
    Tint,
    Dark,
}

impl Shade {
    fn of(self, hue: Hue) -> Hsb {
        match self {
            Shade::Tint => Hsb::new(hue, 20.0, 100.0),
            Shade::Dark => Hsb::new(hue, 100.0, 20.0),
        }
    }
}

/// One Layers cell: backdrop shade, hue and the fill scheme. `tinted`
/// selects pale outer fill with dark inner fill; otherwise the reverse.
#[derive(Clone, Copy)]
struct LayersCell {
    hue: Hue,
    backdrop: Shade,
    tinted: bool,
}

fn plan_layers(scene: &LayersScene, progress: f64, viewport: Viewport) -> Vec<CellDraw> {
    let base = scene.base_hue;
    let comp = scene.complementary_hue;
    let cell = |hue, backdrop, tinted| LayersCell {
        hue,
        backdrop,
        tinted,
    };
    // The grid's fill schemes do not follow the backdrop shade; the row's do.
    let order = if viewport.prefers_single_row() {
        [
            cell(comp, Shade::Tint, true),
            cell(comp, Shade::Dark, false),
            cell(base, Shade::Tint, true),
            cell(base, Shade::Dark, false),
        ]
    } else {
        [
            cell(comp, Shade::Dark, true),
            cell(base, Shade::Tint, false),
            cell(comp, Shade::Tint, false),
            cell(base, Shade::Dark, true),
        ]
    };

    four_cells(viewport)
        .into_iter()
        .zip(order)
        .enumerate()
        .map(|(i, (rect, spec))| {
            let size = pattern_size(&rect, progress);
            let h = spec.hue;
            let (outer, inner) = if spec.tinted {
                (
                    (Hsb::vivid(h), Hsb::new(h, 40.0, 100.0)),
                    (Hsb::new(h, 80.0, 100.0), Hsb::new(h, 100.0, 40.0)),
                )
            } else {
                (
                    (Hsb::vivid(h), Hsb::new(h, 100.0, 40.0)),
                    (Hsb::new(h, 100.0, 80.0), Hsb::new(h, 40.0, 100.0)),
                )
            };
            let pattern = scene.patterns[i];
            let shape = scene.shapes[i];
            CellDraw {
                rect,
                background: spec.backdrop.of(h),
                layers: vec![
                    PatternLayer {
                        pattern,
                        shape,
                        size,
                        stroke: outer.0,
                        fill: Some(outer.1),
                    },
                    PatternLayer {
                        pattern,
                        shape,
                        size: size / 2.0,
                        stroke: inner.0,
                        fill: Some(inner.1),
                    },
                ],
            }
        })
        .collect()
}
