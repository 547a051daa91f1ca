// Pattern dispatch: the contract between frame plans and a drawing backend.
//
// A backend implements `Painter`'s five primitives. Each sacred-geometry
// pattern is a provided method composing those primitives, and
// `paint_pattern` is the single exhaustive `match` that maps a `Pattern` to
// its method, so adding a pattern without a drawing routine fails to compile.
// Backends may override any pattern method to draw it natively.
//
// Pattern geometry is expressed around a center point with an overall
// `size` (the radius the pattern roughly fills). Every pattern is built from
// the scene's `Shape` primitive, so the same motif reads differently with
// triangles than with ellipses.

use crate::catalog::{Pattern, Shape};
use crate::layout::{FramePlan, Hsb, Rect};
use std::f64::consts::{FRAC_PI_3, FRAC_PI_6, TAU};

pub type Point = (f64, f64);

pub trait Painter {
    fn fill_rect(&mut self, rect: Rect, colour: Hsb);
    fn set_stroke(&mut self, weight: f64, colour: Hsb);
    /// `None` disables filling.
    fn set_fill(&mut self, colour: Option<Hsb>);
    /// One `shape` of circumradius `radius` centred on `center`.
    fn shape(&mut self, center: Point, shape: Shape, radius: f64);
    fn line(&mut self, from: Point, to: Point);

    /// Two overlapping shapes whose centres lie on each other's edge.
    fn vesica_piscis(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 2.0;
        self.shape(offset(center, -r / 2.0, 0.0), shape, r);
        self.shape(offset(center, r / 2.0, 0.0), shape, r);
    }

    /// A centre shape and six around it, each passing through the centre.
    fn seed_of_life(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 3.0;
        self.shape(center, shape, r);
        for p in ring(center, r, 6, 0.0) {
            self.shape(p, shape, r);
        }
    }

    /// Seven shapes packed edge to edge.
    fn egg_of_life(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 4.0;
        self.shape(center, shape, r);
        for p in ring(center, 2.0 * r, 6, 0.0) {
            self.shape(p, shape, r);
        }
    }

    /// Seed of life extended by a second ring of twelve.
    fn flower_of_life(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 4.0;
        self.shape(center, shape, r);
        for p in ring(center, r, 6, 0.0)
            .into_iter()
            .chain(ring(center, 2.0 * r, 6, 0.0))
            .chain(ring(center, 3f64.sqrt() * r, 6, FRAC_PI_6))
        {
            self.shape(p, shape, r);
        }
    }

    fn fruit_of_life(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 6.0;
        for p in fruit_centres(center, r) {
            self.shape(p, shape, r);
        }
    }

    /// Fruit of life with every pair of centres joined.
    fn metatrons_cube(&mut self, center: Point, shape: Shape, size: f64) {
        let r = size / 6.0;
        let centres = fruit_centres(center, r);
        for (i, &a) in centres.iter().enumerate() {
            for &b in &centres[i + 1..] {
                self.line(a, b);
            }
        }
        for &p in &centres {
            self.shape(p, shape, r / 2.0);
        }
    }

    /// Ten nodes joined by the twenty-two paths.
    fn tree_of_life(&mut self, center: Point, shape: Shape, size: f64) {
        let unit = size / 3.0;
        let nodes = TREE_NODES.map(|(x, y)| offset(center, x * unit, (y - 2.25) * unit));
        for (a, b) in TREE_PATHS {
            self.line(nodes[a], nodes[b]);
        }
        for p in nodes {
            self.shape(p, shape, unit / 3.0);
        }
    }
}

/// Node positions of the tree of life in units, top node at the origin.
const TREE_NODES: [(f64, f64); 10] = [
    (0.0, 0.0),
    (1.0, 0.5),
    (-1.0, 0.5),
    (1.0, 1.5),
    (-1.0, 1.5),
    (0.0, 2.0),
    (1.0, 3.0),
    (-1.0, 3.0),
    (0.0, 3.5),
    (0.0, 4.5),
];

const TREE_PATHS: [(usize, usize); 22] = [
    (0, 1),
    (0, 2),
    (0, 5),
    (1, 2),
    (1, 3),
    (1, 5),
    (2, 4),
    (2, 5),
    (3, 4),
    (3, 5),
    (3, 6),
    (4, 5),
    (4, 7),
    (5, 6),
    (5, 7),
    (5, 8),
    (6, 7),
    (6, 8),
    (6, 9),
    (7, 8),
    (7, 9),
    (8, 9),
];

fn offset(p: Point, dx: f64, dy: f64) -> Point {
    (p.0 + dx, p.1 + dy)
}

/// `count` points evenly spaced on a circle, starting at `phase` radians.
fn ring(center: Point, radius: f64, count: usize, phase: f64) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let angle = phase + TAU * i as f64 / count as f64;
            offset(center, radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Thirteen centres: the middle, then rings at 2r and 4r.
fn fruit_centres(center: Point, r: f64) -> Vec<Point> {
    let mut centres = vec![center];
    centres.extend(ring(center, 2.0 * r, 6, FRAC_PI_3 / 2.0));
    centres.extend(ring(center, 4.0 * r, 6, FRAC_PI_3 / 2.0));
    centres
}

/// Draw `pattern` through the painter's method for it.
pub fn paint_pattern<P: Painter + ?Sized>(
    painter: &mut P,
    pattern: Pattern,
    center: Point,
    shape: Shape,
    size: f64,
) {
    match pattern {
        Pattern::VesicaPiscis => painter.vesica_piscis(center, shape, size),
        Pattern::SeedOfLife => painter.seed_of_life(center, shape, size),
        Pattern::EggOfLife => painter.egg_of_life(center, shape, size),
        Pattern::FlowerOfLife => painter.flower_of_life(center, shape, size),
        Pattern::FruitOfLife => painter.fruit_of_life(center, shape, size),
        Pattern::MetatronsCube => painter.metatrons_cube(center, shape, size),
        Pattern::TreeOfLife => painter.tree_of_life(center, shape, size),
    }
}

/// Paint every cell of a plan in order.
pub fn paint_plan<P: Painter + ?Sized>(painter: &mut P, plan: &FramePlan) {
    for cell in &plan.cells {
        painter.fill_rect(cell.rect, cell.background);
        let center = cell.rect.center();
        for layer in &cell.layers {
            painter.set_stroke(plan.stroke_weight, layer.stroke);
            painter.set_fill(layer.fill);
            paint_pattern(painter, layer.pattern, center, layer.shape, layer.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CellDraw, PatternLayer};

    #[derive(Default)]
    struct Recorder {
        rects: Vec<Rect>,
        strokes: Vec<Hsb>,
        fills: Vec<Option<Hsb>>,
        shapes: Vec<(Point, Shape, f64)>,
        lines: usize,
    }

    impl Painter for Recorder {
        fn fill_rect(&mut self, rect: Rect, _colour: Hsb) {
            self.rects.push(rect);
        }
        fn set_stroke(&mut self, _weight: f64, colour: Hsb) {
            self.strokes.push(colour);
        }
        fn set_fill(&mut self, colour: Option<Hsb>) {
            self.fills.push(colour);
        }
        fn shape(&mut self, center: Point, shape: Shape, radius: f64) {
            self.shapes.push((center, shape, radius));
        }
        fn line(&mut self, _from: Point, _to: Point) {
            self.lines += 1;
        }
    }

    fn counts(pattern: Pattern) -> (usize, usize) {
        let mut r = Recorder::default();
        paint_pattern(&mut r, pattern, (0.0, 0.0), Shape::Ellipse, 120.0);
        (r.shapes.len(), r.lines)
    }

    #[test]
    fn pattern_primitive_counts() {
        assert_eq!(counts(Pattern::VesicaPiscis), (2, 0));
        assert_eq!(counts(Pattern::SeedOfLife), (7, 0));
        assert_eq!(counts(Pattern::EggOfLife), (7, 0));
        assert_eq!(counts(Pattern::FlowerOfLife), (19, 0));
        assert_eq!(counts(Pattern::FruitOfLife), (13, 0));
        assert_eq!(counts(Pattern::MetatronsCube), (13, 78));
        assert_eq!(counts(Pattern::TreeOfLife), (10, 22));
    }

    #[test]
    fn patterns_stay_near_their_size() {
        for pattern in Pattern::ALL {
            let mut r = Recorder::default();
            paint_pattern(&mut r, pattern, (500.0, 500.0), Shape::Hexagon, 100.0);
            for ((x, y), _, radius) in &r.shapes {
                let reach = ((x - 500.0).powi(2) + (y - 500.0).powi(2)).sqrt() + radius;
                assert!(reach <= 101.0, "{pattern} reaches {reach}");
            }
        }
    }

    #[test]
    fn shape_is_passed_through() {
        let mut r = Recorder::default();
        paint_pattern(&mut r, Pattern::SeedOfLife, (0.0, 0.0), Shape::Heptagon, 30.0);
        assert!(r.shapes.iter().all(|(_, s, _)| *s == Shape::Heptagon));
    }

    #[test]
    fn overridden_pattern_method_is_used() {
        struct Native(usize);
        impl Painter for Native {
            fn fill_rect(&mut self, _: Rect, _: Hsb) {}
            fn set_stroke(&mut self, _: f64, _: Hsb) {}
            fn set_fill(&mut self, _: Option<Hsb>) {}
            fn shape(&mut self, _: Point, _: Shape, _: f64) {
                panic!("native painter should not fall back to primitives");
            }
            fn line(&mut self, _: Point, _: Point) {}
            fn tree_of_life(&mut self, _: Point, _: Shape, _: f64) {
                self.0 += 1;
            }
        }
        let mut native = Native(0);
        paint_pattern(&mut native, Pattern::TreeOfLife, (0.0, 0.0), Shape::Square, 10.0);
        assert_eq!(native.0, 1);
    }

    #[test]
    fn plan_cells_are_painted_in_order() {
        let layer = |pattern, fill| PatternLayer {
            pattern,
            shape: Shape::Square,
            size: 10.0,
            stroke: Hsb::vivid(40.0),
            fill,
        };
        let rect = |x| Rect {
            x,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        };
        let plan = FramePlan {
            stroke_weight: 2.0,
            cells: vec![
                CellDraw {
                    rect: rect(0.0),
                    background: Hsb::vivid(0.0),
                    layers: vec![layer(Pattern::VesicaPiscis, None)],
                },
                CellDraw {
                    rect: rect(50.0),
                    background: Hsb::vivid(180.0),
                    layers: vec![
                        layer(Pattern::VesicaPiscis, Some(Hsb::new(40.0, 40.0, 100.0))),
                        layer(Pattern::VesicaPiscis, None),
                    ],
                },
            ],
        };
        let mut r = Recorder::default();
        paint_plan(&mut r, &plan);
        assert_eq!(r.rects, vec![rect(0.0), rect(50.0)]);
        assert_eq!(r.fills, vec![None, Some(Hsb::new(40.0, 40.0, 100.0)), None]);
        assert_eq!(r.strokes.len(), 3);
        assert_eq!(r.shapes.len(), 6);
        // Second cell's shapes are centred on its own rect.
        assert!(r.shapes[2..].iter().all(|((x, _), _, _)| *x > 50.0));
    }
}
