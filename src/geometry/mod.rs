//! Plate geometry for the sandwich case.
//!
//! [`PlateBuilder`] turns a parsed layout into the kerf-compensated drawing
//! primitives for one plate of the stack. All coordinates are millimetres
//! with the origin at the plate's top-left corner, y increasing downward,
//! matching SVG conventions.
//!
//! Kerf compensation is baked in here and nowhere else: outlines grow by
//! half the kerf so the cut piece matches nominal size, holes shrink by the
//! full kerf, and mating edges are each offset by half the kerf so the
//! nominal gap survives cutting.

use crate::models::{KeyboardHalf, Layout, PathCommand, Shape};
use crate::specs::PhysicalSpecs;

/// One plate of the five-layer sandwich stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateKind {
    /// Switch plate: key holes and clearance screw holes.
    Top,
    /// Plate with top-edge cutouts for the USB and TRRS sockets.
    ConnectorCutout,
    /// Spacer plate: cutouts sized for the TRRS socket legs.
    Spacer,
    /// Bottom plate: clearance screw holes only.
    Bottom,
    /// Extra spacer for Cherry MX switch height instead of Kailh choc v2;
    /// its pad boundary is one continuous inner cut.
    AltSwitch,
}

impl PlateKind {
    /// Short name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::ConnectorCutout => "connector-cutout",
            Self::Spacer => "spacer",
            Self::Bottom => "bottom",
            Self::AltSwitch => "alt-switch",
        }
    }
}

/// Plate stacking order, which is also the left-to-right document order.
pub const PLATE_SEQUENCE: [PlateKind; 5] = [
    PlateKind::Top,
    PlateKind::ConnectorCutout,
    PlateKind::Spacer,
    PlateKind::Bottom,
    PlateKind::AltSwitch,
];

/// Half-widths of the connectors that protrude through the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorSpecs {
    /// Half the micro USB socket width.
    pub usb_half_width: f64,
    /// Half the TRRS socket width (must be >= 2.5).
    pub trrs_half_width: f64,
    /// Half the TRRS socket width plus its leg length (must be >= 5.3);
    /// the socket lies on its side with the legs pointing at the USB
    /// socket, so the spacer cutout is wider than the jack itself.
    pub trrs_leg_half_width: f64,
}

impl Default for ConnectorSpecs {
    fn default() -> Self {
        Self {
            usb_half_width: 5.0,
            trrs_half_width: 2.7,
            trrs_leg_half_width: 7.0,
        }
    }
}

/// How the screw-pad frame meets the top edge of the board outline.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TopEdge {
    /// Two connector notches interrupt the top edge; the frame continues
    /// the open outline path. Runs are measured inward from each top
    /// corner to the near edge of its notch.
    Notched {
        /// Solid run from the top-left corner.
        left: f64,
        /// Solid run from the top-right corner.
        right: f64,
    },
    /// No notches: the outer perimeter closes on its own and the pad
    /// boundary becomes a separate inner cut.
    Connected,
}

/// Builds per-plate drawing primitives from a layout and the physical
/// constant set.
///
/// Pure and deterministic: identical inputs produce identical shape
/// sequences. The builder assumes the specs are valid and does not
/// re-validate them per call.
#[derive(Debug)]
pub struct PlateBuilder<'a> {
    specs: &'a PhysicalSpecs,
    connectors: ConnectorSpecs,
}

impl<'a> PlateBuilder<'a> {
    /// Creates a builder with the default connector dimensions.
    pub fn new(specs: &'a PhysicalSpecs) -> Self {
        Self {
            specs,
            connectors: ConnectorSpecs::default(),
        }
    }

    /// Creates a builder with explicit connector dimensions.
    pub fn with_connectors(specs: &'a PhysicalSpecs, connectors: ConnectorSpecs) -> Self {
        Self { specs, connectors }
    }

    /// Builds the full shape sequence for one plate of one half.
    ///
    /// The layout is only consulted for the top plate's key holes; every
    /// other plate depends solely on the physical constants and, for the
    /// notched plates, on which half the connectors sit on.
    pub fn build_plate(&self, layout: &Layout, half: KeyboardHalf, kind: PlateKind) -> Vec<Shape> {
        let mut shapes = Vec::new();
        match kind {
            PlateKind::Top => {
                shapes.push(self.closed_outline());
                self.push_key_holes(&mut shapes, layout);
                self.push_clearance_holes(&mut shapes);
            }
            PlateKind::Bottom => {
                shapes.push(self.closed_outline());
                self.push_clearance_holes(&mut shapes);
            }
            PlateKind::ConnectorCutout | PlateKind::Spacer => {
                let (left, right) = self.top_edge_runs(kind, half);
                self.push_screw_frame(&mut shapes, TopEdge::Notched { left, right });
            }
            PlateKind::AltSwitch => {
                self.push_screw_frame(&mut shapes, TopEdge::Connected);
            }
        }
        shapes
    }

    /// The board outline as an open path, to be finished per plate.
    ///
    /// A rounded rectangle traced clockwise starting just left of the
    /// top-right corner, with every straight run pushed outward by half the
    /// kerf and every corner arc grown to match, so key positions never
    /// need kerf adjustment of their own.
    fn board_outline(&self) -> Vec<PathCommand> {
        let s = self.specs;
        let k2 = s.half_kerf;
        let r = s.corner_radius;
        vec![
            PathCommand::MoveTo {
                x: s.board_width - r,
                y: -k2,
            },
            PathCommand::Arc {
                r: r + k2,
                dx: r + k2,
                dy: r + k2,
            },
            PathCommand::VertTo {
                y: s.board_height - r,
            },
            PathCommand::Arc {
                r: r + k2,
                dx: -(r + k2),
                dy: r + k2,
            },
            PathCommand::HorizTo { x: r },
            PathCommand::Arc {
                r: r + k2,
                dx: -(r + k2),
                dy: -(r + k2),
            },
            PathCommand::VertTo { y: r },
            PathCommand::Arc {
                r: r + k2,
                dx: r + k2,
                dy: -(r + k2),
            },
        ]
    }

    /// The board outline closed along a plain top edge.
    fn closed_outline(&self) -> Shape {
        let mut cmds = self.board_outline();
        cmds.push(PathCommand::Close);
        Shape::Path(cmds)
    }

    /// Screw hole centers: three pads flush in their corners, the
    /// top-right one dropped to clear the shortened top key row.
    fn screw_centers(&self) -> [(f64, f64); 4] {
        let s = self.specs;
        let c = s.half_screw_square;
        [
            (c, c),
            (c, s.board_height - c),
            (s.board_width - c, s.board_height - c),
            (s.board_width - c, s.screw_top_right + c),
        ]
    }

    /// One kerf-shrunk key hole per cell, uniform single-unit squares
    /// centered on the unit-pitch grid.
    fn push_key_holes(&self, shapes: &mut Vec<Shape>, layout: &Layout) {
        let s = self.specs;
        for (row, cells) in layout.rows.iter().enumerate() {
            for cell in cells {
                shapes.push(Shape::Rect {
                    x: s.board_padding + cell.center() * s.unit_pitch + s.half_kerf,
                    y: s.board_padding + row as f64 * s.unit_pitch + s.half_kerf,
                    width: s.hole_width - s.kerf,
                    height: s.hole_width - s.kerf,
                });
            }
        }
    }

    /// M2 clearance holes for the outer plates.
    fn push_clearance_holes(&self, shapes: &mut Vec<Shape>) {
        let r = 0.5 * self.specs.screw_size_small - self.specs.half_kerf;
        for (cx, cy) in self.screw_centers() {
            shapes.push(Shape::Circle { cx, cy, r });
        }
    }

    /// Hex-approximated spacer holes for the inner plates.
    fn push_spacer_holes(&self, shapes: &mut Vec<Shape>) {
        let r = 0.5 * self.specs.screw_size_big - self.specs.half_kerf;
        for (cx, cy) in self.screw_centers() {
            shapes.push(hexagon(r, cx, cy));
        }
    }

    /// Solid top-edge runs up to the two connector notches, measured from
    /// the left and right board corners respectively.
    ///
    /// Offsets are in unit-pitch coordinates from the outer edge of the key
    /// grid (`board_padding - hole_gap/2`); left and right halves place the
    /// connectors at mirrored key positions, so the unit offsets swap and
    /// shift rather than reflecting numerically.
    fn top_edge_runs(&self, kind: PlateKind, half: KeyboardHalf) -> (f64, f64) {
        let c = &self.connectors;
        match (kind, half) {
            (PlateKind::ConnectorCutout, KeyboardHalf::Left) => (
                self.top_run(5.5, c.usb_half_width),
                self.top_run(1.25, c.trrs_half_width),
            ),
            (PlateKind::ConnectorCutout, KeyboardHalf::Right) => (
                self.top_run(0.75, c.trrs_half_width),
                self.top_run(6.0, c.usb_half_width),
            ),
            (PlateKind::Spacer, KeyboardHalf::Left) => (
                self.top_run(6.5, c.trrs_leg_half_width),
                self.top_run(1.25, c.trrs_half_width),
            ),
            (PlateKind::Spacer, KeyboardHalf::Right) => (
                self.top_run(0.75, c.trrs_half_width),
                self.top_run(7.0, c.trrs_leg_half_width),
            ),
            _ => unreachable!("plate {:?} has a plain top edge", kind),
        }
    }

    fn top_run(&self, units: f64, connector_half_width: f64) -> f64 {
        let s = self.specs;
        s.board_padding - 0.5 * s.hole_gap + units * s.unit_pitch - connector_half_width
    }

    /// Finishes a plate whose interior is the screw-pad frame: the board
    /// outline, the top-edge detail, four L-shaped corner pad reliefs with
    /// quarter-circle inner corners, and a spacer hole per pad.
    ///
    /// In connected mode the outer perimeter closes first and the frame
    /// becomes its own inner path starting mid-board; otherwise the frame
    /// continues the outline through the two notches.
    fn push_screw_frame(&self, shapes: &mut Vec<Shape>, top: TopEdge) {
        let s = self.specs;
        let k2 = s.half_kerf;
        let sq = s.screw_square;
        let sq2 = s.half_screw_square;
        let pad_arc = sq2 + k2;

        let mut path = match top {
            TopEdge::Connected => {
                shapes.push(self.closed_outline());
                vec![PathCommand::MoveTo {
                    x: 0.5 * s.board_width,
                    y: s.board_padding + k2,
                }]
            }
            TopEdge::Notched { left, .. } => {
                let mut cmds = self.board_outline();
                cmds.push(PathCommand::HorizTo { x: left + k2 });
                cmds.push(PathCommand::VertTo {
                    y: s.board_padding + k2,
                });
                cmds
            }
        };

        // Top-left pad.
        path.push(PathCommand::HorizTo { x: sq + k2 });
        path.push(PathCommand::VertTo { y: sq2 });
        path.push(PathCommand::Arc {
            r: pad_arc,
            dx: -pad_arc,
            dy: pad_arc,
        });
        path.push(PathCommand::HorizTo {
            x: s.board_padding + k2,
        });

        // Bottom-left pad.
        path.push(PathCommand::VertTo {
            y: s.board_height - sq - k2,
        });
        path.push(PathCommand::HorizTo { x: sq2 });
        path.push(PathCommand::Arc {
            r: pad_arc,
            dx: pad_arc,
            dy: pad_arc,
        });
        path.push(PathCommand::VertTo {
            y: s.board_height - (s.board_padding + k2),
        });

        // Bottom-right pad.
        path.push(PathCommand::HorizTo {
            x: s.board_width - (sq + k2),
        });
        path.push(PathCommand::VertTo {
            y: s.board_height - sq2,
        });
        path.push(PathCommand::Arc {
            r: pad_arc,
            dx: pad_arc,
            dy: -pad_arc,
        });
        path.push(PathCommand::HorizTo {
            x: s.board_width - (s.board_padding + k2),
        });

        // Top-right pad, dropped by `screw_top_right`, so its relief is a
        // half-circle notch in the right edge rather than a corner L.
        path.push(PathCommand::VertTo {
            y: s.screw_top_right + sq + k2,
        });
        path.push(PathCommand::HorizTo {
            x: s.board_width - sq2,
        });
        path.push(PathCommand::Arc {
            r: pad_arc,
            dx: 0.0,
            dy: -(sq + s.kerf),
        });
        path.push(PathCommand::HorizTo {
            x: s.board_width - (s.board_padding + k2),
        });
        path.push(PathCommand::VertTo {
            y: s.board_padding + k2,
        });

        if let TopEdge::Notched { right, .. } = top {
            path.push(PathCommand::HorizTo {
                x: s.board_width - right - k2,
            });
            path.push(PathCommand::VertTo { y: -k2 });
        }
        path.push(PathCommand::Close);
        shapes.push(Shape::Path(path));

        self.push_spacer_holes(shapes);
    }
}

/// A hexagon approximating a circle of radius `r`, centered at `(x, y)`.
/// Spacer holes are cut as hexagons so the spacers grip instead of
/// spinning.
fn hexagon(r: f64, x: f64, y: f64) -> Shape {
    let mut cmds = Vec::with_capacity(7);
    for i in 0..6 {
        let angle = f64::from(i) * std::f64::consts::PI / 3.0;
        let px = x + r * angle.cos();
        let py = y + r * angle.sin();
        if i == 0 {
            cmds.push(PathCommand::MoveTo { x: px, y: py });
        } else {
            cmds.push(PathCommand::LineTo { x: px, y: py });
        }
    }
    cmds.push(PathCommand::Close);
    Shape::Path(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyCell;

    fn one_key_layout() -> Layout {
        Layout {
            rows: vec![vec![KeyCell { x: 0.0, w: 1.0 }]],
        }
    }

    fn rects(shapes: &[Shape]) -> Vec<&Shape> {
        shapes
            .iter()
            .filter(|s| matches!(s, Shape::Rect { .. }))
            .collect()
    }

    fn circles(shapes: &[Shape]) -> Vec<&Shape> {
        shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle { .. }))
            .collect()
    }

    #[test]
    fn test_top_plate_single_key_hole_placement() {
        // One key at the origin lands at
        // (board_padding + half_kerf, board_padding + half_kerf) with side
        // hole_width - kerf.
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let shapes = builder.build_plate(&one_key_layout(), KeyboardHalf::Left, PlateKind::Top);

        let rects = rects(&shapes);
        assert_eq!(rects.len(), 1);
        match rects[0] {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                assert!((x - (specs.board_padding + specs.half_kerf)).abs() < 1e-9);
                assert!((y - (specs.board_padding + specs.half_kerf)).abs() < 1e-9);
                assert!((width - (specs.hole_width - specs.kerf)).abs() < 1e-9);
                assert_eq!(width, height);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_key_hole_size_ignores_key_width() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let layout = Layout {
            rows: vec![vec![KeyCell { x: 0.0, w: 2.0 }]],
        };
        let shapes = builder.build_plate(&layout, KeyboardHalf::Left, PlateKind::Top);
        match rects(&shapes)[0] {
            Shape::Rect { x, width, .. } => {
                // Center shifts by half a unit; the hole stays 1u sized.
                let center = 0.5;
                assert!(
                    (x - (specs.board_padding + center * specs.unit_pitch + specs.half_kerf))
                        .abs()
                        < 1e-9
                );
                assert!((width - (specs.hole_width - specs.kerf)).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_top_plate_has_four_clearance_holes() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let shapes = builder.build_plate(&one_key_layout(), KeyboardHalf::Left, PlateKind::Top);

        let circles = circles(&shapes);
        assert_eq!(circles.len(), 4);
        for circle in circles {
            match circle {
                Shape::Circle { r, .. } => {
                    assert!(
                        (r - (0.5 * specs.screw_size_small - specs.half_kerf)).abs() < 1e-9
                    );
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_bottom_plate_has_no_key_holes() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let shapes = builder.build_plate(&one_key_layout(), KeyboardHalf::Left, PlateKind::Bottom);

        assert!(rects(&shapes).is_empty());
        assert_eq!(circles(&shapes).len(), 4);
        // Outline plus four circles.
        assert_eq!(shapes.len(), 5);
    }

    #[test]
    fn test_top_right_screw_pad_is_dropped() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let centers = builder.screw_centers();

        assert_eq!(centers[0].1, specs.half_screw_square);
        assert_eq!(
            centers[3].1,
            specs.screw_top_right + specs.half_screw_square
        );
        assert!(centers[3].1 > centers[0].1);
    }

    #[test]
    fn test_notched_plate_is_one_path_plus_hexes() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let shapes = builder.build_plate(
            &Layout::default(),
            KeyboardHalf::Left,
            PlateKind::ConnectorCutout,
        );

        // One combined outline+frame path and four hexagon holes.
        assert_eq!(shapes.len(), 5);
        let hole_vertices = 7; // hexagon: move, five lines, close
        for shape in &shapes[1..] {
            match shape {
                Shape::Path(cmds) => assert_eq!(cmds.len(), hole_vertices),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_connected_plate_splits_outer_and_inner_paths() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let shapes =
            builder.build_plate(&Layout::default(), KeyboardHalf::Left, PlateKind::AltSwitch);

        // Closed outer perimeter, inner pad boundary, four hexagons.
        assert_eq!(shapes.len(), 6);
        match &shapes[1] {
            Shape::Path(cmds) => {
                assert_eq!(
                    cmds[0],
                    PathCommand::MoveTo {
                        x: 0.5 * specs.board_width,
                        y: specs.board_padding + specs.half_kerf,
                    }
                );
                assert_eq!(*cmds.last().unwrap(), PathCommand::Close);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_alt_switch_plate_identical_for_both_halves() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let layout = Layout::default();
        let left = builder.build_plate(&layout, KeyboardHalf::Left, PlateKind::AltSwitch);
        let right = builder.build_plate(&layout, KeyboardHalf::Right, PlateKind::AltSwitch);
        assert_eq!(left, right);
    }

    #[test]
    fn test_connector_runs_swap_between_halves() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let c = ConnectorSpecs::default();

        let (ll, lr) = builder.top_edge_runs(PlateKind::ConnectorCutout, KeyboardHalf::Left);
        let (rl, rr) = builder.top_edge_runs(PlateKind::ConnectorCutout, KeyboardHalf::Right);

        // Left half: USB 5.5u from the left, TRRS 1.25u from the right.
        assert!((ll - builder.top_run(5.5, c.usb_half_width)).abs() < 1e-9);
        assert!((lr - builder.top_run(1.25, c.trrs_half_width)).abs() < 1e-9);
        // Right half: TRRS 0.75u from the left, USB 6.0u from the right.
        assert!((rl - builder.top_run(0.75, c.trrs_half_width)).abs() < 1e-9);
        assert!((rr - builder.top_run(6.0, c.usb_half_width)).abs() < 1e-9);
    }

    #[test]
    fn test_spacer_runs_use_trrs_leg_width() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let c = ConnectorSpecs::default();

        let (left, right) = builder.top_edge_runs(PlateKind::Spacer, KeyboardHalf::Right);
        assert!((left - builder.top_run(0.75, c.trrs_half_width)).abs() < 1e-9);
        assert!((right - builder.top_run(7.0, c.trrs_leg_half_width)).abs() < 1e-9);
    }

    #[test]
    fn test_build_plate_is_idempotent() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let layout = one_key_layout();

        for kind in PLATE_SEQUENCE {
            let first = builder.build_plate(&layout, KeyboardHalf::Right, kind);
            let second = builder.build_plate(&layout, KeyboardHalf::Right, kind);
            assert_eq!(first, second, "plate {} not deterministic", kind.name());
        }
    }

    #[test]
    fn test_outline_offset_by_half_kerf() {
        let specs = PhysicalSpecs::default();
        let builder = PlateBuilder::new(&specs);
        let cmds = builder.board_outline();

        // The trace starts on the top edge pushed outward by half the kerf,
        // and the corner arcs grow by the same amount.
        assert_eq!(
            cmds[0],
            PathCommand::MoveTo {
                x: specs.board_width - specs.corner_radius,
                y: -specs.half_kerf,
            }
        );
        match cmds[1] {
            PathCommand::Arc { r, .. } => {
                assert!((r - (specs.corner_radius + specs.half_kerf)).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_hexagon_shape() {
        let hex = hexagon(1.0, 10.0, 20.0);
        match hex {
            Shape::Path(cmds) => {
                assert_eq!(cmds.len(), 7);
                assert_eq!(cmds[0], PathCommand::MoveTo { x: 11.0, y: 20.0 });
                assert_eq!(*cmds.last().unwrap(), PathCommand::Close);
            }
            _ => unreachable!(),
        }
    }
}
