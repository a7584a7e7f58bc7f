//! SVG rendering and document assembly.
//!
//! Turns built plate geometry into one SVG document: each (half, plate)
//! pair becomes a translated `<g>` on a grid, all strokes hairline-thin with
//! no fill. The cutting service requires the stroke style repeated on every
//! group element, not just the root.

use crate::models::{KeyboardHalf, PathCommand, Shape};
use crate::specs::PhysicalSpecs;

/// Stroke style required on the root element and on each group.
const STYLE_ATTR: &str = "style=\"fill:none;stroke:#000000;stroke-width:0.2\"";

/// Which axis of the document grid carries the plate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridOrientation {
    /// Plates across columns, halves down rows (the reference sheet).
    #[default]
    LayersAcross,
    /// Halves across columns, plates down rows.
    HalvesAcross,
}

/// Canvas parameters for the output document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentConfig {
    /// Physical sheet width in millimetres; the viewBox maps 1:1.
    pub width_mm: f64,
    /// Physical sheet height in millimetres.
    pub height_mm: f64,
    /// Grid axis assignment.
    pub orientation: GridOrientation,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        // The reference stock sheet: 790 x 384 mm.
        Self {
            width_mm: 790.0,
            height_mm: 384.0,
            orientation: GridOrientation::default(),
        }
    }
}

/// Built geometry for one plate of one half, ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGroup {
    /// Which keyboard half the plate belongs to.
    pub half: KeyboardHalf,
    /// Position of the plate in the stacking sequence.
    pub plate_index: usize,
    /// The plate's drawing primitives.
    pub shapes: Vec<Shape>,
}

/// Assembles plate groups into a complete SVG document.
///
/// Each group is placed at
/// `(col * (board_width + offset_padding), row * (board_height +
/// offset_padding))` plus an `offset_padding` outer margin, where column and
/// row follow the configured orientation. Pure positioning; the shapes are
/// emitted untouched.
pub fn render_document(
    specs: &PhysicalSpecs,
    config: &DocumentConfig,
    groups: &[PlateGroup],
) -> String {
    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" \
         viewBox=\"0 0 {w} {h}\"\n  {style}>\n",
        w = fmt_num(config.width_mm),
        h = fmt_num(config.height_mm),
        style = STYLE_ATTR,
    ));
    for group in groups {
        svg.push_str(&render_group(specs, config.orientation, group));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Renders one plate group as a translated `<g>` element.
fn render_group(specs: &PhysicalSpecs, orientation: GridOrientation, group: &PlateGroup) -> String {
    let (col, row) = match orientation {
        GridOrientation::LayersAcross => (group.plate_index, group.half.index()),
        GridOrientation::HalvesAcross => (group.half.index(), group.plate_index),
    };
    let tx = specs.offset_padding + col as f64 * (specs.board_width + specs.offset_padding);
    let ty = specs.offset_padding + row as f64 * (specs.board_height + specs.offset_padding);

    let mut text = format!(
        "  <g transform=\"translate({} {})\" {}>\n",
        fmt_num(tx),
        fmt_num(ty),
        STYLE_ATTR
    );
    for shape in &group.shapes {
        text.push_str(&render_shape(shape));
    }
    text.push_str("  </g>\n");
    text
}

/// Renders a single shape as one SVG element line.
fn render_shape(shape: &Shape) -> String {
    match shape {
        Shape::Path(cmds) => {
            let data: Vec<String> = cmds.iter().map(render_command).collect();
            format!("    <path d=\"{}\" />\n", data.join(" "))
        }
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => format!(
            "    <rect width=\"{}\" height=\"{}\" x=\"{}\" y=\"{}\" />\n",
            fmt_num(*width),
            fmt_num(*height),
            fmt_num(*x),
            fmt_num(*y)
        ),
        Shape::Circle { cx, cy, r } => format!(
            "    <circle cx=\"{}\" cy=\"{}\" r=\"{}\" />\n",
            fmt_num(*cx),
            fmt_num(*cy),
            fmt_num(*r)
        ),
    }
}

fn render_command(cmd: &PathCommand) -> String {
    match cmd {
        PathCommand::MoveTo { x, y } => format!("M {} {}", fmt_num(*x), fmt_num(*y)),
        PathCommand::LineTo { x, y } => format!("L {} {}", fmt_num(*x), fmt_num(*y)),
        PathCommand::HorizTo { x } => format!("H {}", fmt_num(*x)),
        PathCommand::VertTo { y } => format!("V {}", fmt_num(*y)),
        PathCommand::Arc { r, dx, dy } => format!(
            "a {r} {r} 0 0 1 {dx} {dy}",
            r = fmt_num(*r),
            dx = fmt_num(*dx),
            dy = fmt_num(*dy)
        ),
        PathCommand::Close => "Z".to_string(),
    }
}

/// Formats a coordinate with the shortest exact decimal representation.
fn fmt_num(value: f64) -> String {
    // Avoid "-0" creeping into path data from negated zero offsets.
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}
