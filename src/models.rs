//! Core data types shared by the parser, geometry builder, and SVG export.
//!
//! Lengths are in millimetres unless a field is documented as unit-pitch
//! coordinates. The drawing primitives mirror the small subset of SVG the
//! case design actually needs: absolute move/line/horizontal/vertical path
//! commands, one relative arc form, rectangles, and circles.

use serde::{Deserialize, Serialize};

/// Placement overrides carried by a metadata object ahead of a key.
///
/// `None` means "not specified": the resolver falls back to the running
/// cursor for `x` and to a single unit for `w`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldOverride {
    /// Absolute horizontal offset in unit-pitch coordinates.
    pub x: Option<f64>,
    /// Width in units, applied to the next key only.
    pub w: Option<f64>,
}

impl FieldOverride {
    /// Merges a later override into this one, last write wins per field.
    pub fn merge(&mut self, later: FieldOverride) {
        if later.x.is_some() {
            self.x = later.x;
        }
        if later.w.is_some() {
            self.w = later.w;
        }
    }

    /// Returns true if neither field is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.w.is_none()
    }
}

/// A resolved key position within a row, in unit-pitch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyCell {
    /// Left edge of the key, in units from the row origin.
    pub x: f64,
    /// Key width in units.
    pub w: f64,
}

impl KeyCell {
    /// Horizontal center of the key hole in unit-pitch coordinates.
    ///
    /// Wide keys shift the center, never the hole size: the plates only
    /// need switch positions, not keycap footprints.
    pub fn center(&self) -> f64 {
        self.x + 0.5 * (self.w - 1.0)
    }
}

/// One visual row of keys, left to right.
pub type Row = Vec<KeyCell>;

/// A parsed keyboard half: rows top to bottom, keys left to right.
///
/// Row order is significant; the row index is the vertical key position in
/// unit-pitch coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Rows in top-to-bottom order.
    pub rows: Vec<Row>,
}

impl Layout {
    /// Returns true if the layout has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of keys across all rows.
    pub fn key_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Human-readable dump of resolved key centers, one line per row.
    ///
    /// Each key is printed as `[center,row],` for cross-checking against
    /// the source layout description. Diagnostic output only; nothing else
    /// consumes it.
    pub fn key_position_report(&self) -> String {
        let mut report = String::new();
        for (row, cells) in self.rows.iter().enumerate() {
            report.push_str("    ");
            for cell in cells {
                report.push_str(&format!("[{},{}],", cell.center(), row));
            }
            report.push('\n');
        }
        report
    }
}

/// Which keyboard half a layout belongs to.
///
/// Only connector-cutout placement differs between halves; all other plate
/// geometry is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardHalf {
    /// Left half: USB port toward the inner edge, TRRS jack on the right.
    Left,
    /// Right half: mirrored connector placement.
    Right,
}

impl KeyboardHalf {
    /// Lowercase name for logging and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Stable index used for document grid placement (left = 0, right = 1).
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// One SVG path command, in millimetre coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Absolute move (`M x y`).
    MoveTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
    },
    /// Absolute line (`L x y`).
    LineTo {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
    },
    /// Absolute horizontal line (`H x`).
    HorizTo {
        /// Target x.
        x: f64,
    },
    /// Absolute vertical line (`V y`).
    VertTo {
        /// Target y.
        y: f64,
    },
    /// Relative circular arc (`a r r 0 0 1 dx dy`), the only arc form the
    /// case design uses: equal radii, no rotation, small clockwise sweep.
    Arc {
        /// Arc radius (both axes).
        r: f64,
        /// Relative x displacement to the arc end point.
        dx: f64,
        /// Relative y displacement to the arc end point.
        dy: f64,
    },
    /// Close the current subpath (`Z`).
    Close,
}

/// A kerf-adjusted drawing primitive emitted by the geometry builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A path built from [`PathCommand`]s; closed paths are cut outlines.
    Path(Vec<PathCommand>),
    /// An axis-aligned rectangle (key holes).
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// A circle (screw clearance holes).
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius.
        r: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_cell_center() {
        let unit = KeyCell { x: 0.0, w: 1.0 };
        assert_eq!(unit.center(), 0.0);

        let wide = KeyCell { x: 1.0, w: 2.0 };
        assert_eq!(wide.center(), 1.5);

        let offset = KeyCell { x: 3.5, w: 1.0 };
        assert_eq!(offset.center(), 3.5);
    }

    #[test]
    fn test_override_merge_last_write_wins() {
        let mut pending = FieldOverride {
            x: Some(1.0),
            w: None,
        };
        pending.merge(FieldOverride {
            x: None,
            w: Some(2.0),
        });
        assert_eq!(pending.x, Some(1.0));
        assert_eq!(pending.w, Some(2.0));

        pending.merge(FieldOverride {
            x: Some(4.0),
            w: None,
        });
        assert_eq!(pending.x, Some(4.0));
        assert_eq!(pending.w, Some(2.0));
    }

    #[test]
    fn test_key_position_report_format() {
        let layout = Layout {
            rows: vec![
                vec![KeyCell { x: 1.0, w: 1.0 }, KeyCell { x: 2.0, w: 2.0 }],
                vec![KeyCell { x: 0.0, w: 1.0 }],
            ],
        };
        let report = layout.key_position_report();
        assert_eq!(report, "    [1,0],[2.5,0],\n    [0,1],\n");
    }

    #[test]
    fn test_key_count() {
        let layout = Layout {
            rows: vec![
                vec![KeyCell { x: 0.0, w: 1.0 }; 3],
                vec![KeyCell { x: 0.0, w: 1.0 }; 2],
            ],
        };
        assert_eq!(layout.key_count(), 5);
        assert!(!layout.is_empty());
        assert!(Layout::default().is_empty());
    }
}
