//! Physical measurements of the case design and their derived constants.
//!
//! [`BaseMeasurements`] is the handful of numbers that define the design:
//! key pitch, switch hole size, laser kerf, screw sizes, and board extent in
//! key units. Everything else ([`PhysicalSpecs`]) is derived from them in one
//! place so that changing a base measurement re-derives every dependent
//! value. Alternate measurements can be loaded from a TOML file for cutting
//! the same case on a different laser or with different hardware.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Base physical measurements, in millimetres unless noted.
///
/// Defaults describe the reference design: Kailh choc v2 spacing on 19.05 mm
/// pitch, M2 fasteners, and a 0.2 mm kerf laser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseMeasurements {
    /// Center-to-center key spacing (1u).
    pub unit_pitch: f64,
    /// Switch hole side length.
    pub hole_width: f64,
    /// Material width removed by the cutting tool.
    pub kerf: f64,
    /// Board corner radius.
    pub corner_radius: f64,
    /// M2 clearance hole diameter (must be >= 2.0).
    pub screw_size_small: f64,
    /// Spacer hole diameter (must be >= 3.3).
    pub screw_size_big: f64,
    /// Board width in key units.
    pub board_units_wide: f64,
    /// Board height in key units.
    pub board_units_high: f64,
}

impl Default for BaseMeasurements {
    fn default() -> Self {
        Self {
            unit_pitch: 19.05,
            hole_width: 14.0,
            kerf: 0.2,
            corner_radius: 5.05,
            screw_size_small: 2.1,
            screw_size_big: 3.4,
            board_units_wide: 7.75,
            board_units_high: 5.0,
        }
    }
}

impl BaseMeasurements {
    /// Loads base measurements from a TOML file.
    ///
    /// Missing keys fall back to the reference design; unknown keys are
    /// rejected to catch typos.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read specs file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse specs file: {}", path.display()))
    }
}

/// All physical constants of the case design, base and derived.
///
/// Constructed once via [`PhysicalSpecs::derive`] and passed explicitly to
/// the geometry builder and document assembler; never mutated afterwards.
/// No derived field is cached anywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSpecs {
    /// Center-to-center key spacing (1u).
    pub unit_pitch: f64,
    /// Switch hole side length before kerf compensation.
    pub hole_width: f64,
    /// Gap between adjacent switch holes: `unit_pitch - hole_width`.
    pub hole_gap: f64,
    /// Margin between the key grid and the board edge.
    pub board_padding: f64,
    /// Material width removed by the cutting tool.
    pub kerf: f64,
    /// Half the kerf: every cut boundary is offset by this much.
    pub half_kerf: f64,
    /// Overall board width.
    pub board_width: f64,
    /// Overall board height.
    pub board_height: f64,
    /// Board corner radius.
    pub corner_radius: f64,
    /// Gap between adjacent plates on the output sheet.
    pub offset_padding: f64,
    /// M2 clearance hole diameter.
    pub screw_size_small: f64,
    /// Spacer hole diameter.
    pub screw_size_big: f64,
    /// Material left around a spacer hole inside its pad.
    pub screw_padding: f64,
    /// Side length of the square screw-pad relief.
    pub screw_square: f64,
    /// Half of `screw_square`: the screw hole center offset within a pad.
    pub half_screw_square: f64,
    /// Vertical drop of the top-right screw pad, which sits one key row
    /// down to clear the shortened top row.
    pub screw_top_right: f64,
}

impl PhysicalSpecs {
    /// Derives the full constant set from base measurements.
    ///
    /// This is the only constructor; the derivations are the authoritative
    /// arithmetic of the case design and every downstream offset depends on
    /// them. Validation is deliberately absent for now: the defaults are
    /// known-good and callers own any future range checking.
    pub fn derive(base: &BaseMeasurements) -> Self {
        let hole_gap = base.unit_pitch - base.hole_width;
        // Must be > 0 for the outline to clear the outer key holes.
        let board_padding = hole_gap;
        let screw_padding = hole_gap;
        let screw_square = base.screw_size_big + 2.0 * screw_padding;
        Self {
            unit_pitch: base.unit_pitch,
            hole_width: base.hole_width,
            hole_gap,
            board_padding,
            kerf: base.kerf,
            half_kerf: 0.5 * base.kerf,
            board_width: base.board_units_wide * base.unit_pitch - hole_gap
                + 2.0 * board_padding,
            board_height: base.board_units_high * base.unit_pitch - hole_gap
                + 2.0 * board_padding,
            corner_radius: base.corner_radius,
            offset_padding: 0.75 * board_padding + base.kerf,
            screw_size_small: base.screw_size_small,
            screw_size_big: base.screw_size_big,
            screw_padding,
            screw_square,
            half_screw_square: 0.5 * screw_square,
            screw_top_right: board_padding + base.unit_pitch - hole_gap,
        }
    }
}

impl Default for PhysicalSpecs {
    fn default() -> Self {
        Self::derive(&BaseMeasurements::default())
    }
}
