//! Platecut Library
//!
//! This library turns compact keyboard-layout descriptions into
//! kerf-compensated vector geometry for laser-cutting a sandwich-style
//! split keyboard case: a layout parser, a per-plate geometry builder, and
//! an SVG document assembler.

// Module declarations
pub mod constants;
pub mod export;
pub mod geometry;
pub mod models;
pub mod parser;
pub mod specs;
