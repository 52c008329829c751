//! Drawing surface abstraction.
//!
//! The renderer only ever clears the surface and fills rectangles. Coordinates
//! are surface units with the origin at the top-left corner and y growing
//! downward; how a unit maps onto physical pixels or terminal cells is up to
//! the implementation.

use ratatui::style::Color;

use super::error::Result;

/// Axis-aligned rectangle in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FillRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A paintable area that supports the two primitives the renderer needs.
pub trait Surface {
    /// Paintable width in surface units.
    fn width(&self) -> f64;

    /// Paintable height in surface units.
    fn height(&self) -> f64;

    /// Erases the whole surface.
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: FillRect, color: Color);

    /// Pushes the painted frame to wherever it is displayed.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory surface that records every filled rectangle of the current frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: f64,
    height: f64,
    shapes: Vec<(FillRect, Color)>,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    /// Changes the surface dimensions without touching the recorded shapes.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn shapes(&self) -> &[(FillRect, Color)] {
        &self.shapes
    }
}

impl Surface for DisplayList {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn fill_rect(&mut self, rect: FillRect, color: Color) {
        self.shapes.push((rect, color));
    }
}
