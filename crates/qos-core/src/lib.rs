//! Core drawing types for the Quantum OS shell.
//!
//! Everything the shell paints goes through the [`Canvas`] trait:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Color representation: [`Color`] and the shell [`Palette`]
//! - Draw commands: [`DrawCommand`], recorded by [`RecordingCanvas`]

mod canvas;
mod color;
mod draw;
mod geometry;

pub use canvas::{Canvas, FontWeight, RecordingCanvas, TextStyle};
pub use color::{Color, ColorParseError, Palette};
pub use draw::{BoxStyle, DrawCommand, StrokeStyle, Transform2D};
pub use geometry::{Point, Rect, Size};
