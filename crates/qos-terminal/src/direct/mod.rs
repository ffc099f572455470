//! Direct crossterm backend.
//!
//! ```text
//! Shell::paint → DirectTerminalCanvas → CellBuffer → DiffRenderer → stdout
//! ```
//!
//! The buffer keeps a dirty bit per cell, so a frame only writes what
//! changed since the last flush.

mod cell_buffer;
mod diff_renderer;
mod direct_canvas;

pub use cell_buffer::{Cell, CellBuffer, Modifiers};
pub use diff_renderer::{DiffRenderer, FlushStats};
pub use direct_canvas::DirectTerminalCanvas;
