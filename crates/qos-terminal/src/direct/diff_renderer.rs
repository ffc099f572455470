//! Writes only the dirty cells of a [`CellBuffer`] to the terminal.
//!
//! Output is batched through a `BufWriter`; cursor moves and style
//! changes are emitted only when they differ from the last cell written.

use super::cell_buffer::{CellBuffer, Modifiers};
use crate::color::ColorMode;
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{queue, QueueableCommand};
use qos_core::Color;
use std::io::{self, BufWriter, Write};

#[derive(Clone, Copy, Debug, PartialEq)]
struct StyleState {
    fg: Color,
    bg: Color,
    modifiers: Modifiers,
}

/// Counters from the most recent flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub cells_written: usize,
    pub cursor_moves: usize,
    pub style_changes: usize,
}

#[derive(Debug)]
pub struct DiffRenderer {
    color_mode: ColorMode,
    /// `None` when the cursor position is unknown.
    cursor: Option<(u16, u16)>,
    last_style: Option<StyleState>,
    stats: FlushStats,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::with_color_mode(ColorMode::detect())
    }
}

impl DiffRenderer {
    #[must_use]
    pub const fn with_color_mode(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            cursor: None,
            last_style: None,
            stats: FlushStats {
                cells_written: 0,
                cursor_moves: 0,
                style_changes: 0,
            },
        }
    }

    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    #[must_use]
    pub const fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Forget cursor and style state, e.g. after the terminal was cleared.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.last_style = None;
    }

    /// Write every dirty cell and clear the dirty bits.
    ///
    /// Returns the number of cells written.
    pub fn flush<W: Write>(&mut self, buffer: &mut CellBuffer, writer: &mut W) -> io::Result<usize> {
        self.stats = FlushStats::default();
        let mut out = BufWriter::with_capacity(8192, writer);
        queue!(out, ResetColor)?;
        self.last_style = None;

        let width = buffer.width();
        for idx in buffer.iter_dirty() {
            let cell = &buffer.cells()[idx];
            if cell.is_continuation() {
                continue;
            }
            let (x, y) = buffer.coords(idx);
            if self.cursor != Some((x, y)) {
                queue!(out, MoveTo(x, y))?;
                self.stats.cursor_moves += 1;
            }

            let style = StyleState {
                fg: cell.fg,
                bg: cell.bg,
                modifiers: cell.modifiers,
            };
            if self.last_style != Some(style) {
                self.apply_style(&mut out, style)?;
                self.last_style = Some(style);
                self.stats.style_changes += 1;
            }

            queue!(out, Print(&cell.symbol))?;
            let next_x = x.saturating_add(u16::from(cell.width()));
            self.cursor = (next_x < width).then_some((next_x, y));
            self.stats.cells_written += 1;
        }

        buffer.clear_dirty();
        out.flush()?;
        Ok(self.stats.cells_written)
    }

    /// Repaint the whole buffer.
    pub fn render_full<W: Write>(&mut self, buffer: &mut CellBuffer, writer: &mut W) -> io::Result<usize> {
        buffer.mark_all_dirty();
        self.reset();
        self.flush(buffer, writer)
    }

    fn apply_style<W: Write>(&self, writer: &mut W, style: StyleState) -> io::Result<()> {
        // attributes reset first, it clears colours too
        writer.queue(SetAttribute(Attribute::Reset))?;
        writer.queue(SetForegroundColor(self.color_mode.to_crossterm(style.fg)))?;
        writer.queue(SetBackgroundColor(self.color_mode.to_crossterm(style.bg)))?;
        if style.modifiers.contains(Modifiers::BOLD) {
            writer.queue(SetAttribute(Attribute::Bold))?;
        }
        if style.modifiers.contains(Modifiers::DIM) {
            writer.queue(SetAttribute(Attribute::Dim))?;
        }
        if style.modifiers.contains(Modifiers::UNDERLINE) {
            writer.queue(SetAttribute(Attribute::Underlined))?;
        }
        if style.modifiers.contains(Modifiers::REVERSE) {
            writer.queue(SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(buffer: &mut CellBuffer, renderer: &mut DiffRenderer) -> (usize, String) {
        let mut output = Vec::new();
        let count = renderer.flush(buffer, &mut output).unwrap();
        (count, String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_first_flush_writes_everything() {
        let mut buffer = CellBuffer::new(4, 2);
        let mut renderer = DiffRenderer::with_color_mode(ColorMode::TrueColor);
        let (count, _) = written(&mut buffer, &mut renderer);
        assert_eq!(count, 8);
        assert_eq!(buffer.dirty_count(), 0);
    }

    #[test]
    fn test_second_flush_writes_only_changes() {
        let mut buffer = CellBuffer::new(10, 5);
        let mut renderer = DiffRenderer::with_color_mode(ColorMode::TrueColor);
        written(&mut buffer, &mut renderer);

        buffer.update(5, 2, "Q", Color::WHITE, Color::VOID, Modifiers::BOLD);
        let (count, text) = written(&mut buffer, &mut renderer);
        assert_eq!(count, 1);
        assert!(text.contains('Q'));
        assert_eq!(renderer.stats().cursor_moves, 1);
    }

    #[test]
    fn test_adjacent_cells_share_cursor_and_style() {
        let mut buffer = CellBuffer::new(10, 1);
        let mut renderer = DiffRenderer::with_color_mode(ColorMode::Color256);
        written(&mut buffer, &mut renderer);
        for (x, ch) in ["a", "b", "c"].iter().enumerate() {
            buffer.update(x as u16, 0, ch, Color::WHITE, Color::BLACK, Modifiers::NONE);
        }
        let (count, _) = written(&mut buffer, &mut renderer);
        assert_eq!(count, 3);
        assert_eq!(renderer.stats().cursor_moves, 1);
        assert_eq!(renderer.stats().style_changes, 1);
    }

    #[test]
    fn test_render_full_repaints_clean_buffer() {
        let mut buffer = CellBuffer::new(3, 3);
        let mut renderer = DiffRenderer::with_color_mode(ColorMode::Mono);
        written(&mut buffer, &mut renderer);
        let mut output = Vec::new();
        assert_eq!(renderer.render_full(&mut buffer, &mut output).unwrap(), 9);
    }

    #[test]
    fn test_continuation_cells_skipped() {
        let mut buffer = CellBuffer::new(4, 1);
        buffer.update(0, 0, "日", Color::WHITE, Color::BLACK, Modifiers::NONE);
        let mut renderer = DiffRenderer::with_color_mode(ColorMode::TrueColor);
        let (count, _) = written(&mut buffer, &mut renderer);
        assert_eq!(count, 3);
    }
}
