//! Grid of terminal cells with per-cell dirty bits.
//!
//! A cell is dirty when it differs from what the last flush wrote, so a
//! frame that clears and redraws the same content leaves nothing to
//! write. Symbols are `CompactString`s, so the usual one-grapheme cell
//! never allocates once the buffer exists.

use bitvec::prelude::*;
use compact_str::CompactString;
use qos_core::Color;
use unicode_width::UnicodeWidthStr;

/// Text attributes of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const DIM: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const REVERSE: Self = Self(1 << 3);

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.with(rhs)
    }
}

/// One terminal cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub symbol: CompactString,
    pub fg: Color,
    pub bg: Color,
    pub modifiers: Modifiers,
    /// 1 for normal, 2 for wide graphemes, 0 for the cell a wide one covers.
    width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: CompactString::const_new(" "),
            fg: Color::WHITE,
            // unpainted cells keep the terminal's own background
            bg: Color::TRANSPARENT,
            modifiers: Modifiers::NONE,
            width: 1,
        }
    }
}

impl Cell {
    #[must_use]
    pub fn new(symbol: &str, fg: Color, bg: Color, modifiers: Modifiers) -> Self {
        let mut cell = Self::default();
        cell.update(symbol, fg, bg, modifiers);
        cell
    }

    /// Replace the content in place.
    pub fn update(&mut self, symbol: &str, fg: Color, bg: Color, modifiers: Modifiers) {
        self.symbol.clear();
        self.symbol.push_str(symbol);
        self.fg = fg;
        self.bg = bg;
        self.modifiers = modifiers;
        self.width = UnicodeWidthStr::width(symbol).clamp(1, 2) as u8;
    }

    /// Turn into the trailing half of a wide grapheme.
    pub fn make_continuation(&mut self) {
        self.symbol.clear();
        self.width = 0;
    }

    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Row-major cell grid.
#[derive(Debug)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    /// What the terminal shows per cell; `None` when unknown.
    flushed: Vec<Option<Cell>>,
    width: u16,
    height: u16,
    dirty: BitVec,
}

impl CellBuffer {
    /// Blank buffer; every cell starts dirty so the first flush paints it all.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            cells: vec![Cell::default(); size],
            flushed: vec![None; size],
            width,
            height,
            dirty: bitvec![1; size],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// `(x, y)` of a linear index.
    #[must_use]
    pub fn coords(&self, idx: usize) -> (u16, u16) {
        let width = usize::from(self.width.max(1));
        ((idx % width) as u16, (idx / width) as u16)
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Write one grapheme. Out of range is a no-op.
    ///
    /// A wide grapheme also claims the cell to its right.
    pub fn update(&mut self, x: u16, y: u16, symbol: &str, fg: Color, bg: Color, modifiers: Modifiers) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let cell = &mut self.cells[idx];
        let was_wide = cell.width() > 1;
        if cell.symbol != symbol || cell.fg != fg || cell.bg != bg || cell.modifiers != modifiers {
            cell.update(symbol, fg, bg, modifiers);
        }
        self.sync_dirty(idx);
        let is_wide = self.cells[idx].width() > 1;
        if let Some(next) = self.index(x.saturating_add(1), y) {
            if is_wide {
                self.cells[next].make_continuation();
                self.sync_dirty(next);
            } else if was_wide {
                self.cells[next].reset();
                self.sync_dirty(next);
            }
        }
    }

    fn sync_dirty(&mut self, idx: usize) {
        let changed = self.flushed[idx].as_ref() != Some(&self.cells[idx]);
        self.dirty.set(idx, changed);
    }

    /// Forget what the terminal shows; the next flush writes every cell.
    pub fn mark_all_dirty(&mut self) {
        self.flushed.fill(None);
        self.dirty.fill(true);
    }

    /// Record the dirty cells as written to the terminal.
    pub fn clear_dirty(&mut self) {
        for idx in self.dirty.iter_ones() {
            self.flushed[idx] = Some(self.cells[idx].clone());
        }
        self.dirty.fill(false);
    }

    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones()
    }

    pub fn iter_dirty(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter_ones()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Resize, discarding the content.
    pub fn resize(&mut self, width: u16, height: u16) {
        let size = usize::from(width) * usize::from(height);
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(size, Cell::default());
        self.flushed = vec![None; size];
        self.dirty = bitvec![1; size];
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        for idx in 0..self.cells.len() {
            if self.cells[idx] != Cell::default() {
                self.cells[idx].reset();
                self.sync_dirty(idx);
            }
        }
    }

    /// Symbols of row `y` with trailing blanks trimmed.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let mut line = String::with_capacity(usize::from(self.width));
        for x in 0..self.width {
            if let Some(cell) = self.get(x, y) {
                if !cell.is_continuation() {
                    line.push_str(&cell.symbol);
                }
            }
        }
        line.truncate(line.trim_end().len());
        line
    }

    /// Whole buffer as plain text, one line per row.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            out.push_str(&self.row_text(y));
            out.push('\n');
        }
        out
    }
}
