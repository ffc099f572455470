//! [`Canvas`] implementation that draws into a [`CellBuffer`].
//!
//! One logical unit is one cell. Shapes are rasterised to cells: lines
//! with Bresenham and slope glyphs, circles as filled cells or a single
//! dot glyph when they are smaller than a cell.

use super::cell_buffer::{CellBuffer, Modifiers};
use qos_core::{Canvas, Color, FontWeight, Point, Rect, TextStyle, Transform2D};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Half-open cell rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClipRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl ClipRect {
    const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    fn intersect(self, other: Self) -> Self {
        let r = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() {
            Self::EMPTY
        } else {
            r
        }
    }

    const fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

pub struct DirectTerminalCanvas<'a> {
    buffer: &'a mut CellBuffer,
    clip_stack: Vec<ClipRect>,
    transform_stack: Vec<Transform2D>,
    current_transform: Transform2D,
}

impl<'a> DirectTerminalCanvas<'a> {
    #[must_use]
    pub fn new(buffer: &'a mut CellBuffer) -> Self {
        let screen = ClipRect {
            x0: 0,
            y0: 0,
            x1: i32::from(buffer.width()),
            y1: i32::from(buffer.height()),
        };
        Self {
            buffer,
            clip_stack: vec![screen],
            transform_stack: Vec::new(),
            current_transform: Transform2D::IDENTITY,
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    fn clip(&self) -> ClipRect {
        self.clip_stack.last().copied().unwrap_or(ClipRect::EMPTY)
    }

    fn to_cell(&self, p: Point) -> (i32, i32) {
        let p = self.current_transform.apply(p);
        (p.x.round() as i32, p.y.round() as i32)
    }

    /// Cells covered by `rect` after transform, clipped.
    fn to_cells(&self, rect: Rect) -> ClipRect {
        let (x0, y0) = self.to_cell(Point::new(rect.x, rect.y));
        let (x1, y1) = self.to_cell(Point::new(rect.right(), rect.bottom()));
        self.clip().intersect(ClipRect {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        })
    }

    /// Per-axis scale of the current transform.
    fn scale(&self) -> (f32, f32) {
        let m = self.current_transform.matrix;
        (m[0].hypot(m[1]), m[2].hypot(m[3]))
    }

    /// Write one grapheme if it is inside the clip. `bg: None` keeps the
    /// background already in the cell.
    fn set_cell(&mut self, x: i32, y: i32, symbol: &str, fg: Color, bg: Option<Color>, modifiers: Modifiers) {
        if !self.clip().contains(x, y) {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        let bg = bg.unwrap_or_else(|| self.buffer.get(x, y).map_or(Color::TRANSPARENT, |c| c.bg));
        self.buffer.update(x, y, symbol, fg, bg, modifiers);
    }

    fn modifiers_for(style: &TextStyle) -> Modifiers {
        match style.weight {
            FontWeight::Bold => Modifiers::BOLD,
            FontWeight::Normal => Modifiers::NONE,
        }
    }

    fn line_glyph(dx: i32, dy: i32, sx: i32, sy: i32) -> &'static str {
        if dx > dy * 2 {
            "─"
        } else if dy > dx * 2 {
            "│"
        } else if (sx > 0) == (sy > 0) {
            "╲"
        } else {
            "╱"
        }
    }
}

impl Canvas for DirectTerminalCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let r = self.to_cells(rect);
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                self.set_cell(x, y, " ", color, Some(color), Modifiers::NONE);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, _width: f32) {
        let r = self.to_cells(rect);
        if r.is_empty() {
            return;
        }
        let (left, top, right, bottom) = (r.x0, r.y0, r.x1 - 1, r.y1 - 1);
        for x in left..=right {
            self.set_cell(x, top, "─", color, None, Modifiers::NONE);
            self.set_cell(x, bottom, "─", color, None, Modifiers::NONE);
        }
        for y in top..=bottom {
            self.set_cell(left, y, "│", color, None, Modifiers::NONE);
            self.set_cell(right, y, "│", color, None, Modifiers::NONE);
        }
        if right > left && bottom > top {
            self.set_cell(left, top, "┌", color, None, Modifiers::NONE);
            self.set_cell(right, top, "┐", color, None, Modifiers::NONE);
            self.set_cell(left, bottom, "└", color, None, Modifiers::NONE);
            self.set_cell(right, bottom, "┘", color, None, Modifiers::NONE);
        }
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        let (mut x, y) = self.to_cell(position);
        let clip = self.clip();
        if y < clip.y0 || y >= clip.y1 {
            return;
        }
        let modifiers = Self::modifiers_for(style);
        for grapheme in text.graphemes(true) {
            if x >= clip.x1 {
                break;
            }
            let width = UnicodeWidthStr::width(grapheme) as i32;
            if width == 0 {
                continue;
            }
            self.set_cell(x, y, grapheme, style.color, None, modifiers);
            x += width;
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, _width: f32) {
        let (x0, y0) = self.to_cell(from);
        let (x1, y1) = self.to_cell(to);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let glyph = Self::line_glyph(dx, dy, sx, sy);

        let (mut x, mut y) = (x0, y0);
        let mut err = dx - dy;
        loop {
            self.set_cell(x, y, glyph, color, None, Modifiers::NONE);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let (cx, cy) = self.to_cell(center);
        let (sx, sy) = self.scale();
        let (rx, ry) = (radius * sx, radius * sy);
        if rx < 1.0 && ry < 1.0 {
            let glyph = if rx.max(ry) >= 0.5 { "●" } else { "•" };
            self.set_cell(cx, cy, glyph, color, None, Modifiers::NONE);
            return;
        }
        let (rxi, ryi) = (rx.ceil() as i32, ry.ceil() as i32);
        for y in (cy - ryi)..=(cy + ryi) {
            for x in (cx - rxi)..=(cx + rxi) {
                let nx = (x - cx) as f32 / rx.max(0.5);
                let ny = (y - cy) as f32 / ry.max(0.5);
                if nx.mul_add(nx, ny * ny) <= 1.0 {
                    self.set_cell(x, y, " ", color, Some(color), Modifiers::NONE);
                }
            }
        }
    }

    fn draw_path(&mut self, points: &[Point], color: Color, width: f32) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], color, width);
        }
    }

    fn push_clip(&mut self, rect: Rect) {
        let clip = self.to_cells(rect);
        self.clip_stack.push(clip);
    }

    fn pop_clip(&mut self) {
        // the screen clip stays
        if self.clip_stack.len() > 1 {
            self.clip_stack.pop();
        }
    }

    fn push_transform(&mut self, transform: Transform2D) {
        self.transform_stack.push(self.current_transform);
        self.current_transform = transform.then(&self.current_transform);
    }

    fn pop_transform(&mut self) {
        if let Some(previous) = self.transform_stack.pop() {
            self.current_transform = previous;
        }
    }
}
