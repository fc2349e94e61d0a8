//! Braille dot canvas: every terminal cell holds a 2x4 grid of dots

use crate::colors::Rgb;
use crate::surface::Surface;
use crate::terminal::Terminal;
use glam::Vec2;

const BRAILLE_BASE: u32 = 0x2800;
const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;

// Widest brush radius in dots; thicker strokes are drawn at this size
const MAX_BRUSH: i32 = 4;

/// Bit for a dot inside a cell.
///
/// Braille dot numbering:
/// 0 3
/// 1 4
/// 2 5
/// 6 7
fn dot_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 1 << 0,
        (0, 1) => 1 << 1,
        (0, 2) => 1 << 2,
        (1, 0) => 1 << 3,
        (1, 1) => 1 << 4,
        (1, 2) => 1 << 5,
        (0, 3) => 1 << 6,
        (1, 3) => 1 << 7,
        _ => 0,
    }
}

pub fn encode_braille(bits: u8) -> char {
    char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' ')
}

pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
    ink: Vec<Option<Rgb>>,
    background: Rgb,
    stroke: Rgb,
    width: f32,
}

impl BrailleCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
            ink: vec![None; cols * rows],
            background: Rgb::new(0, 0, 0),
            stroke: Rgb::new(255, 255, 255),
            width: 1.0,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    /// Set one dot in dot coordinates; out-of-range dots are ignored
    pub fn set_dot(&mut self, x: i32, y: i32) {
        let (w, h) = self.dot_dims();
        if x < 0 || y < 0 || x >= w || y >= h {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let idx = (y / DOTS_Y) * self.cols + x / DOTS_X;
        self.cells[idx] |= dot_bit(x % DOTS_X, y % DOTS_Y);
        self.ink[idx] = Some(self.stroke);
    }

    /// Glyph and ink of a terminal cell, None when the cell is empty
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Rgb)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let idx = row * self.cols + col;
        match (self.cells[idx], self.ink[idx]) {
            (0, _) => None,
            (bits, ink) => Some((encode_braille(bits), ink.unwrap_or(self.stroke))),
        }
    }

    /// Copy the canvas into the terminal back buffer
    pub fn blit(&self, term: &mut Terminal) {
        term.fill(Some(self.background.to_color()));
        for row in 0..self.rows {
            for col in 0..self.cols {
                if let Some((ch, ink)) = self.cell(col, row) {
                    term.set(col as i32, row as i32, ch, Some(ink.to_color()), false);
                }
            }
        }
    }

    fn dot_dims(&self) -> (i32, i32) {
        ((self.cols * DOTS_X) as i32, (self.rows * DOTS_Y) as i32)
    }

    fn stamp(&mut self, x: i32, y: i32, radius: i32) {
        for oy in -radius..=radius {
            for ox in -radius..=radius {
                self.set_dot(x + ox, y + oy);
            }
        }
    }

    /// Bresenham line with a square brush
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, radius: i32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.stamp(x, y, radius);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Round to dot coordinates, pulling far off-canvas points in so a runaway
    /// tip can't make one line arbitrarily long
    fn to_dot(&self, p: Vec2) -> (i32, i32) {
        let (w, h) = self.dot_dims();
        let (w, h) = (w as f32, h as f32);
        let x = p.x.clamp(-w, 2.0 * w);
        let y = p.y.clamp(-h, 2.0 * h);
        (x.round() as i32, y.round() as i32)
    }
}

#[cfg(test)]
impl BrailleCanvas {
    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        let (w, h) = self.dot_dims();
        if x < 0 || y < 0 || x >= w || y >= h {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        let idx = (y / DOTS_Y) * self.cols + x / DOTS_X;
        self.cells[idx] & dot_bit(x % DOTS_X, y % DOTS_Y) != 0
    }
}

impl Surface for BrailleCanvas {
    fn size(&self) -> Vec2 {
        let (w, h) = self.dot_dims();
        Vec2::new(w as f32, h as f32)
    }

    fn clear(&mut self, background: Rgb) {
        self.cells.fill(0);
        self.ink.fill(None);
        self.background = background;
    }

    fn set_stroke(&mut self, color: Rgb, width: f32) {
        self.stroke = color;
        self.width = width;
    }

    fn line(&mut self, from: Vec2, to: Vec2) {
        let radius = ((self.width - 1.0) / 2.0).round().clamp(0.0, MAX_BRUSH as f32) as i32;
        let (x0, y0) = self.to_dot(from);
        let (x1, y1) = self.to_dot(to);
        self.draw_line(x0, y0, x1, y1, radius);
    }
}
