/// Half-block character canvas for terminal rendering
///
/// Every terminal cell holds two vertically stacked pixels drawn with `▀`:
/// the foreground color paints the upper pixel and the background color the
/// lower one, so a `cols × rows` area gives a `cols × 2·rows` pixel grid.
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use sketch3d_core::{Color, DrawSurface};
use std::io::Write;

const UPPER_HALF: char = '▀';

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Pixel canvas that implements [`DrawSurface`]
pub struct HalfBlockCanvas {
    cols: usize,
    rows: usize,
    background: Color,
    pixels: Vec<Option<Color>>,
    labels: Vec<Option<(char, Color)>>,
}

impl HalfBlockCanvas {
    pub fn new(cols: usize, rows: usize, background: Color) -> Self {
        Self {
            cols,
            rows,
            background,
            pixels: vec![None; cols * rows * 2],
            labels: vec![None; cols * rows],
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        *self = Self::new(cols, rows, self.background);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(None);
        self.labels.fill(None);
    }

    /// Pixel dimensions.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.cols, self.rows * 2)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        let (w, h) = self.pixel_size();
        if x < w && y < h {
            self.pixels[y * w + x]
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let (w, h) = self.pixel_size();
        if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
            self.pixels[y as usize * w + x as usize] = Some(color);
        }
    }

    fn stamp(&mut self, x: i32, y: i32, radius: i32, color: Color) {
        for oy in -radius..=radius {
            for ox in -radius..=radius {
                self.set_pixel(x + ox, y + oy, color);
            }
        }
    }

    /// Bresenham line with a square brush, clipped to the canvas first.
    fn draw_line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Color, width: f32) {
        let (w, h) = self.pixel_size();
        let Some((from, to)) = clip_segment(from, to, w as f32, h as f32) else {
            return;
        };
        let radius = (width / 4.0) as i32;
        let (mut x0, mut y0) = (from.x.floor() as i32, from.y.floor() as i32);
        let (x1, y1) = (to.x.floor() as i32, to.y.floor() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp(x0, y0, radius, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn fill_triangle(&mut self, v0: Point2<f32>, v1: Point2<f32>, v2: Point2<f32>, color: Color) {
        let (w, h) = self.pixel_size();
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(w as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(h as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) {
                    // Either winding is accepted
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.set_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Put a text label starting at the cell holding pixel `at`.
    fn put_text(&mut self, at: Point2<f32>, text: &str, color: Color) {
        if at.x < 0.0 || at.y < 0.0 {
            return;
        }
        let (col, row) = (at.x as usize, at.y as usize / 2);
        if row >= self.rows {
            return;
        }
        for (i, c) in text.chars().enumerate() {
            let col = col + i;
            if col >= self.cols {
                break;
            }
            self.labels[row * self.cols + col] = Some((c, color));
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let (w, _) = self.pixel_size();
        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for col in 0..self.cols {
                let lower = self.pixels[(row * 2 + 1) * w + col].unwrap_or(self.background);
                if let Some((c, color)) = self.labels[row * self.cols + col] {
                    writer.queue(SetForegroundColor(term_color(color)))?;
                    writer.queue(SetBackgroundColor(term_color(lower)))?;
                    writer.queue(Print(c))?;
                    continue;
                }
                let upper = self.pixels[row * 2 * w + col].unwrap_or(self.background);
                writer.queue(SetForegroundColor(term_color(upper)))?;
                writer.queue(SetBackgroundColor(term_color(lower)))?;
                writer.queue(Print(UPPER_HALF))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl DrawSurface for HalfBlockCanvas {
    fn polygon(&mut self, points: &[Point2<f32>], fill: Option<Color>, outline: Color, width: f32) {
        if let (Some(fill), [first, rest @ ..]) = (fill, points) {
            for pair in rest.windows(2) {
                self.fill_triangle(*first, pair[0], pair[1], fill);
            }
        }
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.draw_line(*a, b, outline, width);
        }
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Color, width: f32) {
        self.draw_line(from, to, color, width);
    }

    fn text(&mut self, at: Point2<f32>, text: &str, color: Color) {
        self.put_text(at, text, color);
    }
}

/// Pixels of slack around the canvas when clipping, so thick strokes near
/// the border keep their full width.
const CLIP_MARGIN: f32 = 4.0;

/// Liang-Barsky clip of a segment to `[-margin, width + margin] × [-margin, height + margin]`.
fn clip_segment(
    a: Point2<f32>,
    b: Point2<f32>,
    width: f32,
    height: f32,
) -> Option<(Point2<f32>, Point2<f32>)> {
    let d = b - a;
    let bounds = [
        (-d.x, a.x + CLIP_MARGIN),
        (d.x, width + CLIP_MARGIN - a.x),
        (-d.y, a.y + CLIP_MARGIN),
        (d.y, height + CLIP_MARGIN - a.y),
    ];
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn test_canvas_dimensions() {
        let canvas = HalfBlockCanvas::new(40, 10, Color::BLACK);
        assert_eq!(canvas.pixel_size(), (40, 20));
        assert_eq!(canvas.pixel(39, 19), None);
        assert_eq!(canvas.pixel(40, 0), None);
    }

    #[test]
    fn test_fill_both_windings() {
        let mut canvas = HalfBlockCanvas::new(20, 10, Color::BLACK);
        let square = [
            Point2::new(2.0, 2.0),
            Point2::new(12.0, 2.0),
            Point2::new(12.0, 12.0),
            Point2::new(2.0, 12.0),
        ];
        canvas.polygon(&square, Some(RED), BLUE, 1.0);
        assert_eq!(canvas.pixel(7, 7), Some(RED));
        assert_eq!(canvas.pixel(2, 7), Some(BLUE));

        canvas.clear();
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        canvas.polygon(&reversed, Some(RED), BLUE, 1.0);
        assert_eq!(canvas.pixel(7, 7), Some(RED));
        assert_eq!(canvas.pixel(15, 15), None);
    }

    #[test]
    fn test_line_endpoints() {
        let mut canvas = HalfBlockCanvas::new(20, 10, Color::BLACK);
        canvas.line(Point2::new(1.0, 1.0), Point2::new(10.0, 5.0), RED, 1.0);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(10, 5), Some(RED));
        assert_eq!(canvas.pixel(1, 5), None);
    }

    #[test]
    fn test_offscreen_line_is_clipped() {
        let mut canvas = HalfBlockCanvas::new(10, 5, Color::BLACK);
        canvas.line(Point2::new(-50.0, 3.0), Point2::new(60.0, 3.0), RED, 1.0);
        assert!((0..10).all(|x| canvas.pixel(x, 3) == Some(RED)));
    }

    #[test]
    fn test_clip_segment() {
        let clipped = clip_segment(Point2::new(-100.0, 5.0), Point2::new(100.0, 5.0), 10.0, 10.0);
        let (a, b) = clipped.unwrap();
        assert!((a.x + CLIP_MARGIN).abs() < 1e-4);
        assert!((b.x - 10.0 - CLIP_MARGIN).abs() < 1e-4);
        assert!(clip_segment(Point2::new(-100.0, 50.0), Point2::new(100.0, 50.0), 10.0, 10.0).is_none());
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let mut canvas = HalfBlockCanvas::new(4, 2, Color::BLACK);
        canvas.text(Point2::new(1.0, 2.0), "X", RED);
        let mut out = Vec::new();
        canvas.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(UPPER_HALF).count(), 7);
        assert!(text.contains('X'));
    }
}
