//! Pixel surfaces the scene is composed on.
//!
//! A `Canvas` is a grid of optional colours: `None` is a transparent pixel,
//! which lets cached layers (tree, sprites) be blitted over the background.
//! Everything is presented through half-block cells, so one terminal row
//! holds two canvas rows.

use crossterm::style::Color;
use std::f32::consts::PI;

/// 24-bit colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Build a colour from a `0xRRGGBB` literal
pub const fn hex(v: u32) -> Rgb {
    Rgb {
        r: ((v >> 16) & 0xFF) as u8,
        g: ((v >> 8) & 0xFF) as u8,
        b: (v & 0xFF) as u8,
    }
}

impl Rgb {
    pub const BLACK: Rgb = hex(0x000000);
    pub const WHITE: Rgb = hex(0xFFFFFF);

    /// Linear mix towards `other`; `t` is clamped to 0..=1
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Multiply every channel by `f`
    pub fn scale(self, f: f32) -> Rgb {
        let s = |c: u8| (c as f32 * f).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

/// Silhouettes that can be stamped with `Canvas::fill_shape`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Star,
    /// 2:1 rectangle, the classic confetti strip
    Strip,
    Heart,
    /// Triangle with a dark exclamation bar
    Warning,
}

impl Shape {
    /// Point-in-shape test in unit local coordinates (y grows downwards)
    fn contains(self, x: f32, y: f32) -> bool {
        match self {
            Shape::Circle => x * x + y * y <= 1.0,
            Shape::Square => x.abs() <= 0.8 && y.abs() <= 0.8,
            Shape::Strip => x.abs() <= 1.0 && y.abs() <= 0.45,
            Shape::Triangle | Shape::Warning => in_triangle(x, y),
            Shape::Star => {
                let r = (x * x + y * y).sqrt();
                if r == 0.0 {
                    return true;
                }
                // 5 points, angle measured from straight up
                let a = x.atan2(-y).rem_euclid(2.0 * PI / 5.0) / (2.0 * PI / 5.0);
                let tri = (a - 0.5).abs() * 2.0; // 1 at a point, 0 between points
                r <= 0.45 + 0.55 * tri
            }
            Shape::Heart => {
                let hx = x * 1.2;
                let hy = -y * 1.2 + 0.25;
                let q = hx * hx + hy * hy - 1.0;
                q * q * q - hx * hx * hy * hy * hy <= 0.0
            }
        }
    }
}

fn in_triangle(x: f32, y: f32) -> bool {
    // Apex up at (0,-1), base from (-0.87,0.5) to (0.87,0.5)
    if y > 0.5 || y < -1.0 {
        return false;
    }
    let half = (y + 1.0) / 1.5 * 0.87;
    x.abs() <= half
}

/// Pixel grid with transparency
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Option<Rgb>>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(None);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    /// Number of non-transparent pixels
    #[cfg(test)]
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    pub fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = Some(color);
    }

    /// Alpha-composite `color` over the existing pixel. Transparent pixels
    /// are treated as black.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        if alpha >= 1.0 {
            self.put(x, y, color);
            return;
        }
        let under = self.get(x, y).unwrap_or(Rgb::BLACK);
        self.put(x, y, under.lerp(color, alpha));
    }

    /// Fill a rectangle given in fractional pixels; a pixel is covered when
    /// its centre falls inside.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = (x - 0.5).ceil() as i32;
        let y0 = (y - 0.5).ceil() as i32;
        // Thin rects still leave a mark
        let x1 = ((x + w - 0.5).ceil() as i32).max(x0 + 1);
        let y1 = ((y + h - 0.5).ceil() as i32).max(y0 + 1);
        for py in y0.max(0)..y1.min(self.height as i32) {
            for px in x0.max(0)..x1.min(self.width as i32) {
                self.blend(px, py, color, alpha);
            }
        }
    }

    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb, alpha: f32) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let x0 = (cx - rx).floor() as i32;
        let x1 = (cx + rx).ceil() as i32;
        let y0 = (cy - ry).floor() as i32;
        let y1 = (cy + ry).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = (px as f32 + 0.5 - cx) / rx;
                let dy = (py as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    /// Stamp a rotated shape of radius `radius` centred at (cx, cy)
    #[allow(clippy::too_many_arguments)]
    pub fn fill_shape(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        rotation: f32,
        shape: Shape,
        color: Rgb,
        alpha: f32,
    ) {
        if radius < 0.75 {
            self.blend(cx.floor() as i32, cy.floor() as i32, color, alpha);
            return;
        }
        let (sin, cos) = (-rotation).sin_cos();
        let reach = (radius * 1.5).ceil() as i32;
        let (bx, by) = (cx.floor() as i32, cy.floor() as i32);
        for py in by - reach..=by + reach {
            for px in bx - reach..=bx + reach {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let lx = (dx * cos - dy * sin) / radius;
                let ly = (dx * sin + dy * cos) / radius;
                if shape.contains(lx, ly) {
                    let ink = if shape == Shape::Warning && lx.abs() < 0.18 && ly > -0.45 && ly < 0.3 {
                        Rgb::BLACK
                    } else {
                        color
                    };
                    self.blend(px, py, ink, alpha);
                }
            }
        }
    }

    /// Composite `src` with its top-left corner at (x, y)
    pub fn blit(&mut self, src: &Canvas, x: i32, y: i32, alpha: f32, flip_x: bool) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                if let Some(c) = src.pixels[sy * src.width + sx] {
                    let dx = if flip_x { src.width - 1 - sx } else { sx };
                    self.blend(x + dx as i32, y + sy as i32, c, alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{hex, Canvas, Rgb, Shape};

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(hex(0x3E2723), Rgb { r: 0x3E, g: 0x27, b: 0x23 });
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut c = Canvas::new(4, 4);
        c.put(-1, 0, Rgb::WHITE);
        c.put(4, 0, Rgb::WHITE);
        c.fill_rect(-10.0, -10.0, 5.0, 5.0, Rgb::WHITE, 1.0);
        assert_eq!(c.coverage(), 0);
    }

    #[test]
    fn half_alpha_blends_towards_colour() {
        let mut c = Canvas::new(1, 1);
        c.put(0, 0, Rgb::BLACK);
        c.blend(0, 0, hex(0xC8C8C8), 0.5);
        assert_eq!(c.get(0, 0), Some(hex(0x646464)));
    }

    #[test]
    fn blit_flip_mirrors_columns() {
        let mut src = Canvas::new(2, 1);
        src.put(0, 0, Rgb::WHITE);
        let mut dst = Canvas::new(2, 1);
        dst.blit(&src, 0, 0, 1.0, true);
        assert_eq!(dst.get(0, 0), None);
        assert_eq!(dst.get(1, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn shapes_cover_their_centre() {
        for shape in [
            Shape::Circle,
            Shape::Square,
            Shape::Triangle,
            Shape::Star,
            Shape::Strip,
            Shape::Heart,
        ] {
            let mut c = Canvas::new(11, 11);
            c.fill_shape(5.5, 5.5, 4.0, 0.3, shape, Rgb::WHITE, 1.0);
            assert!(c.coverage() > 4, "{shape:?} drew too little");
            assert!(c.coverage() < 121, "{shape:?} overflowed");
        }
    }
}
