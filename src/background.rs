//! Static backdrop (sky, grass, wild flowers) and the clouds drifting over it.

use crate::config::Viewport;
use crate::raster::{hex, Canvas, Rgb};
use crate::sprites::PixelGrid;
use rand::prelude::*;

const GRASS_SHADES: [Rgb; 4] = [hex(0x1B7A1B), hex(0x28A428), hex(0x32CD32), hex(0x45E045)];
const BLADE_SHADES: [Rgb; 3] = [hex(0x1A6B1A), hex(0x24922E), hex(0x3CBF3C)];
const FLOWER_COLORS: [Rgb; 6] = [
    hex(0xFF6B8A),
    hex(0xFFD700),
    hex(0xFF4444),
    hex(0xFF8C00),
    hex(0xDA70D6),
    hex(0xFF69B4),
];
const LAVENDER: [Rgb; 5] = [
    hex(0x7B4FAA),
    hex(0x9B59B6),
    hex(0x8E44AD),
    hex(0xA569BD),
    hex(0x7D3C98),
];

/// Paint the cacheable part of the backdrop. The same seed always yields
/// the same meadow for a given size.
pub fn render_background(viewport: Viewport, seed: u64) -> Canvas {
    let (w, h) = (viewport.width as usize, viewport.height as usize);
    let mut canvas = Canvas::new(w, h);
    let mut rng = StdRng::seed_from_u64(seed);
    let ground = viewport.ground_y();
    let depth = viewport.grass_depth();

    // Sky in 2px bands, deep blue at the top paling towards the horizon
    let mut y = 0.0;
    while y < ground {
        let t = y / ground;
        let band = Rgb {
            r: (60.0 + t * 80.0) as u8,
            g: (120.0 + t * 90.0) as u8,
            b: (200.0 + t * 40.0) as u8,
        };
        canvas.fill_rect(0.0, y, viewport.width, 2.0, band, 1.0);
        y += 2.0;
    }

    let layer = depth / 4.0;
    for (i, shade) in GRASS_SHADES.iter().enumerate() {
        canvas.fill_rect(0.0, ground + (3 - i) as f32 * layer, viewport.width, layer + 1.0, *shade, 1.0);
    }

    for _ in 0..(viewport.width * 0.3) as usize {
        let x = rng.gen_range(0.0..viewport.width);
        let y = ground + rng.gen_range(0.0..depth);
        let blade = rng.gen_range(1.0..3.0);
        let shade = BLADE_SHADES[rng.gen_range(0..BLADE_SHADES.len())];
        canvas.fill_rect(x, y - blade, 1.0, blade, shade, 1.0);
    }

    for _ in 0..(viewport.width * 0.04).max(2.0) as usize {
        let x = rng.gen_range(0.0..viewport.width);
        let y = ground + 1.0 + rng.gen_range(0.0..depth * 0.6);
        let color = FLOWER_COLORS[rng.gen_range(0..FLOWER_COLORS.len())];
        canvas.put(x as i32, y as i32, color);
        canvas.put(x as i32, y as i32 + 1, GRASS_SHADES[0]);
    }

    for _ in 0..(viewport.width * 0.012).max(1.0) as usize {
        let x = rng.gen_range(0.0..viewport.width).floor();
        let base = ground + 1.0 + rng.gen_range(0.0..depth * 0.4);
        draw_lavender(&mut canvas, x, base, rng.gen_range(3.0..6.0));
    }

    for _ in 0..(viewport.width * 0.01).max(1.0) as usize {
        let x = rng.gen_range(0.0..viewport.width).floor();
        let base = ground + 2.0 + rng.gen_range(0.0..depth * 0.45);
        draw_jasmine(&mut canvas, x, base, rng.gen_range(3.0..5.0));
    }

    canvas
}

fn draw_lavender(canvas: &mut Canvas, x: f32, base: f32, stem: f32) {
    canvas.fill_rect(x, base - stem, 1.0, stem, hex(0x4A7A3A), 1.0);
    canvas.put(x as i32 - 1, (base - stem * 0.4) as i32, hex(0x5A8A4A));
    canvas.put(x as i32 + 1, (base - stem * 0.6) as i32, hex(0x5A8A4A));
    let spike = (stem * 0.45).ceil() as i32;
    for j in 0..spike {
        canvas.put(x as i32, (base - stem) as i32 - j, LAVENDER[j as usize % LAVENDER.len()]);
    }
}

fn draw_jasmine(canvas: &mut Canvas, x: f32, base: f32, size: f32) {
    for row in 0..2 {
        let row_w = size * (1.0 - row as f32 * 0.3);
        canvas.fill_rect(x - row_w / 2.0, base - row as f32, row_w, 1.0, hex(0x2D7A2D), 1.0);
    }
    canvas.fill_rect(x - size * 0.25, base - 2.0, size * 0.5, 1.0, hex(0x3A8F3A), 1.0);
    for (fx, fy) in [(-0.3, -1.0), (0.25, -2.0), (0.0, -2.0)] {
        canvas.put((x + fx * size) as i32, (base + fy) as i32, Rgb::WHITE);
    }
    canvas.put(x as i32, (base - 2.0) as i32, hex(0xFFE066));
}

static CLOUD_SHAPES: [PixelGrid; 3] = [
    PixelGrid {
        rows: &[
            "0001110000000000",
            "0012221001100000",
            "0122222112210000",
            "1222222222221000",
            "1222222222222100",
            "0112222222221100",
            "0001111111110000",
        ],
        colors: &[(1, hex(0xD0E8F8)), (2, hex(0xFFFFFF))],
    },
    PixelGrid {
        rows: &[
            "000001100000",
            "000112211000",
            "001222222100",
            "012222222210",
            "122222222221",
            "011111111110",
        ],
        colors: &[(1, hex(0xD0E8F8)), (2, hex(0xFFFFFF))],
    },
    PixelGrid {
        rows: &[
            "001100001100000000",
            "012210012210000000",
            "122221122221110000",
            "122222222222221000",
            "122222222222222100",
            "012222222222221000",
            "001111111111110000",
        ],
        colors: &[(1, hex(0xD0E8F8)), (2, hex(0xFFFFFF))],
    },
];

/// A cloud positioned in viewport fractions
#[derive(Clone, Debug)]
pub struct Cloud {
    shape: usize,
    pub x: f32,
    y: f32,
    /// Fraction of the width travelled per second
    speed: f32,
}

/// Ambient clouds, redrawn every frame on top of the cached backdrop
#[derive(Clone, Debug)]
pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Default for Clouds {
    fn default() -> Self {
        Self {
            clouds: vec![
                Cloud { shape: 0, x: 0.1, y: 0.06, speed: 0.008 },
                Cloud { shape: 1, x: 0.55, y: 0.10, speed: 0.005 },
                Cloud { shape: 2, x: 0.75, y: 0.03, speed: 0.01 },
            ],
        }
    }
}

impl Clouds {
    pub fn iter(&self) -> impl Iterator<Item = &Cloud> {
        self.clouds.iter()
    }

    /// Drift one frame; clouds leaving on the right come back from the left
    pub fn tick(&mut self, viewport: Viewport) {
        for cloud in &mut self.clouds {
            cloud.x += cloud.speed / 60.0;
            let shape_w = CLOUD_SHAPES[cloud.shape].width() as f32;
            if cloud.x * viewport.width > viewport.width + shape_w * 2.0 {
                cloud.x = -0.15;
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas, viewport: Viewport) {
        let scale = if viewport.width >= 160.0 { 2 } else { 1 };
        for cloud in &self.clouds {
            let grid = &CLOUD_SHAPES[cloud.shape];
            let (ox, oy) = (cloud.x * viewport.width, cloud.y * viewport.height);
            for (col, row, index) in grid.cells() {
                if let Some(color) = grid.color(index) {
                    canvas.fill_rect(
                        ox + (col * scale) as f32,
                        oy + (row * scale) as f32,
                        scale as f32,
                        scale as f32,
                        color,
                        1.0,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render_background, Clouds, GRASS_SHADES};
    use crate::config::Viewport;
    use crate::raster::Canvas;

    #[test]
    fn backdrop_is_opaque_and_deterministic() {
        let vp = Viewport::new(80, 48);
        let a = render_background(vp, 9);
        let b = render_background(vp, 9);
        assert_eq!(a, b);
        assert_eq!(a.coverage(), 80 * 48);
    }

    #[test]
    fn bottom_row_is_grass() {
        let vp = Viewport::new(40, 40);
        let bg = render_background(vp, 3);
        let green = (0..40)
            .filter_map(|x| bg.get(x, 39))
            .filter(|c| c.g > c.b)
            .count();
        assert!(green >= 30, "expected mostly grass at the bottom, got {green}");
        // Top-left is sky
        let sky = bg.get(0, 0).unwrap();
        assert!(sky.b > sky.g && !GRASS_SHADES.contains(&sky));
    }

    #[test]
    fn clouds_wrap_around() {
        let vp = Viewport::new(100, 50);
        let mut clouds = Clouds::default();
        for _ in 0..60 * 400 {
            clouds.tick(vp);
        }
        assert!(clouds.iter().all(|c| c.x < 1.5));
        let mut canvas = Canvas::new(100, 50);
        clouds.render(&mut canvas, vp);
    }
}
