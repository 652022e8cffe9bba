//! Timed full-screen overlays: confetti plus a pulsing banner, and the big
//! letters that float up while a phrase is being typed.

use crate::colors;
use crate::config::Viewport;
use crate::font::{self, GLYPH_H, GLYPH_W};
use crate::raster::{hex, Canvas, Rgb, Shape};
use rand::prelude::*;
use tracing::info;

/// Reference height the banner proportions were tuned on
const REFERENCE_HEIGHT: f32 = 800.0;
const CONFETTI_COUNT: usize = 40;
const CONFETTI_SPIN: f32 = 0.05;
const FLYUP_DECAY: f32 = 0.008;
const FLYUP_RISE: f32 = -0.12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CelebrationKind {
    Emi,
    Mama,
    Roomba,
}

impl CelebrationKind {
    pub const ALL: [CelebrationKind; 3] = [CelebrationKind::Emi, CelebrationKind::Mama, CelebrationKind::Roomba];

    /// Letters that complete this celebration when typed in order
    pub fn phrase(self) -> &'static str {
        match self {
            CelebrationKind::Emi => "EMI",
            CelebrationKind::Mama => "MAMA",
            CelebrationKind::Roomba => "ROOMBA",
        }
    }

    pub fn duration_ms(self) -> u64 {
        match self {
            CelebrationKind::Emi => 4000,
            CelebrationKind::Mama | CelebrationKind::Roomba => 5000,
        }
    }

    fn confetti_colors(self) -> [Rgb; 7] {
        match self {
            CelebrationKind::Emi => [
                hex(0xFF0055),
                hex(0xFFD700),
                hex(0x00FF55),
                hex(0xFF77FF),
                hex(0x00CCFF),
                hex(0xFF8800),
                hex(0xFFFFFF),
            ],
            CelebrationKind::Mama => [
                hex(0xFF69B4),
                hex(0xFF1493),
                hex(0xFFB6C1),
                hex(0xFF85A2),
                hex(0xFFC0CB),
                hex(0xFF007F),
                hex(0xFFFFFF),
            ],
            CelebrationKind::Roomba => [
                hex(0xFF0000),
                hex(0xFF3300),
                hex(0xCC0000),
                hex(0xFF6600),
                hex(0x990000),
                hex(0xFF4444),
                hex(0xFFD700),
            ],
        }
    }

    /// Alternate confetti silhouette and the chance of picking it
    fn alternate_shape(self) -> Option<(Shape, f64)> {
        match self {
            CelebrationKind::Emi => None,
            CelebrationKind::Mama => Some((Shape::Heart, 0.6)),
            CelebrationKind::Roomba => Some((Shape::Warning, 0.5)),
        }
    }

    fn banner(self) -> &'static Banner {
        match self {
            CelebrationKind::Emi => &EMI_BANNER,
            CelebrationKind::Mama => &MAMA_BANNER,
            CelebrationKind::Roomba => &ROOMBA_BANNER,
        }
    }
}

/// How a kind's banner looks
struct Banner {
    /// Glyph, horizontal offset in font sizes, colour
    letters: &'static [(char, f32, Rgb)],
    /// Glyph height at the reference height
    font_size: f32,
    subtitle: &'static str,
    backdrop: Rgb,
    backdrop_alpha: f32,
    /// Backdrop brightness throbs with this rate when set
    flash_rate: Option<f32>,
    stripes: &'static [Rgb],
    pulse_rate: f32,
}

static EMI_BANNER: Banner = Banner {
    letters: &[
        ('E', -0.8, hex(0xFF4444)),
        ('M', 0.0, hex(0x44FF44)),
        ('I', 0.7, hex(0x6666FF)),
    ],
    font_size: 160.0,
    subtitle: "* ¡E M I! *",
    backdrop: hex(0x000000),
    backdrop_alpha: 0.6,
    flash_rate: None,
    stripes: &[hex(0xFF0055), hex(0xFFD700), hex(0x00FF55), hex(0x00CCFF), hex(0xFF77FF)],
    pulse_rate: 0.01,
};

static MAMA_BANNER: Banner = Banner {
    letters: &[
        ('M', -1.2, hex(0xFF1493)),
        ('A', -0.4, hex(0xFF69B4)),
        ('M', 0.4, hex(0xFF007F)),
        ('A', 1.2, hex(0xFFB6C1)),
    ],
    font_size: 130.0,
    subtitle: "<3 ¡M A M Á! <3",
    backdrop: hex(0x3C001E),
    backdrop_alpha: 0.7,
    flash_rate: None,
    stripes: &[hex(0xFF69B4), hex(0xFF1493), hex(0xFFB6C1), hex(0xFF007F), hex(0xFF69B4)],
    pulse_rate: 0.01,
};

static ROOMBA_BANNER: Banner = Banner {
    letters: &[
        ('R', -1.625, hex(0xFF0000)),
        ('O', -0.975, hex(0xFF3300)),
        ('O', -0.325, hex(0xCC0000)),
        ('M', 0.325, hex(0xFF4400)),
        ('B', 0.975, hex(0xFF2200)),
        ('A', 1.625, hex(0xFF0000)),
    ],
    font_size: 110.0,
    subtitle: "¡ALERTA ROOMBA!",
    backdrop: hex(0x3C0000),
    backdrop_alpha: 0.8,
    flash_rate: Some(0.015),
    stripes: &[hex(0xFF0000), hex(0xFF3300), hex(0xCC0000), hex(0xFF4400), hex(0xFF0000)],
    pulse_rate: 0.012,
};

/// Decorative confetti; moves in a straight line and spins, no gravity
#[derive(Clone, Debug)]
pub struct Confetti {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Rgb,
    pub spin: f32,
    pub shape: Shape,
}

#[derive(Clone, Debug)]
pub struct Celebration {
    pub kind: CelebrationKind,
    pub started_ms: u64,
    pub confetti: Vec<Confetti>,
}

impl Celebration {
    pub fn new(kind: CelebrationKind, now_ms: u64, viewport: Viewport, rng: &mut StdRng) -> Self {
        let palette = kind.confetti_colors();
        let (spread, fall, size) = match kind {
            CelebrationKind::Emi => (0.36, 0.24..0.72, 1.0..3.0),
            CelebrationKind::Mama | CelebrationKind::Roomba => (0.3, 0.18..0.54, 1.0..3.5),
        };
        let confetti = (0..CONFETTI_COUNT)
            .map(|_| {
                let shape = match kind.alternate_shape() {
                    Some((alt, chance)) if rng.gen_bool(chance) => alt,
                    _ => Shape::Strip,
                };
                Confetti {
                    x: rng.gen::<f32>() * viewport.width,
                    y: -rng.gen::<f32>() * viewport.height * 0.5,
                    vx: (rng.gen::<f32>() - 0.5) * 2.0 * spread,
                    vy: rng.gen_range(fall.clone()),
                    size: rng.gen_range(size.clone()),
                    color: colors::pick(rng, &palette),
                    spin: rng.gen_range(0.0..0.3),
                    shape,
                }
            })
            .collect();
        info!(?kind, "celebration");
        Self {
            kind,
            started_ms: now_ms,
            confetti,
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    pub fn progress(&self, now_ms: u64) -> f32 {
        self.elapsed_ms(now_ms) as f32 / self.kind.duration_ms() as f32
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Banner opacity: ramps in over the first tenth, out over the last 30%
    pub fn envelope(&self, now_ms: u64) -> f32 {
        let p = self.progress(now_ms);
        if p < 0.1 {
            p * 10.0
        } else if p > 0.7 {
            ((1.0 - p) / 0.3).max(0.0)
        } else {
            1.0
        }
    }

    pub fn tick(&mut self) {
        for c in &mut self.confetti {
            c.x += c.vx;
            c.y += c.vy;
            c.spin += CONFETTI_SPIN;
        }
    }

    pub fn render_confetti(&self, canvas: &mut Canvas, now_ms: u64) {
        let alpha = 1.0 - self.progress(now_ms).min(1.0) * 0.5;
        for c in &self.confetti {
            let radius = match c.shape {
                Shape::Heart => c.size * 0.5,
                Shape::Warning => c.size * 0.6,
                _ => c.size / 2.0,
            };
            canvas.fill_shape(c.x, c.y, radius, c.spin, c.shape, c.color, alpha);
        }
    }

    pub fn render_banner(&self, canvas: &mut Canvas, viewport: Viewport, now_ms: u64) {
        let alpha = self.envelope(now_ms);
        if alpha <= 0.0 {
            return;
        }
        let banner = self.kind.banner();
        let elapsed = self.elapsed_ms(now_ms) as f32;
        let k = viewport.height / REFERENCE_HEIGHT;
        let top = viewport.height * 0.15;
        let height = 220.0 * k;

        let backdrop = match banner.flash_rate {
            Some(rate) => banner.backdrop.scale((elapsed * rate).sin() * 0.3 + 0.7),
            None => banner.backdrop,
        };
        canvas.fill_rect(0.0, top - 10.0 * k, viewport.width, height + 20.0 * k, backdrop, banner.backdrop_alpha * alpha);

        let bar = (6.0 * k).max(1.0);
        for x in 0..viewport.width as usize {
            let color = gradient(banner.stripes, x as f32 / viewport.width.max(1.0));
            canvas.fill_rect(x as f32, top - 14.0 * k, 1.0, bar, color, alpha);
            canvas.fill_rect(x as f32, top + height + 10.0 * k, 1.0, bar, color, alpha);
        }

        // Shrink the lettering on narrow screens so the word still fits
        let (min_off, max_off) = banner
            .letters
            .iter()
            .fold((0.0f32, 0.0f32), |(lo, hi), (_, off, _)| (lo.min(*off), hi.max(*off)));
        let glyph_aspect = GLYPH_W as f32 / GLYPH_H as f32;
        let fit = viewport.width * 0.95 / (max_off - min_off + glyph_aspect);
        let pulse = 1.0 + (elapsed * banner.pulse_rate).sin() * 0.05;
        let font_px = (banner.font_size * k).min(fit) * pulse;
        let scale = font_px / GLYPH_H as f32;
        let (cx, cy) = (viewport.width / 2.0, top + height / 2.0);

        for (ch, offset, color) in banner.letters {
            let x = cx + offset * font_px - GLYPH_W as f32 * scale / 2.0;
            font::draw_char(canvas, *ch, x, cy - font_px / 2.0, scale, *color, alpha);
        }

        let sub_scale = (viewport.width * 0.95 / font::text_width(banner.subtitle, 1.0)).min(1.0);
        let sub_w = font::text_width(banner.subtitle, sub_scale);
        let sub_y = cy + font_px / pulse * 0.55;
        font::draw_text(canvas, banner.subtitle, cx - sub_w / 2.0, sub_y, sub_scale, colors::GOLD, alpha);
    }
}

/// Colour at `t` in [0, 1] along evenly spaced stops
fn gradient(stops: &[Rgb], t: f32) -> Rgb {
    match stops {
        [] => Rgb::WHITE,
        [only] => *only,
        _ => {
            let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            stops[i].lerp(stops[i + 1], pos - i as f32)
        }
    }
}

/// Active celebrations, at most one per kind
#[derive(Debug, Default)]
pub struct Celebrations {
    active: Vec<Celebration>,
}

impl Celebrations {
    /// Start `kind`; a running celebration of the same kind starts over
    pub fn trigger(&mut self, kind: CelebrationKind, now_ms: u64, viewport: Viewport, rng: &mut StdRng) {
        self.active.retain(|c| c.kind != kind);
        self.active.push(Celebration::new(kind, now_ms, viewport, rng));
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.active.retain_mut(|c| {
            c.tick();
            !c.is_finished(now_ms)
        });
    }

    #[cfg(test)]
    pub fn get(&self, kind: CelebrationKind) -> Option<&Celebration> {
        self.active.iter().find(|c| c.kind == kind)
    }

    #[cfg(test)]
    pub fn is_active(&self, kind: CelebrationKind) -> bool {
        self.get(kind).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Confetti of every celebration first, then the banners on top
    pub fn render(&self, canvas: &mut Canvas, viewport: Viewport, now_ms: u64) {
        for c in &self.active {
            c.render_confetti(canvas, now_ms);
        }
        for c in &self.active {
            c.render_banner(canvas, viewport, now_ms);
        }
    }
}

/// Big letter floating up from mid-screen
#[derive(Clone, Debug)]
pub struct Flyup {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    pub life: f32,
    /// Glyph height in pixels
    pub size: f32,
    pub color: Rgb,
}

/// Colour of the fly-up for a phrase letter, if it gets one
pub fn flyup_color(ch: char) -> Option<Rgb> {
    match ch {
        'E' => Some(hex(0xFF4444)),
        'M' => Some(hex(0x44FF44)),
        'I' => Some(hex(0x4444FF)),
        'A' => Some(hex(0xFF69B4)),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Flyups {
    items: Vec<Flyup>,
}

impl Flyups {
    pub fn spawn(&mut self, ch: char, color: Rgb, viewport: Viewport, rng: &mut StdRng) {
        let k = viewport.height / REFERENCE_HEIGHT;
        self.items.push(Flyup {
            ch,
            x: viewport.width / 2.0 + (rng.gen::<f32>() - 0.5) * viewport.width * 0.25,
            y: viewport.height * 0.3,
            life: 1.0,
            size: rng.gen_range(150.0..200.0) * k,
            color,
        });
    }

    pub fn tick(&mut self) {
        self.items.retain_mut(|f| {
            f.y += FLYUP_RISE;
            f.life -= FLYUP_DECAY;
            f.life > 0.0
        });
    }

    #[cfg(test)]
    pub fn items(&self) -> &[Flyup] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn render(&self, canvas: &mut Canvas) {
        for f in &self.items {
            let scale = f.size / GLYPH_H as f32;
            let x = f.x - GLYPH_W as f32 * scale / 2.0;
            font::draw_char(canvas, f.ch, x, f.y - f.size / 2.0, scale, f.color, f.life);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{gradient, Celebration, CelebrationKind, Celebrations, Flyups};
    use crate::config::Viewport;
    use crate::raster::{hex, Canvas, Rgb, Shape};
    use rand::prelude::*;

    fn setup() -> (StdRng, Viewport) {
        (StdRng::seed_from_u64(17), Viewport::new(120, 80))
    }

    #[test]
    fn envelope_ramps_holds_and_fades() {
        let (mut rng, vp) = setup();
        let c = Celebration::new(CelebrationKind::Emi, 1_000, vp, &mut rng);
        assert_eq!(c.envelope(1_000), 0.0);
        assert!((c.envelope(1_200) - 0.5).abs() < 1e-4);
        assert_eq!(c.envelope(2_000), 1.0);
        assert!((c.envelope(4_400) - 0.5).abs() < 1e-3);
        assert!(!c.is_finished(4_999));
        assert!(c.is_finished(5_000));
    }

    #[test]
    fn confetti_batches_use_kind_shapes() {
        let (mut rng, vp) = setup();
        let emi = Celebration::new(CelebrationKind::Emi, 0, vp, &mut rng);
        assert_eq!(emi.confetti.len(), 40);
        assert!(emi.confetti.iter().all(|c| c.shape == Shape::Strip));

        let mama = Celebration::new(CelebrationKind::Mama, 0, vp, &mut rng);
        assert!(mama.confetti.iter().any(|c| c.shape == Shape::Heart));
        assert!(mama.confetti.iter().all(|c| matches!(c.shape, Shape::Heart | Shape::Strip)));

        let roomba = Celebration::new(CelebrationKind::Roomba, 0, vp, &mut rng);
        assert!(roomba.confetti.iter().any(|c| c.shape == Shape::Warning));
    }

    #[test]
    fn confetti_moves_without_gravity() {
        let (mut rng, vp) = setup();
        let mut c = Celebration::new(CelebrationKind::Mama, 0, vp, &mut rng);
        let before: Vec<(f32, f32)> = c.confetti.iter().map(|p| (p.vx, p.vy)).collect();
        for _ in 0..30 {
            c.tick();
        }
        let after: Vec<(f32, f32)> = c.confetti.iter().map(|p| (p.vx, p.vy)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn one_celebration_per_kind_and_self_expiry() {
        let (mut rng, vp) = setup();
        let mut all = Celebrations::default();
        all.trigger(CelebrationKind::Emi, 0, vp, &mut rng);
        all.trigger(CelebrationKind::Emi, 500, vp, &mut rng);
        all.trigger(CelebrationKind::Mama, 500, vp, &mut rng);
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(CelebrationKind::Emi).map(|c| c.started_ms), Some(500));

        all.tick(4_499);
        assert!(all.is_active(CelebrationKind::Emi));
        all.tick(4_500);
        assert!(!all.is_active(CelebrationKind::Emi));
        assert!(all.is_active(CelebrationKind::Mama));
        all.tick(5_500);
        assert!(all.is_empty());
    }

    #[test]
    fn banner_draws_once_faded_in() {
        let (mut rng, vp) = setup();
        let c = Celebration::new(CelebrationKind::Roomba, 0, vp, &mut rng);
        let mut hidden = Canvas::new(120, 80);
        c.render_banner(&mut hidden, vp, 0);
        assert_eq!(hidden.coverage(), 0);

        let mut shown = Canvas::new(120, 80);
        c.render_banner(&mut shown, vp, 2_000);
        assert!(shown.coverage() > 120 * 10);
    }

    #[test]
    fn gradient_hits_stops() {
        let stops = [hex(0x000000), hex(0xFFFFFF)];
        assert_eq!(gradient(&stops, 0.0), Rgb::BLACK);
        assert_eq!(gradient(&stops, 1.0), Rgb::WHITE);
        assert_eq!(gradient(&[], 0.5), Rgb::WHITE);
    }

    #[test]
    fn flyups_rise_and_fade() {
        let (mut rng, vp) = setup();
        let mut flyups = Flyups::default();
        flyups.spawn('E', hex(0xFF4444), vp, &mut rng);
        let y0 = flyups.items()[0].y;
        flyups.tick();
        assert!(flyups.items()[0].y < y0);
        for _ in 0..200 {
            flyups.tick();
        }
        assert!(flyups.items().is_empty());
    }
}
