//! Short-lived scene decorations: input bursts (shape and glyph particles,
//! popped pixel sprites) and the petals the tree sheds on its own.

use crate::colors::{self, PETALS};
use crate::config::Viewport;
use crate::font;
use crate::raster::{Canvas, Rgb, Shape};
use crate::sprites::SpriteCache;
use crate::tree::Canopy;
use rand::prelude::*;
use std::rc::Rc;

/// Most recent bursts kept alive
pub const BURST_CAP: usize = 100;
/// Petals stop spawning at this count
pub const LEAF_CAP: usize = 80;
/// Per-tick chance of a new petal while under the cap
const LEAF_SPAWN_CHANCE: f64 = 0.1;

const PARTICLE_SPEED: f32 = 0.6;
const PARTICLE_GRAVITY: f32 = 0.024;
const SPRITE_GRAVITY: f32 = 0.06;
const SPRITE_DECAY: f32 = 0.006;
const LEAF_DECAY: f32 = 0.008;
const BOUNCE: f32 = -0.6;

/// What a particle looks like
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Look {
    Shape(Shape),
    Glyph(char),
}

#[derive(Clone, Debug)]
pub enum EntityKind {
    Particle {
        look: Look,
        color: Rgb,
        size: f32,
        /// Degrees
        rotation: f32,
        spin: f32,
    },
    PixelSprite {
        image: Rc<Canvas>,
    },
    Leaf {
        color: Rgb,
        size: f32,
        rotation: f32,
        spin: f32,
        sway: f32,
    },
}

/// A decaying decoration. `life` starts at 1 and only goes down.
#[derive(Clone, Debug)]
pub struct Entity {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub decay: f32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    fn update(&mut self, viewport: Viewport) {
        self.x += self.vx;
        self.y += self.vy;
        match &mut self.kind {
            EntityKind::Particle {
                look,
                size,
                rotation,
                spin,
                ..
            } => {
                self.vy += PARTICLE_GRAVITY;
                self.life -= self.decay;
                *rotation += *spin;
                *size *= match look {
                    Look::Glyph(_) => 0.99,
                    Look::Shape(_) => 0.95,
                };
            }
            EntityKind::PixelSprite { .. } => {
                self.vy += SPRITE_GRAVITY;
                self.life -= self.decay;
                if self.y > viewport.height {
                    self.y = viewport.height;
                    self.vy *= BOUNCE;
                }
                if self.x < 0.0 || self.x > viewport.width {
                    self.vx = -self.vx;
                }
            }
            EntityKind::Leaf {
                rotation,
                spin,
                sway,
                ..
            } => {
                // Sway rides on top of the drift that was already applied
                self.x += (self.y * 0.33).sin() * *sway;
                *rotation += *spin;
                if self.y > viewport.ground_y() + viewport.grass_depth() / 2.0 {
                    self.life -= self.decay;
                    self.vx *= 0.95;
                    self.vy *= 0.95;
                    *spin *= 0.95;
                }
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let alpha = self.life.clamp(0.0, 1.0);
        match &self.kind {
            EntityKind::Particle {
                look,
                color,
                size,
                rotation,
                ..
            } => match look {
                Look::Shape(shape) => {
                    canvas.fill_shape(self.x, self.y, *size, rotation.to_radians(), *shape, *color, alpha);
                }
                Look::Glyph(ch) => {
                    let scale = size / font::GLYPH_H as f32;
                    let w = font::GLYPH_W as f32 * scale;
                    font::draw_char(canvas, *ch, self.x - w / 2.0, self.y - size / 2.0, scale, *color, alpha);
                }
            },
            EntityKind::PixelSprite { image } => {
                let x = self.x - image.width() as f32 / 2.0;
                let y = self.y - image.height() as f32 / 2.0;
                canvas.blit(image, x.round() as i32, y.round() as i32, alpha, false);
            }
            EntityKind::Leaf {
                color,
                size,
                rotation,
                ..
            } => {
                // Petals are too small to rotate visibly; spin shows as a wobble in width
                let wobble = rotation.to_radians().cos().abs().max(0.4);
                canvas.fill_ellipse(self.x, self.y, size * wobble, size * 0.6, *color, alpha);
            }
        }
    }
}

/// What to spawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spawn<'a> {
    Glyph(char),
    Shape(Shape),
    Sprite(&'a str),
    Leaf,
}

pub const BURST_SHAPES: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Star];

/// Sole owner of every live entity
pub struct EntityManager {
    bursts: Vec<Entity>,
    leaves: Vec<Entity>,
    sprites: SpriteCache,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self {
            bursts: Vec::with_capacity(BURST_CAP),
            leaves: Vec::with_capacity(LEAF_CAP),
            sprites: SpriteCache::default(),
        }
    }
}

impl EntityManager {
    /// Create one entity at (x, y). Unknown sprite names are skipped and
    /// reported as `false`.
    pub fn spawn(&mut self, kind: Spawn, x: f32, y: f32, rng: &mut StdRng, viewport: Viewport) -> bool {
        let entity = match kind {
            Spawn::Glyph(ch) => particle(Look::Glyph(ch), x, y, rng),
            Spawn::Shape(shape) => particle(Look::Shape(shape), x, y, rng),
            Spawn::Sprite(name) => {
                let small = viewport.width.min(viewport.height) < 60.0;
                let scale = if small { rng.gen_range(1..=2) } else { rng.gen_range(2..=3) };
                let Some(image) = self.sprites.get(name, scale) else {
                    return false;
                };
                Entity {
                    x,
                    y,
                    vx: (rng.gen::<f32>() - 0.5) * 1.0,
                    vy: -rng.gen_range(0.6..1.8),
                    life: 1.0,
                    decay: SPRITE_DECAY,
                    kind: EntityKind::PixelSprite { image },
                }
            }
            Spawn::Leaf => {
                self.leaves.push(Entity {
                    x,
                    y,
                    vx: (rng.gen::<f32>() - 0.5) * 0.18,
                    vy: rng.gen_range(0.04..0.18),
                    life: 1.0,
                    decay: LEAF_DECAY,
                    kind: EntityKind::Leaf {
                        color: colors::pick(rng, &PETALS),
                        size: rng.gen_range(0.6..1.3),
                        rotation: rng.gen_range(0.0..360.0),
                        spin: (rng.gen::<f32>() - 0.5) * 6.0,
                        sway: rng.gen_range(0.0..0.02),
                    },
                });
                return true;
            }
        };
        self.bursts.push(entity);
        self.enforce_cap();
        true
    }

    /// Drop a petal from the crown now and then
    pub fn shed_leaves(&mut self, canopy: &Canopy, rng: &mut StdRng, viewport: Viewport) {
        if self.leaves.len() < LEAF_CAP && rng.gen_bool(LEAF_SPAWN_CHANCE) {
            let (x, y) = canopy.random_point(rng, 0.8, 0.5);
            self.spawn(Spawn::Leaf, x, y, rng, viewport);
        }
    }

    /// Advance every entity one tick, bounce bursts off the grass line and
    /// purge the dead
    pub fn tick(&mut self, viewport: Viewport) {
        let ground = viewport.ground_y();
        self.bursts.retain_mut(|e| {
            e.update(viewport);
            if e.y > ground {
                e.y = ground;
                e.vy *= BOUNCE;
            }
            e.is_alive()
        });
        self.enforce_cap();

        self.leaves.retain_mut(|e| {
            e.update(viewport);
            e.is_alive()
        });
    }

    fn enforce_cap(&mut self) {
        if self.bursts.len() > BURST_CAP {
            let excess = self.bursts.len() - BURST_CAP;
            self.bursts.drain(..excess);
        }
    }

    #[cfg(test)]
    pub fn bursts(&self) -> &[Entity] {
        &self.bursts
    }

    #[cfg(test)]
    pub fn leaves(&self) -> &[Entity] {
        &self.leaves
    }

    /// Every live entity, petals first
    #[cfg(test)]
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.leaves.iter().chain(self.bursts.iter())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.bursts.len() + self.leaves.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn sprite_cache(&self) -> &SpriteCache {
        &self.sprites
    }

    pub fn clear(&mut self) {
        self.bursts.clear();
        self.leaves.clear();
    }

    pub fn render_leaves(&self, canvas: &mut Canvas) {
        for leaf in &self.leaves {
            leaf.render(canvas);
        }
    }

    pub fn render_bursts(&self, canvas: &mut Canvas) {
        for burst in &self.bursts {
            burst.render(canvas);
        }
    }
}

fn particle(look: Look, x: f32, y: f32, rng: &mut StdRng) -> Entity {
    let size = match look {
        Look::Glyph(_) => rng.gen_range(6.0..12.0),
        Look::Shape(_) => rng.gen_range(0.6..2.4),
    };
    Entity {
        x,
        y,
        vx: (rng.gen::<f32>() - 0.5) * 2.0 * PARTICLE_SPEED,
        vy: (rng.gen::<f32>() - 0.5) * 2.0 * PARTICLE_SPEED,
        life: 1.0,
        decay: rng.gen_range(0.01..0.03),
        kind: EntityKind::Particle {
            look,
            color: colors::random_decor(rng),
            size,
            rotation: rng.gen_range(0.0..360.0),
            spin: (rng.gen::<f32>() - 0.5) * 10.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, EntityManager, Look, Spawn, BURST_CAP, LEAF_CAP};
    use crate::config::Viewport;
    use crate::raster::{Canvas, Shape};
    use crate::tree::Canopy;
    use rand::prelude::*;

    fn setup() -> (EntityManager, StdRng, Viewport) {
        (EntityManager::default(), StdRng::seed_from_u64(42), Viewport::new(120, 80))
    }

    #[test]
    fn life_never_increases_and_dead_are_purged() {
        let (mut em, mut rng, vp) = setup();
        for i in 0..30 {
            em.spawn(Spawn::Shape(Shape::Star), 60.0, 20.0, &mut rng, vp);
            em.spawn(Spawn::Glyph('A'), 50.0 + i as f32, 20.0, &mut rng, vp);
            em.spawn(Spawn::Leaf, 60.0, 60.0, &mut rng, vp);
        }
        em.spawn(Spawn::Sprite("cat"), 60.0, 30.0, &mut rng, vp);

        for _ in 0..1500 {
            let before = em.len();
            em.tick(vp);
            assert!(em.entities().all(|e| e.life > 0.0 && e.life <= 1.0));
            assert!(em.len() <= before);
        }
        assert!(em.is_empty(), "everything should have decayed, {} left", em.len());
    }

    #[test]
    fn each_entity_life_is_non_increasing() {
        let (mut em, mut rng, vp) = setup();
        em.spawn(Spawn::Glyph('Z'), 10.0, 10.0, &mut rng, vp);
        let mut last = 1.0;
        while let Some(e) = em.bursts().first() {
            assert!(e.life <= last);
            last = e.life;
            em.tick(vp);
        }
        assert!(last > 0.0);
    }

    #[test]
    fn bursts_are_capped_to_most_recent() {
        let (mut em, mut rng, vp) = setup();
        for i in 0..(BURST_CAP + 25) {
            em.spawn(Spawn::Glyph('X'), i as f32, 10.0, &mut rng, vp);
            assert!(em.bursts().len() <= BURST_CAP);
        }
        em.tick(vp);
        assert!(em.bursts().len() <= BURST_CAP);
        // Oldest went first; the newest spawn is still the last entry
        let last = em.bursts().last().unwrap();
        assert!((last.x - (BURST_CAP + 24) as f32).abs() < 1.0);
    }

    #[test]
    fn unknown_sprite_is_skipped() {
        let (mut em, mut rng, vp) = setup();
        assert!(!em.spawn(Spawn::Sprite("dragon"), 0.0, 0.0, &mut rng, vp));
        assert!(em.is_empty());
    }

    #[test]
    fn sprites_pop_upwards_and_share_cache() {
        let (mut em, mut rng, vp) = setup();
        assert!(em.spawn(Spawn::Sprite("moon"), 60.0, 40.0, &mut rng, vp));
        let e = &em.bursts()[0];
        assert!(e.vy < 0.0);
        assert!(matches!(&e.kind, EntityKind::PixelSprite { image } if image.coverage() > 0));
        assert_eq!(em.sprite_cache().len(), 1);
    }

    #[test]
    fn bursts_bounce_on_ground() {
        let (mut em, mut rng, vp) = setup();
        em.spawn(Spawn::Shape(Shape::Circle), 60.0, vp.ground_y() - 0.1, &mut rng, vp);
        for _ in 0..20 {
            em.tick(vp);
            if let Some(e) = em.bursts().first() {
                assert!(e.y <= vp.ground_y());
            }
        }
    }

    #[test]
    fn glyph_shrinks_slower_than_shape() {
        let (mut em, mut rng, vp) = setup();
        em.spawn(Spawn::Glyph('Q'), 60.0, 10.0, &mut rng, vp);
        em.spawn(Spawn::Shape(Shape::Square), 60.0, 10.0, &mut rng, vp);
        let sizes = |em: &EntityManager| -> Vec<f32> {
            em.bursts()
                .iter()
                .map(|e| match e.kind {
                    EntityKind::Particle { size, .. } => size,
                    _ => 0.0,
                })
                .collect()
        };
        let before = sizes(&em);
        em.tick(vp);
        let after = sizes(&em);
        assert!((after[0] / before[0] - 0.99).abs() < 1e-4);
        assert!((after[1] / before[1] - 0.95).abs() < 1e-4);
        assert!(matches!(
            em.bursts()[0].kind,
            EntityKind::Particle { look: Look::Glyph('Q'), .. }
        ));
    }

    #[test]
    fn leaves_respect_cap_and_fade_near_ground() {
        let (mut em, mut rng, vp) = setup();
        let canopy = Canopy::for_viewport(vp);
        for _ in 0..5000 {
            em.shed_leaves(&canopy, &mut rng, vp);
            assert!(em.leaves().len() <= LEAF_CAP);
        }
        assert_eq!(em.leaves().len(), LEAF_CAP);
        // Above the fade line nothing decays
        em.tick(vp);
        assert!(em.leaves().iter().all(|l| l.y > vp.ground_y() || l.life == 1.0));
    }

    #[test]
    fn rendering_uses_life_as_alpha() {
        let (mut em, mut rng, vp) = setup();
        em.spawn(Spawn::Sprite("apple"), 60.0, 40.0, &mut rng, vp);
        let mut canvas = Canvas::new(120, 80);
        em.render_bursts(&mut canvas);
        assert!(canvas.coverage() > 0);
    }
}
