//! Everything the frame driver advances and draws, in one place.
//!
//! Input handlers and the tick both go through `&mut SceneState`, so there
//! is a single writer for every collection and nothing needs locking.

use crate::audio::{Audio, Effect};
use crate::background::{render_background, Clouds};
use crate::celebration::{flyup_color, CelebrationKind, Celebrations, Flyups};
use crate::config::{SceneConfig, Viewport};
use crate::creatures::{Cleaner, Visitor, WandererSlot};
use crate::entities::{EntityManager, Spawn, BURST_SHAPES};
use crate::input::{GestureTracker, InputEvent};
use crate::raster::Canvas;
use crate::sequence::{gesture_trigger, Gesture, SequenceDetector};
use crate::sprites;
use crate::tree::TreeCache;
use rand::prelude::*;
use tracing::{debug, info};

const KEY_SPRITE_CHANCE: f64 = 0.25;
const POINTER_SPRITE_CHANCE: f64 = 0.35;
const SHAPES_PER_BURST: usize = 5;

pub struct SceneState {
    viewport: Viewport,
    trees: TreeCache,
    background: Option<Canvas>,
    background_seed: u64,
    clouds: Clouds,
    entities: EntityManager,
    wanderer: WandererSlot,
    cleaner: Option<Cleaner>,
    visitor: Option<Visitor>,
    sequences: SequenceDetector,
    gestures: GestureTracker,
    celebrations: Celebrations,
    flyups: Flyups,
    rng: StdRng,
    audio: Box<dyn Audio>,
    now_ms: u64,
}

impl SceneState {
    pub fn new(viewport: Viewport, config: &SceneConfig, mut rng: StdRng, audio: Box<dyn Audio>) -> Self {
        let mut trees = TreeCache::default();
        trees.rebuild(viewport, &mut rng);
        Self {
            viewport,
            trees,
            background: None,
            background_seed: rng.gen(),
            clouds: Clouds::default(),
            entities: EntityManager::default(),
            wanderer: WandererSlot::default(),
            cleaner: None,
            visitor: None,
            sequences: SequenceDetector::default(),
            gestures: GestureTracker::new(config.gestures),
            celebrations: Celebrations::default(),
            flyups: Flyups::default(),
            rng,
            audio,
            now_ms: 0,
        }
    }

    pub fn gestures(&mut self) -> &mut GestureTracker {
        &mut self.gestures
    }

    pub fn handle_input(&mut self, event: InputEvent, now_ms: u64) {
        self.now_ms = now_ms;
        match event {
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::PointerDown { .. } | InputEvent::PointerDrag { .. } => self.pointer_burst(),
            InputEvent::Swipe { direction, .. } => {
                if let Some(kind) = gesture_trigger(Gesture::Swipe(direction)) {
                    self.trigger(kind);
                }
            }
            InputEvent::TripleTap => {
                if let Some(kind) = gesture_trigger(Gesture::TripleTap) {
                    self.trigger(kind);
                }
            }
        }
    }

    fn on_key(&mut self, key: char) {
        if key.is_control() {
            return;
        }
        let upper = key.to_ascii_uppercase();
        if let Some(color) = flyup_color(upper) {
            self.flyups.spawn(upper, color, self.viewport, &mut self.rng);
        }
        if matches!(upper, 'E' | 'M' | 'I') {
            self.audio.play_effect(Effect::Letter(upper));
        }
        for kind in self.sequences.feed(key) {
            self.trigger(kind);
        }

        let (x, y) = self.burst_origin();
        if self.rng.gen_bool(KEY_SPRITE_CHANCE) && self.spawn_sprite(x, y) {
            return;
        }
        self.entities.spawn(Spawn::Glyph(key), x, y, &mut self.rng, self.viewport);
        self.spawn_shapes(x, y);
        self.audio.play_effect(Effect::Chime);
    }

    /// Bursts always come out of the crown, wherever the pointer is
    fn burst_origin(&mut self) -> (f32, f32) {
        let canopy = self.trees.ensure(self.viewport, &mut self.rng).canopy;
        canopy.random_point(&mut self.rng, 0.85, 0.6)
    }

    fn pointer_burst(&mut self) {
        let (x, y) = self.burst_origin();
        if self.rng.gen_bool(POINTER_SPRITE_CHANCE) && self.spawn_sprite(x, y) {
            return;
        }
        let glyph = self.rng.gen_range(b'A'..=b'Z') as char;
        self.entities.spawn(Spawn::Glyph(glyph), x, y, &mut self.rng, self.viewport);
        self.spawn_shapes(x, y);
        self.audio.play_effect(Effect::Chime);
    }

    fn spawn_sprite(&mut self, x: f32, y: f32) -> bool {
        let Some(name) = sprites::spawnable().choose(&mut self.rng) else {
            return false;
        };
        let spawned = self.entities.spawn(Spawn::Sprite(name), x, y, &mut self.rng, self.viewport);
        if spawned {
            self.audio.play_effect(Effect::Creature);
        }
        spawned
    }

    fn spawn_shapes(&mut self, x: f32, y: f32) {
        let shape = BURST_SHAPES[self.rng.gen_range(0..BURST_SHAPES.len())];
        for _ in 0..SHAPES_PER_BURST {
            self.entities.spawn(Spawn::Shape(shape), x, y, &mut self.rng, self.viewport);
        }
    }

    /// Start a celebration along with its creature side effects
    pub fn trigger(&mut self, kind: CelebrationKind) {
        match kind {
            CelebrationKind::Roomba => {
                if self.cleaner.is_some() {
                    debug!("cleaner already active, ignoring");
                    return;
                }
                self.cleaner = Some(Cleaner::enter(self.viewport, self.wanderer.get()));
            }
            CelebrationKind::Mama => match &mut self.visitor {
                Some(visitor) => visitor.refresh(),
                None => {
                    info!("visitor arrives");
                    self.visitor = Some(Visitor::spawn(self.viewport, &mut self.rng));
                }
            },
            CelebrationKind::Emi => {}
        }
        self.audio.play_fanfare();
        self.celebrations.trigger(kind, self.now_ms, self.viewport, &mut self.rng);
    }

    /// Advance every subsystem by one frame
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        let vp = self.viewport;
        self.clouds.tick(vp);

        self.wanderer.update(vp, vp.trunk_x(), self.cleaner.is_some(), &mut self.rng);
        let mut cleaner_done = false;
        if let Some(cleaner) = &mut self.cleaner {
            if cleaner.update(vp, self.wanderer.get(), &mut self.rng) {
                info!("wanderer caught");
                self.wanderer.remove();
            }
            cleaner_done = cleaner.is_done();
        }
        if cleaner_done {
            info!("cleaner left");
            self.cleaner = None;
        }

        let canopy = self.trees.ensure(vp, &mut self.rng).canopy;
        self.entities.shed_leaves(&canopy, &mut self.rng, vp);
        self.entities.tick(vp);
        self.flyups.tick();
        self.celebrations.tick(now_ms);

        if let Some(visitor) = &mut self.visitor {
            visitor.update(vp, &mut self.rng);
            if visitor.expired() {
                info!("visitor leaves");
                self.visitor = None;
            }
        }
    }

    /// Compose the whole frame onto `canvas`
    pub fn render(&mut self, canvas: &mut Canvas) {
        let vp = self.viewport;
        canvas.clear();

        let background = self
            .background
            .get_or_insert_with(|| render_background(vp, self.background_seed));
        canvas.blit(background, 0, 0, 1.0, false);
        self.clouds.render(canvas, vp);
        canvas.blit(&self.trees.ensure(vp, &mut self.rng).raster, 0, 0, 1.0, false);

        self.wanderer.render(canvas);
        if let Some(cleaner) = &self.cleaner {
            cleaner.render(canvas);
        }
        if let Some(visitor) = &self.visitor {
            visitor.render(canvas);
        }

        self.entities.render_leaves(canvas);
        self.entities.render_bursts(canvas);
        self.flyups.render(canvas);
        self.celebrations.render(canvas, vp, self.now_ms);
    }

    /// New canvas size: rebuild the tree, drop cached layers and transient
    /// entities
    pub fn resize(&mut self, width: usize, height: usize) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        info!(width, height, "resize");
        self.viewport = viewport;
        self.trees.rebuild(viewport, &mut self.rng);
        self.background = None;
        self.entities.clear();
        self.flyups.clear();
        if !self.wanderer.is_removed() {
            self.wanderer.reset();
        }
    }
}

#[cfg(test)]
impl SceneState {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn wanderer(&self) -> &WandererSlot {
        &self.wanderer
    }

    pub fn cleaner(&self) -> Option<&Cleaner> {
        self.cleaner.as_ref()
    }

    pub fn visitor(&self) -> Option<&Visitor> {
        self.visitor.as_ref()
    }

    pub fn celebrations(&self) -> &Celebrations {
        &self.celebrations
    }

    pub fn flyups(&self) -> &Flyups {
        &self.flyups
    }

    pub fn tree_generation(&self) -> u64 {
        self.trees.generation()
    }
}
