//! The spaniel: walks the lawn, naps, and now and then waters the tree.

use super::{creature_scale, draw_grid, Facing, LegSwing, Pose};
use crate::colors::GOLD;
use crate::config::Viewport;
use crate::raster::{hex, Canvas};
use crate::sprites::PixelGrid;
use rand::prelude::*;
use tracing::debug;

const WALK_SPEED: f32 = 0.085;
const APPROACH_SPEED: f32 = 0.13;
/// Cells from the trunk at which the approach ends
const TRUNK_REACH: f32 = 6.0;
const WALKING_AWAY_TICKS: u32 = 100;

const PALETTE: &[(u8, crate::raster::Rgb)] = &[
    (1, hex(0xFFFFFF)),
    (2, hex(0x663300)),
    (3, hex(0x000000)),
    (4, hex(0x663300)),
    (5, hex(0xFFFFFF)),
];

static WALKING: PixelGrid = PixelGrid {
    rows: &[
        "0000000000011100",
        "0000000000111100",
        "0000000002111120",
        "0000000002131120",
        "0000000000113100",
        "0000000000111100",
        "0440000001111000",
        "0042222211110000",
        "0002111111100000",
        "0001122112100000",
        "0001111111100000",
        "0001100001100000",
        "0001100001100000",
    ],
    colors: PALETTE,
};

static LEG_LIFTED: PixelGrid = PixelGrid {
    rows: &[
        "0000000000011100",
        "0000000000111100",
        "0000000002111120",
        "0000000002131120",
        "0000000000113100",
        "0000000000111100",
        "0440000001111000",
        "0042222211110000",
        "0002111111100000",
        "0001122112100000",
        "0001111111500000",
        "0001100000550000",
        "0001100000050000",
    ],
    colors: PALETTE,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WandererState {
    Walking,
    Idle { duration: u32 },
    ApproachingTree,
    Peeing { duration: u32 },
    WalkingAway,
}

#[derive(Clone, Debug)]
pub struct Wanderer {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: WandererState,
    pub state_timer: u32,
    leg_timer: u32,
    leg_frame: u8,
    stream: f32,
    scale: u32,
}

impl Wanderer {
    pub fn spawn(viewport: Viewport, rng: &mut StdRng) -> Self {
        let scale = creature_scale(viewport);
        Self {
            x: rng.gen::<f32>() * viewport.width * 0.3 + viewport.width * 0.1,
            y: viewport.ground_y() - 12.0 * scale as f32,
            facing: Facing::random(rng),
            state: WandererState::Walking,
            state_timer: 0,
            leg_timer: 0,
            leg_frame: 0,
            stream: 0.0,
            scale,
        }
    }

    pub fn width(&self) -> f32 {
        (WALKING.width() as u32 * self.scale) as f32
    }

    pub fn height(&self) -> f32 {
        (WALKING.height() as u32 * self.scale) as f32
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width() / 2.0, self.y + self.height() / 2.0)
    }

    fn set_state(&mut self, state: WandererState) {
        debug!(from = ?self.state, to = ?state, "wanderer");
        self.state = state;
        self.state_timer = 0;
    }

    fn step(&mut self, speed: f32, frame_ticks: u32) {
        self.leg_timer += 1;
        self.leg_frame = ((self.leg_timer / frame_ticks) % 2) as u8;
        self.x += speed * self.scale as f32 * self.facing.sign();
    }

    fn bounce(&mut self, viewport: Viewport) {
        let w = self.width();
        if self.x > viewport.width - w * 0.9 {
            self.facing = Facing::Left;
        } else if self.x < w * 0.45 {
            self.facing = Facing::Right;
        }
    }

    pub fn update(&mut self, viewport: Viewport, trunk_x: f32, rng: &mut StdRng) {
        self.state_timer += 1;

        match self.state {
            WandererState::Walking => {
                self.step(WALK_SPEED, 10);
                self.bounce(viewport);

                if self.state_timer > 120 && rng.gen_bool(0.005) {
                    let duration = rng.gen_range(60..180);
                    self.set_state(WandererState::Idle { duration });
                } else if self.state_timer > 300 && rng.gen_bool(0.002) {
                    self.facing = Facing::towards(self.x, trunk_x);
                    self.set_state(WandererState::ApproachingTree);
                }
            }
            WandererState::Idle { duration } => {
                self.leg_frame = 0;
                if self.state_timer > duration {
                    if rng.gen_bool(0.5) {
                        self.facing = self.facing.flipped();
                    }
                    self.set_state(WandererState::Walking);
                }
            }
            WandererState::ApproachingTree => {
                self.step(APPROACH_SPEED, 8);
                if (self.x - trunk_x).abs() < TRUNK_REACH * self.scale as f32 {
                    self.facing = Facing::towards(self.x, trunk_x);
                    self.stream = 0.0;
                    let duration = rng.gen_range(120..200);
                    self.set_state(WandererState::Peeing { duration });
                }
            }
            WandererState::Peeing { duration } => {
                self.leg_frame = 0;
                self.stream = (self.state_timer as f32 / 20.0).min(1.0);
                if self.state_timer > duration {
                    self.facing = Facing::random(rng);
                    self.set_state(WandererState::WalkingAway);
                }
            }
            WandererState::WalkingAway => {
                self.step(WALK_SPEED, 10);
                self.bounce(viewport);
                if self.state_timer > WALKING_AWAY_TICKS {
                    self.set_state(WandererState::Walking);
                }
            }
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self.state, WandererState::Idle { .. } | WandererState::Peeing { .. })
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let peeing = matches!(self.state, WandererState::Peeing { .. });
        let grid = if peeing { &LEG_LIFTED } else { &WALKING };
        let pose = Pose {
            x: self.x,
            y: self.y,
            scale: self.scale,
            facing: self.facing,
        };
        let legs = self.is_moving().then(|| LegSwing {
            rows: 11..=12,
            split: 6,
            offset: self.leg_frame as i32 * self.scale as i32,
        });
        draw_grid(canvas, grid, pose, legs.as_ref(), None);

        if peeing && self.stream > 0.0 {
            self.render_stream(canvas);
        }
    }

    fn render_stream(&self, canvas: &mut Canvas) {
        let s = self.scale as f32;
        let dir = self.facing.sign();
        let start_x = match self.facing {
            Facing::Right => self.x + 11.0 * s,
            Facing::Left => self.x + 5.0 * s,
        };
        let start_y = self.y + 10.0 * s;
        let len = (self.stream * 4.0 * s).ceil() as usize;

        for i in 0..len {
            let t = i as f32 / len as f32;
            let sx = start_x + i as f32 * dir;
            let sy = start_y - (t * std::f32::consts::PI).sin() * 1.2 * s + t * 1.7 * s;
            canvas.fill_rect(sx, sy, 1.0, 1.0, GOLD, 1.0);
        }
        if self.stream > 0.5 {
            let puddle_x = start_x + len as f32 * dir;
            canvas.fill_ellipse(puddle_x, start_y + 1.7 * s + 1.0, self.stream * 1.5 * s, 0.6, GOLD, 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Wanderer, WandererState};
    use crate::config::Viewport;
    use crate::creatures::Facing;
    use crate::raster::Canvas;
    use rand::prelude::*;

    #[test]
    fn stays_on_screen_while_walking() {
        let vp = Viewport::new(100, 60);
        let mut rng = StdRng::seed_from_u64(11);
        let mut dog = Wanderer::spawn(vp, &mut rng);
        for _ in 0..20_000 {
            dog.update(vp, 50.0, &mut rng);
            assert!(dog.x > -dog.width() && dog.x < vp.width + dog.width());
        }
    }

    #[test]
    fn approach_ends_at_trunk_and_returns_to_walking() {
        let vp = Viewport::new(100, 60);
        let mut rng = StdRng::seed_from_u64(5);
        let mut dog = Wanderer::spawn(vp, &mut rng);
        dog.x = 10.0;
        dog.facing = Facing::Right;
        dog.state = WandererState::ApproachingTree;

        let mut peed = false;
        for _ in 0..2000 {
            dog.update(vp, 50.0, &mut rng);
            if let WandererState::Peeing { .. } = dog.state {
                peed = true;
                assert!((dog.x - 50.0).abs() < 6.0 + 0.2);
            }
            if peed && dog.state == WandererState::Walking {
                return;
            }
        }
        panic!("never finished the approach; ended in {:?}", dog.state);
    }

    #[test]
    fn idle_freezes_position() {
        let vp = Viewport::new(100, 60);
        let mut rng = StdRng::seed_from_u64(3);
        let mut dog = Wanderer::spawn(vp, &mut rng);
        dog.state = WandererState::Idle { duration: 50 };
        let x = dog.x;
        for _ in 0..50 {
            dog.update(vp, 50.0, &mut rng);
        }
        assert_eq!(dog.x, x);
        dog.update(vp, 50.0, &mut rng);
        assert_eq!(dog.state, WandererState::Walking);
    }

    #[test]
    fn renders_on_the_grass() {
        let vp = Viewport::new(100, 60);
        let mut rng = StdRng::seed_from_u64(3);
        let dog = Wanderer::spawn(vp, &mut rng);
        let mut canvas = Canvas::new(100, 60);
        dog.render(&mut canvas);
        assert!(canvas.coverage() > 50);
        let feet = (dog.y + dog.height()) as i32 - 1;
        assert!(feet >= vp.ground_y() as i32);
    }
}
