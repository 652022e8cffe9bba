//! The doctor who drops by for a while after a MAMA celebration.

use super::{creature_scale, draw_grid, Facing, LegSwing, Pose};
use crate::config::Viewport;
use crate::raster::{hex, Canvas};
use crate::sprites::PixelGrid;
use rand::prelude::*;
use tracing::debug;

/// Ticks the visitor stays (about thirty seconds at 60 Hz)
pub const VISITOR_LIFETIME: u32 = 1800;
const WALK_SPEED: f32 = 0.07;

static DOCTOR: PixelGrid = PixelGrid {
    rows: &[
        "0000001111000000",
        "0000011111100000",
        "0000111111110000",
        "0000111111110000",
        "0000122222210000",
        "0000923223290000",
        "0000922222290000",
        "0000922442290000",
        "0000902222090000",
        "0000902222090000",
        "0000955555590000",
        "0009555555559000",
        "0009556555559000",
        "0009556555559000",
        "0000556655550000",
        "0000555555550000",
        "0000555555550000",
        "0000055555500000",
        "0000077777700000",
        "0000077777700000",
        "0000077007700000",
        "0000077007700000",
        "0000022002200000",
        "0000088008800000",
        "0000888008880000",
    ],
    colors: &[
        (1, hex(0x3D1F0A)),
        (2, hex(0xDEB887)),
        (3, hex(0x2C1810)),
        (4, hex(0xCC5555)),
        (5, hex(0x1A8FC4)),
        (6, hex(0x333333)),
        (7, hex(0x157AA0)),
        (8, hex(0xFFFFFF)),
        (9, hex(0x3D1F0A)),
    ],
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisitorState {
    Walking,
    Idle { duration: u32 },
}

#[derive(Clone, Debug)]
pub struct Visitor {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: VisitorState,
    pub state_timer: u32,
    /// Ticks since arrival or the last refresh
    pub age: u32,
    leg_timer: u32,
    leg_frame: u8,
    scale: u32,
}

impl Visitor {
    /// Arrive from just off one side, facing inwards
    pub fn spawn(viewport: Viewport, rng: &mut StdRng) -> Self {
        let scale = creature_scale(viewport);
        let width = (DOCTOR.width() as u32 * scale) as f32;
        let (x, facing) = if rng.gen_bool(0.5) {
            (-width, Facing::Right)
        } else {
            (viewport.width + width, Facing::Left)
        };
        Self {
            x,
            y: viewport.ground_y() - 23.0 * scale as f32,
            facing,
            state: VisitorState::Walking,
            state_timer: 0,
            age: 0,
            leg_timer: 0,
            leg_frame: 0,
            scale,
        }
    }

    pub fn width(&self) -> f32 {
        (DOCTOR.width() as u32 * self.scale) as f32
    }

    /// Restart the stay without moving the visitor
    pub fn refresh(&mut self) {
        self.age = 0;
    }

    pub fn expired(&self) -> bool {
        self.age > VISITOR_LIFETIME
    }

    pub fn update(&mut self, viewport: Viewport, rng: &mut StdRng) {
        self.age += 1;
        self.state_timer += 1;

        match self.state {
            VisitorState::Walking => {
                self.leg_timer += 1;
                self.leg_frame = ((self.leg_timer / 12) % 2) as u8;
                self.x += WALK_SPEED * self.scale as f32 * self.facing.sign();

                let w = self.width();
                if self.x > viewport.width - w * 0.7 {
                    self.facing = Facing::Left;
                } else if self.x < w * 0.27 {
                    self.facing = Facing::Right;
                }

                if self.state_timer > 150 && rng.gen_bool(0.006) {
                    let duration = rng.gen_range(80..200);
                    debug!(duration, "visitor idles");
                    self.state = VisitorState::Idle { duration };
                    self.state_timer = 0;
                }
            }
            VisitorState::Idle { duration } => {
                self.leg_frame = 0;
                if self.state_timer > duration {
                    if rng.gen_bool(0.5) {
                        self.facing = self.facing.flipped();
                    }
                    debug!("visitor walks");
                    self.state = VisitorState::Walking;
                    self.state_timer = 0;
                }
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let pose = Pose {
            x: self.x,
            y: self.y,
            scale: self.scale,
            facing: self.facing,
        };
        let legs = (self.state == VisitorState::Walking).then(|| LegSwing {
            rows: 20..=24,
            split: 8,
            offset: self.leg_frame as i32 * self.scale as i32,
        });
        draw_grid(canvas, &DOCTOR, pose, legs.as_ref(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::{Visitor, VisitorState, VISITOR_LIFETIME};
    use crate::config::Viewport;
    use crate::creatures::Facing;
    use rand::prelude::*;

    #[test]
    fn enters_from_a_side_facing_inwards() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let v = Visitor::spawn(vp, &mut rng);
            match v.facing {
                Facing::Right => assert!(v.x < 0.0),
                Facing::Left => assert!(v.x > vp.width),
            }
        }
    }

    #[test]
    fn expires_after_lifetime_unless_refreshed() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(2);
        let mut v = Visitor::spawn(vp, &mut rng);
        for _ in 0..VISITOR_LIFETIME {
            v.update(vp, &mut rng);
        }
        assert!(!v.expired());
        v.refresh();
        for _ in 0..VISITOR_LIFETIME {
            v.update(vp, &mut rng);
        }
        assert!(!v.expired());
        v.update(vp, &mut rng);
        assert!(v.expired());
    }

    #[test]
    fn walks_onto_the_screen() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(4);
        let mut v = Visitor::spawn(vp, &mut rng);
        v.state = VisitorState::Walking;
        for _ in 0..1500 {
            v.update(vp, &mut rng);
        }
        assert!(v.x > -v.width() && v.x < vp.width);
    }
}
