//! Roaming creatures
//!
//! Each creature is its own module with a `spawn()`/`update()`/`render()`
//! trio. The wanderer is kept in a [`WandererSlot`] so the cleaner can
//! remove it and the frame driver can bring it back later.

pub mod cleaner;
pub mod visitor;
pub mod wanderer;

pub use cleaner::Cleaner;
pub use visitor::Visitor;
pub use wanderer::Wanderer;

use crate::config::Viewport;
use crate::raster::{Canvas, Rgb};
use crate::sprites::PixelGrid;
use rand::prelude::*;
use std::ops::RangeInclusive;
use tracing::info;

/// Ticks without an active cleaner before an eaten wanderer comes back
pub const RESPAWN_TICKS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn random(rng: &mut StdRng) -> Self {
        if rng.gen_bool(0.5) {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    /// Face from `from` towards `to`
    pub fn towards(from: f32, to: f32) -> Self {
        if to > from {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Block size of creature sprites for a viewport
pub fn creature_scale(viewport: Viewport) -> u32 {
    if viewport.height >= 120.0 {
        2
    } else {
        1
    }
}

/// Where and how a creature grid lands on the canvas
#[derive(Clone, Copy, Debug)]
pub(crate) struct Pose {
    pub x: f32,
    pub y: f32,
    pub scale: u32,
    pub facing: Facing,
}

/// Walking animation: rows in `rows` left of `split` drop by `offset`
/// pixels, the rest lift by the same amount
pub(crate) struct LegSwing {
    pub rows: RangeInclusive<usize>,
    pub split: usize,
    pub offset: i32,
}

/// Draw a right-facing grid, mirrored within its own box when facing left.
/// `recolor` overrides one palette index.
pub(crate) fn draw_grid(
    canvas: &mut Canvas,
    grid: &PixelGrid,
    pose: Pose,
    legs: Option<&LegSwing>,
    recolor: Option<(u8, Rgb)>,
) {
    let s = pose.scale.max(1) as usize;
    let width = grid.width();
    let (ox, oy) = (pose.x.round() as i32, pose.y.round() as i32);
    for (col, row, index) in grid.cells() {
        let color = match recolor {
            Some((i, c)) if i == index => c,
            _ => grid.color(index).unwrap_or(Rgb::WHITE),
        };
        let dy = match legs {
            Some(swing) if swing.rows.contains(&row) => {
                if col < swing.split {
                    swing.offset
                } else {
                    -swing.offset
                }
            }
            _ => 0,
        };
        let draw_col = match pose.facing {
            Facing::Right => col,
            Facing::Left => width - 1 - col,
        };
        let px = ox + (draw_col * s) as i32;
        let py = oy + (row * s) as i32 + dy;
        for by in 0..s as i32 {
            for bx in 0..s as i32 {
                canvas.put(px + bx, py + by, color);
            }
        }
    }
}

/// The wanderer's place in the scene
#[derive(Debug, Default)]
pub enum WandererSlot {
    /// Nothing spawned yet
    #[default]
    Empty,
    Present(Wanderer),
    /// Eaten; counts cleaner-free ticks until a fresh one appears
    Removed { ticks: u32 },
}

impl WandererSlot {
    /// The wanderer, if it is targetable
    pub fn get(&self) -> Option<&Wanderer> {
        match self {
            WandererSlot::Present(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, WandererSlot::Removed { .. })
    }

    /// Mark the wanderer eaten and start the respawn countdown
    pub fn remove(&mut self) {
        *self = WandererSlot::Removed { ticks: 0 };
    }

    /// Drop any wanderer without a countdown; the next update spawns afresh
    pub fn reset(&mut self) {
        *self = WandererSlot::Empty;
    }

    /// Advance one tick: spawn if empty, count down while removed, or let
    /// the wanderer roam
    pub fn update(&mut self, viewport: Viewport, trunk_x: f32, cleaner_active: bool, rng: &mut StdRng) {
        match self {
            WandererSlot::Empty => {
                *self = WandererSlot::Present(Wanderer::spawn(viewport, rng));
            }
            WandererSlot::Present(wanderer) => wanderer.update(viewport, trunk_x, rng),
            WandererSlot::Removed { ticks } => {
                if cleaner_active {
                    return;
                }
                *ticks += 1;
                if *ticks > RESPAWN_TICKS {
                    info!("wanderer respawned");
                    *self = WandererSlot::Present(Wanderer::spawn(viewport, rng));
                }
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        if let WandererSlot::Present(wanderer) = self {
            wanderer.render(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{draw_grid, Facing, Pose, WandererSlot, RESPAWN_TICKS};
    use crate::config::Viewport;
    use crate::raster::{hex, Canvas};
    use crate::sprites::PixelGrid;
    use rand::prelude::*;

    static ARROW: PixelGrid = PixelGrid {
        rows: &["110", "010"],
        colors: &[(1, hex(0xFF0000))],
    };

    #[test]
    fn facing_left_mirrors_within_box() {
        let mut right = Canvas::new(3, 2);
        let mut left = Canvas::new(3, 2);
        let pose = Pose { x: 0.0, y: 0.0, scale: 1, facing: Facing::Right };
        draw_grid(&mut right, &ARROW, pose, None, None);
        draw_grid(&mut left, &ARROW, Pose { facing: Facing::Left, ..pose }, None, None);
        assert!(right.get(0, 0).is_some() && right.get(2, 0).is_none());
        assert!(left.get(2, 0).is_some() && left.get(0, 0).is_none());
    }

    #[test]
    fn recolor_overrides_one_index() {
        let mut canvas = Canvas::new(3, 2);
        let pose = Pose { x: 0.0, y: 0.0, scale: 1, facing: Facing::Right };
        draw_grid(&mut canvas, &ARROW, pose, None, Some((1, hex(0x00FF00))));
        assert_eq!(canvas.get(1, 1), Some(hex(0x00FF00)));
    }

    #[test]
    fn respawn_waits_for_countdown_without_cleaner() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(1);
        let mut slot = WandererSlot::default();
        slot.update(vp, 60.0, false, &mut rng);
        assert!(slot.get().is_some());

        slot.remove();
        // A cleaner on screen freezes the countdown
        for _ in 0..1000 {
            slot.update(vp, 60.0, true, &mut rng);
        }
        assert!(slot.is_removed());

        for _ in 0..RESPAWN_TICKS {
            slot.update(vp, 60.0, false, &mut rng);
            assert!(slot.get().is_none());
        }
        slot.update(vp, 60.0, false, &mut rng);
        assert!(slot.get().is_some());
    }

    #[test]
    fn facing_helpers() {
        assert_eq!(Facing::towards(10.0, 20.0), Facing::Right);
        assert_eq!(Facing::towards(20.0, 10.0), Facing::Left);
        assert_eq!(Facing::Left.flipped().sign(), 1.0);
    }
}
