//! The robot vacuum that hunts down the wanderer.

use super::{creature_scale, draw_grid, Facing, Pose, Wanderer};
use crate::colors::{self, POOF};
use crate::config::Viewport;
use crate::raster::{hex, Canvas, Rgb};
use crate::sprites::PixelGrid;
use rand::prelude::*;
use tracing::{debug, info};

const SPEED: f32 = 0.25;
/// Horizontal gap at which the target counts as caught
const CATCH_DISTANCE: f32 = 2.0;
/// Chase budget in ticks before giving up
pub const CHASE_TIMEOUT: u32 = 900;
const EATING_TICKS: u32 = 90;
const POOF_COUNT: usize = 20;
const LED: u8 = 3;
const LED_FED: Rgb = hex(0xFF0000);

static ROOMBA: PixelGrid = PixelGrid {
    rows: &[
        "0000022222200000",
        "0002211111122000",
        "0021111311111200",
        "0411111111111140",
        "0411111111111140",
        "0021111111111200",
        "0002211111122000",
        "0000022222200000",
    ],
    colors: &[
        (1, hex(0x2A2A2A)),
        (2, hex(0x555555)),
        (3, hex(0x00FF00)),
        (4, hex(0x111111)),
    ],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanerState {
    Chasing,
    Eating,
    Leaving,
}

/// Dust thrown up when the wanderer is caught
#[derive(Clone, Debug)]
struct Poof {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    size: f32,
    life: f32,
    color: Rgb,
}

#[derive(Clone, Debug)]
pub struct Cleaner {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: CleanerState,
    pub state_timer: u32,
    done: bool,
    fed: bool,
    poof: Vec<Poof>,
    scale: u32,
}

impl Cleaner {
    /// Roll in from the side away from the wanderer, or from the left when
    /// there is nobody to chase
    pub fn enter(viewport: Viewport, wanderer: Option<&Wanderer>) -> Self {
        let scale = creature_scale(viewport);
        let width = (ROOMBA.width() as u32 * scale) as f32;
        let (x, facing) = match wanderer {
            Some(w) if w.x <= viewport.width / 2.0 => (viewport.width + width, Facing::Left),
            _ => (-width, Facing::Right),
        };
        info!(x, "cleaner enters");
        Self {
            x,
            y: viewport.ground_y() - 5.0 * scale as f32,
            facing,
            state: CleanerState::Chasing,
            state_timer: 0,
            done: false,
            fed: false,
            poof: Vec::with_capacity(POOF_COUNT),
            scale,
        }
    }

    pub fn width(&self) -> f32 {
        (ROOMBA.width() as u32 * self.scale) as f32
    }

    /// Fully off screen after leaving
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[cfg(test)]
    pub fn poof_count(&self) -> usize {
        self.poof.len()
    }

    fn set_state(&mut self, state: CleanerState) {
        debug!(from = ?self.state, to = ?state, timer = self.state_timer, "cleaner");
        self.state = state;
        self.state_timer = 0;
    }

    /// Advance one tick against the current target. Returns true on the
    /// tick the target is caught; the caller then removes it.
    pub fn update(&mut self, viewport: Viewport, target: Option<&Wanderer>, rng: &mut StdRng) -> bool {
        self.state_timer += 1;
        let mut caught = false;

        match self.state {
            CleanerState::Chasing => match target {
                Some(wanderer) => {
                    if (self.x - wanderer.x).abs() > CATCH_DISTANCE {
                        self.facing = Facing::towards(self.x, wanderer.x);
                        self.x += SPEED * self.scale as f32 * self.facing.sign();
                        if self.state_timer > CHASE_TIMEOUT {
                            self.set_state(CleanerState::Leaving);
                        }
                    } else {
                        caught = true;
                        let (cx, cy) = wanderer.center();
                        self.burst(cx, cy, rng);
                        info!(x = cx, "cleaner caught the wanderer");
                        self.set_state(CleanerState::Eating);
                    }
                }
                None => self.set_state(CleanerState::Leaving),
            },
            CleanerState::Eating => {
                self.x += (self.state_timer as f32 * 0.5).sin() * 0.3 * self.scale as f32;
                if self.state_timer > EATING_TICKS {
                    self.fed = true;
                    self.set_state(CleanerState::Leaving);
                }
            }
            CleanerState::Leaving => {
                self.x += SPEED * 2.0 * self.scale as f32 * self.facing.sign();
                let w = self.width();
                if self.x > viewport.width + w || self.x < -w * 2.0 {
                    if !self.done {
                        info!("cleaner left");
                    }
                    self.done = true;
                }
            }
        }

        self.poof.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += 0.012;
            p.life -= 0.025;
            p.size *= 0.97;
            p.life > 0.0
        });

        caught
    }

    fn burst(&mut self, x: f32, y: f32, rng: &mut StdRng) {
        for _ in 0..POOF_COUNT {
            self.poof.push(Poof {
                x,
                y,
                vx: (rng.gen::<f32>() - 0.5),
                vy: (rng.gen::<f32>() - 0.5),
                size: rng.gen_range(0.6..1.8),
                life: 1.0,
                color: colors::pick(rng, &POOF),
            });
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let pose = Pose {
            x: self.x,
            y: self.y,
            scale: self.scale,
            facing: self.facing,
        };
        let led = self.fed.then_some((LED, LED_FED));
        draw_grid(canvas, &ROOMBA, pose, None, led);

        for p in &self.poof {
            canvas.fill_ellipse(p.x, p.y, p.size, p.size, p.color, p.life);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cleaner, CleanerState, CHASE_TIMEOUT};
    use crate::config::Viewport;
    use crate::creatures::wanderer::WandererState;
    use crate::creatures::{Facing, Wanderer};
    use rand::prelude::*;

    fn parked_dog(vp: Viewport, x: f32, rng: &mut StdRng) -> Wanderer {
        let mut dog = Wanderer::spawn(vp, rng);
        dog.x = x;
        dog.state = WandererState::Idle { duration: u32::MAX };
        dog
    }

    #[test]
    fn enters_opposite_the_wanderer() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(1);
        let left_dog = parked_dog(vp, 20.0, &mut rng);
        let right_dog = parked_dog(vp, 100.0, &mut rng);

        let c = Cleaner::enter(vp, Some(&left_dog));
        assert!(c.x > vp.width);
        assert_eq!(c.facing, Facing::Left);

        let c = Cleaner::enter(vp, Some(&right_dog));
        assert!(c.x < 0.0);
        assert_eq!(c.facing, Facing::Right);

        let c = Cleaner::enter(vp, None);
        assert!(c.x < 0.0);
    }

    #[test]
    fn catches_eats_and_leaves() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(1);
        let dog = parked_dog(vp, 30.0, &mut rng);
        let mut c = Cleaner::enter(vp, Some(&dog));

        let mut catches = 0;
        let mut ticks = 0;
        while c.state == CleanerState::Chasing {
            if c.update(vp, Some(&dog), &mut rng) {
                catches += 1;
            }
            ticks += 1;
            assert!(ticks < CHASE_TIMEOUT);
        }
        assert_eq!(catches, 1);
        assert_eq!(c.state, CleanerState::Eating);
        assert_eq!(c.poof_count(), 20);

        // The target is gone from here on
        while !c.is_done() {
            assert!(!c.update(vp, None, &mut rng));
            ticks += 1;
            assert!(ticks < 5000);
        }
        assert_eq!(c.state, CleanerState::Leaving);
    }

    #[test]
    fn leaves_at_once_without_a_target() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(1);
        let mut c = Cleaner::enter(vp, None);
        c.update(vp, None, &mut rng);
        assert_eq!(c.state, CleanerState::Leaving);
    }

    #[test]
    fn gives_up_after_chase_timeout() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(1);
        let mut dog = parked_dog(vp, 60.0, &mut rng);
        let mut c = Cleaner::enter(vp, Some(&dog));
        for _ in 0..=CHASE_TIMEOUT {
            // Keep the target just out of reach
            dog.x = c.x + 10.0;
            assert!(!c.update(vp, Some(&dog), &mut rng));
        }
        assert_eq!(c.state, CleanerState::Leaving);
    }
}
