//! Normalised input events and the gesture recogniser that derives swipes
//! and triple taps from raw pointer traffic.

use crate::config::GestureConfig;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// What the scene reacts to. Coordinates are canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key(char),
    PointerDown { x: f32, y: f32 },
    PointerDrag { x: f32, y: f32 },
    Swipe {
        direction: SwipeDirection,
        distance: f32,
        duration_ms: u64,
    },
    TripleTap,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    x: f32,
    y: f32,
    at_ms: u64,
    moved: bool,
}

/// Turns pointer down / drag / up into spawn events and gestures
#[derive(Debug)]
pub struct GestureTracker {
    config: GestureConfig,
    press: Option<Press>,
    taps: u32,
    last_tap_ms: u64,
    last_drag_ms: Option<u64>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
            taps: 0,
            last_tap_ms: 0,
            last_drag_ms: None,
        }
    }

    #[cfg(test)]
    pub fn pending_taps(&self) -> u32 {
        self.taps
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, now_ms: u64) -> InputEvent {
        self.press = Some(Press {
            x,
            y,
            at_ms: now_ms,
            moved: false,
        });
        InputEvent::PointerDown { x, y }
    }

    /// Drags spawn at most once per throttle window
    pub fn pointer_drag(&mut self, x: f32, y: f32, now_ms: u64) -> Option<InputEvent> {
        if let Some(press) = &mut self.press {
            press.moved = true;
        }
        if let Some(last) = self.last_drag_ms {
            if now_ms.saturating_sub(last) < self.config.drag_throttle_ms {
                return None;
            }
        }
        self.last_drag_ms = Some(now_ms);
        Some(InputEvent::PointerDrag { x, y })
    }

    /// Classify the finished press as a swipe, a tap or nothing
    pub fn pointer_up(&mut self, x: f32, y: f32, now_ms: u64) -> Option<InputEvent> {
        let press = self.press.take()?;
        let (dx, dy) = (x - press.x, y - press.y);
        let (adx, ady) = (dx.abs(), dy.abs());
        let elapsed = now_ms.saturating_sub(press.at_ms);
        let threshold = self.config.swipe_distance;

        if elapsed < self.config.swipe_max_ms && (adx > threshold || ady > threshold) {
            self.taps = 0;
            // Exact diagonals have no direction
            let (direction, distance) = if ady > adx {
                (if dy > 0.0 { SwipeDirection::Down } else { SwipeDirection::Up }, ady)
            } else if adx > ady {
                (if dx > 0.0 { SwipeDirection::Right } else { SwipeDirection::Left }, adx)
            } else {
                return None;
            };
            return Some(InputEvent::Swipe {
                direction,
                distance,
                duration_ms: elapsed,
            });
        }

        let tolerance = self.config.tap_tolerance;
        if !press.moved || (adx < tolerance && ady < tolerance) {
            if self.taps > 0 && now_ms.saturating_sub(self.last_tap_ms) > self.config.tap_window_ms {
                self.taps = 0;
            }
            self.taps += 1;
            self.last_tap_ms = now_ms;
            if self.taps >= 3 {
                self.taps = 0;
                return Some(InputEvent::TripleTap);
            }
        } else {
            self.taps = 0;
        }
        None
    }
}

/// Map a terminal event onto the scene's events. Mouse cells become the
/// lower pixel of the half-block pair.
pub fn translate(event: &Event, tracker: &mut GestureTracker, now_ms: u64) -> Option<InputEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Some(InputEvent::Key(c)),
            _ => None,
        },
        Event::Mouse(mouse) => {
            let x = mouse.column as f32 + 0.5;
            let y = mouse.row as f32 * 2.0 + 1.0;
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(tracker.pointer_down(x, y, now_ms)),
                MouseEventKind::Drag(MouseButton::Left) => tracker.pointer_drag(x, y, now_ms),
                MouseEventKind::Up(MouseButton::Left) => tracker.pointer_up(x, y, now_ms),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{translate, GestureTracker, InputEvent, SwipeDirection};
    use crate::config::GestureConfig;
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };

    fn tracker() -> GestureTracker {
        GestureTracker::new(GestureConfig::default())
    }

    fn tap(t: &mut GestureTracker, at: u64) -> Option<InputEvent> {
        t.pointer_down(5.0, 5.0, at);
        t.pointer_up(5.0, 5.0, at + 40)
    }

    #[test]
    fn fast_long_moves_are_swipes() {
        let mut t = tracker();
        t.pointer_down(10.0, 5.0, 0);
        t.pointer_drag(10.0, 20.0, 100);
        assert_eq!(
            t.pointer_up(11.0, 30.0, 200),
            Some(InputEvent::Swipe {
                direction: SwipeDirection::Down,
                distance: 25.0,
                duration_ms: 200
            })
        );

        t.pointer_down(40.0, 5.0, 1_000);
        let swipe = t.pointer_up(10.0, 8.0, 1_300);
        assert!(matches!(swipe, Some(InputEvent::Swipe { direction: SwipeDirection::Left, .. })));

        // A tie between the axes is no gesture and forgets pending taps
        tap(&mut t, 2_000);
        assert_eq!(t.pending_taps(), 1);
        t.pointer_down(0.0, 0.0, 2_100);
        assert_eq!(t.pointer_up(20.0, 20.0, 2_200), None);
        assert_eq!(t.pending_taps(), 0);
    }

    #[test]
    fn slow_moves_are_not_swipes() {
        let mut t = tracker();
        t.pointer_down(10.0, 5.0, 0);
        t.pointer_drag(10.0, 30.0, 300);
        assert_eq!(t.pointer_up(10.0, 30.0, 700), None);
        assert_eq!(t.pending_taps(), 0);
    }

    #[test]
    fn three_quick_taps_make_a_triple_tap() {
        let mut t = tracker();
        assert_eq!(tap(&mut t, 0), None);
        assert_eq!(tap(&mut t, 300), None);
        assert_eq!(tap(&mut t, 600), Some(InputEvent::TripleTap));
        assert_eq!(t.pending_taps(), 0);
    }

    #[test]
    fn slow_taps_start_over() {
        let mut t = tracker();
        tap(&mut t, 0);
        tap(&mut t, 300);
        assert_eq!(tap(&mut t, 1_500), None);
        assert_eq!(t.pending_taps(), 1);
    }

    #[test]
    fn swipe_cancels_pending_taps() {
        let mut t = tracker();
        tap(&mut t, 0);
        tap(&mut t, 100);
        t.pointer_down(0.0, 0.0, 200);
        t.pointer_up(50.0, 0.0, 250);
        assert_eq!(t.pending_taps(), 0);
        assert_eq!(tap(&mut t, 300), None);
    }

    #[test]
    fn zero_duration_release_is_a_tap() {
        let mut t = tracker();
        t.pointer_down(3.0, 3.0, 10);
        assert_eq!(t.pointer_up(3.0, 3.0, 10), None);
        assert_eq!(t.pending_taps(), 1);
    }

    #[test]
    fn drags_are_throttled() {
        let mut t = tracker();
        t.pointer_down(0.0, 0.0, 0);
        assert!(t.pointer_drag(1.0, 0.0, 10).is_some());
        assert!(t.pointer_drag(2.0, 0.0, 50).is_none());
        assert!(t.pointer_drag(3.0, 0.0, 95).is_some());
    }

    #[test]
    fn translates_keys_and_mouse() {
        let mut t = tracker();
        let key = Event::Key(KeyEvent {
            code: KeyCode::Char('e'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert_eq!(translate(&key, &mut t, 0), Some(InputEvent::Key('e')));

        let release = Event::Key(KeyEvent {
            kind: KeyEventKind::Release,
            ..KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)
        });
        assert_eq!(translate(&release, &mut t, 0), None);

        let held = Event::Key(KeyEvent {
            kind: KeyEventKind::Repeat,
            ..KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)
        });
        assert_eq!(translate(&held, &mut t, 0), None);

        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            translate(&click, &mut t, 0),
            Some(InputEvent::PointerDown { x: 4.5, y: 7.0 })
        );
    }
}
