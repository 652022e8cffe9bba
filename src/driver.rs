//! Frame driver: one tick per frame, input drained before each tick.

use crate::audio::{self, SilentAudio};
use crate::config::{SceneConfig, Viewport};
use crate::help::{render_help_overlay, HELP_TEXT};
use crate::input::translate;
use crate::raster::Canvas;
use crate::scene::SceneState;
use crate::terminal::{MouseCapture, Terminal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Color;
use rand::prelude::*;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Simulated milliseconds per tick in print mode
const PRINT_TICK_MS: u64 = 16;

/// What a key means to the driver rather than the scene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Quit,
    ToggleHelp,
    TogglePause,
}

/// Some terminals report `?` as shift + `/`
fn normalize_key(code: KeyCode, modifiers: KeyModifiers) -> KeyCode {
    match code {
        KeyCode::Char('/') if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::Char('?'),
        other => other,
    }
}

pub fn control(key: &KeyEvent) -> Option<Control> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match normalize_key(key.code, key.modifiers) {
        KeyCode::Esc => Some(Control::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Control::Quit),
        KeyCode::Char('?') => Some(Control::ToggleHelp),
        KeyCode::Char(' ') => Some(Control::TogglePause),
        _ => None,
    }
}

/// Scene time in milliseconds; stands still while paused
#[derive(Debug)]
pub struct SceneClock {
    origin: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl SceneClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn toggle_pause(&mut self) {
        match self.paused_at.take() {
            Some(at) => self.paused_total += at.elapsed(),
            None => self.paused_at = Some(Instant::now()),
        }
    }

    pub fn now_ms(&self) -> u64 {
        let end = self.paused_at.unwrap_or_else(Instant::now);
        let running = end.duration_since(self.origin).saturating_sub(self.paused_total);
        running.as_millis() as u64
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Interactive scene until Esc or Ctrl+C
pub fn run(config: SceneConfig) -> io::Result<()> {
    let mut term = Terminal::new(true)?;
    let _mouse = MouseCapture::enable()?;

    let mut rng = seeded_rng(config.seed);
    let audio = audio::open(&config, &mut rng);
    let (w, h) = term.pixel_size();
    let mut scene = SceneState::new(Viewport::new(w, h), &config, rng, audio);
    let mut canvas = Canvas::new(w, h);

    let frame = Duration::from_secs_f32(config.frame_time());
    let mut clock = SceneClock::start();
    let mut show_help = false;
    info!(width = w, height = h, fps = config.fps, "scene started");

    loop {
        let frame_start = Instant::now();

        let (cols, rows) = crossterm::terminal::size().unwrap_or(term.size());
        if (cols, rows) != term.size() {
            term.resize(cols, rows);
            term.clear_screen()?;
            let (w, h) = term.pixel_size();
            scene.resize(w, h);
            canvas = Canvas::new(w, h);
        }

        while let Some(event) = term.poll_event(Duration::ZERO)? {
            if let Event::Key(key) = &event {
                match control(key) {
                    Some(Control::Quit) => {
                        info!("quit");
                        return Ok(());
                    }
                    Some(Control::ToggleHelp) => {
                        show_help = !show_help;
                        continue;
                    }
                    Some(Control::TogglePause) => {
                        clock.toggle_pause();
                        continue;
                    }
                    None => {}
                }
            }
            if clock.is_paused() {
                continue;
            }
            let now = clock.now_ms();
            if let Some(input) = translate(&event, scene.gestures(), now) {
                scene.handle_input(input, now);
            }
        }

        // Guard against zero-size terminal
        if cols == 0 || rows == 0 {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        if !clock.is_paused() {
            scene.tick(clock.now_ms());
        }
        scene.render(&mut canvas);
        term.present_canvas(&canvas);
        if clock.is_paused() {
            term.overlay_str(1, 0, "paused", Some(Color::White), true);
        }
        if show_help {
            render_help_overlay(&mut term, HELP_TEXT);
        }
        term.render()?;

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Settle the scene for `ticks` frames and draw it once
pub fn render_frame(width: u16, height: u16, seed: Option<u64>, ticks: u32) -> Terminal {
    let mut term = Terminal::headless(width, height);
    let (w, h) = term.pixel_size();
    let config = SceneConfig {
        seed,
        audio: false,
        ..SceneConfig::default()
    };
    let mut scene = SceneState::new(Viewport::new(w, h), &config, seeded_rng(seed), Box::new(SilentAudio));
    for t in 0..ticks as u64 {
        scene.tick(t * PRINT_TICK_MS);
    }
    let mut canvas = Canvas::new(w, h);
    scene.render(&mut canvas);
    term.present_canvas(&canvas);
    term
}

/// Print one settled frame to stdout
pub fn print(width: u16, height: u16, seed: Option<u64>, ticks: u32) -> io::Result<()> {
    render_frame(width, height, seed, ticks).print_to_stdout()
}

#[cfg(test)]
mod tests {
    use super::{control, render_frame, Control, SceneClock};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn driver_keys() {
        assert_eq!(control(&press(KeyCode::Esc, KeyModifiers::NONE)), Some(Control::Quit));
        assert_eq!(
            control(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Control::Quit)
        );
        assert_eq!(
            control(&press(KeyCode::Char('/'), KeyModifiers::SHIFT)),
            Some(Control::ToggleHelp)
        );
        assert_eq!(
            control(&press(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Control::TogglePause)
        );
        assert_eq!(control(&press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(control(&press(KeyCode::Char('/'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn releases_are_not_controls() {
        let mut key = press(KeyCode::Esc, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(control(&key), None);
    }

    #[test]
    fn paused_clock_stands_still() {
        let mut clock = SceneClock::start();
        clock.toggle_pause();
        let frozen = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(30));
        assert_eq!(clock.now_ms(), frozen);
        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert!(clock.now_ms() < frozen + 30);
    }

    #[test]
    fn print_frame_is_deterministic_and_full() {
        let a = render_frame(40, 20, Some(11), 30);
        let b = render_frame(40, 20, Some(11), 30);
        for y in 0..20 {
            for x in 0..40 {
                let cell = a.cell(x, y).unwrap();
                assert_eq!(cell, b.cell(x, y).unwrap());
                assert_eq!(cell.ch, '▀');
            }
        }
    }
}
