use crate::raster::Canvas;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, Clear, ClearType,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
    /// Key releases and repeats are reported separately from presses
    event_types: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        let mut term = Self::with_size(width, height, alternate_screen);
        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            if supports_keyboard_enhancement().unwrap_or(false) {
                execute!(
                    stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
                term.event_types = true;
            }
        }

        Ok(term)
    }

    /// Off-screen buffer of a fixed size (print mode, tests)
    pub fn headless(width: u16, height: u16) -> Self {
        Self::with_size(width, height, false)
    }

    fn with_size(width: u16, height: u16, alternate_screen: bool) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen,
            event_types: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Canvas size that fills the terminal, two pixels per cell vertically
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize * 2)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        self.set_cell(x, y, Cell { ch, fg, bg: None, bold });
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = cell;
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Write text over the scene, keeping each cell's background
    pub fn overlay_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i as i32;
            if cx < 0 || cx >= self.width as i32 || y < 0 || y >= self.height as i32 {
                continue;
            }
            let bg = {
                let old = &self.buffer[y as usize][cx as usize];
                old.bg.or(old.fg.filter(|_| old.ch == '▀'))
            };
            self.set_cell(cx, y, Cell { ch, fg, bg, bold });
        }
    }

    /// Composite a pixel canvas with upper half blocks: foreground is the
    /// top pixel, background the bottom one
    pub fn present_canvas(&mut self, canvas: &Canvas) {
        for cy in 0..self.height as i32 {
            for cx in 0..self.width as i32 {
                let top = canvas.get(cx, cy * 2);
                let bottom = canvas.get(cx, cy * 2 + 1);
                let cell = match (top, bottom) {
                    (None, None) => Cell::default(),
                    (Some(t), None) => Cell {
                        ch: '▀',
                        fg: Some(t.into()),
                        bg: None,
                        bold: false,
                    },
                    (None, Some(b)) => Cell {
                        ch: '▄',
                        fg: Some(b.into()),
                        bg: None,
                        bold: false,
                    },
                    (Some(t), Some(b)) => Cell {
                        ch: '▀',
                        fg: Some(t.into()),
                        bg: Some(b.into()),
                        bold: false,
                    },
                };
                self.set_cell(cx, cy, cell);
            }
        }
    }

    /// Render the entire buffer to screen
    pub fn render(&self) -> io::Result<()> {
        let mut out = stdout().lock();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            let mut fg = None;
            let mut bg = None;

            for cell in row {
                if cell.fg != fg {
                    queue!(out, SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    fg = cell.fg;
                }
                if cell.bg != bg {
                    queue!(out, SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    bg = cell.bg;
                }
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold), Print(cell.ch), SetAttribute(Attribute::NormalIntensity))?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }
            }
            queue!(out, ResetColor)?;
        }

        out.flush()?;
        Ok(())
    }

    /// Next terminal event, waiting at most `timeout`
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if poll(timeout)? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        for row in &self.buffer {
            for cell in row {
                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
                }
                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.event_types {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        if self.alternate_screen {
            let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Mouse reporting for as long as the guard lives
pub struct MouseCapture;

impl MouseCapture {
    pub fn enable() -> io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}
