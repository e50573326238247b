//! Terminal display and input handling

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fmt::Write as _;
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};

use crate::frame::Frame;
use crate::geometry::Color;
use crate::params::Slider;

/// Terminal display handler with buffered output
pub struct TerminalDisplay {
    width: u16,
    height: u16,
    last_resize_check: Instant,
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        // Enter alternate screen first to get accurate dimensions
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;

        Ok(Self {
            width,
            height: height.saturating_sub(1), // status line
            last_resize_check: Instant::now(),
            buffer: BufWriter::new(stdout),
        })
    }

    /// Character cells available for the image
    pub fn get_size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Pixel size of a frame that fills the screen. Every cell holds two
    /// vertical pixels.
    pub fn frame_size(&self) -> (usize, usize) {
        ((self.width as usize).max(1), (self.height as usize * 2).max(2))
    }

    /// Check if terminal has been resized
    pub fn check_resize(&mut self) -> bool {
        if self.last_resize_check.elapsed() < Duration::from_millis(100) {
            return false;
        }
        self.last_resize_check = Instant::now();

        if let Ok((new_width, new_height)) = terminal::size() {
            let new_height = new_height.saturating_sub(1);
            if new_width != self.width || new_height != self.height {
                self.width = new_width;
                self.height = new_height;
                return true;
            }
        }
        false
    }

    /// Draw pre-rendered ANSI content line by line, then the status line
    pub fn render(&mut self, content: &str, status: &str) -> io::Result<()> {
        // Hide cursor and disable line wrap while drawing
        write!(self.buffer, "\x1b[?25l\x1b[?7l")?;

        // Explicit positioning keeps an overlong line from shifting the rest
        for (i, line) in content.lines().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }
        write!(self.buffer, "\x1b[0m\x1b[J")?;

        let status_row = content.lines().count() + 1;
        write!(self.buffer, "\x1b[{};1H\x1b[K{}", status_row, status)?;

        write!(self.buffer, "\x1b[?25h\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Check for keyboard input
    pub fn poll_input(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Release {
                    return Ok(Some(key_event));
                }
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

/// Key actions for the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    /// Move a slider by the given number of steps
    Adjust(Slider, i32),
    Reset,
    ToggleLayout,
}

/// Parse keyboard input into actions.
///
/// Lowercase letters step a slider down, uppercase step it up. Arrow keys
/// rotate the satellites.
pub fn parse_key_event(event: KeyEvent) -> Action {
    let coarse = if event.modifiers.contains(KeyModifiers::CONTROL) { 10 } else { 1 };
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if coarse > 1 => Action::Quit,
        KeyCode::Char('p') => Action::Adjust(Slider::PixelSize, -coarse),
        KeyCode::Char('P') => Action::Adjust(Slider::PixelSize, coarse),
        KeyCode::Char('v') => Action::Adjust(Slider::VpDistance, -coarse),
        KeyCode::Char('V') => Action::Adjust(Slider::VpDistance, coarse),
        KeyCode::Char('d') => Action::Adjust(Slider::SphereDistance, -coarse),
        KeyCode::Char('D') => Action::Adjust(Slider::SphereDistance, coarse),
        KeyCode::Char('s') => Action::Adjust(Slider::SphereRadius, -coarse),
        KeyCode::Char('S') => Action::Adjust(Slider::SphereRadius, coarse),
        KeyCode::Char('f') => Action::Adjust(Slider::Fog, -coarse),
        KeyCode::Char('F') => Action::Adjust(Slider::Fog, coarse),
        KeyCode::Left => Action::Adjust(Slider::Rotation, -coarse),
        KeyCode::Right => Action::Adjust(Slider::Rotation, coarse),
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('l') => Action::ToggleLayout,
        _ => Action::None,
    }
}

/// Convert a frame to truecolor half-block text, two pixel rows per line.
///
/// `▀` shows the upper pixel as foreground and the lower one as background.
/// An odd last row gets a black lower half.
pub fn frame_to_halfblock(frame: &Frame) -> String {
    let width = frame.width();
    let output_height = (frame.height() + 1) / 2;
    let mut result = String::with_capacity(width * output_height * 20);

    // Only emit escape codes when a color actually changes
    let mut last_fg: Option<Color> = None;
    let mut last_bg: Option<Color> = None;

    for row in 0..output_height {
        for x in 0..width {
            let top = frame.pixel(x, row * 2).unwrap_or(Color::BLACK);
            let bottom = frame.pixel(x, row * 2 + 1).unwrap_or(Color::BLACK);

            if last_fg != Some(top) {
                let _ = write!(result, "\x1b[38;2;{};{};{}m", top.r, top.g, top.b);
                last_fg = Some(top);
            }
            if last_bg != Some(bottom) {
                let _ = write!(result, "\x1b[48;2;{};{};{}m", bottom.r, bottom.g, bottom.b);
                last_bg = Some(bottom);
            }
            result.push('\u{2580}');
        }
        if row + 1 == output_height {
            result.push_str("\x1b[0m");
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_parse_key_event_quit() {
        assert_eq!(parse_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(parse_key_event(key(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn test_parse_key_event_sliders() {
        assert_eq!(
            parse_key_event(key(KeyCode::Char('f'))),
            Action::Adjust(Slider::Fog, -1)
        );
        assert_eq!(
            parse_key_event(key(KeyCode::Char('S'))),
            Action::Adjust(Slider::SphereRadius, 1)
        );
        assert_eq!(
            parse_key_event(key(KeyCode::Right)),
            Action::Adjust(Slider::Rotation, 1)
        );
    }

    #[test]
    fn test_parse_key_event_control_is_coarse() {
        let event = KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(parse_key_event(event), Action::Adjust(Slider::Rotation, -10));
    }

    #[test]
    fn test_parse_key_event_misc() {
        assert_eq!(parse_key_event(key(KeyCode::Char('r'))), Action::Reset);
        assert_eq!(parse_key_event(key(KeyCode::Char('l'))), Action::ToggleLayout);
        assert_eq!(parse_key_event(key(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_halfblock_pairs_rows() {
        // 1x2: red over blue
        let frame = Frame::from_rgb(1, 2, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let out = frame_to_halfblock(&frame);
        assert_eq!(out, "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}\x1b[0m\n");
    }

    #[test]
    fn test_halfblock_odd_height() {
        let frame = Frame::from_rgb(2, 3, vec![9; 18]).unwrap();
        let out = frame_to_halfblock(&frame);
        assert_eq!(out.lines().count(), 2);
        assert_eq!(out.matches('\u{2580}').count(), 4);
        assert!(out.contains("\x1b[48;2;0;0;0m"));
    }

    #[test]
    fn test_halfblock_reuses_colors() {
        let frame = Frame::from_rgb(3, 2, vec![0; 18]).unwrap();
        let out = frame_to_halfblock(&frame);
        assert_eq!(out.matches("\x1b[38;2;").count(), 1);
        assert_eq!(out.matches("\x1b[48;2;").count(), 1);
    }
}
