use crate::{Cell, SIZE};
use crate::services::{AudioService, Clip, Command, InputSource, Renderer, Sprite, Track};
use crate::snake::Direction;

use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};
use log::debug;

const SNAKE_BODY: [char; 2] = ['█', '█'];
const APPLE: [char; 2] = ['(', ')'];

/// Terminal columns per board cell, since characters are about twice as tall as wide.
const CELL_COLUMNS: i32 = 2;

/// Status lines kept below the border for text.
const TEXT_LINES: u16 = 2;

pub fn setup_terminal() -> Result<()> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, terminal::Clear(ClearType::All))
        .context("Failed to enter alternate screen")?;
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(stdout, cursor::Hide, cursor::DisableBlinking).context("Failed to hide cursor")?;
    Ok(())
}

pub fn restore_terminal() -> Result<()> {
    let mut stdout = stdout();
    terminal::disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

/// Runs `body` on the prepared terminal and always restores it afterwards.
pub fn with_terminal<T>(body: impl FnOnce() -> Result<T>) -> Result<T> {
    guarded(setup_terminal, restore_terminal, body)
}

// An error from `body` wins over one from `restore`
fn guarded<T>(setup: impl FnOnce() -> Result<()>, restore: impl FnOnce() -> Result<()>,
              body: impl FnOnce() -> Result<T>) -> Result<T> {
    if let Err(err) = setup() {
        let _ = restore();
        return Err(err);
    }

    let result = body();
    let restored = restore();
    result.and_then(|value| restored.map(|()| value))
}

/// Draws frames into a character buffer and writes only what changed on present.
pub struct TermManager {
    width: u16,
    height: u16,
    // Border corner, bottom right
    frame_end: (u16, u16),
    // Status lines used by the current frame
    text_lines: u16,
    stdout: Stdout,
    screen: Vec<char>,
    shown: Vec<char>,
}

impl TermManager {
    /// Fails if the terminal cannot fit the board, including its far edges,
    /// and the status lines below it.
    pub fn new(board_width: i32, board_height: i32) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;

        let end_x = CELL_COLUMNS * (board_width / SIZE + 1) + 1;
        let end_y = board_height / SIZE + 2;
        let needed_y = end_y + TEXT_LINES as i32;
        if end_x >= width as i32 || needed_y >= height as i32 {
            bail!("terminal is {}x{}, the board needs at least {}x{}",
                  width, height, end_x + 1, needed_y + 1);
        }

        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager {
            width,
            height,
            frame_end: (end_x as u16, end_y as u16),
            text_lines: 0,
            stdout: stdout(),
            shown: screen.clone(),
            screen,
        })
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) {
        let (end_x, end_y) = self.frame_end;

        for x in 0..=end_x {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.put((x, 0), ch);
            self.put((x, end_y), ch);
        }

        for y in 1..end_y {
            self.put((0, y), '|');
            self.put((end_x, y), '|');
        }
    }

    /// Terminal position of the top-left character of a board position.
    fn to_screen(&self, pos: Cell) -> Option<(u16, u16)> {
        if pos.0 < 0 || pos.1 < 0 {
            return None;
        }

        let x = 1 + CELL_COLUMNS * (pos.0 / SIZE);
        let y = 1 + pos.1 / SIZE;
        if x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }

        Some((x as u16, y as u16))
    }

    fn put(&mut self, pos: (u16, u16), ch: char) {
        if pos.0 < self.width && pos.1 < self.height {
            self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        }
    }
}

impl Renderer for TermManager {
    fn clear_background(&mut self) -> Result<()> {
        self.screen.iter_mut().for_each(|ch| *ch = ' ');
        self.text_lines = 0;
        self.draw_borders();
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: Sprite, cell: Cell) -> Result<()> {
        let glyph = match sprite {
            Sprite::SnakeHead(direction) => [head_char(direction); 2],
            Sprite::SnakeBody => SNAKE_BODY,
            Sprite::Apple => APPLE,
        };

        if let Some((x, y)) = self.to_screen(cell) {
            for (i, ch) in glyph.iter().enumerate() {
                self.put((x + i as u16, y), *ch);
            }
        }

        Ok(())
    }

    /// Text goes on the next status line under the border instead of over
    /// the board, so `_position` only fixes the order through call order.
    fn draw_text(&mut self, text: &str, _position: Cell) -> Result<()> {
        if self.text_lines == TEXT_LINES {
            return Ok(());
        }

        let y = self.frame_end.1 + 1 + self.text_lines;
        self.text_lines += 1;
        for (i, ch) in text.chars().enumerate() {
            self.put((1u16.saturating_add(i as u16), y), ch);
        }

        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        for (i, (&new, old)) in self.screen.iter().zip(self.shown.iter_mut()).enumerate() {
            if new != *old {
                let (x, y) = ((i % self.width as usize) as u16, (i / self.width as usize) as u16);
                queue!(self.stdout, cursor::MoveTo(x, y), style::Print(new))
                    .context("Error drawing frame")?;
                *old = new;
            }
        }

        self.stdout.flush().context("Error flushing.")
    }
}

/// Reads the keyboard without blocking.
pub struct TermInput;

impl InputSource for TermInput {
    fn poll_commands(&mut self) -> Result<Vec<Command>> {
        let mut commands = vec![];

        while poll(Duration::from_millis(1)).context("Error polling input")? {
            if let Event::Key(ev) = read().context("Error reading input")? {
                commands.extend(key_command(&ev));
            }
        }

        Ok(commands)
    }
}

/// The terminal has no mixer: cues ring the bell and music is only tracked.
pub struct TermAudio {
    stdout: Stdout,
    mute: bool,
    music_playing: bool,
}

impl TermAudio {
    pub fn new(mute: bool) -> Self {
        TermAudio { stdout: stdout(), mute, music_playing: false }
    }
}

impl AudioService for TermAudio {
    fn play_music(&mut self, track: Track, volume: f32) -> Result<()> {
        debug!("Music {:?} at volume {}", track, volume);
        self.music_playing = true;
        Ok(())
    }

    fn pause_music(&mut self) -> Result<()> {
        if self.music_playing {
            debug!("Music paused");
            self.music_playing = false;
        }
        Ok(())
    }

    fn resume_music(&mut self) -> Result<()> {
        if !self.music_playing {
            debug!("Music resumed");
            self.music_playing = true;
        }
        Ok(())
    }

    fn play_once(&mut self, clip: Clip) -> Result<()> {
        debug!("Cue {:?}", clip);
        if self.mute {
            return Ok(());
        }

        queue!(self.stdout, style::Print('\x07')).context("Error ringing bell")?;
        self.stdout.flush().context("Error flushing.")
    }
}

fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Command::Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Command::Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Command::Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Command::Right),
        KeyCode::Enter => Some(Command::Confirm),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// A manager over an in-memory screen; `present` is never called.
    fn manager(width: u16, height: u16) -> TermManager {
        let screen = vec![' '; width as usize * height as usize];
        TermManager {
            width,
            height,
            frame_end: (2 * 26 + 1, 17),
            text_lines: 0,
            stdout: stdout(),
            shown: screen.clone(),
            screen,
        }
    }

    fn row(term: &TermManager, y: u16) -> String {
        let start = term.width as usize * y as usize;
        term.screen[start..start + term.width as usize].iter().collect()
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_command(&key(KeyCode::Up)), Some(Command::Up));
        assert_eq!(key_command(&key(KeyCode::Char('a'))), Some(Command::Left));
        assert_eq!(key_command(&key(KeyCode::Char('S'))), Some(Command::Down));
        assert_eq!(key_command(&key(KeyCode::Right)), Some(Command::Right));
        assert_eq!(key_command(&key(KeyCode::Enter)), Some(Command::Confirm));
        assert_eq!(key_command(&key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(key_command(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_command(&ev), Some(Command::Quit));
        assert_eq!(key_command(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_cell_mapping() {
        let term = manager(80, 24);
        assert_eq!(term.to_screen((0, 0)), Some((1, 1)));
        assert_eq!(term.to_screen((40, 40)), Some((3, 2)));
        assert_eq!(term.to_screen((1000, 600)), Some((51, 16)));
        assert_eq!(term.to_screen((-1, -1)), None);
        assert_eq!(term.to_screen((2000, 40)), None);
    }

    #[test]
    fn test_frame_drawing() {
        let mut term = manager(80, 24);
        term.clear_background().unwrap();
        term.draw_sprite(Sprite::SnakeHead(Direction::Right), (80, 0)).unwrap();
        term.draw_sprite(Sprite::SnakeBody, (40, 0)).unwrap();
        term.draw_sprite(Sprite::Apple, (200, 0)).unwrap();
        term.draw_sprite(Sprite::SnakeBody, (-1, -1)).unwrap();

        assert_eq!(&row(&term, 0)[..4], "+---");
        assert_eq!(row(&term, 1).chars().take(13).collect::<String>(), "|  ██>>    ()");
        assert_eq!(row(&term, 1).chars().nth(53), Some('|'));
    }

    #[test]
    fn test_text_is_clipped() {
        let mut term = manager(20, 24);
        term.clear_background().unwrap();
        term.draw_text("Score: 12345678901234", (200, 0)).unwrap();

        assert_eq!(row(&term, 18), " Score: 123456789012");
    }

    #[test]
    fn test_text_stays_off_the_board() {
        let mut term = manager(80, 24);
        term.clear_background().unwrap();
        term.draw_sprite(Sprite::Apple, (800, 0)).unwrap();
        term.draw_text("Score: 3", (800, 10)).unwrap();

        assert_eq!(row(&term, 1).chars().skip(41).take(2).collect::<String>(), "()");
        assert!(row(&term, 18).starts_with(" Score: 3"));
    }

    #[test]
    fn test_long_text_does_not_cross_border() {
        let hint = "To play again press Enter. To exit press Escape!";
        let mut term = manager(80, 24);
        term.clear_background().unwrap();
        let inside: Vec<String> = (1..17).map(|y| row(&term, y)).collect();

        term.draw_text("Game is over! Your score is 7", (200, 300)).unwrap();
        term.draw_text(hint, (200, 350)).unwrap();
        term.draw_text("one line too many", (200, 400)).unwrap();

        for y in 1..17 {
            assert_eq!(row(&term, y), inside[y as usize - 1]);
        }
        assert!(row(&term, 18).starts_with(" Game is over! Your score is 7"));
        assert!(row(&term, 19).starts_with(&format!(" {}", hint)));
        assert!(row(&term, 20).trim().is_empty());
    }

    #[test]
    fn test_guard_restores_after_body_error() {
        let mut restored = false;
        let result: Result<()> = guarded(|| Ok(()), || { restored = true; Ok(()) },
                                         || bail!("game failed"));

        assert!(restored);
        assert_eq!(result.unwrap_err().to_string(), "game failed");
    }

    #[test]
    fn test_guard_restores_after_setup_error() {
        let mut ran = false;
        let mut restored = false;
        let result = guarded(|| bail!("no raw mode"), || { restored = true; Ok(()) },
                             || { ran = true; Ok(1) });

        assert!(restored);
        assert!(!ran);
        assert_eq!(result.unwrap_err().to_string(), "no raw mode");
    }

    #[test]
    fn test_guard_reports_restore_error_after_success() {
        let result = guarded(|| Ok(()), || bail!("still raw"), || Ok(5));
        assert_eq!(result.unwrap_err().to_string(), "still raw");

        let result = guarded(|| Ok(()), || Ok(()), || Ok(5));
        assert_eq!(result.unwrap(), 5);
    }

    #[test]
    fn test_clear_wipes_previous_frame() {
        let mut term = manager(80, 24);
        term.draw_sprite(Sprite::Apple, (0, 0)).unwrap();
        term.clear_background().unwrap();
        assert_eq!(&row(&term, 1)[..3], "|  ");
    }
}
