//! Outside collaborators the game loop drives: drawing, sound and input.
//!
//! The terminal implementations live in [`crate::term`].

use crate::Cell;
use crate::snake::Direction;

use anyhow::Result;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sprite {
    SnakeHead(Direction),
    SnakeBody,
    Apple,
}

/// One-shot sound cues.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Clip {
    Eat,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Track {
    Background,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Quit,
}

impl Command {
    /// The heading this command steers towards, if it is a movement key.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Command::Up => Some(Direction::Up),
            Command::Down => Some(Direction::Down),
            Command::Left => Some(Direction::Left),
            Command::Right => Some(Direction::Right),
            Command::Confirm | Command::Quit => None,
        }
    }
}

pub trait Renderer {
    fn clear_background(&mut self) -> Result<()>;

    /// Draws `sprite` at `cell`, in board coordinates.
    fn draw_sprite(&mut self, sprite: Sprite, cell: Cell) -> Result<()>;

    /// Draws `text` anchored at `position`, in board coordinates. Renderers
    /// may move text elsewhere when it would cover the board.
    fn draw_text(&mut self, text: &str, position: Cell) -> Result<()>;

    fn present(&mut self) -> Result<()>;
}

pub trait AudioService {
    fn play_music(&mut self, track: Track, volume: f32) -> Result<()>;
    fn pause_music(&mut self) -> Result<()>;
    fn resume_music(&mut self) -> Result<()>;
    fn play_once(&mut self, clip: Clip) -> Result<()>;
}

pub trait InputSource {
    /// Commands received since the previous poll, oldest first. Never blocks.
    fn poll_commands(&mut self) -> Result<Vec<Command>>;
}
