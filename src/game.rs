use std::thread::sleep;

use crate::Cell;
use crate::apple::Apple;
use crate::collision::overlaps;
use crate::config::GameConfig;
use crate::services::{AudioService, Clip, Command, InputSource, Renderer, Sprite, Track};
use crate::snake::{Direction, Snake, UNPLACED};

use anyhow::Result;
use log::{debug, info, trace};
use rand::Rng;

const INITIAL_SNAKE_LENGTH: usize = 1;

const SCORE_POSITION: Cell = (800, 10);
const GAME_OVER_POSITION: Cell = (200, 300);
const RESTART_HINT_POSITION: Cell = (200, 350);
const RESTART_HINT: &str = "To play again press Enter. To exit press Escape!";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cause {
    SelfCollision,
    WallCollision,
    /// An apple was eaten and no free cell was left for the next one.
    BoardFull,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickResult {
    Continued,
    Ate,
    GameOver(Cause),
}

/// Everything one game owns. Rebuilt from scratch on restart.
#[derive(Debug, Clone)]
pub struct GameContext {
    snake: Snake,
    apple: Apple,
    state: GameState,
    score: usize,
    board_width: i32,
    board_height: i32,
}

impl GameContext {
    pub fn new(board_width: i32, board_height: i32) -> Self {
        Self::with(Snake::new(INITIAL_SNAKE_LENGTH), Apple::new(), board_width, board_height)
    }

    fn with(snake: Snake, apple: Apple, board_width: i32, board_height: i32) -> Self {
        let score = snake.len();
        GameContext { snake, apple, state: GameState::Playing, score, board_width, board_height }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> &Apple {
        &self.apple
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Score as last displayed, equal to the snake length after every completed tick.
    pub fn score(&self) -> usize {
        self.score
    }

    /// Changes the heading. Ignored once the game is over.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Playing {
            return false;
        }

        trace!("Heading {:?}", direction);
        self.snake.set_heading(direction);
        true
    }

    /// Starts a fresh game if the current one is over.
    pub fn restart(&mut self) -> bool {
        if self.state != GameState::GameOver {
            return false;
        }

        *self = Self::new(self.board_width, self.board_height);
        true
    }

    /// Advances the simulation by one step. Does nothing and returns `None`
    /// while the game is over.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Option<TickResult> {
        if self.state != GameState::Playing {
            return None;
        }

        self.snake.advance();
        let head = self.snake.head();

        let ate = overlaps(head, self.apple.position());
        if ate {
            self.snake.grow();
            let relocated = self.apple.relocate(rng, self.board_width, self.board_height,
                                                self.snake.segments());
            if relocated.is_none() {
                return Some(self.end(Cause::BoardFull));
            }
        }

        // The head and its neck always touch right after a move. Segments grown
        // this tick have no position yet.
        let bitten = self.snake.segments()[2.min(self.snake.len())..].iter()
            .filter(|&&segment| segment != UNPLACED)
            .any(|&segment| overlaps(head, segment));
        if bitten {
            return Some(self.end(Cause::SelfCollision));
        }

        // The far edges themselves are still in play
        if head.0 > self.board_width || head.0 < 0 || head.1 > self.board_height || head.1 < 0 {
            return Some(self.end(Cause::WallCollision));
        }

        self.score = self.snake.len();
        Some(if ate { TickResult::Ate } else { TickResult::Continued })
    }

    fn end(&mut self, cause: Cause) -> TickResult {
        self.state = GameState::GameOver;
        TickResult::GameOver(cause)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Drives a [`GameContext`] in real time: poll input, tick, draw, sleep.
pub struct GameLoop<R, A, I, G> {
    config: GameConfig,
    ctx: GameContext,
    renderer: R,
    audio: A,
    input: I,
    rng: G,
}

impl<R: Renderer, A: AudioService, I: InputSource, G: Rng> GameLoop<R, A, I, G> {
    pub fn new(config: GameConfig, renderer: R, audio: A, input: I, rng: G) -> Self {
        let ctx = GameContext::new(config.board_width, config.board_height);
        GameLoop { config, ctx, renderer, audio, input, rng }
    }

    /// Runs until a quit command arrives.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting on a {}x{} board, tick {:?}",
              self.config.board_width, self.config.board_height, self.config.tick);

        self.audio.play_music(Track::Background, self.config.music_volume)?;
        self.draw()?;

        loop {
            for command in self.input.poll_commands()? {
                if let Flow::Quit = self.handle_command(command)? {
                    info!("Quit with score {}", self.ctx.score());
                    return Ok(());
                }
            }

            if let Some(result) = self.ctx.tick(&mut self.rng) {
                self.on_tick(result)?;
            }

            self.draw()?;
            sleep(self.config.tick);
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn handle_command(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Confirm => {
                if self.ctx.restart() {
                    info!("Restarting");
                    self.audio.resume_music()?;
                }
            },
            _ => {
                if let Some(direction) = command.direction() {
                    self.ctx.steer(direction);
                }
            },
        }

        Ok(Flow::Continue)
    }

    fn on_tick(&mut self, result: TickResult) -> Result<()> {
        match result {
            TickResult::Continued => {},
            TickResult::Ate => {
                debug!("Ate apple, length {}, next apple at {:?}",
                       self.ctx.snake().len(), self.ctx.apple().position());
                self.audio.play_once(Clip::Eat)?;
            },
            TickResult::GameOver(cause) => {
                info!("Game over ({:?}) with score {}", cause, self.ctx.snake().len());
                // Only a meal can fill the board
                if cause == Cause::BoardFull {
                    self.audio.play_once(Clip::Eat)?;
                }
                self.audio.play_once(Clip::GameOver)?;
                self.audio.pause_music()?;
            },
        }

        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.renderer.clear_background()?;

        match self.ctx.state() {
            GameState::Playing => {
                let snake = self.ctx.snake();
                for (i, &segment) in snake.segments().iter().enumerate() {
                    if segment == UNPLACED {
                        continue;
                    }
                    let sprite = if i == 0 { Sprite::SnakeHead(snake.direction()) } else { Sprite::SnakeBody };
                    self.renderer.draw_sprite(sprite, segment)?;
                }

                self.renderer.draw_sprite(Sprite::Apple, self.ctx.apple().position())?;
                self.renderer.draw_text(&format!("Score: {}", self.ctx.score()), SCORE_POSITION)?;
            },
            GameState::GameOver => {
                let line = format!("Game is over! Your score is {}", self.ctx.snake().len());
                self.renderer.draw_text(&line, GAME_OVER_POSITION)?;
                self.renderer.draw_text(RESTART_HINT, RESTART_HINT_POSITION)?;
            },
        }

        self.renderer.present()
    }
}
