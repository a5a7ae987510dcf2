mod apple;
mod collision;
mod config;
mod game;
mod services;
mod snake;
mod term;

use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use simplelog::{Config, WriteLogger};

use crate::config::Cli;
use crate::game::GameLoop;
use crate::term::{TermAudio, TermInput, TermManager};

/// Board position in pixels. Always a multiple of [`SIZE`] except for the
/// placeholder given to freshly grown segments.
pub type Cell = (i32, i32);

/// Side of one board cell.
pub const SIZE: i32 = 40;

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    // The terminal is the playfield, so logs go to a file
    let log_file = File::create(&config.log_file)
        .with_context(|| format!("failed to create log file {}", config.log_file.display()))?;
    WriteLogger::init(config.log_level, Config::default(), log_file)
        .context("failed to initialize logger")?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let renderer = TermManager::new(config.board_width, config.board_height)?;
    let audio = TermAudio::new(config.mute);

    let mut game = GameLoop::new(config, renderer, audio, TermInput, rng);
    term::with_terminal(|| game.run())
}
