use crate::SIZE;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "snake")]
#[command(version, about = "Grid snake: eat apples, avoid walls and your own tail")]
pub struct Cli {
    /// Board width in pixels, a multiple of the cell size
    #[arg(long, default_value_t = 1000)]
    width: i32,

    /// Board height in pixels, a multiple of the cell size
    #[arg(long, default_value_t = 600)]
    height: i32,

    /// Delay between simulation ticks, in milliseconds
    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    /// Background music volume, from 0 to 1
    #[arg(long, default_value_t = 0.15)]
    volume: f32,

    /// Silence the eat and game-over cues
    #[arg(long)]
    mute: bool,

    /// Seed for apple placement
    #[arg(long)]
    seed: Option<u64>,

    /// File the log is written to
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board_width: i32,
    pub board_height: i32,
    pub tick: Duration,
    pub music_volume: f32,
    pub mute: bool,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_width: 1000,
            board_height: 600,
            tick: Duration::from_millis(200),
            music_volume: 0.15,
            mute: false,
            seed: None,
            log_file: PathBuf::from("snake.log"),
            log_level: LevelFilter::Info,
        }
    }
}

impl Cli {
    pub fn into_config(self) -> Result<GameConfig> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value <= 0 || value % SIZE != 0 {
                bail!("board {} must be a positive multiple of {}, got {}", name, SIZE, value);
            }
        }

        if self.tick_ms == 0 {
            bail!("tick delay must be at least 1 ms");
        }

        if !(0.0..=1.0).contains(&self.volume) {
            bail!("volume must be between 0 and 1, got {}", self.volume);
        }

        Ok(GameConfig {
            board_width: self.width,
            board_height: self.height,
            tick: Duration::from_millis(self.tick_ms),
            music_volume: self.volume,
            mute: self.mute,
            seed: self.seed,
            log_file: self.log_file,
            log_level: self.log_level,
        })
    }
}
