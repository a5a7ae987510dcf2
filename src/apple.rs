use crate::{Cell, SIZE};
use crate::collision::overlaps;

use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;

/// Where every new game places its first apple.
pub const INITIAL_APPLE: Cell = (SIZE * 3, SIZE * 3);

/// Random draws before falling back to scanning the board for free cells.
const MAX_DRAWS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Apple {
    position: Cell,
}

impl Apple {
    pub fn new() -> Self {
        Apple { position: INITIAL_APPLE }
    }

    #[cfg(test)]
    pub fn at(position: Cell) -> Self {
        Apple { position }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    /// Moves the apple to a random grid cell of the board that overlaps none
    /// of `occupied`. Returns `None`, leaving the apple where it was, when no
    /// such cell exists.
    pub fn relocate<R: Rng>(&mut self, rng: &mut R, board_width: i32, board_height: i32,
                            occupied: &[Cell]) -> Option<Cell> {
        let (cols, rows) = (board_width / SIZE, board_height / SIZE);
        if cols <= 0 || rows <= 0 {
            return None;
        }

        let is_free = |cell: &Cell| !occupied.iter().any(|&o| overlaps(*cell, o));

        let drawn = (0..MAX_DRAWS)
            .map(|_| (rng.gen_range(0..cols) * SIZE, rng.gen_range(0..rows) * SIZE))
            .find(is_free);

        let cell = match drawn {
            Some(cell) => cell,
            None => {
                warn!("No free cell after {} draws, scanning the board", MAX_DRAWS);
                let choices: Vec<Cell> = (0..rows)
                    .flat_map(|y| (0..cols).map(move |x| (x * SIZE, y * SIZE)))
                    .filter(is_free)
                    .collect();
                *choices.choose(rng)?
            }
        };

        self.position = cell;
        Some(cell)
    }
}
