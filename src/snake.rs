use crate::{Cell, SIZE};
use Direction::*;

/// Position given to a freshly grown segment until the next advance places it.
pub const UNPLACED: Cell = (-1, -1);

const START: Cell = (SIZE, SIZE);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Per-tick head displacement, one cell in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -SIZE),
            Down => (0, SIZE),
            Left => (-SIZE, 0),
            Right => (SIZE, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    segments: Vec<Cell>,
    direction: Direction,
}

impl Snake {
    /// A snake of `length` segments, all stacked on the start cell, heading right.
    pub fn new(length: usize) -> Self {
        Snake { segments: vec![START; length.max(1)], direction: Right }
    }

    #[cfg(test)]
    pub fn from_segments(segments: Vec<Cell>, direction: Direction) -> Self {
        assert!(!segments.is_empty());
        Snake { segments, direction }
    }

    /// Body cells, head first.
    pub fn segments(&self) -> &[Cell] {
        &self.segments
    }

    pub fn head(&self) -> Cell {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Reversing straight into the neck is allowed.
    pub fn set_heading(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn advance(&mut self) {
        // Tail first, so every segment copies its predecessor's old position
        for i in (1..self.segments.len()).rev() {
            self.segments[i] = self.segments[i - 1];
        }

        let (dx, dy) = self.direction.delta();
        let head = &mut self.segments[0];
        head.0 += dx;
        head.1 += dy;
    }

    /// Adds a tail segment at [`UNPLACED`]; the following advance moves it onto the body.
    pub fn grow(&mut self) {
        self.segments.push(UNPLACED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snake_starts_stacked() {
        let snake = Snake::new(3);
        assert_eq!(snake.len(), 3);
        assert!(snake.segments().iter().all(|&s| s == (SIZE, SIZE)));
        assert_eq!(snake.direction(), Right);
    }

    #[test]
    fn test_zero_length_is_clamped() {
        assert_eq!(Snake::new(0).len(), 1);
    }

    #[test]
    fn test_heading_vectors() {
        assert_eq!(Up.delta(), (0, -SIZE));
        assert_eq!(Down.delta(), (0, SIZE));
        assert_eq!(Left.delta(), (-SIZE, 0));
        assert_eq!(Right.delta(), (SIZE, 0));
    }

    #[test]
    fn test_advance_shifts_segments() {
        let mut snake = Snake::from_segments(vec![(120, 40), (80, 40), (40, 40)], Right);
        let before = snake.segments().to_vec();

        snake.advance();

        assert_eq!(snake.len(), before.len());
        assert_eq!(snake.head(), (160, 40));
        for i in 1..snake.len() {
            assert_eq!(snake.segments()[i], before[i - 1]);
        }
    }

    #[test]
    fn test_advance_after_turn() {
        let mut snake = Snake::from_segments(vec![(120, 40), (80, 40)], Right);
        snake.set_heading(Down);
        snake.advance();
        assert_eq!(snake.segments(), &[(120, 80), (120, 40)]);
    }

    #[test]
    fn test_reversal_is_accepted() {
        let mut snake = Snake::new(1);
        snake.set_heading(Left);
        assert_eq!(snake.direction(), Left);
    }

    #[test]
    fn test_grown_segment_is_placed_by_next_advance() {
        let mut snake = Snake::from_segments(vec![(80, 40), (40, 40)], Right);
        snake.grow();

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.segments()[2], UNPLACED);

        snake.advance();
        assert_eq!(snake.segments(), &[(120, 40), (80, 40), (40, 40)]);
    }
}
