//! The puzzle board for one loaded level
//!
//! Owns the cell grid plus the tokens and checkpoints of every active color.
//! Arrow edits persist across resets; everything a run changes (token
//! positions, danger and fail markers, live arrows, captures) does not.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, Direction, Role};
use super::token::{ByColor, Checkpoint, Color, Token};
use crate::consts::MAX_CELLS;
use crate::error::ConfigError;
use crate::level::LevelConfig;

/// Result of a player edit on one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Placed,
    Removed,
    Rotated(Direction),
    /// Starting square, locked cell, no arrow to rotate, or outside the grid
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    /// Row-major, `height * width`
    cells: Vec<Cell>,
    tokens: ByColor<Token>,
    checkpoints: ByColor<Checkpoint>,
    /// Level start coordinate per active color
    starts: ByColor<IVec2>,
}

impl Board {
    /// Build a fresh board from level data.
    ///
    /// Only active colors are validated; an inactive color's coordinates are
    /// never read.
    pub fn load(config: &LevelConfig) -> Result<Self, ConfigError> {
        if config.width <= 0 || config.height <= 0 {
            return Err(ConfigError::EmptyGrid {
                width: config.width,
                height: config.height,
            });
        }

        let area = config
            .width
            .checked_mul(config.height)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(ConfigError::TooLarge {
                width: config.width,
                height: config.height,
            })?;

        let mut board = Self {
            width: config.width,
            height: config.height,
            cells: Vec::with_capacity(area as usize),
            tokens: ByColor::new(),
            checkpoints: ByColor::new(),
            starts: ByColor::new(),
        };
        for y in 0..config.height {
            for x in 0..config.width {
                board.cells.push(Cell::new(IVec2::new(x, y)));
            }
        }

        for color in config.active_colors() {
            let placement = config.color(color);
            board.check(color, "start", placement.start)?;
            board.check(color, "end", placement.end)?;
            if color.has_checkpoint() {
                board.check(color, "checkpoint", placement.checkpoint)?;
            }
        }

        // Target cells first, in fixed color order; a later color sharing a
        // cell overwrites the earlier role.
        for color in config.active_colors() {
            let end = config.color(color).end;
            let cell = board.cell_at_mut(end);
            if let Role::Target(previous) = cell.role {
                log::warn!(
                    "{} and {} share target cell ({}, {}); keeping {}",
                    previous.as_str(),
                    color.as_str(),
                    end.x,
                    end.y,
                    color.as_str()
                );
            }
            cell.role = Role::Target(color);
        }

        for color in config.active_colors() {
            let placement = config.color(color);
            board.starts.insert(color, placement.start);
            board.tokens.insert(color, Token::new(color, placement.start));
            if color.has_checkpoint() {
                board
                    .checkpoints
                    .insert(color, Checkpoint::new(color, placement.checkpoint));
            }
        }
        board.mark_starting_squares();

        log::info!(
            "Loaded {}x{} board with {} active color(s)",
            board.width,
            board.height,
            board.tokens.len()
        );
        Ok(board)
    }

    fn check(&self, color: Color, field: &'static str, pos: IVec2) -> Result<(), ConfigError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(ConfigError::OutOfBounds { color, field, pos })
        }
    }

    fn mark_starting_squares(&mut self) {
        let starts: Vec<IVec2> = self.starts.iter().map(|(_, &p)| p).collect();
        for pos in starts {
            self.cell_at_mut(pos).make_starting_square();
        }
    }

    // === Edits ===

    /// Flip a non-starting cell between no arrow and North.
    pub fn toggle_arrow(&mut self, x: i32, y: i32) -> EditOutcome {
        let Some(cell) = self.cell_mut(IVec2::new(x, y)) else {
            return EditOutcome::Ignored;
        };
        match cell.toggle_arrow() {
            Some(Some(_)) => EditOutcome::Placed,
            Some(None) => EditOutcome::Removed,
            None => EditOutcome::Ignored,
        }
    }

    /// Rotate an existing arrow clockwise.
    pub fn rotate_arrow(&mut self, x: i32, y: i32) -> EditOutcome {
        let Some(cell) = self.cell_mut(IVec2::new(x, y)) else {
            return EditOutcome::Ignored;
        };
        match cell.rotate_arrow() {
            Some(dir) => EditOutcome::Rotated(dir),
            None => EditOutcome::Ignored,
        }
    }

    /// Point a cell's arrow at `dir`, placing it first if needed. Starting
    /// squares can only be rotated. Used to apply saved layouts.
    pub fn set_arrow(&mut self, x: i32, y: i32, dir: Direction) -> EditOutcome {
        let Some(cell) = self.cell(IVec2::new(x, y)) else {
            return EditOutcome::Ignored;
        };
        if cell.arrow.is_none() && self.toggle_arrow(x, y) == EditOutcome::Ignored {
            return EditOutcome::Ignored;
        }
        let mut outcome = EditOutcome::Placed;
        for _ in 0..Direction::ALL.len() {
            if self.cell(IVec2::new(x, y)).and_then(|c| c.arrow) == Some(dir) {
                return outcome;
            }
            outcome = self.rotate_arrow(x, y);
            if outcome == EditOutcome::Ignored {
                return outcome;
            }
        }
        outcome
    }

    pub fn lock_edits(&mut self) {
        for cell in &mut self.cells {
            cell.set_locked(true);
        }
    }

    pub fn unlock_edits(&mut self) {
        for cell in &mut self.cells {
            cell.set_locked(false);
        }
    }

    /// Clear run state and put every token back on its start cell.
    ///
    /// Roles and the edited arrow layout are kept.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.restore();
            cell.set_locked(false);
        }
        for (color, &start) in self.starts.iter() {
            if let Some(token) = self.tokens.get_mut(color) {
                *token = Token::new(color, start);
            }
        }
        for checkpoint in self.checkpoints.values_mut() {
            checkpoint.release();
        }
        self.mark_starting_squares();
        log::debug!("Board reset");
    }

    // === Queries ===

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        self.index(pos).map(|i| &mut self.cells[i])
    }

    /// Cell at a position already known to be on the grid.
    pub(crate) fn cell_at_mut(&mut self, pos: IVec2) -> &mut Cell {
        let i = (pos.y * self.width + pos.x) as usize;
        &mut self.cells[i]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    pub fn token(&self, color: Color) -> Option<&Token> {
        self.tokens.get(color)
    }

    pub(crate) fn token_mut(&mut self, color: Color) -> Option<&mut Token> {
        self.tokens.get_mut(color)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|(_, t)| t)
    }

    pub fn token_at(&self, pos: IVec2) -> Option<&Token> {
        self.tokens().find(|t| t.pos == pos)
    }

    pub fn checkpoint(&self, color: Color) -> Option<&Checkpoint> {
        self.checkpoints.get(color)
    }

    pub(crate) fn checkpoint_mut(&mut self, color: Color) -> Option<&mut Checkpoint> {
        self.checkpoints.get_mut(color)
    }

    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter().map(|(_, c)| c)
    }

    pub fn is_active(&self, color: Color) -> bool {
        self.tokens.contains(color)
    }

    /// Active colors in `Color::ALL` order
    pub fn active_colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.tokens.iter().map(|(c, _)| c)
    }

    pub fn fail_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().filter(|c| c.is_fail).map(|c| c.pos)
    }

    pub fn is_locked(&self) -> bool {
        self.cells.iter().all(|c| c.arrow_disabled && c.rotation_disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_color_level() -> LevelConfig {
        LevelConfig::new(4, 4)
            .with_color(Color::Blue, IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(3, 2))
            .with_color(Color::Red, IVec2::new(0, 3), IVec2::new(1, 3), IVec2::new(3, 3))
    }

    #[test]
    fn test_load_places_roles_tokens_checkpoints() {
        let board = Board::load(&two_color_level()).unwrap();
        assert_eq!(board.width(), 4);
        assert_eq!(board.cells().count(), 16);

        assert_eq!(
            board.cell(IVec2::new(3, 2)).unwrap().role,
            Role::Target(Color::Blue)
        );
        assert_eq!(board.cell(IVec2::new(3, 3)).unwrap().role, Role::Target(Color::Red));
        assert_eq!(board.cell(IVec2::new(1, 1)).unwrap().role, Role::Base);

        assert_eq!(board.token(Color::Blue).unwrap().pos, IVec2::new(0, 0));
        assert_eq!(board.token(Color::Red).unwrap().pos, IVec2::new(0, 3));
        assert!(board.token(Color::Green).is_none());

        let flag = board.checkpoint(Color::Blue).unwrap();
        assert_eq!(flag.pos, IVec2::new(1, 0));
        assert!(!flag.captured);

        let start = board.cell(IVec2::new(0, 0)).unwrap();
        assert!(start.is_starting_square);
        assert_eq!(start.arrow, Some(Direction::North));
    }

    #[test]
    fn test_load_rejects_out_of_bounds() {
        let level = LevelConfig::new(3, 3).with_color(
            Color::Green,
            IVec2::new(0, 0),
            IVec2::new(1, 1),
            IVec2::new(3, 0),
        );
        assert_eq!(
            Board::load(&level).unwrap_err(),
            ConfigError::OutOfBounds {
                color: Color::Green,
                field: "end",
                pos: IVec2::new(3, 0)
            }
        );

        assert!(matches!(
            Board::load(&LevelConfig::new(0, 4)),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_load_rejects_oversized_grid() {
        assert_eq!(
            Board::load(&LevelConfig::new(50_000, 50_000)).unwrap_err(),
            ConfigError::TooLarge {
                width: 50_000,
                height: 50_000
            }
        );
        // Fits in i32 but over the cell cap
        assert!(matches!(
            Board::load(&LevelConfig::new(2048, 1024)),
            Err(ConfigError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_load_ignores_white_checkpoint_and_inactive_colors() {
        let mut level = LevelConfig::new(3, 3).with_white(IVec2::new(0, 0), IVec2::new(2, 2));
        // Inactive colors may hold junk
        level.red.start = IVec2::new(-7, 40);
        let board = Board::load(&level).unwrap();
        assert!(board.checkpoint(Color::White).is_none());
        assert!(board.is_active(Color::White));
        assert!(!board.is_active(Color::Red));
    }

    #[test]
    fn test_shared_target_keeps_later_color() {
        let level = LevelConfig::new(3, 3)
            .with_color(Color::Blue, IVec2::new(0, 0), IVec2::new(0, 1), IVec2::new(2, 2))
            .with_color(Color::Yellow, IVec2::new(1, 0), IVec2::new(1, 1), IVec2::new(2, 2));
        let board = Board::load(&level).unwrap();
        assert_eq!(
            board.cell(IVec2::new(2, 2)).unwrap().role,
            Role::Target(Color::Yellow)
        );
    }

    #[test]
    fn test_edits() {
        let mut board = Board::load(&two_color_level()).unwrap();
        assert_eq!(board.rotate_arrow(2, 1), EditOutcome::Ignored);
        assert_eq!(board.toggle_arrow(2, 1), EditOutcome::Placed);
        assert_eq!(board.rotate_arrow(2, 1), EditOutcome::Rotated(Direction::East));
        assert_eq!(board.toggle_arrow(2, 1), EditOutcome::Removed);

        // Starting square: toggle refused, rotation allowed
        assert_eq!(board.toggle_arrow(0, 0), EditOutcome::Ignored);
        assert_eq!(board.rotate_arrow(0, 0), EditOutcome::Rotated(Direction::East));

        assert_eq!(board.toggle_arrow(9, 9), EditOutcome::Ignored);
        assert_eq!(board.toggle_arrow(-1, 0), EditOutcome::Ignored);
    }

    #[test]
    fn test_set_arrow() {
        let mut board = Board::load(&two_color_level()).unwrap();
        assert_eq!(board.set_arrow(1, 1, Direction::West), EditOutcome::Rotated(Direction::West));
        assert_eq!(board.cell(IVec2::new(1, 1)).unwrap().arrow, Some(Direction::West));

        assert_eq!(board.set_arrow(2, 2, Direction::North), EditOutcome::Placed);
        assert_eq!(board.set_arrow(0, 0, Direction::South), EditOutcome::Rotated(Direction::South));

        board.lock_edits();
        assert_eq!(board.set_arrow(3, 0, Direction::East), EditOutcome::Ignored);
    }

    #[test]
    fn test_locked_board_ignores_edits() {
        let mut board = Board::load(&two_color_level()).unwrap();
        board.toggle_arrow(1, 1);
        board.lock_edits();
        assert!(board.is_locked());
        assert_eq!(board.toggle_arrow(1, 1), EditOutcome::Ignored);
        assert_eq!(board.rotate_arrow(1, 1), EditOutcome::Ignored);

        board.unlock_edits();
        assert!(!board.is_locked());
        assert_eq!(board.rotate_arrow(1, 1), EditOutcome::Rotated(Direction::East));
    }

    #[test]
    fn test_reset_restores_run_state_but_keeps_edits() {
        let mut board = Board::load(&two_color_level()).unwrap();
        board.toggle_arrow(2, 0);
        board.rotate_arrow(2, 0);
        board.lock_edits();

        // Simulate what a run leaves behind
        board.token_mut(Color::Blue).unwrap().pos = IVec2::new(2, 0);
        board.token_mut(Color::Blue).unwrap().heading = Direction::West;
        board.checkpoint_mut(Color::Blue).unwrap().captured = true;
        {
            let cell = board.cell_mut(IVec2::new(2, 0)).unwrap();
            cell.is_danger = true;
            cell.is_fail = true;
            cell.flip_arrow();
        }

        board.reset();

        let token = board.token(Color::Blue).unwrap();
        assert_eq!(token.pos, IVec2::new(0, 0));
        assert_eq!(token.heading, Direction::North);
        assert!(!board.checkpoint(Color::Blue).unwrap().captured);
        let cell = board.cell(IVec2::new(2, 0)).unwrap();
        assert!(!cell.is_danger);
        assert!(!cell.is_fail);
        assert_eq!(cell.arrow, Some(Direction::East));
        assert!(!board.is_locked());
        assert_eq!(board.fail_cells().count(), 0);
    }

    #[test]
    fn test_rows_and_lookup() {
        let board = Board::load(&two_color_level()).unwrap();
        assert_eq!(board.rows().count(), 4);
        assert!(board.rows().all(|r| r.len() == 4));
        assert_eq!(board.token_at(IVec2::new(0, 3)).unwrap().color, Color::Red);
        assert!(board.token_at(IVec2::new(2, 2)).is_none());
        assert!(board.cell(IVec2::new(4, 0)).is_none());
    }
}
