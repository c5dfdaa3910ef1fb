//! Grid cells and arrow headings

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::token::Color;

/// Compass heading of an arrow or a moving token.
///
/// Row 0 is the top of the grid, so North decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step on the grid
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::East => IVec2::new(1, 0),
            Direction::South => IVec2::new(0, 1),
            Direction::West => IVec2::new(-1, 0),
        }
    }

    /// Next heading in the rotate cycle North -> East -> South -> West -> North
    pub fn rotated(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// 180 degree turn
    pub fn reversed(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Direction::North),
            'E' => Some(Direction::East),
            'S' => Some(Direction::South),
            'W' => Some(Direction::West),
            _ => None,
        }
    }
}

/// Target color a cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Base,
    Target(Color),
}

/// One grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub pos: IVec2,
    pub role: Role,
    /// Arrow read by tokens during a run
    pub arrow: Option<Direction>,
    /// Arrow as the player left it; restored on reset
    pub saved_arrow: Option<Direction>,
    pub is_danger: bool,
    /// Recorded as the cause of a failed run
    pub is_fail: bool,
    pub is_starting_square: bool,
    pub arrow_disabled: bool,
    pub rotation_disabled: bool,
}

impl Cell {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            role: Role::Base,
            arrow: None,
            saved_arrow: None,
            is_danger: false,
            is_fail: false,
            is_starting_square: false,
            arrow_disabled: false,
            rotation_disabled: false,
        }
    }

    /// Flip between no arrow and North. Returns the new arrow, or `None` if
    /// the cell refused the edit.
    pub fn toggle_arrow(&mut self) -> Option<Option<Direction>> {
        if self.is_starting_square || self.arrow_disabled {
            return None;
        }
        let next = match self.arrow {
            None => Some(Direction::North),
            Some(_) => None,
        };
        self.arrow = next;
        self.saved_arrow = next;
        Some(next)
    }

    /// Advance a present arrow one step clockwise.
    pub fn rotate_arrow(&mut self) -> Option<Direction> {
        if self.rotation_disabled {
            return None;
        }
        let next = self.arrow?.rotated();
        self.arrow = Some(next);
        self.saved_arrow = Some(next);
        Some(next)
    }

    /// Mark as a token's start cell, forcing an arrow if none was placed.
    pub fn make_starting_square(&mut self) {
        self.is_starting_square = true;
        if self.arrow.is_none() && self.saved_arrow.is_none() {
            self.arrow = Some(Direction::North);
            self.saved_arrow = self.arrow;
        }
    }

    /// Reverse the live arrow in place; the saved layout is untouched.
    pub fn flip_arrow(&mut self) -> bool {
        match self.arrow {
            Some(dir) => {
                self.arrow = Some(dir.reversed());
                true
            }
            None => false,
        }
    }

    /// Remove the live arrow; the saved layout is untouched.
    pub fn clear_arrow(&mut self) -> bool {
        self.arrow.take().is_some()
    }

    /// Drop run state and restore the saved arrow.
    pub fn restore(&mut self) {
        self.is_danger = false;
        self.is_fail = false;
        self.arrow = self.saved_arrow;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.arrow_disabled = locked;
        self.rotation_disabled = locked;
    }

    pub fn has_arrow(&self) -> bool {
        self.arrow.is_some()
    }
}
