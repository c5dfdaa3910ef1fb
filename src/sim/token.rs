//! Colored tokens, checkpoints, and the color-keyed table that holds them

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::cell::Direction;

/// Puzzle colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Blue,
    Red,
    Green,
    Yellow,
    White,
}

impl Color {
    /// Fixed order used for role assignment, collision claims and win checks
    pub const ALL: [Color; 5] = [
        Color::Blue,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::White,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// White has a target cell but never a checkpoint.
    pub fn has_checkpoint(self) -> bool {
        self != Color::White
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Blue => "Blue",
            Color::Red => "Red",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
            Color::White => "White",
        }
    }
}

/// One optional slot per color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByColor<T> {
    slots: [Option<T>; 5],
}

impl<T> Default for ByColor<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None],
        }
    }
}

impl<T> ByColor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, color: Color, value: T) -> Option<T> {
        self.slots[color.index()].replace(value)
    }

    pub fn get(&self, color: Color) -> Option<&T> {
        self.slots[color.index()].as_ref()
    }

    pub fn get_mut(&mut self, color: Color) -> Option<&mut T> {
        self.slots[color.index()].as_mut()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.slots[color.index()].is_some()
    }

    /// Occupied slots in `Color::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Color, &T)> {
        Color::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|v| (c, v)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A movable colored marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub color: Color,
    pub pos: IVec2,
    /// Last direction moved; used when the current cell has no arrow
    pub heading: Direction,
}

impl Token {
    pub fn new(color: Color, pos: IVec2) -> Self {
        Self {
            color,
            pos,
            heading: Direction::North,
        }
    }

    /// Where the token would land given the arrow under it. Updates the
    /// heading when an arrow is present.
    pub fn advance(&mut self, arrow: Option<Direction>) -> IVec2 {
        if let Some(dir) = arrow {
            self.heading = dir;
        }
        self.pos + self.heading.offset()
    }
}

/// A capturable flag bound to a color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub color: Color,
    pub pos: IVec2,
    pub captured: bool,
}

impl Checkpoint {
    pub fn new(color: Color, pos: IVec2) -> Self {
        Self {
            color,
            pos,
            captured: false,
        }
    }

    /// Capture if `token_pos` is on the flag. Returns true only on the
    /// transition from released to captured.
    pub fn try_capture(&mut self, token_pos: IVec2) -> bool {
        if self.captured || token_pos != self.pos {
            return false;
        }
        self.captured = true;
        true
    }

    pub fn release(&mut self) {
        self.captured = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_color_iterates_in_fixed_order() {
        let mut table = ByColor::new();
        table.insert(Color::White, 5);
        table.insert(Color::Blue, 1);
        table.insert(Color::Green, 3);

        let order: Vec<Color> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Color::Blue, Color::Green, Color::White]);
        assert_eq!(table.len(), 3);
        assert!(!table.contains(Color::Red));
    }

    #[test]
    fn test_advance_follows_arrow_then_heading() {
        let mut token = Token::new(Color::Blue, IVec2::new(1, 1));
        assert_eq!(token.advance(Some(Direction::East)), IVec2::new(2, 1));
        assert_eq!(token.heading, Direction::East);

        token.pos = IVec2::new(2, 1);
        // No arrow: keep going East
        assert_eq!(token.advance(None), IVec2::new(3, 1));
        assert_eq!(token.heading, Direction::East);
    }

    #[test]
    fn test_checkpoint_capture_is_monotonic() {
        let mut flag = Checkpoint::new(Color::Red, IVec2::new(2, 2));
        assert!(!flag.try_capture(IVec2::new(1, 2)));
        assert!(flag.try_capture(IVec2::new(2, 2)));
        assert!(flag.captured);

        // Leaving the cell keeps it captured; re-entry is not a new capture
        assert!(!flag.try_capture(IVec2::new(3, 2)));
        assert!(flag.captured);
        assert!(!flag.try_capture(IVec2::new(2, 2)));

        flag.release();
        assert!(!flag.captured);
    }
}
