//! Plain-text presentation
//!
//! Each cell prints as three characters: occupant, arrow, target role.
//!
//! ```text
//!    0  1  2
//! 0  B>  .  .b
//! 1   . +.  . 
//! ```
//!
//! Occupant is a token initial, `X` for a fail cell, `!` for danger or `+`
//! for an uncaptured checkpoint.

use std::fmt::Write as _;

use crate::sim::{Board, BoardEvent, Color, Direction, PresentationSink, Role, SimPhase};

/// Token glyphs, indexed by `Color::index`
const TOKEN_GLYPHS: [char; 5] = ['B', 'R', 'G', 'Y', 'W'];
/// Target cell glyphs, indexed by `Color::index`
const ROLE_GLYPHS: [char; 5] = ['b', 'r', 'g', 'y', 'w'];

pub fn token_glyph(color: Color) -> char {
    TOKEN_GLYPHS[color.index()]
}

pub fn role_glyph(role: Role) -> char {
    match role {
        Role::Base => ' ',
        Role::Target(color) => ROLE_GLYPHS[color.index()],
    }
}

pub fn arrow_glyph(arrow: Option<Direction>) -> char {
    match arrow {
        None => '.',
        Some(Direction::North) => '^',
        Some(Direction::East) => '>',
        Some(Direction::South) => 'v',
        Some(Direction::West) => '<',
    }
}

/// Text renderer that also tracks whether the board needs redrawing
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    pub show_coordinates: bool,
    dirty: bool,
    /// Set once the outcome panel may be shown
    revealed: Option<SimPhase>,
    moves: u64,
}

impl TextRenderer {
    pub fn new(show_coordinates: bool) -> Self {
        Self {
            show_coordinates,
            ..Self::default()
        }
    }

    /// True if anything changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn revealed(&self) -> Option<SimPhase> {
        self.revealed
    }

    /// Token moves seen since the last reset
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn render(&self, board: &Board) -> String {
        let mut out = String::new();
        if self.show_coordinates {
            out.push_str("  ");
            for x in 0..board.width() {
                let _ = write!(out, "{x:^3}");
            }
            out.push('\n');
        }
        for (y, row) in board.rows().enumerate() {
            if self.show_coordinates {
                let _ = write!(out, "{y:<2}");
            }
            for cell in row {
                let occupant = if cell.is_fail {
                    'X'
                } else if let Some(token) = board.token_at(cell.pos) {
                    token_glyph(token.color)
                } else if cell.is_danger {
                    '!'
                } else if board
                    .checkpoints()
                    .any(|f| f.pos == cell.pos && !f.captured)
                {
                    '+'
                } else {
                    ' '
                };
                out.push(occupant);
                out.push(arrow_glyph(cell.arrow));
                out.push(role_glyph(cell.role));
            }
            out.push('\n');
        }
        out
    }

    /// One-line summary of a revealed outcome
    pub fn status_line(&self) -> Option<&'static str> {
        match self.revealed? {
            SimPhase::Succeeded => Some("Level complete!"),
            SimPhase::Failed => Some("Level failed - reset to try again"),
            SimPhase::Idle | SimPhase::Running => None,
        }
    }
}

impl PresentationSink for TextRenderer {
    fn on_event(&mut self, event: &BoardEvent) {
        self.dirty = true;
        match event {
            BoardEvent::BoardReset => {
                self.revealed = None;
                self.moves = 0;
            }
            BoardEvent::TokenMoved { .. } => self.moves += 1,
            BoardEvent::OutcomeRevealed { phase } => self.revealed = Some(*phase),
            _ => {}
        }
    }
}
