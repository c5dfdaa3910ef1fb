//! Error types for level loading and the control surface

use std::fmt;

use glam::IVec2;

use crate::sim::Color;

/// A level that cannot be turned into a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is zero or negative.
    EmptyGrid { width: i32, height: i32 },
    /// More cells than a board may hold.
    TooLarge { width: i32, height: i32 },
    /// An active color names a coordinate outside the grid.
    OutOfBounds {
        color: Color,
        field: &'static str,
        pos: IVec2,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid must be at least 1x1, got {width}x{height}")
            }
            Self::TooLarge { width, height } => write!(
                f,
                "grid {width}x{height} exceeds {} cells",
                crate::consts::MAX_CELLS
            ),
            Self::OutOfBounds { color, field, pos } => write!(
                f,
                "{color:?} {field} coordinate ({}, {}) lies outside the grid",
                pos.x, pos.y
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A command rejected without changing any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOperation {
    NoLevelLoaded,
    /// Arrow edit while the simulation is running.
    EditWhileRunning,
    /// A finished run is still on the board; reset or replay first.
    OutcomePending,
    CellOutOfBounds { x: i32, y: i32 },
    AlreadyRunning,
    NotRunning,
    /// Replay requested before the run reached an outcome.
    NotTerminal,
}

impl fmt::Display for InvalidOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLevelLoaded => write!(f, "no level is loaded"),
            Self::EditWhileRunning => write!(f, "arrows are locked while the simulation runs"),
            Self::OutcomePending => write!(f, "reset or replay the level first"),
            Self::CellOutOfBounds { x, y } => write!(f, "cell ({x}, {y}) is outside the grid"),
            Self::AlreadyRunning => write!(f, "simulation is already running"),
            Self::NotRunning => write!(f, "simulation is not running"),
            Self::NotTerminal => write!(f, "simulation has not finished"),
        }
    }
}

impl std::error::Error for InvalidOperation {}

/// Any error surfaced by the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    Config(ConfigError),
    Invalid(InvalidOperation),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Invalid(e) => write!(f, "invalid operation: {e}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Invalid(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GameError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InvalidOperation> for GameError {
    fn from(e: InvalidOperation) -> Self {
        Self::Invalid(e)
    }
}

/// Failure reading a level, campaign or settings file.
#[derive(Debug)]
pub enum LevelFileError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for LevelFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "could not read file: {e}"),
            Self::Parse(e) => write!(f, "could not parse JSON: {e}"),
        }
    }
}

impl std::error::Error for LevelFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LevelFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for LevelFileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
