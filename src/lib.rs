//! Beatgrid - a rhythm puzzle on a grid of arrows
//!
//! Colored tokens step across the board on a fixed beat, following the
//! arrows the player placed. Every token must pick up its checkpoint and
//! stand on its own target at the same time.
//!
//! Core modules:
//! - `sim`: Deterministic board model and beat engine
//! - `session`: Control surface that drives the engine from a beat clock
//! - `level`: Level data and campaign progress
//! - `render`: Plain-text presentation
//! - `audio`: Cue to clip mapping
//! - `settings`: Player preferences

pub mod audio;
pub mod clock;
pub mod error;
pub mod level;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, GameError, InvalidOperation, LevelFileError};
pub use level::{Campaign, LevelConfig};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Tempo used when nothing else is configured
    pub const DEFAULT_BPM: u32 = 120;
    pub const MIN_BPM: u32 = 1;
    pub const MAX_BPM: u32 = 600;

    /// Upper bound on `width * height` for a loaded level
    pub const MAX_CELLS: i32 = 1 << 20;

    /// Seconds between a run's outcome and the result panel
    pub const TERMINAL_REVEAL_DELAY: f32 = 1.0;
}
