//! Deterministic puzzle simulation
//!
//! All gameplay rules live here. This module must stay pure:
//! - One beat per `Engine::step` call, no wall-clock time
//! - Fixed color order everywhere (`Color::ALL`)
//! - No rendering, audio or platform dependencies; observers get events

pub mod board;
pub mod cell;
pub mod engine;
pub mod events;
pub mod token;

pub use board::{Board, EditOutcome};
pub use cell::{Cell, Direction, Role};
pub use engine::{BeatReport, Engine, FailKind, Failure, SimPhase};
pub use events::{AudioCue, AudioSink, BoardEvent, PresentationSink};
pub use token::{ByColor, Checkpoint, Color, Token};
