//! Outbound notifications from the simulation
//!
//! Presentation and audio are observers only: they receive events and cues
//! but never hold a reference to the board.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::engine::SimPhase;
use super::token::Color;

/// State change a presentation layer may want to redraw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// Whole board replaced or reset; redraw everything
    BoardReset,
    /// A cell's arrow, role or lock changed
    CellChanged { pos: IVec2 },
    TokenMoved { color: Color, from: IVec2, to: IVec2 },
    CheckpointCaptured { color: Color, pos: IVec2 },
    CheckpointReleased { color: Color, pos: IVec2 },
    DangerMarked { pos: IVec2 },
    FailMarked { pos: IVec2 },
    PhaseChanged { phase: SimPhase },
    /// Terminal panel may be shown; fired after the reveal delay
    OutcomeRevealed { phase: SimPhase },
}

/// Receives board events. Must not block.
pub trait PresentationSink {
    fn on_event(&mut self, event: &BoardEvent);
}

/// Discrete sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    ArrowPlaced,
    ArrowRemoved,
    ArrowRotated,
    /// A token moved one cell
    TokenStep(Color),
    SimulationStart,
    SimulationStop,
    BoardReset,
}

/// Fire-and-forget cue receiver
pub trait AudioSink {
    fn cue(&mut self, cue: AudioCue);
}

impl PresentationSink for () {
    fn on_event(&mut self, _event: &BoardEvent) {}
}

impl AudioSink for () {
    fn cue(&mut self, _cue: AudioCue) {}
}

/// Recording sink
impl PresentationSink for Vec<BoardEvent> {
    fn on_event(&mut self, event: &BoardEvent) {
        self.push(event.clone());
    }
}

/// Recording sink
impl AudioSink for Vec<AudioCue> {
    fn cue(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

impl<T: PresentationSink + ?Sized> PresentationSink for Box<T> {
    fn on_event(&mut self, event: &BoardEvent) {
        (**self).on_event(event);
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn cue(&mut self, cue: AudioCue) {
        (**self).cue(cue);
    }
}
